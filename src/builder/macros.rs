//! Macros for declaring typed state and event names.

/// Declare an enum whose variants name the states of a workflow.
///
/// The generated enum converts into [`State`](crate::core::State), so it
/// can be handed straight to the builders, and knows which of its variants
/// are final.
///
/// # Example
///
/// ```
/// use nfaflow::states;
/// use nfaflow::core::State;
///
/// states! {
///     pub enum Document {
///         Draft,
///         InReview,
///         Approved,
///         Rejected,
///     }
///     final: [Approved, Rejected]
/// }
///
/// assert_eq!(Document::InReview.name(), "InReview");
/// assert!(Document::Approved.is_final());
/// assert_eq!(State::from(Document::Draft), "Draft");
/// assert_eq!(Document::finals(), vec![State::from("Approved"), State::from("Rejected")]);
/// ```
#[macro_export]
macro_rules! states {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            pub fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }

            /// Names of the final variants, in declaration order.
            pub fn finals() -> ::std::vec::Vec<$crate::core::State> {
                Self::ALL
                    .iter()
                    .filter(|s| s.is_final())
                    .map(|s| $crate::core::State::from(s.name()))
                    .collect()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::convert::From<$name> for $crate::core::State {
            fn from(state: $name) -> Self {
                $crate::core::State::from(state.name())
            }
        }
    };
}

/// Declare an enum whose variants name the events of a workflow.
///
/// # Example
///
/// ```
/// use nfaflow::events;
/// use nfaflow::core::Event;
///
/// events! {
///     pub enum Review {
///         Submit,
///         Approve,
///     }
/// }
///
/// assert_eq!(Event::from(Review::Approve), "Approve");
/// ```
#[macro_export]
macro_rules! events {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl ::std::convert::From<$name> for $crate::core::Event {
            fn from(event: $name) -> Self {
                $crate::core::Event::from(event.name())
            }
        }
    };
}

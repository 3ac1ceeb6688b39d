//! Graph-integrity checks for definitions.
//!
//! Violations are accumulated with Stillwater's `Validation` so callers can
//! ask for every problem at once, while [`validate`] keeps the contract of
//! reporting the first one deterministically.
//!
//! Checks run in two phases. Structural checks (duplicate transitions and
//! undeclared states) come first; graph analysis only runs on a structurally
//! sound graph, because degrees and reachability are meaningless otherwise.

use super::error::{DefinitionError, StateRole};
use super::Transition;
use crate::core::{Event, State};
use std::collections::{HashMap, HashSet, VecDeque};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<DefinitionError>>;

fn check(ok: bool, violation: impl FnOnce() -> DefinitionError) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn collect(checks: Vec<Check>) -> Result<(), Vec<DefinitionError>> {
    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(errors.iter().cloned().collect()),
    }
}

/// Check a candidate graph, reporting the first violation.
///
/// # Example
///
/// ```rust
/// use nfaflow::definition::{validate, DefinitionError, Transition};
/// use nfaflow::core::State;
///
/// let draft = State::from("Draft");
/// let states = vec![draft.clone(), State::from("Approved")];
/// let finals = vec![State::from("Approved")];
/// let transitions = vec![Transition::new("Draft", "Approved", "Approve")];
///
/// assert!(validate(&draft, &states, &transitions, &finals).is_ok());
///
/// let err = validate(&draft, &states, &transitions, &[]).unwrap_err();
/// assert_eq!(err, DefinitionError::DeadEndState(State::from("Approved")));
/// ```
pub fn validate(
    initial: &State,
    states: &[State],
    transitions: &[Transition],
    final_states: &[State],
) -> Result<(), DefinitionError> {
    validate_all(initial, states, transitions, final_states).map_err(|mut errors| errors.remove(0))
}

/// Check a candidate graph, reporting every violation in detection order.
///
/// The returned list is never empty on failure.
pub fn validate_all(
    initial: &State,
    states: &[State],
    transitions: &[Transition],
    final_states: &[State],
) -> Result<(), Vec<DefinitionError>> {
    if initial.is_empty() {
        return Err(vec![DefinitionError::EmptyInitialState]);
    }

    let declared: HashSet<&State> = states.iter().collect();
    let (graph, mut checks) = TransitionGraph::build(transitions);
    checks.extend(declaration_checks(
        initial,
        &declared,
        transitions,
        final_states,
    ));
    collect(checks)?;

    collect(graph.analyze(initial, states, final_states))
}

fn declaration_checks(
    initial: &State,
    declared: &HashSet<&State>,
    transitions: &[Transition],
    final_states: &[State],
) -> Vec<Check> {
    let mut reported: HashSet<(&State, StateRole)> = HashSet::new();
    let mut checks = Vec::new();

    let references = std::iter::once((initial, StateRole::Initial))
        .chain(final_states.iter().map(|s| (s, StateRole::Final)))
        .chain(transitions.iter().flat_map(|t| {
            [
                (&t.from, StateRole::TransitionSource),
                (&t.to, StateRole::TransitionTarget),
            ]
        }));

    for (state, role) in references {
        if declared.contains(state) || !reported.insert((state, role)) {
            continue;
        }
        checks.push(check(false, || DefinitionError::UndeclaredState {
            state: state.clone(),
            role,
        }));
    }

    checks
}

/// Adjacency view of a transition list.
///
/// Targets are deduplicated per source: several events between the same pair
/// of states form a single edge for degree and reachability purposes.
struct TransitionGraph<'a> {
    adjacency: HashMap<&'a State, Vec<&'a State>>,
    in_degree: HashMap<&'a State, usize>,
}

impl<'a> TransitionGraph<'a> {
    fn build(transitions: &'a [Transition]) -> (Self, Vec<Check>) {
        let mut triplets: HashSet<(&State, &State, &Event)> = HashSet::new();
        let mut edges: HashSet<(&State, &State)> = HashSet::new();
        let mut adjacency: HashMap<&State, Vec<&State>> = HashMap::new();
        let mut in_degree: HashMap<&State, usize> = HashMap::new();
        let mut checks = Vec::new();

        for t in transitions {
            if !triplets.insert((&t.from, &t.to, &t.on)) {
                checks.push(check(false, || DefinitionError::DuplicateTransition {
                    from: t.from.clone(),
                    to: t.to.clone(),
                    on: t.on.clone(),
                }));
                continue;
            }

            let targets = adjacency.entry(&t.from).or_default();
            if edges.insert((&t.from, &t.to)) {
                targets.push(&t.to);
                *in_degree.entry(&t.to).or_default() += 1;
            }
        }

        (
            Self {
                adjacency,
                in_degree,
            },
            checks,
        )
    }

    fn out_degree(&self, state: &State) -> usize {
        self.adjacency.get(state).map_or(0, Vec::len)
    }

    fn in_degree(&self, state: &State) -> usize {
        self.in_degree.get(state).copied().unwrap_or(0)
    }

    /// Breadth-first walk from `start`.
    fn reachable_from(&self, start: &'a State) -> HashSet<&'a State> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(state) = queue.pop_front() {
            for &next in self.adjacency.get(state).into_iter().flatten() {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    fn analyze(&self, initial: &'a State, states: &[State], final_states: &[State]) -> Vec<Check> {
        let finals: HashSet<&State> = final_states.iter().collect();
        let reachable = self.reachable_from(initial);
        let mut checks = vec![check(self.adjacency.contains_key(initial), || {
            DefinitionError::InitialStateHasNoOutgoing(initial.clone())
        })];

        let mut seen: HashSet<&State> = HashSet::new();
        for state in states.iter().filter(|s| seen.insert(*s)) {
            let is_initial = state == initial;
            let is_final = finals.contains(state);
            let (incoming, outgoing) = (self.in_degree(state), self.out_degree(state));

            checks.push(check(incoming > 0 || is_initial, || {
                DefinitionError::HangingState(state.clone())
            }));
            // An initial state without outgoing transitions is already reported above.
            checks.push(check(outgoing > 0 || is_final || is_initial, || {
                DefinitionError::DeadEndState(state.clone())
            }));
            checks.push(check(!is_final || outgoing == 0, || {
                DefinitionError::FinalStateWithOutgoingTransitions(state.clone())
            }));
        }

        let mut seen: HashSet<&State> = HashSet::new();
        for state in final_states.iter().filter(|s| seen.insert(*s)) {
            checks.push(check(reachable.contains(state), || {
                DefinitionError::UnreachableFinalState(state.clone())
            }));
        }

        checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<State> {
        list.iter().map(|s| State::from(*s)).collect()
    }

    fn t(from: &str, to: &str, on: &str) -> Transition {
        Transition::new(from, to, on)
    }

    fn run(
        initial: &str,
        states: &[&str],
        transitions: &[Transition],
        finals: &[&str],
    ) -> Result<(), DefinitionError> {
        validate(&initial.into(), &names(states), transitions, &names(finals))
    }

    fn run_all(
        initial: &str,
        states: &[&str],
        transitions: &[Transition],
        finals: &[&str],
    ) -> Result<(), Vec<DefinitionError>> {
        validate_all(&initial.into(), &names(states), transitions, &names(finals))
    }

    #[test]
    fn document_workflow_is_valid() {
        let transitions = [
            t("Draft", "InReview", "Submit"),
            t("InReview", "Approved", "Approve"),
            t("InReview", "Rejected", "Reject"),
        ];
        let result = run(
            "Draft",
            &["Draft", "InReview", "Approved", "Rejected"],
            &transitions,
            &["Approved", "Rejected"],
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn cycles_and_branches_are_valid() {
        let transitions = [
            t("Start", "PathA", "ChooseA"),
            t("Start", "PathB", "ChooseB"),
            t("PathA", "PathA", "Loop"),
            t("PathA", "End", "Finish"),
            t("PathB", "End", "Finish"),
        ];
        let result = run(
            "Start",
            &["Start", "PathA", "PathB", "End"],
            &transitions,
            &["End"],
        );
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn different_events_between_same_pair_are_allowed() {
        let transitions = [t("A", "B", "Go"), t("A", "B", "Jump")];
        assert_eq!(run("A", &["A", "B"], &transitions, &["B"]), Ok(()));
    }

    #[test]
    fn non_deterministic_targets_are_allowed() {
        let transitions = [t("A", "B", "Go"), t("A", "C", "Go")];
        assert_eq!(run("A", &["A", "B", "C"], &transitions, &["B", "C"]), Ok(()));
    }

    #[test]
    fn initial_state_may_be_reentered() {
        let transitions = [t("A", "B", "Go"), t("B", "A", "Back"), t("B", "C", "Done")];
        assert_eq!(run("A", &["A", "B", "C"], &transitions, &["C"]), Ok(()));
    }

    #[test]
    fn empty_initial_state_is_rejected() {
        let result = run("", &["A"], &[], &[]);
        assert_eq!(result, Err(DefinitionError::EmptyInitialState));
    }

    #[test]
    fn undeclared_initial_state() {
        let transitions = [t("A", "B", "Go")];
        let result = run("Ghost", &["A", "B"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(DefinitionError::UndeclaredState {
                state: "Ghost".into(),
                role: StateRole::Initial,
            })
        );
    }

    #[test]
    fn undeclared_final_state() {
        let transitions = [t("A", "B", "Go")];
        let result = run_all("A", &["A", "B"], &transitions, &["B", "Ghost"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::UndeclaredState {
                state: "Ghost".into(),
                role: StateRole::Final,
            }])
        );
    }

    #[test]
    fn undeclared_transition_source() {
        let transitions = [t("A", "B", "Go"), t("Ghost", "B", "Haunt")];
        let result = run_all("A", &["A", "B"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::UndeclaredState {
                state: "Ghost".into(),
                role: StateRole::TransitionSource,
            }])
        );
    }

    #[test]
    fn undeclared_transition_target() {
        let transitions = [t("A", "B", "Go"), t("A", "Ghost", "Vanish")];
        let result = run_all("A", &["A", "B"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::UndeclaredState {
                state: "Ghost".into(),
                role: StateRole::TransitionTarget,
            }])
        );
    }

    #[test]
    fn undeclared_state_is_reported_once_per_role() {
        let transitions = [t("A", "B", "Go"), t("A", "Ghost", "X"), t("B", "Ghost", "Y")];
        let errors = run_all("A", &["A", "B"], &transitions, &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn duplicate_triplet_is_rejected() {
        let transitions = [t("A", "B", "Go"), t("A", "B", "Go")];
        let result = run_all("A", &["A", "B"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::DuplicateTransition {
                from: "A".into(),
                to: "B".into(),
                on: "Go".into(),
            }])
        );
    }

    #[test]
    fn hanging_state_is_rejected() {
        // Orphan leads to the final state but nothing leads to Orphan.
        let transitions = [t("A", "B", "Go"), t("Orphan", "B", "Go")];
        let result = run_all("A", &["A", "Orphan", "B"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::HangingState("Orphan".into())])
        );
    }

    #[test]
    fn dead_end_state_is_rejected() {
        let transitions = [t("A", "B", "Go"), t("A", "Stuck", "Wander")];
        let result = run_all("A", &["A", "B", "Stuck"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::DeadEndState("Stuck".into())])
        );
    }

    #[test]
    fn final_state_with_outgoing_is_rejected() {
        let transitions = [t("A", "B", "Go"), t("B", "C", "Again"), t("C", "B", "Back")];
        let result = run_all("A", &["A", "B", "C"], &transitions, &["B"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::FinalStateWithOutgoingTransitions(
                "B".into()
            )])
        );
    }

    #[test]
    fn unreachable_final_state_is_rejected() {
        // X and Y feed each other and reach Lost, but the initial state never reaches them.
        let transitions = [
            t("A", "B", "Go"),
            t("X", "Y", "Ping"),
            t("Y", "X", "Pong"),
            t("X", "Lost", "Drop"),
        ];
        let result = run_all("A", &["A", "B", "X", "Y", "Lost"], &transitions, &["B", "Lost"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::UnreachableFinalState("Lost".into())])
        );
    }

    #[test]
    fn initial_state_without_outgoing_is_rejected() {
        let result = run_all("Only", &["Only"], &[], &["Only"]);
        assert_eq!(
            result,
            Err(vec![DefinitionError::InitialStateHasNoOutgoing(
                "Only".into()
            )])
        );
    }

    #[test]
    fn first_reported_error_follows_detection_order() {
        // Hanging (Unreachable has no incoming) is detected before reachability.
        let transitions = [t("Start", "Middle", "Move"), t("Middle", "Reachable", "Reach")];
        let states = ["Start", "Middle", "Reachable", "Unreachable"];
        let finals = ["Reachable", "Unreachable"];

        assert_eq!(
            run("Start", &states, &transitions, &finals),
            Err(DefinitionError::HangingState("Unreachable".into()))
        );

        let all = run_all("Start", &states, &transitions, &finals).unwrap_err();
        assert_eq!(
            all,
            vec![
                DefinitionError::HangingState("Unreachable".into()),
                DefinitionError::UnreachableFinalState("Unreachable".into()),
            ]
        );
    }

    #[test]
    fn structural_errors_suppress_graph_analysis() {
        // The dangling target would otherwise also make B a dead end.
        let transitions = [t("A", "B", "Go"), t("A", "B", "Go"), t("A", "Ghost", "Boo")];
        let errors = run_all("A", &["A", "B"], &transitions, &[]).unwrap_err();
        assert!(errors.iter().all(|e| matches!(
            e,
            DefinitionError::DuplicateTransition { .. } | DefinitionError::UndeclaredState { .. }
        )));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn validation_is_deterministic() {
        let transitions = [t("A", "B", "Go"), t("A", "C", "Go"), t("A", "D", "Go")];
        let states = ["A", "B", "C", "D"];
        let first = run_all("A", &states, &transitions, &[]);
        for _ in 0..10 {
            assert_eq!(run_all("A", &states, &transitions, &[]), first);
        }
        assert_eq!(
            first.unwrap_err(),
            vec![
                DefinitionError::DeadEndState("B".into()),
                DefinitionError::DeadEndState("C".into()),
                DefinitionError::DeadEndState("D".into()),
            ]
        );
    }
}

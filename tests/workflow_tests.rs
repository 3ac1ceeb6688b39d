//! End-to-end workflows through the public API.

use nfaflow::core::{action_fn, extender, guard_fn, payload_as, ActionError, MachineState};
use nfaflow::definition::{Hooks, StateRole};
use nfaflow::loader::load_yaml_str;
use nfaflow::runtime::{FireError, Phase};
use nfaflow::{
    BuildError, Definition, DefinitionBuilder, DefinitionError, Event, Machine, Registry, State,
};
use std::error::Error as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tokio_util::sync::CancellationToken;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn review() -> Arc<Definition> {
    Arc::new(
        DefinitionBuilder::new()
            .initial_state("Draft")
            .final_states(["Approved"])
            .add_transition("Draft", "InReview", "Submit")
            .add_transition("InReview", "Approved", "Approve")
            .with_guards([guard_fn(|_, _, _| true)])
            .build()
            .unwrap(),
    )
}

#[test]
fn submit_then_approve_reaches_final_state() {
    init_tracing();
    let machine = Machine::new(review(), nfaflow::core::no_extender());
    let token = CancellationToken::new();

    assert!(machine.fire(&token, &Event::from("Submit"), None).unwrap());
    assert!(machine.fire(&token, &Event::from("Approve"), None).unwrap());

    assert_eq!(machine.current_state(), "Approved");
    assert!(machine.is_in_final_state());
    let history = machine.history();
    assert_eq!(history.len(), 2);
    assert_eq!(
        (history[0].from.as_str(), history[0].to.as_str(), history[0].on.as_str()),
        ("Draft", "InReview", "Submit")
    );
    assert_eq!(
        (history[1].from.as_str(), history[1].to.as_str(), history[1].on.as_str()),
        ("InReview", "Approved", "Approve")
    );
}

#[test]
fn approve_from_draft_does_nothing() {
    init_tracing();
    let machine = Machine::new(review(), nfaflow::core::no_extender());

    let moved = machine
        .fire(&CancellationToken::new(), &Event::from("Approve"), None)
        .unwrap();

    assert!(!moved);
    assert_eq!(machine.current_state(), "Draft");
    assert!(machine.history().is_empty());
}

#[test]
fn undeclared_target_fails_construction() {
    let err = Definition::new(
        "Draft".into(),
        vec!["Approved".into()],
        vec![
            ("Draft".into(), Default::default()),
            ("Approved".into(), Default::default()),
        ],
        vec![
            nfaflow::Transition::new("Draft", "InReview", "Submit"),
            nfaflow::Transition::new("Draft", "Approved", "Approve"),
        ],
        Hooks::default(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        DefinitionError::UndeclaredState {
            state: "InReview".into(),
            role: StateRole::TransitionTarget,
        }
    );
}

#[test]
fn builder_reports_graph_errors() {
    let err = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Approved", "Archived"])
        .add_transition("Draft", "Approved", "Approve")
        .build()
        .unwrap_err();

    assert_eq!(
        err,
        BuildError::Definition(DefinitionError::HangingState("Archived".into()))
    );
}

#[test]
fn second_candidate_wins_when_first_guard_rejects() {
    let definition = DefinitionBuilder::new()
        .initial_state("InReview")
        .final_states(["Approved", "Escalated"])
        .add_transition("InReview", "Escalated", "Decide")
        .with_guards([guard_fn(|_, _, _| false)])
        .add_transition("InReview", "Approved", "Decide")
        .with_guards([guard_fn(|_, _, _| true)])
        .build()
        .unwrap();
    let machine = Machine::new(Arc::new(definition), nfaflow::core::no_extender());

    assert!(machine
        .fire(&CancellationToken::new(), &Event::from("Decide"), None)
        .unwrap());
    assert_eq!(machine.current_state(), "Approved");
}

#[test]
fn failed_transition_action_changes_nothing() {
    init_tracing();
    let guard_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&guard_calls);
    let definition = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Published"])
        .add_transition("Draft", "Published", "Publish")
        .with_guards([
            guard_fn(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
            guard_fn(|_, _, _| true),
        ])
        .with_actions([action_fn(|_, _, _| Err(ActionError::new("cdn unavailable")))])
        .build()
        .unwrap();
    let machine = Machine::new(Arc::new(definition), nfaflow::core::no_extender());

    let err = machine
        .fire(&CancellationToken::new(), &Event::from("Publish"), None)
        .unwrap_err();

    assert_eq!(guard_calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.phase(), Some(Phase::Transition));
    assert_eq!(
        err.source().map(|s| s.to_string()),
        Some("cdn unavailable".into())
    );
    assert_eq!(machine.current_state(), "Draft");
    assert!(machine.history().is_empty());
}

#[test]
fn hooks_and_phases_run_in_order() {
    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let step = |label: &'static str| {
        let log = Arc::clone(&log);
        action_fn(move |_, _, _| {
            log.lock().unwrap().push(label.to_string());
            Ok(())
        })
    };

    let definition = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Approved"])
        .on_exit("Draft", [step("exit Draft")])
        .on_entry("InReview", [step("enter InReview")])
        .add_transition("Draft", "InReview", "Submit")
        .with_actions([step("submit")])
        .add_transition("InReview", "Approved", "Approve")
        .with_success_hooks([step("success")])
        .with_failure_hooks([step("failure")])
        .build()
        .unwrap();
    let machine = Machine::new(Arc::new(definition), nfaflow::core::no_extender());
    let token = CancellationToken::new();

    machine.fire(&token, &Event::from("Submit"), None).unwrap();
    machine.fire(&token, &Event::from("Submit"), None).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["exit Draft", "submit", "enter InReview", "success", "failure"]
    );
}

#[test]
fn actions_update_the_business_object() {
    struct Document {
        reviewer: Mutex<Option<String>>,
    }

    let definition = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Approved"])
        .add_transition("Draft", "InReview", "Submit")
        .with_actions([action_fn(|_, state: &dyn MachineState, payload| {
            let doc = state
                .extension::<Document>()
                .ok_or_else(|| ActionError::new("expected a Document"))?;
            let reviewer = payload_as::<String>(payload)
                .ok_or_else(|| ActionError::new("expected a reviewer name"))?;
            *doc.reviewer.lock().unwrap() = Some(reviewer.clone());
            Ok(())
        })])
        .add_transition("InReview", "Approved", "Approve")
        .build()
        .unwrap();
    let machine = Machine::new(
        Arc::new(definition),
        extender(Document {
            reviewer: Mutex::new(None),
        }),
    );

    let reviewer = String::from("John Doe");
    machine
        .fire(&CancellationToken::new(), &Event::from("Submit"), Some(&reviewer))
        .unwrap();

    let doc = machine.extension::<Document>().unwrap();
    assert_eq!(doc.reviewer.lock().unwrap().as_deref(), Some("John Doe"));
}

#[test]
fn concurrent_fires_commit_exactly_once() {
    init_tracing();
    let machine = Arc::new(Machine::new(review(), nfaflow::core::no_extender()));
    let token = CancellationToken::new();

    let moved = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let machine = Arc::clone(&machine);
                let token = &token;
                scope.spawn(move || {
                    machine
                        .fire(token, &Event::from("Submit"), None)
                        .unwrap()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|moved| *moved)
            .count()
    });

    assert_eq!(moved, 1);
    assert_eq!(machine.current_state(), "InReview");
    assert_eq!(machine.history().len(), 1);
}

#[test]
fn readers_run_alongside_fires() {
    let definition = Arc::new(
        DefinitionBuilder::new()
            .initial_state("A")
            .final_states(["Done"])
            .add_transition("A", "B", "Flip")
            .add_transition("B", "A", "Flip")
            .add_transition("B", "Done", "Finish")
            .build()
            .unwrap(),
    );
    let machine = Machine::new(definition, nfaflow::core::no_extender());
    let token = CancellationToken::new();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            for _ in 0..200 {
                machine.fire(&token, &Event::from("Flip"), None).unwrap();
            }
        });
        scope.spawn(|| {
            for _ in 0..200 {
                let snapshot = machine.marshal();
                let last_to = snapshot
                    .history
                    .entries()
                    .last()
                    .map(|e| e.to.clone())
                    .unwrap_or_else(|| State::from("A"));
                assert_eq!(snapshot.current_state, last_to);
            }
        });
    });

    assert_eq!(machine.history().len(), 200);
}

#[test]
fn cancellation_token_reaches_guards() {
    let definition = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Sent"])
        .add_transition("Draft", "Sent", "Send")
        .with_guards([guard_fn(|token, _, _| !token.is_cancelled())])
        .build()
        .unwrap();
    let machine = Machine::new(Arc::new(definition), nfaflow::core::no_extender());
    let token = CancellationToken::new();
    token.cancel();

    assert!(!machine.fire(&token, &Event::from("Send"), None).unwrap());
    assert_eq!(machine.current_state(), "Draft");
}

#[test]
fn loaded_definition_runs_registered_collaborators() {
    let approvals = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    registry
        .register_guard(
            "isManager",
            guard_fn(|_, _, payload| payload_as::<&str>(payload) == Some(&"manager")),
        )
        .unwrap();
    let counter = Arc::clone(&approvals);
    registry
        .register_action(
            "countApproval",
            action_fn(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

    let yaml = r#"
initialState: Draft
finalStates: [Approved]
transitions:
  - { from: Draft, to: InReview, on: Submit }
  - { from: InReview, to: Approved, on: Approve, guards: [isManager], actions: [countApproval] }
"#;
    let machine = Machine::new(
        Arc::new(load_yaml_str(yaml, &registry).unwrap()),
        nfaflow::core::no_extender(),
    );
    let token = CancellationToken::new();
    let clerk = "clerk";
    let manager = "manager";

    machine.fire(&token, &Event::from("Submit"), None).unwrap();
    assert!(!machine
        .fire(&token, &Event::from("Approve"), Some(&clerk))
        .unwrap());
    assert!(machine
        .fire(&token, &Event::from("Approve"), Some(&manager))
        .unwrap());

    assert_eq!(approvals.load(Ordering::SeqCst), 1);
    assert!(machine.is_in_final_state());
}

#[test]
fn failure_hook_error_after_action_error_keeps_both() {
    let definition = DefinitionBuilder::new()
        .initial_state("Draft")
        .final_states(["Done"])
        .add_transition("Draft", "Done", "Finish")
        .with_actions([action_fn(|_, _, _| Err("disk full".into()))])
        .with_failure_hooks([action_fn(|_, _, _| Err("pager offline".into()))])
        .build()
        .unwrap();
    let machine = Machine::new(Arc::new(definition), nfaflow::core::no_extender());

    let err = machine
        .fire(&CancellationToken::new(), &Event::from("Finish"), None)
        .unwrap_err();

    match err {
        FireError::HookAfterFailure { cause, hook } => {
            assert_eq!(
                cause.source().map(|s| s.to_string()),
                Some("disk full".into())
            );
            assert_eq!(hook.to_string(), "pager offline");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(machine.current_state(), "Draft");
}

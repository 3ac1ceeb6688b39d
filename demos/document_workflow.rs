//! Document Approval Workflow
//!
//! This example demonstrates a multi-stage approval workflow with guards,
//! actions, hooks and checkpointing.
//!
//! Key concepts:
//! - Non-deterministic choice (Decide goes to Approved or Rejected)
//! - Guards read the business object and the payload
//! - Entry actions and global hooks perform side effects
//! - A checkpoint taken mid-review resumes on a fresh machine
//!
//! Run with: RUST_LOG=debug cargo run --example document_workflow

use nfaflow::checkpoint::Checkpoint;
use nfaflow::core::{action_fn, extender, guard_fn, payload_as, ActionError};
use nfaflow::{events, states, DefinitionBuilder, Event, Machine};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

states! {
    enum DocState {
        Draft,
        InReview,
        Approved,
        Rejected,
    }
    final: [Approved, Rejected]
}

events! {
    enum DocEvent {
        Submit,
        Decide,
    }
}

// Document entity
struct Document {
    id: u64,
    word_count: usize,
    reviewer: Mutex<Option<String>>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Document Approval Workflow ===\n");

    let definition = DefinitionBuilder::new()
        .initial_state(DocState::Draft)
        .final_states(DocState::finals())
        .on_entry(
            DocState::InReview,
            [action_fn(|_, state, payload| {
                let doc = state
                    .extension::<Document>()
                    .ok_or_else(|| ActionError::new("expected a Document"))?;
                let reviewer = payload_as::<&str>(payload).copied().unwrap_or("John Doe");
                *doc.reviewer.lock().map_err(|_| ActionError::new("reviewer lock poisoned"))? =
                    Some(reviewer.to_string());
                println!("  [Action] Document {} assigned to {reviewer}", doc.id);
                Ok(())
            })],
        )
        .add_transition(DocState::Draft, DocState::InReview, DocEvent::Submit)
        .with_guards([guard_fn(|_, state, _| {
            state
                .extension::<Document>()
                .is_some_and(|doc| doc.word_count >= 100)
        })])
        .add_transition(DocState::InReview, DocState::Approved, DocEvent::Decide)
        .with_guards([guard_fn(|_, _, payload| {
            payload_as::<&str>(payload).is_some_and(|verdict| *verdict == "approve")
        })])
        .add_transition(DocState::InReview, DocState::Rejected, DocEvent::Decide)
        .with_success_hooks([action_fn(|_, state, _| {
            println!("  [Hook] Now in {}", state.current_state());
            Ok(())
        })])
        .with_failure_hooks([action_fn(|_, state, _| {
            println!("  [Hook] Nothing happened in {}", state.current_state());
            Ok(())
        })])
        .build()
        .unwrap();
    let definition = Arc::new(definition);

    let doc = Document {
        id: 123,
        word_count: 250,
        reviewer: Mutex::new(None),
    };
    let machine = Machine::new(Arc::clone(&definition), extender(doc));
    let token = CancellationToken::new();

    println!("Step 1: Decide too early");
    let moved = machine
        .fire(&token, &Event::from(DocEvent::Decide), Some(&"approve"))
        .unwrap();
    println!("  moved: {moved}\n");

    println!("Step 2: Submit for review");
    machine
        .fire(&token, &Event::from(DocEvent::Submit), Some(&"Alice"))
        .unwrap();
    println!();

    println!("Step 3: Checkpoint and resume");
    let json = Checkpoint::new(machine.marshal()).to_json().unwrap();
    println!("{json}");
    let snapshot = Checkpoint::from_json(&json).unwrap().into_snapshot();
    let resumed = Machine::restore(
        definition,
        Some(snapshot),
        extender(Document {
            id: 123,
            word_count: 250,
            reviewer: Mutex::new(Some("Alice".to_string())),
        }),
    )
    .unwrap();
    println!("  resumed in {}\n", resumed.current_state());

    println!("Step 4: Decide (not approved, falls through to Rejected)");
    resumed
        .fire(&token, &Event::from(DocEvent::Decide), Some(&"reject"))
        .unwrap();
    println!();

    println!("Final state: {} (final: {})", resumed.current_state(), resumed.is_in_final_state());
    for entry in resumed.history() {
        println!("  {} -> {} on {}", entry.from, entry.to, entry.on);
    }

    println!("\nKey Takeaways:");
    println!("- Candidates are tried in order; the first with passing guards wins");
    println!("- The machine only moves when every action succeeded");
    println!("- Snapshots carry state and history, never guards or actions");
}

//! Rumour Confirmation Workflow
//!
//! `pending -> confirmed` materializes exactly one Transfer and awards the
//! creator a one-time bonus. `pending -> denied` shares the same terminal
//! class. No transition leaves a terminal state.

mod workflow;

pub use workflow::ConfirmationWorkflow;

// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs each dispatched asset's command with `tokio::process::Command` and
//! reports the outcome back to the runtime as a `RuntimeEvent`.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the production
//!   `ProcessExecutorBackend`; tests swap in a fake.
//! - [`executor_loop`] receives work items and bounds how many run at once
//!   per studio.
//! - [`task_runner`] runs a single asset's command.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, ProcessExecutorBackend};
pub use executor_loop::spawn_executor;

//! # Task System Core Traits
//!
//! This module defines the unit of work the task system moves between threads.
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task's `Output` is sent back over the worker's result channel
//! 4. The main thread collects outputs in `TaskManager::process_completed_tasks()`
//!
//! ## Thread Safety
//! - `Task` must be `Send` to be transferred to a worker
//! - `Task` must be `Clone` so work lost with a dead worker can be rerun
//! - `Output` must be `Send` to be transferred back to the main thread
//! - Tasks own all of their data; workers never see shared game state

/// A self-contained unit of work executed on a background worker.
///
/// # Implementation Guidelines
/// - Should be relatively coarse-grained to amortize scheduling overhead
/// - Must not hold references to state that the main thread mutates
/// - Should be pure: the same task always produces the same output
pub trait Task: Clone + Send + 'static {
    /// What the task produces.
    type Output: Send + 'static;

    /// Performs the work on a worker thread.
    fn process(self) -> Self::Output;
}

/// Messages understood by a worker thread.
pub(super) enum WorkerMessage<T> {
    /// Run a task and send back its output.
    Run(T),
    /// Exit the worker loop.
    Shutdown,
}

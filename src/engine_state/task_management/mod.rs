//! # Task Management System
//!
//! This module provides a small worker pool for running pure, CPU-bound work
//! (chunk generation and meshing) off the main thread.
//!
//! ## Architecture Overview
//!
//! - `TaskManager`: Central coordinator for task distribution and worker management
//! - `Task`: A unit of work that can be executed on a worker
//! - `TaskChannel`: Communication channel between the main thread and one worker
//!
//! Each worker owns a request channel and a result channel. Workers block on
//! their request channel and exit only when they receive the shutdown sentinel
//! (or the manager is gone). The main thread never blocks: it publishes tasks,
//! keeps overflow in a FIFO queue, and drains finished results with a budget.
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `TaskManager::publish_task()`
//! 2. The manager distributes tasks to worker channels using round-robin
//! 3. Workers process tasks and send back their outputs
//! 4. Outputs are collected on the main thread in `process_completed_tasks()`
//! 5. Dropping the manager sends the shutdown sentinel and joins every worker
//!
//! A worker that dies takes its in-flight tasks with it. The manager keeps a
//! copy of every dispatched task and puts the ones that never produced an
//! output back at the front of its queue, so the surviving workers run them.
//!
//! ## Example Usage
//! ```rust
//! use voxel_arena::engine_state::task_management::{task::Task, TaskManager};
//!
//! #[derive(Clone)]
//! struct Square(u64);
//!
//! impl Task for Square {
//!     type Output = u64;
//!     fn process(self) -> u64 {
//!         self.0 * self.0
//!     }
//! }
//!
//! let mut task_manager = TaskManager::new(2);
//! task_manager.publish_task(Square(7));
//!
//! let mut results = Vec::new();
//! while results.is_empty() {
//!     task_manager.process_queued_tasks();
//!     results.extend(task_manager.process_completed_tasks(usize::MAX).unwrap());
//! }
//! assert_eq!(results, vec![49]);
//! ```

pub mod task;

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use task::{Task, WorkerMessage};

use crate::core::error::StreamerError;

/// Maximum number of tasks that can be in flight per worker channel.
///
/// Keeps each worker fed between main-thread ticks while leaving most of the
/// backlog in the manager's queue, where it stays in FIFO order.
pub const MAX_TASKS_IN_FLIGHT: usize = 4;

/// A communication channel between the main thread and a worker thread.
///
/// # Fields
/// - `task_sender`: Sends tasks from main thread to worker
/// - `result_receiver`: Receives task outputs from worker
/// - `in_flight`: Copies of the dispatched tasks without an output yet, oldest first
/// - `connected`: Cleared once the worker is found to have hung up
/// - `worker`: Handle to the worker thread, joined on drop
struct TaskChannel<T: Task> {
    task_sender: Sender<WorkerMessage<T>>,
    result_receiver: Receiver<T::Output>,
    in_flight: VecDeque<T>,
    connected: bool,
    worker: Option<JoinHandle<()>>,
}

/// Manages a pool of worker threads and coordinates task execution.
///
/// The `TaskManager` is responsible for:
/// - Creating and joining worker threads
/// - Distributing tasks across available workers
/// - Collecting task outputs with a per-call budget
/// - Queuing tasks when all workers are busy
pub struct TaskManager<T: Task> {
    channels: Vec<TaskChannel<T>>,
    queued_tasks: VecDeque<T>,
    current_channel: usize,
    drain_channel: usize,
}

impl<T: Task> TaskManager<T> {
    /// Creates a new `TaskManager` with the specified number of worker threads.
    ///
    /// # Arguments
    /// * `num_workers` - Number of worker threads to create
    ///
    /// # Panics
    /// Panics if the underlying thread creation fails.
    pub fn new(num_workers: usize) -> Self {
        let mut channels = Vec::with_capacity(num_workers);

        info!(
            "Starting {} generation worker(s), available parallelism: {:?}",
            num_workers,
            thread::available_parallelism()
        );

        for worker_index in 0..num_workers {
            let (task_tx, task_rx) = channel::<WorkerMessage<T>>();
            let (result_tx, result_rx) = channel::<T::Output>();

            let task_closure = move || {
                while let Ok(WorkerMessage::Run(task)) = task_rx.recv() {
                    if result_tx.send(task.process()).is_err() {
                        break;
                    }
                }
                debug!("Worker {} exiting", worker_index);
            };

            let worker = thread::Builder::new()
                .name(format!("chunk-worker-{worker_index}"))
                .spawn(task_closure)
                .expect("failed to spawn worker thread");

            channels.push(TaskChannel {
                task_sender: task_tx,
                result_receiver: result_rx,
                in_flight: VecDeque::new(),
                connected: true,
                worker: Some(worker),
            });
        }

        TaskManager {
            channels,
            queued_tasks: VecDeque::new(),
            current_channel: 0,
            drain_channel: 0,
        }
    }

    /// Attempts to send a task to a specific worker channel.
    ///
    /// # Returns
    /// - `Ok(())` if the task was sent to the worker
    /// - `Err(task)` if the worker has disconnected, returning the task for requeueing
    fn try_send_task(&mut self, task: T, channel_idx: usize) -> Result<(), T> {
        let copy = task.clone();
        let channel = &mut self.channels[channel_idx];
        match channel.task_sender.send(WorkerMessage::Run(task)) {
            Ok(()) => {
                channel.in_flight.push_back(copy);
                Ok(())
            }
            Err(_) => {
                warn!("Worker {} disconnected while sending a task", channel_idx);
                self.disconnect(channel_idx);
                Err(copy)
            }
        }
    }

    /// Marks a worker as gone and requeues the tasks it never finished.
    fn disconnect(&mut self, channel_idx: usize) {
        let channel = &mut self.channels[channel_idx];
        channel.connected = false;
        let lost = std::mem::take(&mut channel.in_flight);
        if !lost.is_empty() {
            warn!("Requeueing {} task(s) lost with worker {}", lost.len(), channel_idx);
        }
        for task in lost.into_iter().rev() {
            self.queued_tasks.push_front(task);
        }
    }

    /// Finds a connected worker channel below `MAX_TASKS_IN_FLIGHT`, round-robin from the last used one.
    fn find_available_channel(&self) -> Option<usize> {
        let len = self.channels.len();
        (0..len)
            .map(|offset| (self.current_channel + offset) % len)
            .find(|&idx| {
                let channel = &self.channels[idx];
                channel.connected && channel.in_flight.len() < MAX_TASKS_IN_FLIGHT
            })
    }

    /// Publishes a new task for execution.
    ///
    /// # Returns
    /// - `true` if the task was immediately scheduled on an available worker
    /// - `false` if the task was queued because all workers are busy
    pub fn publish_task(&mut self, task: T) -> bool {
        if !self.queued_tasks.is_empty() {
            self.queued_tasks.push_back(task);
            self.process_queued_tasks();
            return false;
        }

        match self.find_available_channel() {
            Some(channel_idx) => match self.try_send_task(task, channel_idx) {
                Ok(()) => {
                    self.current_channel = (channel_idx + 1) % self.channels.len();
                    true
                }
                Err(task) => {
                    self.queued_tasks.push_back(task);
                    false
                }
            },
            None => {
                self.queued_tasks.push_back(task);
                false
            }
        }
    }

    /// Moves queued tasks onto workers until the queue is empty or all workers are busy.
    ///
    /// Tasks are dispatched in FIFO order.
    pub fn process_queued_tasks(&mut self) {
        while let Some(channel_idx) = self.find_available_channel() {
            let Some(task) = self.queued_tasks.pop_front() else {
                return;
            };
            match self.try_send_task(task, channel_idx) {
                Ok(()) => self.current_channel = (channel_idx + 1) % self.channels.len(),
                Err(task) => self.queued_tasks.push_front(task),
            }
        }
    }

    /// Collects up to `budget` finished outputs without blocking.
    ///
    /// Channels are visited round-robin across calls so one busy worker cannot
    /// starve the others when the budget is small.
    ///
    /// # Errors
    /// `StreamerError::WorkersDisconnected` once every worker has hung up.
    pub fn process_completed_tasks(&mut self, budget: usize) -> Result<Vec<T::Output>, StreamerError> {
        let mut outputs = Vec::new();
        let len = self.channels.len();

        for offset in 0..len {
            if outputs.len() >= budget {
                break;
            }
            let idx = (self.drain_channel + offset) % len;
            while outputs.len() < budget {
                let channel = &mut self.channels[idx];
                match channel.result_receiver.try_recv() {
                    Ok(output) => {
                        channel.in_flight.pop_front();
                        outputs.push(output);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        if channel.connected {
                            warn!("Worker {} disconnected", idx);
                            self.disconnect(idx);
                        }
                        break;
                    }
                }
            }
        }
        if len > 0 {
            self.drain_channel = (self.drain_channel + 1) % len;
        }

        if outputs.is_empty() && self.channels.iter().all(|channel| !channel.connected) {
            return Err(StreamerError::WorkersDisconnected);
        }
        Ok(outputs)
    }

    /// Number of tasks dispatched to workers whose outputs have not been collected.
    pub fn tasks_in_flight(&self) -> usize {
        self.channels
            .iter()
            .map(|channel| channel.in_flight.len())
            .sum()
    }

    /// Number of tasks waiting for a free worker.
    pub fn queued_task_count(&self) -> usize {
        self.queued_tasks.len()
    }
}

impl<T: Task> Drop for TaskManager<T> {
    fn drop(&mut self) {
        for channel in &self.channels {
            let _ = channel.task_sender.send(WorkerMessage::Shutdown);
        }
        for channel in &mut self.channels {
            if let Some(worker) = channel.worker.take() {
                if worker.join().is_err() {
                    warn!("A worker thread panicked before shutdown");
                }
            }
        }
    }
}

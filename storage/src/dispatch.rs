//! Delivery of results onto the caller's execution context.
//!
//! Blocking work runs on a worker thread. Whatever the worker produces is handed to a
//! [`Dispatcher`], which decides where the completion actually runs. UI shells hand in a
//! [`MainQueueHandle`] and drain the matching [`MainQueue`] from their main loop.

use async_channel::{Receiver, Sender};

/// A unit of work delivered to a [`Dispatcher`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs completions on a particular execution context.
pub trait Dispatcher: Send + Sync {
    /// Schedule `job` to run on this dispatcher's context.
    fn dispatch(&self, job: Job);
}

impl<F> Dispatcher for F
where
    F: Fn(Job) + Send + Sync,
{
    fn dispatch(&self, job: Job) {
        self(job);
    }
}

/// Runs completions right away on whichever thread finished the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Dispatcher for Immediate {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// A queue of completions owned by one context, typically the UI thread.
///
/// Handles can be cloned freely and sent to worker threads; the queue itself
/// stays with the context that runs the jobs.
///
/// # Example
///
/// ```
/// use ubiquity_storage::{Dispatcher, MainQueue};
///
/// let queue = MainQueue::new();
/// let handle = queue.handle();
///
/// std::thread::spawn(move || {
///     handle.dispatch(Box::new(|| println!("runs on the owning thread")));
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(queue.run_pending(), 1);
/// ```
#[derive(Debug)]
pub struct MainQueue {
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl MainQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::unbounded();
        Self { sender, receiver }
    }

    /// A dispatcher that posts jobs onto this queue.
    #[must_use]
    pub fn handle(&self) -> MainQueueHandle {
        MainQueueHandle {
            sender: self.sender.clone(),
        }
    }

    /// Run every job queued so far without blocking. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run jobs as they arrive until every handle is dropped.
    ///
    /// The queue keeps a sender of its own for [`handle`](Self::handle), so this
    /// consumes the queue to let the channel close.
    pub async fn run(self) {
        let Self { sender, receiver } = self;
        drop(sender);
        while let Ok(job) = receiver.recv().await {
            job();
        }
    }

    /// Number of jobs waiting to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether no jobs are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Posts jobs onto a [`MainQueue`].
#[derive(Debug, Clone)]
pub struct MainQueueHandle {
    sender: Sender<Job>,
}

impl Dispatcher for MainQueueHandle {
    fn dispatch(&self, job: Job) {
        if self.sender.try_send(job).is_err() {
            log::warn!("main queue is gone, dropping completion");
        }
    }
}

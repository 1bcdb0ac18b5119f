//! Single-threaded UI dispatch queue.
//!
//! Every chrome mutation runs as a task taken from this queue, in FIFO order.
//! Engine callbacks and input readers hold a [`Poster`] and never touch
//! chrome state themselves.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::engine::{EngineEvent, EventSink};

/// FIFO of tasks for the UI context.
pub struct DispatchQueue<T> {
    sender: UnboundedSender<T>,
    receiver: UnboundedReceiver<T>,
}

impl<T> DispatchQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// A handle for posting tasks from any thread.
    pub fn poster(&self) -> Poster<T> {
        Poster {
            sender: self.sender.clone(),
        }
    }

    /// Wait for the next task.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take the next task if one is ready.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Take every task that is ready, in posting order.
    pub fn drain(&mut self) -> Vec<T> {
        let mut tasks = Vec::new();
        while let Some(task) = self.try_next() {
            tasks.push(task);
        }
        tasks
    }
}

impl<T> Default for DispatchQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable sender side of a [`DispatchQueue`].
pub struct Poster<T> {
    sender: UnboundedSender<T>,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> Poster<T> {
    /// Post a task. Returns `false` if the queue is gone.
    pub fn post(&self, task: T) -> bool {
        if self.sender.send(task).is_err() {
            warn!("dispatch queue closed, task dropped");
            return false;
        }
        true
    }
}

impl<T> Poster<T>
where
    T: From<EngineEvent> + Send + 'static,
{
    /// An engine event sink feeding this queue.
    pub fn event_sink(&self) -> EventSink {
        let poster = self.clone();
        EventSink::new(move |event| poster.post(T::from(event)))
    }
}

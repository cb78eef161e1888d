//! Bounded worker pool and delivery handles.

use super::config::PoolConfig;
use super::error::{ConfigError, DeliveryError};
use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// A unit of delivery work.
pub(crate) type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Fixed set of workers draining a bounded queue.
///
/// Submitting never waits: a full queue rejects the job. Workers stop once
/// the pool is dropped and the queue has drained.
pub(crate) struct WorkerPool {
    sender: mpsc::Sender<Job>,
    capacity: usize,
}

impl Debug for WorkerPool {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("pending", &(self.capacity - self.sender.capacity()))
            .finish()
    }
}

impl WorkerPool {
    /// Spawn the workers on the current Tokio runtime.
    pub(crate) fn start(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| ConfigError::NoRuntime)?;

        let (sender, receiver) = mpsc::channel::<Job>(config.queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        for worker in 0..config.workers {
            runtime.spawn(run_worker(worker, Arc::clone(&receiver)));
        }

        Ok(Self {
            sender,
            capacity: config.queue_capacity,
        })
    }

    /// Queue a job, rejecting it if the queue is full.
    pub(crate) fn submit(&self, job: Job) -> Result<(), DeliveryError> {
        self.sender.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::QueueFull {
                capacity: self.capacity,
            },
            TrySendError::Closed(_) => DeliveryError::PoolShutDown,
        })
    }
}

async fn run_worker(worker: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>) {
    let _ = worker;
    loop {
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        // Each job gets its own task so a panic stays contained there.
        if let Err(_e) = tokio::spawn(job).await {
            #[cfg(feature = "tracing")]
            warn!(worker, error = %_e, "Delivery job aborted");
        }
    }

    #[cfg(feature = "tracing")]
    debug!(worker, "Delivery worker stopped");
}

/// Pending result of a dispatched delivery.
///
/// Resolves to `true` only if the gateway accepted the message. Every other
/// ending (gateway failure, transport error, cancellation, or a job that died
/// without reporting) resolves to `false`.
///
/// Dropping the handle detaches from the delivery without stopping it; use
/// [`DeliveryHandle::cancel`] to stop it.
pub struct DeliveryHandle {
    receiver: oneshot::Receiver<bool>,
    cancel: CancellationToken,
}

impl Debug for DeliveryHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl DeliveryHandle {
    pub(crate) fn new(receiver: oneshot::Receiver<bool>, cancel: CancellationToken) -> Self {
        Self { receiver, cancel }
    }

    /// Stop the delivery if its outcome has not been recorded yet.
    ///
    /// A delivery whose outcome was already recorded is unaffected.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true if [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Future for DeliveryHandle {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(delivered)) => Poll::Ready(delivered),
            Poll::Ready(Err(_)) => {
                #[cfg(feature = "tracing")]
                if !self.cancel.is_cancelled() {
                    warn!("No response or error observed for delivery");
                }
                Poll::Ready(false)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

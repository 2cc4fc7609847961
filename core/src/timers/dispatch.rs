//! Single callback context
//!
//! Every listener callback runs on one dispatcher task, in the order it was
//! queued. Queuing never blocks the caller.

use std::panic::{AssertUnwindSafe, catch_unwind};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone)]
pub struct CallbackDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl CallbackDispatcher {
    pub fn spawn(runtime: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        runtime.spawn(async move {
            while let Some(job) = rx.recv().await {
                if catch_unwind(AssertUnwindSafe(job)).is_err() {
                    tracing::error!("timer callback panicked");
                }
            }
        });

        Self { tx }
    }

    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            tracing::debug!("callback dispatcher closed, dropping callback");
        }
    }

    /// Resolves once every callback queued before this call has run
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.dispatch(move || {
            let _ = done_tx.send(());
        });
        let _ = done_rx.await;
    }
}

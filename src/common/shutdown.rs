use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-shot shutdown signal shared between a controller and background loops.
#[derive(Debug, Default)]
pub struct Shutdown {
    done: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown(&self) {
        self.done.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutdown(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Resolves once [`Shutdown::shutdown`] has been called.
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_shutdown() {
                return;
            }
            notified.await;
        }
    }
}

use std::fmt;

use tokio::task::JoinHandle;

/// Scoped registration of a listener or background watcher.
///
/// The release action runs exactly once: on [`Subscription::unsubscribe`] or on
/// drop, whichever comes first. Holding the guard is what keeps the listener
/// attached.
#[must_use = "dropping a Subscription detaches it immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Ties the lifetime of a spawned task to the guard.
    pub fn from_task<T: Send + 'static>(task: JoinHandle<T>) -> Self {
        Self::new(move || task.abort())
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

//! Idempotent cleanup handle

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

type Callback = Box<dyn FnOnce() + Send>;

struct Inner {
    closed: AtomicBool,
    callback: Mutex<Option<Callback>>,
}

/// Cloneable close handle whose callback runs at most once
///
/// Every clone shares the same state, so the handle can be closed directly,
/// by a row sequence reaching its end, or from an external registry. Closing
/// again is a no-op.
#[derive(Clone)]
pub struct Cleanup {
    inner: Arc<Inner>,
}

impl Cleanup {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self::from_option(Some(Box::new(callback)))
    }

    /// A handle with nothing to release
    pub fn noop() -> Self {
        Self::from_option(None)
    }

    fn from_option(callback: Option<Callback>) -> Self {
        Self {
            inner: Arc::new(Inner {
                closed: AtomicBool::new(false),
                callback: Mutex::new(callback),
            }),
        }
    }

    /// Run the callback if no clone has run it yet
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let callback = match self.inner.callback.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(callback) = callback {
            debug!("Running response cleanup");
            callback();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// A handle that closes `self` and then `next`
    pub fn chain(&self, next: Cleanup) -> Cleanup {
        let first = self.clone();
        Cleanup::new(move || {
            first.close();
            next.close();
        })
    }
}

impl Default for Cleanup {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting() -> (Cleanup, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let cleanup = Cleanup::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (cleanup, count)
    }

    #[test]
    fn test_runs_once_across_clones() {
        let (cleanup, count) = counting();
        let other = cleanup.clone();
        cleanup.close();
        other.close();
        cleanup.close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(other.is_closed());
    }

    #[test]
    fn test_concurrent_close() {
        let (cleanup, count) = counting();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let c = cleanup.clone();
                std::thread::spawn(move || c.close())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_chain_closes_both() {
        let (first, a) = counting();
        let (second, b) = counting();
        let chained = first.chain(second.clone());
        chained.close();
        first.close();
        second.close();
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }
}

use std::sync::Mutex;

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
               Subscription
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Keeps an observer registered until cancelled or dropped.
#[must_use = "dropping a Subscription unregisters its observer"]
pub struct Subscription {
    cancel: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Subscription {
            cancel: Mutex::new(Some(Box::new(cancel))),
        }
    }

    pub fn cancel(&self) {
        let cancel = self.cancel.lock().unwrap().take();
        if let Some(cancel) = cancel {
            cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.lock().unwrap().is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Subscriptions that are released together, exactly once.
pub struct SubscriptionSet {
    subs: Mutex<Option<Vec<Subscription>>>,
}

impl Default for SubscriptionSet {
    fn default() -> Self {
        SubscriptionSet::new()
    }
}

impl SubscriptionSet {
    pub fn new() -> Self {
        SubscriptionSet {
            subs: Mutex::new(Some(Vec::new())),
        }
    }

    /// Adding to a disposed set cancels `sub` right away.
    pub fn add(&self, sub: Subscription) {
        let mut subs = self.subs.lock().unwrap();
        match subs.as_mut() {
            Some(v) => v.push(sub),
            None => {
                drop(subs);
                sub.cancel();
            }
        }
    }

    /// Returns `false` if the set was already disposed.
    pub fn dispose(&self) -> bool {
        let subs = self.subs.lock().unwrap().take();
        match subs {
            Some(subs) => {
                for sub in subs {
                    sub.cancel();
                }
                true
            }
            None => false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.subs.lock().unwrap().is_none()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn counting(count: &Arc<AtomicUsize>) -> Subscription {
        let count = count.clone();
        Subscription::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn cancel_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let sub = counting(&count);
        assert!(!sub.is_cancelled());

        sub.cancel();
        sub.cancel();
        drop(sub);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let count = Arc::new(AtomicUsize::new(0));
        drop(counting(&count));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_dispose_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let set = SubscriptionSet::new();
        set.add(counting(&count));
        set.add(counting(&count));

        assert!(set.dispose());
        assert!(set.is_disposed());
        assert!(!set.dispose());
        assert_eq!(count.load(Ordering::SeqCst), 2);

        set.add(counting(&count));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}

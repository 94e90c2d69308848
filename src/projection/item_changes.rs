use {
    crate::{
        buffer::vec::VecDiff,
        view::{
            observer::deliver, Observer, ObserverBroadcast, OuterViewPort, Subscription, View,
            ViewPort,
        },
        Result,
    },
    std::sync::{Arc, RwLock, Weak},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// An element that announces its own changes and has an identity
/// independent of its current value.
pub trait ObservableItem: Clone + Send + Sync + 'static {
    type View: View<Msg = ()> + ?Sized + 'static;

    fn change_port(&self) -> OuterViewPort<Self::View>;
    fn same_item(&self, other: &Self) -> bool;
}

/// View whose messages are the elements that just changed.
pub type ItemChanges<T> = RwLock<ItemChangeTracker<T>>;

impl<T> OuterViewPort<RwLock<Vec<T>>>
where
    T: ObservableItem,
{
    /// Watches every element of this vector and re-publishes their changes.
    ///
    /// The returned subscription keeps the watch alive; cancelling it
    /// releases the per-element subscriptions as well.
    pub fn item_changes(&self) -> (OuterViewPort<ItemChanges<T>>, Subscription) {
        let port = ViewPort::new();

        let tracker = Arc::new(RwLock::new(ItemChangeTracker {
            src_view: None,
            watches: Vec::new(),
            cast: Arc::downgrade(&port.inner().get_broadcast()),
        }));

        let src_sub = self.add_observer(tracker.clone());
        port.inner().set_view(Some(tracker.clone()));

        let sub = Subscription::new(move || {
            src_sub.cancel();
            tracker.write().unwrap().detach();
        });
        (port.into_outer(), sub)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Keeps one subscription per source element, aligned with the source positions.
pub struct ItemChangeTracker<T>
where
    T: ObservableItem,
{
    src_view: Option<Arc<RwLock<Vec<T>>>>,
    watches: Vec<Subscription>,
    cast: Weak<RwLock<ObserverBroadcast<ItemChanges<T>>>>,
}

impl<T> ItemChangeTracker<T>
where
    T: ObservableItem,
{
    fn watch(&self, item: &T) -> Subscription {
        let cast = self.cast.clone();
        let changed = item.clone();

        item.change_port().add_notify_fn(move |_: &()| match cast.upgrade() {
            Some(cast) => {
                let observers = cast.read().unwrap().snapshot();
                deliver(observers, &changed)
            }
            None => Ok(()),
        })
    }

    fn watch_all(&mut self) {
        self.watches.clear();
        if let Some(src) = self.src_view.clone() {
            let watches = src.read().unwrap().iter().map(|item| self.watch(item)).collect();
            self.watches = watches;
        }
    }

    /// Number of elements currently watched.
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Stops watching every element.
    pub fn detach(&mut self) {
        self.watches.clear();
        self.src_view = None;
    }
}

impl<T> View for ItemChangeTracker<T>
where
    T: ObservableItem,
{
    type Msg = T;
}

impl<T> Observer<RwLock<Vec<T>>> for ItemChangeTracker<T>
where
    T: ObservableItem,
{
    fn reset(&mut self, view: Option<Arc<RwLock<Vec<T>>>>) {
        self.src_view = view;
        self.watch_all();
    }

    fn notify(&mut self, diff: &VecDiff<T>) -> Result<()> {
        // detached while this edit was being delivered
        if self.src_view.is_none() {
            return Ok(());
        }

        match diff {
            VecDiff::Reset => self.watch_all(),
            VecDiff::Insert { idx, val } => {
                let watch = self.watch(val);
                self.watches.insert(*idx, watch);
            }
            VecDiff::Remove { idx, .. } => {
                self.watches.remove(*idx);
            }
            VecDiff::Update { idx, val, .. } => {
                self.watches[*idx] = self.watch(val);
            }
            VecDiff::Move { from, to, .. } => {
                let watch = self.watches.remove(*from);
                self.watches.insert(*to, watch);
            }
            VecDiff::InsertMany { idx, vals } => {
                let watches: Vec<_> = vals.iter().map(|val| self.watch(val)).collect();
                self.watches.splice(*idx..*idx, watches);
            }
        }
        Ok(())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{singleton::SingletonBuffer, vec::VecBuffer};
    use std::sync::Mutex;

    fn record(
        port: &OuterViewPort<ItemChanges<SingletonBuffer<i32>>>,
    ) -> (Arc<Mutex<Vec<i32>>>, Subscription) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sub = port.add_notify_fn({
            let log = log.clone();
            move |item: &SingletonBuffer<i32>| {
                log.lock().unwrap().push(item.get());
                Ok(())
            }
        });
        (log, sub)
    }

    #[test]
    fn reports_changed_items() {
        let a = SingletonBuffer::new(1);
        let b = SingletonBuffer::new(2);
        let mut buffer = VecBuffer::with_data(vec![a.clone(), b.clone()]);

        let (port, _watch) = buffer.get_port().item_changes();
        let (log, _sub) = record(&port);

        b.clone().set(20).unwrap();
        a.clone().set(10).unwrap();
        assert_eq!(*log.lock().unwrap(), vec![20, 10]);

        let c = SingletonBuffer::new(3);
        buffer.insert(1, c.clone()).unwrap();
        c.clone().set(30).unwrap();

        buffer.remove(0).unwrap();
        a.clone().set(100).unwrap();

        assert_eq!(*log.lock().unwrap(), vec![20, 10, 30]);
        assert_eq!(port.get_view().map(|t| t.read().unwrap().len()), Some(2));
    }

    #[test]
    fn follows_updates_moves_and_resets() {
        let a = SingletonBuffer::new(1);
        let b = SingletonBuffer::new(2);
        let mut buffer = VecBuffer::with_data(vec![a.clone(), b.clone()]);

        let (port, _watch) = buffer.get_port().item_changes();
        let (log, _sub) = record(&port);

        let c = SingletonBuffer::new(3);
        buffer.update(0, c.clone()).unwrap();
        a.clone().set(-1).unwrap();
        c.clone().set(30).unwrap();

        buffer.move_item(0, 1).unwrap();
        buffer.extend(vec![SingletonBuffer::new(4)]).unwrap();
        assert_eq!(port.get_view().map(|t| t.read().unwrap().len()), Some(3));

        let d = SingletonBuffer::new(5);
        buffer.reset(vec![d.clone()]).unwrap();
        b.clone().set(-2).unwrap();
        d.clone().set(50).unwrap();

        assert_eq!(*log.lock().unwrap(), vec![30, 50]);
    }

    #[test]
    fn ignores_edits_delivered_after_detach() {
        let a = SingletonBuffer::new(1);
        let b = SingletonBuffer::new(2);
        let buffer = VecBuffer::with_data(vec![a.clone(), b.clone()]);

        let (port, _watch) = buffer.get_port().item_changes();
        let tracker = port.get_view().unwrap();
        let mut tracker = tracker.write().unwrap();
        tracker.detach();

        let moved = VecDiff::Move { from: 0, to: 1, val: a.clone() };
        assert_eq!(tracker.notify(&moved), Ok(()));

        let batch = VecDiff::InsertMany { idx: 2, vals: vec![SingletonBuffer::new(3)] };
        assert_eq!(tracker.notify(&batch), Ok(()));
        assert_eq!(tracker.notify(&VecDiff::Reset), Ok(()));
        assert!(tracker.is_empty());
    }

    #[test]
    fn cancel_releases_all_watches() {
        let a = SingletonBuffer::new(1);
        let buffer = VecBuffer::with_data(vec![a.clone()]);

        let (port, watch) = buffer.get_port().item_changes();
        let (log, _sub) = record(&port);
        assert_eq!(a.get_port().observer_count(), 1);

        watch.cancel();
        assert_eq!(a.get_port().observer_count(), 0);
        assert_eq!(buffer.get_port().observer_count(), 0);

        a.clone().set(7).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }
}

use {
    crate::{
        buffer::vec::VecDiff,
        config::{FilterConfig, ResetPolicy},
        projection::{
            index_table::IndexTable,
            item_changes::{ItemChanges, ObservableItem},
        },
        view::{
            list::{ListDiff, ListView},
            observer::deliver,
            ObserverBroadcast, Observer, OuterViewPort, SubscriptionSet, View, ViewPort,
        },
        Error, Result,
    },
    std::sync::{Arc, RwLock},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// The materialized filtered view together with its translation table.
///
/// `items` holds exactly the source elements whose slot in `table` is
/// `Some`, in source order.
pub struct FilteredItems<T>
where
    T: Clone + Send + Sync + 'static,
{
    table: IndexTable,
    items: Vec<T>,
    count: usize,
    pending: Vec<ListDiff<T>>,
}

impl<T> FilteredItems<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn new() -> Self {
        FilteredItems {
            table: IndexTable::new(),
            items: Vec::new(),
            count: 0,
            pending: Vec::new(),
        }
    }

    pub fn table(&self) -> &IndexTable {
        &self.table
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Item count as tracked by the emitted notifications.
    pub fn count(&self) -> usize {
        self.count
    }

    fn record(&mut self, diff: ListDiff<T>) {
        match &diff {
            ListDiff::Insert { .. } => self.count += 1,
            ListDiff::Remove { .. } => self.count -= 1,
            ListDiff::Clear => self.count = 0,
            ListDiff::Update { .. } => {}
        }
        self.pending.push(diff);
    }

    fn appear(&mut self, src_idx: usize, item: &T) {
        let idx = self.table.appear(src_idx);
        self.items.insert(idx, item.clone());
        tracing::trace!(src_idx, idx, "item appeared");
        self.record(ListDiff::Insert {
            idx,
            val: item.clone(),
        });
    }

    /// `announced` is the item carried by the `Remove` notification.
    fn disappear(&mut self, src_idx: usize, announced: &T) {
        if let Some(idx) = self.table.disappear(src_idx) {
            self.items.remove(idx);
            tracing::trace!(src_idx, idx, "item disappeared");
            self.record(ListDiff::Remove {
                idx,
                val: announced.clone(),
            });
        }
    }

    /// Replaces table and items with a fresh scan of `src`, recording one
    /// `Insert` per passing item. Callers record any preceding `Clear`.
    fn rebuild(&mut self, src: &[T], pred: impl Fn(&T) -> bool) {
        self.table = IndexTable::from_flags(src.iter().map(|item| pred(item)));
        self.items = src
            .iter()
            .zip(self.table.slots())
            .filter(|(_, slot)| slot.is_some())
            .map(|(item, _)| item.clone())
            .collect();

        for (idx, val) in self.items.clone().into_iter().enumerate() {
            self.record(ListDiff::Insert { idx, val });
        }
    }

    fn check(&self, src_len: usize) -> Result<()> {
        if self.table.len() != src_len {
            return Err(Error::invariant(format!(
                "translation table has {} slots for {src_len} source items",
                self.table.len()
            )));
        }
        self.table.check()?;
        if self.items.len() != self.table.count() || self.count != self.items.len() {
            return Err(Error::invariant(format!(
                "view holds {} items, table counts {}, notifications count {}",
                self.items.len(),
                self.table.count(),
                self.count
            )));
        }
        Ok(())
    }

    fn take_pending(&mut self) -> Vec<ListDiff<T>> {
        std::mem::take(&mut self.pending)
    }
}

impl<T> View for FilteredItems<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ListDiff<T>;
}

impl<T> ListView<T> for FilteredItems<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn len(&self) -> Option<usize> {
        Some(self.items.len())
    }

    fn get(&self, idx: &usize) -> Option<T> {
        self.items.get(*idx).cloned()
    }
}

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
            Filter Projection
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Observes a source vector (and optionally its item changes) and keeps
/// [`FilteredItems`] in sync, announcing every change as a [`ListDiff`].
///
/// Downstream observers are notified after the view has been updated and
/// while the source edit is still being processed. They may read the
/// filtered view, but must not edit the source from inside `notify`.
pub struct FilterProjection<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    src_view: Option<Arc<RwLock<Vec<T>>>>,
    pred: P,
    config: FilterConfig,
    state: Arc<RwLock<FilteredItems<T>>>,
    subscriptions: Arc<SubscriptionSet>,
    cast: Arc<RwLock<ObserverBroadcast<dyn ListView<T>>>>,
}

impl<T, P> FilterProjection<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    /// `subscriptions` is released when an edit leaves the source and
    /// the translation table out of step.
    pub fn new(
        pred: P,
        config: FilterConfig,
        subscriptions: Arc<SubscriptionSet>,
    ) -> (Arc<RwLock<Self>>, OuterViewPort<dyn ListView<T>>) {
        let port = ViewPort::<dyn ListView<T>>::new();
        let state = Arc::new(RwLock::new(FilteredItems::new()));
        port.inner().set_view(Some(state.clone()));

        let proj = Arc::new(RwLock::new(FilterProjection {
            src_view: None,
            pred,
            config,
            state,
            subscriptions,
            cast: port.inner().get_broadcast(),
        }));
        (proj, port.into_outer())
    }

    pub fn state(&self) -> Arc<RwLock<FilteredItems<T>>> {
        self.state.clone()
    }

    fn detach(&self, reason: &Error) {
        tracing::warn!(%reason, "detaching filtered view from its source");
        self.subscriptions.dispose();
    }

    /// Hands the recorded notifications to the observers, in order.
    /// The first error from processing the edit wins over delivery errors.
    fn flush(&self, outcome: Result<()>) -> Result<()> {
        let pending = self.state.write().unwrap().take_pending();
        let mut result = outcome;
        for diff in pending {
            let observers = self.cast.read().unwrap().snapshot();
            let delivered = deliver(observers, &diff);
            if result.is_ok() {
                result = delivered;
            }
        }
        result
    }

    fn apply(&self, src: &[T], diff: &VecDiff<T>) -> Result<()> {
        let mut state = self.state.write().unwrap();
        let len = state.table.len();

        let out_of_range = |idx: usize, len: usize| {
            Error::invariant(format!("source edit at {idx} beyond {len} known items"))
        };

        match diff {
            VecDiff::Insert { idx, val } => {
                if *idx > len {
                    return Err(out_of_range(*idx, len));
                }
                state.table.insert_slot(*idx);
                if (self.pred)(val) {
                    state.appear(*idx, val);
                }
            }

            VecDiff::Remove { idx, val } => {
                if *idx >= len {
                    return Err(out_of_range(*idx, len));
                }
                if let Some(filtered_idx) = state.table.remove_slot(*idx) {
                    state.items.remove(filtered_idx);
                    tracing::trace!(src_idx = *idx, idx = filtered_idx, "item removed");
                    state.record(ListDiff::Remove {
                        idx: filtered_idx,
                        val: val.clone(),
                    });
                }
            }

            VecDiff::Update { idx, old, val } => {
                if *idx >= len {
                    return Err(out_of_range(*idx, len));
                }
                match (state.table.get(*idx), (self.pred)(val)) {
                    (None, true) => state.appear(*idx, val),
                    (Some(filtered_idx), true) => {
                        state.items[filtered_idx] = val.clone();
                        tracing::trace!(src_idx = *idx, idx = filtered_idx, "item replaced");
                        state.record(ListDiff::Update {
                            idx: filtered_idx,
                            old: old.clone(),
                            val: val.clone(),
                        });
                    }
                    (Some(_), false) => state.disappear(*idx, old),
                    (None, false) => {}
                }
            }

            VecDiff::Move { .. } => {
                return Err(Error::unsupported("move"));
            }

            VecDiff::InsertMany { vals, .. } => {
                return Err(Error::invariant(format!(
                    "batched insert of {} items; source edits must carry a single item",
                    vals.len()
                )));
            }

            VecDiff::Reset => match self.config.reset_policy {
                ResetPolicy::ClearOnly => {
                    state.table.clear();
                    state.items.clear();
                    state.record(ListDiff::Clear);
                    if !src.is_empty() {
                        return Err(Error::unsupported("reset to a non-empty source"));
                    }
                }
                ResetPolicy::Rescan => {
                    state.record(ListDiff::Clear);
                    state.rebuild(src, &self.pred);
                }
            },
        }

        if self.config.check_invariants {
            state.check(src.len())?;
        }
        Ok(())
    }

    fn item_changed(&self, src: &[T], item: &T) -> Result<()>
    where
        T: ObservableItem,
    {
        let Some(src_idx) = src.iter().position(|x| x.same_item(item)) else {
            tracing::trace!("change of an item that is no longer in the source");
            return Ok(());
        };

        let mut state = self.state.write().unwrap();
        match (state.table.get(src_idx), (self.pred)(item)) {
            (None, true) => state.appear(src_idx, &src[src_idx]),
            (Some(_), false) => state.disappear(src_idx, item),
            _ => {}
        }

        if self.config.check_invariants {
            state.check(src.len())?;
        }
        Ok(())
    }
}

impl<T, P> Observer<RwLock<Vec<T>>> for FilterProjection<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn reset(&mut self, view: Option<Arc<RwLock<Vec<T>>>>) {
        self.src_view = view;

        {
            let mut state = self.state.write().unwrap();
            if !state.items.is_empty() {
                state.record(ListDiff::Clear);
            }
            match self.src_view.as_ref() {
                Some(src) => state.rebuild(&src.read().unwrap(), &self.pred),
                None => state.rebuild(&[], &self.pred),
            }
            tracing::debug!(
                src_len = state.table.len(),
                len = state.items.len(),
                "filtered view built"
            );
        }

        if let Err(err) = self.flush(Ok(())) {
            tracing::warn!(%err, "observer failed while the filtered view was rebuilt");
        }
    }

    fn notify(&mut self, diff: &VecDiff<T>) -> Result<()> {
        let Some(src_view) = self.src_view.clone() else {
            return Ok(());
        };

        let outcome = {
            let src = src_view.read().unwrap();
            self.apply(&src, diff)
        };

        let desync = matches!(
            diff,
            VecDiff::Move { .. } | VecDiff::InsertMany { .. } | VecDiff::Reset
        );
        match &outcome {
            Err(err) if desync => {
                self.detach(err);
                self.src_view = None;
            }
            Err(err) => tracing::warn!(%err, "source edit rejected"),
            Ok(()) => {}
        }

        self.flush(outcome)
    }
}

impl<T, P> Observer<ItemChanges<T>> for FilterProjection<T, P>
where
    T: ObservableItem,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn notify(&mut self, item: &T) -> Result<()> {
        let Some(src_view) = self.src_view.clone() else {
            return Ok(());
        };

        let outcome = {
            let src = src_view.read().unwrap();
            self.item_changed(&src, item)
        };

        if let Err(err) = &outcome {
            tracing::warn!(%err, "item change rejected");
        }
        self.flush(outcome)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::vec::VecBuffer, view::list::ListViewExt};
    use std::sync::Mutex;

    fn even(x: &i32) -> bool {
        x % 2 == 0
    }

    struct Harness {
        buffer: VecBuffer<i32>,
        proj: Arc<RwLock<FilterProjection<i32, fn(&i32) -> bool>>>,
        port: OuterViewPort<dyn ListView<i32>>,
        subscriptions: Arc<SubscriptionSet>,
        log: Arc<Mutex<Vec<ListDiff<i32>>>>,
        _log_sub: crate::view::Subscription,
    }

    fn harness(data: Vec<i32>, config: FilterConfig) -> Harness {
        let buffer = VecBuffer::with_data(data);
        let subscriptions = Arc::new(SubscriptionSet::new());
        let (proj, port) = FilterProjection::new(
            even as fn(&i32) -> bool,
            config,
            subscriptions.clone(),
        );
        subscriptions.add(buffer.get_port().add_observer(proj.clone()));

        let log = Arc::new(Mutex::new(Vec::new()));
        let log_sub = port.add_notify_fn({
            let log = log.clone();
            move |diff: &ListDiff<i32>| {
                log.lock().unwrap().push(diff.clone());
                Ok(())
            }
        });

        Harness {
            buffer,
            proj,
            port,
            subscriptions,
            log,
            _log_sub: log_sub,
        }
    }

    impl Harness {
        fn view(&self) -> Vec<i32> {
            self.port.get_view().unwrap().iter().collect()
        }

        fn take_log(&self) -> Vec<ListDiff<i32>> {
            std::mem::take(&mut *self.log.lock().unwrap())
        }

        fn slots(&self) -> Vec<Option<usize>> {
            let state = self.proj.read().unwrap().state();
            let slots = state.read().unwrap().table().slots().to_vec();
            slots
        }
    }

    fn strict() -> FilterConfig {
        FilterConfig::default().with_invariant_checks(true)
    }

    #[test]
    fn filter_list1() {
        let mut h = harness(vec![1, 2, 3, 4], strict());
        assert_eq!(h.view(), vec![2, 4]);
        assert_eq!(h.slots(), vec![None, Some(0), None, Some(1)]);
        assert!(h.take_log().is_empty());

        h.buffer.push(5).unwrap();
        assert!(h.take_log().is_empty());
        assert_eq!(h.view(), vec![2, 4]);

        h.buffer.insert(1, 6).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 6 }]);
        assert_eq!(h.view(), vec![6, 2, 4]);

        h.buffer.remove(2).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Remove { idx: 1, val: 2 }]);
        assert_eq!(h.view(), vec![6, 4]);

        h.buffer.update(3, 7).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Remove { idx: 1, val: 4 }]);
        assert_eq!(h.view(), vec![6]);
        assert_eq!(h.slots(), vec![None, Some(0), None, None, None]);
    }

    #[test]
    fn replace_transitions() {
        let mut h = harness(vec![1, 2], strict());

        // passing -> passing
        h.buffer.update(1, 8).unwrap();
        assert_eq!(
            h.take_log(),
            vec![ListDiff::Update { idx: 0, old: 2, val: 8 }]
        );

        // not passing -> passing
        h.buffer.update(0, 0).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 0 }]);

        // not passing -> not passing
        h.buffer.push(3).unwrap();
        h.buffer.update(2, 5).unwrap();
        assert!(h.take_log().is_empty());

        // passing -> not passing announces the old item
        h.buffer.update(0, 9).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Remove { idx: 0, val: 0 }]);
        assert_eq!(h.view(), vec![8]);
    }

    #[test]
    fn removing_non_passing_item_is_silent() {
        let mut h = harness(vec![1, 2, 3], strict());
        h.buffer.remove(0).unwrap();
        h.buffer.remove(1).unwrap();
        assert!(h.take_log().is_empty());
        assert_eq!(h.slots(), vec![Some(0)]);
    }

    #[test]
    fn sole_passing_item() {
        let mut h = harness(vec![], strict());
        h.buffer.push(2).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 2 }]);

        h.buffer.remove(0).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Remove { idx: 0, val: 2 }]);
        assert!(h.view().is_empty());
    }

    #[test]
    fn move_is_unsupported_and_detaches() {
        let mut h = harness(vec![2, 4], strict());

        assert_eq!(h.buffer.move_item(0, 1), Err(Error::unsupported("move")));
        assert!(h.take_log().is_empty());
        assert_eq!(h.view(), vec![2, 4]);
        assert!(h.subscriptions.is_disposed());

        h.buffer.push(6).unwrap();
        assert!(h.take_log().is_empty());
        assert_eq!(h.view(), vec![2, 4]);
    }

    #[test]
    fn batched_insert_is_rejected() {
        let mut h = harness(vec![1], strict());

        let err = h.buffer.extend(vec![2, 4]).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation { .. }));
        assert!(h.take_log().is_empty());
        assert!(h.subscriptions.is_disposed());
    }

    #[test]
    fn clear_only_reset() {
        let mut h = harness(vec![2, 3, 4], strict());

        h.buffer.clear().unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Clear]);
        assert!(h.view().is_empty());
        assert!(!h.subscriptions.is_disposed());

        h.buffer.push(8).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 8 }]);
    }

    #[test]
    fn non_empty_reset_is_rejected_after_clearing() {
        let mut h = harness(vec![2, 3], strict());

        assert_eq!(
            h.buffer.reset(vec![4, 6]),
            Err(Error::unsupported("reset to a non-empty source"))
        );
        assert_eq!(h.take_log(), vec![ListDiff::Clear]);
        assert!(h.view().is_empty());
        assert!(h.subscriptions.is_disposed());

        h.buffer.push(10).unwrap();
        assert!(h.take_log().is_empty());
    }

    #[test]
    fn rescan_reset() {
        let config = strict().with_reset_policy(ResetPolicy::Rescan);
        let mut h = harness(vec![2, 3], config);

        h.buffer.reset(vec![1, 4, 6]).unwrap();
        assert_eq!(
            h.take_log(),
            vec![
                ListDiff::Clear,
                ListDiff::Insert { idx: 0, val: 4 },
                ListDiff::Insert { idx: 1, val: 6 },
            ]
        );
        assert_eq!(h.view(), vec![4, 6]);
        assert_eq!(h.slots(), vec![None, Some(0), Some(1)]);

        h.buffer.insert(0, 0).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 0 }]);
    }

    #[test]
    fn rescan_announces_one_clear() {
        let config = strict().with_reset_policy(ResetPolicy::Rescan);
        let mut h = harness(vec![1, 3], config);

        h.buffer.reset(vec![2, 5]).unwrap();
        assert_eq!(
            h.take_log(),
            vec![ListDiff::Clear, ListDiff::Insert { idx: 0, val: 2 }]
        );

        h.buffer.reset(vec![]).unwrap();
        assert_eq!(h.take_log(), vec![ListDiff::Clear]);
        assert!(h.view().is_empty());
    }

    #[test]
    fn mirror_follows_notifications() {
        let mut h = harness(vec![5, 2, 7, 8], strict());
        let mut mirror = h.view();

        h.buffer.insert(0, 4).unwrap();
        h.buffer.update(2, 3).unwrap();
        h.buffer.push(10).unwrap();
        h.buffer.remove(4).unwrap();
        h.buffer.update(1, 12).unwrap();

        for diff in h.take_log() {
            diff.apply_to(&mut mirror);
        }
        assert_eq!(mirror, h.view());
        assert_eq!(mirror, vec![4, 12, 10]);
    }

    #[test]
    fn observer_errors_reach_the_editor() {
        let mut h = harness(vec![], strict());
        let _failing = h
            .port
            .add_notify_fn(|_: &ListDiff<i32>| Err(Error::unsupported("downstream")));

        assert_eq!(h.buffer.push(2), Err(Error::unsupported("downstream")));
        assert_eq!(h.take_log(), vec![ListDiff::Insert { idx: 0, val: 2 }]);
        assert_eq!(h.view(), vec![2]);
    }
}

use {
    crate::{
        config::FilterConfig,
        projection::{
            filter_list::{FilterProjection, FilteredItems},
            item_changes::ObservableItem,
        },
        view::{
            list::{ListMut, ListView},
            OuterViewPort, Subscription, SubscriptionSet,
        },
        Error, Result,
    },
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
           Filtered Collection
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/

/// Read-only, order-preserving view of the source items that satisfy a
/// predicate, kept up to date as the source changes.
///
/// Dropping the collection (or calling [`dispose`](Self::dispose))
/// unsubscribes it from its source. The last state stays readable.
pub struct FilteredCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Arc<RwLock<FilteredItems<T>>>,
    port: OuterViewPort<dyn ListView<T>>,
    subscriptions: Arc<SubscriptionSet>,
}

impl<T> FilteredCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Filters `source` by `pred`, reacting to structural edits only.
    pub fn new<P>(source: &OuterViewPort<RwLock<Vec<T>>>, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilteredCollection::with_config(source, pred, FilterConfig::default())
    }

    pub fn with_config<P>(
        source: &OuterViewPort<RwLock<Vec<T>>>,
        pred: P,
        config: FilterConfig,
    ) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let subscriptions = Arc::new(SubscriptionSet::new());
        let (proj, port) = FilterProjection::new(pred, config, subscriptions.clone());
        let state = proj.read().unwrap().state();

        subscriptions.add(source.add_observer(proj));
        tracing::debug!(len = state.read().unwrap().items().len(), "filtered collection attached");

        FilteredCollection {
            state,
            port,
            subscriptions,
        }
    }

    pub fn count(&self) -> usize {
        self.state.read().unwrap().count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn get(&self, idx: usize) -> Result<T> {
        let state = self.state.read().unwrap();
        state.items().get(idx).cloned().ok_or(Error::IndexOutOfRange {
            index: idx,
            len: state.items().len(),
        })
    }

    /// Iterates over a snapshot of the current items.
    pub fn iter(&self) -> std::vec::IntoIter<T> {
        self.to_vec().into_iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.state.read().unwrap().items().to_vec()
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.state.read().unwrap().items().contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.state.read().unwrap().items().iter().position(|x| x == item)
    }

    /// Source position to filtered position, for every source item.
    pub fn translation(&self) -> Vec<Option<usize>> {
        self.state.read().unwrap().table().slots().to_vec()
    }

    /// Port for downstream observers and projections.
    pub fn get_port(&self) -> OuterViewPort<dyn ListView<T>> {
        self.port.clone()
    }

    /// Stops following the source. Calling it again has no effect.
    pub fn dispose(&self) {
        if self.subscriptions.dispose() {
            tracing::debug!("filtered collection disposed");
        }
    }

    /// True once the collection no longer follows its source, either
    /// through `dispose` or after an edit it could not follow.
    pub fn is_disposed(&self) -> bool {
        self.subscriptions.is_disposed()
    }
}

impl<T> FilteredCollection<T>
where
    T: ObservableItem,
{
    /// Like [`new`](Self::new), but also re-evaluates the predicate
    /// whenever one of the source items reports a change.
    pub fn observed<P>(source: &OuterViewPort<RwLock<Vec<T>>>, pred: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilteredCollection::observed_with_config(source, pred, FilterConfig::default())
    }

    pub fn observed_with_config<P>(
        source: &OuterViewPort<RwLock<Vec<T>>>,
        pred: P,
        config: FilterConfig,
    ) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let subscriptions = Arc::new(SubscriptionSet::new());
        let (proj, port) = FilterProjection::new(pred, config, subscriptions.clone());
        let state = proj.read().unwrap().state();

        subscriptions.add(source.add_observer(proj.clone()));

        let (changes, watch) = source.item_changes();
        let item_sub = changes.add_observer(proj);
        subscriptions.add(Subscription::new(move || {
            item_sub.cancel();
            watch.cancel();
            drop(changes);
        }));
        tracing::debug!(
            len = state.read().unwrap().items().len(),
            "observed filtered collection attached"
        );

        FilteredCollection {
            state,
            port,
            subscriptions,
        }
    }
}

impl<T> Drop for FilteredCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<T> ListMut<T> for FilteredCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn push(&mut self, _val: T) -> Result<()> {
        Err(Error::unsupported("push"))
    }

    fn insert(&mut self, _idx: usize, _val: T) -> Result<()> {
        Err(Error::unsupported("insert"))
    }

    fn remove(&mut self, _idx: usize) -> Result<T> {
        Err(Error::unsupported("remove"))
    }

    fn clear(&mut self) -> Result<()> {
        Err(Error::unsupported("clear"))
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> OuterViewPort<RwLock<Vec<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn filter_list<P>(&self, pred: P) -> FilteredCollection<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilteredCollection::new(self, pred)
    }
}

impl<T> OuterViewPort<RwLock<Vec<T>>>
where
    T: ObservableItem,
{
    pub fn filter_observed<P>(&self, pred: P) -> FilteredCollection<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        FilteredCollection::observed(self, pred)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

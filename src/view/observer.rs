use {
    crate::{view::View, Result},
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Observer
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait Observer<V: View + ?Sized>: Send + Sync {
    fn reset(&mut self, _view: Option<Arc<V>>) {}
    fn notify(&mut self, msg: &V::Msg) -> Result<()>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized, O: Observer<V>> Observer<V> for Arc<RwLock<O>> {
    fn reset(&mut self, view: Option<Arc<V>>) {
        self.write().unwrap().reset(view);
    }

    fn notify(&mut self, msg: &V::Msg) -> Result<()> {
        self.write().unwrap().notify(msg)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 Broadcast
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Synchronous fan-out to every registered observer, in registration order.
pub struct ObserverBroadcast<V: View + ?Sized> {
    next_id: u64,
    observers: Vec<(ObserverId, Arc<RwLock<dyn Observer<V>>>)>,
}

impl<V: View + ?Sized> ObserverBroadcast<V> {
    pub fn new() -> Self {
        ObserverBroadcast {
            next_id: 0,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, obs: Arc<RwLock<dyn Observer<V>>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, obs));
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(i, _)| *i != id);
        before != self.observers.len()
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Observers registered at this point.
    /// Delivery works on this copy so that observers may (un)subscribe while being notified.
    pub fn snapshot(&self) -> Vec<Arc<RwLock<dyn Observer<V>>>> {
        self.observers.iter().map(|(_, o)| o.clone()).collect()
    }
}

impl<V: View + ?Sized> Default for ObserverBroadcast<V> {
    fn default() -> Self {
        ObserverBroadcast::new()
    }
}

/// Delivers `msg` to every observer; the first error is returned
/// after all of them have been notified.
pub fn deliver<V: View + ?Sized>(
    observers: Vec<Arc<RwLock<dyn Observer<V>>>>,
    msg: &V::Msg,
) -> Result<()> {
    let mut result = Ok(());
    for o in observers {
        let r = o.write().unwrap().notify(msg);
        if result.is_ok() {
            result = r;
        }
    }
    result
}

impl<V: View + ?Sized> Observer<V> for ObserverBroadcast<V> {
    fn reset(&mut self, view: Option<Arc<V>>) {
        for o in self.snapshot() {
            o.write().unwrap().reset(view.clone());
        }
    }

    fn notify(&mut self, msg: &V::Msg) -> Result<()> {
        deliver(self.snapshot(), msg)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<fn(&V)>,
}

impl<V, F> NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        NotifyFnObserver {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V, F> Observer<V> for NotifyFnObserver<V, F>
where
    V: View + ?Sized,
    F: Fn(&V::Msg) -> Result<()> + Send + Sync,
{
    fn notify(&mut self, msg: &V::Msg) -> Result<()> {
        (self.f)(msg)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

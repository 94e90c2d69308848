use {
    crate::{
        view::{
            observer::deliver, NotifyFnObserver, Observer, ObserverBroadcast, Subscription, View,
        },
        Result,
    },
    std::sync::{Arc, RwLock},
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                 View Port
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub struct ViewPort<V: View + ?Sized> {
    view: Arc<RwLock<Option<Arc<V>>>>,
    cast: Arc<RwLock<ObserverBroadcast<V>>>,
}

impl<V: View + ?Sized> ViewPort<V> {
    pub fn new() -> Self {
        ViewPort {
            view: Arc::new(RwLock::new(None)),
            cast: Arc::new(RwLock::new(ObserverBroadcast::new())),
        }
    }

    pub fn set_view(&self, view: Option<Arc<V>>) {
        *self.view.write().unwrap() = view.clone();

        let observers = self.cast.read().unwrap().snapshot();
        for o in observers {
            o.write().unwrap().reset(view.clone());
        }
    }

    pub fn inner(&self) -> InnerViewPort<V> {
        InnerViewPort(self.clone())
    }

    pub fn outer(&self) -> OuterViewPort<V> {
        OuterViewPort(self.clone())
    }

    pub fn into_inner(self) -> InnerViewPort<V> {
        InnerViewPort(self)
    }

    pub fn into_outer(self) -> OuterViewPort<V> {
        OuterViewPort(self)
    }
}

impl<V: View + ?Sized> Clone for ViewPort<V> {
    fn clone(&self) -> Self {
        ViewPort {
            view: self.view.clone(),
            cast: self.cast.clone(),
        }
    }
}

impl<V: View + ?Sized> Default for ViewPort<V> {
    fn default() -> Self {
        ViewPort::new()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Producer side of a port: publishes the view and its change messages.
pub struct InnerViewPort<V: View + ?Sized>(pub ViewPort<V>);

/// Consumer side of a port: reads the view and registers observers.
pub struct OuterViewPort<V: View + ?Sized>(pub ViewPort<V>);

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized> InnerViewPort<V> {
    pub fn get_broadcast(&self) -> Arc<RwLock<ObserverBroadcast<V>>> {
        self.0.cast.clone()
    }

    pub fn set_view(&self, view: Option<Arc<V>>) -> Arc<RwLock<ObserverBroadcast<V>>> {
        self.0.set_view(view);
        self.get_broadcast()
    }

    pub fn notify(&self, msg: &V::Msg) -> Result<()> {
        let observers = self.0.cast.read().unwrap().snapshot();
        deliver(observers, msg)
    }
}

impl<V: View + ?Sized> Clone for InnerViewPort<V> {
    fn clone(&self) -> Self {
        InnerViewPort(self.0.clone())
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<V: View + ?Sized + 'static> OuterViewPort<V> {
    pub fn get_view(&self) -> Option<Arc<V>> {
        self.0.view.read().unwrap().clone()
    }

    /// Registers `observer` and hands it the current view.
    /// The observer stays registered for as long as the returned subscription lives.
    pub fn add_observer(&self, observer: Arc<RwLock<dyn Observer<V>>>) -> Subscription {
        let id = self.0.cast.write().unwrap().add_observer(observer.clone());

        observer
            .write()
            .unwrap()
            .reset(self.0.view.read().unwrap().clone());

        let cast = Arc::downgrade(&self.0.cast);
        Subscription::new(move || {
            if let Some(cast) = cast.upgrade() {
                cast.write().unwrap().remove_observer(id);
            }
        })
    }

    pub fn add_notify_fn<F: Fn(&V::Msg) -> Result<()> + Send + Sync + 'static>(
        &self,
        notify: F,
    ) -> Subscription {
        self.add_observer(Arc::new(RwLock::new(NotifyFnObserver::<V, F>::new(notify))))
    }

    pub fn observer_count(&self) -> usize {
        self.0.cast.read().unwrap().len()
    }
}

impl<V: View + ?Sized> Clone for OuterViewPort<V> {
    fn clone(&self) -> Self {
        OuterViewPort(self.0.clone())
    }
}

impl<V: View + ?Sized> Default for OuterViewPort<V> {
    fn default() -> Self {
        ViewPort::new().into_outer()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

use {
    crate::{
        projection::item_changes::ObservableItem,
        view::{singleton::SingletonView, InnerViewPort, OuterViewPort, View, ViewPort},
        Result,
    },
    std::sync::RwLock,
    std::{
        ops::{Deref, DerefMut},
        sync::Arc,
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct SingletonBufferView<T: Clone + Send + Sync + 'static>(pub Arc<RwLock<T>>);

impl<T> View for SingletonBufferView<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = ();
}

impl<T> SingletonView for SingletonBufferView<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn get(&self) -> Self::Item {
        self.0.read().unwrap().clone()
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Observable cell. Clones share the same value and port,
/// so a clone is the *same item* as far as identity goes.
#[derive(Clone)]
pub struct SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    value: Arc<RwLock<T>>,
    port: InnerViewPort<dyn SingletonView<Item = T>>,
}

impl<T> SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_port(value: T, port: InnerViewPort<dyn SingletonView<Item = T>>) -> Self {
        let value = Arc::new(RwLock::new(value));
        port.set_view(Some(Arc::new(SingletonBufferView(value.clone()))));

        SingletonBuffer { value, port }
    }

    pub fn new(value: T) -> Self {
        SingletonBuffer::with_port(value, ViewPort::new().into_inner())
    }

    pub fn get_port(&self) -> OuterViewPort<dyn SingletonView<Item = T>> {
        self.port.0.outer()
    }

    pub fn get(&self) -> T {
        self.value.read().unwrap().clone()
    }

    pub fn get_mut(&self) -> MutableSingletonAccess<T> {
        MutableSingletonAccess {
            buf: self.clone(),
            val: self.get(),
        }
    }

    pub fn set(&mut self, new_value: T) -> Result<()> {
        let mut v = self.value.write().unwrap();
        *v = new_value;
        drop(v);
        self.port.notify(&())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> std::fmt::Debug for SingletonBuffer<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SingletonBuffer").field(&self.get()).finish()
    }
}

impl<T> ObservableItem for SingletonBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    type View = dyn SingletonView<Item = T>;

    fn change_port(&self) -> OuterViewPort<Self::View> {
        self.get_port()
    }

    fn same_item(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Writes the value back through `set` when dropped.
pub struct MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    buf: SingletonBuffer<T>,
    val: T,
}

impl<T> Deref for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> DerefMut for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

impl<T> Drop for MutableSingletonAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Err(err) = self.buf.set(self.val.clone()) {
            tracing::warn!(%err, "write-back of singleton value failed");
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

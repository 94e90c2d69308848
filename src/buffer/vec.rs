use {
    crate::{
        view::{list::ListMut, InnerViewPort, OuterViewPort, View, ViewPort},
        Error, Result,
    },
    serde::{Deserialize, Serialize},
    std::sync::RwLock,
    std::{
        ops::{Deref, DerefMut},
        sync::Arc,
    },
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Structural change of a `Vec`.
/// Indices refer to the vector as it was right before the change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VecDiff<T> {
    /// The contents were replaced wholesale (possibly by nothing).
    Reset,
    Insert { idx: usize, val: T },
    Remove { idx: usize, val: T },
    Update { idx: usize, old: T, val: T },
    Move { from: usize, to: usize, val: T },
    /// Several items inserted by one edit.
    InsertMany { idx: usize, vals: Vec<T> },
}

impl<T> View for Vec<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Msg = VecDiff<T>;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Owned vector that publishes every edit as a [`VecDiff`].
///
/// Mutations return the first error an observer reported while
/// processing the edit. The edit itself is applied regardless.
#[derive(Clone)]
pub struct VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    data: Arc<RwLock<Vec<T>>>,
    port: InnerViewPort<RwLock<Vec<T>>>,
}

impl<T> VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn with_data_port(data: Vec<T>, port: InnerViewPort<RwLock<Vec<T>>>) -> Self {
        let data = Arc::new(RwLock::new(data));
        port.set_view(Some(data.clone()));
        VecBuffer { data, port }
    }

    pub fn with_data(data: Vec<T>) -> Self {
        VecBuffer::with_data_port(data, ViewPort::new().into_inner())
    }

    pub fn with_port(port: InnerViewPort<RwLock<Vec<T>>>) -> Self {
        VecBuffer::with_data_port(vec![], port)
    }

    pub fn new() -> Self {
        VecBuffer::with_port(ViewPort::new().into_inner())
    }

    pub fn get_port(&self) -> OuterViewPort<RwLock<Vec<T>>> {
        self.port.0.outer()
    }

    fn apply_diff(&mut self, diff: VecDiff<T>) -> Result<()> {
        let mut data = self.data.write().unwrap();
        match &diff {
            VecDiff::Reset => {}
            VecDiff::Insert { idx, val } => {
                data.insert(*idx, val.clone());
            }
            VecDiff::Remove { idx, .. } => {
                data.remove(*idx);
            }
            VecDiff::Update { idx, val, .. } => {
                data[*idx] = val.clone();
            }
            VecDiff::Move { from, to, .. } => {
                let val = data.remove(*from);
                data.insert(*to, val);
            }
            VecDiff::InsertMany { idx, vals } => {
                let tail = data.split_off(*idx);
                data.extend(vals.iter().cloned());
                data.extend(tail);
            }
        }
        drop(data);

        self.port.notify(&diff)
    }

    fn check_idx(&self, idx: usize, len: usize) -> Result<()> {
        if idx < len {
            Ok(())
        } else {
            Err(Error::IndexOutOfRange { index: idx, len })
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<T> {
        self.data.read().unwrap().get(idx).cloned()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.data.read().unwrap().clone()
    }

    pub fn push(&mut self, val: T) -> Result<()> {
        let idx = self.len();
        self.apply_diff(VecDiff::Insert { idx, val })
    }

    pub fn insert(&mut self, idx: usize, val: T) -> Result<()> {
        self.check_idx(idx, self.len() + 1)?;
        self.apply_diff(VecDiff::Insert { idx, val })
    }

    pub fn remove(&mut self, idx: usize) -> Result<T> {
        let val = self.get(idx).ok_or(Error::IndexOutOfRange {
            index: idx,
            len: self.len(),
        })?;
        self.apply_diff(VecDiff::Remove {
            idx,
            val: val.clone(),
        })?;
        Ok(val)
    }

    /// Replaces the item at `idx`, returning the previous one.
    pub fn update(&mut self, idx: usize, val: T) -> Result<T> {
        let old = self.get(idx).ok_or(Error::IndexOutOfRange {
            index: idx,
            len: self.len(),
        })?;
        self.apply_diff(VecDiff::Update {
            idx,
            old: old.clone(),
            val,
        })?;
        Ok(old)
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.len();
        self.check_idx(from, len)?;
        self.check_idx(to, len)?;
        let val = self.data.read().unwrap()[from].clone();
        self.apply_diff(VecDiff::Move { from, to, val })
    }

    /// Appends all of `vals` as a single edit.
    pub fn extend(&mut self, vals: impl IntoIterator<Item = T>) -> Result<()> {
        let vals: Vec<T> = vals.into_iter().collect();
        if vals.is_empty() {
            return Ok(());
        }
        let idx = self.len();
        self.apply_diff(VecDiff::InsertMany { idx, vals })
    }

    pub fn clear(&mut self) -> Result<()> {
        self.reset(Vec::new())
    }

    /// Replaces the whole contents and announces a `Reset`.
    pub fn reset(&mut self, data: Vec<T>) -> Result<()> {
        *self.data.write().unwrap() = data;
        self.apply_diff(VecDiff::Reset)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<MutableVecAccess<T>> {
        let val = self.get(idx)?;
        Some(MutableVecAccess {
            buf: self.clone(),
            idx,
            val,
        })
    }
}

impl<T> Default for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        VecBuffer::new()
    }
}

impl<T> ListMut<T> for VecBuffer<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn push(&mut self, val: T) -> Result<()> {
        VecBuffer::push(self, val)
    }

    fn insert(&mut self, idx: usize, val: T) -> Result<()> {
        VecBuffer::insert(self, idx, val)
    }

    fn remove(&mut self, idx: usize) -> Result<T> {
        VecBuffer::remove(self, idx)
    }

    fn clear(&mut self) -> Result<()> {
        VecBuffer::clear(self)
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

/// Writes the value back as an `Update` when dropped.
pub struct MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    buf: VecBuffer<T>,
    idx: usize,
    val: T,
}

impl<T> Deref for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Target = T;

    fn deref(&self) -> &T {
        &self.val
    }
}

impl<T> DerefMut for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.val
    }
}

impl<T> Drop for MutableVecAccess<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Err(err) = self.buf.update(self.idx, self.val.clone()) {
            tracing::warn!(idx = self.idx, %err, "write-back of vec item failed");
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

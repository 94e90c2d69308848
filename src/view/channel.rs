//! Queue channel for handing notifications to another execution context.
//!
//! A [`ChannelSender`] is an [`Observer`]: registered on a port it queues
//! every message instead of handling it in-line. The owner of the
//! [`ChannelReceiver`] drains the queue whenever it gets to run, either
//! with [`ChannelReceiver::try_recv`] or as an async [`Stream`].

use {
    crate::{
        view::{Observer, View},
        Result,
    },
    async_std::stream::Stream,
    core::{
        pin::Pin,
        task::{Context, Poll, Waker},
    },
    std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    },
};

                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                  Channel
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
struct ChannelState<T> {
    queue: VecDeque<T>,
    num_senders: usize,
    waker: Option<Waker>,
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub struct ChannelSender<T>(Arc<Mutex<ChannelState<T>>>);
pub struct ChannelReceiver<T>(Arc<Mutex<ChannelState<T>>>);

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ChannelSender<T> {
    pub fn send(&self, msg: T) {
        let mut state = self.0.lock().unwrap();
        state.queue.push_back(msg);

        if let Some(waker) = state.waker.take() {
            waker.wake();
        }
    }
}

impl<V: View + ?Sized> Observer<V> for ChannelSender<V::Msg>
where
    V::Msg: Clone,
{
    fn notify(&mut self, msg: &V::Msg) -> Result<()> {
        self.send(msg.clone());
        Ok(())
    }
}

impl<T> Clone for ChannelSender<T> {
    fn clone(&self) -> Self {
        self.0.lock().unwrap().num_senders += 1;
        ChannelSender(self.0.clone())
    }
}

impl<T> Drop for ChannelSender<T> {
    fn drop(&mut self) {
        let mut state = self.0.lock().unwrap();
        state.num_senders -= 1;
        if let Some(waker) = state.waker.take() {
            waker.wake();
        }
    }
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

impl<T> ChannelReceiver<T> {
    /// Takes everything queued so far.
    pub fn try_recv(&self) -> Option<Vec<T>> {
        let mut state = self.0.lock().unwrap();
        if state.queue.is_empty() {
            None
        } else {
            Some(state.queue.drain(..).collect())
        }
    }

    pub fn is_closed(&self) -> bool {
        self.0.lock().unwrap().num_senders == 0
    }
}

impl<T> Stream for ChannelReceiver<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut state = self.0.lock().unwrap();

        if let Some(msg) = state.queue.pop_front() {
            Poll::Ready(Some(msg))
        } else if state.num_senders == 0 {
            Poll::Ready(None)
        } else {
            state.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

/*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
             Factory Functions
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub fn queue_channel<T>() -> (ChannelSender<T>, ChannelReceiver<T>) {
    let state = Arc::new(Mutex::new(ChannelState {
        queue: VecDeque::new(),
        num_senders: 1,
        waker: None,
    }));

    (ChannelSender(state.clone()), ChannelReceiver(state))
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

#[cfg(test)]
mod tests {
    use super::*;
    use async_std::stream::StreamExt;

    #[test]
    fn try_recv_drains_in_order() {
        let (tx, rx) = queue_channel::<u8>();
        assert_eq!(rx.try_recv(), None);

        tx.send(1);
        tx.send(2);
        assert_eq!(rx.try_recv(), Some(vec![1, 2]));
        assert_eq!(rx.try_recv(), None);
    }

    #[async_std::test]
    async fn stream_ends_when_senders_drop() {
        let (tx, mut rx) = queue_channel::<u8>();
        let tx2 = tx.clone();

        tx.send(3);
        tx2.send(4);
        drop(tx);
        assert!(!rx.is_closed());
        drop(tx2);
        assert!(rx.is_closed());

        assert_eq!(rx.next().await, Some(3));
        assert_eq!(rx.next().await, Some(4));
        assert_eq!(rx.next().await, None);
    }
}

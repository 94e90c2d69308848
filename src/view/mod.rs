
                    /*\
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                   View
<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>
                    \*/
pub trait View: Send + Sync {
    /// Notification message for the observers
    type Msg: Send + Sync;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

use std::sync::{Arc, RwLock};

impl<V: View + ?Sized> View for RwLock<V> {
    type Msg = V::Msg;
}

impl<V: View + ?Sized> View for Arc<V> {
    type Msg = V::Msg;
}

impl<V: View> View for Option<V> {
    type Msg = V::Msg;
}

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub mod channel;
pub mod observer;
pub mod port;
pub mod subscription;

pub use {
    channel::{queue_channel, ChannelReceiver, ChannelSender},
    observer::{NotifyFnObserver, Observer, ObserverBroadcast, ObserverId},
    port::{InnerViewPort, OuterViewPort, ViewPort},
    subscription::{Subscription, SubscriptionSet},
};

//<<<<>>>><<>><><<>><<<*>>><<>><><<>><<<<>>>>

pub mod list;
pub mod singleton;

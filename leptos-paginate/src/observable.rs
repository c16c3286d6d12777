use std::{
    collections::HashMap,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{
    Stream, StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender},
};
use leptos::prelude::{ArcReadSignal, ArcRwSignal, GetUntracked, Set};
use parking_lot::Mutex;

use crate::utils::new_subscription_id;

// sub_id -> sender
type Subs<V> = Arc<Mutex<HashMap<u64, UnboundedSender<V>>>>;

/// A value published both as a leptos signal and to any number of stream subscribers.
pub(crate) struct Observable<V: 'static> {
    signal: ArcRwSignal<V>,
    subs: Subs<V>,
}

impl<V> Observable<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(initial: V) -> Self {
        Self {
            signal: ArcRwSignal::new(initial),
            subs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn signal(&self) -> ArcReadSignal<V> {
        self.signal.read_only()
    }

    pub fn publish(&self, value: V) {
        // Held until the signal is set too, so a concurrent subscribe() can't miss this value:
        let subs = self.subs.lock();
        for tx in subs.values() {
            let _ = tx.unbounded_send(value.clone());
        }
        self.signal.set(value);
    }

    /// The current value is sent straight away, then every later publish.
    pub fn subscribe(&self) -> Subscription<V> {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        let sub_id = new_subscription_id();

        let mut subs = self.subs.lock();
        let _ = tx.unbounded_send(self.signal.get_untracked());
        subs.insert(sub_id, tx);

        Subscription {
            rx,
            // This will remove the subscriber on drop:
            _guard: SubDropGuard {
                subs: self.subs.clone(),
                sub_id,
            },
        }
    }
}

/// A hot stream of values published by a [`crate::Pagination`] controller.
///
/// Yields the latest value on subscription, then each new value as it's published.
/// Dropping the subscription unsubscribes.
pub struct Subscription<V: 'static> {
    rx: UnboundedReceiver<V>,
    _guard: SubDropGuard<V>,
}

impl<V> std::fmt::Debug for Subscription<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

impl<V> Stream for Subscription<V> {
    type Item = V;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        self.rx.poll_next_unpin(cx)
    }
}

struct SubDropGuard<V: 'static> {
    sub_id: u64,
    subs: Subs<V>,
}

impl<V> Drop for SubDropGuard<V> {
    fn drop(&mut self) {
        self.subs.lock().remove(&self.sub_id);
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    fn drain<V>(sub: &mut Subscription<V>) -> Vec<V> {
        let mut values = vec![];
        while let Some(Some(value)) = sub.next().now_or_never() {
            values.push(value);
        }
        values
    }

    #[test]
    fn test_subscribe_replays_latest() {
        let observable = Observable::new(0_u32);
        observable.publish(1);
        observable.publish(2);

        let mut sub = observable.subscribe();
        assert_eq!(drain(&mut sub), vec![2]);

        observable.publish(3);
        observable.publish(4);
        assert_eq!(drain(&mut sub), vec![3, 4]);
        assert_eq!(observable.signal().get_untracked(), 4);
    }

    #[test]
    fn test_dropped_subscription_is_removed() {
        let observable = Observable::new(false);
        let sub_a = observable.subscribe();
        let mut sub_b = observable.subscribe();
        assert_eq!(observable.subs.lock().len(), 2);

        drop(sub_a);
        assert_eq!(observable.subs.lock().len(), 1);

        observable.publish(true);
        assert_eq!(drain(&mut sub_b), vec![false, true]);
    }
}

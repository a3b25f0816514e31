// First-of-N race: spawn every racer, keep the first value delivered, abort the rest.

use futures_util::future::BoxFuture;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::task::JoinSet;

/// Exactly-once delivery slot. The first `resolve` wins; later calls are no-ops.
pub struct Resolver<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> Resolver<T> {
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Returns `true` if this call delivered the value.
    pub fn resolve(&self, value: T) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self.slot.lock() {
            Ok(guard) => guard.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}

/// Runs every racer concurrently and returns the value of whichever finishes first.
/// Losers are aborted once a winner is known (or when the caller is dropped).
/// Returns `None` only when there are no racers or every racer panicked.
pub async fn first_of<T>(racers: Vec<BoxFuture<'static, T>>) -> Option<T>
where
    T: Send + 'static,
{
    let (resolver, rx) = Resolver::channel();
    let resolver = Arc::new(resolver);
    let mut set = JoinSet::new();
    for racer in racers {
        let resolver = resolver.clone();
        set.spawn(async move {
            let value = racer.await;
            resolver.resolve(value);
        });
    }
    // Only the racers hold the resolver now, so `rx` errors once they are all gone.
    drop(resolver);
    let winner = rx.await.ok();
    set.abort_all();
    winner
}

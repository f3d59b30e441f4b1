//! Collection watchers
//!
//! A watcher keeps a snapshot of one collection fresh for a view. It
//! reads the slot when created, then again on every poll interval and
//! whenever the store announces a write to the slot. Writes made through
//! a different store instance (another process or tab) are therefore
//! visible within one poll interval.
//!
//! Dropping the watcher stops its background task.

use super::collection::LocalCollection;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Live snapshot of a collection
pub struct SlotWatcher<T> {
    snapshot: watch::Receiver<Vec<T>>,
    task: JoinHandle<()>,
}

impl<T> SlotWatcher<T>
where
    T: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static,
{
    /// Load the collection and start refreshing it every `poll_interval`
    pub async fn spawn(collection: LocalCollection<T>, poll_interval: Duration) -> Result<Self> {
        let initial = collection.load().await?;
        let (tx, snapshot) = watch::channel(initial);
        let changes = collection.store().subscribe();

        let task = tokio::spawn(refresh_loop(collection, poll_interval, tx, changes));

        Ok(Self { snapshot, task })
    }

    /// Current snapshot
    pub fn current(&self) -> Vec<T> {
        self.snapshot.borrow().clone()
    }

    /// Another receiver of the snapshots
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.snapshot.clone()
    }

    /// Wait until the snapshot differs from the last one seen
    pub async fn changed(&mut self) -> Result<Vec<T>> {
        self.snapshot
            .changed()
            .await
            .map_err(|_| AppError::Generic("Collection watcher stopped".to_string()))?;

        Ok(self.snapshot.borrow_and_update().clone())
    }
}

impl<T> Drop for SlotWatcher<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn refresh_loop<T>(
    collection: LocalCollection<T>,
    poll_interval: Duration,
    tx: watch::Sender<Vec<T>>,
    changes: broadcast::Receiver<String>,
) where
    T: Serialize + DeserializeOwned + PartialEq,
{
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately and the mount read already happened
    ticker.tick().await;

    let mut changes = Some(changes);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = next_change(&mut changes) => match changed {
                Ok(key) if key != collection.key() => continue,
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => {
                    changes = None;
                    continue;
                }
            },
            _ = tx.closed() => break,
        }

        match collection.load().await {
            Ok(items) => {
                tx.send_if_modified(|current| {
                    if *current == items {
                        false
                    } else {
                        *current = items;
                        true
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Failed to refresh collection '{}': {}", collection.key(), e);
            }
        }
    }

    tracing::debug!("Watcher for '{}' stopped", collection.key());
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<String>>,
) -> std::result::Result<String, RecvError> {
    match changes {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

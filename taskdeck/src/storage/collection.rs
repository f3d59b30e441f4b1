//! Typed collections over storage slots
//!
//! Each collection is persisted whole: every mutation reads the slot,
//! changes an in-memory copy and writes the full collection back.
//! Writers sharing one `LocalCollection` (or its clones) are serialized;
//! independent handles on the same slot are last-writer-wins for the
//! entire collection.

use super::slot_store::SlotStore;
use crate::error::{AppError, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records stored in a local collection carry a numeric id
pub trait Keyed {
    fn id(&self) -> i64;
}

/// Next free timestamp-derived id: the current millisecond, or one past
/// the largest id in use when that is later. Fails once the largest id
/// in use is `i64::MAX`.
pub fn next_id<T: Keyed>(items: &[T]) -> Result<i64> {
    let now = Utc::now().timestamp_millis();
    let max = items.iter().map(Keyed::id).max().unwrap_or(i64::MIN);

    if now > max {
        return Ok(now);
    }

    max.checked_add(1)
        .ok_or_else(|| AppError::Generic("No free id left in collection".to_string()))
}

/// Handle on one collection slot
pub struct LocalCollection<T> {
    store: Arc<dyn SlotStore>,
    key: String,
    default: fn() -> Vec<T>,
    write_lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for LocalCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            default: self.default,
            write_lock: Arc::clone(&self.write_lock),
            _marker: PhantomData,
        }
    }
}

impl<T> LocalCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Collection whose missing slot reads as empty
    pub fn new(store: Arc<dyn SlotStore>, key: impl Into<String>) -> Self {
        Self::with_default(store, key, Vec::new)
    }

    /// Collection whose missing slot reads as `default()`
    pub fn with_default(
        store: Arc<dyn SlotStore>,
        key: impl Into<String>,
        default: fn() -> Vec<T>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            default,
            write_lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn SlotStore> {
        &self.store
    }

    /// Read the whole collection.
    ///
    /// A slot that does not parse is reported as `CorruptSlot` and left
    /// untouched.
    pub async fn load(&self) -> Result<Vec<T>> {
        match self.store.read(&self.key).await? {
            None => Ok((self.default)()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| AppError::CorruptSlot {
                key: self.key.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Overwrite the slot with `items`
    pub async fn save(&self, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.store.write(&self.key, &raw).await
    }

    /// Remove the slot so the collection reads as its default again
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(&self.key).await
    }

    /// Read-modify-write the collection.
    ///
    /// `change` runs on a fresh copy of the slot; the collection is only
    /// written back when it returns `Ok`. Returns the closure's value
    /// and the collection as written.
    pub async fn mutate<R, F>(&self, change: F) -> Result<(R, Vec<T>)>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R>,
    {
        let _guard = self.write_lock.lock().await;

        let mut items = self.load().await?;
        let outcome = change(&mut items)?;
        self.save(&items).await?;

        Ok((outcome, items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileSlotStore, MemorySlotStore};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: i64,
        label: String,
    }

    impl Keyed for Item {
        fn id(&self) -> i64 {
            self.id
        }
    }

    fn item(id: i64, label: &str) -> Item {
        Item {
            id,
            label: label.to_string(),
        }
    }

    fn collection(store: &Arc<dyn SlotStore>) -> LocalCollection<Item> {
        LocalCollection::new(Arc::clone(store), "items")
    }

    #[tokio::test]
    async fn test_missing_slot_uses_default() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());

        assert!(collection(&store).load().await.unwrap().is_empty());

        let seeded: LocalCollection<Item> =
            LocalCollection::with_default(Arc::clone(&store), "seeded", || vec![item(1, "seed")]);
        assert_eq!(seeded.load().await.unwrap(), vec![item(1, "seed")]);
    }

    #[tokio::test]
    async fn test_mutate_preserves_prior_contents() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let items = collection(&store);
        items.save(&[item(1, "a"), item(2, "b")]).await.unwrap();

        items
            .mutate(|all| {
                all.push(item(3, "c"));
                Ok(())
            })
            .await
            .unwrap();

        let reread = collection(&store).load().await.unwrap();
        assert_eq!(reread, vec![item(1, "a"), item(2, "b"), item(3, "c")]);
    }

    #[tokio::test]
    async fn test_failed_mutation_writes_nothing() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let items = collection(&store);
        items.save(&[item(1, "a")]).await.unwrap();

        let result: Result<((), Vec<Item>)> = items
            .mutate(|all| {
                all.clear();
                Err(AppError::Validation("nope".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(items.load().await.unwrap(), vec![item(1, "a")]);
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_reported_and_kept() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        store.write("items", "{not json").await.unwrap();

        let items = collection(&store);
        assert!(matches!(
            items.load().await,
            Err(AppError::CorruptSlot { .. })
        ));

        let result = items.mutate(|all| Ok(all.push(item(1, "a")))).await;
        assert!(result.is_err());
        assert_eq!(
            store.read("items").await.unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[tokio::test]
    async fn test_stale_whole_collection_write_wins() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let first_view = collection(&store);
        let second_view = collection(&store);
        first_view.save(&[item(1, "a")]).await.unwrap();

        // Second view holds a snapshot taken before the first view appends
        let stale = second_view.load().await.unwrap();
        first_view
            .mutate(|all| Ok(all.push(item(2, "b"))))
            .await
            .unwrap();

        let mut edited = stale;
        edited.push(item(3, "c"));
        second_view.save(&edited).await.unwrap();

        assert_eq!(
            first_view.load().await.unwrap(),
            vec![item(1, "a"), item(3, "c")]
        );
    }

    #[tokio::test]
    async fn test_shared_handle_serializes_writers() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let items = collection(&store);

        let mut handles = Vec::new();
        for i in 0..10 {
            let items = items.clone();
            handles.push(tokio::spawn(async move {
                items
                    .mutate(move |all| Ok(all.push(item(i, "x"))))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(items.load().await.unwrap().len(), 10);
    }

    #[test]
    fn test_next_id_never_collides() {
        assert!(next_id::<Item>(&[]).unwrap() > 0);

        let far_future = i64::MAX - 1;
        assert_eq!(next_id(&[item(far_future, "x")]).unwrap(), i64::MAX);

        let now = Utc::now().timestamp_millis();
        assert!(next_id(&[item(now + 10_000, "x")]).unwrap() == now + 10_001);
    }

    #[test]
    fn test_next_id_at_max_is_an_error() {
        assert!(matches!(
            next_id(&[item(i64::MAX, "x")]),
            Err(AppError::Generic(_))
        ));
    }

    #[tokio::test]
    async fn test_mutate_at_max_id_leaves_slot_untouched() {
        let store: Arc<dyn SlotStore> = Arc::new(MemorySlotStore::new());
        let items = collection(&store);
        items.save(&[item(i64::MAX, "last")]).await.unwrap();

        let result = items
            .mutate(|all| {
                let id = next_id(all)?;
                all.push(item(id, "overflow"));
                Ok(id)
            })
            .await;

        assert!(result.is_err());
        assert_eq!(items.load().await.unwrap(), vec![item(i64::MAX, "last")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_independent_file_handles_keep_slot_whole() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let file_store = FileSlotStore::new(temp_dir.path().to_path_buf());
        file_store.initialize().await.unwrap();
        let store: Arc<dyn SlotStore> = Arc::new(file_store);

        for round in 0..50 {
            let saves: Vec<_> = (1..=4i64)
                .map(|len| {
                    let handle = collection(&store);
                    tokio::spawn(async move {
                        let items: Vec<Item> = (0..len * 25).map(|i| item(i, "w")).collect();
                        handle.save(&items).await
                    })
                })
                .collect();

            for save in saves {
                save.await.unwrap().unwrap();
            }

            let loaded = collection(&store).load().await.unwrap();
            assert!(
                [25, 50, 75, 100].contains(&loaded.len()),
                "round {} left {} items",
                round,
                loaded.len()
            );
        }
    }
}

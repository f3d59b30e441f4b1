//! Storage module
//!
//! Local workspace persistence: named slots holding whole serialized
//! collections, typed collection handles, and watchers that keep view
//! snapshots fresh.

pub mod collection;
pub mod slot_store;
pub mod watcher;

pub use collection::{next_id, Keyed, LocalCollection};
pub use slot_store::{FileSlotStore, MemorySlotStore, SlotStore};
pub use watcher::SlotWatcher;

//! Persistence layer: browser-storage shaped key-value stores and the
//! typed snapshot adapter on top of them.

pub mod file;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{InitialContact, Restored, SnapshotStore, keys};
pub use traits::KeyValueStore;

pub mod store;

pub use store::{load_settings, save_settings, KeyValueStore, MemoryStore, SqliteStore};

//! Session store adapters

mod keyring_store;
mod memory_store;

pub use keyring_store::KeyringSessionStore;
pub use memory_store::MemorySessionStore;

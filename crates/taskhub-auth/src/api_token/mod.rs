//! API credential storage.

pub mod memory;

pub use memory::MemoryApiTokenStore;

//! Terrasite Store - Persistence adapters
//!
//! Implementations of the `terrasite_core::ports::TerrainStore` port. Only the
//! in-memory adapter lives here for now.

pub mod memory;

pub use memory::MemoryTerrainStore;

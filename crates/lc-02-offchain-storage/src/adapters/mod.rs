//! # Blob Store Adapters

mod file;
mod memory;

pub use file::FileBlobStore;
pub use memory::InMemoryBlobStore;

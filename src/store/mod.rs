pub mod json;
pub mod memory;

pub use json::{load_store, save_store};
pub use memory::MemoryStore;

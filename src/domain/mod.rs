pub mod memory;

pub use memory::{Memory, MemoryChanges, MemoryInput, MemorySummary, NewMemory, ValidationError};

//! Growable scratch vectors that start out on caller-provided storage and spill
//! to the heap only when they outgrow it.

pub mod buffer;
pub mod index_width;

pub use buffer::{ScratchVec, ScratchVec32};
pub use index_width::IndexWidth;

//! Segmentation of proof scripts into definition chunks.
//!
//! The transcript strategy ([`segment`]) reconstructs chunks from the
//! offsets and prompt stacks coqtop echoes; [`FallbackSegmenter`] works from
//! the statement text alone.

mod accumulator;
mod chunk;
mod fallback;
mod prompt;
mod script;
mod stack;

pub use accumulator::*;
pub use chunk::*;
pub use fallback::*;
pub use prompt::*;
pub use script::*;
pub use stack::*;

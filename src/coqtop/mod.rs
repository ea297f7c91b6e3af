//! coqtop module for process spawning, output capture, and capability probing.

mod cache;
mod collector;
mod error;
mod probe;
mod process;
mod timeout;

pub use cache::*;
pub use collector::*;
pub use error::*;
pub use probe::*;
pub use process::*;
pub use timeout::*;

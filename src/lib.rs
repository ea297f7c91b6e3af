//! coq-defsplit - Split Coq scripts into top-level definitions.

pub mod config;
pub mod coqtop;
pub mod display;
pub mod segment;
pub mod splitter;

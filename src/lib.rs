//! Round-based host resource monitor.
//!
//! A supervisor drives one worker task per statistic category (memory, CPU,
//! sessions) through synchronized sampling rounds and prints a composite
//! report after every round.

pub mod cli;
pub mod config;
pub mod control;
pub mod coordinator;
pub mod error;
pub mod format;
pub mod logging;
pub mod render;
pub mod system;

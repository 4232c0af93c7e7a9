//! Pure text rendering of samples and reports.
//!
//! Nothing in here touches the OS, the runtime, or the terminal; every
//! function maps values to strings.

pub mod cpu;
pub mod memory;
pub mod report;
pub mod sessions;

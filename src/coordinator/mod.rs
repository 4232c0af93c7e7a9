//! Round coordination: one worker task per statistic category, driven by a
//! supervisor through synchronized sampling rounds.
//!
//! Each worker owns a capacity-1 request channel and a capacity-1 response
//! channel. All workers share one readiness channel that carries only
//! category tags, so the supervisor knows which response to read next.

pub mod message;
pub mod probe;
pub mod supervisor;
pub mod worker;

pub use supervisor::{Outcome, RunPlan, Supervisor, WorkerSet};

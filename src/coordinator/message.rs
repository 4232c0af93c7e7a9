use std::fmt;

use crate::error::SourceUnavailable;
use crate::system::Category;
use crate::system::cpu::CpuCounts;

/// Position of a round in the run. Round 0 is the warm-up round that only
/// seeds baselines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundIndex(u32);

impl RoundIndex {
    pub const WARM_UP: RoundIndex = RoundIndex(0);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_warm_up(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RoundIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supervisor -> worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Round(RoundIndex),
    Terminate,
}

/// Worker -> supervisor, on the shared readiness channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    /// The category's response channel holds an answer for the current round.
    Ready(Category),
    /// The category's worker task has ended.
    Exited(Category),
}

/// Worker -> supervisor, on the category's own response channel.
pub type Response<T> = Result<T, SourceUnavailable>;

#[derive(Clone, Debug, PartialEq)]
pub struct MemoryResponse {
    pub line: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CpuResponse {
    pub counts: CpuCounts,
    /// Usage between the previous round and this one.
    pub percent: f64,
    /// Usage between the warm-up round and this one.
    pub average: f64,
    pub line: String,
    pub average_line: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionsResponse {
    pub lines: Vec<String>,
    /// Sessions past the configured maximum, counted but not listed.
    pub discarded: usize,
}

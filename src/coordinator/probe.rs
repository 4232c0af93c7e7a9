//! Per-category sampling state carried across rounds.
//!
//! Each sampler owns one counter source and turns each raw sample into the
//! formatted response for its round. Round 0 only seeds the state.

use crate::coordinator::message::{CpuResponse, MemoryResponse, RoundIndex, SessionsResponse};
use crate::error::SourceUnavailable;
use crate::render;
use crate::system::Category;
use crate::system::cpu::{CpuSample, CpuTicks, CpuUsageHistory, usage_percent};
use crate::system::memory::MemorySample;
use crate::system::sessions::{Session, SessionList};
use crate::system::source::CounterSource;

pub trait Probe: Send + 'static {
    type Output: Send + 'static;

    fn category(&self) -> Category;

    /// Takes exactly one sample for `round`. Returns `None` for the warm-up
    /// round.
    fn observe(&mut self, round: RoundIndex) -> Result<Option<Self::Output>, SourceUnavailable>;
}

pub struct MemoryProbe<S> {
    source: S,
    previous: Option<MemorySample>,
    graphics: bool,
}

impl<S> MemoryProbe<S>
where
    S: CounterSource<Sample = MemorySample>,
{
    pub fn new(source: S, graphics: bool) -> Self {
        Self {
            source,
            previous: None,
            graphics,
        }
    }
}

impl<S> Probe for MemoryProbe<S>
where
    S: CounterSource<Sample = MemorySample>,
{
    type Output = MemoryResponse;

    fn category(&self) -> Category {
        Category::Memory
    }

    fn observe(&mut self, round: RoundIndex) -> Result<Option<MemoryResponse>, SourceUnavailable> {
        let sample = self.source.read()?;
        let previous = self.previous.replace(sample);
        if round.is_warm_up() {
            return Ok(None);
        }
        let line = render::memory::memory_line(&sample, previous.as_ref(), self.graphics);
        Ok(Some(MemoryResponse { line }))
    }
}

pub struct CpuProbe<S> {
    source: S,
    baseline: Option<CpuTicks>,
    previous: Option<CpuTicks>,
    history: CpuUsageHistory,
    graphics: bool,
}

impl<S> CpuProbe<S>
where
    S: CounterSource<Sample = CpuSample>,
{
    pub fn new(source: S, rounds: u32, graphics: bool) -> Self {
        Self {
            source,
            baseline: None,
            previous: None,
            history: CpuUsageHistory::with_capacity(rounds as usize),
            graphics,
        }
    }
}

impl<S> Probe for CpuProbe<S>
where
    S: CounterSource<Sample = CpuSample>,
{
    type Output = CpuResponse;

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn observe(&mut self, round: RoundIndex) -> Result<Option<CpuResponse>, SourceUnavailable> {
        let CpuSample { ticks, counts } = self.source.read()?;
        let baseline = *self.baseline.get_or_insert(ticks);
        let previous = self.previous.replace(ticks).unwrap_or(ticks);
        if round.is_warm_up() {
            return Ok(None);
        }

        let percent = usage_percent(&previous, &ticks);
        let change = self.history.record(round.get(), percent);
        let average = usage_percent(&baseline, &ticks);

        Ok(Some(CpuResponse {
            counts,
            percent,
            average,
            line: render::cpu::cpu_line(percent, change, self.graphics),
            average_line: render::cpu::average_line(average),
        }))
    }
}

pub struct SessionsProbe<S> {
    source: S,
    max_sessions: usize,
}

impl<S> SessionsProbe<S>
where
    S: CounterSource<Sample = Vec<Session>>,
{
    pub fn new(source: S, max_sessions: usize) -> Self {
        Self {
            source,
            max_sessions,
        }
    }
}

impl<S> Probe for SessionsProbe<S>
where
    S: CounterSource<Sample = Vec<Session>>,
{
    type Output = SessionsResponse;

    fn category(&self) -> Category {
        Category::Sessions
    }

    fn observe(&mut self, round: RoundIndex) -> Result<Option<SessionsResponse>, SourceUnavailable> {
        let sessions = self.source.read()?;
        if round.is_warm_up() {
            return Ok(None);
        }
        let list = SessionList::bounded(sessions, self.max_sessions);
        Ok(Some(SessionsResponse {
            lines: render::sessions::session_lines(&list),
            discarded: list.discarded,
        }))
    }
}

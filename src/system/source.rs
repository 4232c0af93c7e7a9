use std::collections::VecDeque;

use crate::error::SourceUnavailable;
use crate::system::Category;

/// A source of raw counters for one statistic category.
///
/// Each call to [`CounterSource::read`] takes one fresh snapshot. Sources are
/// owned by exactly one worker, so they may keep whatever handles they need
/// between reads.
pub trait CounterSource: Send + 'static {
    type Sample: Send + 'static;

    fn category(&self) -> Category;

    fn read(&mut self) -> Result<Self::Sample, SourceUnavailable>;
}

/// A source that replays a fixed script of samples, one per read.
///
/// Once the script runs dry every further read fails.
pub struct ScriptedSource<T> {
    category: Category,
    script: VecDeque<Result<T, SourceUnavailable>>,
}

impl<T> ScriptedSource<T> {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            script: VecDeque::new(),
        }
    }

    pub fn then(mut self, sample: T) -> Self {
        self.script.push_back(Ok(sample));
        self
    }

    pub fn then_fail(mut self, reason: &str) -> Self {
        self.script
            .push_back(Err(SourceUnavailable::new(self.category, reason)));
        self
    }

    /// Queues the same sample `count` times.
    pub fn repeat(mut self, sample: T, count: usize) -> Self
    where
        T: Clone,
    {
        for _ in 0..count {
            self.script.push_back(Ok(sample.clone()));
        }
        self
    }
}

impl<T: Send + 'static> CounterSource for ScriptedSource<T> {
    type Sample = T;

    fn category(&self) -> Category {
        self.category
    }

    fn read(&mut self) -> Result<T, SourceUnavailable> {
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(SourceUnavailable::new(self.category, "script exhausted")))
    }
}

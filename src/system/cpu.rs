use std::collections::BTreeMap;
use std::io;
use std::str::FromStr;

use thiserror::Error;

use crate::error::SourceUnavailable;
use crate::system::Category;
use crate::system::collector::{self, UsageTicks};
use crate::system::platform;
use crate::system::source::CounterSource;

/// Accumulated clock ticks since boot, from the aggregate `cpu` line of the
/// kernel statistics table. See `proc_stat(5)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTicks {
    /// Time spent in user mode.
    pub user: u64,
    /// Time spent in user mode with low priority (nice).
    pub nice: u64,
    /// Time spent in system mode.
    pub system: u64,
    /// Time spent in the idle task.
    pub idle: u64,
    /// Time waiting for I/O to complete.
    ///
    /// This value is not reliable and may decrease between reads.
    pub iowait: u64,
    /// Time servicing interrupts.
    pub irq: u64,
    /// Time servicing softirqs.
    pub softirq: u64,
    /// Time stolen by other operating systems when running virtualized.
    pub steal: u64,
    /// Time running a virtual CPU for guests. Already counted in `user`.
    pub guest: u64,
    /// Time running a niced guest. Already counted in `nice`.
    pub guest_nice: u64,
}

/// Processor and core counts of the machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuCounts {
    pub processors: usize,
    pub cores: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CpuSample {
    pub ticks: CpuTicks,
    pub counts: CpuCounts,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CpuStatError {
    #[error("no aggregate `cpu` line in stat table")]
    MissingAggregate,
    #[error("expected between 4 and 10 tick fields, found {0}")]
    FieldCount(usize),
    #[error("invalid tick value `{0}`")]
    Tick(String),
}

impl CpuTicks {
    const MIN_FIELDS: usize = 4;
    const MAX_FIELDS: usize = 10;

    /// Ticks during which the cpu had nothing to run.
    pub fn idle_time(&self) -> u64 {
        self.idle + self.iowait
    }

    /// All ticks. Guest time is excluded since the kernel already folds it
    /// into `user` and `nice`.
    pub fn total_time(&self) -> u64 {
        let Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest: _,
            guest_nice: _,
        } = *self;

        user + nice + system + idle + iowait + irq + softirq + steal
    }
}

impl From<[u64; 10]> for CpuTicks {
    fn from(
        [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ]: [u64; 10],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        }
    }
}

impl FromStr for CpuTicks {
    type Err = CpuStatError;

    /// Parses the tick fields of a `cpu` line, label included. Older kernels
    /// report fewer than ten fields; the missing tail reads as zero.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("cpu") => {}
            _ => return Err(CpuStatError::MissingAggregate),
        }

        let values = tokens
            .map(|t| t.parse::<u64>().map_err(|_| CpuStatError::Tick(t.to_owned())))
            .collect::<Result<Vec<_>, _>>()?;
        if !(Self::MIN_FIELDS..=Self::MAX_FIELDS).contains(&values.len()) {
            return Err(CpuStatError::FieldCount(values.len()));
        }

        let mut fields = [0u64; 10];
        fields[..values.len()].copy_from_slice(&values);
        Ok(Self::from(fields))
    }
}

/// Finds and parses the aggregate `cpu` line of a stat table.
pub fn parse_stat(table: &str) -> Result<CpuTicks, CpuStatError> {
    table
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or(CpuStatError::MissingAggregate)?
        .parse()
}

/// Counts logical processors and physical cores in a cpuinfo table.
///
/// Cores are summed over distinct `physical id`s using each package's
/// `cpu cores`. Tables without topology fields report one core per processor.
pub fn parse_cpuinfo(table: &str) -> CpuCounts {
    let mut processors = 0;
    let mut packages: BTreeMap<String, usize> = BTreeMap::new();
    let mut package: Option<String> = None;
    let mut cores: Option<usize> = None;

    let mut flush = |package: &mut Option<String>, cores: &mut Option<usize>| {
        if let (Some(id), Some(n)) = (package.take(), cores.take()) {
            packages.insert(id, n);
        }
    };

    for line in table.lines() {
        if line.trim().is_empty() {
            flush(&mut package, &mut cores);
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "processor" => processors += 1,
            "physical id" => package = Some(value.trim().to_owned()),
            "cpu cores" => cores = value.trim().parse().ok(),
            _ => {}
        }
    }
    flush(&mut package, &mut cores);

    let cores = match packages.values().sum::<usize>() {
        0 => processors,
        n => n,
    };
    CpuCounts { processors, cores }
}

/// Percentage of non-idle time between two chronologically ordered samples.
///
/// Counters that went backwards contribute nothing. No elapsed ticks reads
/// as an idle machine.
pub fn usage_percent(previous: &CpuTicks, current: &CpuTicks) -> f64 {
    let total = current.total_time().saturating_sub(previous.total_time());
    if total == 0 {
        return 0.0;
    }
    let idle = current
        .idle_time()
        .saturating_sub(previous.idle_time())
        .min(total);

    (total - idle) as f64 / total as f64 * 100.0
}

/// Percentages derived from consecutive samples, one per reported round.
#[derive(Debug, Default)]
pub struct CpuUsageHistory {
    entries: Vec<(u32, f64)>,
}

impl CpuUsageHistory {
    /// Upper bound on what is reserved up front; longer runs grow as they go.
    const PREALLOCATED: usize = 1024;

    pub fn with_capacity(rounds: usize) -> Self {
        Self {
            entries: Vec::with_capacity(rounds.min(Self::PREALLOCATED)),
        }
    }

    /// Appends the percentage for `round` and returns the change from the
    /// previous entry (zero for the first).
    ///
    /// Rounds must arrive in strictly increasing order.
    pub fn record(&mut self, round: u32, percent: f64) -> f64 {
        debug_assert!(
            self.entries.last().is_none_or(|&(last, _)| last < round),
            "cpu history fed out of order"
        );
        let change = self.latest().map_or(0.0, |last| percent - last);
        self.entries.push((round, percent));
        change
    }

    pub fn latest(&self) -> Option<f64> {
        self.entries.last().map(|&(_, percent)| percent)
    }
}

/// Tick counters read from `/proc/stat`, counts from `/proc/cpuinfo`.
///
/// Where the platform has no such tables both come from `sysinfo` instead.
#[derive(Default)]
pub struct ProcStatCpu {
    counts: Option<CpuCounts>,
    usage: Option<UsageTicks>,
}

impl ProcStatCpu {
    fn counts(&mut self) -> Result<CpuCounts, SourceUnavailable> {
        if let Some(counts) = self.counts {
            return Ok(counts);
        }
        let counts = match platform::cpu_info() {
            Ok(table) => parse_cpuinfo(&table),
            Err(err) if err.kind() == io::ErrorKind::Unsupported => collector::cpu_counts(),
            Err(err) => return Err(Self::unavailable(err)),
        };
        self.counts = Some(counts);
        Ok(counts)
    }

    fn ticks(&mut self) -> Result<CpuTicks, SourceUnavailable> {
        match platform::cpu_stat() {
            Ok(table) => parse_stat(&table).map_err(Self::unavailable),
            Err(err) if err.kind() == io::ErrorKind::Unsupported => {
                Ok(self.usage.get_or_insert_with(UsageTicks::new).read())
            }
            Err(err) => Err(Self::unavailable(err)),
        }
    }

    fn unavailable(error: impl ToString) -> SourceUnavailable {
        SourceUnavailable::new(Category::Cpu, error.to_string())
    }
}

impl CounterSource for ProcStatCpu {
    type Sample = CpuSample;

    fn category(&self) -> Category {
        Category::Cpu
    }

    fn read(&mut self) -> Result<CpuSample, SourceUnavailable> {
        let ticks = self.ticks()?;
        let counts = self.counts()?;
        Ok(CpuSample { ticks, counts })
    }
}

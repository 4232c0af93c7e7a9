use sysinfo::{CpuRefreshKind, Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

use super::cpu::{CpuCounts, CpuTicks};
use super::memory::MemorySample;

/// Resident memory of the monitor itself, shown in every report header.
pub trait SelfUsage {
    fn resident_kilobytes(&mut self) -> Option<u64>;
}

/// `sysinfo`-backed counters: physical/swap memory and the monitor's own
/// process.
pub struct Collector {
    sys: System,
    pid: Option<Pid>,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();
        let pid = sysinfo::get_current_pid().ok();
        Collector { sys, pid }
    }

    pub fn memory(&mut self) -> MemorySample {
        self.sys.refresh_memory();
        MemorySample::from_counters(
            self.sys.used_memory(),
            self.sys.total_memory(),
            self.sys.used_swap(),
            self.sys.total_swap(),
        )
    }
}

impl SelfUsage for Collector {
    fn resident_kilobytes(&mut self) -> Option<u64> {
        let pid = self.pid?;
        let pids = [pid];
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&pids),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.sys.process(pid).map(|p| p.memory() / 1024)
    }
}

/// Processor and core counts as `sysinfo` sees them. Used where no processor
/// table can be read.
pub fn cpu_counts() -> CpuCounts {
    let sys =
        System::new_with_specifics(RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()));
    let processors = sys.cpus().len().max(1);
    let cores = System::physical_core_count().unwrap_or(processors);
    CpuCounts { processors, cores }
}

/// Tick counters rebuilt from `sysinfo`'s global usage, for hosts without a
/// kernel tick table.
///
/// Every read adds [`UsageTicks::PER_READ`] ticks split between `user` and
/// `idle`, so the usage between two reads is the usage `sysinfo` measured
/// over that interval.
pub struct UsageTicks {
    sys: System,
    ticks: CpuTicks,
}

impl Default for UsageTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageTicks {
    pub const PER_READ: u64 = 10_000;

    pub fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        UsageTicks {
            sys,
            ticks: CpuTicks::default(),
        }
    }

    pub fn read(&mut self) -> CpuTicks {
        self.sys.refresh_cpu_usage();
        advance(&mut self.ticks, self.sys.global_cpu_usage());
        self.ticks
    }
}

fn advance(ticks: &mut CpuTicks, percent: f32) {
    let busy = (f64::from(percent).clamp(0.0, 100.0) / 100.0 * UsageTicks::PER_READ as f64).round()
        as u64;
    ticks.user += busy;
    ticks.idle += UsageTicks::PER_READ - busy;
}

/// A fixed reading, for reports that must render deterministically.
#[derive(Clone, Copy, Debug, Default)]
pub struct FixedUsage(pub Option<u64>);

impl SelfUsage for FixedUsage {
    fn resident_kilobytes(&mut self) -> Option<u64> {
        self.0
    }
}

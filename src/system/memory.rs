use super::collector::Collector;
use crate::error::SourceUnavailable;
use crate::system::Category;
use crate::system::source::CounterSource;

/// Physical and virtual memory at one instant, in bytes.
///
/// Virtual memory is physical memory plus swap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub used_physical: u64,
    pub total_physical: u64,
    pub used_virtual: u64,
    pub total_virtual: u64,
}

impl MemorySample {
    pub fn from_counters(used_ram: u64, total_ram: u64, used_swap: u64, total_swap: u64) -> Self {
        Self {
            used_physical: used_ram,
            total_physical: total_ram,
            used_virtual: used_ram + used_swap,
            total_virtual: total_ram + total_swap,
        }
    }
}

/// Memory counters from `sysinfo`.
#[derive(Default)]
pub struct SysinfoMemory {
    collector: Collector,
}

impl CounterSource for SysinfoMemory {
    type Sample = MemorySample;

    fn category(&self) -> Category {
        Category::Memory
    }

    fn read(&mut self) -> Result<MemorySample, SourceUnavailable> {
        let sample = self.collector.memory();
        if sample.total_physical == 0 {
            return Err(SourceUnavailable::new(
                Category::Memory,
                "system reported no physical memory",
            ));
        }
        Ok(sample)
    }
}

pub mod collector;
pub mod cpu;
pub mod info;
pub mod memory;
pub mod platform;
pub mod sessions;
pub mod source;

use std::fmt;

/// The statistic categories a worker can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Memory,
    Cpu,
    Sessions,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Memory, Category::Cpu, Category::Sessions];

    pub fn label(self) -> &'static str {
        match self {
            Category::Memory => "memory",
            Category::Cpu => "cpu",
            Category::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

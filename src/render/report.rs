use std::fmt::{self, Write};

use crate::coordinator::message::{CpuResponse, MemoryResponse, RoundIndex, SessionsResponse};
use crate::format::DIVIDER;
use crate::render::{cpu, memory, sessions};
use crate::system::info::SystemInfo;

/// Everything gathered for one round. Built by the supervisor while the
/// round is in flight and dropped once printed.
#[derive(Debug)]
pub struct RoundReport {
    round: RoundIndex,
    pub memory: Option<MemoryResponse>,
    pub cpu: Option<CpuResponse>,
    pub sessions: Option<SessionsResponse>,
}

impl RoundReport {
    pub fn new(round: RoundIndex) -> Self {
        Self {
            round,
            memory: None,
            cpu: None,
            sessions: None,
        }
    }

    pub fn round(&self) -> RoundIndex {
        self.round
    }
}

/// Formatted memory and CPU lines of every reported round so far.
///
/// Append-only: one write per round, in round order. Reports list the whole
/// log with blank rows for rounds still to come.
#[derive(Debug)]
pub struct SampleLog {
    rounds: usize,
    memory: Vec<String>,
    cpu: Vec<String>,
}

impl SampleLog {
    /// Upper bound on what is reserved up front; longer runs grow as they go.
    const PREALLOCATED: usize = 1024;

    pub fn new(rounds: u32) -> Self {
        let rounds = rounds as usize;
        let reserved = rounds.min(Self::PREALLOCATED);
        Self {
            rounds,
            memory: Vec::with_capacity(reserved),
            cpu: Vec::with_capacity(reserved),
        }
    }

    pub fn record(&mut self, report: &RoundReport) {
        if let Some(response) = &report.memory {
            debug_assert!(self.memory.len() < self.rounds, "memory log overflow");
            self.memory.push(response.line.clone());
        }
        if let Some(response) = &report.cpu {
            debug_assert!(self.cpu.len() < self.rounds, "cpu log overflow");
            self.cpu.push(response.line.clone());
        }
    }

    pub fn memory_rows(&self) -> impl Iterator<Item = &str> {
        Self::rows(&self.memory, self.rounds)
    }

    pub fn cpu_rows(&self) -> impl Iterator<Item = &str> {
        Self::rows(&self.cpu, self.rounds)
    }

    fn rows(lines: &[String], rounds: usize) -> impl Iterator<Item = &str> {
        lines
            .iter()
            .map(String::as_str)
            .chain(std::iter::repeat(""))
            .take(rounds)
    }
}

/// Report settings that stay fixed for a run.
#[derive(Clone, Copy, Debug)]
pub struct ReportLayout {
    pub samples: u32,
    pub delay_secs: u64,
    pub graphics: bool,
}

pub fn render_report(
    report: &RoundReport,
    log: &SampleLog,
    layout: &ReportLayout,
    resident_kb: Option<u64>,
) -> String {
    render_with(|out| write_report(out, report, log, layout, resident_kb))
}

pub fn render_system_info(info: &SystemInfo) -> String {
    render_with(|out| write_system_info(out, info))
}

fn render_with(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write(&mut out);
    out
}

fn write_report(
    out: &mut String,
    report: &RoundReport,
    log: &SampleLog,
    layout: &ReportLayout,
    resident_kb: Option<u64>,
) -> fmt::Result {
    let round = report.round();

    writeln!(out, "\n||| Sample #{round} |||")?;
    writeln!(out, "{DIVIDER}")?;
    writeln!(
        out,
        "Nbr of samples: {} -- every {} secs",
        layout.samples, layout.delay_secs
    )?;
    match resident_kb {
        Some(kb) => writeln!(out, "Memory usage: {kb} kilobytes")?,
        None => writeln!(out, "Memory usage: unavailable")?,
    }
    writeln!(out, "{DIVIDER}")?;

    if report.memory.is_some() {
        writeln!(out, "{}", memory::title(layout.graphics))?;
        for row in log.memory_rows() {
            writeln!(out, "{row}")?;
        }
        writeln!(out, "{DIVIDER}")?;
    }

    if let Some(response) = &report.sessions {
        writeln!(out, "{}", sessions::TITLE)?;
        for line in &response.lines {
            writeln!(out, "{line}")?;
        }
        if let Some(line) = sessions::discarded_line(response.discarded) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{DIVIDER}")?;
    }

    if let Some(response) = &report.cpu {
        for line in cpu::counts_lines(&response.counts) {
            writeln!(out, "{line}")?;
        }
        writeln!(out, "{}", response.average_line)?;
        writeln!(out, "{DIVIDER}")?;
        writeln!(out, "{}", cpu::title(layout.graphics))?;
        for row in log.cpu_rows() {
            writeln!(out, "{row}")?;
        }
        writeln!(out, "{DIVIDER}")?;
    }

    writeln!(out, "||| End of Sample #{round} |||\n\n")
}

fn write_system_info(out: &mut String, info: &SystemInfo) -> fmt::Result {
    writeln!(out, "{DIVIDER}")?;
    writeln!(out, "### System Information ###")?;
    writeln!(out, "System Name = {}", info.system_name)?;
    writeln!(out, "Machine Name = {}", info.machine_name)?;
    writeln!(out, "Version = {}", info.version)?;
    writeln!(out, "Release = {}", info.release)?;
    writeln!(out, "Architecture = {}", info.architecture)?;
    writeln!(out, "{DIVIDER}")
}

use crate::system::cpu::CpuCounts;

pub const TITLE: &str = "CPU Utilization (% Use, Relative Abs. Change)";
pub const TITLE_GRAPHICS: &str = "CPU Utilization (% Use, Relative Abs. Change, % Use Graphic)";

pub fn title(graphics: bool) -> &'static str {
    if graphics { TITLE_GRAPHICS } else { TITLE }
}

/// Usage for one round and its change from the previous round.
pub fn cpu_line(percent: f64, change: f64, graphics: bool) -> String {
    let mut line = format!("{percent:.2}% ({change:.2})");
    if graphics {
        line.push('\t');
        line.push_str(&cpu_graphic(percent));
    }
    line
}

/// One bar per percentage point, after a three-bar lead.
pub fn cpu_graphic(percent: f64) -> String {
    let bars = percent.clamp(0.0, 100.0).round() as usize;
    format!("|||{} {percent:.2}", "|".repeat(bars))
}

pub fn average_line(average: f64) -> String {
    format!("\tAverage Usage = {average:.4}%")
}

pub fn counts_lines(counts: &CpuCounts) -> [String; 2] {
    [
        format!("Number of processors: {}", counts.processors),
        format!("Total number of cores: {}", counts.cores),
    ]
}

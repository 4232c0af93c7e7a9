use crate::format::{format_gigabytes, gigabytes};
use crate::system::memory::MemorySample;

pub const TITLE: &str = "### Memory ### (Phys.Used/Tot -- Virtual Used/Tot)";
pub const TITLE_GRAPHICS: &str =
    "### Memory ### (Phys.Used/Tot -- Virtual Used/Tot, Memory Graphic)";

/// One bar per this many gigabytes of change in used virtual memory.
const STEP_GB: f64 = 0.01;
const MAX_BARS: usize = 100;

pub fn title(graphics: bool) -> &'static str {
    if graphics { TITLE_GRAPHICS } else { TITLE }
}

pub fn memory_line(
    current: &MemorySample,
    previous: Option<&MemorySample>,
    graphics: bool,
) -> String {
    let mut line = format!(
        "{} / {} -- {} / {}",
        format_gigabytes(current.used_physical),
        format_gigabytes(current.total_physical),
        format_gigabytes(current.used_virtual),
        format_gigabytes(current.total_virtual),
    );
    if graphics {
        line.push('\t');
        line.push_str(&memory_graphic(current, previous));
    }
    line
}

/// Bar graph of the change in used virtual memory since `previous`.
///
/// Growth draws `#` bars capped with `*`, shrinkage draws `:` bars capped
/// with `@`, and no visible change draws `o`.
pub fn memory_graphic(current: &MemorySample, previous: Option<&MemorySample>) -> String {
    let used = gigabytes(current.used_virtual);
    let delta = previous.map_or(0.0, |p| used - gigabytes(p.used_virtual));
    let steps = ((delta.abs() / STEP_GB).round() as usize).min(MAX_BARS);

    let (bar, delta) = match steps {
        0 => ("o".to_owned(), 0.0),
        n if delta > 0.0 => ("#".repeat(n) + "*", delta),
        n => (":".repeat(n) + "@", delta),
    };
    format!("|{bar} {delta:.2} ({used:.2})")
}

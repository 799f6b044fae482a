/// Size formatting utilities: human-readable byte counts.
///
/// All internal sizes are `u64` bytes. Floating point is only used
/// at the display-formatting boundary.
use crate::config::UnitBase;

const BINARY_UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
const SI_UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count into a human-readable string with one decimal.
///
/// `Binary` steps by 1024 and labels KiB, MiB, …; `Si` steps by 1000 and
/// labels kB, MB, ….
pub fn format_size(bytes: u64, base: UnitBase) -> String {
    let (step, units) = match base {
        UnitBase::Binary => (1024.0, &BINARY_UNITS),
        UnitBase::Si => (1000.0, &SI_UNITS),
    };

    let mut value = bytes as f64;
    if value < step {
        return format!("{bytes} B");
    }
    let mut unit = 0;
    value /= step;
    while value >= step && unit + 1 < units.len() {
        value /= step;
        unit += 1;
    }
    format!("{value:.1} {}", units[unit])
}

/// Format a file count with thousand separators.
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        return count.to_string();
    }
    let s = count.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

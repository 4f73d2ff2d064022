const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Formats a byte count for display.
///
/// Below 1 KiB the exact byte count is shown; below 1 MiB the value is shown
/// in KB, otherwise in MB, both with one decimal place.
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{bytes} bytes")
    } else if bytes < MIB {
        format!("{:.1} KB", one_decimal(bytes, KIB))
    } else {
        format!("{:.1} MB", one_decimal(bytes, MIB))
    }
}

/// `bytes / unit` rounded half away from zero to one decimal place.
///
/// `{:.1}` alone rounds exact ties to even (1.25 -> "1.2").
fn one_decimal(bytes: u64, unit: u64) -> f64 {
    (bytes as f64 / unit as f64 * 10.0).round() / 10.0
}

use chrono::{DateTime, Local};

/// Formats a millisecond epoch timestamp as local `HH:MM:SS.mmm` for the
/// data hub table.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match DateTime::from_timestamp_millis(timestamp_ms) {
        Some(utc) => utc.with_timezone(&Local).format("%H:%M:%S%.3f").to_string(),
        None => format!("Invalid timestamp: {}", timestamp_ms),
    }
}

/// File name for a CSV export, unique per second.
pub fn export_file_name() -> String {
    format!("dispmon_export_{}.csv", Local::now().format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_valid_timestamp() {
        let text = format_timestamp(1_700_000_000_000);
        // HH:MM:SS.mmm regardless of local timezone.
        assert_eq!(text.len(), 12);
        assert_eq!(text.matches(':').count(), 2);
        assert_eq!(text.matches('.').count(), 1);
    }

    #[test]
    fn flags_out_of_range_timestamp() {
        assert!(format_timestamp(i64::MAX).starts_with("Invalid timestamp"));
    }

    #[test]
    fn export_file_name_shape() {
        let name = export_file_name();
        assert!(name.starts_with("dispmon_export_"));
        assert!(name.ends_with(".csv"));
    }
}

//! Byte count formatting

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Render a byte count with binary (1024-based) units.
///
/// Below 1 KB the count is printed as-is with a `B` suffix; above, the
/// value is scaled to KB, MB or GB and rounded half-up to two decimals.
pub fn format_size(bytes: u64) -> String {
    let (unit, suffix) = match bytes {
        b if b < KB => return format!("{} B", b),
        b if b < MB => (KB, "KB"),
        b if b < GB => (MB, "MB"),
        _ => (GB, "GB"),
    };

    // Fixed-point hundredths, rounded half-up
    let unit = unit as u128;
    let hundredths = (bytes as u128 * 200 + unit) / (unit * 2);
    format!("{}.{:02} {}", hundredths / 100, hundredths % 100, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_048_576), "1.00 MB");
        assert_eq!(format_size(1_073_741_824), "1.00 GB");
    }

    #[test]
    fn test_rounding() {
        // 1.125 KB rounds half-up
        assert_eq!(format_size(1152), "1.13 KB");
        assert_eq!(format_size(MB - 1), "1024.00 KB");
        assert_eq!(format_size(5 * GB + GB / 4), "5.25 GB");
        assert_eq!(format_size(2048 * GB), "2048.00 GB");
    }

    #[test]
    fn test_max_value() {
        let out = format_size(u64::MAX);
        assert!(out.ends_with(" GB"));
        assert!(out.starts_with("17179869184.00"));
    }

    proptest! {
        #[test]
        fn prop_plain_bytes(bytes in 0u64..KB) {
            prop_assert_eq!(format_size(bytes), format!("{} B", bytes));
        }

        #[test]
        fn prop_scaled_units(bytes in KB..u64::MAX) {
            let out = format_size(bytes);
            let (value, suffix) = out.split_once(' ').unwrap();
            let expected = if bytes < MB { "KB" } else if bytes < GB { "MB" } else { "GB" };
            prop_assert_eq!(suffix, expected);

            let (_, decimals) = value.split_once('.').unwrap();
            prop_assert_eq!(decimals.len(), 2);

            let parsed: f64 = value.parse().unwrap();
            prop_assert!(parsed >= 1.0);
            if suffix != "GB" {
                prop_assert!(parsed <= 1024.0);
            }
        }
    }
}

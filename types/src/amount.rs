//! Denominations of the staking asset.
//!
//! Amounts travel on the wire as `u64` counts of the smallest unit.

/// Smallest unit.
pub const NANO_AVAX: u64 = 1;
/// 10^9 nano units.
pub const AVAX: u64 = 1_000_000_000 * NANO_AVAX;

/// Render a nano-unit amount as a decimal string of whole units.
pub fn format_units(amount: u64) -> String {
    let whole = amount / AVAX;
    let frac = amount % AVAX;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_and_fractional() {
        assert_eq!(format_units(2_000 * AVAX), "2000");
        assert_eq!(format_units(1_500_000_000), "1.5");
        assert_eq!(format_units(1), "0.000000001");
        assert_eq!(format_units(0), "0");
    }
}

//! Display formatting. Amounts are rounded here and nowhere else.

use uz_customs_fees::schedule::group_thousands;

pub fn format_som(amount: f64) -> String {
    format!("{} so'm", group_thousands(amount.round()))
}

pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round();
    let whole = (cents / 100.0).trunc();
    let fraction = cents - whole * 100.0;
    let sign = if amount < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(whole), fraction as u64)
}

pub fn format_rate(rate: f64) -> String {
    format!("{:.2}", rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_som_rounds_to_whole_units() {
        assert_eq!(format_som(2_380_000.0), "2,380,000 so'm");
        assert_eq!(format_som(101_999.6), "102,000 so'm");
        assert_eq!(format_som(-476_000.0), "-476,000 so'm");
    }

    #[test]
    fn test_usd_keeps_cents() {
        assert_eq!(format_usd(187.4015748), "$187.40");
        assert_eq!(format_usd(1_234_567.899), "$1,234,567.90");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(-5.5), "-$5.50");
    }
}

//! Accepted ranges for user-facing inputs. Values outside a range are rejected, never clamped.

use crate::error::FeeError;

pub const CUSTOMS_VALUE_USD: (f64, f64) = (0.0, 50_000_000.0);
pub const BHM: (f64, f64) = (100_000.0, 2_000_000.0);
pub const EXCHANGE_RATE: (f64, f64) = (5_000.0, 50_000.0);
pub const DAYS: (u32, u32) = (1, 365);
pub const DISTANCE_KM: (f64, f64) = (1.0, 5_000.0);
pub const COUNT: (f64, f64) = (1.0, 1_000.0);
pub const WHOLE_COUNT: (u32, u32) = (1, 1_000);
pub const RATE_TTL_MINUTES: (i64, i64) = (1, 1_440);

pub fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<f64, FeeError> {
    if !value.is_finite() {
        return Err(FeeError::invalid_input(field, value, "must be a finite number"));
    }
    if value < min || value > max {
        return Err(FeeError::invalid_input(
            field,
            value,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(value)
}

pub fn check_non_negative(field: &'static str, value: f64) -> Result<f64, FeeError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FeeError::invalid_input(field, value, "must be zero or greater"));
    }
    Ok(value)
}

pub fn check_positive(field: &'static str, value: f64) -> Result<f64, FeeError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(FeeError::invalid_input(field, value, "must be greater than zero"));
    }
    Ok(value)
}

pub fn check_days(days: u32) -> Result<u32, FeeError> {
    let (min, max) = DAYS;
    if days < min || days > max {
        return Err(FeeError::invalid_input(
            "days",
            days as f64,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(days)
}

pub fn check_whole_count(field: &'static str, count: u32) -> Result<u32, FeeError> {
    let (min, max) = WHOLE_COUNT;
    if count < min || count > max {
        return Err(FeeError::invalid_input(
            field,
            count as f64,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(count)
}

/// Like [`check_range`] with [`COUNT`], but fractional values are rejected.
pub fn check_integral_count(field: &'static str, count: f64) -> Result<f64, FeeError> {
    let count = check_range(field, count, COUNT)?;
    if count.fract() != 0.0 {
        return Err(FeeError::invalid_input(field, count, "must be a whole number"));
    }
    Ok(count)
}

pub fn check_rate_ttl_minutes(minutes: i64) -> Result<i64, FeeError> {
    let (min, max) = RATE_TTL_MINUTES;
    if minutes < min || minutes > max {
        return Err(FeeError::invalid_input(
            "rate TTL minutes",
            minutes as f64,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(minutes)
}

pub fn check_bhm(bhm: f64) -> Result<f64, FeeError> {
    check_range("BHM", bhm, BHM)
}

pub fn check_exchange_rate(rate: f64) -> Result<f64, FeeError> {
    check_range("exchange rate", rate, EXCHANGE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(check_range("customs value", 0.0, CUSTOMS_VALUE_USD).is_ok());
        assert!(check_range("customs value", 50_000_000.0, CUSTOMS_VALUE_USD).is_ok());
        assert!(check_range("customs value", 50_000_000.01, CUSTOMS_VALUE_USD).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(check_range("BHM", f64::NAN, BHM).is_err());
        assert!(check_non_negative("hours", f64::INFINITY).is_err());
        assert!(check_positive("weight", f64::NAN).is_err());
    }

    #[test]
    fn test_days_range() {
        assert!(check_days(0).is_err());
        assert_eq!(check_days(1), Ok(1));
        assert_eq!(check_days(365), Ok(365));
        assert!(check_days(366).is_err());
    }

    #[test]
    fn test_error_names_field() {
        let err = check_bhm(50_000.0).unwrap_err();
        match err {
            FeeError::InvalidInput { field, value, .. } => {
                assert_eq!(field, "BHM");
                assert_eq!(value, 50_000.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_whole_counts() {
        assert!(check_whole_count("vehicle count", 0).is_err());
        assert_eq!(check_whole_count("vehicle count", 1_000), Ok(1_000));
        assert!(check_whole_count("vehicle count", 1_001).is_err());

        assert_eq!(check_integral_count("count", 3.0), Ok(3.0));
        assert!(check_integral_count("count", 2.5).is_err());
        assert!(check_integral_count("count", 1_001.0).is_err());
    }

    #[test]
    fn test_rate_ttl_range() {
        assert!(check_rate_ttl_minutes(0).is_err());
        assert_eq!(check_rate_ttl_minutes(1_440), Ok(1_440));
        assert!(check_rate_ttl_minutes(i64::MAX).is_err());
    }
}

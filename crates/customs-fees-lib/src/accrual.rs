use crate::data_structures::PeriodRate;
use crate::error::FeeError;

/// Days of a storage term that fall into one period of the schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayBucket {
    first_day: u32,
    days: u32,
    rate: f64,
}

impl DayBucket {
    pub fn first_day(&self) -> u32 {
        self.first_day
    }

    pub fn last_day(&self) -> u32 {
        self.first_day + self.days - 1
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn label(&self) -> String {
        if self.days == 1 {
            format!("Day {}", self.first_day)
        } else {
            format!("Days {}-{}", self.first_day, self.last_day())
        }
    }
}

/// Splits `total_days` into consecutive buckets following `periods`.
///
/// Each bucket takes `min(remaining, capacity)` days, where capacity is the
/// distance from the previous period's limit. Periods that receive no days
/// are left out, so the result may be shorter than `periods`.
pub fn split_days(total_days: u32, periods: &[PeriodRate]) -> Result<Vec<DayBucket>, FeeError> {
    let mut buckets = Vec::new();
    let mut remaining = total_days;
    let mut covered = 0u32;

    for period in periods {
        if remaining == 0 {
            break;
        }

        let capacity = match period.day_limit() {
            Some(limit) => limit.saturating_sub(covered),
            None => u32::MAX,
        };
        let days = remaining.min(capacity);

        if days > 0 {
            buckets.push(DayBucket {
                first_day: covered + 1,
                days,
                rate: period.rate(),
            });
        }

        remaining -= days;
        covered += days;
    }

    let assigned: u32 = buckets.iter().map(|b| b.days).sum();
    if assigned != total_days {
        return Err(FeeError::InvalidSchedule(format!(
            "storage periods cover {} of {} days",
            assigned, total_days
        )));
    }

    Ok(buckets)
}

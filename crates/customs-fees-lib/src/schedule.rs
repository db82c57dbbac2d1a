use crate::data_structures::{
    PeriodRate, RateTier, ServiceFee, StorageSchedule, StorageSite, TariffRow, TierTable,
};
use std::collections::HashMap;

/// BHM for 2025, in so'm.
pub const DEFAULT_BHM: f64 = 340_000.0;

/// Used when the central bank rate cannot be fetched, in so'm per USD.
pub const FALLBACK_USD_RATE: f64 = 12_700.0;

/// Share of the base declaration fee waived for early (pre-arrival) declarations.
pub const EARLY_DECLARATION_DISCOUNT: f64 = 0.2;
pub const AFTER_HOURS_SURCHARGE: f64 = 0.25;
pub const INSPECTION_RATE_NORMAL: f64 = 0.25;
pub const INSPECTION_RATE_AFTER_HOURS: f64 = 2.0;

/// Distance up to which the short escort rate applies, inclusive.
pub const ESCORT_DISTANCE_THRESHOLD_KM: f64 = 200.0;

/// Resolution No. 55 rate tables. Rates are multiples of BHM.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    declaration_tiers: TierTable,
    escort_tiers: TierTable,
    warehouse: StorageSchedule,
    border_post: StorageSchedule,
    service_rates: HashMap<ServiceFee, f64>,
}

impl FeeSchedule {
    pub fn resolution_55() -> Self {
        let declaration_tiers = TierTable::from_static(vec![
            RateTier::new(10_000.0, 1.0),
            RateTier::new(20_000.0, 1.5),
            RateTier::new(40_000.0, 2.5),
            RateTier::new(60_000.0, 4.0),
            RateTier::new(100_000.0, 7.0),
            RateTier::new(200_000.0, 10.0),
            RateTier::new(500_000.0, 15.0),
            RateTier::new(1_000_000.0, 20.0),
            RateTier::open_ended(25.0),
        ]);

        let escort_tiers = TierTable::from_static(vec![
            RateTier::new(ESCORT_DISTANCE_THRESHOLD_KM, 2.0),
            RateTier::open_ended(5.0),
        ]);

        // Per ton-day: first 10 days, then every following day.
        let warehouse = StorageSchedule::from_static(
            StorageSite::Warehouse,
            1000.0,
            vec![PeriodRate::until(10, 0.03), PeriodRate::onwards(0.04)],
            0.05,
        );

        // Per 100 kg-day at border posts.
        let border_post = StorageSchedule::from_static(
            StorageSite::BorderPost,
            100.0,
            vec![
                PeriodRate::until(5, 0.01),
                PeriodRate::until(15, 0.015),
                PeriodRate::onwards(0.02),
            ],
            0.025,
        );

        let mut service_rates = HashMap::new();
        service_rates.insert(ServiceFee::Transit, 0.25);
        service_rates.insert(ServiceFee::CurrencyDeclaration, 2.5);
        service_rates.insert(ServiceFee::ReceiptOrder, 0.25);
        service_rates.insert(ServiceFee::Courier, 0.02);
        service_rates.insert(ServiceFee::DeclarationAmendment, 0.25);
        service_rates.insert(ServiceFee::AfterHoursDeclaration, 0.25);
        service_rates.insert(ServiceFee::IpRegistry, 1.0);
        service_rates.insert(ServiceFee::PreliminaryRuling, 0.75);

        Self {
            declaration_tiers,
            escort_tiers,
            warehouse,
            border_post,
            service_rates,
        }
    }

    pub fn declaration_tiers(&self) -> &TierTable {
        &self.declaration_tiers
    }

    pub fn escort_tiers(&self) -> &TierTable {
        &self.escort_tiers
    }

    pub fn storage(&self, site: StorageSite) -> &StorageSchedule {
        match site {
            StorageSite::Warehouse => &self.warehouse,
            StorageSite::BorderPost => &self.border_post,
        }
    }

    pub fn service_rate(&self, service: ServiceFee) -> Option<f64> {
        self.service_rates.get(&service).copied()
    }

    /// Rows of the customs-value table with the fee at `bhm`.
    pub fn tariff_rows(&self, bhm: f64) -> Vec<TariffRow> {
        let mut rows = Vec::new();
        let mut lower: Option<f64> = None;

        for tier in self.declaration_tiers.tiers() {
            let label = match (lower, tier.is_open_ended()) {
                (None, _) => format!("up to {}", group_thousands(tier.upper_bound())),
                (Some(low), false) => format!(
                    "{} - {}",
                    group_thousands(low),
                    group_thousands(tier.upper_bound())
                ),
                (Some(low), true) => format!("over {}", group_thousands(low)),
            };
            rows.push(TariffRow::new(label, tier.multiplier(), tier.multiplier() * bhm));
            lower = Some(tier.upper_bound());
        }

        rows
    }

    /// Price list for everything outside the customs-value table.
    pub fn service_rows(&self, bhm: f64) -> Vec<TariffRow> {
        let mut rows: Vec<TariffRow> = ServiceFee::all()
            .into_iter()
            .filter_map(|service| {
                self.service_rate(service).map(|rate| {
                    TariffRow::new(
                        format!("{} (per {})", service.name(), service.unit()),
                        rate,
                        rate * bhm,
                    )
                })
            })
            .collect();

        for site in StorageSite::all() {
            let schedule = self.storage(site);
            let mut first_day = 1;
            for period in schedule.periods() {
                let days = match period.day_limit() {
                    Some(limit) => format!("days {}-{}", first_day, limit),
                    None => format!("day {} onwards", first_day),
                };
                rows.push(TariffRow::new(
                    format!(
                        "{} storage per {} per day, {}",
                        site.name(),
                        schedule.unit_name(),
                        days
                    ),
                    period.rate(),
                    period.rate() * bhm,
                ));
                if let Some(limit) = period.day_limit() {
                    first_day = limit + 1;
                }
            }
        }

        let mut lower: Option<f64> = None;
        for tier in self.escort_tiers.tiers() {
            let label = match lower {
                None => format!("Transport escort up to {} km (per vehicle)", tier.upper_bound()),
                Some(low) => format!("Transport escort over {} km (per vehicle)", low),
            };
            rows.push(TariffRow::new(label, tier.multiplier(), tier.multiplier() * bhm));
            lower = Some(tier.upper_bound());
        }

        rows
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::resolution_55()
    }
}

/// Formats a whole number with comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let s = format!("{:.0}", value.abs());
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    if value < 0.0 && s != "0" {
        result.push('-');
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_tables_are_valid() {
        let schedule = FeeSchedule::resolution_55();
        assert!(TierTable::new(schedule.declaration_tiers().tiers().to_vec()).is_ok());
        assert!(TierTable::new(schedule.escort_tiers().tiers().to_vec()).is_ok());

        for site in StorageSite::all() {
            let storage = schedule.storage(site);
            assert!(StorageSchedule::new(
                storage.site(),
                storage.weight_unit_kg(),
                storage.periods().to_vec(),
                storage.perishable_rate(),
            )
            .is_ok());
        }
    }

    #[test]
    fn test_every_service_has_a_rate() {
        let schedule = FeeSchedule::resolution_55();
        for service in ServiceFee::all() {
            assert!(schedule.service_rate(service).is_some(), "{:?}", service);
        }
        assert_eq!(schedule.service_rate(ServiceFee::CurrencyDeclaration), Some(2.5));
        assert_eq!(schedule.service_rate(ServiceFee::PreliminaryRuling), Some(0.75));
    }

    #[test]
    fn test_tariff_rows_match_published_fees() {
        let rows = FeeSchedule::resolution_55().tariff_rows(DEFAULT_BHM);
        let fees: Vec<f64> = rows.iter().map(|r| r.fee()).collect();
        assert_eq!(
            fees,
            vec![
                340_000.0, 510_000.0, 850_000.0, 1_360_000.0, 2_380_000.0, 3_400_000.0,
                5_100_000.0, 6_800_000.0, 8_500_000.0
            ]
        );
        assert_eq!(rows[0].range_label(), "up to 10,000");
        assert_eq!(rows[1].range_label(), "10,000 - 20,000");
        assert_eq!(rows[8].range_label(), "over 1,000,000");
    }

    #[test]
    fn test_storage_units() {
        let schedule = FeeSchedule::resolution_55();
        assert_eq!(schedule.storage(StorageSite::Warehouse).weight_unit_kg(), 1000.0);
        assert_eq!(schedule.storage(StorageSite::BorderPost).weight_unit_kg(), 100.0);
        assert_eq!(schedule.storage(StorageSite::Warehouse).unit_name(), "1 t");
    }

    #[test]
    fn test_service_rows_include_storage_and_escort() {
        let rows = FeeSchedule::resolution_55().service_rows(DEFAULT_BHM);
        assert!(rows.iter().any(|r| r.range_label().contains("escort up to 200")));
        assert!(rows
            .iter()
            .any(|r| r.range_label().contains("Customs warehouse")
                && (r.fee() - 13_600.0).abs() < 1e-6));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(2_380_000.0), "2,380,000");
        assert_eq!(group_thousands(-476_000.4), "-476,000");
    }
}

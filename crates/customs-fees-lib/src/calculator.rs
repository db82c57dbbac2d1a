use crate::accrual::split_days;
use crate::data_structures::{
    DeclarationScenario, EscortScenario, FeeBreakdown, RateTier, ServiceScenario,
    StorageSchedule, StorageScenario, TariffPoint, TierTable,
};
use crate::error::FeeError;
use crate::schedule::{
    AFTER_HOURS_SURCHARGE, EARLY_DECLARATION_DISCOUNT, INSPECTION_RATE_AFTER_HOURS,
    INSPECTION_RATE_NORMAL,
};
use crate::validation::{
    check_bhm, check_days, check_exchange_rate, check_integral_count, check_non_negative,
    check_positive, check_range, check_whole_count, COUNT, CUSTOMS_VALUE_USD, DISTANCE_KM,
};

/// Sample customs values (USD) for the fee curve.
pub const TARIFF_CURVE_SAMPLES: [f64; 9] = [
    5_000.0, 15_000.0, 30_000.0, 50_000.0, 80_000.0, 150_000.0, 350_000.0, 750_000.0,
    1_500_000.0,
];

/// Returns the multiplier of the first tier whose upper bound is at least `value`.
///
/// Boundaries are inclusive: a value sitting exactly on a bound belongs to the
/// lower tier.
pub fn tier_rate(value: f64, tiers: &[RateTier]) -> Result<f64, FeeError> {
    if value.is_nan() || value < 0.0 {
        return Err(FeeError::invalid_input(
            "tier value",
            value,
            "must be zero or greater",
        ));
    }

    tiers
        .iter()
        .find(|tier| value <= tier.upper_bound())
        .map(|tier| tier.multiplier())
        .ok_or(FeeError::NoMatchingTier(value))
}

pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Base declaration fee by customs value, with the early-declaration
    /// discount applied to the base only, plus after-hours and inspection charges.
    pub fn declaration_fee(
        &self,
        scenario: &DeclarationScenario,
        bhm: f64,
        tiers: &TierTable,
    ) -> Result<FeeBreakdown, FeeError> {
        let bhm = check_bhm(bhm)?;
        let value = check_range("customs value", scenario.customs_value_usd, CUSTOMS_VALUE_USD)?;
        let hours_normal =
            check_non_negative("inspection hours", scenario.inspection_hours_normal)?;
        let hours_after =
            check_non_negative("after-hours inspection hours", scenario.inspection_hours_after_hours)?;

        let multiplier = tier_rate(value, tiers.tiers())?;
        let base = multiplier * bhm;

        let mut breakdown = FeeBreakdown::new();
        breakdown.push(format!("Declaration fee ({} BHM)", multiplier), base);

        if scenario.early_declaration {
            breakdown.push(
                format!(
                    "Early declaration discount ({}%)",
                    EARLY_DECLARATION_DISCOUNT * 100.0
                ),
                -(EARLY_DECLARATION_DISCOUNT * base),
            );
        }

        if scenario.after_hours {
            breakdown.push("After-hours surcharge", AFTER_HOURS_SURCHARGE * bhm);
        }

        if hours_normal > 0.0 {
            breakdown.push(
                format!("Inspection, working hours ({} h)", hours_normal),
                INSPECTION_RATE_NORMAL * bhm * hours_normal,
            );
        }

        if hours_after > 0.0 {
            breakdown.push(
                format!("Inspection, after hours ({} h)", hours_after),
                INSPECTION_RATE_AFTER_HOURS * bhm * hours_after,
            );
        }

        Ok(breakdown)
    }

    pub fn storage_fee(
        &self,
        scenario: &StorageScenario,
        bhm: f64,
        schedule: &StorageSchedule,
    ) -> Result<FeeBreakdown, FeeError> {
        let bhm = check_bhm(bhm)?;
        let weight_kg = check_positive("weight", scenario.weight_kg)?;
        let total_days = check_days(scenario.total_days)?;
        if scenario.site != schedule.site() {
            return Err(FeeError::InvalidSchedule(format!(
                "{} schedule used for {} storage",
                schedule.site().name(),
                scenario.site.name()
            )));
        }

        let units = weight_kg / schedule.weight_unit_kg();
        let mut breakdown = FeeBreakdown::new();

        if scenario.perishable {
            breakdown.push(
                format!(
                    "Perishable goods, {} days at {} BHM per {}",
                    total_days,
                    schedule.perishable_rate(),
                    schedule.unit_name()
                ),
                schedule.perishable_rate() * bhm * units * total_days as f64,
            );
            return Ok(breakdown);
        }

        for bucket in split_days(total_days, schedule.periods())? {
            breakdown.push(
                format!(
                    "{} at {} BHM per {}",
                    bucket.label(),
                    bucket.rate(),
                    schedule.unit_name()
                ),
                bucket.days() as f64 * bucket.rate() * bhm * units,
            );
        }

        Ok(breakdown)
    }

    pub fn escort_fee(
        &self,
        scenario: &EscortScenario,
        bhm: f64,
        tiers: &TierTable,
    ) -> Result<FeeBreakdown, FeeError> {
        let bhm = check_bhm(bhm)?;
        let distance = check_range("distance", scenario.distance_km, DISTANCE_KM)?;
        let vehicles = check_whole_count("vehicle count", scenario.vehicles)?;

        let rate = tier_rate(distance, tiers.tiers())?;
        let mut breakdown = FeeBreakdown::new();
        breakdown.push(
            format!(
                "Escort over {} km, {} vehicle(s) at {} BHM",
                distance, vehicles, rate
            ),
            self.counted_fee(rate, bhm, vehicles as f64),
        );

        Ok(breakdown)
    }

    pub fn service_fee(
        &self,
        scenario: &ServiceScenario,
        bhm: f64,
        rate: f64,
    ) -> Result<FeeBreakdown, FeeError> {
        let bhm = check_bhm(bhm)?;
        let count = if scenario.service.is_whole_count() {
            check_integral_count("count", scenario.count)?
        } else {
            check_range("count", scenario.count, COUNT)?
        };

        let mut breakdown = FeeBreakdown::new();
        breakdown.push(
            format!(
                "{}, {} {}(s) at {} BHM",
                scenario.service.name(),
                count,
                scenario.service.unit(),
                rate
            ),
            self.counted_fee(rate, bhm, count),
        );

        Ok(breakdown)
    }

    pub fn counted_fee(&self, rate: f64, bhm: f64, count: f64) -> f64 {
        rate * bhm * count
    }

    /// Fee at each sample value and the fee's share of the goods' value in so'm.
    pub fn tariff_curve(
        &self,
        values: &[f64],
        bhm: f64,
        usd_rate: f64,
        tiers: &TierTable,
    ) -> Result<Vec<TariffPoint>, FeeError> {
        let bhm = check_bhm(bhm)?;
        let usd_rate = check_exchange_rate(usd_rate)?;

        values
            .iter()
            .map(|&value| {
                let value = check_range("customs value", value, CUSTOMS_VALUE_USD)?;
                let fee = tier_rate(value, tiers.tiers())? * bhm;
                let local_value = self.goods_value_local(value, usd_rate);
                let share = if local_value > 0.0 {
                    fee / local_value * 100.0
                } else {
                    0.0
                };
                Ok(TariffPoint::new(value, fee, share))
            })
            .collect()
    }

    pub fn goods_value_local(&self, value_usd: f64, usd_rate: f64) -> f64 {
        value_usd * usd_rate
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{ServiceFee, StorageSite};
    use crate::schedule::{FeeSchedule, DEFAULT_BHM};
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    fn declaration(value: f64) -> DeclarationScenario {
        DeclarationScenario::new(value)
    }

    #[test]
    fn test_tier_boundary_is_inclusive() {
        let schedule = FeeSchedule::resolution_55();
        let tiers = schedule.declaration_tiers().tiers();

        assert_eq!(tier_rate(0.0, tiers).unwrap(), 1.0);
        assert_eq!(tier_rate(10_000.0, tiers).unwrap(), 1.0);
        assert_eq!(tier_rate(10_000.01, tiers).unwrap(), 1.5);
        assert_eq!(tier_rate(1_000_000.0, tiers).unwrap(), 20.0);
        assert_eq!(tier_rate(1_000_000.5, tiers).unwrap(), 25.0);
    }

    #[test]
    fn test_tier_rate_rejects_negative_value() {
        let schedule = FeeSchedule::resolution_55();
        let result = tier_rate(-1.0, schedule.declaration_tiers().tiers());
        assert!(matches!(result, Err(FeeError::InvalidInput { .. })));
        assert!(tier_rate(f64::NAN, schedule.declaration_tiers().tiers()).is_err());
    }

    #[test]
    fn test_tier_rate_without_open_tier() {
        let tiers = [RateTier::new(100.0, 1.0)];
        assert_eq!(tier_rate(150.0, &tiers), Err(FeeError::NoMatchingTier(150.0)));
    }

    #[test]
    fn test_declaration_fee_without_modifiers() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();

        let breakdown = calculator
            .declaration_fee(&declaration(50_000.0), DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        assert_close(breakdown.total(), 1_360_000.0);

        let breakdown = calculator
            .declaration_fee(&declaration(60_000.01), DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        assert_close(breakdown.total(), 2_380_000.0);
        assert_eq!(breakdown.items().len(), 1);
    }

    #[test]
    fn test_early_declaration_on_mid_tier_value() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let mut scenario = declaration(50_000.0);
        scenario.early_declaration = true;

        let breakdown = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        assert_close(breakdown.total(), 1_360_000.0 * 0.8);
    }

    #[test]
    fn test_early_declaration_discounts_base() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let mut scenario = declaration(80_000.0);
        scenario.early_declaration = true;

        let breakdown = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        assert_close(breakdown.total(), 1_904_000.0);
        assert_close(breakdown.items()[1].amount(), -476_000.0);
    }

    #[test]
    fn test_discount_does_not_touch_surcharges() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let mut scenario = declaration(80_000.0);
        scenario.after_hours = true;
        scenario.inspection_hours_normal = 2.0;
        scenario.inspection_hours_after_hours = 1.0;

        let full = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        scenario.early_declaration = true;
        let discounted = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();

        // base 2,380,000; surcharge 85,000; inspection 170,000 + 680,000
        assert_close(full.total(), 2_380_000.0 + 85_000.0 + 170_000.0 + 680_000.0);
        assert_close(full.total() - discounted.total(), 0.2 * 2_380_000.0);
    }

    #[test]
    fn test_declaration_rejects_out_of_range_value() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();

        let result = calculator.declaration_fee(
            &declaration(60_000_000.0),
            DEFAULT_BHM,
            schedule.declaration_tiers(),
        );
        assert!(matches!(result, Err(FeeError::InvalidInput { field: "customs value", .. })));

        let mut scenario = declaration(1_000.0);
        scenario.inspection_hours_normal = -1.0;
        assert!(calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .is_err());

        assert!(calculator
            .declaration_fee(&declaration(1_000.0), 1_000.0, schedule.declaration_tiers())
            .is_err());
    }

    #[test]
    fn test_storage_fee_is_additive_over_periods() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let scenario = StorageScenario {
            site: StorageSite::Warehouse,
            weight_kg: 1000.0,
            total_days: 15,
            perishable: false,
        };

        let breakdown = calculator
            .storage_fee(&scenario, DEFAULT_BHM, schedule.storage(StorageSite::Warehouse))
            .unwrap();
        assert_eq!(breakdown.items().len(), 2);
        assert_close(
            breakdown.total(),
            10.0 * 0.03 * DEFAULT_BHM + 5.0 * 0.04 * DEFAULT_BHM,
        );
    }

    #[test]
    fn test_border_post_uses_hundred_kg_units() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let scenario = StorageScenario {
            site: StorageSite::BorderPost,
            weight_kg: 250.0,
            total_days: 20,
            perishable: false,
        };

        let breakdown = calculator
            .storage_fee(&scenario, DEFAULT_BHM, schedule.storage(StorageSite::BorderPost))
            .unwrap();
        let expected = 2.5 * DEFAULT_BHM * (5.0 * 0.01 + 10.0 * 0.015 + 5.0 * 0.02);
        assert_eq!(breakdown.items().len(), 3);
        assert_close(breakdown.total(), expected);
    }

    #[test]
    fn test_perishable_storage_uses_flat_rate() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let warehouse = schedule.storage(StorageSite::Warehouse);

        for days in [3, 10, 30] {
            let scenario = StorageScenario {
                site: StorageSite::Warehouse,
                weight_kg: 2000.0,
                total_days: days,
                perishable: true,
            };
            let breakdown = calculator.storage_fee(&scenario, DEFAULT_BHM, warehouse).unwrap();
            assert_eq!(breakdown.items().len(), 1);
            assert_close(breakdown.total(), 0.05 * DEFAULT_BHM * 2.0 * days as f64);
        }
    }

    #[test]
    fn test_storage_rejects_invalid_inputs() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let warehouse = schedule.storage(StorageSite::Warehouse);
        let mut scenario = StorageScenario {
            site: StorageSite::Warehouse,
            weight_kg: 0.0,
            total_days: 5,
            perishable: false,
        };
        assert!(calculator.storage_fee(&scenario, DEFAULT_BHM, warehouse).is_err());

        scenario.weight_kg = 500.0;
        scenario.total_days = 0;
        assert!(calculator.storage_fee(&scenario, DEFAULT_BHM, warehouse).is_err());

        scenario.total_days = 5;
        scenario.site = StorageSite::BorderPost;
        assert!(matches!(
            calculator.storage_fee(&scenario, DEFAULT_BHM, warehouse),
            Err(FeeError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_escort_fee_threshold() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let tiers = schedule.escort_tiers();

        let near = EscortScenario {
            distance_km: 200.0,
            vehicles: 3,
        };
        let far = EscortScenario {
            distance_km: 201.0,
            vehicles: 3,
        };
        assert_close(
            calculator.escort_fee(&near, DEFAULT_BHM, tiers).unwrap().total(),
            2.0 * DEFAULT_BHM * 3.0,
        );
        assert_close(
            calculator.escort_fee(&far, DEFAULT_BHM, tiers).unwrap().total(),
            5.0 * DEFAULT_BHM * 3.0,
        );

        let nowhere = EscortScenario {
            distance_km: 0.0,
            vehicles: 1,
        };
        assert!(calculator.escort_fee(&nowhere, DEFAULT_BHM, tiers).is_err());
    }

    #[test]
    fn test_escort_range_edges() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let tiers = schedule.escort_tiers();

        let longest = EscortScenario {
            distance_km: 5_000.0,
            vehicles: 1_000,
        };
        assert_close(
            calculator.escort_fee(&longest, DEFAULT_BHM, tiers).unwrap().total(),
            5.0 * DEFAULT_BHM * 1_000.0,
        );

        let too_far = EscortScenario {
            distance_km: 5_000.01,
            vehicles: 1,
        };
        assert!(calculator.escort_fee(&too_far, DEFAULT_BHM, tiers).is_err());

        for vehicles in [0, 1_001] {
            let scenario = EscortScenario {
                distance_km: 100.0,
                vehicles,
            };
            assert!(calculator.escort_fee(&scenario, DEFAULT_BHM, tiers).is_err());
        }
    }

    #[test]
    fn test_service_fee_counts() {
        let calculator = Calculator::new();
        let scenario = ServiceScenario {
            service: ServiceFee::Courier,
            count: 10.0,
        };

        let breakdown = calculator.service_fee(&scenario, DEFAULT_BHM, 0.02).unwrap();
        assert_close(breakdown.total(), 68_000.0);

        let too_many = ServiceScenario {
            service: ServiceFee::Courier,
            count: 1_001.0,
        };
        assert!(calculator.service_fee(&too_many, DEFAULT_BHM, 0.02).is_err());
    }

    #[test]
    fn test_service_count_edges() {
        let calculator = Calculator::new();

        let most = ServiceScenario {
            service: ServiceFee::Transit,
            count: 1_000.0,
        };
        assert_close(
            calculator.service_fee(&most, DEFAULT_BHM, 0.25).unwrap().total(),
            0.25 * DEFAULT_BHM * 1_000.0,
        );

        let fewest = ServiceScenario {
            service: ServiceFee::IpRegistry,
            count: 1.0,
        };
        assert!(calculator.service_fee(&fewest, DEFAULT_BHM, 1.0).is_ok());

        let none = ServiceScenario {
            service: ServiceFee::IpRegistry,
            count: 0.0,
        };
        assert!(calculator.service_fee(&none, DEFAULT_BHM, 1.0).is_err());
    }

    #[test]
    fn test_only_courier_takes_fractional_counts() {
        let calculator = Calculator::new();

        let half_ruling = ServiceScenario {
            service: ServiceFee::PreliminaryRuling,
            count: 2.5,
        };
        assert!(matches!(
            calculator.service_fee(&half_ruling, DEFAULT_BHM, 0.75),
            Err(FeeError::InvalidInput { field: "count", .. })
        ));

        let parcel = ServiceScenario {
            service: ServiceFee::Courier,
            count: 12.5,
        };
        assert_close(
            calculator.service_fee(&parcel, DEFAULT_BHM, 0.02).unwrap().total(),
            0.02 * DEFAULT_BHM * 12.5,
        );
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();
        let mut scenario = declaration(123_456.0);
        scenario.early_declaration = true;
        scenario.after_hours = true;
        scenario.inspection_hours_normal = 1.5;

        let first = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        let second = calculator
            .declaration_fee(&scenario, DEFAULT_BHM, schedule.declaration_tiers())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tariff_curve_share_of_value() {
        let calculator = Calculator::new();
        let schedule = FeeSchedule::resolution_55();

        let points = calculator
            .tariff_curve(&[0.0, 5_000.0], DEFAULT_BHM, 12_700.0, schedule.declaration_tiers())
            .unwrap();
        assert_eq!(points[0].share_of_value_pct(), 0.0);
        assert_close(points[1].fee(), DEFAULT_BHM);
        assert_close(
            points[1].share_of_value_pct(),
            DEFAULT_BHM / (5_000.0 * 12_700.0) * 100.0,
        );

        let curve = calculator
            .tariff_curve(
                &TARIFF_CURVE_SAMPLES,
                DEFAULT_BHM,
                12_700.0,
                schedule.declaration_tiers(),
            )
            .unwrap();
        assert_eq!(curve.len(), TARIFF_CURVE_SAMPLES.len());
    }

    proptest! {
        #[test]
        fn prop_tier_rate_is_monotonic(a in 0.0f64..60_000_000.0, b in 0.0f64..60_000_000.0) {
            let schedule = FeeSchedule::resolution_55();
            let tiers = schedule.declaration_tiers().tiers();
            let (low, high) = if a <= b { (a, b) } else { (b, a) };

            let low_rate = tier_rate(low, tiers).unwrap();
            let high_rate = tier_rate(high, tiers).unwrap();
            prop_assert!(low_rate <= high_rate);
        }

        #[test]
        fn prop_exactly_one_tier_matches(value in 0.0f64..60_000_000.0) {
            let schedule = FeeSchedule::resolution_55();
            let tiers = schedule.declaration_tiers().tiers();

            let rate = tier_rate(value, tiers).unwrap();
            let mut lower = 0.0;
            let matching: Vec<&RateTier> = tiers
                .iter()
                .filter(|tier| {
                    let hit = (value > lower || (value == 0.0 && lower == 0.0))
                        && value <= tier.upper_bound();
                    lower = tier.upper_bound();
                    hit
                })
                .collect();
            prop_assert_eq!(matching.len(), 1);
            prop_assert_eq!(matching[0].multiplier(), rate);
        }
    }
}

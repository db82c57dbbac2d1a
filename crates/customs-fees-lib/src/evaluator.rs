use crate::calculator::{Calculator, TARIFF_CURVE_SAMPLES};
use crate::data_structures::{
    ExchangeRate, FeeBreakdown, FeeCommand, FeeSummary, ServiceFee, TariffPoint, TariffRow,
};
use crate::error::FeeError;
use crate::schedule::FeeSchedule;
use crate::validation::{check_bhm, check_exchange_rate};
use log::debug;

/// Entry point for callers: routes a [`FeeCommand`] to the calculator that handles it.
///
/// BHM and the exchange rate are passed into every call so that a change made
/// between two calculations never leaks into one already in progress.
pub struct FeeEvaluator {
    schedule: FeeSchedule,
    calculator: Calculator,
}

impl FeeEvaluator {
    pub fn new() -> Self {
        Self::with_schedule(FeeSchedule::resolution_55())
    }

    pub fn with_schedule(schedule: FeeSchedule) -> Self {
        Self {
            schedule,
            calculator: Calculator::new(),
        }
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    pub fn evaluate(&self, command: &FeeCommand, bhm: f64) -> Result<FeeBreakdown, FeeError> {
        let bhm = check_bhm(bhm)?;
        debug!("Evaluating {:?} at BHM {}", command, bhm);

        match command {
            FeeCommand::Declaration(scenario) => {
                self.calculator
                    .declaration_fee(scenario, bhm, self.schedule.declaration_tiers())
            }
            FeeCommand::Storage(scenario) => {
                self.calculator
                    .storage_fee(scenario, bhm, self.schedule.storage(scenario.site))
            }
            FeeCommand::Escort(scenario) => {
                self.calculator
                    .escort_fee(scenario, bhm, self.schedule.escort_tiers())
            }
            FeeCommand::Service(scenario) => {
                let rate = self.service_rate(scenario.service)?;
                self.calculator.service_fee(scenario, bhm, rate)
            }
        }
    }

    /// Evaluates `command` and attaches the USD equivalent of the total.
    pub fn summarize(
        &self,
        command: &FeeCommand,
        bhm: f64,
        exchange_rate: &ExchangeRate,
    ) -> Result<FeeSummary, FeeError> {
        check_exchange_rate(exchange_rate.rate())?;
        let breakdown = self.evaluate(command, bhm)?;

        Ok(FeeSummary::new(command.title(), breakdown, bhm, *exchange_rate))
    }

    pub fn tariff_rows(&self, bhm: f64) -> Result<Vec<TariffRow>, FeeError> {
        Ok(self.schedule.tariff_rows(check_bhm(bhm)?))
    }

    pub fn service_rows(&self, bhm: f64) -> Result<Vec<TariffRow>, FeeError> {
        Ok(self.schedule.service_rows(check_bhm(bhm)?))
    }

    pub fn tariff_curve(&self, bhm: f64, usd_rate: f64) -> Result<Vec<TariffPoint>, FeeError> {
        self.calculator.tariff_curve(
            &TARIFF_CURVE_SAMPLES,
            bhm,
            usd_rate,
            self.schedule.declaration_tiers(),
        )
    }

    pub fn goods_value_local(&self, value_usd: f64, usd_rate: f64) -> f64 {
        self.calculator.goods_value_local(value_usd, usd_rate)
    }

    fn service_rate(&self, service: ServiceFee) -> Result<f64, FeeError> {
        self.schedule.service_rate(service).ok_or_else(|| {
            FeeError::InvalidSchedule(format!("no rate for {}", service.name()))
        })
    }
}

impl Default for FeeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::{
        DeclarationScenario, EscortScenario, ServiceScenario, StorageScenario, StorageSite,
    };
    use crate::schedule::DEFAULT_BHM;
    use chrono::NaiveDate;

    #[test]
    fn test_dispatches_each_command() {
        let evaluator = FeeEvaluator::new();
        let commands = vec![
            (
                FeeCommand::Declaration(DeclarationScenario::new(5_000.0)),
                DEFAULT_BHM,
            ),
            (
                FeeCommand::Storage(StorageScenario {
                    site: StorageSite::Warehouse,
                    weight_kg: 1000.0,
                    total_days: 1,
                    perishable: false,
                }),
                0.03 * DEFAULT_BHM,
            ),
            (
                FeeCommand::Escort(EscortScenario {
                    distance_km: 50.0,
                    vehicles: 1,
                }),
                2.0 * DEFAULT_BHM,
            ),
            (
                FeeCommand::Service(ServiceScenario {
                    service: ServiceFee::CurrencyDeclaration,
                    count: 2.0,
                }),
                5.0 * DEFAULT_BHM,
            ),
        ];

        for (command, expected) in commands {
            let breakdown = evaluator.evaluate(&command, DEFAULT_BHM).unwrap();
            assert!((breakdown.total() - expected).abs() < 1e-6, "{:?}", command);
        }
    }

    #[test]
    fn test_bhm_is_an_explicit_input() {
        let evaluator = FeeEvaluator::new();
        let command = FeeCommand::Declaration(DeclarationScenario::new(5_000.0));

        let at_default = evaluator.evaluate(&command, DEFAULT_BHM).unwrap();
        let at_custom = evaluator.evaluate(&command, 375_000.0).unwrap();
        assert_eq!(at_default.total(), 340_000.0);
        assert_eq!(at_custom.total(), 375_000.0);
        assert!(evaluator.evaluate(&command, 3_000_000.0).is_err());
    }

    #[test]
    fn test_summary_converts_to_usd() {
        let evaluator = FeeEvaluator::new();
        let command = FeeCommand::Declaration(DeclarationScenario::new(5_000.0));
        let rate = ExchangeRate::live(12_500.0, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());

        let summary = evaluator.summarize(&command, DEFAULT_BHM, &rate).unwrap();
        assert_eq!(summary.title(), "Declaration fee");
        assert_eq!(summary.total(), 340_000.0);
        assert_eq!(summary.total_usd(), 340_000.0 / 12_500.0);
    }

    #[test]
    fn test_summary_rejects_implausible_rate() {
        let evaluator = FeeEvaluator::new();
        let command = FeeCommand::Declaration(DeclarationScenario::new(5_000.0));

        let result = evaluator.summarize(&command, DEFAULT_BHM, &ExchangeRate::fallback(1.0));
        assert!(matches!(result, Err(FeeError::InvalidInput { .. })));
    }

    #[test]
    fn test_tariff_views() {
        let evaluator = FeeEvaluator::new();
        assert_eq!(evaluator.tariff_rows(DEFAULT_BHM).unwrap().len(), 9);
        assert!(evaluator.service_rows(DEFAULT_BHM).unwrap().len() > 8);
        assert_eq!(
            evaluator.tariff_curve(DEFAULT_BHM, 12_700.0).unwrap().len(),
            TARIFF_CURVE_SAMPLES.len()
        );
        assert!(evaluator.tariff_rows(0.0).is_err());
    }
}

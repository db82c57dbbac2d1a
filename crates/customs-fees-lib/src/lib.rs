pub mod accrual;
pub mod calculator;
pub mod data_structures;
pub mod error;
pub mod evaluator;
pub mod rates;
pub mod schedule;
pub mod validation;

pub use calculator::{tier_rate, Calculator};
pub use data_structures::{
    DeclarationScenario, EscortScenario, ExchangeRate, FeeBreakdown, FeeCommand, FeeLineItem,
    FeeSummary, PeriodRate, RateTier, ServiceFee, ServiceScenario, StorageSchedule,
    StorageScenario, StorageSite, TariffPoint, TariffRow, TierTable,
};
pub use error::{FeeError, FetchError};
pub use evaluator::FeeEvaluator;
pub use rates::{CachedRateProvider, CbuRateProvider, RateProvider, StaticRateProvider};
pub use schedule::{FeeSchedule, DEFAULT_BHM, FALLBACK_USD_RATE};

pub use chrono::{DateTime, Duration, NaiveDate, Utc};

pub mod prelude {
    pub use crate::data_structures::{
        DeclarationScenario, EscortScenario, ExchangeRate, FeeBreakdown, FeeCommand,
        ServiceFee, ServiceScenario, StorageScenario, StorageSite,
    };
    pub use crate::error::{FeeError, FetchError};
    pub use crate::evaluator::FeeEvaluator;
    pub use crate::rates::{CachedRateProvider, CbuRateProvider, RateProvider};
    pub use crate::schedule::{DEFAULT_BHM, FALLBACK_USD_RATE};
    pub use chrono::{DateTime, Utc};
}

use crate::error::FeeError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of a tiered schedule: values up to and including `upper_bound` pay `multiplier` BHM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    upper_bound: f64,
    multiplier: f64,
}

impl RateTier {
    pub fn new(upper_bound: f64, multiplier: f64) -> Self {
        Self {
            upper_bound,
            multiplier,
        }
    }

    pub fn open_ended(multiplier: f64) -> Self {
        Self::new(f64::INFINITY, multiplier)
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn is_open_ended(&self) -> bool {
        self.upper_bound.is_infinite()
    }
}

/// An ordered tier list covering `[0, inf)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TierTable {
    tiers: Vec<RateTier>,
}

impl TierTable {
    pub fn new(tiers: Vec<RateTier>) -> Result<Self, FeeError> {
        let last = tiers
            .last()
            .ok_or_else(|| FeeError::InvalidSchedule("tier table is empty".to_string()))?;
        if !(last.upper_bound.is_infinite() && last.upper_bound > 0.0) {
            return Err(FeeError::InvalidSchedule(
                "last tier must be open ended".to_string(),
            ));
        }

        let mut previous = None;
        for tier in &tiers {
            if tier.upper_bound.is_nan() || tier.upper_bound < 0.0 {
                return Err(FeeError::InvalidSchedule(format!(
                    "tier bound {} is not a non-negative number",
                    tier.upper_bound
                )));
            }
            if !tier.multiplier.is_finite() || tier.multiplier < 0.0 {
                return Err(FeeError::InvalidSchedule(format!(
                    "tier multiplier {} is not a non-negative number",
                    tier.multiplier
                )));
            }
            if let Some(prev) = previous {
                if tier.upper_bound <= prev {
                    return Err(FeeError::InvalidSchedule(format!(
                        "tier bounds must ascend, got {} after {}",
                        tier.upper_bound, prev
                    )));
                }
            }
            previous = Some(tier.upper_bound);
        }

        Ok(Self { tiers })
    }

    /// Builds a table from built-in data that the tests validate through [`TierTable::new`].
    pub(crate) fn from_static(tiers: Vec<RateTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// A storage period: days up to and including `day_limit` (counted from day 1) pay `rate` BHM per unit-day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodRate {
    day_limit: Option<u32>,
    rate: f64,
}

impl PeriodRate {
    pub fn until(day_limit: u32, rate: f64) -> Self {
        Self {
            day_limit: Some(day_limit),
            rate,
        }
    }

    pub fn onwards(rate: f64) -> Self {
        Self {
            day_limit: None,
            rate,
        }
    }

    pub fn day_limit(&self) -> Option<u32> {
        self.day_limit
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageSite {
    Warehouse,
    BorderPost,
}

impl StorageSite {
    pub fn name(&self) -> &'static str {
        match self {
            StorageSite::Warehouse => "Customs warehouse",
            StorageSite::BorderPost => "Border post",
        }
    }

    pub fn all() -> [StorageSite; 2] {
        [StorageSite::Warehouse, StorageSite::BorderPost]
    }
}

impl FromStr for StorageSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warehouse" => Ok(StorageSite::Warehouse),
            "border-post" | "border" => Ok(StorageSite::BorderPost),
            other => Err(format!(
                "unknown storage site '{}', expected warehouse or border-post",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSchedule {
    site: StorageSite,
    weight_unit_kg: f64,
    periods: Vec<PeriodRate>,
    perishable_rate: f64,
}

impl StorageSchedule {
    pub fn new(
        site: StorageSite,
        weight_unit_kg: f64,
        periods: Vec<PeriodRate>,
        perishable_rate: f64,
    ) -> Result<Self, FeeError> {
        if !weight_unit_kg.is_finite() || weight_unit_kg <= 0.0 {
            return Err(FeeError::InvalidSchedule(format!(
                "weight unit {} kg must be positive",
                weight_unit_kg
            )));
        }
        match periods.last() {
            Some(last) if last.day_limit.is_none() => {}
            _ => {
                return Err(FeeError::InvalidSchedule(
                    "last storage period must be open ended".to_string(),
                ))
            }
        }

        let mut previous = 0;
        for (index, period) in periods.iter().enumerate() {
            if let Some(limit) = period.day_limit {
                if limit <= previous {
                    return Err(FeeError::InvalidSchedule(format!(
                        "storage period limit {} must ascend past day {}",
                        limit, previous
                    )));
                }
                previous = limit;
            } else if index + 1 != periods.len() {
                return Err(FeeError::InvalidSchedule(
                    "only the last storage period may be open ended".to_string(),
                ));
            }
            if !period.rate.is_finite() || period.rate < 0.0 {
                return Err(FeeError::InvalidSchedule(format!(
                    "storage rate {} is not a non-negative number",
                    period.rate
                )));
            }
        }

        if !perishable_rate.is_finite() || perishable_rate < 0.0 {
            return Err(FeeError::InvalidSchedule(format!(
                "perishable rate {} is not a non-negative number",
                perishable_rate
            )));
        }

        Ok(Self::from_static(site, weight_unit_kg, periods, perishable_rate))
    }

    pub(crate) fn from_static(
        site: StorageSite,
        weight_unit_kg: f64,
        periods: Vec<PeriodRate>,
        perishable_rate: f64,
    ) -> Self {
        Self {
            site,
            weight_unit_kg,
            periods,
            perishable_rate,
        }
    }

    pub fn site(&self) -> StorageSite {
        self.site
    }

    pub fn weight_unit_kg(&self) -> f64 {
        self.weight_unit_kg
    }

    pub fn periods(&self) -> &[PeriodRate] {
        &self.periods
    }

    pub fn perishable_rate(&self) -> f64 {
        self.perishable_rate
    }

    pub fn unit_name(&self) -> String {
        if self.weight_unit_kg >= 1000.0 {
            format!("{} t", self.weight_unit_kg / 1000.0)
        } else {
            format!("{} kg", self.weight_unit_kg)
        }
    }
}

/// Services charged at a flat BHM multiple per counted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceFee {
    Transit,
    CurrencyDeclaration,
    ReceiptOrder,
    Courier,
    DeclarationAmendment,
    AfterHoursDeclaration,
    IpRegistry,
    PreliminaryRuling,
}

impl ServiceFee {
    pub fn all() -> [ServiceFee; 8] {
        [
            ServiceFee::Transit,
            ServiceFee::CurrencyDeclaration,
            ServiceFee::ReceiptOrder,
            ServiceFee::Courier,
            ServiceFee::DeclarationAmendment,
            ServiceFee::AfterHoursDeclaration,
            ServiceFee::IpRegistry,
            ServiceFee::PreliminaryRuling,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceFee::Transit => "Transit / processing regime",
            ServiceFee::CurrencyDeclaration => "Cash currency declaration",
            ServiceFee::ReceiptOrder => "Customs receipt order",
            ServiceFee::Courier => "International courier shipment",
            ServiceFee::DeclarationAmendment => "Declaration amendment",
            ServiceFee::AfterHoursDeclaration => "After-hours clearance",
            ServiceFee::IpRegistry => "IP register entry",
            ServiceFee::PreliminaryRuling => "Preliminary ruling",
        }
    }

    /// What one counted unit stands for.
    pub fn unit(&self) -> &'static str {
        match self {
            ServiceFee::Courier => "kg",
            ServiceFee::IpRegistry => "object",
            ServiceFee::PreliminaryRuling => "ruling",
            _ => "declaration",
        }
    }

    /// Courier fees are counted in kilograms; every other unit is a whole item.
    pub fn is_whole_count(&self) -> bool {
        !matches!(self, ServiceFee::Courier)
    }

    pub fn slug(&self) -> &'static str {
        match self {
            ServiceFee::Transit => "transit",
            ServiceFee::CurrencyDeclaration => "currency-declaration",
            ServiceFee::ReceiptOrder => "receipt-order",
            ServiceFee::Courier => "courier",
            ServiceFee::DeclarationAmendment => "declaration-amendment",
            ServiceFee::AfterHoursDeclaration => "after-hours-declaration",
            ServiceFee::IpRegistry => "ip-registry",
            ServiceFee::PreliminaryRuling => "preliminary-ruling",
        }
    }
}

impl FromStr for ServiceFee {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceFee::all()
            .into_iter()
            .find(|service| service.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ServiceFee::all().iter().map(|s| s.slug()).collect();
                format!("unknown service '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationScenario {
    pub customs_value_usd: f64,
    #[serde(default)]
    pub early_declaration: bool,
    #[serde(default)]
    pub after_hours: bool,
    #[serde(default)]
    pub inspection_hours_normal: f64,
    #[serde(default)]
    pub inspection_hours_after_hours: f64,
}

impl DeclarationScenario {
    pub fn new(customs_value_usd: f64) -> Self {
        Self {
            customs_value_usd,
            early_declaration: false,
            after_hours: false,
            inspection_hours_normal: 0.0,
            inspection_hours_after_hours: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageScenario {
    pub site: StorageSite,
    pub weight_kg: f64,
    pub total_days: u32,
    #[serde(default)]
    pub perishable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscortScenario {
    pub distance_km: f64,
    pub vehicles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceScenario {
    pub service: ServiceFee,
    pub count: f64,
}

/// A single calculation request. Each variant maps onto one calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FeeCommand {
    Declaration(DeclarationScenario),
    Storage(StorageScenario),
    Escort(EscortScenario),
    Service(ServiceScenario),
}

impl FeeCommand {
    pub fn title(&self) -> String {
        match self {
            FeeCommand::Declaration(_) => "Declaration fee".to_string(),
            FeeCommand::Storage(s) => format!("Storage fee ({})", s.site.name()),
            FeeCommand::Escort(_) => "Transport escort fee".to_string(),
            FeeCommand::Service(s) => s.service.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLineItem {
    label: String,
    amount: f64,
}

impl FeeLineItem {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Ordered line items and their unrounded total, in so'm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    items: Vec<FeeLineItem>,
    total: f64,
}

impl FeeBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, amount: f64) {
        self.total += amount;
        self.items.push(FeeLineItem::new(label, amount));
    }

    pub fn items(&self) -> &[FeeLineItem] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn usd_equivalent(&self, usd_rate: f64) -> f64 {
        self.total / usd_rate
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeSummary {
    title: String,
    breakdown: FeeBreakdown,
    bhm: f64,
    exchange_rate: ExchangeRate,
    total_usd: f64,
}

impl FeeSummary {
    pub fn new(
        title: String,
        breakdown: FeeBreakdown,
        bhm: f64,
        exchange_rate: ExchangeRate,
    ) -> Self {
        let total_usd = breakdown.usd_equivalent(exchange_rate.rate());
        Self {
            title,
            breakdown,
            bhm,
            exchange_rate,
            total_usd,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn breakdown(&self) -> &FeeBreakdown {
        &self.breakdown
    }

    pub fn bhm(&self) -> f64 {
        self.bhm
    }

    pub fn exchange_rate(&self) -> &ExchangeRate {
        &self.exchange_rate
    }

    pub fn total(&self) -> f64 {
        self.breakdown.total()
    }

    pub fn total_usd(&self) -> f64 {
        self.total_usd
    }
}

/// So'm per USD. `as_of == None` with `is_live == false` means the rate was not auto-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    rate: f64,
    as_of: Option<NaiveDate>,
    is_live: bool,
}

impl ExchangeRate {
    pub fn live(rate: f64, as_of: NaiveDate) -> Self {
        Self {
            rate,
            as_of: Some(as_of),
            is_live: true,
        }
    }

    pub fn fallback(rate: f64) -> Self {
        Self {
            rate,
            as_of: None,
            is_live: false,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    pub fn is_live(&self) -> bool {
        self.is_live
    }

    pub fn as_of_label(&self) -> String {
        match self.as_of {
            Some(date) => date.format("%d.%m.%Y").to_string(),
            None => "not auto-fetched".to_string(),
        }
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} so'm/USD ({})", self.rate, self.as_of_label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffRow {
    range_label: String,
    multiplier: f64,
    fee: f64,
}

impl TariffRow {
    pub fn new(range_label: String, multiplier: f64, fee: f64) -> Self {
        Self {
            range_label,
            multiplier,
            fee,
        }
    }

    pub fn range_label(&self) -> &str {
        &self.range_label
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffPoint {
    value_usd: f64,
    fee: f64,
    share_of_value_pct: f64,
}

impl TariffPoint {
    pub fn new(value_usd: f64, fee: f64, share_of_value_pct: f64) -> Self {
        Self {
            value_usd,
            fee,
            share_of_value_pct,
        }
    }

    pub fn value_usd(&self) -> f64 {
        self.value_usd
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn share_of_value_pct(&self) -> f64 {
        self.share_of_value_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_table_rejects_unsorted_bounds() {
        let tiers = vec![
            RateTier::new(20_000.0, 1.5),
            RateTier::new(10_000.0, 1.0),
            RateTier::open_ended(2.0),
        ];
        assert!(matches!(
            TierTable::new(tiers),
            Err(FeeError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_tier_table_requires_open_last_tier() {
        let tiers = vec![RateTier::new(10_000.0, 1.0), RateTier::new(20_000.0, 1.5)];
        assert!(TierTable::new(tiers).is_err());
        assert!(TierTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_storage_schedule_rejects_open_middle_period() {
        let periods = vec![
            PeriodRate::onwards(0.03),
            PeriodRate::until(10, 0.04),
        ];
        assert!(StorageSchedule::new(StorageSite::Warehouse, 1000.0, periods, 0.05).is_err());
    }

    #[test]
    fn test_breakdown_accumulates_total() {
        let mut breakdown = FeeBreakdown::new();
        breakdown.push("Base", 2_380_000.0);
        breakdown.push("Discount", -476_000.0);

        assert_eq!(breakdown.items().len(), 2);
        assert_eq!(breakdown.total(), 1_904_000.0);
        assert_eq!(breakdown.usd_equivalent(12_700.0), 1_904_000.0 / 12_700.0);
    }

    #[test]
    fn test_service_fee_parses_slug() {
        assert_eq!("courier".parse::<ServiceFee>(), Ok(ServiceFee::Courier));
        assert!("parking".parse::<ServiceFee>().is_err());
        for service in ServiceFee::all() {
            assert_eq!(service.slug().parse::<ServiceFee>(), Ok(service));
        }
    }

    #[test]
    fn test_fallback_rate_marker() {
        let rate = ExchangeRate::fallback(12_700.0);
        assert!(!rate.is_live());
        assert_eq!(rate.as_of_label(), "not auto-fetched");
    }

    #[test]
    fn test_fee_command_json_shape() {
        let json = r#"{"kind": "declaration", "customs_value_usd": 50000, "early_declaration": true}"#;
        let command: FeeCommand = serde_json::from_str(json).unwrap();
        match command {
            FeeCommand::Declaration(scenario) => {
                assert_eq!(scenario.customs_value_usd, 50_000.0);
                assert!(scenario.early_declaration);
                assert!(!scenario.after_hours);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

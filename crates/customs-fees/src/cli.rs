use crate::format::{format_rate, format_som, format_usd};
use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use uz_customs_fees::{
    DeclarationScenario, EscortScenario, ExchangeRate, FeeCommand, FeeEvaluator, FeeSummary,
    ServiceFee, ServiceScenario, StorageScenario, StorageSite, TariffPoint, TariffRow,
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Declaration fee by customs value
    Declaration {
        /// Customs value in USD
        #[arg(long)]
        value: f64,
        /// Early (pre-arrival) declaration, 20% off the base fee
        #[arg(long)]
        early: bool,
        /// Clearance outside working hours
        #[arg(long)]
        after_hours: bool,
        #[arg(long, default_value_t = 0.0)]
        inspection_hours: f64,
        #[arg(long, default_value_t = 0.0)]
        after_hours_inspection: f64,
    },
    /// Storage fee at a customs warehouse or border post
    Storage {
        #[arg(long, default_value = "warehouse")]
        site: StorageSite,
        #[arg(long)]
        weight_kg: f64,
        #[arg(long)]
        days: u32,
        #[arg(long)]
        perishable: bool,
    },
    /// Transport escort fee
    Escort {
        #[arg(long)]
        distance_km: f64,
        #[arg(long, default_value_t = 1)]
        vehicles: u32,
    },
    /// Flat fee for a counted service
    Service {
        /// transit, currency-declaration, receipt-order, courier,
        /// declaration-amendment, after-hours-declaration, ip-registry, preliminary-ruling
        #[arg(long)]
        kind: ServiceFee,
        #[arg(long, default_value_t = 1.0)]
        count: f64,
    },
    /// Print the rate tables and the fee curve
    Tariffs,
}

impl Command {
    pub fn fee_command(&self) -> Option<FeeCommand> {
        match self.clone() {
            Command::Declaration {
                value,
                early,
                after_hours,
                inspection_hours,
                after_hours_inspection,
            } => Some(FeeCommand::Declaration(DeclarationScenario {
                customs_value_usd: value,
                early_declaration: early,
                after_hours,
                inspection_hours_normal: inspection_hours,
                inspection_hours_after_hours: after_hours_inspection,
            })),
            Command::Storage {
                site,
                weight_kg,
                days,
                perishable,
            } => Some(FeeCommand::Storage(StorageScenario {
                site,
                weight_kg,
                total_days: days,
                perishable,
            })),
            Command::Escort {
                distance_km,
                vehicles,
            } => Some(FeeCommand::Escort(EscortScenario {
                distance_km,
                vehicles,
            })),
            Command::Service { kind, count } => Some(FeeCommand::Service(ServiceScenario {
                service: kind,
                count,
            })),
            Command::Tariffs => None,
        }
    }
}

#[derive(Serialize)]
struct TariffReport {
    bhm: f64,
    exchange_rate: ExchangeRate,
    tariffs: Vec<TariffRow>,
    services: Vec<TariffRow>,
    curve: Vec<TariffPoint>,
}

pub fn run(
    command: &Command,
    evaluator: &FeeEvaluator,
    bhm: f64,
    rate: &ExchangeRate,
    json: bool,
) -> Result<()> {
    match command.fee_command() {
        Some(fee_command) => {
            let summary = evaluator.summarize(&fee_command, bhm, rate)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render_summary(&summary));
            }
        }
        None => {
            let report = TariffReport {
                bhm,
                exchange_rate: *rate,
                tariffs: evaluator.tariff_rows(bhm)?,
                services: evaluator.service_rows(bhm)?,
                curve: evaluator.tariff_curve(bhm, rate.rate())?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_tariffs(&report));
            }
        }
    }
    Ok(())
}

pub fn render_summary(summary: &FeeSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", summary.title()));
    out.push_str(&format!(
        "BHM {} | USD rate {} ({})\n\n",
        format_som(summary.bhm()),
        format_rate(summary.exchange_rate().rate()),
        summary.exchange_rate().as_of_label()
    ));
    for item in summary.breakdown().items() {
        out.push_str(&format!(
            "  {:<56} {:>18}\n",
            item.label(),
            format_som(item.amount())
        ));
    }
    out.push_str(&format!(
        "  {:<56} {:>18}\n  {:<56} {:>18}\n",
        "Total",
        format_som(summary.total()),
        "Total in USD",
        format_usd(summary.total_usd())
    ));
    out
}

fn render_tariffs(report: &TariffReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Customs value tiers at BHM {}\n", format_som(report.bhm)));
    for row in &report.tariffs {
        out.push_str(&format!(
            "  {:<24} {:>6} BHM {:>18}\n",
            row.range_label(),
            row.multiplier(),
            format_som(row.fee())
        ));
    }

    out.push_str("\nOther services\n");
    for row in &report.services {
        out.push_str(&format!(
            "  {:<68} {:>6} BHM {:>14}\n",
            row.range_label(),
            row.multiplier(),
            format_som(row.fee())
        ));
    }

    out.push_str(&format!(
        "\nFee as a share of goods value at {} so'm/USD\n",
        format_rate(report.exchange_rate.rate())
    ));
    for point in &report.curve {
        out.push_str(&format!(
            "  {:>14} {:>18} {:>8.3}%\n",
            format_usd(point.value_usd()),
            format_som(point.fee()),
            point.share_of_value_pct()
        ));
    }
    out
}

use std::env;
use uz_customs_fees::prelude::*;
use uz_customs_fees::schedule::group_thousands;

fn main() -> Result<(), FeeError> {
    let args: Vec<String> = env::args().collect();
    let offline = args.iter().any(|arg| arg == "--offline");

    let evaluator = FeeEvaluator::new();
    let bhm = DEFAULT_BHM;

    let rate = if offline {
        println!("Offline: using the fallback exchange rate");
        ExchangeRate::fallback(FALLBACK_USD_RATE)
    } else {
        println!("Fetching the central bank USD rate...");
        let mut rates = CachedRateProvider::new(
            CbuRateProvider::new(),
            chrono::Duration::hours(1),
            FALLBACK_USD_RATE,
        );
        let rate = rates.current(Utc::now());
        if let Some(error) = rates.last_error() {
            eprintln!("Warning: {}", error);
        }
        rate
    };

    println!("BHM: {} so'm", group_thousands(bhm));
    println!("USD rate: {}", rate);

    let commands = vec![
        FeeCommand::Declaration(DeclarationScenario {
            customs_value_usd: 80_000.0,
            early_declaration: true,
            after_hours: true,
            inspection_hours_normal: 2.0,
            inspection_hours_after_hours: 0.0,
        }),
        FeeCommand::Storage(StorageScenario {
            site: StorageSite::Warehouse,
            weight_kg: 3_500.0,
            total_days: 18,
            perishable: false,
        }),
        FeeCommand::Storage(StorageScenario {
            site: StorageSite::BorderPost,
            weight_kg: 800.0,
            total_days: 4,
            perishable: true,
        }),
        FeeCommand::Escort(EscortScenario {
            distance_km: 350.0,
            vehicles: 2,
        }),
        FeeCommand::Service(ServiceScenario {
            service: ServiceFee::Courier,
            count: 12.5,
        }),
    ];

    for command in &commands {
        let summary = evaluator.summarize(command, bhm, &rate)?;

        println!("\n--- {} ---", summary.title());
        for item in summary.breakdown().items() {
            println!("  {:<55} {:>14} so'm", item.label(), group_thousands(item.amount()));
        }
        println!(
            "  {:<55} {:>14} so'm (${:.2})",
            "Total",
            group_thousands(summary.total()),
            summary.total_usd()
        );
    }

    println!("\n--- Customs value tiers ---");
    for row in evaluator.tariff_rows(bhm)? {
        println!(
            "  {:<24} {:>5} BHM {:>14} so'm",
            row.range_label(),
            row.multiplier(),
            group_thousands(row.fee())
        );
    }

    println!("\n--- Fee as a share of goods value ---");
    for point in evaluator.tariff_curve(bhm, rate.rate())? {
        println!(
            "  ${:>12} -> {:>12} so'm ({:.3}%)",
            group_thousands(point.value_usd()),
            group_thousands(point.fee()),
            point.share_of_value_pct()
        );
    }

    Ok(())
}

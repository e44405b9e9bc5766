//! CartFlow entry point: wiring and ownership.
//!
//! The process owns exactly one `EventStore` and injects it everywhere:
//! into the checkout flow, the warmup routine, and the harness. The
//! snapshot is loaded here once and saved here once, after the run.

mod cli;

use std::sync::Arc;

use anyhow::Result;
use cartflow_browser::{
    CheckoutFlow, DriverSettings, PlaywrightDriver, WarmupRoutine,
};
use cartflow_harness::{HarnessConfig, ProfileCatalog, TestHarness};
use cartflow_memory::EventStore;
use cartflow_models::TestReport;
use cartflow_notify::{NullNotifier, TelegramNotifier};
use cartflow_traits::Notifier;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = Arc::new(EventStore::open(&cli.store_path));

    let probe = PlaywrightDriver::probe().await;
    if !probe.ready {
        for note in &probe.notes {
            warn!("{note}");
        }
    }

    let mut settings = DriverSettings {
        headless: cli.headless,
        ..DriverSettings::default()
    };
    if let Some(dir) = &cli.browser_dir {
        settings.root_dir = dir.clone();
    }
    let driver = Arc::new(PlaywrightDriver::new(settings)?);

    let notifier: Arc<dyn Notifier> = match (&cli.telegram_token, &cli.telegram_chat_id) {
        (Some(token), Some(chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)),
        _ => {
            info!("telegram credentials absent, notifications disabled");
            Arc::new(NullNotifier)
        }
    };

    if !cli.skip_warmup {
        // Warm up under the most careful preset's pacing.
        let presets = ProfileCatalog::generate(1, &store)?;
        if let Some(profile) = presets.first() {
            let warmup = WarmupRoutine::new(driver.clone(), store.clone(), cli.warmup_plan());
            let outcome = warmup.run(profile).await;
            notifier
                .notify(&format!(
                    "Warmup finished: {} phase(s) completed, {} failed",
                    outcome.phases_completed, outcome.phases_failed
                ))
                .await;
        }
    }

    let flow = Arc::new(CheckoutFlow::new(
        driver.clone(),
        store.clone(),
        cli.target(),
    ));
    let harness = TestHarness::new(store.clone(), flow)
        .with_notifier(notifier.clone())
        .with_hook(driver)
        .with_config(HarnessConfig {
            max_profiles: cli.max_profiles,
            iterations: cli.iterations,
            ..HarnessConfig::default()
        });

    let report = harness.run().await?;
    print_report(&store, &report);

    // A failed save loses this session's history but never the run.
    if let Err(error) = store.save() {
        warn!(%error, "failed to persist the event store snapshot");
    }
    notifier.notify("CartFlow run finished").await;
    Ok(())
}

fn print_report(store: &EventStore, report: &TestReport) {
    println!("=== CartFlow session {} ===", report.summary.session_id);
    println!(
        "Profiles tested: {} ({} iteration(s) total)",
        report.summary.profiles_tested, report.summary.total_iterations
    );
    println!();

    for analysis in &report.session.results {
        println!(
            " {:<16} score {:.3}  success {:>5.1}%  avg {:>6.2}s  stealth {:.2}",
            analysis.profile.name,
            analysis.overall_score,
            analysis.success_rate * 100.0,
            analysis.avg_duration_secs,
            analysis.stealth_score,
        );
    }
    println!();

    match &report.session.best_profile {
        Some(best) => {
            println!(
                "Winner: {} (score {:.3}, +{:.3} over worst)",
                best.profile.name,
                best.overall_score,
                best.improvement_over_worst.unwrap_or(0.0)
            );
            let hints = store.hints(&format!("ab_test_iteration:{}", best.profile.name));
            if !hints.is_empty() {
                println!("Hints:");
                for hint in hints {
                    println!(" - {hint}");
                }
            }
        }
        None => println!("No profiles were tested"),
    }

    if !report.recommendations.is_empty() {
        println!("Recommendations:");
        for recommendation in &report.recommendations {
            println!(" - {recommendation}");
        }
    }
}

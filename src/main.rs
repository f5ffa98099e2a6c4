use anyhow::Context;
use clap::Parser;
use kanban_drag::config::toml_config::ScenarioStep;
use kanban_drag::utils::{logger, validation::Validate};
use kanban_drag::{ActivitySuppressor, CliConfig, ScenarioConfig, ScenarioRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting kanban-drag");
    tracing::info!("📁 Loading board from: {}", config.config);

    let scenario = match ScenarioConfig::from_file(&config.config) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("❌ Failed to load board file '{}': {}", config.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = scenario.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Board loaded and validated");
    display_summary(&scenario);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - steps are not replayed");
        return Ok(());
    }

    let runner = ScenarioRunner::new(scenario).with_suppressor(ActivitySuppressor::global().clone());
    let report = runner.run().await.context("replay failed")?;

    let json = serde_json::to_string_pretty(&report).context("could not serialize report")?;
    println!("{}", json);

    if report.activity_count > 0 {
        tracing::warn!(
            "⚠️ Activity count is {} after replay; background refresh stays paused",
            report.activity_count
        );
    }

    Ok(())
}

fn display_summary(scenario: &ScenarioConfig) {
    tracing::info!("📋 Board: {}", scenario.board.name);
    if let Some(description) = &scenario.board.description {
        tracing::info!("   {}", description);
    }
    tracing::info!(
        "🗂️ {} column(s), {} card(s), {} step(s)",
        scenario.columns.len(),
        scenario.card_count(),
        scenario.steps.len()
    );
    match scenario.confirmation_timeout() {
        Some(timeout) => tracing::info!("⏱️ Confirmation timeout: {:?}", timeout),
        None => tracing::info!("⏱️ Confirmation timeout: none"),
    }
    if let Some(interval) = scenario.refresh_interval() {
        tracing::info!("🔄 Live refresh every {:?}", interval);
    }
    let releases = scenario
        .steps
        .iter()
        .filter(|s| matches!(s, ScenarioStep::Release { .. }))
        .count();
    tracing::debug!("{} release step(s)", releases);
}

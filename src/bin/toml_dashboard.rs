use anyhow::Context;
use clap::Parser;
use sales_dash::config::toml_config::TomlConfig;
use sales_dash::domain::ports::ConfigProvider;
use sales_dash::utils::{logger, validation::Validate};
use sales_dash::{DashboardEngine, DashboardPipeline, LocalStorage};

#[derive(Parser)]
#[command(name = "toml_dashboard")]
#[command(about = "Sales dashboard pipeline driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override forecast horizon from config
    #[arg(long)]
    periods: Option<usize>,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if config.json_logging() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-configured dashboard pipeline");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(periods) = args.periods {
        config.forecast.get_or_insert_with(Default::default).periods = Some(periods);
        tracing::info!("🔧 Forecast horizon overridden to: {}", periods);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::default();
    let pipeline = DashboardPipeline::new(storage, config);

    let engine = DashboardEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard pipeline completed successfully!");
            tracing::info!("📁 Report bundle saved to: {}", output_path);
            println!("✅ Dashboard pipeline completed successfully!");
            println!("📁 Report bundle saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Dashboard pipeline failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                sales_dash::utils::error::ErrorSeverity::Low => 0,
                sales_dash::utils::error::ErrorSeverity::Medium => 2,
                sales_dash::utils::error::ErrorSeverity::High => 1,
                sales_dash::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name, config.pipeline.version
    );
    println!("  Source: {}", config.input_path());
    println!("  Output: {}", config.output_path());

    if let Some(max_records) = config.max_records() {
        println!("  Max Records: {}", max_records);
    }

    let settings = config.forecast_settings();
    println!(
        "  Forecast: {} periods via {} (season length {})",
        settings.periods, settings.method, settings.season_length
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📄 Data Source Analysis:");
    println!("  Path: {}", config.input_path());
    if let Some(max) = config.max_records() {
        println!("  Max records limit: {}", max);
    }

    println!();
    println!("🔎 Filter Criteria:");
    let criteria = config.filters();
    if criteria.is_unrestricted() {
        println!("  (none - all records pass)");
    } else {
        if !criteria.cities.is_empty() {
            println!("  Cities: {}", criteria.cities.join(", "));
        }
        if !criteria.customer_types.is_empty() {
            println!("  Customer types: {}", criteria.customer_types.join(", "));
        }
        if !criteria.genders.is_empty() {
            println!("  Genders: {}", criteria.genders.join(", "));
        }
        if let Some((start, end)) = criteria.date_range {
            println!("  Date range: {} .. {}", start, end);
        }
    }

    println!();
    println!("📈 Forecast Configuration:");
    let settings = config.forecast_settings();
    println!("  Method: {}", settings.method);
    println!("  Horizon: {} days", settings.periods);
    println!("  Season length: {} days", settings.season_length);
    println!(
        "  Smoothing: alpha={}, beta={}, gamma={}",
        settings.alpha, settings.beta, settings.gamma
    );

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Bundle: dashboard_report.zip (filtered.csv, kpis.json, charts.json, forecast.csv)");
    println!("  Top-N product lines: {}", config.top_n());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use keyword_trends::{
    config::Config,
    error::AppError,
    models::RunRequest,
    pipeline::{gather_metrics, init_pipeline_metrics, Orchestrator},
    scheduler::{init_scheduler_metrics, SchedulerService},
    store::create_store,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "keyword-trends")]
#[command(about = "Per-day keyword frequency aggregation", version, long_about = None)]
struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate and write frequencies once
    Run {
        /// Comma-separated keywords
        #[arg(short, long, value_delimiter = ',', required = true)]
        keywords: Vec<String>,

        /// Collection to search
        #[arg(short, long)]
        source: String,

        /// Collection to write records to
        #[arg(short, long)]
        destination: String,

        /// Inclusive window start (ISO-8601)
        #[arg(long)]
        start: String,

        /// Inclusive window end (ISO-8601)
        #[arg(long)]
        end: String,

        /// Print the Prometheus exposition to stderr after the run
        #[arg(long)]
        metrics: bool,
    },

    /// Run the configured cron jobs until interrupted
    Schedule,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<AppError>()
            .map(AppError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(&cli.config).map_err(AppError::from)?;
    init_tracing(&config);

    let span = tracing::info_span!(
        "keyword_trends",
        service_name = %config.observability.service_name
    );
    execute(cli.command, config).instrument(span).await
}

async fn execute(command: Commands, config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting keyword-trends v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.prometheus_enabled {
        init_pipeline_metrics();
        init_scheduler_metrics();
    }

    tracing::info!("Store backend: {:?}", config.store.backend);
    let store = create_store(&config.store)?;
    let orchestrator = Arc::new(Orchestrator::from_config(store, &config));

    match command {
        Commands::Run {
            keywords,
            source,
            destination,
            start,
            end,
            metrics,
        } => {
            let request = RunRequest::new(keywords, source, destination, start, end);
            request.check()?;

            let summary = orchestrator.run(&request).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to render run summary")?
            );

            if metrics {
                eprint!("{}", gather_metrics());
            }
        }

        Commands::Schedule => {
            if !config.scheduler.enabled {
                return Err(AppError::Configuration(
                    "scheduler.enabled is false; nothing to schedule".to_string(),
                )
                .into());
            }

            let mut scheduler = SchedulerService::new(config.scheduler.clone())
                .await
                .map_err(AppError::from)?;
            scheduler
                .register_trend_jobs(Arc::clone(&orchestrator))
                .await
                .map_err(AppError::from)?;
            scheduler.start().await.map_err(AppError::from)?;

            tracing::info!("Scheduler running, press Ctrl+C to stop");
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;

            tracing::info!("Shutdown signal received");
            scheduler.shutdown().await.map_err(AppError::from)?;
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("keyword_trends={}", config.observability.log_level).into()
    });

    let json = config.observability.json_logs;
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

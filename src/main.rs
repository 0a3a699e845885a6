use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use boardlens::application::services::{
    AssetResolver, BlobCache, BlobCacheConfig, JobPoller, PollerConfig, ResolverConfig,
};
use boardlens::application::use_cases::{ResetOutcome, ResetQueueUseCase};
use boardlens::domain::entities::{JobSnapshot, ids_match};
use boardlens::domain::ports::{
    BlobFetchPort, ConfirmationPort, StaticCredentialProvider, SyncApiPort,
};
use boardlens::infrastructure::{AppConfig, BoardApiClient, CliArgs, Command, StorageManager};
use boardlens::presentation::{AutoConfirm, StdinConfirmation, render_assets, render_snapshot};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let manager = StorageManager::new()?;
    let mut config = manager.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = boardlens::VERSION, "Starting boardlens");

    let credentials = Arc::new(StaticCredentialProvider::new(config.token.clone()));
    let client = Arc::new(BoardApiClient::new(
        &config.api_base_url,
        &config.provider,
        credentials,
    )?);

    match args.command {
        Command::Jobs => jobs(&config, &client).await,
        Command::Watch { continuous } => watch(&config, client, continuous).await,
        Command::Reset { yes } => reset(&config, client, yes).await,
        Command::Resolve {
            board_id,
            item,
            column,
            download,
        } => {
            resolve(
                &config,
                client,
                &board_id,
                item.as_deref(),
                column.as_deref(),
                download,
            )
            .await
        }
    }
}

async fn jobs(config: &AppConfig, client: &BoardApiClient) -> Result<()> {
    let jobs = client.list_jobs(config.job_limit).await?;
    let snapshot = JobSnapshot::new(jobs);
    print!("{}", render_snapshot(&snapshot, chrono::Utc::now()));
    Ok(())
}

async fn watch(config: &AppConfig, client: Arc<BoardApiClient>, continuous: bool) -> Result<()> {
    let poller_config = PollerConfig {
        interval: config.poll_interval(),
        job_limit: config.job_limit,
        continuous,
    };
    let (poller, handle) = JobPoller::new(client as Arc<dyn SyncApiPort>, poller_config);
    let task = tokio::spawn(poller.run());
    let mut updates = handle.clone();

    loop {
        tokio::select! {
            updated = updates.wait_for_update() => {
                if !updated {
                    break;
                }
                print!("{}", render_snapshot(&updates.snapshot(), chrono::Utc::now()));
                println!();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                handle.stop().await;
                break;
            }
        }
    }

    task.await?;
    Ok(())
}

async fn reset(config: &AppConfig, client: Arc<BoardApiClient>, yes: bool) -> Result<()> {
    let confirmation: Arc<dyn ConfirmationPort> = if yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(StdinConfirmation)
    };

    let use_case =
        ResetQueueUseCase::new(Arc::clone(&client) as Arc<dyn SyncApiPort>, confirmation);
    match use_case.execute().await? {
        ResetOutcome::Reset => {
            println!("Queue reset; active jobs marked failed.");
            jobs(config, &client).await?;
        }
        ResetOutcome::Cancelled => println!("Cancelled."),
    }
    Ok(())
}

async fn resolve(
    config: &AppConfig,
    client: Arc<BoardApiClient>,
    board_id: &str,
    item_filter: Option<&str>,
    column: Option<&str>,
    download: bool,
) -> Result<()> {
    let resolver_config = ResolverConfig::new(&config.api_base_url, &config.provider)
        .with_thumb_width(config.thumb_width);
    let resolver = AssetResolver::new(resolver_config.clone());

    let items = client.fetch_items(board_id).await?;
    let mut assets = Vec::new();
    for item in &items {
        if let Some(filter) = item_filter {
            if !ids_match(&item.id, filter) {
                continue;
            }
        }
        assets.extend(resolver.resolve(item, config.optimize_images, column));
    }
    print!("{}", render_assets(&assets));

    if download {
        let cache_config = BlobCacheConfig::new(resolver_config.origin())
            .with_debug_overlay(config.debug_overlay);
        for asset in &assets {
            let mut cache = BlobCache::new(
                cache_config.clone(),
                Arc::clone(&client) as Arc<dyn BlobFetchPort>,
            );
            cache.load(asset, true).await;
            cache.verify_decoded();
            println!("  {:<32} {:?}", asset.name, cache.status());
        }
    }

    Ok(())
}

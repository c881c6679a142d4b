use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use release_resolver::config::{self, EngineConfig};
use release_resolver::logging::{self, LogConfig};
use release_resolver::release::artifact::Abi;
use release_resolver::release::clock::SystemClock;
use release_resolver::release::device::{DeviceProfile, StaticDeviceProfile};
use release_resolver::release::freshness::FreshnessValidator;
use release_resolver::release::outcome::ResolutionOutcome;
use release_resolver::release::transport::ReqwestTransport;
use release_resolver::resolve::{Catalog, ResolveContext, Resolver};

#[derive(Parser)]
#[command(name = "release-resolver")]
#[command(version, about = "Resolve the latest release and download artifact of Android apps")]
struct Cli {
    /// JSON engine configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a file instead of stderr (the data directory when no path is given)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the cataloged applications
    List,
    /// Resolve the latest release of the given applications (all when omitted)
    Resolve {
        apps: Vec<String>,

        /// ABI of the target device
        #[arg(long, default_value = "arm64-v8a")]
        abi: Abi,

        /// Prefer 32-bit builds on 64-bit devices
        #[arg(long)]
        prefer_32bit: bool,

        /// The device is below the minimum OS level most apps require
        #[arg(long)]
        no_min_os: bool,

        /// Resolutions running at the same time
        #[arg(long)]
        concurrency: Option<usize>,

        /// Check that each resolved download URL answers a HEAD request
        #[arg(long)]
        verify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogConfig {
        file: cli
            .log_file
            .clone()
            .map(|path| path.unwrap_or_else(config::log_path)),
        json: cli.log_json,
    })?;

    let engine_config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let catalog = Catalog::builtin(&engine_config);

    match cli.command {
        Command::List => {
            for entry in catalog.entries() {
                println!("{}", serde_json::to_string(&entry.descriptor)?);
            }
            Ok(())
        }
        Command::Resolve {
            apps,
            abi,
            prefer_32bit,
            no_min_os,
            concurrency,
            verify,
        } => {
            let device = StaticDeviceProfile(DeviceProfile {
                abi,
                prefer_32bit,
                supports_min_os: !no_min_os,
            });
            let concurrency = concurrency.unwrap_or(engine_config.concurrency);
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?
                .block_on(resolve(engine_config, catalog, device, apps, concurrency, verify))
        }
    }
}

async fn resolve(
    engine_config: EngineConfig,
    catalog: Catalog,
    device: StaticDeviceProfile,
    apps: Vec<String>,
    concurrency: usize,
    verify: bool,
) -> anyhow::Result<()> {
    let transport =
        ReqwestTransport::new(&engine_config.transport).context("Failed to build HTTP client")?;
    let apps = if apps.is_empty() {
        catalog.ids().map(str::to_string).collect()
    } else {
        apps
    };
    let resolver = Resolver::new(
        catalog,
        Arc::new(transport),
        Arc::new(device),
        Arc::new(SystemClock),
        FreshnessValidator::new(engine_config.global_max_age_days),
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });
    let ctx = ResolveContext::with_cancellation(cancel);

    for (app_id, result) in resolver.resolve_all(&apps, &ctx, concurrency).await {
        let line = match result {
            Ok(outcome) => {
                let download = match (&outcome, verify) {
                    (ResolutionOutcome::Success(result), true) => Some(
                        match resolver.verify_download(&result.download_url).await {
                            Ok(()) => json!({ "reachable": true }),
                            Err(e) => {
                                warn!("{}: {}", app_id, e);
                                json!({ "reachable": false, "error": e.to_string() })
                            }
                        },
                    ),
                    _ => None,
                };
                json!({ "app": app_id, "result": outcome, "download": download })
            }
            Err(e) => json!({ "app": app_id, "error": e.to_string() }),
        };
        println!("{line}");
    }

    Ok(())
}

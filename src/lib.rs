pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use clap::{CommandFactory, Parser};
use cli::{AccountCommands, Cli, Commands, TargetCommands};
pub use config::Config;
use services::{AccountUpdate, Scheduler, TargetUpdate};
use state::SharedState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists; leaving it untouched.");
        }
        return Ok(());
    }

    let mut config = Config::load()?;
    config.apply_env_overrides();
    config.validate()?;

    init_tracing(&config);

    if matches!(command, Commands::Daemon) {
        return run_daemon(config).await;
    }

    let state = SharedState::new(config).await?;

    match command {
        Commands::Tick => cli::cmd_tick(&state).await,
        Commands::Rotate { name } => cli::cmd_rotate(&state, &name).await,
        Commands::Creds { name } => cli::cmd_creds(&state, &name).await,
        Commands::Target { command } => match command {
            TargetCommands::Set {
                name,
                url,
                username,
                password,
                semp_version,
                tls_skip_verify,
            } => {
                let update = TargetUpdate {
                    semp_url: url,
                    admin_username: username,
                    admin_password: password,
                    semp_version,
                    tls_skip_verify,
                };
                cli::cmd_target_set(&state, &name, update).await
            }
            TargetCommands::Get { name } => cli::cmd_target_get(&state, &name).await,
            TargetCommands::List => cli::cmd_target_list(&state).await,
            TargetCommands::Delete { name } => cli::cmd_target_delete(&state, &name).await,
        },
        Commands::Account { command } => match command {
            AccountCommands::Set {
                name,
                target,
                username,
                rotation_period,
                password_length,
            } => {
                let update = AccountUpdate {
                    target,
                    remote_username: username,
                    rotation_period_secs: rotation_period,
                    password_length,
                };
                cli::cmd_account_set(&state, &name, update).await
            }
            AccountCommands::Get { name } => cli::cmd_account_get(&state, &name).await,
            AccountCommands::List => cli::cmd_account_list(&state).await,
            AccountCommands::Delete { name } => cli::cmd_account_delete(&state, &name).await,
        },
        Commands::Daemon | Commands::Init => Ok(()),
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    info!(
        "Rotarr v{} starting in daemon mode...",
        env!("CARGO_PKG_VERSION")
    );

    let server_config = config.server.clone();
    let scheduler_config = config.scheduler.clone();
    let shared = Arc::new(SharedState::new(config).await?);

    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&shared.auto_rotator),
        scheduler_config,
    ));

    let scheduler_handle = {
        let sched = Arc::clone(&scheduler);
        tokio::spawn(async move {
            if let Err(e) = sched.start().await {
                error!("Scheduler error: {}", e);
            }
        })
    };

    let server_handle: Option<tokio::task::JoinHandle<()>> = if server_config.enabled {
        let port = server_config.port;
        info!("Starting Web API on port {}", port);

        let app = api::router(api::create_app_state(Arc::clone(&shared)));
        let addr = format!("0.0.0.0:{}", port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        Some(tokio::spawn(async move {
            info!("API server running at http://0.0.0.0:{}", port);
            if let Err(e) = axum::serve(listener, app).await {
                error!("Web server error: {}", e);
            }
        }))
    } else {
        None
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received");
        }
        Err(e) => {
            error!("Error listening for shutdown: {}", e);
        }
    }

    // Lets an in-flight sweep finish.
    scheduler.stop().await;
    if let Err(e) = scheduler_handle.await {
        error!("Scheduler task failed: {}", e);
    }
    if let Some(handle) = server_handle {
        handle.abort();
    }
    info!("Daemon stopped");

    Ok(())
}

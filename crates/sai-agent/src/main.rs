//! sai-agent entry point.
//!
//! Boots the switch, applies a software state file and reports port
//! counters. The SAI adapter is the in-memory one from `sai-api`.

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use sai_agent::{AgentConfig, ManagerError, SaiSwitch, SwitchState, DEFAULT_CONFIG_PATH};
use sai_api::{FakeSai, SaiApi};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Switch agent programming ports, queues and schedulers through SAI
#[derive(Parser, Debug)]
#[command(name = "sai-agent")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Agent configuration file (TOML)
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Software state to apply (JSON)
    #[arg(short = 's', long)]
    state: Option<PathBuf>,

    /// Reload the stores from the warm boot snapshot
    #[arg(long)]
    warm_boot: bool,

    /// After applying, exit for warm boot and boot again from the snapshot
    #[arg(long)]
    warm_restart: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    info!("Starting sai-agent");

    match run(&args) {
        Ok(()) => {
            info!("sai-agent exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let fatal = e
                .downcast_ref::<ManagerError>()
                .is_some_and(ManagerError::is_fatal);
            if fatal {
                error!("fatal store error: {:#}", e);
                std::process::abort();
            }
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = AgentConfig::load_or_default(&args.config)?;
    config.validate()?;
    info!(
        "platform has {} ports with {} queues each",
        config.platform.ports.len(),
        config.platform.queues_per_port
    );

    let state = match &args.state {
        Some(path) => Some(SwitchState::load(path)?),
        None => None,
    };

    let sai: Arc<dyn SaiApi> = Arc::new(FakeSai::with_queues_per_port(
        config.platform.queues_per_port,
    ));
    let mut switch = SaiSwitch::new(Arc::clone(&sai), config.clone());
    let recovered = switch.init(args.warm_boot)?;
    let desired = match (state, recovered) {
        (Some(state), _) => state,
        (None, Some(recovered)) => {
            info!("keeping {} ports recovered from warm boot", recovered.port_count());
            recovered
        }
        (None, None) => {
            warn!("no state given, switch starts without ports");
            SwitchState::new()
        }
    };

    let delta = switch.apply_state(desired)?;
    info!("applied {} port changes", delta.ports_delta().len());

    if args.warm_restart {
        switch
            .exit_for_warm_boot()
            .context("failed to exit for warm boot")?;
        drop(switch);

        let mut switch = SaiSwitch::new(sai, config);
        let recovered = switch.init(true)?.unwrap_or_default();
        switch.apply_state(recovered)?;
        report_stats(&mut switch)?;
        return Ok(());
    }

    report_stats(&mut switch)
}

fn report_stats(switch: &mut SaiSwitch) -> anyhow::Result<()> {
    switch.update_stats()?;
    for (port, stats) in switch.port_manager().get_port_stats() {
        info!("port {}: {}", port, serde_json::to_string(&stats)?);
    }
    let manager_stats = switch.port_manager().stats();
    info!(
        "ports added {}, changed {}, removed {}",
        manager_stats.ports_added, manager_stats.ports_changed, manager_stats.ports_removed
    );
    Ok(())
}

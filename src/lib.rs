// src/lib.rs

pub mod cli;
pub mod config;
pub mod control_plane;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod filter;
pub mod logging;
pub mod playbook;
pub mod topology;
pub mod types;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_registry_path, load_and_validate, RegistryConfig};
use crate::control_plane::AmbariClient;
use crate::engine::{PlaybookRunner, RunReport, TaskOutput};
use crate::exec::{SshTransport, SystemLocalBackend};
use crate::playbook::{load_playbook, parse_overrides, Playbook, TaskAction, TerminalPrompt};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - registry loading (plus CLI overrides)
/// - input resolution and playbook loading
/// - the Ambari client (topology + control plane), SSH transport and local
///   backend
/// - the playbook runner
pub async fn run(args: CliArgs) -> Result<()> {
    let registry_path = args
        .registry
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_registry_path);

    let mut cfg = load_and_validate(&registry_path)
        .with_context(|| format!("loading registry {}", registry_path.display()))?;

    if let Some(n) = args.max_parallel_hosts {
        anyhow::ensure!(n >= 1, "--max-parallel-hosts must be at least 1");
        cfg.engine.max_parallel_hosts = n;
    }

    let overrides = match args.vars.as_deref() {
        Some(vars) => parse_overrides(vars)?,
        None => BTreeMap::new(),
    };

    let playbook = load_playbook(&args.playbook, &overrides, &TerminalPrompt)
        .with_context(|| format!("loading playbook {}", args.playbook))?;

    if args.dry_run {
        print_dry_run(&cfg, &playbook);
        return Ok(());
    }

    let ambari = Arc::new(AmbariClient::new(&cfg.registry));
    let runner = PlaybookRunner::new(
        &cfg,
        ambari.clone(),
        Arc::new(SshTransport::new()),
        Arc::new(SystemLocalBackend::new()),
        ambari,
    );

    info!(
        registry = %cfg.registry.id,
        cluster = %cfg.registry.cluster,
        "[Executing playbook]"
    );
    let report = runner.execute(&playbook).await?;
    print_summary(&report);

    Ok(())
}

/// Dry-run output: registry, inputs and the validated task list.
fn print_dry_run(cfg: &RegistryConfig, playbook: &Playbook) {
    println!("ambari-playbook dry-run");
    println!(
        "  registry = {} ({}, cluster {})",
        cfg.registry.id,
        cfg.registry.base_url(),
        cfg.registry.cluster
    );
    println!(
        "  connection_profile = {}",
        if cfg.connection_profile.is_some() { "set" } else { "none" }
    );
    println!("  engine.max_parallel_hosts = {}", cfg.engine.max_parallel_hosts);
    println!();

    println!("playbook: {}", playbook.name);
    if !playbook.description.is_empty() {
        println!("  {}", playbook.description);
    }
    println!();

    println!("tasks ({}):", playbook.tasks.len());
    for task in &playbook.tasks {
        println!("  - {} [{}]", task.name, task.kind());
        match &task.action {
            TaskAction::RemoteCommand { command }
            | TaskAction::LocalCommand { command }
            | TaskAction::AmbariCommand { command } => println!("      command: {command}"),
            TaskAction::Download { url, file } => {
                println!("      url: {url}");
                println!("      file: {}", file.display());
            }
            TaskAction::Upload { source, target } => {
                println!("      source: {}", source.display());
                println!("      target: {target}");
            }
            TaskAction::Config {
                config_type,
                config_key,
                config_value,
            } => println!("      {config_type}: {config_key} = {config_value}"),
        }

        let t = &task.targeting;
        for (field, names) in [
            ("services", &t.services),
            ("components", &t.components),
            ("hosts", &t.hosts),
        ] {
            if let Some(names) = names {
                println!("      {field}: {}", names.join(","));
            }
        }
        if t.control_plane {
            println!("      ambari_server: true");
        }
        if t.agent_only {
            println!("      ambari_agent: true");
        }
        if !task.action.uses_hosts() && !t.agent_only {
            debug!(task = %task.name, "targeting fields have no effect for this task type");
        }
    }

    debug!("dry-run complete (no execution)");
}

fn print_summary(report: &RunReport) {
    println!();
    println!("playbook '{}' completed ({} tasks)", report.playbook, report.tasks.len());
    for task in &report.tasks {
        let detail = match &task.output {
            TaskOutput::Remote(results) => {
                let failed = results.values().filter(|r| !r.done).count();
                format!("{} hosts, {} not done", results.len(), failed)
            }
            TaskOutput::Local(_) => "ok".to_string(),
            TaskOutput::Downloaded { bytes } => format!("{bytes} bytes"),
            TaskOutput::Lifecycle(scope) => format!("{scope:?} command sent"),
            TaskOutput::ConfigUpdated => "config updated".to_string(),
        };
        println!("  - {} [{}]: {detail}", task.name, task.kind);
    }
}

//! Command-line definitions and command dispatch.

use crate::config::Config;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cpupin::{
    apply, plan, render, ApplyOptions, DomainConfig, DomainRef, LayoutParams, PinError, Store,
};
use std::io::Write;
use std::path::PathBuf;

/// Plan static CPU pinning for libvirt domains
#[derive(Debug, Parser)]
#[command(name = "pinctl")]
#[command(about = "Plan static vCPU, I/O thread and emulator pinning for libvirt domains")]
#[command(version)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = "pinctl.toml")]
    pub config: PathBuf,

    /// Base directory for domain and layout files (overrides the config)
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the domain fragment for a layout
    Render {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the role of every core
    Plan {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Patch a domain file with memory and CPU settings
    Apply {
        /// Domain identifier (domain@hostname)
        #[arg(long, value_name = "DOMAIN@HOST")]
        domain: DomainRef,

        /// Total RAM in GiB
        #[arg(long, value_name = "GIB")]
        memory: u64,

        /// Print the patched document instead of saving it
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Layout given either by name or inline
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Named layout file
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with_all = ["total_cores", "threads_per_core", "io_threads", "system_cores", "virtual_cores"]
    )]
    pub layout: Option<String>,

    /// Total count of cores
    #[arg(long, required_unless_present = "layout")]
    pub total_cores: Option<u32>,

    /// Threads per core
    #[arg(long, required_unless_present = "layout")]
    pub threads_per_core: Option<u32>,

    /// Count of I/O threads
    #[arg(long, required_unless_present = "layout")]
    pub io_threads: Option<u32>,

    /// System cores (e.g. 0,1 or 0-3,8)
    #[arg(long, value_name = "LIST", required_unless_present = "layout")]
    pub system_cores: Option<String>,

    /// Count of guest vCPUs
    #[arg(long, required_unless_present = "layout")]
    pub virtual_cores: Option<u32>,

    /// Fail instead of warning when not every vCPU can be placed
    #[arg(long)]
    pub strict: bool,
}

fn required<T: Copy>(value: Option<T>, field: &'static str) -> cpupin::Result<T> {
    value.ok_or_else(|| PinError::invalid(field, "Value is required without --layout"))
}

impl LayoutArgs {
    /// Resolve into validated parameters.
    pub fn resolve(&self, store: &Store) -> Result<LayoutParams> {
        if let Some(name) = &self.layout {
            return store
                .load_layout(name)
                .with_context(|| format!("Loading layout '{}'", name));
        }

        let system_cores = self
            .system_cores
            .as_deref()
            .ok_or_else(|| PinError::invalid("system_cores", "Value is required without --layout"))?;

        let params = LayoutParams::builder()
            .total_cores(required(self.total_cores, "total_cores")?)
            .threads_per_core(required(self.threads_per_core, "threads_per_core")?)
            .io_threads(required(self.io_threads, "io_threads")?)
            .system_cores_str(system_cores)?
            .virtual_cores(required(self.virtual_cores, "virtual_cores")?)
            .build()?;
        Ok(params)
    }
}

/// Run a parsed command, writing results to `out`.
pub fn run<W: Write>(cli: &Cli, config: &Config, out: &mut W) -> Result<()> {
    let store = config.store(cli.root.as_deref());

    match &cli.command {
        Commands::Render { layout } => {
            let params = layout.resolve(&store)?;
            tracing::debug!(%params, "Rendering fragment");

            let plan = plan(&params);
            if layout.strict {
                plan.ensure_satisfied()?;
            }
            writeln!(out, "{}", render(&params, &plan)).context("Writing fragment")?;
        }
        Commands::Plan { layout } => {
            let params = layout.resolve(&store)?;
            let plan = plan(&params);
            if layout.strict {
                plan.ensure_satisfied()?;
            }
            for core in plan.iter() {
                let io = if core.has_io() { "io" } else { "" };
                let line = format!("{:>4}  {:<8} {}", core.index(), core.role().to_string(), io);
                writeln!(out, "{}", line.trim_end()).context("Writing plan")?;
            }
        }
        Commands::Apply {
            domain,
            memory,
            dry_run,
            layout,
        } => {
            let params = layout.resolve(&store)?;
            let domain_config = DomainConfig::new(*memory, params)?;
            let options = ApplyOptions {
                dry_run: *dry_run,
                strict: layout.strict,
            };

            let patched = apply(&store, domain, &domain_config, options)
                .with_context(|| format!("Patching domain {}", domain))?;
            if *dry_run {
                write!(out, "{}", patched).context("Writing patched document")?;
            }
        }
    }

    Ok(())
}

/// Process exit status for a failed run.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PinError>()
        .map(PinError::exit_code)
        .unwrap_or(1)
}

//! pinctl - plan and apply static CPU pinning for libvirt domains
//!
//! Configuration is loaded from pinctl.toml in the working directory unless
//! --config points elsewhere.

use clap::Parser;
use pinctl::{exit_code, init_tracing, run, Cli, Config, VERBOSE_FILTER};
use text_colorizer::Colorize;

fn main() {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("{} {}", "Warning:".yellow(), e);
        Config::default()
    });

    if cli.verbose {
        init_tracing(VERBOSE_FILTER);
    } else {
        init_tracing(&config.logging.level);
    }

    let stdout = std::io::stdout();
    if let Err(e) = run(&cli, &config, &mut stdout.lock()) {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(exit_code(&e));
    }
}

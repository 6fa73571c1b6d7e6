use anyhow::Result;
use clap::Parser;
use log::info;
use simplelog::{ColorChoice, Config as LogConfig, LevelFilter, TermLogger, TerminalMode};
use tilgen::build::{build_site, BuildSummary};
use tilgen::config::{Config, Mode};
use tilgen::date;

/// Builds the TIL blog from the project in (or above) the current directory.
#[derive(Parser, Debug)]
#[command(name = "tilgen", version, about)]
struct Cli {
    /// Build links for a local server rooted at the output directory
    /// instead of the published base path.
    #[arg(long)]
    local: bool,

    /// Rebuild whenever a post, template, stylesheet or script changes.
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    TermLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let mode = match cli.local {
        true => Mode::Local,
        false => Mode::Published,
    };
    let config = Config::from_directory(&std::env::current_dir()?, mode)?;

    let build = || -> Result<()> {
        report(&build_site(&config)?);
        Ok(())
    };
    build()?;

    if cli.watch {
        tilgen::watch::watch(&config, build)?;
    }
    Ok(())
}

fn report(summary: &BuildSummary) {
    if let Some(latest) = &summary.latest {
        info!(
            "Latest post: {} ({})",
            latest.title,
            date::relative_label(latest.date, date::now())
        );
    }
}

use anyhow::{Context, Result};
use cli::{BuildArgs, Cli};
use config::Configuration;
use environment::Environment;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

mod assemble;
mod bundle;
mod cli;
mod config;
mod config_wizard;
mod environment;
mod error;
mod markup;
mod pdf;
mod pipeline;
mod theme;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Config => config_wizard::run(),
        cli::Commands::Themes => {
            for id in theme::list_theme_ids() {
                let config = theme::get_theme(id);
                println!(
                    "  {:<10} {} - {}",
                    console::style(id).bold(),
                    config.name,
                    config.description
                );
            }
            Ok(())
        }
        cli::Commands::Build(args) => build(args),
    }
}

fn build(args: &BuildArgs) -> Result<()> {
    println!("Loading configuration...");
    let config_path = args.root.join(&args.config);
    let config = if config_path.exists() {
        Configuration::load(&config_path)?
    } else {
        log::info!(
            "no {} found, using the default configuration",
            config_path.display()
        );
        Configuration::default()
    };

    let layout = config.layout(&args.root);
    let options = config.render_options(args.skip_pdf)?;
    let env = Environment::from_env();
    let engine = options.chrome_engine();

    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{pos}] {msg}")
            .expect("can parse progress style"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));

    let outcome = pipeline::build(&layout, &options, &env, &engine, &progress);
    progress.finish_and_clear();
    let outcome = outcome.with_context(|| "Failed to build résumé")?;

    println!();
    for path in &outcome.written {
        println!("  {:<40} {}", path.display(), file_size(path));
    }
    match &outcome.pdf {
        Some(pdf) => println!("  {:<40} {}", pdf.display(), file_size(pdf)),
        None => println!("  PDF export skipped."),
    }

    Ok(())
}

fn file_size(path: &Path) -> String {
    let Ok(metadata) = std::fs::metadata(path) else {
        return String::new();
    };
    match byte_unit::Byte::from_u128(metadata.len() as u128) {
        Some(size) => size
            .get_appropriate_unit(byte_unit::UnitType::Binary)
            .to_string(),
        None => String::new(),
    }
}

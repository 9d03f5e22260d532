use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Project directory containing the résumé sources
    #[clap(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file, relative to the project directory
    #[clap(short, long, default_value = crate::config::CONFIG_FILE)]
    pub config: PathBuf,

    /// Only build the HTML bundle, without exporting a PDF
    #[clap(long)]
    pub skip_pdf: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generates a resume.toml config file
    Config,
    /// Renders the résumé to an HTML bundle and a PDF
    Build(BuildArgs),
    /// Lists the available colour themes
    Themes,
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "kis-course-docs",
    version,
    about = "Build course and institution documents from a KIS submission"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Build(BuildArgs),
    Inspect(InspectArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long)]
    pub xml_path: PathBuf,

    #[arg(long)]
    pub qualification_levels_path: PathBuf,

    #[arg(long)]
    pub enrichment_path: PathBuf,

    #[arg(long, default_value = ".cache/kis")]
    pub out_dir: PathBuf,

    /// Also upsert every document into this SQLite database.
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub reference_data_path: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    pub version_tag: u32,

    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub xml_path: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/kis")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

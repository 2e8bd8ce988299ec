use std::path::PathBuf;
use clap::{Parser, ValueEnum};

use crate::hierarchy::RootPolicy;

/// How much of each employee card the text chart shows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum InfoLevel {
    /// Name only
    #[default]
    L1,
    /// Name and title
    L2,
    /// Name, title, department and report count
    L3,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "orgchart", about = "Build and explore an organizational chart from flat employee records")]
pub struct Cli {
    /// JSON array of employee records
    pub file_path: PathBuf,

    #[clap(value_enum, default_value_t = InfoLevel::L1)]
    pub info_level: InfoLevel,

    /// Which record becomes the root when several have no manager
    #[clap(long, value_enum, default_value_t = RootPolicy::LastWins)]
    pub root_policy: RootPolicy,

    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Highlight employees whose name, title or department contains this text
    #[clap(long)]
    pub search: Option<String>,

    /// Start with every manager below the root collapsed
    #[clap(long)]
    pub collapse_all: bool,

    /// Reveal the employee with this id (repeatable)
    #[clap(long = "expand", value_name = "ID")]
    pub expand: Vec<String>,

    #[clap(long, short)]
    pub verbose: bool,
}

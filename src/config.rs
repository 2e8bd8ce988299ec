use crate::cli::{Cli, InfoLevel, OutputFormat};
use crate::hierarchy::BuildOptions;

#[derive(Debug)]
pub struct Config {
    pub build: BuildOptions,
    pub info_level: InfoLevel,
    pub format: OutputFormat,
    pub log_filter: &'static str,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            build: BuildOptions {
                root_policy: cli.root_policy,
            },
            info_level: cli.info_level,
            format: cli.format,
            log_filter: if cli.verbose { "debug" } else { "warn" },
        }
    }
}

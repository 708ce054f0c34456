use clap::Subcommand;
use opsgate_config::{Config, ConfigLoader};
use opsgate_core::OPSGATE_CONFIG_VAR;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod check_config;
pub mod inspect_token;
pub mod keygen;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a fresh Ed25519 signing seed (hex) for security.signing_key
    Keygen,

    /// Load and validate a configuration, then print it with secrets redacted
    CheckConfig {
        /// JSON config file (defaults to $OPSGATE_CONFIG)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Verify a token's signature and expiry and print its claims
    InspectToken {
        /// JSON config file holding the signing key (defaults to $OPSGATE_CONFIG)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// The raw bearer token
        token: String,
    },
}

impl Commands {
    pub fn execute(self, out: &mut impl Write) -> eyre::Result<()> {
        match self {
            Commands::Keygen => keygen::execute(out),
            Commands::CheckConfig { config } => check_config::execute(&load_config(config)?, out),
            Commands::InspectToken { config, token } => {
                inspect_token::execute(&load_config(config)?, &token, out)
            }
        }
    }

    /// Config file given on the command line, if any
    pub fn config_path(&self) -> Option<&Path> {
        match self {
            Commands::Keygen => None,
            Commands::CheckConfig { config } | Commands::InspectToken { config, .. } => {
                config.as_deref()
            }
        }
    }

    /// Log level from the effective configuration.
    ///
    /// Falls back to `fallback` when the configuration does not load; the
    /// command itself reports that error.
    pub fn log_level(&self, fallback: &str) -> String {
        load_config(self.config_path().map(Path::to_path_buf))
            .map(|config| config.logging.level)
            .unwrap_or_else(|_| fallback.to_string())
    }
}

/// Load the config from `path`, else `$OPSGATE_CONFIG`, else defaults
pub fn load_config(path: Option<PathBuf>) -> eyre::Result<Config> {
    let path = path.or_else(|| std::env::var_os(OPSGATE_CONFIG_VAR).map(PathBuf::from));
    let loader = match path {
        Some(path) => ConfigLoader::new().file(path),
        None => ConfigLoader::new(),
    };
    Ok(loader.load()?)
}

pub mod settings;
pub mod toml_config;

pub use settings::LookupSettings;
pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::core::ParticipantId;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "peppol-lookup")]
#[command(about = "Look up a PEPPOL participant in the SML and list the document types its SMP publishes")]
pub struct CliConfig {
    /// Participant identifier scheme (ICD), e.g. 0192
    #[arg(long)]
    pub scheme: String,

    /// Participant identifier value, e.g. 921605900
    #[arg(long)]
    pub identifier: String,

    /// SML zone to query [default: edelivery.tech.ec.europa.eu]
    #[arg(long)]
    pub sml_domain: Option<String>,

    /// DNS timeout in seconds [default: 5]
    #[arg(long)]
    pub dns_timeout_secs: Option<u64>,

    /// HTTP timeout in seconds [default: 30]
    #[arg(long)]
    pub http_timeout_secs: Option<u64>,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Print the lookup report as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// The identifier exactly as given; the hashed key is not normalised.
    pub fn participant(&self) -> ParticipantId {
        ParticipantId::new(self.scheme.as_str(), self.identifier.as_str())
    }

    /// Defaults, then the TOML file, then environment, then flags.
    pub fn settings(&self) -> Result<LookupSettings> {
        let mut settings = LookupSettings::default();

        if let Some(path) = &self.config {
            tracing::debug!("Loading configuration from: {}", path);
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            file.apply_to(&mut settings);
        }

        settings.apply_env()?;

        if let Some(domain) = &self.sml_domain {
            settings.sml_domain = domain.clone();
        }
        if let Some(secs) = self.dns_timeout_secs {
            settings.dns_timeout_secs = secs;
        }
        if let Some(secs) = self.http_timeout_secs {
            settings.http_timeout_secs = secs;
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("scheme", &self.scheme)?;
        validation::validate_non_empty_string("identifier", &self.identifier)?;
        Ok(())
    }
}

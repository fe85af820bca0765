use crate::config::settings::{LookupSettings, MAX_TIMEOUT_SECS};
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

/// On-disk configuration. Every section and key is optional.
///
/// ```toml
/// [sml]
/// domain = "acc.edelivery.tech.ec.europa.eu"
/// timeout_seconds = 5
///
/// [smp]
/// timeout_seconds = 30
///
/// [capabilities]
/// invoice = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice"
/// credit_note = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2::CreditNote"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub sml: SmlSection,
    #[serde(default)]
    pub smp: SmpSection,
    #[serde(default)]
    pub capabilities: CapabilitiesSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmlSection {
    pub domain: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmpSection {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesSection {
    pub invoice: Option<String>,
    pub credit_note: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LookupError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| LookupError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PEPPOL_SML_DOMAIN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Overlays the values present in this file onto `settings`.
    pub fn apply_to(&self, settings: &mut LookupSettings) {
        if let Some(domain) = &self.sml.domain {
            settings.sml_domain = domain.clone();
        }
        if let Some(secs) = self.sml.timeout_seconds {
            settings.dns_timeout_secs = secs;
        }
        if let Some(secs) = self.smp.timeout_seconds {
            settings.http_timeout_secs = secs;
        }
        if let Some(invoice) = &self.capabilities.invoice {
            settings.invoice_document_type = invoice.clone();
        }
        if let Some(credit_note) = &self.capabilities.credit_note {
            settings.credit_note_document_type = credit_note.clone();
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(domain) = &self.sml.domain {
            validation::validate_domain("sml.domain", domain)?;
        }
        if let Some(secs) = self.sml.timeout_seconds {
            validation::validate_range("sml.timeout_seconds", secs, 1, MAX_TIMEOUT_SECS)?;
        }
        if let Some(secs) = self.smp.timeout_seconds {
            validation::validate_range("smp.timeout_seconds", secs, 1, MAX_TIMEOUT_SECS)?;
        }
        if let Some(invoice) = &self.capabilities.invoice {
            validation::validate_non_empty_string("capabilities.invoice", invoice)?;
        }
        if let Some(credit_note) = &self.capabilities.credit_note {
            validation::validate_non_empty_string("capabilities.credit_note", credit_note)?;
        }
        Ok(())
    }
}

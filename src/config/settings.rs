use crate::core::sml::DEFAULT_SML_DOMAIN;
use crate::core::{ConfigProvider, BIS_BILLING_CREDIT_NOTE, BIS_BILLING_INVOICE};
use crate::utils::error::{LookupError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DNS_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// Fully resolved lookup settings.
///
/// Layers are applied in order: defaults, TOML file, environment, command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupSettings {
    pub sml_domain: String,
    pub dns_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub invoice_document_type: String,
    pub credit_note_document_type: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            sml_domain: DEFAULT_SML_DOMAIN.to_string(),
            dns_timeout_secs: DEFAULT_DNS_TIMEOUT_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            invoice_document_type: BIS_BILLING_INVOICE.to_string(),
            credit_note_document_type: BIS_BILLING_CREDIT_NOTE.to_string(),
        }
    }
}

fn parse_secs(name: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| LookupError::InvalidConfigValueError {
            field: name.to_string(),
            value: raw.to_string(),
            reason: "Expected a whole number of seconds".to_string(),
        })
}

impl LookupSettings {
    /// Applies `PEPPOL_SML_DOMAIN`, `PEPPOL_DNS_TIMEOUT_SECS` and
    /// `PEPPOL_HTTP_TIMEOUT_SECS` when set.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn apply_vars<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(domain) = var("PEPPOL_SML_DOMAIN") {
            self.sml_domain = domain;
        }
        if let Some(raw) = var("PEPPOL_DNS_TIMEOUT_SECS") {
            self.dns_timeout_secs = parse_secs("PEPPOL_DNS_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = var("PEPPOL_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = parse_secs("PEPPOL_HTTP_TIMEOUT_SECS", &raw)?;
        }
        Ok(())
    }
}

impl ConfigProvider for LookupSettings {
    fn sml_domain(&self) -> &str {
        &self.sml_domain
    }

    fn dns_timeout(&self) -> Duration {
        Duration::from_secs(self.dns_timeout_secs)
    }

    fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn invoice_document_type(&self) -> &str {
        &self.invoice_document_type
    }

    fn credit_note_document_type(&self) -> &str {
        &self.credit_note_document_type
    }
}

impl Validate for LookupSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_domain("sml_domain", &self.sml_domain)?;
        validation::validate_range("dns_timeout_secs", self.dns_timeout_secs, 1, MAX_TIMEOUT_SECS)?;
        validation::validate_range(
            "http_timeout_secs",
            self.http_timeout_secs,
            1,
            MAX_TIMEOUT_SECS,
        )?;
        validation::validate_non_empty_string("invoice_document_type", &self.invoice_document_type)?;
        validation::validate_non_empty_string(
            "credit_note_document_type",
            &self.credit_note_document_type,
        )?;
        Ok(())
    }
}

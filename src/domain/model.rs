use serde::{Deserialize, Serialize};
use std::fmt;

/// PEPPOL BIS Billing 3.0 invoice document type.
pub const BIS_BILLING_INVOICE: &str =
    "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice";

/// PEPPOL BIS Billing 3.0 credit note document type.
pub const BIS_BILLING_CREDIT_NOTE: &str =
    "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2::CreditNote";

/// ISO 6523 participant identifier, e.g. `0192:921605900`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId {
    pub scheme: String,
    pub value: String,
}

impl ParticipantId {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// `{scheme}:{value}`, the string hashed for SML and encoded for SMP.
    pub fn key(&self) -> String {
        format!("{}:{}", self.scheme, self.value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

/// Outcome of an SML lookup. An unregistered participant is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "host", rename_all = "snake_case")]
pub enum SmlResolution {
    Found(String),
    NotFound,
}

impl SmlResolution {
    pub fn host(&self) -> Option<&str> {
        match self {
            SmlResolution::Found(host) => Some(host),
            SmlResolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SmlResolution::Found(_))
    }
}

/// Answer of the address probe behind the SML hostname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostProbe {
    Exists,
    NoSuchHost,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSupport {
    pub invoice: bool,
    pub credit_note: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupReport {
    pub participant: ParticipantId,
    pub sml: SmlResolution,
    pub document_types: Vec<String>,
    pub billing: BillingSupport,
}

impl LookupReport {
    pub fn is_registered(&self) -> bool {
        self.sml.is_found()
    }

    pub fn supports(&self, document_type: &str) -> bool {
        self.document_types.iter().any(|d| d == document_type)
    }
}

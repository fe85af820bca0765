//! PEPPOL participant lookup.
//!
//! A participant identifier is hashed into an SML hostname
//! (`b-{md5}.iso6523-actorid-upis.{domain}`); if that name resolves, the
//! participant's SMP is queried over HTTP for the document types it accepts.

pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{LookupSettings, TomlConfig};

pub use crate::adapters::HickoryResolver;
pub use crate::core::{
    lookup::PeppolLookup,
    sml::{participant_hash, sml_hostname, SmlLocator, DEFAULT_SML_DOMAIN},
    smp::{parse_document_types, smp_url, SmpClient},
};
pub use crate::domain::model::{
    BillingSupport, HostProbe, LookupReport, ParticipantId, SmlResolution, BIS_BILLING_CREDIT_NOTE,
    BIS_BILLING_INVOICE,
};
pub use crate::domain::ports::{ConfigProvider, HostResolver};
pub use tokio_util::sync::CancellationToken;
pub use crate::utils::error::{LookupError, Result};

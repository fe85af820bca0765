use crate::domain::model::HostProbe;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Checks whether a hostname resolves to at least one address.
///
/// Implementations must report a name that does not exist as
/// `Ok(HostProbe::NoSuchHost)` and reserve `Err` for resolver failures
/// (`LookupError::TransientResolution`).
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn probe(&self, host: &str) -> Result<HostProbe>;
}

pub trait ConfigProvider: Send + Sync {
    fn sml_domain(&self) -> &str;
    fn dns_timeout(&self) -> Duration;
    fn http_timeout(&self) -> Duration;
    fn invoice_document_type(&self) -> &str;
    fn credit_note_document_type(&self) -> &str;
}

use crate::core::{HostProbe, HostResolver, ParticipantId, SmlResolution};
use crate::utils::error::{LookupError, Result};
use md5::{Digest, Md5};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Production SML zone.
pub const DEFAULT_SML_DOMAIN: &str = "edelivery.tech.ec.europa.eu";

/// Identifier scheme label used in SML hostnames and SMP paths.
pub const PARTICIPANT_SCHEME: &str = "iso6523-actorid-upis";

/// Lowercase hex MD5 of the participant key.
pub fn participant_hash(participant: &ParticipantId) -> String {
    let mut hasher = Md5::new();
    hasher.update(participant.key().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `b-{md5}.iso6523-actorid-upis.{domain}`
pub fn sml_hostname(participant: &ParticipantId, domain: &str) -> String {
    format!(
        "b-{}.{}.{}",
        participant_hash(participant),
        PARTICIPANT_SCHEME,
        domain
    )
}

/// Service Metadata Locator client: maps a participant to its SMP host.
#[derive(Clone)]
pub struct SmlLocator {
    resolver: Arc<dyn HostResolver>,
    domain: String,
}

impl SmlLocator {
    pub fn new(resolver: Arc<dyn HostResolver>, domain: impl Into<String>) -> Self {
        Self {
            resolver,
            domain: domain.into(),
        }
    }

    pub async fn resolve(
        &self,
        participant: &ParticipantId,
        cancel: &CancellationToken,
    ) -> Result<SmlResolution> {
        let host = sml_hostname(participant, &self.domain);
        tracing::debug!("SML hostname for {}: {}", participant, host);

        let probe = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("SML lookup for {} cancelled", participant);
                return Err(LookupError::Cancelled { stage: "sml" });
            }
            probe = self.resolver.probe(&host) => probe,
        };

        match probe {
            Ok(HostProbe::Exists) => {
                tracing::info!("🔎 {} is registered, SMP host {}", participant, host);
                Ok(SmlResolution::Found(host))
            }
            Ok(HostProbe::NoSuchHost) => {
                tracing::info!("{} is not registered in {}", participant, self.domain);
                Ok(SmlResolution::NotFound)
            }
            Err(e) => {
                tracing::warn!("⚠️ SML lookup for {} failed: {}", participant, e);
                Err(e)
            }
        }
    }
}

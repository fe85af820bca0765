use crate::adapters::HickoryResolver;
use crate::core::sml::SmlLocator;
use crate::core::smp::SmpClient;
use crate::core::{
    BillingSupport, ConfigProvider, LookupReport, ParticipantId, SmlResolution,
};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// SML then SMP, followed by the configured capability checks.
#[derive(Clone)]
pub struct PeppolLookup {
    locator: SmlLocator,
    smp: SmpClient,
    invoice_document_type: String,
    credit_note_document_type: String,
}

impl PeppolLookup {
    pub fn new(locator: SmlLocator, smp: SmpClient) -> Self {
        Self {
            locator,
            smp,
            invoice_document_type: crate::core::BIS_BILLING_INVOICE.to_string(),
            credit_note_document_type: crate::core::BIS_BILLING_CREDIT_NOTE.to_string(),
        }
    }

    /// Builds the hickory resolver and HTTP client from configuration.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let resolver = HickoryResolver::from_system_conf(config.dns_timeout())?;
        let locator = SmlLocator::new(Arc::new(resolver), config.sml_domain());
        let smp = SmpClient::new(config.http_timeout())?;
        Ok(Self::new(locator, smp).with_billing_document_types(
            config.invoice_document_type(),
            config.credit_note_document_type(),
        ))
    }

    pub fn with_billing_document_types(
        mut self,
        invoice: impl Into<String>,
        credit_note: impl Into<String>,
    ) -> Self {
        self.invoice_document_type = invoice.into();
        self.credit_note_document_type = credit_note.into();
        self
    }

    pub fn billing_support(&self, document_types: &[String]) -> BillingSupport {
        BillingSupport {
            invoice: document_types
                .iter()
                .any(|d| *d == self.invoice_document_type),
            credit_note: document_types
                .iter()
                .any(|d| *d == self.credit_note_document_type),
        }
    }

    pub async fn lookup(
        &self,
        participant: &ParticipantId,
        cancel: &CancellationToken,
    ) -> Result<LookupReport> {
        tracing::debug!("Starting lookup for {}", participant);

        let sml = self.locator.resolve(participant, cancel).await?;
        let document_types = match &sml {
            SmlResolution::Found(host) => self.smp.fetch(host, participant, cancel).await?,
            SmlResolution::NotFound => Vec::new(),
        };

        let billing = self.billing_support(&document_types);
        tracing::info!(
            "✅ {}: {} document types (invoice: {}, credit note: {})",
            participant,
            document_types.len(),
            billing.invoice,
            billing.credit_note
        );

        Ok(LookupReport {
            participant: participant.clone(),
            sml,
            document_types,
            billing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sml::sml_hostname;
    use crate::core::{HostProbe, HostResolver};
    use async_trait::async_trait;
    use httpmock::prelude::*;

    struct AlwaysExists;

    #[async_trait]
    impl HostResolver for AlwaysExists {
        async fn probe(&self, _host: &str) -> Result<HostProbe> {
            Ok(HostProbe::Exists)
        }
    }

    struct NeverExists;

    #[async_trait]
    impl HostResolver for NeverExists {
        async fn probe(&self, _host: &str) -> Result<HostProbe> {
            Ok(HostProbe::NoSuchHost)
        }
    }

    #[test]
    fn test_billing_support() {
        let lookup = PeppolLookup::new(
            SmlLocator::new(Arc::new(NeverExists), "example.org"),
            SmpClient::with_client(reqwest::Client::new()),
        );
        let only_invoice = vec![
            "urn:other".to_string(),
            crate::core::BIS_BILLING_INVOICE.to_string(),
        ];
        assert_eq!(
            lookup.billing_support(&only_invoice),
            BillingSupport {
                invoice: true,
                credit_note: false
            }
        );
        assert_eq!(lookup.billing_support(&[]), BillingSupport::default());
    }

    #[test]
    fn test_custom_billing_document_types() {
        let lookup = PeppolLookup::new(
            SmlLocator::new(Arc::new(NeverExists), "example.org"),
            SmpClient::with_client(reqwest::Client::new()),
        )
        .with_billing_document_types("urn:inv", "urn:cn");

        let types = vec!["urn:cn".to_string()];
        assert_eq!(
            lookup.billing_support(&types),
            BillingSupport {
                invoice: false,
                credit_note: true
            }
        );
    }

    #[tokio::test]
    async fn test_not_registered_skips_smp() {
        let lookup = PeppolLookup::new(
            SmlLocator::new(Arc::new(NeverExists), "example.org"),
            SmpClient::with_client(reqwest::Client::new()),
        );
        let participant = ParticipantId::new("0192", "000000000");

        let report = lookup
            .lookup(&participant, &CancellationToken::new())
            .await
            .unwrap();

        assert!(!report.is_registered());
        assert!(report.document_types.is_empty());
        assert_eq!(report.billing, BillingSupport::default());
    }

    #[tokio::test]
    async fn test_lookup_end_to_end() {
        let participant = ParticipantId::new("0192", "921605900");
        let domain = "sml.example.org";
        let host = sml_hostname(&participant, domain);

        let server = MockServer::start();
        let smp_mock = server.mock(|when, then| {
            when.method(GET).path_contains("iso6523-actorid-upis::");
            then.status(200)
                .header("Content-Type", "application/xml")
                .body(
                    r#"<ServiceGroup xmlns="http://busdox.org/serviceMetadata/publishing/1.0/">
  <ServiceMetadataReferenceCollection>
    <ServiceMetadataReference href="http://smp/services/busdox-docid-qns%3A%3Aurn%3Aoasis%3Anames%3Aspecification%3Aubl%3Aschema%3Axsd%3ACreditNote-2%3A%3ACreditNote%23%23urn%3Acen.eu"/>
  </ServiceMetadataReferenceCollection>
</ServiceGroup>"#,
                );
        });

        // 把 SML 主機名導向 mock server
        let client = reqwest::Client::builder()
            .resolve(&host, *server.address())
            .build()
            .unwrap();
        let lookup = PeppolLookup::new(
            SmlLocator::new(Arc::new(AlwaysExists), domain),
            SmpClient::with_client(client),
        );

        let report = lookup
            .lookup(&participant, &CancellationToken::new())
            .await
            .unwrap();

        smp_mock.assert();
        assert_eq!(report.sml, SmlResolution::Found(host));
        assert_eq!(
            report.document_types,
            vec![crate::core::BIS_BILLING_CREDIT_NOTE.to_string()]
        );
        assert!(report.billing.credit_note);
        assert!(!report.billing.invoice);
    }
}

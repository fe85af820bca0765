use anyhow::Result;
use async_trait::async_trait;
use httpmock::prelude::*;
use peppol_lookup::{
    sml_hostname, CancellationToken, HostProbe, HostResolver, LookupError, ParticipantId,
    PeppolLookup, SmlLocator, SmlResolution, SmpClient, BIS_BILLING_CREDIT_NOTE,
    BIS_BILLING_INVOICE,
};
use std::collections::HashSet;
use std::sync::Arc;

const SML_DOMAIN: &str = "sml.test.example.org";

/// Stands in for DNS: only the listed hostnames exist.
struct RegisteredHosts(HashSet<String>);

#[async_trait]
impl HostResolver for RegisteredHosts {
    async fn probe(&self, host: &str) -> peppol_lookup::Result<HostProbe> {
        if self.0.contains(host) {
            Ok(HostProbe::Exists)
        } else {
            Ok(HostProbe::NoSuchHost)
        }
    }
}

struct DnsDown;

#[async_trait]
impl HostResolver for DnsDown {
    async fn probe(&self, host: &str) -> peppol_lookup::Result<HostProbe> {
        Err(LookupError::TransientResolution {
            host: host.to_string(),
            message: "no connections available".to_string(),
        })
    }
}

fn service_group(document_types: &[&str]) -> String {
    let references: String = document_types
        .iter()
        .map(|d| {
            format!(
                r#"<ServiceMetadataReference href="http://smp/services/{}"/>"#,
                urlencoding::encode(&format!("busdox-docid-qns::{}##customization", d))
            )
        })
        .collect();
    format!(
        r#"<ServiceGroup xmlns="http://busdox.org/serviceMetadata/publishing/1.0/"><ServiceMetadataReferenceCollection>{}</ServiceMetadataReferenceCollection></ServiceGroup>"#,
        references
    )
}

/// Routes every registered SML hostname to the mock SMP.
fn lookup_against(server: &MockServer, registered: &[ParticipantId]) -> PeppolLookup {
    let hosts: Vec<String> = registered
        .iter()
        .map(|p| sml_hostname(p, SML_DOMAIN))
        .collect();

    let mut builder = reqwest::Client::builder();
    for host in &hosts {
        builder = builder.resolve(host, *server.address());
    }

    PeppolLookup::new(
        SmlLocator::new(
            Arc::new(RegisteredHosts(hosts.into_iter().collect())),
            SML_DOMAIN,
        ),
        SmpClient::with_client(builder.build().unwrap()),
    )
}

#[tokio::test]
async fn test_registered_participant_with_billing_support() -> Result<()> {
    let participant = ParticipantId::new("0192", "921605900");
    let server = MockServer::start();
    let smp_mock = server.mock(|when, then| {
        when.method(GET).path_contains("921605900");
        then.status(200)
            .body(service_group(&[BIS_BILLING_INVOICE, BIS_BILLING_CREDIT_NOTE]));
    });

    let lookup = lookup_against(&server, &[participant.clone()]);
    let report = lookup
        .lookup(&participant, &CancellationToken::new())
        .await?;

    smp_mock.assert();
    assert!(report.is_registered());
    assert_eq!(
        report.sml.host(),
        Some("b-e258de9dbe1f34f17b55d5d3cc5e7a66.iso6523-actorid-upis.sml.test.example.org")
    );
    assert!(report.supports(BIS_BILLING_INVOICE));
    assert!(report.billing.invoice);
    assert!(report.billing.credit_note);
    Ok(())
}

#[tokio::test]
async fn test_unregistered_participant_never_hits_smp() -> Result<()> {
    let server = MockServer::start();
    let smp_mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body(service_group(&[]));
    });

    let lookup = lookup_against(&server, &[ParticipantId::new("0192", "921605900")]);
    let stranger = ParticipantId::new("0192", "999999999");
    let report = lookup.lookup(&stranger, &CancellationToken::new()).await?;

    assert_eq!(report.sml, SmlResolution::NotFound);
    assert!(report.document_types.is_empty());
    smp_mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_dns_failure_is_not_reported_as_unregistered() {
    let lookup = PeppolLookup::new(
        SmlLocator::new(Arc::new(DnsDown), SML_DOMAIN),
        SmpClient::with_client(reqwest::Client::new()),
    );

    let err = lookup
        .lookup(
            &ParticipantId::new("0192", "921605900"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::TransientResolution { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_smp_error_after_sml_hit() {
    let participant = ParticipantId::new("9908", "987654321");
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let lookup = lookup_against(&server, &[participant.clone()]);
    let err = lookup
        .lookup(&participant, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(500));
}

#[tokio::test]
async fn test_repeated_lookups_are_identical() -> Result<()> {
    let participant = ParticipantId::new("0192", "921605900");
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).body(service_group(&["urn:x", "urn:y", "urn:x"]));
    });

    let lookup = lookup_against(&server, &[participant.clone()]);
    let cancel = CancellationToken::new();

    let first = lookup.lookup(&participant, &cancel).await?;
    let second = lookup.lookup(&participant, &cancel).await?;

    assert_eq!(first.sml, second.sml);
    assert_eq!(first.document_types, second.document_types);
    assert_eq!(
        first.document_types,
        vec!["urn:x".to_string(), "urn:y".to_string(), "urn:x".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_engine() -> Result<()> {
    let participants = vec![
        ParticipantId::new("0192", "921605900"),
        ParticipantId::new("0088", "5790000435944"),
        ParticipantId::new("9908", "987654321"),
    ];
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).body(service_group(&[BIS_BILLING_INVOICE]));
    });

    let lookup = Arc::new(lookup_against(&server, &participants));
    let cancel = CancellationToken::new();

    let handles: Vec<_> = participants
        .iter()
        .cloned()
        .map(|participant| {
            let lookup = lookup.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { lookup.lookup(&participant, &cancel).await })
        })
        .collect();

    for handle in handles {
        let report = handle.await??;
        assert!(report.billing.invoice);
        assert!(!report.billing.credit_note);
    }
    Ok(())
}

#[tokio::test]
async fn test_report_serializes_to_json() -> Result<()> {
    let participant = ParticipantId::new("0192", "921605900");
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).body(service_group(&[BIS_BILLING_INVOICE]));
    });

    let lookup = lookup_against(&server, &[participant.clone()]);
    let report = lookup
        .lookup(&participant, &CancellationToken::new())
        .await?;

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["participant"]["scheme"], "0192");
    assert_eq!(json["sml"]["status"], "found");
    assert_eq!(json["document_types"][0], BIS_BILLING_INVOICE);
    assert_eq!(json["billing"]["invoice"], true);
    Ok(())
}

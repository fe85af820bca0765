use crate::core::sml::PARTICIPANT_SCHEME;
use crate::core::ParticipantId;
use crate::utils::error::{LookupError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Namespace of the BusDox SMP publishing schema.
pub const SMP_NAMESPACE: &str = "http://busdox.org/serviceMetadata/publishing/1.0/";

/// Marker preceding the document type identifier inside a reference href.
pub const DOCUMENT_ID_MARKER: &str = "busdox-docid-qns::";

const SERVICE_METADATA_REFERENCE: &[u8] = b"ServiceMetadataReference";

/// `http://{host}/iso6523-actorid-upis::{percent-encoded key}`
pub fn smp_url(host: &str, participant: &ParticipantId) -> String {
    format!(
        "http://{}/{}::{}",
        host,
        PARTICIPANT_SCHEME,
        urlencoding::encode(&participant.key())
    )
}

/// Pulls the document type identifier out of a (still percent-encoded)
/// `ServiceMetadataReference` href. `None` means the reference is skipped.
pub fn extract_document_type(href: &str) -> Option<String> {
    let decoded = match urlencoding::decode(href) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("Skipping undecodable href {}: {}", href, e);
            return None;
        }
    };

    let (_, rest) = decoded.split_once(DOCUMENT_ID_MARKER)?;
    let document_type = match rest.split_once('#') {
        Some((document_type, _fragment)) => document_type,
        None => rest,
    };
    Some(document_type.to_string())
}

fn parse_error(reader: &NsReader<&[u8]>, message: impl std::fmt::Display) -> LookupError {
    LookupError::Parse {
        message: format!("{} (at byte {})", message, reader.buffer_position()),
    }
}

fn href_of(element: &BytesStart<'_>) -> std::result::Result<Option<String>, String> {
    let attribute = element
        .try_get_attribute("href")
        .map_err(|e| format!("malformed attribute: {}", e))?;
    match attribute {
        Some(attribute) => attribute
            .unescape_value()
            .map(|value| Some(value.into_owned()))
            .map_err(|e| format!("malformed href value: {}", e)),
        None => Ok(None),
    }
}

/// Extracts the document type identifiers of every `ServiceMetadataReference`
/// (SMP namespace, any depth) in document order.
pub fn parse_document_types(xml: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    let mut document_types = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| LookupError::Parse {
                message: e.to_string(),
            })?;

        let (element, opens) = match event {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Event::Eof => break,
            // 根元素結束後只允許空白
            Event::Text(text) if seen_root && depth == 0 => {
                if text.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                return Err(parse_error(&reader, "junk after document element"));
            }
            Event::CData(_) if seen_root && depth == 0 => {
                return Err(parse_error(&reader, "junk after document element"));
            }
            _ => continue,
        };

        let namespace = match resolved {
            ResolveResult::Bound(Namespace(ns)) => Ok(ns == SMP_NAMESPACE.as_bytes()),
            ResolveResult::Unbound => Ok(false),
            ResolveResult::Unknown(prefix) => Err(String::from_utf8_lossy(&prefix).into_owned()),
        };
        let in_smp_namespace = namespace.map_err(|prefix| {
            parse_error(&reader, format!("undeclared namespace prefix '{}'", prefix))
        })?;

        if depth == 0 {
            if seen_root {
                return Err(parse_error(
                    &reader,
                    "junk after document element: multiple root elements",
                ));
            }
            seen_root = true;
        }
        for attribute in element.attributes() {
            attribute.map_err(|e| parse_error(&reader, format!("malformed attribute: {}", e)))?;
        }
        if opens {
            depth += 1;
        }

        if !in_smp_namespace || element.local_name().as_ref() != SERVICE_METADATA_REFERENCE {
            continue;
        }

        let href = href_of(&element).map_err(|message| parse_error(&reader, message))?;
        match href {
            Some(href) => {
                if let Some(document_type) = extract_document_type(&href) {
                    document_types.push(document_type);
                } else {
                    tracing::debug!("Skipping reference without {}: {}", DOCUMENT_ID_MARKER, href);
                }
            }
            None => tracing::debug!("Skipping ServiceMetadataReference without href"),
        }
    }

    if depth > 0 {
        return Err(parse_error(&reader, "unexpected end of document, unclosed element"));
    }
    if !seen_root {
        return Err(LookupError::Parse {
            message: "no root element found".to_string(),
        });
    }

    Ok(document_types)
}

/// Service Metadata Publisher client.
#[derive(Debug, Clone)]
pub struct SmpClient {
    client: Client,
}

impl SmpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    /// Uses a caller-built client, e.g. one with DNS overrides.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(
        &self,
        host: &str,
        participant: &ParticipantId,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>> {
        let url = smp_url(host, participant);
        tracing::debug!("Making SMP request to: {}", url);

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("SMP request to {} cancelled", url);
                return Err(LookupError::Cancelled { stage: "smp" });
            }
            body = self.get_body(&url) => body?,
        };

        tracing::trace!("SMP response:\n{}", body);

        let document_types = parse_document_types(&body)?;
        tracing::debug!(
            "SMP {} lists {} document types",
            host,
            document_types.len()
        );
        Ok(document_types)
    }

    async fn get_body(&self, url: &str) -> Result<String> {
        let fetch_error = |source: reqwest::Error| LookupError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;
        tracing::debug!("SMP response status: {}", response.status());

        let response = response.error_for_status().map_err(fetch_error)?;
        response.text().await.map_err(fetch_error)
    }
}

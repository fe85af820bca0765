use crate::domain::model::HostProbe;
use crate::domain::ports::HostResolver;
use crate::utils::error::{LookupError, Result};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::{Name, TokioAsyncResolver};
use std::time::Duration;

/// Address lookups through hickory, using the system name servers.
///
/// A single attempt per query and no answer cache: every `probe` is one
/// round-trip, so a registration change in the SML is seen immediately.
#[derive(Clone)]
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryResolver {
    pub fn from_system_conf(timeout: Duration) -> Result<Self> {
        let (config, opts) = hickory_resolver::system_conf::read_system_conf().map_err(|e| {
            LookupError::ConfigError {
                message: format!("Failed to read system resolver configuration: {}", e),
            }
        })?;
        Ok(Self::with_config(config, opts, timeout))
    }

    pub fn with_config(config: ResolverConfig, mut opts: ResolverOpts, timeout: Duration) -> Self {
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// NXDOMAIN and empty NOERROR answers mean the name is not registered;
/// everything else is an infrastructure failure.
fn classify(host: &str, error: ResolveError) -> Result<HostProbe> {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. }
            if matches!(response_code, ResponseCode::NXDomain | ResponseCode::NoError) =>
        {
            tracing::debug!("{} does not exist ({})", host, response_code);
            Ok(HostProbe::NoSuchHost)
        }
        _ => Err(LookupError::TransientResolution {
            host: host.to_string(),
            message: error.to_string(),
        }),
    }
}

#[async_trait]
impl HostResolver for HickoryResolver {
    async fn probe(&self, host: &str) -> Result<HostProbe> {
        // 結尾加 '.' 避免 resolv.conf 的 search 網域被附加上去
        let fqdn = if host.ends_with('.') {
            host.to_string()
        } else {
            format!("{}.", host)
        };

        // 不合法的主機名（空白、標籤過長）不可能存在
        let name = match Name::from_utf8(&fqdn) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("{} is not a valid DNS name: {}", host, e);
                return Ok(HostProbe::NoSuchHost);
            }
        };

        match self.resolver.lookup_ip(name).await {
            Ok(lookup) => {
                let first = lookup.iter().next();
                tracing::debug!("{} resolved (first address: {:?})", host, first);
                match first {
                    Some(_) => Ok(HostProbe::Exists),
                    None => Ok(HostProbe::NoSuchHost),
                }
            }
            Err(e) => classify(host, e),
        }
    }
}

//! Configuration for the game services client.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SdkError};
use crate::poller::PollPolicy;

pub const DEFAULT_ENDPOINT: &str = "https://management.core.windows.net";
pub const DEFAULT_API_VERSION: &str = "2012-08-01";
pub const DEFAULT_GEO_REGION: &str = "West US";

/// PKCS#12 client certificate used to authenticate against the management
/// endpoint.
#[derive(Clone)]
pub struct ClientCertificate {
    pub pkcs12: Vec<u8>,
    pub password: String,
}

impl ClientCertificate {
    pub fn new(pkcs12: Vec<u8>, password: impl Into<String>) -> Self {
        Self {
            pkcs12,
            password: password.into(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>, password: impl Into<String>) -> Result<Self> {
        let pkcs12 = std::fs::read(path.as_ref())?;
        Ok(Self::new(pkcs12, password))
    }

    pub(crate) fn identity(&self) -> Result<reqwest::Identity> {
        reqwest::Identity::from_pkcs12_der(&self.pkcs12, &self.password)
            .map_err(|e| SdkError::Config(format!("invalid client certificate: {}", e)))
    }
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("pkcs12", &format!("<{} bytes>", self.pkcs12.len()))
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for [`GameServicesClient`](crate::GameServicesClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Management endpoint, without the subscription segment.
    pub endpoint: String,
    pub subscription_id: String,
    pub certificate: Option<ClientCertificate>,
    /// Value of the `x-ms-version` header.
    pub api_version: String,
    pub request_timeout: Duration,
    /// How long to wait for newly created resources to appear.
    pub poll: PollPolicy,
    /// Region used when the cloud service container has to be created.
    pub geo_region: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: String::new(),
            certificate: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout: Duration::from_secs(60),
            poll: PollPolicy::default(),
            geo_region: DEFAULT_GEO_REGION.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `GAMESERVICES_SUBSCRIPTION_ID`: Subscription id (required)
    /// - `GAMESERVICES_ENDPOINT`: Management endpoint (default: "https://management.core.windows.net")
    /// - `GAMESERVICES_CERTIFICATE_PATH`: PKCS#12 client certificate file (optional)
    /// - `GAMESERVICES_CERTIFICATE_PASSWORD`: Certificate password (default: "")
    /// - `GAMESERVICES_API_VERSION`: API version header (default: "2012-08-01")
    /// - `GAMESERVICES_REQUEST_TIMEOUT_MS`: Request timeout in milliseconds (default: 60000)
    /// - `GAMESERVICES_POLL_ATTEMPTS`: Creation poll attempts (default: 10)
    /// - `GAMESERVICES_POLL_INTERVAL_MS`: Delay between poll attempts (default: 2000)
    /// - `GAMESERVICES_POLL_TIMEOUT_MS`: Overall poll deadline, 0 disables it (default: 120000)
    /// - `GAMESERVICES_GEO_REGION`: Region for the cloud service container (default: "West US")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let subscription_id = lookup("GAMESERVICES_SUBSCRIPTION_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SdkError::Config("GAMESERVICES_SUBSCRIPTION_ID is not set".to_string()))?;

        let endpoint = lookup("GAMESERVICES_ENDPOINT").unwrap_or(defaults.endpoint);
        let api_version = lookup("GAMESERVICES_API_VERSION").unwrap_or(defaults.api_version);
        let geo_region = lookup("GAMESERVICES_GEO_REGION").unwrap_or(defaults.geo_region);

        let certificate = match lookup("GAMESERVICES_CERTIFICATE_PATH") {
            Some(path) => {
                let password = lookup("GAMESERVICES_CERTIFICATE_PASSWORD").unwrap_or_default();
                Some(ClientCertificate::from_file(&path, password).map_err(|e| {
                    SdkError::Config(format!("cannot read certificate {}: {}", path, e))
                })?)
            }
            None => None,
        };

        let request_timeout = match parse_u64(&lookup, "GAMESERVICES_REQUEST_TIMEOUT_MS")? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.request_timeout,
        };

        let mut poll = defaults.poll;
        if let Some(attempts) = parse_u64(&lookup, "GAMESERVICES_POLL_ATTEMPTS")? {
            poll.max_attempts = u32::try_from(attempts)
                .map_err(|_| SdkError::Config("GAMESERVICES_POLL_ATTEMPTS is too large".to_string()))?;
        }
        if let Some(ms) = parse_u64(&lookup, "GAMESERVICES_POLL_INTERVAL_MS")? {
            poll.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64(&lookup, "GAMESERVICES_POLL_TIMEOUT_MS")? {
            poll.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        let config = Self {
            endpoint,
            subscription_id,
            certificate,
            api_version,
            request_timeout,
            poll,
            geo_region,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.subscription_id.trim().is_empty() {
            return Err(SdkError::Config("subscription id is empty".to_string()));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(SdkError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        if self.poll.max_attempts == 0 {
            return Err(SdkError::Config("poll attempts must be at least 1".to_string()));
        }
        Ok(())
    }

    /// `<endpoint>/<subscriptionId>`, the root every path template hangs off.
    pub fn base_url(&self) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.subscription_id.trim_matches('/')
        )
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_certificate(mut self, certificate: ClientCertificate) -> Self {
        self.certificate = Some(certificate);
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_geo_region(mut self, region: impl Into<String>) -> Self {
        self.geo_region = region.into();
        self
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    lookup(key)
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|e| SdkError::Config(format!("invalid {}: {}", key, e)))
        })
        .transpose()
}

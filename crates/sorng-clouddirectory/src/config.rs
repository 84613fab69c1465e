//! Client configuration and credential handling.
//!
//! The configuration is owned by whoever embeds the client; it is assembled
//! once, validated, and then only read. Base URIs, the host header and both
//! partition header values are derived from it.

use crate::error::{DirectoryError, DirectoryResult};
use crate::signing::Credential;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing name of the service.
pub const SERVICE: &str = "clouddirectory";

/// API version used when none is configured explicitly.
pub const DEFAULT_API_VERSION: &str = "2017-01-11";

/// Regions in which Cloud Directory is offered.
pub const CLOUD_DIRECTORY_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-2",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    // GovCloud
    "us-gov-west-1",
];

/// Connection settings for one directory/schema pair.
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// IAM access key ID.
    pub access_key_id: String,
    /// IAM secret access key.
    pub secret_access_key: String,
    /// Region hosting the directory (e.g. "us-west-2").
    pub region: String,
    /// Cloud Directory API version path segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// ARN of the directory holding objects and typed links.
    pub directory_arn: String,
    /// ARN of the schema holding facets and typed link facets.
    pub schema_arn: String,
    /// Custom endpoint URL override (test doubles, private endpoints).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    /// Connect timeout in seconds. Unset means no client-side limit.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds. Unset means no client-side limit.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

impl fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("api_version", &self.api_version)
            .field("directory_arn", &self.directory_arn)
            .field("schema_arn", &self.schema_arn)
            .field("endpoint_url", &self.endpoint_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl DirectoryConfig {
    pub fn new(
        access_key_id: &str,
        secret_access_key: &str,
        region: &str,
        directory_arn: &str,
        schema_arn: &str,
    ) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            region: region.to_string(),
            api_version: default_api_version(),
            directory_arn: directory_arn.to_string(),
            schema_arn: schema_arn.to_string(),
            endpoint_url: None,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn with_endpoint(mut self, endpoint_url: &str) -> Self {
        self.endpoint_url = Some(endpoint_url.trim_end_matches('/').to_string());
        self
    }

    /// Resolve the configuration from environment variables.
    ///
    /// Returns `None` when a required variable is missing.
    pub fn from_environment() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .ok()?;
        let directory_arn = std::env::var("CLOUDDIRECTORY_DIRECTORY_ARN").ok()?;
        let schema_arn = std::env::var("CLOUDDIRECTORY_SCHEMA_ARN").ok()?;
        let api_version = std::env::var("CLOUDDIRECTORY_API_VERSION")
            .unwrap_or_else(|_| default_api_version());
        let endpoint_url = std::env::var("CLOUDDIRECTORY_ENDPOINT_URL").ok();
        Some(Self {
            access_key_id,
            secret_access_key,
            region,
            api_version,
            directory_arn,
            schema_arn,
            endpoint_url,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        let required = [
            ("access key ID", &self.access_key_id),
            ("secret access key", &self.secret_access_key),
            ("region", &self.region),
            ("API version", &self.api_version),
            ("directory ARN", &self.directory_arn),
            ("schema ARN", &self.schema_arn),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(DirectoryError::config(format!("{} is required", name)));
            }
        }
        if let Some(ref endpoint) = self.endpoint_url {
            url::Url::parse(endpoint).map_err(|e| {
                DirectoryError::config(format!("invalid endpoint URL '{}': {}", endpoint, e))
            })?;
        }
        if !CLOUD_DIRECTORY_REGIONS.contains(&self.region.as_str()) {
            log::warn!(
                "Region '{}' is not a known Cloud Directory region",
                self.region
            );
        }
        if !self.access_key_id.starts_with("AKIA") && !self.access_key_id.starts_with("ASIA") {
            log::warn!(
                "Access key ID '{}' has unusual prefix; expected AKIA* or ASIA*",
                self.access_key_id.chars().take(4).collect::<String>()
            );
        }
        Ok(())
    }

    /// Value of the `host` header, which is also the signed host.
    pub fn host(&self) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => extract_authority(endpoint),
            None if self.region.starts_with("cn-") => {
                format!("{}.{}.amazonaws.com.cn", SERVICE, self.region)
            }
            None => format!("{}.{}.amazonaws.com", SERVICE, self.region),
        }
    }

    /// Scheme and authority requests are sent to.
    pub fn endpoint(&self) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => endpoint.clone(),
            None => format!("https://{}", self.host()),
        }
    }

    /// Canonical URI prefix shared by every operation.
    pub fn base_uri(&self) -> String {
        format!("/amazonclouddirectory/{}", self.api_version)
    }

    /// Credential scoped to this region and the Cloud Directory service.
    pub fn credential(&self) -> Credential {
        Credential::new(
            &self.access_key_id,
            &self.secret_access_key,
            &self.region,
            SERVICE,
        )
    }
}

/// `host[:port]` of a URL, as it appears on the wire.
fn extract_authority(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or_default().to_string();
            match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host,
            }
        }
        Err(_) => url.to_string(),
    }
}

//! S3 client configuration and creation.

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::Client;
use serde::{Deserialize, Serialize};

/// Connection settings for the listing endpoint.
///
/// Everything here resolves once at client creation; the iterator never
/// consults it again. Region, profile and retry policy feed the shared AWS
/// config, while credentials and endpoint overrides are applied to the S3
/// service config on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket to list
    pub bucket: String,

    /// Key prefix the listing is scoped to
    pub prefix: Option<String>,

    /// Endpoint override; implies path-style addressing (LocalStack, MinIO)
    pub endpoint: Option<String>,

    /// Region; falls back to the environment/profile chain when unset
    pub region: Option<String>,

    /// Named profile to resolve shared config from
    pub profile: Option<String>,

    /// Static access key id, used only together with `secret_key`
    pub access_key: Option<String>,

    /// Static secret key, used only together with `access_key`
    pub secret_key: Option<String>,

    /// Session token accompanying temporary static credentials
    pub session_token: Option<String>,

    /// Total attempts per request, initial call included. Retries and
    /// timeouts are the SDK's responsibility; the accelerator never retries
    /// on its own.
    pub max_attempts: u32,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: None,
            endpoint: None,
            region: None,
            profile: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            max_attempts: 3,
        }
    }
}

impl S3Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Scope listings to a key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Point at a non-AWS endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Pin the region instead of resolving it from the environment.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Resolve shared config through a named profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Use static credentials instead of the default provider chain.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self.session_token = session_token;
        self
    }

    /// Cap total attempts per request.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Static credentials, when both halves of the pair are present.
    ///
    /// A lone access key or secret is ignored rather than producing a
    /// provider that can never sign anything.
    fn static_credentials(&self) -> Option<Credentials> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access_key), Some(secret_key)) => Some(Credentials::new(
                access_key,
                secret_key,
                self.session_token.clone(),
                None,
                "warplist-static",
            )),
            _ => None,
        }
    }

    /// Resolve the shared AWS config: region, profile, retry policy.
    async fn load_shared(&self) -> SdkConfig {
        let retries = RetryConfig::standard().with_max_attempts(self.max_attempts);
        let loader = match (&self.region, &self.profile) {
            (Some(region), Some(profile)) => aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .profile_name(profile),
            (Some(region), None) => aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.clone())),
            (None, Some(profile)) => {
                aws_config::defaults(BehaviorVersion::latest()).profile_name(profile)
            }
            (None, None) => aws_config::defaults(BehaviorVersion::latest()),
        };
        loader.retry_config(retries).load().await
    }
}

/// Create an S3 client from configuration.
///
/// Credentials and endpoint overrides go into the service config rather than
/// the shared loader, so the shared chain still resolves region and profile
/// data normally underneath them.
pub async fn create_s3_client(config: &S3Config) -> Client {
    let shared = config.load_shared().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if let Some(credentials) = config.static_credentials() {
        builder = builder.credentials_provider(credentials);
    }
    if let Some(endpoint) = &config.endpoint {
        // custom endpoints (LocalStack, MinIO) do not resolve virtual-hosted
        // bucket names
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }

    Client::from_conf(builder.build())
}

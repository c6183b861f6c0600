//! Bearer token source for Google APIs.

use super::types::MetadataToken;
use gcp_auth::TokenProvider;
use parley_core::error::ParleyError;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

pub(crate) const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Refresh this long before the metadata server says the token expires.
pub(crate) const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

pub(crate) struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Where access tokens come from.
pub(crate) enum TokenSource {
    /// A token supplied at startup, used as-is.
    Static(String),
    /// Application Default Credentials: a service-account key or `gcloud` user
    /// credentials. The provider is built on first use and caches its own tokens.
    Adc(OnceCell<Arc<dyn TokenProvider>>),
    /// Tokens fetched from the GCE metadata server and cached until near expiry.
    Metadata {
        url: String,
        cache: Mutex<Option<CachedToken>>,
    },
}

impl TokenSource {
    pub(crate) fn from_config(access_token: Option<String>) -> Self {
        Self::select(access_token, adc_credentials())
    }

    /// Static token first, then a credentials file, then the metadata server.
    pub(crate) fn select(access_token: Option<String>, credentials: Option<PathBuf>) -> Self {
        match (access_token, credentials) {
            (Some(token), _) if !token.is_empty() => Self::Static(token),
            (_, Some(path)) => {
                info!("google: using application default credentials from {}", path.display());
                Self::Adc(OnceCell::new())
            }
            _ => Self::metadata(METADATA_TOKEN_URL),
        }
    }

    pub(crate) fn metadata(url: impl Into<String>) -> Self {
        Self::Metadata {
            url: url.into(),
            cache: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing it if needed.
    pub(crate) async fn bearer(&self, client: &reqwest::Client) -> Result<String, ParleyError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Adc(provider) => {
                let provider = provider
                    .get_or_try_init(|| async { gcp_auth::provider().await })
                    .await
                    .map_err(|e| {
                        ParleyError::ProviderUnavailable(format!("google credentials: {e}"))
                    })?;
                let token = provider.token(&[CLOUD_PLATFORM_SCOPE]).await.map_err(|e| {
                    ParleyError::ProviderUnavailable(format!("google token request failed: {e}"))
                })?;
                Ok(token.as_str().to_string())
            }
            Self::Metadata { url, cache } => fetch_metadata_token(client, url, cache).await,
        }
    }
}

/// Credentials file named by `GOOGLE_APPLICATION_CREDENTIALS`, or the one
/// `gcloud auth application-default login` writes.
fn adc_credentials() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("GOOGLE_APPLICATION_CREDENTIALS").filter(|p| !p.is_empty())
    {
        return Some(PathBuf::from(path));
    }
    let home = std::env::var_os("HOME")?;
    let path = PathBuf::from(home).join(".config/gcloud/application_default_credentials.json");
    path.is_file().then_some(path)
}

async fn fetch_metadata_token(
    client: &reqwest::Client,
    url: &str,
    cache: &Mutex<Option<CachedToken>>,
) -> Result<String, ParleyError> {
    let mut cached = cache.lock().await;
    if let Some(ref c) = *cached {
        if Instant::now() + EXPIRY_MARGIN < c.expires_at {
            return Ok(c.token.clone());
        }
    }

    debug!("google: fetching access token from metadata server");
    let resp = client
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| ParleyError::ProviderUnavailable(format!("metadata token request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(ParleyError::ProviderUnavailable(format!(
            "metadata server returned {status}: {text}"
        )));
    }

    let token: MetadataToken = resp.json().await.map_err(|e| {
        ParleyError::ProviderUnavailable(format!("failed to parse metadata token: {e}"))
    })?;

    let value = token.access_token.clone();
    *cached = Some(CachedToken {
        token: token.access_token,
        expires_at: Instant::now() + Duration::from_secs(token.expires_in),
    });
    Ok(value)
}

//! Google Cloud Translation v3 provider.
//!
//! Calls the `translateText` and `supportedLanguages` REST endpoints under
//! `projects/{project}/locations/{location}`. Auth via bearer token.

mod auth;
pub(crate) mod types;


use async_trait::async_trait;
use auth::TokenSource;
use parley_core::{
    config::TranslateConfig,
    error::ParleyError,
    message::{SupportedLocale, Translation},
    traits::Translator,
};
use std::time::Duration;
use tracing::debug;
use types::{
    SupportedLanguagesResponse, TranslateTextRequest, TranslateTextResponse,
};

/// Google Cloud Translation provider.
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
    parent: String,
    tokens: TokenSource,
}

impl GoogleTranslator {
    /// Create from config values.
    pub fn from_config(config: &TranslateConfig) -> Result<Self, ParleyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ParleyError::ProviderUnavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            parent: location_path(&config.project, &config.location),
            tokens: TokenSource::from_config(config.access_token.clone()),
        })
    }

    fn translate_url(&self) -> String {
        format!("{}/v3/{}:translateText", self.base_url, self.parent)
    }

    fn languages_url(&self) -> String {
        format!("{}/v3/{}/supportedLanguages", self.base_url, self.parent)
    }
}

/// Resource path for a project location, e.g. `projects/p/locations/global`.
pub fn location_path(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}

/// Convert a `supportedLanguages` response into catalog entries.
///
/// Entries without a display name fall back to their code.
pub(crate) fn into_locales(resp: SupportedLanguagesResponse) -> Vec<SupportedLocale> {
    resp.languages
        .into_iter()
        .map(|l| SupportedLocale {
            display_name: l.display_name.unwrap_or_else(|| l.language_code.clone()),
            code: l.language_code,
        })
        .collect()
}

pub(crate) fn into_translations(resp: TranslateTextResponse) -> Vec<Translation> {
    resp.translations
        .into_iter()
        .map(|t| Translation {
            translated_text: t.translated_text,
        })
        .collect()
}

async fn check_status(resp: reqwest::Response, what: &str) -> Result<reqwest::Response, ParleyError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    Err(ParleyError::ProviderUnavailable(format!(
        "google {what} returned {status}: {text}"
    )))
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn supported_locales(
        &self,
        display_language: &str,
    ) -> Result<Vec<SupportedLocale>, ParleyError> {
        let token = self.tokens.bearer(&self.client).await?;
        let url = self.languages_url();
        debug!("google: GET {url} displayLanguageCode={display_language}");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("displayLanguageCode", display_language)])
            .send()
            .await
            .map_err(|e| {
                ParleyError::ProviderUnavailable(format!("google supportedLanguages failed: {e}"))
            })?;
        let resp = check_status(resp, "supportedLanguages").await?;

        let parsed: SupportedLanguagesResponse = resp.json().await.map_err(|e| {
            ParleyError::ProviderUnavailable(format!("google: failed to parse languages: {e}"))
        })?;
        Ok(into_locales(parsed))
    }

    async fn translate(
        &self,
        text: &str,
        target_locale: &str,
    ) -> Result<Vec<Translation>, ParleyError> {
        let token = self.tokens.bearer(&self.client).await?;
        let url = self.translate_url();
        debug!("google: POST {url} target={target_locale}");

        let body = TranslateTextRequest {
            contents: vec![text],
            mime_type: "text/plain",
            target_language_code: target_locale,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ParleyError::ProviderUnavailable(format!("google translateText failed: {e}"))
            })?;
        let resp = check_status(resp, "translateText").await?;

        let parsed: TranslateTextResponse = resp.json().await.map_err(|e| {
            ParleyError::ProviderUnavailable(format!("google: failed to parse translation: {e}"))
        })?;
        Ok(into_translations(parsed))
    }
}

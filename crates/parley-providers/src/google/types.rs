//! Cloud Translation v3 REST wire types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslateTextRequest<'a> {
    pub contents: Vec<&'a str>,
    pub mime_type: &'static str,
    pub target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslateTextResponse {
    #[serde(default)]
    pub translations: Vec<TranslatedSegment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranslatedSegment {
    pub translated_text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SupportedLanguagesResponse {
    #[serde(default)]
    pub languages: Vec<SupportedLanguage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SupportedLanguage {
    pub language_code: String,
    pub display_name: Option<String>,
}

/// Access token issued by the GCE metadata server.
#[derive(Debug, Deserialize)]
pub(crate) struct MetadataToken {
    pub access_token: String,
    pub expires_in: u64,
}

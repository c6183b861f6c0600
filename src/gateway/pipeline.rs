//! Translation pipeline: one provider call per message from a registered member.

use parley_core::{
    error::ParleyError,
    message::{Embed, IncomingMessage, OutgoingMessage},
    traits::Translator,
};

/// A message bound for translation, with its target already resolved
/// against the catalog.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub message: IncomingMessage,
    /// Target locale code.
    pub target: String,
    /// Display name of `target`.
    pub target_name: String,
}

/// Translate the message's clean text and build the annotated reply.
pub async fn translate_message(
    translator: &dyn Translator,
    job: &TranslationJob,
) -> Result<OutgoingMessage, ParleyError> {
    let msg = &job.message;
    let segments = translator.translate(&msg.clean_text, &job.target).await?;
    let text = segments
        .into_iter()
        .map(|t| t.translated_text)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(OutgoingMessage {
        channel_id: msg.channel_id.clone(),
        text,
        embed: Some(embed_for(job)),
    })
}

fn embed_for(job: &TranslationJob) -> Embed {
    let author = &job.message.author;
    Embed {
        title: format!("Original message translated to {}", job.target_name),
        url: Some(job.message.url.clone()),
        author_name: author.display_name.clone(),
        author_icon: author.avatar_url.clone(),
        color: author.color,
        timestamp: Some(job.message.timestamp),
    }
}

//! In-memory fakes of the chat platform and translation provider.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parley_core::{
    config::Settings,
    error::ParleyError,
    message::{Author, IncomingMessage, Member, OutgoingMessage, Role, Space, SupportedLocale, Translation},
    traits::{Channel, Translator},
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub fn settings() -> Settings {
    Settings {
        prefix: "!".to_string(),
        roles: Vec::new(),
        delete_commands: false,
        verbose: false,
        throw_errors: false,
    }
}

pub fn locales() -> Vec<SupportedLocale> {
    vec![
        SupportedLocale {
            code: "fr".to_string(),
            display_name: "French".to_string(),
        },
        SupportedLocale {
            code: "de".to_string(),
            display_name: "German".to_string(),
        },
    ]
}

pub fn member(id: &str, name: &str) -> Member {
    Member {
        id: id.to_string(),
        display_name: name.to_string(),
        roles: Vec::new(),
    }
}

pub fn role(id: &str, name: &str) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        color: 0,
        position: 1,
    }
}

/// Space with members A, B, C and roles Role1, Role2.
pub fn space() -> Arc<Space> {
    let mut space = Space {
        id: "guild".to_string(),
        ..Default::default()
    };
    for m in [member("A", "Alice"), member("B", "Bob"), member("C", "Cleo")] {
        space.members.insert(m.id.clone(), m);
    }
    for r in [role("R1", "Role1"), role("R2", "Role2")] {
        space.roles.insert(r.id.clone(), r);
    }
    Arc::new(space)
}

/// A message from `author_id` in the shared test space.
pub fn message(author_id: &str, text: &str) -> IncomingMessage {
    let space = space();
    let display_name = space
        .member(author_id)
        .map(|m| m.display_name.clone())
        .unwrap_or_else(|| author_id.to_string());
    IncomingMessage {
        id: format!("msg-{author_id}"),
        channel_id: "chan".to_string(),
        author: Author {
            id: author_id.to_string(),
            tag: author_id.to_lowercase(),
            display_name,
            avatar_url: Some(format!("https://cdn.example/{author_id}.png")),
            color: Some(0x3366ff),
        },
        from_self: false,
        text: text.to_string(),
        clean_text: text.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        url: format!("https://discord.com/channels/guild/chan/msg-{author_id}"),
        mentions: Vec::new(),
        role_mentions: Vec::new(),
        space,
    }
}

/// Attach member mentions (resolved from the test space) to a message.
pub fn with_mentions(mut msg: IncomingMessage, ids: &[&str]) -> IncomingMessage {
    msg.mentions = ids
        .iter()
        .filter_map(|id| msg.space.member(id).cloned())
        .collect();
    msg
}

/// Attach role mentions (resolved from the test space) to a message.
pub fn with_role_mentions(mut msg: IncomingMessage, ids: &[&str]) -> IncomingMessage {
    msg.role_mentions = ids
        .iter()
        .filter_map(|id| msg.space.role(id).cloned())
        .collect();
    msg
}

#[derive(Default)]
pub struct FakeTranslator {
    locales: Vec<SupportedLocale>,
    translations: HashMap<(String, String), Vec<String>>,
    pub fail: bool,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeTranslator {
    pub fn new() -> Self {
        Self {
            locales: locales(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_translation(mut self, text: &str, target: &str, segments: &[&str]) -> Self {
        self.translations.insert(
            (text.to_string(), target.to_string()),
            segments.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn supported_locales(
        &self,
        _display_language: &str,
    ) -> Result<Vec<SupportedLocale>, ParleyError> {
        if self.fail {
            return Err(ParleyError::ProviderUnavailable("fake outage".into()));
        }
        Ok(self.locales.clone())
    }

    async fn translate(
        &self,
        text: &str,
        target_locale: &str,
    ) -> Result<Vec<Translation>, ParleyError> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_locale.to_string()));
        if self.fail {
            return Err(ParleyError::ProviderUnavailable("fake outage".into()));
        }
        let segments = self
            .translations
            .get(&(text.to_string(), target_locale.to_string()))
            .cloned()
            .unwrap_or_else(|| vec![format!("[{target_locale}] {text}")]);
        Ok(segments
            .into_iter()
            .map(|translated_text| Translation { translated_text })
            .collect())
    }
}

#[derive(Default)]
pub struct FakeChannel {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub deleted: Mutex<Vec<(String, String)>>,
    pub fail_send: bool,
    /// Reported through `failure` once the inbound stream has closed.
    pub failure: Option<String>,
    inbound: Mutex<Option<mpsc::Receiver<IncomingMessage>>>,
}

impl FakeChannel {
    /// A channel whose `start` yields the receiving half of the returned sender.
    pub fn with_inbound() -> (Self, mpsc::Sender<IncomingMessage>) {
        let (tx, rx) = mpsc::channel(16);
        let channel = Self {
            inbound: Mutex::new(Some(rx)),
            ..Default::default()
        };
        (channel, tx)
    }

    /// A channel on which every send fails.
    pub fn failing() -> Self {
        Self {
            fail_send: true,
            ..Default::default()
        }
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }
}

#[async_trait]
impl Channel for FakeChannel {
    fn name(&self) -> &str {
        "fake"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ParleyError> {
        self.inbound
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ParleyError::Channel("already started".into()))
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ParleyError> {
        if self.fail_send {
            return Err(ParleyError::ReplyDelivery("fake send failure".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }

    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), ParleyError> {
        self.deleted
            .lock()
            .unwrap()
            .push((channel_id.to_string(), message_id.to_string()));
        Ok(())
    }

    async fn stop(&self) -> Result<(), ParleyError> {
        Ok(())
    }

    async fn failure(&self) -> Option<ParleyError> {
        self.failure.clone().map(ParleyError::Channel)
    }
}

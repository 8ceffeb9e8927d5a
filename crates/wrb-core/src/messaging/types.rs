use crate::domain::{ChatId, MessageId, UserId};

/// Placeholder recorded when the sender has no username.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// A text message as delivered by the chat transport.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub username: Option<String>,
    pub text: String,
}

impl InboundMessage {
    pub fn username_or_placeholder(&self) -> &str {
        self.username.as_deref().unwrap_or(UNKNOWN_USERNAME)
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_replies: bool,
    pub max_message_len: usize,
}

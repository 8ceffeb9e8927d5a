//! Telegram update handlers.
//!
//! Converts a teloxide `Message` into the transport-agnostic `InboundMessage`
//! and hands it to the core dispatcher, which logs, routes and replies.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use wrb_core::{
    domain::{ChatId, MessageId, UserId},
    messaging::types::InboundMessage,
};

use crate::router::AppState;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(inbound) = inbound_from(&msg) else {
        return Ok(());
    };

    if let Err(e) = state
        .dispatcher
        .respond(&inbound, state.messenger.as_ref())
        .await
    {
        tracing::error!(chat_id = inbound.chat_id.0, "failed to send reply: {e}");
    }

    Ok(())
}

/// Text messages with a sender become inbound commands; everything else is ignored.
fn inbound_from(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?;
    let user = msg.from()?;

    Some(InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        text: text.to_string(),
    })
}

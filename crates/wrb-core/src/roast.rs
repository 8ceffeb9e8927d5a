//! Roast generation: prompt building and stream accumulation.

use std::{sync::Arc, time::Instant};

use futures_util::StreamExt;

use crate::{
    address::WalletAddress,
    domain::Balance,
    errors::Error,
    ports::{ChatMessage, CompletionClient, CompletionRequest, FragmentStream, Role},
    Result,
};

pub const ROAST_TEMPERATURE: f32 = 1.0;
pub const ROAST_TOP_P: f32 = 1.0;
pub const ROAST_MAX_TOKENS: u32 = 2048;

pub fn roast_prompt(address: &WalletAddress, balance: &Balance) -> String {
    format!("Roast this wallet: {address}. It has {balance} ETH.")
}

pub fn build_request(
    system_prompt: &str,
    address: &WalletAddress,
    balance: &Balance,
) -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: system_prompt.to_string(),
            },
            ChatMessage {
                role: Role::User,
                content: roast_prompt(address, balance),
            },
        ],
        temperature: ROAST_TEMPERATURE,
        top_p: ROAST_TOP_P,
        max_tokens: ROAST_MAX_TOKENS,
        stop: None,
    }
}

/// Drain a fragment stream into one string, in arrival order.
pub async fn collect_fragments(mut stream: FragmentStream) -> Result<String> {
    let mut out = String::new();
    while let Some(fragment) = stream.next().await {
        out.push_str(&fragment?);
    }
    Ok(out)
}

/// Builds roast prompts and runs them through a completion backend.
pub struct RoastGenerator {
    client: Arc<dyn CompletionClient>,
    system_prompt: String,
}

impl RoastGenerator {
    pub fn new(client: Arc<dyn CompletionClient>, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
        }
    }

    pub async fn generate(&self, address: &WalletAddress, balance: &Balance) -> Result<String> {
        let started = Instant::now();
        let req = build_request(&self.system_prompt, address, balance);

        let stream = self
            .client
            .stream_completion(req)
            .await
            .map_err(into_completion)?;
        let roast = collect_fragments(stream).await.map_err(into_completion)?;

        let elapsed = started.elapsed().as_secs_f64();
        tracing::info!(
            chars = roast.chars().count(),
            "roast generated in {elapsed:.2}s"
        );
        Ok(roast)
    }
}

fn into_completion(e: Error) -> Error {
    match e {
        Error::Completion(_) => e,
        other => Error::Completion(other.to_string()),
    }
}

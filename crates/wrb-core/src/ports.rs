//! Hexagonal ports for the external services the bot relays to.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::{
    address::WalletAddress,
    domain::{AssetId, Balance, Price},
    Result,
};

/// Spot price lookup (CoinGecko in production).
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// USD price of `asset`. Unknown assets and provider failures are both
    /// `Error::LookupFailed`.
    async fn fetch_price(&self, asset: &AssetId) -> Result<Price>;
}

/// Native-token balance lookup (Etherscan in production).
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balance(&self, address: &WalletAddress) -> Result<Balance>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Provider-agnostic streaming chat-completion request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stop: Option<Vec<String>>,
}

/// Ordered, finite stream of text fragments. Fragments without content are `""`.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Streaming chat-completion backend (Groq in production).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn stream_completion(&self, req: CompletionRequest) -> Result<FragmentStream>;
}

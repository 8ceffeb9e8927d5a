use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_ETHERSCAN_API_URL: &str = "https://api.etherscan.io/api";

/// Persona used when no system prompt is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a ruthless but playful crypto comedian. \
When given a wallet address and its ETH balance, write a short, savage roast of the wallet \
owner's on-chain life: their balance, their probable trading habits, their gas fees, their \
hopes of making it. Keep it funny, keep it under 200 words, never give financial advice \
and never use slurs.";

/// Typed configuration, read from the environment (and `.env`).
///
/// Only the Telegram token is required at startup. Missing provider keys surface
/// when the corresponding command is first used.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,

    // Groq
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_api_url: String,
    pub system_prompt: String,

    // Market data
    pub coingecko_api_url: String,
    pub etherscan_api_key: Option<String>,
    pub etherscan_api_url: String,

    // Activity log
    pub activity_log_path: Option<PathBuf>,
    pub activity_log_json: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process env in `load`).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let groq_api_key = get("GROQ_API_KEY").and_then(non_empty);
        let groq_model = get("GROQ_MODEL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());
        let groq_api_url = get("GROQ_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string());
        let system_prompt = load_system_prompt(&get)?;

        let coingecko_api_url = get("COINGECKO_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string());
        let etherscan_api_key = get("ETHERSCAN_API_KEY").and_then(non_empty);
        let etherscan_api_url = get("ETHERSCAN_API_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_ETHERSCAN_API_URL.to_string());

        let activity_log_path = get("ACTIVITY_LOG_PATH")
            .and_then(non_empty)
            .map(PathBuf::from);
        let activity_log_json = get("ACTIVITY_LOG_JSON")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        Ok(Self {
            telegram_bot_token,
            groq_api_key,
            groq_model,
            groq_api_url,
            system_prompt,
            coingecko_api_url,
            etherscan_api_key,
            etherscan_api_url,
            activity_log_path,
            activity_log_json,
        })
    }
}

fn load_system_prompt(get: &impl Fn(&str) -> Option<String>) -> Result<String> {
    if let Some(prompt) = get("ROAST_SYSTEM_PROMPT").and_then(non_empty) {
        return Ok(prompt);
    }
    if let Some(path) = get("ROAST_SYSTEM_PROMPT_FILE").and_then(non_empty) {
        let prompt = fs::read_to_string(&path).map_err(|e| {
            Error::Config(format!("cannot read ROAST_SYSTEM_PROMPT_FILE {path}: {e}"))
        })?;
        return non_empty(prompt)
            .ok_or_else(|| Error::Config(format!("ROAST_SYSTEM_PROMPT_FILE {path} is empty")));
    }
    Ok(DEFAULT_SYSTEM_PROMPT.to_string())
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

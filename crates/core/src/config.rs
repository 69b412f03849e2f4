use crate::error::{AppError, Result};
use dotenvy::dotenv;
use std::env;

/// Default generate endpoint of a local Ollama instance.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama3.2-vision";

/// Global capture hotkey used when none is configured.
pub const DEFAULT_HOTKEY: &str = "alt+shift+KeyC";

#[derive(Clone, Debug)]
pub struct Config {
    pub endpoint: String,
    pub model_name: String,
    pub hotkey: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let endpoint =
            env::var("SCREENLENS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(AppError::config(format!(
                "SCREENLENS_ENDPOINT must be an http(s) URL, got '{endpoint}'"
            )));
        }

        let model_name =
            env::var("SCREENLENS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let hotkey = env::var("SCREENLENS_HOTKEY").unwrap_or_else(|_| DEFAULT_HOTKEY.to_string());

        Ok(Self {
            endpoint,
            model_name,
            hotkey,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_name: DEFAULT_MODEL.to_string(),
            hotkey: DEFAULT_HOTKEY.to_string(),
        }
    }
}

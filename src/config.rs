use std::time::Duration;

use crate::prompts;
use crate::protocol::models::{
    DEFAULT_CHAT_MODEL, DEFAULT_LIVE_MODEL, DEFAULT_VIDEO_MODEL, DEFAULT_VOICE, GenerationConfig,
    Temperature, ThinkingConfig, TopP,
};
use crate::{Error, Result};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const API_KEY_FALLBACK_ENV: &str = "API_KEY";

pub const DEFAULT_REST_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LIVE_URL: &str = "wss://generativelanguage.googleapis.com/ws/google.ai.generativelanguage.v1beta.GenerativeService.BidiGenerateContent";

const DEFAULT_TEMPERATURE: f32 = 0.3;
const DEFAULT_TOP_P: f32 = 0.95;
const DEFAULT_TOP_K: u32 = 40;
const DEFAULT_THINKING_BUDGET: u32 = 1024;
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const DEFAULT_VIDEO_POLL_INTERVAL: Duration = Duration::from_secs(8);
const DEFAULT_VIDEO_DEADLINE: Duration = Duration::from_secs(10 * 60);

/// Sampling parameters fixed when a chat session is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: Temperature,
    pub top_p: TopP,
    pub top_k: u32,
    pub thinking_budget: u32,
}

impl Sampling {
    #[must_use]
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            top_k: Some(self.top_k),
            thinking_config: Some(ThinkingConfig {
                thinking_budget: self.thinking_budget,
            }),
            ..GenerationConfig::default()
        }
    }
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            temperature: Temperature::new_unchecked(DEFAULT_TEMPERATURE),
            top_p: TopP::new_unchecked(DEFAULT_TOP_P),
            top_k: DEFAULT_TOP_K,
            thinking_budget: DEFAULT_THINKING_BUDGET,
        }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub chat_model: String,
    pub live_model: String,
    pub video_model: String,
    pub voice: String,
    pub rest_base_url: String,
    pub live_url: String,
    pub sampling: Sampling,
    pub chat_instruction: String,
    pub live_instruction: String,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub video_poll_interval: Duration,
    pub video_deadline: Duration,
}

impl Settings {
    #[must_use]
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Build settings from the environment, using defaults for everything
    /// except the API key.
    ///
    /// # Errors
    /// Returns an error if neither `GEMINI_API_KEY` nor `API_KEY` is set.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        SettingsBuilder::new().api_key_from_env().build()
    }
}

pub struct SettingsBuilder {
    api_key: Option<String>,
    chat_model: Option<String>,
    live_model: Option<String>,
    video_model: Option<String>,
    voice: Option<String>,
    rest_base_url: Option<String>,
    live_url: Option<String>,
    sampling: Sampling,
    chat_instruction: Option<String>,
    live_instruction: Option<String>,
    connect_timeout: Duration,
    video_poll_interval: Duration,
    video_deadline: Duration,
}

impl SettingsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: None,
            chat_model: None,
            live_model: None,
            video_model: None,
            voice: None,
            rest_base_url: None,
            live_url: None,
            sampling: Sampling::default(),
            chat_instruction: None,
            live_instruction: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            video_poll_interval: DEFAULT_VIDEO_POLL_INTERVAL,
            video_deadline: DEFAULT_VIDEO_DEADLINE,
        }
    }

    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read the key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    /// An explicitly set key wins over the environment.
    #[must_use]
    pub fn api_key_from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(API_KEY_ENV)
                .or_else(|_| std::env::var(API_KEY_FALLBACK_ENV))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }
        self
    }

    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn live_model(mut self, model: impl Into<String>) -> Self {
        self.live_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn video_model(mut self, model: impl Into<String>) -> Self {
        self.video_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    #[must_use]
    pub fn rest_base_url(mut self, url: impl Into<String>) -> Self {
        self.rest_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn live_url(mut self, url: impl Into<String>) -> Self {
        self.live_url = Some(url.into());
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temperature: Temperature) -> Self {
        self.sampling.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn top_p(mut self, top_p: TopP) -> Self {
        self.sampling.top_p = top_p;
        self
    }

    #[must_use]
    pub const fn top_k(mut self, top_k: u32) -> Self {
        self.sampling.top_k = top_k;
        self
    }

    #[must_use]
    pub const fn thinking_budget(mut self, budget: u32) -> Self {
        self.sampling.thinking_budget = budget;
        self
    }

    #[must_use]
    pub fn chat_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.chat_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn live_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.live_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn video_polling(mut self, interval: Duration, deadline: Duration) -> Self {
        self.video_poll_interval = interval;
        self.video_deadline = deadline;
        self
    }

    /// # Errors
    /// Returns an error if no API key was provided.
    #[allow(clippy::result_large_err)]
    pub fn build(self) -> Result<Settings> {
        let api_key = self
            .api_key
            .ok_or_else(|| Error::Config(format!("api key required (set {API_KEY_ENV})")))?;

        Ok(Settings {
            api_key,
            chat_model: self.chat_model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            live_model: self.live_model.unwrap_or_else(|| DEFAULT_LIVE_MODEL.to_string()),
            video_model: self.video_model.unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            voice: self.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            rest_base_url: self
                .rest_base_url
                .unwrap_or_else(|| DEFAULT_REST_BASE_URL.to_string()),
            live_url: self.live_url.unwrap_or_else(|| DEFAULT_LIVE_URL.to_string()),
            sampling: self.sampling,
            chat_instruction: self
                .chat_instruction
                .unwrap_or_else(|| prompts::CHAT_SYSTEM_INSTRUCTION.to_string()),
            live_instruction: self
                .live_instruction
                .unwrap_or_else(|| prompts::LIVE_SYSTEM_INSTRUCTION.to_string()),
            connect_timeout: self.connect_timeout,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            video_poll_interval: self.video_poll_interval,
            video_deadline: self.video_deadline,
        })
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_CHAT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.1-fast-generate-preview";
pub const DEFAULT_VOICE: &str = "Zephyr";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    #[default]
    Audio,
    Image,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Temperature(f32);

impl Temperature {
    /// # Errors
    /// Returns an error if `val` is outside the inclusive range [0.0, 2.0].
    pub fn new(val: f32) -> Result<Self, TemperatureError> {
        if (0.0..=2.0).contains(&val) {
            Ok(Self(val))
        } else {
            Err(TemperatureError { value: val })
        }
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn new_unchecked(val: f32) -> Self {
        Self(val)
    }

    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureError {
    pub value: f32,
}

impl std::fmt::Display for TemperatureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "temperature must be between 0.0 and 2.0, got {}", self.value)
    }
}

impl std::error::Error for TemperatureError {}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

/// Nucleus-sampling probability mass.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(transparent)]
pub struct TopP(f32);

impl TopP {
    /// # Errors
    /// Returns an error if `val` is outside the inclusive range [0.0, 1.0].
    pub fn new(val: f32) -> Result<Self, TopPError> {
        if (0.0..=1.0).contains(&val) {
            Ok(Self(val))
        } else {
            Err(TopPError { value: val })
        }
    }

    pub(crate) const fn new_unchecked(val: f32) -> Self {
        Self(val)
    }

    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopPError {
    pub value: f32,
}

impl std::fmt::Display for TopPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "top_p must be between 0.0 and 1.0, got {}", self.value)
    }
}

impl std::error::Error for TopPError {}

impl<'de> Deserialize<'de> for TopP {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f32::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bounds() {
        assert!(Temperature::new(0.3).is_ok());
        assert!(Temperature::new(2.5).is_err());
        assert!(serde_json::from_str::<Temperature>("-1.0").is_err());
    }

    #[test]
    fn top_p_bounds() {
        assert!(TopP::new(0.95).is_ok());
        assert!(TopP::new(1.2).is_err());
    }

    #[test]
    fn modality_is_uppercase_on_the_wire() {
        assert_eq!(serde_json::to_string(&Modality::Audio).unwrap(), "\"AUDIO\"");
    }
}

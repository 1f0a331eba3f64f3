use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Body of `models/{model}:predictLongRunning` for video generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateVideosRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub sample_count: u32,
    pub resolution: String,
    pub aspect_ratio: String,
}

impl Default for VideoParameters {
    fn default() -> Self {
        Self {
            sample_count: 1,
            resolution: "720p".to_string(),
            aspect_ratio: "9:16".to_string(),
        }
    }
}

/// Long-running operation handle returned by `predictLongRunning`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub response: Option<VideoOperationResponse>,
    pub error: Option<ApiError>,
    pub metadata: Option<Value>,
}

impl VideoOperation {
    /// URI of the first generated video, if the operation produced one.
    #[must_use]
    pub fn video_uri(&self) -> Option<&str> {
        self.response
            .as_ref()?
            .generate_video_response
            .as_ref()?
            .generated_samples
            .first()?
            .video
            .as_ref()?
            .uri
            .as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoOperationResponse {
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GeneratedSample {
    pub video: Option<VideoRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VideoRef {
    pub uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn video_uri_from_finished_operation() {
        let op: VideoOperation = serde_json::from_value(json!({
            "name": "models/veo/operations/abc",
            "done": true,
            "response": {
                "generateVideoResponse": {
                    "generatedSamples": [
                        { "video": { "uri": "https://example.test/v.mp4?alt=media" } }
                    ]
                }
            }
        }))
        .unwrap();

        assert_eq!(op.video_uri(), Some("https://example.test/v.mp4?alt=media"));
    }

    #[test]
    fn pending_operation_has_no_uri() {
        let op: VideoOperation =
            serde_json::from_value(json!({ "name": "models/veo/operations/abc" })).unwrap();
        assert!(!op.done);
        assert!(op.video_uri().is_none());
    }
}

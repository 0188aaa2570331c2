//! Generation job request and response shapes.
//!
//! These are the wire types consumed from the request-handling layer.
//! Every optional field carries the documented default.

use serde::{Deserialize, Serialize};

const DEFAULT_AI_MODEL: &str = "gpt3.5-turbo";
const DEFAULT_VOICE: &str = "en_us_001";
const DEFAULT_SONGS_ZIP_URL: &str =
    "https://filebin.net/2avx134kdibc4c3q/drive-download-20240209T180019Z-001.zip";

/// A request to generate one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Subject the script is generated about
    pub video_subject: String,
    /// Number of script paragraphs
    #[serde(default = "default_paragraph_number")]
    pub paragraph_number: u32,
    /// Model used for script and search term generation
    #[serde(default = "default_ai_model")]
    pub ai_model: String,
    /// Whether to mix in background music
    #[serde(default)]
    pub use_music: bool,
    /// Narration voice identifier
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Archive of songs to pick background music from
    #[serde(default = "default_zip_url")]
    pub zip_url: String,
}

fn default_paragraph_number() -> u32 {
    1
}

fn default_ai_model() -> String {
    DEFAULT_AI_MODEL.to_string()
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_zip_url() -> String {
    DEFAULT_SONGS_ZIP_URL.to_string()
}

/// Job outcome status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// The response shape every job resolves to, success or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: ResponseStatus,
    pub message: String,
    /// Final artifact locator on success, empty otherwise
    pub data: String,
}

impl GenerateResponse {
    pub fn success(message: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: message.into(),
            data: data.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
            data: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"videoSubject": "space exploration"}"#).unwrap();

        assert_eq!(req.video_subject, "space exploration");
        assert_eq!(req.paragraph_number, 1);
        assert_eq!(req.ai_model, "gpt3.5-turbo");
        assert!(!req.use_music);
        assert_eq!(req.voice, "en_us_001");
    }

    #[test]
    fn test_response_serialization() {
        let resp = GenerateResponse::success("Video generated", "output.mp4");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], "output.mp4");

        let err = GenerateResponse::error("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"], "");
    }
}

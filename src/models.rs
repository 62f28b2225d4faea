//! Data models and structures
//!
//! Defines the transient values that flow through one analysis: the
//! materialized image, its encoded payload, the request sent to the model,
//! plus the fixed per-variant constants and environment configuration.

use crate::{Error, Result};

/// Raster formats accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }

    /// Maps a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }
}

/// An encoded raster image that is known to be non-empty and decodable.
///
/// Only [`crate::image::materialize`] constructs these.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub(crate) bytes: Vec<u8>,
    pub(crate) format: ImageFormat,
    pub(crate) filename: Option<String>,
}

impl ImageInput {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// Base64 payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// How the completion text is delivered back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Streaming,
    SingleShot,
}

/// Acquisition mode of the image. Each one carries fixed model settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Upload,
    Canvas,
}

impl Variant {
    pub fn model(self) -> &'static str {
        match self {
            Variant::Upload => "gpt-4o",
            Variant::Canvas => "gpt-4o-mini",
        }
    }

    pub fn max_tokens(self) -> u32 {
        match self {
            Variant::Upload => 1200,
            Variant::Canvas => 500,
        }
    }

    pub fn default_mode(self) -> ResponseMode {
        match self {
            Variant::Upload => ResponseMode::Streaming,
            Variant::Canvas => ResponseMode::SingleShot,
        }
    }
}

/// Everything the completion client needs for one submission.
///
/// Built once per analysis and only read afterwards.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    prompt: String,
    image: EncodedImage,
    variant: Variant,
}

impl AnalysisRequest {
    pub fn new(prompt: String, image: EncodedImage, variant: Variant) -> Self {
        Self {
            prompt,
            image,
            variant,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> &EncodedImage {
        &self.image
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn model(&self) -> &'static str {
        self.variant.model()
    }

    pub fn max_tokens(&self) -> u32 {
        self.variant.max_tokens()
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
}

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

impl Config {
    pub fn from_env() -> Result<Self> {
        load_env_file(dotenvy::dotenv().map(|_| ()))?;

        Self::new(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("OPENAI_BASE_URL").ok(),
        )
    }

    /// Build a config, rejecting a base URL that is not an absolute http(s) URL.
    pub fn new(openai_api_key: Option<String>, openai_base_url: Option<String>) -> Result<Self> {
        let openai_base_url =
            openai_base_url.unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let url = reqwest::Url::parse(&openai_base_url).map_err(|e| {
            Error::Config(format!("Invalid OPENAI_BASE_URL '{}': {}", openai_base_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(Error::Config(format!(
                "OPENAI_BASE_URL must be an http(s) URL, got '{}'",
                openai_base_url
            )));
        }

        Ok(Self {
            openai_api_key: openai_api_key.filter(|key| !key.is_empty()),
            openai_base_url,
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn load_env_file(loaded: std::result::Result<(), dotenvy::Error>) -> Result<()> {
    match loaded {
        Err(e) if !e.not_found() => Err(Error::EnvVar(e)),
        _ => Ok(()),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }
}

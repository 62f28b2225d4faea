//! Input collection
//!
//! Holds what the user supplied for one analysis: where the image comes from,
//! the optional context text and the credential. Nothing is validated here
//! beyond presence; the workflow checks for absence.

use crate::models::ImageFormat;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::Path;

/// Where the picture came from.
#[derive(Clone)]
pub enum ImageSource {
    UploadedFile {
        name: String,
        bytes: Vec<u8>,
    },
    DrawnCanvas {
        width: u32,
        height: u32,
        /// Row-major RGBA pixels.
        rgba: Vec<u8>,
        stroke_width: u32,
    },
}

pub const DEFAULT_STROKE_WIDTH: u32 = 10;

impl ImageSource {
    /// Read an uploaded image from disk. Only `jpg`, `jpeg` and `png` files are accepted.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Encoding(format!("Invalid image path: {}", path.display())))?
            .to_string();

        let accepted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .is_some();
        if !accepted {
            return Err(Error::Encoding(format!(
                "Unsupported file type for {} (expected jpg, jpeg or png)",
                name
            )));
        }

        let bytes = std::fs::read(path)?;
        tracing::debug!("Read upload {} ({} bytes)", name, bytes.len());
        Ok(ImageSource::UploadedFile { name, bytes })
    }

    /// Read a raw RGBA pixel dump as a drawn canvas.
    pub fn canvas_from_raw(path: &Path, width: u32, height: u32) -> Result<Self> {
        let rgba = std::fs::read(path)?;
        Ok(ImageSource::DrawnCanvas {
            width,
            height,
            rgba,
            stroke_width: DEFAULT_STROKE_WIDTH,
        })
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            ImageSource::UploadedFile { name, .. } => Some(name),
            ImageSource::DrawnCanvas { .. } => None,
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::UploadedFile { name, bytes } => f
                .debug_struct("UploadedFile")
                .field("name", name)
                .field("len", &bytes.len())
                .finish(),
            ImageSource::DrawnCanvas {
                width,
                height,
                stroke_width,
                ..
            } => f
                .debug_struct("DrawnCanvas")
                .field("width", width)
                .field("height", height)
                .field("stroke_width", stroke_width)
                .finish(),
        }
    }
}

/// Secret used as the bearer token for outbound requests.
#[derive(Clone)]
pub struct Credential(SecretString);

impl Credential {
    /// Returns `None` for an empty key.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.is_empty() {
            None
        } else {
            Some(Self(SecretString::from(key)))
        }
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// The state of the input surface when the action is triggered.
#[derive(Debug, Clone, Default)]
pub struct InputForm {
    pub image: Option<ImageSource>,
    pub context_enabled: bool,
    pub context: String,
    pub credential: Option<Credential>,
}

impl InputForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_enabled = true;
        self.context = context.into();
        self
    }

    pub fn with_credential(mut self, key: impl Into<String>) -> Self {
        self.credential = Credential::new(key);
        self
    }

    /// Context text, only when the toggle is on and something was typed.
    pub fn optional_context(&self) -> Option<&str> {
        if self.context_enabled && !self.context.is_empty() {
            Some(&self.context)
        } else {
            None
        }
    }
}

//! Image describer - asks a hosted multimodal model what it sees in a picture
//!
//! An image is collected from an uploaded file or a drawn canvas, encoded as
//! base64, paired with a prompt and sent to an OpenAI-compatible chat
//! completion endpoint. The description is rendered back, streamed fragment
//! by fragment or in one piece.

pub mod ai;
pub mod app;
pub mod error;
pub mod image;
pub mod input;
pub mod models;
pub mod prompts;
pub mod render;

pub use error::{Error, FailureKind, Result};

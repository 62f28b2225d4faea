//! Image materialization and base64 encoding
//!
//! Turns an [`ImageSource`](crate::input::ImageSource) into a validated
//! [`ImageInput`](crate::models::ImageInput) and then into the base64 payload
//! embedded in the request. Everything happens in memory.

pub mod encoder;
pub mod mime;

pub use encoder::{decode, encode, materialize};
pub use mime::detect_image_format;

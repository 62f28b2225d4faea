pub mod client;
pub mod sse;
pub mod types;
pub mod vision;

pub use vision::OpenAiVisionClient;

pub mod openai;
pub mod provider;

pub use openai::OpenAiCompatProvider;
pub use provider::{EmbeddingModel, GenerativeModel};

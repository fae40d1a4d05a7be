//! Model provider adapters implementing [`TextGenerator`](roundtable_application::TextGenerator).

mod openai;

pub use openai::{OpenAiGenerator, ProviderError, endpoint};

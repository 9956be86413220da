//! HTTP adapters for upstream model providers and the LiteLLM gateway.

mod model_source;

pub use model_source::HttpModelSource;

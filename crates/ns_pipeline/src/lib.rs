pub mod cancel;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use orchestrator::{Pipeline, PipelineState};

pub mod prelude {
    pub use super::{CancelToken, Pipeline, PipelineState};
    pub use ns_core::{Config, Error, PipelineResult, Result, SentimentLabel, SentimentResult};
}

//! Recommendation engine: reference normalization, payload validation,
//! result caching and the Primary → Secondary orchestration chain.

pub mod cache;
pub mod normalizer;
pub mod orchestrator;
pub mod validator;

pub use cache::{cache_key, ResultCache};
pub use normalizer::normalize;
pub use orchestrator::{Orchestrator, Recommendation, Stage};
pub use validator::{ResponseValidator, ValidationError};

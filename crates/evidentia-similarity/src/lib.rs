//! # evidentia-similarity
//!
//! The default text similarity for EVIDENTIA.
//!
//! [`TokenSimilarity`] implements
//! [`SimilarityScorer`](evidentia_core::traits::SimilarityScorer) by blending
//! word overlap with a character-sequence ratio. It is deterministic, pure,
//! and symmetric.
//!
//! ```rust,ignore
//! use evidentia_similarity::TokenSimilarity;
//!
//! let scorer = TokenSimilarity::new();
//! // Pass `Box::new(scorer)` to `evidentia_core::Reconciler::new(...)`.
//! ```

pub mod engine;

pub use engine::{normalize, TokenSimilarity};

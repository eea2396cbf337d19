//! Streaming response handling
//!
//! - `reconciler`: accumulates reasoning/answer fragments and finalizes them
//!   into a committed turn
//! - `markdown`: heuristic deciding whether finished text gets a structured re-render

pub mod markdown;
pub mod reconciler;

pub use markdown::looks_like_markdown;
pub use reconciler::{Phase, StreamState};

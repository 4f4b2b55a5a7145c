//! Content moderation over the same vision model.
//!
//! Text and image inputs are screened by prompting the model for a JSON
//! verdict. Text moderation degrades to a keyword scan when the model is
//! unavailable; image moderation degrades to a conservative "needs manual
//! review" verdict instead, since there is no offline way to inspect pixels.

mod keywords;
mod moderator;
mod types;

pub use keywords::keyword_verdict;
pub use moderator::ContentModerator;
pub use types::{ContentReport, ModerationMethod, ModerationVerdict, RiskLevel};

/// Error type for moderation operations.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("No content provided")]
    NoContent,
}

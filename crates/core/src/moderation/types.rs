//! Moderation verdict types.

use serde::{Deserialize, Serialize};

/// Risk level assigned to moderated content.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModerationMethod {
    /// The model returned a usable verdict.
    LlmAnalysis,
    /// Text-only degradation: keyword scan.
    KeywordAnalysis,
    /// The model call failed; a conservative verdict was substituted.
    AnalysisFailed,
    /// Nothing to moderate.
    EmptyContent,
}

/// Verdict for a single piece of content (one text or one image).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationVerdict {
    pub is_safe: bool,
    pub risk_level: RiskLevel,
    /// Detected risk categories, e.g. ["violence", "adult"].
    pub categories: Vec<String>,
    /// Human-readable justifications.
    pub reasons: Vec<String>,
    /// Confidence in the verdict, 0.0 to 1.0.
    pub confidence: f32,
    /// Content description (image verdicts only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub method: ModerationMethod,
}

impl ModerationVerdict {
    /// Verdict for absent content: trivially safe.
    pub fn empty_content(reason: impl Into<String>) -> Self {
        Self {
            is_safe: true,
            risk_level: RiskLevel::Low,
            categories: Vec::new(),
            reasons: vec![reason.into()],
            confidence: 1.0,
            description: None,
            method: ModerationMethod::EmptyContent,
        }
    }

    /// Conservative verdict when analysis is impossible: flag for review.
    pub fn analysis_failed(reason: impl Into<String>) -> Self {
        Self {
            is_safe: false,
            risk_level: RiskLevel::Medium,
            categories: vec!["unknown".to_string()],
            reasons: vec![reason.into()],
            confidence: 0.5,
            description: None,
            method: ModerationMethod::AnalysisFailed,
        }
    }
}

/// Combined report over text and/or image content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentReport {
    pub overall_safe: bool,
    /// Highest risk level across the moderated parts.
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_moderation: Option<ModerationVerdict>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_moderation: Option<ModerationVerdict>,
    pub recommendations: Vec<String>,
}

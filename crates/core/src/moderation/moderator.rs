//! Model-backed content moderation.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::moderation::keywords::keyword_verdict;
use crate::moderation::types::{ContentReport, ModerationMethod, ModerationVerdict, RiskLevel};
use crate::moderation::ModerationError;
use crate::vision::{ImagePayload, VisionClient, VisionRequest};

const TEXT_MODERATION_SYSTEM_PROMPT: &str = r#"You are a professional content moderator. Review the user's text for inappropriate material.

Review criteria include but are not limited to:
1. Violence or gore
2. Adult or sexual content
3. Illegal activity
4. Hate speech or discrimination
5. Other content violating community guidelines

Reply in JSON with these fields:
- is_safe: boolean (true means safe)
- risk_level: string ("low", "medium", "high")
- categories: array of detected risk categories, e.g. ["violence", "adult"]
- reasons: array of concrete justifications
- confidence: number between 0 and 1

Example reply:
{
  "is_safe": false,
  "risk_level": "high",
  "categories": ["violence"],
  "reasons": ["The text describes graphic violence"],
  "confidence": 0.95
}"#;

const IMAGE_MODERATION_SYSTEM_PROMPT: &str = r#"You are a professional image content moderator. Review the image for inappropriate material.

Review criteria include but are not limited to:
1. Violence or gore: weapons, blood, fights, abuse
2. Adult content: nudity, sexual acts or innuendo
3. Illegal activity: drugs, gambling, fraud tooling
4. Hate or discrimination
5. Disturbing or shocking content

Reply in JSON with these fields:
- is_safe: boolean (true means safe)
- risk_level: string ("low", "medium", "high")
- categories: array of detected risk categories
- reasons: array of concrete justifications
- confidence: number between 0 and 1
- description: string describing the image contents, for the record

Example reply:
{
  "is_safe": false,
  "risk_level": "high",
  "categories": ["violence"],
  "reasons": ["The image shows a weapon being used"],
  "confidence": 0.95,
  "description": "A person holding a weapon"
}"#;

/// The shape the model is asked to reply with.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    is_safe: bool,
    risk_level: RiskLevel,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    description: Option<String>,
}

impl ModelVerdict {
    fn into_verdict(self) -> ModerationVerdict {
        ModerationVerdict {
            is_safe: self.is_safe,
            risk_level: self.risk_level,
            categories: self.categories,
            reasons: self.reasons,
            confidence: self.confidence,
            description: self.description,
            method: ModerationMethod::LlmAnalysis,
        }
    }
}

/// Moderates text and image content through the vision model.
pub struct ContentModerator {
    client: Arc<dyn VisionClient>,
}

impl ContentModerator {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self { client }
    }

    /// Moderate a piece of text.
    ///
    /// Degrades to the keyword scan when the model call fails or its reply
    /// is not usable JSON.
    pub async fn moderate_text(&self, text: &str) -> ModerationVerdict {
        if text.trim().is_empty() {
            return ModerationVerdict::empty_content("No text content");
        }

        let request = VisionRequest::new(format!("Review the following text:\n\n{text}"))
            .with_system(TEXT_MODERATION_SYSTEM_PROMPT)
            .with_temperature(0.1);

        match self.client.complete(request).await {
            Ok(response) => match parse_model_verdict(&response.text) {
                Some(verdict) => verdict.into_verdict(),
                None => {
                    warn!("text moderation reply was not parseable, using keyword scan");
                    keyword_verdict(text)
                }
            },
            Err(e) => {
                warn!(error = %e, "text moderation call failed, using keyword scan");
                keyword_verdict(text)
            }
        }
    }

    /// Moderate an image.
    ///
    /// There is no offline fallback for pixels: a failed call produces a
    /// conservative not-safe verdict flagged for manual review.
    pub async fn moderate_image(&self, image: ImagePayload) -> ModerationVerdict {
        let request = VisionRequest::new("Review whether this image is safe")
            .with_system(IMAGE_MODERATION_SYSTEM_PROMPT)
            .with_image(image)
            .with_temperature(0.1);

        match self.client.complete(request).await {
            Ok(response) => match parse_model_verdict(&response.text) {
                Some(verdict) => verdict.into_verdict(),
                None => {
                    warn!("image moderation reply was not parseable");
                    ModerationVerdict::analysis_failed(
                        "Image analysis reply was unusable, manual review required",
                    )
                }
            },
            Err(e) => {
                warn!(error = %e, "image moderation call failed");
                ModerationVerdict::analysis_failed(
                    "Image analysis failed, manual review required",
                )
            }
        }
    }

    /// Moderate text and/or image together and produce a combined report.
    pub async fn moderate_content(
        &self,
        text: Option<&str>,
        image: Option<ImagePayload>,
    ) -> Result<ContentReport, ModerationError> {
        if text.map_or(true, |t| t.trim().is_empty()) && image.is_none() {
            return Err(ModerationError::NoContent);
        }

        let text_moderation = match text.filter(|t| !t.trim().is_empty()) {
            Some(t) => Some(self.moderate_text(t).await),
            None => None,
        };
        let image_moderation = match image {
            Some(img) => Some(self.moderate_image(img).await),
            None => None,
        };

        let parts = [text_moderation.as_ref(), image_moderation.as_ref()];
        let overall_safe = parts.iter().flatten().all(|v| v.is_safe);
        let risk_level = parts
            .iter()
            .flatten()
            .map(|v| v.risk_level)
            .max()
            .unwrap_or_default();

        let recommendations = build_recommendations(overall_safe, &parts);

        Ok(ContentReport {
            overall_safe,
            risk_level,
            text_moderation,
            image_moderation,
            recommendations,
        })
    }
}

fn build_recommendations(
    overall_safe: bool,
    parts: &[Option<&ModerationVerdict>; 2],
) -> Vec<String> {
    if overall_safe {
        return vec!["Content approved".to_string()];
    }

    let mut recommendations = vec!["Manual review recommended".to_string()];
    let mut categories: Vec<&str> = parts
        .iter()
        .flatten()
        .flat_map(|v| v.categories.iter())
        .map(String::as_str)
        .collect();
    categories.sort_unstable();
    categories.dedup();
    if !categories.is_empty() {
        recommendations.push(format!("Flagged categories: {}", categories.join(", ")));
    }
    if parts
        .iter()
        .flatten()
        .any(|v| v.method == ModerationMethod::AnalysisFailed)
    {
        recommendations.push("Automated analysis was incomplete".to_string());
    }
    recommendations
}

/// Pull a JSON object out of a model reply.
///
/// Replies are frequently wrapped in markdown fences or surrounded by prose;
/// strip a ```json fence when present, otherwise take the span from the
/// first `{` to the last `}`.
fn parse_model_verdict(text: &str) -> Option<ModelVerdict> {
    let candidate = if let Some(fence_start) = text.find("```json") {
        let body = &text[fence_start + 7..];
        let fence_end = body.find("```")?;
        body[..fence_end].trim()
    } else {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        if end < start {
            return None;
        }
        text[start..=end].trim()
    };

    serde_json::from_str(candidate).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;
    use crate::testing::MockVisionClient;
    use crate::vision::VisionError;

    fn verdict_json(is_safe: bool, risk: &str) -> String {
        format!(
            r#"{{"is_safe": {is_safe}, "risk_level": "{risk}", "categories": ["violence"], "reasons": ["test"], "confidence": 0.9}}"#
        )
    }

    fn test_image() -> ImagePayload {
        ImagePayload::from_bytes(b"pixels", ImageFormat::Png)
    }

    #[test]
    fn test_parse_plain_json() {
        let verdict = parse_model_verdict(&verdict_json(true, "low")).unwrap();
        assert!(verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = format!(
            "Here is my assessment:\n```json\n{}\n```\nLet me know.",
            verdict_json(false, "high")
        );
        let verdict = parse_model_verdict(&text).unwrap();
        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let text = format!("Sure! {} Hope that helps.", verdict_json(true, "low"));
        assert!(parse_model_verdict(&text).is_some());
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_model_verdict("I cannot help with that").is_none());
        assert!(parse_model_verdict("```json\nnot json\n```").is_none());
        assert!(parse_model_verdict("").is_none());
    }

    #[tokio::test]
    async fn test_moderate_text_uses_model_verdict() {
        let client = Arc::new(MockVisionClient::new());
        client.push_response(verdict_json(false, "high")).await;

        let moderator = ContentModerator::new(client);
        let verdict = moderator.moderate_text("some text").await;

        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert_eq!(verdict.method, ModerationMethod::LlmAnalysis);
    }

    #[tokio::test]
    async fn test_moderate_text_empty_is_trivially_safe() {
        let client = Arc::new(MockVisionClient::new());
        let moderator = ContentModerator::new(client.clone());

        let verdict = moderator.moderate_text("   ").await;
        assert!(verdict.is_safe);
        assert_eq!(verdict.method, ModerationMethod::EmptyContent);
        assert_eq!(client.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_moderate_text_falls_back_to_keywords_on_error() {
        let client = Arc::new(MockVisionClient::new());
        client.push_error(VisionError::NotConfigured).await;

        let moderator = ContentModerator::new(client);
        let verdict = moderator.moderate_text("a scene of pure violence").await;

        assert!(!verdict.is_safe);
        assert_eq!(verdict.method, ModerationMethod::KeywordAnalysis);
        assert_eq!(verdict.categories, vec!["violence"]);
    }

    #[tokio::test]
    async fn test_moderate_text_falls_back_on_unparseable_reply() {
        let client = Arc::new(MockVisionClient::new());
        client.push_response("I would rather not say").await;

        let moderator = ContentModerator::new(client);
        let verdict = moderator.moderate_text("nice weather").await;

        assert!(verdict.is_safe);
        assert_eq!(verdict.method, ModerationMethod::KeywordAnalysis);
    }

    #[tokio::test]
    async fn test_moderate_image_conservative_on_error() {
        let client = Arc::new(MockVisionClient::new());
        client.push_error(VisionError::NotConfigured).await;

        let moderator = ContentModerator::new(client);
        let verdict = moderator.moderate_image(test_image()).await;

        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.method, ModerationMethod::AnalysisFailed);
    }

    #[tokio::test]
    async fn test_moderate_content_combines_parts() {
        let client = Arc::new(MockVisionClient::new());
        client.push_response(verdict_json(true, "low")).await;
        client.push_response(verdict_json(false, "high")).await;

        let moderator = ContentModerator::new(client);
        let report = moderator
            .moderate_content(Some("hello"), Some(test_image()))
            .await
            .unwrap();

        assert!(!report.overall_safe);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert!(report.text_moderation.is_some());
        assert!(report.image_moderation.is_some());
        assert!(report.recommendations[0].contains("Manual review"));
    }

    #[tokio::test]
    async fn test_moderate_content_text_only() {
        let client = Arc::new(MockVisionClient::new());
        client.push_response(verdict_json(true, "low")).await;

        let moderator = ContentModerator::new(client);
        let report = moderator.moderate_content(Some("hello"), None).await.unwrap();

        assert!(report.overall_safe);
        assert!(report.image_moderation.is_none());
        assert_eq!(report.recommendations, vec!["Content approved"]);
    }

    #[tokio::test]
    async fn test_moderate_content_rejects_nothing() {
        let client = Arc::new(MockVisionClient::new());
        let moderator = ContentModerator::new(client);

        let result = moderator.moderate_content(None, None).await;
        assert!(matches!(result, Err(ModerationError::NoContent)));

        let result = moderator.moderate_content(Some("  "), None).await;
        assert!(matches!(result, Err(ModerationError::NoContent)));
    }
}

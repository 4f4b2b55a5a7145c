//! Keyword-based text screening, the offline fallback for text moderation.

use super::types::{ModerationMethod, ModerationVerdict, RiskLevel};

/// Category keyword lists. In a larger deployment these would come from an
/// external list; the built-in set covers the obvious cases.
const KEYWORD_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "violence",
        &["kill", "murder", "violence", "gore", "weapon", "assault", "terror"],
    ),
    (
        "adult",
        &["porn", "explicit", "nude", "nsfw", "sexual"],
    ),
    (
        "illegal",
        &["drugs", "narcotics", "gambling", "scam", "counterfeit", "smuggling"],
    ),
    (
        "hate",
        &["racist", "bigot", "slur", "hate speech", "discrimination"],
    ),
];

/// Scan text against the keyword lists and build a verdict.
pub fn keyword_verdict(text: &str) -> ModerationVerdict {
    let text_lower = text.to_lowercase();

    let mut categories = Vec::new();
    let mut matched = Vec::new();
    for (category, keywords) in KEYWORD_CATEGORIES {
        let hits: Vec<&str> = keywords
            .iter()
            .copied()
            .filter(|kw| text_lower.contains(kw))
            .collect();
        if !hits.is_empty() {
            categories.push((*category).to_string());
            matched.extend(hits);
        }
    }

    let is_safe = categories.is_empty();
    let risk_level = if is_safe {
        RiskLevel::Low
    } else if categories.len() >= 3 {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    let reasons = if matched.is_empty() {
        Vec::new()
    } else {
        vec![format!("Matched flagged keywords: {}", matched.join(", "))]
    };

    ModerationVerdict {
        is_safe,
        risk_level,
        categories,
        reasons,
        confidence: if matched.is_empty() { 1.0 } else { 0.8 },
        description: None,
        method: ModerationMethod::KeywordAnalysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_safe() {
        let verdict = keyword_verdict("The weather is lovely today");
        assert!(verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert!(verdict.categories.is_empty());
        assert!(verdict.reasons.is_empty());
        assert_eq!(verdict.confidence, 1.0);
    }

    #[test]
    fn test_single_category_is_medium_risk() {
        let verdict = keyword_verdict("a scene full of gore and violence");
        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::Medium);
        assert_eq!(verdict.categories, vec!["violence"]);
        assert!(verdict.reasons[0].contains("gore"));
    }

    #[test]
    fn test_three_categories_is_high_risk() {
        let verdict = keyword_verdict("violence, explicit drugs and hate speech everywhere");
        assert!(!verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::High);
        assert!(verdict.categories.len() >= 3);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let verdict = keyword_verdict("GAMBLING ring exposed");
        assert!(!verdict.is_safe);
        assert_eq!(verdict.categories, vec!["illegal"]);
    }

    #[test]
    fn test_method_is_keyword_analysis() {
        let verdict = keyword_verdict("anything");
        assert_eq!(verdict.method, ModerationMethod::KeywordAnalysis);
    }
}

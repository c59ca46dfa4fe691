//! Image topic extraction
//!
//! Asks the LLM for a handful of comma-separated search keywords. Extraction
//! never fails: a provider error or an unusable reply falls back to long words
//! from the text, and a short list is padded from a generic pool.

use inference::{GenerationConfig, SharedBackend};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::constants::topics;

/// How many topics to ask for and guarantee
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicBounds {
    pub min: usize,
    pub max: usize,
}

/// What the free text describes; selects prompt wording and bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicContext {
    Website,
    Modification,
}

impl TopicContext {
    pub fn bounds(&self) -> TopicBounds {
        match self {
            TopicContext::Website => TopicBounds { min: 3, max: 5 },
            TopicContext::Modification => TopicBounds { min: 2, max: 3 },
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            TopicContext::Website => "website description",
            TopicContext::Modification => "website modification request",
        }
    }

    fn example(&self) -> &'static str {
        match self {
            TopicContext::Website => "mountains, hiking, adventure gear, camping, nature",
            TopicContext::Modification => "mountains, hiking, adventure gear",
        }
    }
}

pub struct TopicExtractor {
    backend: SharedBackend,
}

impl TopicExtractor {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    /// Extract image-search topics from `text`; always returns at least `bounds().min`
    pub async fn extract(&self, text: &str, context: TopicContext) -> Vec<String> {
        let prompt = topic_prompt(text, context);
        let config = GenerationConfig::precise(topics::TEMPERATURE, topics::MAX_OUTPUT_TOKENS);

        let reply = match self.backend.generate(&prompt, &config).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                log::warn!(
                    "Topic extraction via {} failed, using keyword fallback: {}",
                    self.backend.name(),
                    e
                );
                None
            }
        };

        let mut rng = StdRng::from_entropy();
        let topics = resolve_topics(reply.as_deref(), text, context.bounds(), &mut rng);
        log::info!("Generated image topics: {:?}", topics);
        topics
    }
}

pub fn topic_prompt(text: &str, context: TopicContext) -> String {
    let bounds = context.bounds();
    format!(
        "Based on this {subject}: \"{text}\"\n\
         \n\
         Extract {min}-{max} specific keywords that would make good search terms for relevant images.\n\
         Focus on concrete objects, scenes, or themes that would be visually represented on the website.\n\
         \n\
         Return only a comma-separated list of single words or short phrases, nothing else.\n\
         Example: \"{example}\"\n",
        subject = context.subject(),
        text = text,
        min = bounds.min,
        max = bounds.max,
        example = context.example(),
    )
}

/// Split a comma-separated reply into trimmed, non-empty topics
pub fn parse_topic_reply(reply: &str, max: usize) -> Vec<String> {
    reply
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Words longer than four characters, sampled down to `needed` without replacement
pub fn fallback_keywords<R: Rng + ?Sized>(text: &str, needed: usize, rng: &mut R) -> Vec<String> {
    let candidates: Vec<&str> = text
        .split_whitespace()
        .filter(|word| word.chars().count() > topics::MIN_KEYWORD_CHARS)
        .collect();

    if candidates.len() > needed {
        candidates
            .choose_multiple(rng, needed)
            .map(|word| word.to_string())
            .collect()
    } else {
        candidates.into_iter().map(str::to_string).collect()
    }
}

/// Top up a short list from the generic pool
///
/// Existing topics are not deduplicated against the pool.
pub fn pad_with_generic<R: Rng + ?Sized>(topic_list: &mut Vec<String>, min: usize, rng: &mut R) {
    if topic_list.len() >= min {
        return;
    }
    let shortfall = (min - topic_list.len()).min(topics::GENERIC_TOPICS.len());
    topic_list.extend(
        topics::GENERIC_TOPICS
            .choose_multiple(rng, shortfall)
            .map(|topic| topic.to_string()),
    );
}

/// Combine the LLM reply (if any) with the local fallbacks
pub fn resolve_topics<R: Rng + ?Sized>(
    reply: Option<&str>,
    text: &str,
    bounds: TopicBounds,
    rng: &mut R,
) -> Vec<String> {
    let parsed = reply
        .map(|reply| parse_topic_reply(reply, bounds.max))
        .unwrap_or_default();

    let mut topic_list = if parsed.is_empty() {
        fallback_keywords(text, bounds.min, rng)
    } else {
        parsed
    };
    pad_with_generic(&mut topic_list, bounds.min, rng);
    topic_list
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference::ScriptedBackend;
    use std::sync::Arc;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!(
            parse_topic_reply(" coffee, latte art ,, barista ,\n", 5),
            vec!["coffee", "latte art", "barista"]
        );
        assert_eq!(parse_topic_reply("a, b, c, d", 2), vec!["a", "b"]);
        assert!(parse_topic_reply(" , ", 5).is_empty());
    }

    #[test]
    fn test_fallback_keeps_long_words() {
        let words = fallback_keywords("a cozy coffee shop downtown", 3, &mut rng());
        assert_eq!(words, vec!["coffee", "downtown"]);
    }

    #[test]
    fn test_fallback_samples_without_replacement() {
        let text = "bright modern studio apartment photography portfolio";
        let words = fallback_keywords(text, 3, &mut rng());
        assert_eq!(words.len(), 3);
        let mut unique = words.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(words.iter().all(|w| text.contains(w.as_str())));
    }

    #[test]
    fn test_pad_from_generic_pool() {
        let mut list = vec!["coffee".to_string()];
        pad_with_generic(&mut list, 3, &mut rng());
        assert_eq!(list.len(), 3);
        assert_eq!(list[0], "coffee");
        assert!(list[1..]
            .iter()
            .all(|t| topics::GENERIC_TOPICS.contains(&t.as_str())));
        assert_ne!(list[1], list[2]);
    }

    #[test]
    fn test_resolve_prefers_reply() {
        let topics = resolve_topics(
            Some("beach, surf, sunset"),
            "whatever text",
            TopicContext::Website.bounds(),
            &mut rng(),
        );
        assert_eq!(topics, vec!["beach", "surf", "sunset"]);
    }

    #[test]
    fn test_resolve_without_reply_meets_minimum() {
        for context in [TopicContext::Website, TopicContext::Modification] {
            let bounds = context.bounds();
            let topics = resolve_topics(None, "tiny", bounds, &mut rng());
            assert_eq!(topics.len(), bounds.min);
        }
    }

    #[test]
    fn test_prompt_mentions_bounds() {
        let prompt = topic_prompt("a bakery", TopicContext::Modification);
        assert!(prompt.contains("\"a bakery\""));
        assert!(prompt.contains("2-3"));
        assert!(prompt.contains("modification request"));
    }

    #[tokio::test]
    async fn test_extract_uses_low_temperature_call() {
        let backend = Arc::new(ScriptedBackend::new().with_reply("bread, pastry, oven"));
        let extractor = TopicExtractor::new(backend.clone());

        let topics = extractor
            .extract("Create a bakery website", TopicContext::Website)
            .await;
        assert_eq!(topics, vec!["bread", "pastry", "oven"]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].config.temperature, 0.2);
        assert_eq!(calls[0].config.max_output_tokens, 100);
        assert!(calls[0].prompt.contains("3-5"));
    }

    #[tokio::test]
    async fn test_extract_falls_back_when_provider_fails() {
        let backend = Arc::new(ScriptedBackend::new().with_reply_error("quota exceeded"));
        let extractor = TopicExtractor::new(backend);

        let topics = extractor
            .extract("Create a business website", TopicContext::Website)
            .await;
        assert!(topics.len() >= 3);
        assert!(topics.contains(&"Create".to_string()) || topics.contains(&"business".to_string()));
    }
}

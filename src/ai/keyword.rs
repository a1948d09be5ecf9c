//! Prompt Repair via Keyword Extraction
//!
//! When the image model rejects a prompt on content-policy grounds, the
//! prompt is reduced to its most salient keyword before the single repair
//! retry. Candidates are 2-grams of the prompt with English stopwords
//! removed, ranked by cosine similarity between each candidate's embedding
//! and the full prompt's embedding.
//!
//! The stopword list and 2-gram window are English-only: every prompt on a
//! repair path has already been normalized to English by the
//! input-translation stage.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ai::backoff::PromptRepairer;
use crate::ai::provider::SharedEmbedding;
use crate::types::Result;

/// English stopwords excluded from candidate n-grams
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "if", "in", "into", "is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not",
    "now", "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "you", "your",
];

/// Repairs a rejected image prompt by reducing it to its top keyword
pub struct KeywordRepairer {
    embedding: SharedEmbedding,
}

impl KeywordRepairer {
    pub fn new(embedding: SharedEmbedding) -> Self {
        Self { embedding }
    }

    /// Lowercased word tokens of at least two characters
    fn tokenize(prompt: &str) -> Vec<String> {
        prompt
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 2)
            .map(|w| w.to_lowercase())
            .collect()
    }

    /// Candidate keywords: consecutive 2-grams over the stopword-filtered
    /// tokens, deduplicated in sorted order. Falls back to unigrams when
    /// fewer than two tokens survive the filter.
    fn candidates(prompt: &str) -> Vec<String> {
        let tokens: Vec<String> = Self::tokenize(prompt)
            .into_iter()
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
            .collect();

        let mut grams: Vec<String> = if tokens.len() >= 2 {
            tokens.windows(2).map(|w| w.join(" ")).collect()
        } else {
            tokens
        };
        grams.sort();
        grams.dedup();
        grams
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl PromptRepairer for KeywordRepairer {
    async fn repair(&self, prompt: &str) -> Result<String> {
        let candidates = Self::candidates(prompt);
        if candidates.is_empty() {
            warn!("no keyword candidates in rejected prompt, retrying unchanged");
            return Ok(prompt.to_string());
        }

        let mut inputs = Vec::with_capacity(candidates.len() + 1);
        inputs.push(prompt.to_string());
        inputs.extend(candidates.iter().cloned());

        let vectors = self.embedding.embed(&inputs).await?;
        let Some((doc, candidate_vectors)) = vectors.split_first() else {
            warn!("embedding provider returned no vectors, retrying unchanged");
            return Ok(prompt.to_string());
        };

        // Strictly-greater comparison: the first candidate of equal
        // similarity in sorted order wins.
        let mut best = 0usize;
        let mut best_score = f32::NEG_INFINITY;
        for (index, vector) in candidate_vectors.iter().enumerate() {
            let score = Self::cosine(doc, vector);
            if score > best_score {
                best = index;
                best_score = score;
            }
        }

        let keyword = &candidates[best];
        debug!(keyword = %keyword, similarity = best_score, "selected repair keyword");
        Ok(format!("\"{}\" in a drawing style of fairy tale", keyword))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderError;
    use std::sync::Arc;

    struct TableEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
    }

    #[async_trait]
    impl crate::ai::provider::EmbeddingProvider for TableEmbedder {
        async fn embed(
            &self,
            texts: &[String],
        ) -> std::result::Result<Vec<Vec<f32>>, ProviderError> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.table
                        .iter()
                        .find(|(key, _)| key == t)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| vec![0.0, 1.0])
                })
                .collect())
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    #[test]
    fn test_candidates_filter_stopwords_and_sort() {
        let candidates =
            KeywordRepairer::candidates("a brave rabbit in the enchanted forest of dreams");
        // Stopword-filtered tokens: brave rabbit enchanted forest dreams
        assert_eq!(
            candidates,
            vec![
                "brave rabbit",
                "enchanted forest",
                "forest dreams",
                "rabbit enchanted",
            ]
        );
    }

    #[test]
    fn test_candidates_fall_back_to_unigrams() {
        let candidates = KeywordRepairer::candidates("the rabbit");
        assert_eq!(candidates, vec!["rabbit"]);
    }

    #[test]
    fn test_candidates_empty_for_stopword_only_prompt() {
        assert!(KeywordRepairer::candidates("of the and").is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((KeywordRepairer::cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(KeywordRepairer::cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(KeywordRepairer::cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_repair_selects_most_similar_candidate() {
        let prompt = "a brave rabbit in the enchanted forest of dreams";
        let embedder = TableEmbedder {
            table: vec![
                (prompt, vec![1.0, 0.0]),
                ("brave rabbit", vec![0.9, 0.1]),
                ("enchanted forest", vec![0.1, 0.9]),
            ],
        };
        let repairer = KeywordRepairer::new(Arc::new(embedder));

        let repaired = repairer.repair(prompt).await.unwrap();
        assert_eq!(
            repaired,
            "\"brave rabbit\" in a drawing style of fairy tale"
        );
    }

    #[tokio::test]
    async fn test_repair_tie_breaks_on_first_sorted_candidate() {
        // Every candidate embeds to the same vector; the first in sorted
        // order must win.
        let prompt = "a brave rabbit in the enchanted forest of dreams";
        let embedder = TableEmbedder {
            table: vec![(prompt, vec![0.0, 1.0])],
        };
        let repairer = KeywordRepairer::new(Arc::new(embedder));

        let repaired = repairer.repair(prompt).await.unwrap();
        assert_eq!(
            repaired,
            "\"brave rabbit\" in a drawing style of fairy tale"
        );
    }

    #[tokio::test]
    async fn test_repair_returns_prompt_unchanged_without_candidates() {
        let embedder = TableEmbedder { table: vec![] };
        let repairer = KeywordRepairer::new(Arc::new(embedder));

        let repaired = repairer.repair("of the and").await.unwrap();
        assert_eq!(repaired, "of the and");
    }
}

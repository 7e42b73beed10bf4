//! Search-grounded generation strategy
//!
//! The non-recursive alternative to the deep engine: one generation call
//! with live retrieval enabled, parsed into learnings and sources by line
//! prefix with a bullet-list fallback. This strategy is additive and never
//! fatal to the job.

use super::prompts;
use super::types::{ResearchConfig, ResearchFindings};
use crate::llm::{GenerationRequest, TextGenerator};
use scout_core::ScoutResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Single-call grounded research.
pub struct GroundedSearchEngine {
    generator: Arc<dyn TextGenerator>,
    config: ResearchConfig,
}

impl GroundedSearchEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ResearchConfig) -> Self {
        Self { generator, config }
    }

    /// Run the grounded strategy for `query`.
    ///
    /// On any error this returns an empty result rather than propagating;
    /// the deep-research branch carries the job on its own.
    pub async fn search_with_grounding(&self, query: &str) -> ResearchFindings {
        match self.run(query).await {
            Ok(findings) => {
                info!(
                    "Grounded search produced {} learnings and {} sources",
                    findings.learnings.len(),
                    findings.visited_urls.len()
                );
                findings
            }
            Err(e) => {
                warn!("Grounded search failed, continuing without it: {}", e);
                ResearchFindings::default()
            }
        }
    }

    async fn run(&self, query: &str) -> ScoutResult<ResearchFindings> {
        let prompt = format!(
            "[WEB SEARCH REQUEST] {}\n\n\
             Using real-time web search, gather comprehensive information on this \
             topic. Focus on current evidence, concrete figures, and practical \
             detail, and attribute each learning to its source.",
            query
        );

        let generation = self
            .generator
            .generate(GenerationRequest::grounded(
                prompts::grounded_research_prompt(),
                prompt,
            ))
            .await?;

        let (mut learnings, mut sources) = parse_prefixed_lines(&generation.text);

        // Models do not always honor the LEARNING:/SOURCE: contract; when the
        // structured parse comes up short, a bullet-list parse of the same
        // text often recovers more. Keep whichever yields more items.
        if learnings.len() < self.config.min_grounded_learnings {
            let fallback = parse_bullet_lines(&generation.text);
            if fallback.len() > learnings.len() {
                warn!(
                    "Prefixed parse found only {} learnings, using bullet fallback ({})",
                    learnings.len(),
                    fallback.len()
                );
                learnings = fallback;
            }
        }

        // Merge structured citations from the provider, deduplicating by URL.
        for source in &generation.sources {
            if !sources.contains(&source.url) {
                sources.push(source.url.clone());
            }
        }

        Ok(ResearchFindings::new(learnings, sources))
    }
}

/// Collect `LEARNING:` lines as learnings and `SOURCE:` lines as sources,
/// stripping the prefixes. Sources are deduplicated preserving first-seen
/// order.
fn parse_prefixed_lines(text: &str) -> (Vec<String>, Vec<String>) {
    let mut learnings = Vec::new();
    let mut sources: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("LEARNING:") {
            let rest = rest.trim();
            if !rest.is_empty() {
                learnings.push(rest.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("SOURCE:") {
            let rest = rest.trim();
            if !rest.is_empty() && !sources.iter().any(|s| s == rest) {
                sources.push(rest.to_string());
            }
        }
    }

    (learnings, sources)
}

/// Best-effort alternative parse: bullet or numbered list items.
fn parse_bullet_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line
                .strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| line.strip_prefix("• "))
                .or_else(|| strip_numbered_prefix(line))?;
            let rest = rest.trim();
            (!rest.is_empty()).then(|| rest.to_string())
        })
        .collect()
}

/// Strip a leading "1. " / "12) " style marker, if present.
fn strip_numbered_prefix(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixed_learning_and_source_lines() {
        let text = "LEARNING: Rust 1.0 shipped in May 2015.\n\
                    SOURCE: https://blog.rust-lang.org/2015/05/15/Rust-1.0.html\n\
                    some interstitial prose\n\
                    LEARNING: The borrow checker enforces aliasing rules.\n\
                    SOURCE: https://doc.rust-lang.org/book/\n\
                    SOURCE: https://doc.rust-lang.org/book/";

        let (learnings, sources) = parse_prefixed_lines(text);
        assert_eq!(learnings.len(), 2);
        assert_eq!(learnings[0], "Rust 1.0 shipped in May 2015.");
        // duplicate source collapsed, order preserved
        assert_eq!(
            sources,
            vec![
                "https://blog.rust-lang.org/2015/05/15/Rust-1.0.html",
                "https://doc.rust-lang.org/book/"
            ]
        );
    }

    #[test]
    fn parses_bullets_and_numbered_items() {
        let text = "Intro line\n- first\n* second\n• third\n1. fourth\n12) fifth\nplain line";
        let items = parse_bullet_lines(text);
        assert_eq!(items, vec!["first", "second", "third", "fourth", "fifth"]);
    }

    #[test]
    fn ignores_empty_prefixed_lines() {
        let (learnings, sources) = parse_prefixed_lines("LEARNING:\nSOURCE:   \n");
        assert!(learnings.is_empty());
        assert!(sources.is_empty());
    }
}

//! Final report synthesis
//!
//! One generation call over the merged learnings and sources, followed by a
//! post-processing pass that guarantees the report carries a sources
//! section.

use super::prompts;
use crate::llm::{GenerationRequest, TextGenerator};
use regex::Regex;
use scout_core::ScoutResult;
use std::sync::Arc;
use std::sync::LazyLock;
use tracing::info;

/// Matches a markdown heading announcing a sources/references section.
static SOURCES_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^#{1,6}[^\r\n]*\b(sources|references|citations|bibliography|works\s+cited)\b")
        .expect("sources heading pattern is valid")
});

/// Synthesizes merged research into a cited long-form report.
pub struct ReportSynthesizer {
    generator: Arc<dyn TextGenerator>,
}

impl ReportSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Produce the final markdown report for `prompt` from the merged
    /// learnings and sources. The returned text always contains a sources
    /// section: the model's own if it wrote one, an appended `## Sources`
    /// otherwise.
    pub async fn synthesize(
        &self,
        prompt: &str,
        learnings: &[String],
        sources: &[String],
    ) -> ScoutResult<String> {
        info!(
            "Synthesizing report from {} learnings and {} sources",
            learnings.len(),
            sources.len()
        );

        let formatted_learnings = learnings
            .iter()
            .map(|l| format!("<learning>\n{}\n</learning>", l))
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = format!(
            "Given the following prompt from the user, write a final report on the \
             topic using the learnings from research. Make it detailed: aim for 3 or \
             more pages, and include ALL the learnings. Cite sources inline as \
             [Source N] referring to the numbered source list.\n\n\
             <prompt>{}</prompt>\n\n\
             Here are all the learnings from research:\n\n\
             <learnings>\n{}\n</learnings>\n\n\
             SOURCES:\n{}",
            prompt,
            formatted_learnings,
            numbered_sources(sources)
        );

        let generation = self
            .generator
            .generate(GenerationRequest::new(prompts::synthesis_prompt(), user_prompt))
            .await?;

        Ok(ensure_sources_section(generation.text, sources))
    }
}

fn numbered_sources(sources: &[String]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, url)| format!("{}. {}", i + 1, url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append a `## Sources` section listing every URL unless the report
/// already contains a sources/references heading.
pub fn ensure_sources_section(report: String, sources: &[String]) -> String {
    if SOURCES_HEADING.is_match(&report) {
        return report;
    }

    let mut out = report;
    out.push_str("\n\n## Sources\n\n");
    for (i, url) in sources.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, url));
    }
    out
}

/// Remove a model-written sources section (and everything after its
/// heading) so a structured one can be appended in its place.
pub fn strip_sources_section(report: &str) -> String {
    match SOURCES_HEADING.find(report) {
        Some(found) => report[..found.start()].trim_end().to_string(),
        None => report.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn appends_sources_when_heading_missing() {
        let sources = urls(&["https://a.example", "https://b.example"]);
        let report = ensure_sources_section("# Report\n\nBody text.".to_string(), &sources);

        assert!(report.contains("## Sources"));
        assert!(report.contains("1. https://a.example"));
        assert!(report.contains("2. https://b.example"));
    }

    #[test]
    fn keeps_model_written_references_section() {
        let original = "# Report\n\nBody.\n\n## References\n\n1. https://a.example\n";
        let report = ensure_sources_section(original.to_string(), &urls(&["https://b.example"]));

        assert_eq!(report, original);
        assert!(!report.contains("https://b.example"));
    }

    #[test]
    fn heading_match_is_case_insensitive_and_level_agnostic() {
        for heading in ["# SOURCES", "### Works Cited", "## Bibliography", "#### citations"] {
            let text = format!("body\n\n{}\n\n1. x", heading);
            assert!(
                SOURCES_HEADING.is_match(&text),
                "expected match for {heading}"
            );
        }
    }

    #[test]
    fn plain_mentions_of_sources_do_not_count_as_headings() {
        let text = "The sources for this claim are unclear.";
        assert!(!SOURCES_HEADING.is_match(text));

        let report = ensure_sources_section(text.to_string(), &urls(&["https://a.example"]));
        assert!(report.contains("## Sources"));
    }

    #[test]
    fn strips_model_sources_section_from_the_heading_on() {
        let text = "# Report\n\nBody.\n\n## Sources\n\n1. https://stale.example\n";
        let stripped = strip_sources_section(text);
        assert_eq!(stripped, "# Report\n\nBody.");
    }

    #[test]
    fn strip_is_a_no_op_without_a_heading() {
        let text = "# Report\n\nBody.";
        assert_eq!(strip_sources_section(text), text);
    }
}

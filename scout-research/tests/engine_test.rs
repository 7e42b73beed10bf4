//! Tests for the recursive research engine and its supporting components

use async_trait::async_trait;
use scout_core::{ScoutError, ScoutResult};
use scout_research::{
    Clarifier, DeepResearchEngine, Generation, GenerationRequest, QueryPlanner, ResearchConfig,
    SearchProvider, SearchRecord, TextGenerator,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Generator driven by a scripted response function.
struct ScriptedGenerator {
    script: Box<dyn Fn(&GenerationRequest) -> ScoutResult<Generation> + Send + Sync>,
    planner_calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn new(
        script: impl Fn(&GenerationRequest) -> ScoutResult<Generation> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            planner_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> ScoutResult<Generation> {
        if is_planner_prompt(&request) {
            self.planner_calls.fetch_add(1, Ordering::SeqCst);
        }
        (self.script)(&request)
    }
}

fn is_planner_prompt(request: &GenerationRequest) -> bool {
    request.prompt.contains("web search queries")
}

fn is_summarizer_prompt(request: &GenerationRequest) -> bool {
    request.prompt.contains("generate a list of learnings")
}

fn text(body: &str) -> ScoutResult<Generation> {
    Ok(Generation {
        text: body.to_string(),
        sources: Vec::new(),
    })
}

/// A generator that always plans one query and always summarizes one
/// learning with one follow-up question.
fn steady_generator() -> Arc<ScriptedGenerator> {
    ScriptedGenerator::new(|request| {
        if is_planner_prompt(request) {
            text(
                r#"{"queries": [
                    {"query": "spaced repetition retention studies", "research_goal": "find effect sizes"},
                    {"query": "spacing effect meta analysis", "research_goal": "find reviews"}
                ]}"#,
            )
        } else if is_summarizer_prompt(request) {
            text(
                r#"{"learnings": ["Spacing improves retention."],
                    "follow_up_questions": ["Which intervals work best?"]}"#,
            )
        } else {
            text("unused")
        }
    })
}

/// Search double returning a fixed set of pages.
struct FixedSearch {
    calls: AtomicUsize,
}

impl FixedSearch {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchProvider for FixedSearch {
    async fn search(&self, query: &str, limit: usize) -> ScoutResult<Vec<SearchRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(limit > 0);
        Ok(vec![
            SearchRecord {
                url: format!("https://example.com/{}/{}", call, query.len()),
                markdown: "Some extracted page text.".to_string(),
            },
            SearchRecord {
                url: format!("https://example.org/{}", call),
                markdown: String::new(),
            },
        ])
    }
}

/// Search double that always fails.
struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str, _limit: usize) -> ScoutResult<Vec<SearchRecord>> {
        Err(ScoutError::search("no browser", "test"))
    }
}

fn engine(
    generator: Arc<ScriptedGenerator>,
    search: Arc<dyn SearchProvider>,
) -> DeepResearchEngine {
    DeepResearchEngine::new(generator, search, ResearchConfig::default())
}

#[tokio::test]
async fn recursion_terminates_within_depth_levels() {
    for depth in 1..=5 {
        for breadth in 1..=5 {
            let generator = steady_generator();
            let search = FixedSearch::new();
            let engine = engine(generator.clone(), search.clone());

            let findings = engine
                .research("topic".to_string(), breadth, depth, Vec::new(), Vec::new())
                .await
                .unwrap();

            // One recursion level per planner call, capped by the depth budget.
            let levels = generator.planner_calls.load(Ordering::SeqCst);
            assert_eq!(levels, depth, "breadth={breadth} depth={depth}");
            assert_eq!(findings.learnings.len(), depth);
        }
    }
}

#[tokio::test]
async fn accumulation_is_monotonic_across_levels() {
    let generator = steady_generator();
    let search = FixedSearch::new();
    let engine = engine(generator, search);

    let seed_learnings = vec!["prior learning".to_string()];
    let seed_urls = vec!["https://seed.example".to_string()];

    let findings = engine
        .research(
            "topic".to_string(),
            2,
            3,
            seed_learnings.clone(),
            seed_urls.clone(),
        )
        .await
        .unwrap();

    // Whatever was passed in is still there, in order, with new entries after.
    assert_eq!(findings.learnings[0], seed_learnings[0]);
    assert_eq!(findings.visited_urls[0], seed_urls[0]);
    assert!(findings.learnings.len() > seed_learnings.len());
    assert!(findings.visited_urls.len() > seed_urls.len());
}

#[tokio::test]
async fn search_failure_discards_the_branch_state() {
    let generator = steady_generator();
    let engine = engine(generator, Arc::new(FailingSearch));

    let findings = engine
        .research(
            "topic".to_string(),
            3,
            3,
            vec!["already learned".to_string()],
            vec!["https://seen.example".to_string()],
        )
        .await
        .unwrap();

    // Fail-fast semantics: the failed branch returns nothing, not what it
    // had accumulated so far.
    assert!(findings.learnings.is_empty());
    assert!(findings.visited_urls.is_empty());
}

#[tokio::test]
async fn planner_failure_ends_the_branch_with_accumulated_state() {
    let generator = ScriptedGenerator::new(|request| {
        if is_planner_prompt(request) {
            Err(ScoutError::generation("schema mismatch", "test"))
        } else {
            text("unused")
        }
    });
    let search = FixedSearch::new();
    let engine = engine(generator, search.clone());

    let findings = engine
        .research(
            "topic".to_string(),
            2,
            2,
            vec!["kept".to_string()],
            vec!["https://kept.example".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(findings.learnings, vec!["kept".to_string()]);
    assert_eq!(findings.visited_urls, vec!["https://kept.example".to_string()]);
    // The branch never searched.
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn summarizer_failure_yields_zero_learnings_but_keeps_urls() {
    let generator = ScriptedGenerator::new(|request| {
        if is_planner_prompt(request) {
            text(r#"{"queries": [{"query": "q", "research_goal": "g"}]}"#)
        } else if is_summarizer_prompt(request) {
            Err(ScoutError::generation("timeout", "test"))
        } else {
            text("unused")
        }
    });
    let search = FixedSearch::new();
    let engine = engine(generator, search);

    let findings = engine
        .research("topic".to_string(), 2, 1, Vec::new(), Vec::new())
        .await
        .unwrap();

    assert!(findings.learnings.is_empty());
    assert_eq!(findings.visited_urls.len(), 2);
}

#[tokio::test]
async fn planner_output_is_bounded_by_max_queries() {
    // The model ignores the cap and returns six queries.
    let generator = ScriptedGenerator::new(|_| {
        text(
            r#"{"queries": [
                {"query": "a", "research_goal": "g"},
                {"query": "b", "research_goal": "g"},
                {"query": "c", "research_goal": "g"},
                {"query": "d", "research_goal": "g"},
                {"query": "e", "research_goal": "g"},
                {"query": "f", "research_goal": "g"}
            ]}"#,
        )
    });
    let planner = QueryPlanner::new(generator);

    for max_queries in 0..=5 {
        let queries = planner
            .generate_queries("topic", &[], max_queries)
            .await
            .unwrap();
        assert!(queries.len() <= max_queries, "max_queries={max_queries}");
    }
}

#[tokio::test]
async fn clarifier_caps_the_question_count() {
    // The model returns eight questions; the cap is five.
    let generator = ScriptedGenerator::new(|_| {
        text(r#"{"questions": ["q1", "q2", "q3", "q4", "q5", "q6", "q7", "q8"]}"#)
    });
    let clarifier = Clarifier::new(generator, 5);

    let questions = clarifier.clarify("the economics of desalination").await.unwrap();
    assert_eq!(questions.len(), 5);
    assert_eq!(questions[0], "q1");
}

#[tokio::test]
async fn planner_passes_prior_learnings_into_the_prompt() {
    let generator = ScriptedGenerator::new(|request| {
        assert!(request.prompt.contains("the half-life of knowledge"));
        text(r#"{"queries": []}"#)
    });
    let planner = QueryPlanner::new(generator);

    let queries = planner
        .generate_queries(
            "topic",
            &["the half-life of knowledge".to_string()],
            3,
        )
        .await
        .unwrap();
    assert!(queries.is_empty());
}

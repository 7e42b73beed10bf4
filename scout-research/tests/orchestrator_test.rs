//! End-to-end orchestrator scenarios against in-memory doubles

use async_trait::async_trait;
use scout_core::{JobStatus, ResearchJob, ScoutError, ScoutResult, DEFAULT_USER};
use scout_research::{
    Generation, GenerationRequest, JobOrchestrator, JobStore, ResearchConfig, SearchProvider,
    SearchRecord, SearchSessionFactory, SourceRef, TextGenerator,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

// ---------------------------------------------------------------------------
// Doubles
// ---------------------------------------------------------------------------

struct ScriptedGenerator {
    script: Box<dyn Fn(&GenerationRequest) -> ScoutResult<Generation> + Send + Sync>,
}

impl ScriptedGenerator {
    fn new(
        script: impl Fn(&GenerationRequest) -> ScoutResult<Generation> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
        })
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> ScoutResult<Generation> {
        (self.script)(&request)
    }
}

fn text(body: &str) -> ScoutResult<Generation> {
    Ok(Generation {
        text: body.to_string(),
        sources: Vec::new(),
    })
}

/// In-memory job store enforcing the single terminal transition.
struct MemoryJobStore {
    jobs: Mutex<HashMap<String, (JobStatus, Option<String>)>>,
    terminal_writes: AtomicUsize,
}

impl MemoryJobStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            jobs: Mutex::new(HashMap::new()),
            terminal_writes: AtomicUsize::new(0),
        })
    }

    async fn insert(&self, job: &ResearchJob) {
        self.jobs
            .lock()
            .await
            .insert(job.id.clone(), (JobStatus::Running, None));
    }

    async fn get(&self, id: &str) -> Option<(JobStatus, Option<String>)> {
        self.jobs.lock().await.get(id).cloned()
    }

    async fn transition(&self, id: &str, status: JobStatus, result: &str) -> ScoutResult<()> {
        let mut jobs = self.jobs.lock().await;
        match jobs.get_mut(id) {
            Some(entry) if entry.0 == JobStatus::Running => {
                *entry = (status, Some(result.to_string()));
                self.terminal_writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(ScoutError::storage("job already finalized", "test")),
            None => Err(ScoutError::not_found(id.to_string(), "test")),
        }
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn mark_complete(&self, id: &str, result: &str) -> ScoutResult<()> {
        self.transition(id, JobStatus::Complete, result).await
    }

    async fn mark_error(&self, id: &str, result: &str) -> ScoutResult<()> {
        self.transition(id, JobStatus::Error, result).await
    }
}

struct FixedSearch;

#[async_trait]
impl SearchProvider for FixedSearch {
    async fn search(&self, _query: &str, _limit: usize) -> ScoutResult<Vec<SearchRecord>> {
        Ok(vec![SearchRecord {
            url: "https://crawled.example/page".to_string(),
            markdown: "Extracted text.".to_string(),
        }])
    }
}

/// Counts how many browser sessions jobs acquire.
struct CountingFactory {
    acquires: AtomicUsize,
}

impl CountingFactory {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            acquires: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchSessionFactory for CountingFactory {
    async fn acquire(&self) -> ScoutResult<Arc<dyn SearchProvider>> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FixedSearch))
    }
}

/// A generator that services the whole dual-strategy pipeline.
fn full_pipeline_generator() -> Arc<ScriptedGenerator> {
    ScriptedGenerator::new(|request| {
        if request.search_grounding {
            text(
                "LEARNING: Distributed practice beats massed practice.\n\
                 SOURCE: https://grounded.example/spacing\n\
                 LEARNING: Effect sizes are largest for long retention intervals.\n\
                 SOURCE: https://grounded.example/intervals",
            )
        } else if request.prompt.contains("web search queries") {
            text(r#"{"queries": [{"query": "spaced repetition evidence", "research_goal": "find studies"}]}"#)
        } else if request.prompt.contains("generate a list of learnings") {
            text(
                r#"{"learnings": ["Reviews spaced over weeks double retention."],
                    "follow_up_questions": ["What schedule is optimal?"]}"#,
            )
        } else if request.prompt.contains("final report") {
            // No sources heading: post-processing must append one.
            text("# Spaced Repetition\n\nA detailed report body citing [Source 1].")
        } else {
            Err(ScoutError::generation("unexpected prompt in test", "test"))
        }
    })
}

fn orchestrator(
    generator: Arc<ScriptedGenerator>,
    factory: Arc<CountingFactory>,
    store: Arc<MemoryJobStore>,
) -> JobOrchestrator {
    JobOrchestrator::new(generator, factory, store, ResearchConfig::default())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dual_strategy_job_completes_with_sources_section() {
    let store = MemoryJobStore::new();
    let factory = CountingFactory::new();
    let orchestrator = orchestrator(full_pipeline_generator(), factory.clone(), store.clone());

    let job = ResearchJob::new(
        DEFAULT_USER.to_string(),
        "benefits of spaced repetition".to_string(),
        2,
        2,
        vec![],
        false,
    );
    store.insert(&job).await;

    orchestrator.run(&job).await.unwrap();

    let (status, result) = store.get(&job.id).await.unwrap();
    assert_eq!(status, JobStatus::Complete);
    let result = result.unwrap();
    assert!(!result.is_empty());
    assert!(result.contains("## Sources"));
    // URLs from both strategies survive into the appended sources list.
    assert!(result.contains("https://crawled.example/page"));
    assert!(result.contains("https://grounded.example/spacing"));
    // Exactly one terminal write, and the deep branch took one browser session.
    assert_eq!(store.terminal_writes.load(Ordering::SeqCst), 1);
    assert_eq!(factory.acquires.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_generator_persists_error_report_then_propagates() {
    let store = MemoryJobStore::new();
    let factory = CountingFactory::new();
    let generator =
        ScriptedGenerator::new(|_| Err(ScoutError::generation("model unavailable", "test")));
    let orchestrator = orchestrator(generator, factory, store.clone());

    let job = ResearchJob::new(
        DEFAULT_USER.to_string(),
        "anything".to_string(),
        2,
        2,
        vec![],
        false,
    );
    store.insert(&job).await;

    let outcome = orchestrator.run(&job).await;
    assert!(outcome.is_err());

    let (status, result) = store.get(&job.id).await.unwrap();
    assert_eq!(status, JobStatus::Error);
    let result = result.unwrap();
    assert!(result.contains("Error"));
    assert!(result.contains("model unavailable"));
    assert_eq!(store.terminal_writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn direct_search_skips_the_deep_engine_and_uses_structured_sources() {
    let store = MemoryJobStore::new();
    let factory = CountingFactory::new();

    let generator = ScriptedGenerator::new(|request| {
        assert!(request.search_grounding, "direct flow must request grounding");
        Ok(Generation {
            text: "# Inflation Today\n\nReport body.\n\n\
                   ## Sources\n\n1. https://model-invented.example\n"
                .to_string(),
            sources: vec![
                SourceRef {
                    url: "https://bls.example/cpi".to_string(),
                    title: Some("CPI release".to_string()),
                },
                SourceRef {
                    url: "https://fed.example/rates".to_string(),
                    title: None,
                },
                SourceRef {
                    url: "https://bls.example/cpi".to_string(),
                    title: None,
                },
            ],
        })
    });
    let orchestrator = orchestrator(generator, factory.clone(), store.clone());

    let job = ResearchJob::new(
        DEFAULT_USER.to_string(),
        "current inflation rate".to_string(),
        2,
        2,
        vec![],
        true,
    );
    store.insert(&job).await;

    orchestrator.run(&job).await.unwrap();

    // No browser session was ever acquired: the deep engine never ran.
    assert_eq!(factory.acquires.load(Ordering::SeqCst), 0);

    let (status, result) = store.get(&job.id).await.unwrap();
    assert_eq!(status, JobStatus::Complete);
    let result = result.unwrap();
    // The model's own sources section is replaced by the structured list,
    // deduplicated by URL.
    assert!(!result.contains("https://model-invented.example"));
    assert!(result.contains("1. https://bls.example/cpi"));
    assert!(result.contains("2. https://fed.example/rates"));
}

#[tokio::test]
async fn direct_search_without_structured_sources_lists_the_query() {
    let store = MemoryJobStore::new();
    let factory = CountingFactory::new();

    let generator =
        ScriptedGenerator::new(|_| text("# Report\n\nBody with no sources heading."));
    let orchestrator = orchestrator(generator, factory, store.clone());

    let job = ResearchJob::new(
        DEFAULT_USER.to_string(),
        "current inflation rate".to_string(),
        2,
        2,
        vec![],
        true,
    );
    store.insert(&job).await;

    orchestrator.run(&job).await.unwrap();

    let (_, result) = store.get(&job.id).await.unwrap();
    let result = result.unwrap();
    assert!(result.contains("## Sources"));
    assert!(result.contains("Search queries used"));
    assert!(result.contains("1. current inflation rate"));
}

#[tokio::test]
async fn grounded_strategy_failure_does_not_fail_the_job() {
    let store = MemoryJobStore::new();
    let factory = CountingFactory::new();

    let generator = ScriptedGenerator::new(|request| {
        if request.search_grounding {
            Err(ScoutError::generation("grounding offline", "test"))
        } else if request.prompt.contains("web search queries") {
            text(r#"{"queries": [{"query": "q", "research_goal": "g"}]}"#)
        } else if request.prompt.contains("generate a list of learnings") {
            text(r#"{"learnings": ["a learning"], "follow_up_questions": []}"#)
        } else if request.prompt.contains("final report") {
            text("# Report\n\nBody.")
        } else {
            Err(ScoutError::generation("unexpected prompt in test", "test"))
        }
    });
    let orchestrator = orchestrator(generator, factory, store.clone());

    let job = ResearchJob::new(
        DEFAULT_USER.to_string(),
        "resilience".to_string(),
        1,
        1,
        vec![],
        false,
    );
    store.insert(&job).await;

    orchestrator.run(&job).await.unwrap();

    let (status, result) = store.get(&job.id).await.unwrap();
    assert_eq!(status, JobStatus::Complete);
    assert!(result.unwrap().contains("## Sources"));
}

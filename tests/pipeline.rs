//! End-to-end pipeline tests with mocked providers
//!
//! Exercises the full offline build path (catalog CSV -> corpus -> chunks ->
//! persisted index) and the online query path (engine -> retrieval -> prompt
//! -> model) without any network access.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anirec::data::{CatalogNormalizer, ChunkConfig, OverlappingChunker};
use anirec::embedding::{Embedder, Embedding, EmbeddingConfig, TokenEmbedder};
use anirec::error::{Error, ErrorKind};
use anirec::index::VectorIndex;
use anirec::rag::{LanguageModel, Recommender, RecommenderConfig};
use anirec::retrieval::{IndexRetriever, Retriever};

const RAW_CATALOG: &str = "\
MAL_ID,Name,Genres,sypnopsis
1,School Comedy A,\"Comedy, School\",A lighthearted school comedy about a hopeless club and its cheerful members.
2,Mecha B,\"Action, Mecha\",Giant robots clash over the fate of a ruined colony world.
3,Romance C,\"Romance, Drama\",Two strangers in the city slowly fall in love across the seasons.
4,Broken Row,,This row is missing its genres and must be dropped.
";

/// Language model that counts calls and echoes a canned reply.
struct RecordingModel {
    reply: String,
    calls: AtomicUsize,
    last_prompt: std::sync::Mutex<String>,
}

impl RecordingModel {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(String::new()),
        }
    }
}

impl LanguageModel for RecordingModel {
    fn complete(&self, prompt: &str) -> anirec::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "recording-model"
    }
}

/// Embedder wrapper that counts every embed call.
struct CountingEmbedder {
    inner: TokenEmbedder,
    calls: AtomicUsize,
}

impl CountingEmbedder {
    fn new(dimension: usize) -> Self {
        Self {
            inner: TokenEmbedder::new(EmbeddingConfig::default(), dimension),
            calls: AtomicUsize::new(0),
        }
    }
}

impl Embedder for CountingEmbedder {
    fn embed(&self, text: &str) -> anirec::Result<Embedding> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> anirec::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build a persisted index from the seeded catalog; returns the index dir.
fn build_index(root: &Path, embedder: &Arc<dyn Embedder>) -> std::path::PathBuf {
    let raw = root.join("raw.csv");
    fs::write(&raw, RAW_CATALOG).unwrap();
    let corpus = root.join("corpus.csv");
    let index_dir = root.join("index");

    let documents = CatalogNormalizer::new(&raw, &corpus).normalize().unwrap();
    assert_eq!(documents.len(), 3, "incomplete row must be dropped");

    let chunker = OverlappingChunker::new(ChunkConfig::default()).unwrap();
    let chunks = chunker.chunk_all(&documents).unwrap();
    // Every fused document here fits one window
    assert_eq!(chunks.len(), 3);

    VectorIndex::build(chunks, embedder, &index_dir).unwrap();
    index_dir
}

#[test]
fn school_comedy_query_retrieves_the_comedy() {
    let dir = tempfile::tempdir().unwrap();
    let embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));
    let index_dir = build_index(dir.path(), &embedder);

    let index = VectorIndex::load(&index_dir, &embedder).unwrap();
    let retriever = IndexRetriever::new(Arc::new(index), embedder);

    let results = retriever
        .retrieve("I want a lighthearted school comedy", 1)
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].chunk.text.contains("School Comedy A"));
}

#[test]
fn recommend_flows_context_into_prompt_and_passes_answer_through() {
    let dir = tempfile::tempdir().unwrap();
    let embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));
    let index_dir = build_index(dir.path(), &embedder);

    let reply = "1. School Comedy A\nsummary\nwhy\n2. Other\n...\n3. Another\n...";
    let model = Arc::new(RecordingModel::new(reply));

    let recommender = Recommender::open(
        &index_dir,
        embedder,
        model.clone(),
        RecommenderConfig::default().with_top_k(2),
    )
    .unwrap();

    let answer = recommender
        .recommend("I want a lighthearted school comedy")
        .unwrap();

    assert_eq!(answer, reply);
    assert_eq!(model.calls.load(Ordering::SeqCst), 1);

    let prompt = model.last_prompt.lock().unwrap().clone();
    assert!(prompt.contains("expert anime recommender"));
    assert!(prompt.contains("School Comedy A"));
    assert!(prompt.contains("I want a lighthearted school comedy"));
}

#[test]
fn blank_queries_fail_before_any_provider_call() {
    let dir = tempfile::tempdir().unwrap();

    let build_embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));
    let index_dir = build_index(dir.path(), &build_embedder);

    let counting = Arc::new(CountingEmbedder::new(256));
    let embedder: Arc<dyn Embedder> = counting.clone();
    let model = Arc::new(RecordingModel::new("unused"));

    let recommender = Recommender::open(
        &index_dir,
        embedder,
        model.clone(),
        RecommenderConfig::default(),
    )
    .unwrap();

    for query in ["", "   "] {
        let err = recommender.recommend(query).unwrap_err();
        assert!(matches!(err, Error::InvalidQuery));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn rebuild_at_same_location_yields_identical_results() {
    let dir = tempfile::tempdir().unwrap();
    let embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));

    let index_dir = build_index(dir.path(), &embedder);
    let first = VectorIndex::load(&index_dir, &embedder).unwrap();
    let query = embedder.embed("slow romance in the city").unwrap();
    let first_hits = first.search(&query, 3);

    // Run the whole build again against the same location
    build_index(dir.path(), &embedder);
    let second = VectorIndex::load(&index_dir, &embedder).unwrap();
    let second_hits = second.search(&query, 3);

    assert_eq!(first.len(), second.len());
    let first_ids: Vec<_> = first_hits.iter().map(|h| h.chunk.id.clone()).collect();
    let second_ids: Vec<_> = second_hits.iter().map(|h| h.chunk.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn engine_open_wraps_missing_index_as_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));
    let model = Arc::new(RecordingModel::new("unused"));

    let err = Recommender::open(
        &dir.path().join("missing"),
        embedder,
        model,
        RecommenderConfig::default(),
    )
    .err()
    .unwrap();

    assert!(matches!(err, Error::Initialization(_)));
    assert_eq!(err.kind(), ErrorKind::Infrastructure);
}

#[test]
fn engine_is_shareable_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let embedder: Arc<dyn Embedder> =
        Arc::new(TokenEmbedder::new(EmbeddingConfig::default(), 256));
    let index_dir = build_index(dir.path(), &embedder);

    let model = Arc::new(RecordingModel::new("1. A\n2. B\n3. C"));
    let recommender = Arc::new(
        Recommender::open(&index_dir, embedder, model, RecommenderConfig::default()).unwrap(),
    );

    let handles: Vec<_> = ["school comedy", "mecha battles", "city romance"]
        .into_iter()
        .map(|query| {
            let recommender = recommender.clone();
            std::thread::spawn(move || recommender.recommend(query).unwrap())
        })
        .collect();

    for handle in handles {
        let answer = handle.join().unwrap();
        assert!(!answer.is_empty());
    }
}

//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use docvec::config::{EngineSettings, DEFAULT_CONTAINER_IMAGE};
use docvec::domain::entities::collection::CollectionHandle;
use docvec::domain::entities::document::{DocumentBatch, DocumentRecords};
use docvec::domain::entities::query_result::RawQueryResponse;
use docvec::domain::error::DomainError;
use docvec::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use docvec::domain::ports::process_runner::{CommandOutput, CommandRunner, ProcessHandle};
use docvec::domain::ports::vector_engine::VectorEngine;
use docvec::domain::values::launch_strategy::{HealthPolicy, LaunchStrategy};
use docvec::domain::values::metadata::Metadata;
use docvec::infrastructure::memory::engine::MemoryEngine;
use docvec::DocVec;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DIM: usize = 16;

/// Words that land on the same dimension, so related texts end up close.
const CONCEPTS: &[&[&str]] = &[
    &["apple", "pie", "dessert", "desserts", "recipe", "recipes", "cake", "baking", "sweet"],
    &["rocket", "engine", "design", "launch", "orbit", "thrust"],
    &["weather", "rain", "forecast", "sunny", "storm"],
];

fn fnv(word: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in word.bytes() {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash as usize
}

/// Deterministic bag-of-concepts embedder.
#[derive(Default)]
pub struct KeywordEmbedder {
    pub calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; DIM];
        let lower = text.to_lowercase();
        for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let slot = match CONCEPTS.iter().position(|c| c.contains(&word)) {
                Some(i) => i,
                None => CONCEPTS.len() + fnv(word) % (DIM - CONCEPTS.len()),
            };
            v[slot] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Fails every call the way an upstream outage would.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        Err(DomainError::Embedding("upstream returned 503".into()))
    }

    fn dimension(&self) -> usize {
        DIM
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Wraps [`MemoryEngine`] and counts every engine call, heartbeats included.
pub struct CountingEngine {
    pub inner: Arc<MemoryEngine>,
    pub calls: AtomicUsize,
}

impl CountingEngine {
    pub fn new(inner: Arc<MemoryEngine>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn tick(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl VectorEngine for CountingEngine {
    async fn heartbeat(&self) -> Result<(), DomainError> {
        self.tick();
        self.inner.heartbeat().await
    }

    async fn get_or_create_collection(&self, name: &str, metadata: &Metadata) -> Result<CollectionHandle, DomainError> {
        self.tick();
        self.inner.get_or_create_collection(name, metadata).await
    }

    async fn add(&self, collection: &CollectionHandle, records: DocumentRecords) -> Result<(), DomainError> {
        self.tick();
        self.inner.add(collection, records).await
    }

    async fn get(&self, collection: &CollectionHandle, ids: Option<&[String]>) -> Result<DocumentBatch, DomainError> {
        self.tick();
        self.inner.get(collection, ids).await
    }

    async fn delete(&self, collection: &CollectionHandle, ids: &[String]) -> Result<(), DomainError> {
        self.tick();
        self.inner.delete(collection, ids).await
    }

    async fn query(
        &self,
        collection: &CollectionHandle,
        query_embeddings: &[Vec<f32>],
        n_results: usize,
        filter: Option<&serde_json::Value>,
    ) -> Result<RawQueryResponse, DomainError> {
        self.tick();
        self.inner.query(collection, query_embeddings, n_results, filter).await
    }

    async fn count(&self, collection: &CollectionHandle) -> Result<usize, DomainError> {
        self.tick();
        self.inner.count(collection).await
    }

    fn endpoint(&self) -> String {
        self.inner.endpoint()
    }
}

type Script = dyn Fn(&str, &[String]) -> Result<CommandOutput, String> + Send + Sync;

/// Scripted command runner that records every invocation.
pub struct FakeRunner {
    script: Box<Script>,
    on_spawn: Box<dyn Fn() + Send + Sync>,
    calls: Mutex<Vec<String>>,
    pub spawned: AtomicUsize,
    pub terminated: Arc<AtomicUsize>,
}

impl FakeRunner {
    pub fn new(script: impl Fn(&str, &[String]) -> Result<CommandOutput, String> + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            on_spawn: Box::new(|| {}),
            calls: Mutex::new(Vec::new()),
            spawned: AtomicUsize::new(0),
            terminated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Nothing is installed: every command fails to start.
    pub fn nothing_installed() -> Self {
        Self::new(|program, _| Err(format!("{program}: command not found")))
    }

    pub fn on_spawn(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_spawn = Box::new(f);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spawned(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }

    fn record(&self, line: String) {
        self.calls.lock().unwrap().push(line);
    }
}

pub fn ok(stdout: &str) -> Result<CommandOutput, String> {
    Ok(CommandOutput {
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub fn failed(stderr: &str) -> Result<CommandOutput, String> {
    Ok(CommandOutput {
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

struct FakeProcess {
    pid: u32,
    terminated: Arc<AtomicUsize>,
}

#[async_trait]
impl ProcessHandle for FakeProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn terminate(&mut self) -> Result<(), String> {
        self.terminated.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, String> {
        self.record(format!("{program} {}", args.join(" ")));
        (self.script)(program, args)
    }

    async fn spawn(&self, program: &str, args: &[String]) -> Result<Box<dyn ProcessHandle>, String> {
        self.record(format!("spawn {program} {}", args.join(" ")));
        let n = self.spawned.fetch_add(1, Ordering::SeqCst);
        (self.on_spawn)();
        Ok(Box::new(FakeProcess {
            pid: 4000 + n as u32,
            terminated: self.terminated.clone(),
        }))
    }
}

pub fn fast_health() -> HealthPolicy {
    HealthPolicy {
        interval: Duration::from_millis(10),
        attempts: 3,
    }
}

pub fn settings(data_dir: &Path, strategies: Vec<LaunchStrategy>) -> EngineSettings {
    EngineSettings {
        url: "memory://".into(),
        port: 8000,
        data_dir: data_dir.to_path_buf(),
        strategies,
        health: fast_health(),
    }
}

pub fn container_strategy() -> LaunchStrategy {
    LaunchStrategy::Container {
        runtime: "docker".into(),
        name: "chromadb".into(),
        image: DEFAULT_CONTAINER_IMAGE.into(),
    }
}

pub struct Harness {
    pub dv: DocVec,
    pub engine: Arc<MemoryEngine>,
    pub embedder: Arc<KeywordEmbedder>,
    pub _data: tempfile::TempDir,
}

/// A store over a healthy in-process engine with no launch strategies.
pub fn setup() -> Harness {
    let data = tempfile::tempdir().unwrap();
    let engine = Arc::new(MemoryEngine::new());
    let embedder = Arc::new(KeywordEmbedder::default());
    let dv = DocVec::with_providers(
        "documents",
        settings(&data.path().join("chroma_data"), vec![]),
        engine.clone(),
        Arc::new(FakeRunner::nothing_installed()),
        embedder.clone(),
    );
    Harness {
        dv,
        engine,
        embedder,
        _data: data,
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

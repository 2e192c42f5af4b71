use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::pipeline::run_source;
use super::types::{IngestionError, Summary};
use crate::config::ReplayConfig;
use crate::console::{AsyncConsole, ConsoleWriter};
use crate::record::ReplayRecord;
use crate::sink::EventSink;

/// One registered replay, driven to completion by the [`Orchestrator`].
#[async_trait]
pub trait ReplayRunner: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        config: Arc<ReplayConfig>,
        console: ConsoleWriter,
        cancel: CancellationToken,
    ) -> Result<Summary, IngestionError>;
}

/// Replays an ordered list of source files of one record type through one
/// sink, sequentially, folding the per-file summaries.
struct ReplayRun<R> {
    paths: Vec<PathBuf>,
    sink: Arc<dyn EventSink>,
    seed: u64,
    _record: PhantomData<fn() -> R>,
}

#[async_trait]
impl<R> ReplayRunner for ReplayRun<R>
where
    R: ReplayRecord + Send + Sync,
{
    fn name(&self) -> &str {
        R::NAME
    }

    async fn run(
        &self,
        config: Arc<ReplayConfig>,
        console: ConsoleWriter,
        cancel: CancellationToken,
    ) -> Result<Summary, IngestionError> {
        let mut total = Summary::default();
        for path in &self.paths {
            // The generator is re-seeded per file with the run seed.
            let summary = run_source::<R, dyn EventSink>(
                path,
                self.sink.as_ref(),
                self.seed,
                &console,
                &cancel,
                &config,
            )
            .await?;
            total.absorb(summary);
            if total.cancelled {
                break;
            }
        }
        Ok(total)
    }
}

/// Result of one settled replay run.
pub struct RunOutcome {
    pub name: String,
    pub result: Result<Summary, IngestionError>,
}

impl RunOutcome {
    pub fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Runs all registered replays concurrently under one cancellation token and
/// awaits them plus the console flush.
///
/// A run's fatal error never cancels its siblings; every run settles before
/// `run_all` returns.
pub struct Orchestrator {
    runners: Vec<Arc<dyn ReplayRunner>>,
    config: Arc<ReplayConfig>,
}

impl Orchestrator {
    pub fn new(config: Arc<ReplayConfig>) -> Self {
        Orchestrator {
            runners: Vec::new(),
            config,
        }
    }

    /// Registers a replay of `paths` (in order) through `sink`, with its own
    /// throttle generator seed.
    pub fn add_replay<R>(&mut self, paths: Vec<PathBuf>, sink: Arc<dyn EventSink>, seed: u64)
    where
        R: ReplayRecord + Send + Sync + 'static,
    {
        self.runners.push(Arc::new(ReplayRun::<R> {
            paths,
            sink,
            seed,
            _record: PhantomData,
        }));
    }

    /// Registers a custom runner directly.
    pub fn add_runner(&mut self, runner: Arc<dyn ReplayRunner>) {
        self.runners.push(runner);
    }

    pub async fn run_all(&self, cancel: &CancellationToken) -> Vec<RunOutcome> {
        if let Some(run_for) = self.config.run_for {
            let deadline_cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = sleep(run_for) => deadline_cancel.cancel(),
                    _ = deadline_cancel.cancelled() => {}
                }
            });
        }

        let console = AsyncConsole::new(cancel.clone());

        let mut handles = Vec::with_capacity(self.runners.len());
        for runner in &self.runners {
            let runner = Arc::clone(runner);
            let config = Arc::clone(&self.config);
            let console = console.writer();
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let name = runner.name().to_string();
                let result = runner.run(config, console, cancel).await;
                RunOutcome { name, result }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => outcomes.push(RunOutcome {
                    name: "unknown".to_string(),
                    result: Err(IngestionError::TaskFailed(e.to_string())),
                }),
            }
        }

        // All runs have settled; wait for the backlog to hit the console.
        console.done().await;

        outcomes
    }
}

//! One analysis request from first byte to terminal snapshot.
//!
//! A session owns its state exclusively: a single spawned task runs the
//! read loop, mutates the accumulator, and publishes [`AnalysisState`]
//! snapshots over a broadcast channel. Observers only ever see immutable
//! clones, in publication order, with the terminal snapshot last.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::{AbortHandle, JoinHandle};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::accumulator::LineAccumulator;
use crate::model::{AnalyzeRequest, IdeaBatch, Language};
use crate::traits::{AnalysisError, IdeaSource};

/// Wall-clock budget for one session.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(45);

const SNAPSHOT_CAPACITY: usize = 64;

/// What the presentation layer sees at any instant.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalysisState {
    Idle,
    InProgress(IdeaBatch),
    Completed(IdeaBatch),
    /// Terminal failure. The partially-accumulated batch stays visible;
    /// a partial result plus an error message is a valid end state.
    Failed {
        error: AnalysisError,
        batch: IdeaBatch,
    },
}

impl AnalysisState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AnalysisState::Completed(_) | AnalysisState::Failed { .. }
        )
    }

    /// The batch carried by this snapshot, if any.
    pub fn batch(&self) -> Option<&IdeaBatch> {
        match self {
            AnalysisState::Idle => None,
            AnalysisState::InProgress(batch) => Some(batch),
            AnalysisState::Completed(batch) => Some(batch),
            AnalysisState::Failed { batch, .. } => Some(batch),
        }
    }
}

/// Starts sessions against a fixed [`IdeaSource`], cancelling the
/// previous one so at most one read loop is ever live per analyzer.
pub struct Analyzer {
    source: Arc<dyn IdeaSource>,
    budget: Duration,
    live: Mutex<Option<AbortHandle>>,
}

impl Analyzer {
    pub fn new(source: Arc<dyn IdeaSource>) -> Self {
        Self {
            source,
            budget: DEFAULT_BUDGET,
            live: Mutex::new(None),
        }
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Begin analysing `image_url` for `user_id`.
    ///
    /// Any session previously started by this analyzer is aborted first,
    /// releasing its connection; snapshots from two sessions never reach
    /// the same subscriber because each session has its own channel.
    pub fn start(
        &self,
        user_id: impl Into<String>,
        image_url: impl Into<String>,
        language: Language,
    ) -> StreamSession {
        if let Some(previous) = self.live.lock().unwrap().take() {
            debug!("aborting previous analysis session");
            previous.abort();
        }
        let request = AnalyzeRequest::new(user_id, image_url, language);
        let (events, _) = broadcast::channel(SNAPSHOT_CAPACITY);
        let latest = Arc::new(Mutex::new(AnalysisState::Idle));
        let publisher = Publisher {
            events: events.clone(),
            latest: latest.clone(),
        };
        let source = self.source.clone();
        let budget = self.budget;
        let task = tokio::spawn(async move {
            run_session(source, request, budget, publisher).await;
        });
        *self.live.lock().unwrap() = Some(task.abort_handle());
        StreamSession {
            events,
            latest,
            task,
        }
    }
}

/// Handle to one in-flight (or finished) analysis.
pub struct StreamSession {
    events: broadcast::Sender<AnalysisState>,
    latest: Arc<Mutex<AnalysisState>>,
    task: JoinHandle<()>,
}

impl StreamSession {
    /// Subscribe to snapshots, oldest-first. A later snapshot is never
    /// delivered before an earlier one; the terminal snapshot is last.
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisState> {
        self.events.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> AnalysisState {
        self.latest.lock().unwrap().clone()
    }

    /// Stop consuming the response stream. Nothing further is published.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Publisher {
    events: broadcast::Sender<AnalysisState>,
    latest: Arc<Mutex<AnalysisState>>,
}

impl Publisher {
    fn publish(&self, state: AnalysisState) {
        *self.latest.lock().unwrap() = state.clone();
        // No subscribers is fine; the latest slot still advances.
        let _ = self.events.send(state);
    }
}

async fn run_session(
    source: Arc<dyn IdeaSource>,
    request: AnalyzeRequest,
    budget: Duration,
    publisher: Publisher,
) {
    let mut accumulator = LineAccumulator::new();
    let outcome = tokio::time::timeout(
        budget,
        read_loop(source, &request, &mut accumulator, &publisher),
    )
    .await;
    let state = match outcome {
        Ok(Ok(batch)) => {
            info!(ideas = batch.len(), "analysis completed");
            AnalysisState::Completed(batch)
        }
        Ok(Err(error)) => {
            warn!(%error, "analysis failed");
            AnalysisState::Failed {
                error,
                batch: accumulator.batch().clone(),
            }
        }
        Err(_) => {
            warn!(?budget, "analysis timed out");
            AnalysisState::Failed {
                error: AnalysisError::Timeout(budget),
                batch: accumulator.batch().clone(),
            }
        }
    };
    publisher.publish(state);
}

async fn read_loop(
    source: Arc<dyn IdeaSource>,
    request: &AnalyzeRequest,
    accumulator: &mut LineAccumulator,
    publisher: &Publisher,
) -> Result<IdeaBatch, AnalysisError> {
    let mut stream = source.analyze(request).await?;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for batch in accumulator.push(&chunk) {
            debug!(ideas = batch.len(), "snapshot");
            publisher.publish(AnalysisState::InProgress(batch));
        }
    }
    accumulator.finish();
    if !accumulator.produced_any() {
        return Err(AnalysisError::EmptyResult);
    }
    Ok(accumulator.batch().clone())
}

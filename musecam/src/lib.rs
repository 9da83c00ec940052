//! Terminal host for the MuseCam pipeline.
//!
//! Wires capture, upload, and analysis together behind the view model and
//! renders snapshots to stdout as they arrive. All the interesting
//! behavior lives in the library crates; this one is glue.

use anyhow::bail;
use capture::ImageSource;
use ideas::{AnalysisState, Analyzer, Language};
use tokio::sync::broadcast;
use tracing::warn;
use upload::ObjectStore;
use viewmodel::{Input, Phase, UiBus, UiEvent, ViewModel};

pub struct App {
    vm: ViewModel,
    store: ObjectStore,
    analyzer: Analyzer,
    bus: UiBus,
    user_id: String,
}

impl App {
    pub fn new(store: ObjectStore, analyzer: Analyzer, user_id: String, language: Language) -> Self {
        Self {
            vm: ViewModel::new(language),
            store,
            analyzer,
            bus: UiBus::default(),
            user_id,
        }
    }

    pub fn bus(&self) -> &UiBus {
        &self.bus
    }

    pub fn view(&self) -> &ViewModel {
        &self.vm
    }

    /// True when a retry can reuse an already-uploaded image.
    pub fn can_retry(&self) -> bool {
        self.vm.image_url().is_some()
    }

    fn advance(&mut self, input: Input) {
        self.vm.apply(input);
        self.bus.send(UiEvent::PhaseChanged {
            phase: self.vm.phase().name().into(),
        });
    }

    /// One full capture → upload → analyze pass.
    pub async fn run_once(&mut self, source: &dyn ImageSource) -> anyhow::Result<()> {
        self.advance(Input::StartCapture);
        let image = match source.acquire().await {
            Ok(image) => image,
            Err(err) => {
                self.advance(Input::CaptureFailed(err.to_string()));
                bail!("capture failed: {err}");
            }
        };
        self.advance(Input::ImageAcquired);

        let url = match self.store.upload(&image).await {
            Ok(url) => upload::scaled_delivery_url(&url),
            Err(err) => {
                self.advance(Input::UploadFailed(err.to_string()));
                bail!("upload failed: {err}");
            }
        };
        self.bus.send(UiEvent::UploadFinished { url: url.clone() });
        self.advance(Input::Uploaded(url.clone()));

        self.analyze(url).await
    }

    /// Re-run analysis against the cached image URL, skipping re-upload.
    pub async fn retry(&mut self) -> anyhow::Result<()> {
        let Some(url) = self.vm.image_url().map(str::to_string) else {
            bail!("nothing to retry: no uploaded image");
        };
        self.advance(Input::Retry);
        self.analyze(url).await
    }

    async fn analyze(&mut self, url: String) -> anyhow::Result<()> {
        let session = self.analyzer.start(&self.user_id, &url, self.vm.language());
        let mut events = session.subscribe();
        let mut printed = 0;
        loop {
            match events.recv().await {
                Ok(state) => {
                    let terminal = state.is_terminal();
                    printed = print_new_ideas(&state, printed);
                    if let Some(batch) = state.batch() {
                        self.bus.send(UiEvent::IdeasUpdated { count: batch.len() });
                    }
                    self.advance(Input::Analysis(state));
                    if terminal {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "snapshot consumer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        if let Phase::Results {
            error: Some(message),
            ideas,
        } = self.vm.phase()
        {
            let message = message.clone();
            self.bus.send(UiEvent::AnalysisFailed {
                message: message.clone(),
            });
            println!(
                "\nanalysis failed after {} idea(s): {message}",
                ideas.len()
            );
            println!("retry keeps the uploaded photo; retake starts over");
            bail!("{message}");
        }
        Ok(())
    }
}

/// Print any ideas past `already`, returning the new count.
fn print_new_ideas(state: &AnalysisState, already: usize) -> usize {
    let Some(batch) = state.batch() else {
        return already;
    };
    for (index, idea) in batch.iter().enumerate().skip(already) {
        println!("\n#{} {}", index + 1, idea.marketing);
        println!("   source:    {}", idea.source);
        println!("   strategy:  {}", idea.strategy);
        println!("   potential: {}", idea.market_potential);
        println!("   audience:  {}", idea.target_audience);
    }
    batch.len().max(already)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideas::{Idea, IdeaBatch};

    #[test]
    fn print_counter_only_moves_forward() {
        let idea = Idea {
            source: "s".into(),
            strategy: "st".into(),
            marketing: "m".into(),
            market_potential: "p".into(),
            target_audience: "a".into(),
        };
        let one = AnalysisState::InProgress(IdeaBatch::from_ideas(vec![idea.clone()]));
        let two = AnalysisState::InProgress(IdeaBatch::from_ideas(vec![idea.clone(), idea]));
        assert_eq!(print_new_ideas(&one, 0), 1);
        assert_eq!(print_new_ideas(&two, 1), 2);
        // A replay of an older snapshot never rewinds the counter.
        assert_eq!(print_new_ideas(&one, 2), 2);
    }
}

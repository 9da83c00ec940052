//! Incremental assembly of idea batches from raw response chunks.
//!
//! The endpoint may answer with one complete JSON document or with a
//! sequence of newline-separated, progressively longer partial documents,
//! each resending the full cumulative object. [`LineAccumulator`] hides
//! the difference: feed it chunks as they arrive and it yields a fresh
//! [`IdeaBatch`] whenever the set of fully populated ideas changes.

use serde::Deserialize;
use tracing::debug;

use crate::model::{Idea, IdeaBatch, MAX_IDEAS};

/// Wire shape of one response line. Lines without an `ideas` array are
/// ignored, matching the endpoint's keep-alive and status lines.
#[derive(Debug, Deserialize)]
struct Envelope {
    ideas: Option<Vec<PartialIdea>>,
}

/// An idea mid-generation. Any field may still be absent.
#[derive(Debug, Default, Deserialize)]
struct PartialIdea {
    #[serde(default)]
    source: String,
    #[serde(default)]
    strategy: String,
    #[serde(default)]
    marketing: String,
    #[serde(default)]
    market_potential: String,
    #[serde(default)]
    target_audience: String,
}

impl PartialIdea {
    /// Trimmed [`Idea`], or `None` while any field is still blank.
    fn into_renderable(self) -> Option<Idea> {
        let idea = Idea {
            source: self.source.trim().to_string(),
            strategy: self.strategy.trim().to_string(),
            marketing: self.marketing.trim().to_string(),
            market_potential: self.market_potential.trim().to_string(),
            target_audience: self.target_audience.trim().to_string(),
        };
        idea.is_renderable().then_some(idea)
    }
}

/// Append-only buffer that turns byte chunks into idea batches.
///
/// Buffering happens at the byte level and lines are decoded whole, so a
/// chunk boundary may fall anywhere, including inside a multi-byte
/// character, without changing the outcome.
#[derive(Default)]
pub struct LineAccumulator {
    buffer: Vec<u8>,
    batch: IdeaBatch,
    produced_any: bool,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current best-known batch.
    pub fn batch(&self) -> &IdeaBatch {
        &self.batch
    }

    /// True once any line has yielded at least one renderable idea.
    pub fn produced_any(&self) -> bool {
        self.produced_any
    }

    /// Feed one chunk; returns each distinct batch produced by the
    /// complete lines inside it, oldest first.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<IdeaBatch> {
        self.buffer.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(batch) = self.apply_line(&line) {
                out.push(batch);
            }
        }
        out
    }

    /// Flush the trailing segment at end-of-input.
    ///
    /// A single-document response carries no trailing newline, so the tail
    /// is a candidate line too.
    pub fn finish(&mut self) -> Option<IdeaBatch> {
        let tail = std::mem::take(&mut self.buffer);
        self.apply_line(&tail)
    }

    fn apply_line(&mut self, raw: &[u8]) -> Option<IdeaBatch> {
        let line = match std::str::from_utf8(raw) {
            Ok(text) => text.trim(),
            Err(err) => {
                debug!(%err, "skipping non-UTF-8 line");
                return None;
            }
        };
        if line.is_empty() {
            return None;
        }
        let envelope: Envelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(err) => {
                // Truncated lines are expected mid-stream; more bytes will
                // bring a complete resend.
                debug!(%err, "skipping unparseable line");
                return None;
            }
        };
        let renderable: Vec<Idea> = envelope
            .ideas?
            .into_iter()
            .filter_map(PartialIdea::into_renderable)
            .take(MAX_IDEAS)
            .collect();
        let next = IdeaBatch::from_ideas(renderable);
        if !next.is_empty() {
            self.produced_any = true;
        }
        if next == self.batch {
            return None;
        }
        self.batch = next.clone();
        Some(next)
    }
}

//! Best-effort emotion and sentiment labelling of diary text.
//!
//! [`EmotionAnalyzer::analyze`] never returns an error: every failure of the
//! remote model collapses into an [`Analysis`] that still carries usable
//! labels, so diary writes are never blocked on enrichment.

pub mod gemini;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

pub const UNKNOWN: &str = "Unknown";
pub const NEUTRAL: &str = "Neutral";

/// Single-shot text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `Ok(None)` means the call succeeded but produced no text.
    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub emotion: String,
    pub sentiment: String,
}

impl Labels {
    pub fn new(emotion: impl Into<String>, sentiment: impl Into<String>) -> Self {
        Self {
            emotion: emotion.into(),
            sentiment: sentiment.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    NotConfigured,
    CallFailed,
    TimedOut,
    Unparseable,
}

/// Outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Analysis {
    Classified(Labels),
    /// The model answered with nothing usable.
    Empty,
    Degraded(DegradeReason),
}

impl Analysis {
    pub fn labels(self) -> Labels {
        match self {
            Analysis::Classified(labels) => labels,
            Analysis::Empty => Labels::new(NEUTRAL, NEUTRAL),
            Analysis::Degraded(_) => Labels::new(UNKNOWN, NEUTRAL),
        }
    }
}

#[derive(Clone)]
pub struct EmotionAnalyzer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl EmotionAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            generator: Some(generator),
            timeout,
        }
    }

    /// Analyzer with no remote model; every call degrades immediately.
    pub fn disabled() -> Self {
        Self {
            generator: None,
            timeout: Duration::ZERO,
        }
    }

    #[instrument(skip_all, fields(len = text.len()))]
    pub async fn analyze(&self, text: &str) -> Analysis {
        let Some(generator) = &self.generator else {
            debug!("no analyzer key configured; skipping enrichment");
            return Analysis::Degraded(DegradeReason::NotConfigured);
        };

        let prompt = build_prompt(text);
        let reply = match tokio::time::timeout(self.timeout, generator.generate(&prompt)).await {
            Err(_) => {
                warn!(timeout = ?self.timeout, "emotion analysis timed out");
                return Analysis::Degraded(DegradeReason::TimedOut);
            }
            Ok(Err(e)) => {
                warn!(error = %e, "emotion analysis call failed");
                return Analysis::Degraded(DegradeReason::CallFailed);
            }
            Ok(Ok(reply)) => reply,
        };

        let Some(reply) = reply.filter(|r| !r.trim().is_empty()) else {
            debug!("analyzer returned no content; defaulting to neutral");
            return Analysis::Empty;
        };

        match serde_json::from_str::<Labels>(strip_code_fence(&reply)) {
            Ok(labels) => Analysis::Classified(labels),
            Err(e) => {
                warn!(error = %e, raw = %reply, "could not parse analyzer reply");
                Analysis::Degraded(DegradeReason::Unparseable)
            }
        }
    }
}

fn build_prompt(text: &str) -> String {
    format!(
        "Analyze the following text for its dominant emotion and overall sentiment (positive, negative, neutral).\n\
         Return the result in a JSON object with 'emotion' and 'sentiment' keys.\n\
         Example: {{\"emotion\": \"joy\", \"sentiment\": \"positive\"}}\n\
         Text: \"{text}\""
    )
}

/// Removes a surrounding markdown code fence, optionally tagged `json`.
fn strip_code_fence(reply: &str) -> &str {
    let mut s = reply.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    s = s.trim();
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim();
    }
    s
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted generator for tests; counts calls.
    pub struct FakeGenerator {
        reply: Result<Option<String>, String>,
        delay: Duration,
        pub calls: AtomicUsize,
    }

    impl FakeGenerator {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(Some(text.to_string())),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn empty() -> Self {
            Self {
                reply: Ok(None),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing(msg: &str) -> Self {
            Self {
                reply: Err(msg.to_string()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }
}

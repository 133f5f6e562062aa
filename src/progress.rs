//! Progress-callback trait for chain-stage events.
//!
//! Inject an [`Arc<dyn ChainProgressCallback>`] via
//! [`crate::config::ChainConfigBuilder::progress_callback`] to receive
//! events as the chain moves through its stages. A full chain run is up to
//! five sequential round-trips, so a caller-visible "what is it doing now"
//! signal matters more here than in a single-call API.
//!
//! # Example
//!
//! ```rust
//! use edgequake_flashcards::{ChainConfig, ChainProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct StageLogger;
//!
//! impl ChainProgressCallback for StageLogger {
//!     fn on_stage_start(&self, stage: Stage) {
//!         eprintln!("→ {stage}");
//!     }
//! }
//!
//! let config = ChainConfig::builder()
//!     .progress_callback(Arc::new(StageLogger) as Arc<dyn ChainProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::config::Difficulty;
use crate::output::Stage;
use std::sync::Arc;

/// Called by the orchestrator as it runs each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: one callback
/// may be shared by several concurrent requests.
pub trait ChainProgressCallback: Send + Sync {
    /// Called once, after the minimum-text guard passes.
    fn on_chain_start(&self, difficulty: &Difficulty) {
        let _ = difficulty;
    }

    /// Called just before the completion for `stage` is requested.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes.
    ///
    /// # Arguments
    /// * `stage`     : the stage that finished
    /// * `output_len`: character count of the raw completion text
    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        let _ = (stage, output_len);
    }

    /// Called when a stage fails, before any fallback decision.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called when the chain gives up and switches to the one-shot path.
    fn on_fallback(&self, reason: &str) {
        let _ = reason;
    }

    /// Called once with the number of cards being returned.
    fn on_chain_complete(&self, card_count: usize) {
        let _ = card_count;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ChainProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ChainConfig`].
pub type ProgressCallback = Arc<dyn ChainProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ChainProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage}"));
        }

        fn on_fallback(&self, reason: &str) {
            self.events.lock().unwrap().push(format!("fallback:{reason}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_chain_start(&Difficulty::Easy);
        cb.on_stage_start(Stage::Analyze);
        cb.on_stage_complete(Stage::Analyze, 120);
        cb.on_stage_error(Stage::Generate, "bad json");
        cb.on_fallback("bad json");
        cb.on_chain_complete(6);
    }

    #[test]
    fn overridden_methods_receive_events() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Plan);
        rec.on_stage_complete(Stage::Plan, 10);
        rec.on_fallback("timeout");
        let events = rec.events.lock().unwrap();
        assert_eq!(*events, vec!["start:plan", "fallback:timeout"]);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::Evaluate);
        cb.on_chain_complete(0);
    }
}

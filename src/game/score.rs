//! # Score Keeper
//!
//! Current score plus the persisted high-score watermark.
//!
//! Persistence is fire-and-forget: the stored scalar is loaded once at
//! construction and written through whenever the watermark advances. A
//! failing store degrades to a zero baseline instead of failing the
//! session.

use crate::hooks::ScoreStore;

/// Tracks the running score and its persisted high-score watermark.
#[derive(Debug)]
pub struct ScoreKeeper<T: ScoreStore> {
    prefix: String,
    score: f32,
    high_score: f32,
    store: T,
}

impl<T: ScoreStore> ScoreKeeper<T> {
    /// Creates a keeper, loading the stored watermark for `prefix`.
    pub fn new(prefix: &str, store: T) -> Self {
        let high_score = match store.load(prefix) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("high score load failed for {prefix:?}, starting from 0: {err}");
                0.0
            }
        };
        Self {
            prefix: prefix.to_string(),
            score: 0.0,
            high_score,
            store,
        }
    }

    /// Adds `amount` to the score; a zero amount is a pure display
    /// refresh. Returns true when the high-score watermark advanced.
    pub fn increment(&mut self, amount: f32) -> bool {
        self.score += amount;
        if self.score > self.high_score {
            self.high_score = self.score;
            if let Err(err) = self.store.save(&self.prefix, self.high_score) {
                log::warn!("high score save failed for {}: {err}", self.prefix);
            }
            true
        } else {
            false
        }
    }

    /// The current session score.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// The high-score watermark, persisted across sessions.
    pub fn high_score(&self) -> f32 {
        self.high_score
    }

    /// The underlying store.
    pub fn store(&self) -> &T {
        &self.store
    }
}

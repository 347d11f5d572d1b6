//! Artificial delay policy for the reply protocol
//!
//! Everything here is a constant or a pure computation; the store schedules
//! the actual timers.

use std::time::Duration;

/// Delay before the assistant's reply is appended.
pub const COMPOSING_DELAY: Duration = Duration::from_secs(3);

/// Delay from the reply append to the `Delivered` receipt.
pub const DELIVERED_DELAY: Duration = Duration::from_secs(1);

/// Further delay from `Delivered` to the `Read` receipt.
pub const READ_DELAY: Duration = Duration::from_secs(1);

/// Minimum composing delay for the reading-speed variant.
const COMPOSING_FLOOR: Duration = Duration::from_millis(1500);

/// Reading speed assumed by the reading-speed variant.
const READING_WORDS_PER_MINUTE: u32 = 250;

/// Rough characters-per-word estimate for sizing an utterance.
const CHARS_PER_WORD: f64 = 5.0;

/// How the composing delay is computed.
#[derive(Debug, Clone, Copy)]
pub enum ComposingDelay {
    /// Constant delay regardless of content length.
    Fixed(Duration),
    /// Scale with the utterance length at a reading speed, never below the
    /// floor. The assistant "reads" the user's message before typing.
    WordsPerMinute { wpm: u32, floor: Duration },
}

/// Delays driving the reply protocol.
#[derive(Debug, Clone, Copy)]
pub struct TimingPolicy {
    pub composing: ComposingDelay,
    pub delivered: Duration,
    pub read: Duration,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            composing: ComposingDelay::Fixed(COMPOSING_DELAY),
            delivered: DELIVERED_DELAY,
            read: READ_DELAY,
        }
    }
}

impl TimingPolicy {
    /// Variant that scales the composing delay with utterance length.
    pub fn reading_speed() -> Self {
        Self {
            composing: ComposingDelay::WordsPerMinute {
                wpm: READING_WORDS_PER_MINUTE,
                floor: COMPOSING_FLOOR,
            },
            ..Self::default()
        }
    }

    /// Resolve the composing delay for a user utterance.
    pub fn composing_delay(&self, utterance: &str) -> Duration {
        match self.composing {
            ComposingDelay::Fixed(delay) => delay,
            ComposingDelay::WordsPerMinute { wpm, floor } => {
                #[allow(clippy::cast_precision_loss)]
                let words = utterance.chars().count() as f64 / CHARS_PER_WORD;
                let minutes = words / f64::from(wpm);
                Duration::from_secs_f64(minutes * 60.0).max(floor)
            }
        }
    }
}

//! Numeric count-up counters.
//!
//! A floating proxy is tweened from 0 to the target; every frame publishes the
//! rounded value, formatted with optional digit grouping, prefix and suffix. The
//! completing frame always publishes the exact target so no rounding drift survives.

use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, check_time, Result};
use crate::geometry::Rect;
use crate::ids::{CounterId, TweenId};
use crate::interp::{lerp_f64, Ease};
use crate::watcher::WatchOptions;

fn default_grouping() -> Option<char> {
    Some(',')
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterOptions {
    pub duration: f32,
    pub delay: f32,
    pub prefix: String,
    pub suffix: String,
    /// Thousands separator; `None` prints plain digits.
    #[serde(default = "default_grouping")]
    pub grouping: Option<char>,
    pub ease: Ease,
    pub threshold: f32,
    pub start: f32,
    /// Overrides the configured safety-net window (seconds).
    pub safety_net: Option<f32>,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            duration: 2.0,
            delay: 0.0,
            prefix: String::new(),
            suffix: String::new(),
            grouping: default_grouping(),
            ease: Ease::PowerOut(1),
            threshold: 0.0,
            start: 0.9,
            safety_net: None,
        }
    }
}

impl CounterOptions {
    pub fn validate(&self) -> Result<()> {
        check_time("duration", self.duration)?;
        check_time("delay", self.delay)?;
        check_fraction("threshold", self.threshold)?;
        check_fraction("start", self.start)?;
        if let Some(window) = self.safety_net {
            check_time("safety_net", window)?;
        }
        Ok(())
    }

    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            threshold: self.threshold,
            start_line: Some(self.start),
            once: true,
            ..WatchOptions::default()
        }
    }

    /// Render `value` as display text.
    pub fn format(&self, value: i64) -> String {
        let digits = value.unsigned_abs().to_string();
        let body = match self.grouping {
            Some(sep) => group_digits(&digits, sep),
            None => digits,
        };
        let sign = if value < 0 { "-" } else { "" };
        format!("{}{}{}{}", self.prefix, sign, body, self.suffix)
    }
}

fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum CounterPhase {
    /// Waiting for intersection.
    Idle,
    Counting { tween: TweenId, started: bool },
    Done,
}

#[derive(Clone, Debug)]
pub struct CounterState {
    pub id: CounterId,
    pub element: String,
    pub rect: Rect,
    pub target: i64,
    pub options: CounterOptions,
    proxy: f64,
    shown: i64,
    text: String,
    phase: CounterPhase,
}

impl CounterState {
    pub fn new(id: CounterId, element: String, rect: Rect, target: i64, options: CounterOptions) -> Self {
        let text = options.format(0);
        Self {
            id,
            element,
            rect,
            target,
            options,
            proxy: 0.0,
            shown: 0,
            text,
            phase: CounterPhase::Idle,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn phase(&self) -> CounterPhase {
        self.phase
    }

    #[inline]
    pub fn value(&self) -> i64 {
        self.shown
    }

    pub fn is_done(&self) -> bool {
        self.phase == CounterPhase::Done
    }

    pub fn tween(&self) -> Option<TweenId> {
        match self.phase {
            CounterPhase::Counting { tween, .. } => Some(tween),
            _ => None,
        }
    }

    /// True until the first tween frame has been applied.
    pub fn awaiting_first_frame(&self) -> bool {
        matches!(
            self.phase,
            CounterPhase::Idle | CounterPhase::Counting { started: false, .. }
        )
    }

    /// Idle -> Counting.
    pub fn begin(&mut self, tween: TweenId) -> bool {
        if self.phase != CounterPhase::Idle {
            return false;
        }
        self.phase = CounterPhase::Counting {
            tween,
            started: false,
        };
        true
    }

    /// Apply eased progress. Returns the new text when the displayed value changed.
    /// Displayed values move monotonically toward the target.
    pub fn apply_progress(&mut self, progress: f32) -> Option<String> {
        let CounterPhase::Counting { tween, .. } = self.phase else {
            return None;
        };
        self.phase = CounterPhase::Counting {
            tween,
            started: true,
        };
        self.proxy = lerp_f64(0.0, self.target as f64, f64::from(progress));
        let rounded = self.proxy.round() as i64;
        let next = if self.target >= 0 {
            rounded.clamp(self.shown, self.target)
        } else {
            rounded.clamp(self.target, self.shown)
        };
        if next == self.shown {
            return None;
        }
        self.shown = next;
        self.text = self.options.format(next);
        Some(self.text.clone())
    }

    /// Freeze at the exact target. Returns the final text unless already done.
    pub fn finish(&mut self) -> Option<String> {
        if self.is_done() {
            return None;
        }
        self.proxy = self.target as f64;
        self.shown = self.target;
        self.text = self.options.format(self.target);
        self.phase = CounterPhase::Done;
        Some(self.text.clone())
    }
}

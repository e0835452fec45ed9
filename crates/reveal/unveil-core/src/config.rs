//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::counter::CounterOptions;
use crate::error::{check_time, RevealError, Result};
use crate::parallax::ParallaxOptions;
use crate::reveal::RevealOptions;

/// Safety-net windows, host capabilities and the option defaults used for
/// declarative registrations. Every field has a default, so partial JSON is accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds after registration before hidden reveal targets are forced visible.
    pub reveal_safety_net: f32,
    /// Seconds after registration before an unstarted counter publishes its final value.
    pub counter_safety_net: f32,
    /// Pixels added above and below the viewport when deciding whether a parallax
    /// binding is active.
    pub parallax_margin: f32,
    /// False for hosts that never scroll or paint frames (pre-rendering, print).
    /// Everything is then registered directly in its final state.
    pub interactive: bool,
    pub reveal: RevealOptions,
    pub counter: CounterOptions,
    pub parallax: ParallaxOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reveal_safety_net: 3.0,
            counter_safety_net: 4.0,
            parallax_margin: 100.0,
            interactive: true,
            reveal: RevealOptions::default(),
            counter: CounterOptions::default(),
            parallax: ParallaxOptions::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        check_time("reveal_safety_net", self.reveal_safety_net)?;
        check_time("counter_safety_net", self.counter_safety_net)?;
        check_time("parallax_margin", self.parallax_margin)?;
        self.reveal.validate()?;
        self.counter.validate()?;
        self.parallax.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Config = serde_json::from_str(json).map_err(|e| RevealError::Config {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }
}

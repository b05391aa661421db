//! Skill tiers and the progression policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChefError, Result};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Master,
}

impl SkillTier {
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Beginner, Self::Intermediate, Self::Advanced, Self::Master]
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The following tier; `None` for Master.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Beginner => Some(Self::Intermediate),
            Self::Intermediate => Some(Self::Advanced),
            Self::Advanced => Some(Self::Master),
            Self::Master => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Master => "Master",
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillTier {
    type Err = ChefError;

    fn from_str(value: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|tier| tier.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ChefError::Validation(format!("unknown skill tier {value}")))
    }
}

/// Interaction thresholds and confidence multipliers per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPolicy {
    /// Interaction counts that unlock Intermediate, Advanced and Master.
    pub thresholds: [u64; 3],
    /// Confidence multiplier for each tier, Beginner first.
    pub multipliers: [f64; 4],
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self {
            thresholds: [5, 15, 30],
            multipliers: [0.6, 0.75, 0.9, 1.0],
        }
    }
}

impl TierPolicy {
    pub fn new(thresholds: [u64; 3], multipliers: [f64; 4]) -> Result<Self> {
        if thresholds[0] == 0 || !thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err(ChefError::Config(format!(
                "tier thresholds must be positive and strictly increasing, got {thresholds:?}"
            )));
        }
        if !multipliers.iter().all(|m| *m > 0.0 && *m <= 1.0) {
            return Err(ChefError::Config(format!(
                "tier multipliers must be in (0, 1], got {multipliers:?}"
            )));
        }
        if !multipliers.windows(2).all(|w| w[0] < w[1]) {
            return Err(ChefError::Config(format!(
                "tier multipliers must strictly increase with tier, got {multipliers:?}"
            )));
        }
        Ok(Self {
            thresholds,
            multipliers,
        })
    }

    #[must_use]
    pub const fn multiplier(&self, tier: SkillTier) -> f64 {
        self.multipliers[tier.index()]
    }

    /// Highest tier whose threshold `count` has reached.
    #[must_use]
    pub fn earned_tier(&self, count: u64) -> SkillTier {
        let reached = self.thresholds.iter().filter(|t| count >= **t).count();
        SkillTier::all()[reached]
    }

    /// Interaction count that unlocks the tier after `tier`.
    #[must_use]
    pub fn next_threshold(&self, tier: SkillTier) -> Option<u64> {
        self.thresholds.get(tier.index()).copied()
    }

    /// Fraction of the way from zero to the next threshold, in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, state: &SkillState) -> f64 {
        match self.next_threshold(state.tier) {
            Some(next) => (state.interaction_count as f64 / next as f64).min(1.0),
            None => 1.0,
        }
    }
}

/// Running interaction count, tier and latest confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillState {
    interaction_count: u64,
    tier: SkillTier,
    confidence: f64,
}

impl SkillState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted values.
    #[must_use]
    pub fn restore(interaction_count: u64, tier: SkillTier, confidence: f64) -> Self {
        Self {
            interaction_count,
            tier,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub const fn interaction_count(&self) -> u64 {
        self.interaction_count
    }

    #[must_use]
    pub const fn tier(&self) -> SkillTier {
        self.tier
    }

    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Count one successful suggestion. Advances at most one tier, and only
    /// if the new count has reached a threshold above the current tier.
    /// Returns the new tier on promotion.
    pub(crate) fn record_success(&mut self, confidence: f64, policy: &TierPolicy) -> Option<SkillTier> {
        self.interaction_count = self.interaction_count.saturating_add(1);
        self.confidence = confidence.clamp(0.0, 1.0);
        if policy.earned_tier(self.interaction_count) > self.tier {
            if let Some(next) = self.tier.next() {
                self.tier = next;
                return Some(next);
            }
        }
        None
    }
}

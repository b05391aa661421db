//! Flavor pairing scores learned from explicit feedback.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ChefError, Result};

const LIKED_DELTA: f64 = 1.0;
const DISLIKED_DELTA: f64 = -0.5;
/// Pair scores are divided by this to give an experiment's confidence.
const EXPERIMENT_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Liked,
    Disliked,
}

impl Rating {
    #[must_use]
    pub const fn delta(self) -> f64 {
        match self {
            Self::Liked => LIKED_DELTA,
            Self::Disliked => DISLIKED_DELTA,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Liked => "liked",
            Self::Disliked => "disliked",
        })
    }
}

impl FromStr for Rating {
    type Err = ChefError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "liked" | "like" | "up" | "good" | "1" => Ok(Self::Liked),
            "disliked" | "dislike" | "down" | "bad" | "0" => Ok(Self::Disliked),
            _ => Err(ChefError::Validation(format!(
                "invalid rating {value} (expected liked|disliked)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub partner: String,
    pub score: f64,
}

/// Untried pair suggested by a partner both ingredients do well with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Experiment {
    /// Sorted pair.
    pub ingredients: [String; 2],
    /// The shared partner.
    pub via: String,
    pub confidence: f64,
}

/// Symmetric ingredient-pair scores.
///
/// `rated` only needs the ids that can still be rated, so it may be pruned
/// to what history retains; `feedback_total` keeps the lifetime count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingLedger {
    scores: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    rated: BTreeSet<Uuid>,
    #[serde(default)]
    feedback_total: u64,
}

impl PairingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `rating` to every pair in `ingredients` for suggestion `result_id`.
    /// Each suggestion can be rated once. Returns the number of pairs touched.
    pub fn record(&mut self, result_id: Uuid, ingredients: &[String], rating: Rating) -> Result<usize> {
        if self.rated.contains(&result_id) {
            return Err(ChefError::Validation(format!(
                "suggestion {result_id} has already been rated"
            )));
        }
        let unique: BTreeSet<&String> = ingredients.iter().collect();
        let delta = rating.delta();
        let mut touched = 0;
        for (a, b) in unique.iter().copied().tuple_combinations() {
            *self
                .scores
                .entry(a.clone())
                .or_default()
                .entry(b.clone())
                .or_insert(0.0) += delta;
            *self
                .scores
                .entry(b.clone())
                .or_default()
                .entry(a.clone())
                .or_insert(0.0) += delta;
            touched += 1;
        }
        self.rated.insert(result_id);
        self.feedback_total = self.feedback_total.saturating_add(1);
        Ok(touched)
    }

    /// Partners of `ingredient`, best score first, then by name.
    #[must_use]
    pub fn partners(&self, ingredient: &str) -> Vec<Pairing> {
        let Some(pairs) = self.scores.get(ingredient) else {
            return Vec::new();
        };
        pairs
            .iter()
            .map(|(partner, score)| Pairing {
                partner: partner.clone(),
                score: *score,
            })
            .sorted_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.partner.cmp(&b.partner)))
            .collect()
    }

    /// Number of distinct unordered pairs with a score.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.scores.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Number of ratings ever recorded.
    #[must_use]
    pub const fn feedback_count(&self) -> u64 {
        self.feedback_total
    }

    #[must_use]
    pub fn is_rated(&self, result_id: Uuid) -> bool {
        self.rated.contains(&result_id)
    }

    /// Flattened `(a, b, score)` triples with `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.scores.iter().flat_map(|(a, partners)| {
            partners
                .iter()
                .filter(move |(b, _)| a < *b)
                .map(move |(b, score)| (a.as_str(), b.as_str(), *score))
        })
    }

    /// Candidate pairs A+C where A and C both scored well with some B but
    /// have never been tried together. Best first.
    #[must_use]
    pub fn experiments(&self) -> Vec<Experiment> {
        let mut best: BTreeMap<(&str, &str), (f64, &str)> = BTreeMap::new();
        for (a, partners) in &self.scores {
            for (b, ab) in partners.iter().filter(|(_, score)| **score > 0.0) {
                let Some(next) = self.scores.get(b) else {
                    continue;
                };
                for (c, bc) in next.iter().filter(|(_, score)| **score > 0.0) {
                    if c == a || partners.contains_key(c) {
                        continue;
                    }
                    let key = if a < c {
                        (a.as_str(), c.as_str())
                    } else {
                        (c.as_str(), a.as_str())
                    };
                    let confidence = (ab.min(*bc) / EXPERIMENT_SCALE).min(1.0);
                    best.entry(key)
                        .and_modify(|entry| {
                            if confidence > entry.0 {
                                *entry = (confidence, b.as_str());
                            }
                        })
                        .or_insert((confidence, b.as_str()));
                }
            }
        }
        best.into_iter()
            .map(|((a, c), (confidence, via))| Experiment {
                ingredients: [a.to_string(), c.to_string()],
                via: via.to_string(),
                confidence,
            })
            .sorted_by(|x, y| {
                y.confidence
                    .total_cmp(&x.confidence)
                    .then_with(|| x.ingredients.cmp(&y.ingredients))
            })
            .collect()
    }

    /// Drop rated ids for which `keep` is false. The lifetime count is kept.
    pub fn retain_rated(&mut self, keep: impl Fn(&Uuid) -> bool) {
        self.rated.retain(|id| keep(id));
    }

    /// Rebuild from stored triples, rated suggestion ids and the lifetime
    /// rating count.
    #[must_use]
    pub fn from_parts(
        pairs: Vec<(String, String, f64)>,
        rated: BTreeSet<Uuid>,
        feedback_total: u64,
    ) -> Self {
        let mut ledger = Self {
            scores: BTreeMap::new(),
            feedback_total: feedback_total.max(rated.len() as u64),
            rated,
        };
        for (a, b, score) in pairs {
            ledger
                .scores
                .entry(a.clone())
                .or_default()
                .insert(b.clone(), score);
            ledger.scores.entry(b).or_default().insert(a, score);
        }
        ledger
    }

    /// Rated suggestion ids.
    pub fn rated(&self) -> impl Iterator<Item = &Uuid> {
        self.rated.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn liked_and_disliked_are_symmetric() {
        let mut ledger = PairingLedger::new();
        let touched = ledger
            .record(Uuid::new_v4(), &names(&["garlic", "chicken", "onion"]), Rating::Liked)
            .unwrap();
        assert_eq!(touched, 3);
        ledger
            .record(Uuid::new_v4(), &names(&["garlic", "onion"]), Rating::Disliked)
            .unwrap();

        let garlic = ledger.partners("garlic");
        assert_eq!(garlic[0].partner, "chicken");
        assert!((garlic[0].score - 1.0).abs() < f64::EPSILON);
        assert_eq!(garlic[1].partner, "onion");
        assert!((garlic[1].score - 0.5).abs() < f64::EPSILON);

        let onion = ledger.partners("onion");
        assert!(onion.iter().any(|p| p.partner == "garlic" && (p.score - 0.5).abs() < f64::EPSILON));
        assert_eq!(ledger.pair_count(), 3);
        assert_eq!(ledger.feedback_count(), 2);
    }

    #[test]
    fn same_suggestion_cannot_be_rated_twice() {
        let mut ledger = PairingLedger::new();
        let id = Uuid::new_v4();
        ledger.record(id, &names(&["egg", "cheese"]), Rating::Liked).unwrap();
        let err = ledger.record(id, &names(&["egg", "cheese"]), Rating::Liked).unwrap_err();
        assert!(matches!(err, ChefError::Validation(_)));
        assert!((ledger.partners("egg")[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_ingredient_has_no_pairs() {
        let mut ledger = PairingLedger::new();
        assert_eq!(ledger.record(Uuid::new_v4(), &names(&["egg", "egg"]), Rating::Liked).unwrap(), 0);
        assert!(ledger.partners("egg").is_empty());
    }

    #[test]
    fn parts_round_trip() {
        let mut ledger = PairingLedger::new();
        ledger
            .record(Uuid::new_v4(), &names(&["rice", "egg", "scallion"]), Rating::Liked)
            .unwrap();
        let pairs: Vec<(String, String, f64)> = ledger
            .pairs()
            .map(|(a, b, s)| (a.to_string(), b.to_string(), s))
            .collect();
        assert_eq!(pairs.len(), 3);
        let rebuilt =
            PairingLedger::from_parts(pairs, ledger.rated().copied().collect(), ledger.feedback_count());
        assert_eq!(rebuilt, ledger);
    }

    #[test]
    fn experiments_bridge_through_a_shared_partner() {
        let mut ledger = PairingLedger::new();
        ledger
            .record(Uuid::new_v4(), &names(&["garlic", "chicken"]), Rating::Liked)
            .unwrap();
        ledger
            .record(Uuid::new_v4(), &names(&["garlic", "chicken"]), Rating::Liked)
            .unwrap();
        ledger
            .record(Uuid::new_v4(), &names(&["chicken", "lemon"]), Rating::Liked)
            .unwrap();
        ledger
            .record(Uuid::new_v4(), &names(&["lemon", "dill"]), Rating::Liked)
            .unwrap();
        // Disliked pairs do not bridge.
        ledger
            .record(Uuid::new_v4(), &names(&["dill", "cumin"]), Rating::Disliked)
            .unwrap();

        let experiments = ledger.experiments();
        let pairs: Vec<[&str; 2]> = experiments
            .iter()
            .map(|e| [e.ingredients[0].as_str(), e.ingredients[1].as_str()])
            .collect();
        assert_eq!(pairs, vec![["chicken", "dill"], ["garlic", "lemon"]]);
        assert!(experiments.iter().all(|e| (e.confidence - 0.1).abs() < 1e-12));
        assert_eq!(experiments[0].via, "lemon");
        assert_eq!(experiments[1].via, "chicken");
    }

    #[test]
    fn experiments_skip_pairs_already_tried() {
        let mut ledger = PairingLedger::new();
        ledger
            .record(Uuid::new_v4(), &names(&["rice", "egg", "scallion"]), Rating::Liked)
            .unwrap();
        assert!(ledger.experiments().is_empty());
    }

    #[test]
    fn pruning_rated_ids_keeps_the_count() {
        let mut ledger = PairingLedger::new();
        let old = Uuid::new_v4();
        let recent = Uuid::new_v4();
        ledger.record(old, &names(&["egg", "cheese"]), Rating::Liked).unwrap();
        ledger.record(recent, &names(&["egg", "ham"]), Rating::Liked).unwrap();

        ledger.retain_rated(|id| *id == recent);
        assert!(!ledger.is_rated(old));
        assert!(ledger.is_rated(recent));
        assert_eq!(ledger.feedback_count(), 2);
    }

    #[test]
    fn rating_parses_common_spellings() {
        assert_eq!("Up".parse::<Rating>().unwrap(), Rating::Liked);
        assert_eq!("dislike".parse::<Rating>().unwrap(), Rating::Disliked);
        assert!("meh".parse::<Rating>().is_err());
    }
}

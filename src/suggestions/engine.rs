//! Template scoring and selection.
//!
//! A candidate is any template sharing at least one required ingredient with
//! the input. Its score is `match_ratio * tier_multiplier`, where
//! `match_ratio = |required ∩ input| / |required|`. The highest score wins;
//! ties go to the lowest template id. Evaluation is pure: it never touches
//! the skill state it is given.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ChefError, Result};
use crate::kitchen::{Classified, CuisineStyle, IngredientSet, KnowledgeBase, RecipeTemplate};
use crate::kitchen::{RenderedRecipe, render};

use super::skill::{SkillState, SkillTier, TierPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub template_id: u32,
    pub matched: usize,
    pub required: usize,
    pub match_ratio: f64,
    pub score: f64,
}

/// Outcome of scoring one request.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    pub template: &'a RecipeTemplate,
    pub confidence: f64,
    pub match_ratio: f64,
    pub tier: SkillTier,
    /// Every candidate, in template id order.
    pub candidates: Vec<Candidate>,
    pub reasoning: Vec<String>,
    pub recipe: RenderedRecipe,
    pub input: Classified,
}

/// Read-only scorer over a knowledge base.
#[derive(Debug, Clone)]
pub struct Recommender {
    knowledge: KnowledgeBase,
    policy: TierPolicy,
    preferred_cuisine: Option<CuisineStyle>,
}

impl Recommender {
    #[must_use]
    pub const fn new(knowledge: KnowledgeBase, policy: TierPolicy) -> Self {
        Self {
            knowledge,
            policy,
            preferred_cuisine: None,
        }
    }

    #[must_use]
    pub fn with_preferred_cuisine(mut self, cuisine: Option<CuisineStyle>) -> Self {
        self.preferred_cuisine = cuisine;
        self
    }

    #[must_use]
    pub const fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    #[must_use]
    pub const fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    #[must_use]
    pub const fn preferred_cuisine(&self) -> Option<CuisineStyle> {
        self.preferred_cuisine
    }

    /// Score every template against `ingredients` at the tier in `skill`.
    pub fn evaluate(&self, ingredients: &IngredientSet, skill: &SkillState) -> Result<Evaluation<'_>> {
        let input = self.knowledge.pantry.classify(ingredients);
        let known: BTreeSet<String> = input.known.iter().cloned().collect();
        let tier = skill.tier();
        let multiplier = self.policy.multiplier(tier);

        let candidates: Vec<Candidate> = self
            .knowledge
            .catalog
            .iter()
            .filter_map(|template| {
                let matched = template.required_overlap(&known);
                if matched == 0 {
                    return None;
                }
                let required = template.required.len();
                let match_ratio = ratio(matched, required);
                Some(Candidate {
                    template_id: template.id,
                    matched,
                    required,
                    match_ratio,
                    score: match_ratio * multiplier,
                })
            })
            .collect();

        for candidate in &candidates {
            trace!(
                template_id = candidate.template_id,
                match_ratio = candidate.match_ratio,
                score = candidate.score,
                "candidate scored"
            );
        }

        // Candidates arrive in ascending id order, so a strict comparison keeps
        // the lowest id among equal scores.
        let mut best: Option<&Candidate> = None;
        for candidate in &candidates {
            if best.is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        let Some(best) = best.copied() else {
            debug!(
                known = input.known.len(),
                unknown = input.unknown.len(),
                "no template matched"
            );
            return Err(ChefError::NoMatch {
                ingredients: ingredients.to_vec(),
            });
        };

        let template = self
            .knowledge
            .catalog
            .get(best.template_id)
            .ok_or_else(|| ChefError::NotFound(format!("recipe {}", best.template_id)))?;
        let confidence = best.score.clamp(0.0, 1.0);
        let reasoning = self.reasoning(template, &best, &input, candidates.len(), tier, confidence);
        let recipe = render(template, &input, &self.knowledge.pantry);

        Ok(Evaluation {
            template,
            confidence,
            match_ratio: best.match_ratio,
            tier,
            candidates,
            reasoning,
            recipe,
            input,
        })
    }

    /// One line per scoring factor: ingredient match, cuisine preference,
    /// skill-adjusted confidence.
    fn reasoning(
        &self,
        template: &RecipeTemplate,
        best: &Candidate,
        input: &Classified,
        candidate_count: usize,
        tier: SkillTier,
        confidence: f64,
    ) -> Vec<String> {
        let matched: Vec<&str> = template
            .required
            .iter()
            .filter(|tag| input.known.binary_search(tag).is_ok())
            .map(String::as_str)
            .collect();
        let plural = if candidate_count == 1 { "" } else { "s" };
        let mut ingredient_step = format!(
            "Ingredient match: {} of {} required ingredients for {} ({}), best of {candidate_count} candidate recipe{plural}",
            best.matched,
            best.required,
            template.name,
            matched.join(", "),
        );
        if !input.unknown.is_empty() {
            ingredient_step.push_str(&format!(
                "; not recognized: {}",
                input.unknown.join(", ")
            ));
        }

        let cuisine_step = match self.preferred_cuisine {
            None => format!("Cuisine preference: {} (no preference set)", template.cuisine),
            Some(preferred) if preferred == template.cuisine => {
                format!("Cuisine preference: {} matches your preferred cuisine", template.cuisine)
            }
            Some(preferred) => format!(
                "Cuisine preference: {} chosen; no {preferred} recipe matched as well",
                template.cuisine
            ),
        };

        let confidence_step = format!(
            "Skill-adjusted confidence: {:.0}% match x {tier} multiplier {:.2} = {:.0}% confidence",
            best.match_ratio * 100.0,
            self.policy.multiplier(tier),
            confidence * 100.0,
        );

        vec![ingredient_step, cuisine_step, confidence_step]
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(matched: usize, required: usize) -> f64 {
    matched as f64 / required as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kitchen::parse_ingredients;
    use crate::test_utils::fixtures::{recommender_with, scenario_recommender};

    #[test]
    fn garlic_chicken_onion_picks_first_template_at_beginner() {
        let recommender = scenario_recommender();
        let input = parse_ingredients("garlic, chicken, onion").unwrap();
        let eval = recommender.evaluate(&input, &SkillState::new()).unwrap();

        assert_eq!(eval.template.id, 1);
        assert!((eval.confidence - 0.6).abs() < 1e-9);
        assert_eq!(eval.candidates.len(), 2);
        let second = eval.candidates.iter().find(|c| c.template_id == 2).unwrap();
        assert!((second.match_ratio - 2.0 / 3.0).abs() < 1e-9);
        assert!((second.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn reasoning_has_three_steps_in_fixed_order() {
        let recommender = scenario_recommender();
        let input = parse_ingredients("garlic, chicken, Durian").unwrap();
        let eval = recommender.evaluate(&input, &SkillState::new()).unwrap();

        assert_eq!(eval.reasoning.len(), 3);
        assert!(eval.reasoning[0].starts_with("Ingredient match: 2 of 2"));
        assert!(eval.reasoning[0].ends_with("not recognized: Durian"));
        assert!(eval.reasoning[1].starts_with("Cuisine preference:"));
        assert!(eval.reasoning[2].starts_with("Skill-adjusted confidence: 100% match x Beginner multiplier 0.60"));
    }

    #[test]
    fn tie_goes_to_lowest_id() {
        let recommender = recommender_with(&[(9, &["tomato", "onion"][..]), (4, &["tomato", "garlic"][..])]);
        let input = parse_ingredients("tomato").unwrap();
        let eval = recommender.evaluate(&input, &SkillState::new()).unwrap();
        assert_eq!(eval.template.id, 4);
        assert_eq!(eval.candidates.len(), 2);
    }

    #[test]
    fn unknown_only_input_is_no_match() {
        let recommender = scenario_recommender();
        let input = parse_ingredients("kumquat, dragonfruit").unwrap();
        let err = recommender.evaluate(&input, &SkillState::new()).unwrap_err();
        match err {
            ChefError::NoMatch { ingredients } => {
                assert_eq!(ingredients, vec!["dragonfruit", "kumquat"]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn higher_tier_expresses_higher_confidence() {
        let recommender = scenario_recommender();
        let input = parse_ingredients("tomato, onion").unwrap();
        let beginner = recommender.evaluate(&input, &SkillState::new()).unwrap();
        let master = recommender
            .evaluate(&input, &SkillState::restore(40, SkillTier::Master, 0.0))
            .unwrap();
        assert_eq!(beginner.template.id, master.template.id);
        assert!(master.confidence > beginner.confidence);
        assert!((master.confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn preferred_cuisine_is_reported() {
        let recommender = KnowledgeBase::builtin()
            .map(|kb| Recommender::new(kb, TierPolicy::default()))
            .unwrap()
            .with_preferred_cuisine(Some(CuisineStyle::Italian));
        let pasta = parse_ingredients("tomato, onion, garlic").unwrap();
        let eval = recommender.evaluate(&pasta, &SkillState::new()).unwrap();
        assert_eq!(eval.template.cuisine, CuisineStyle::Italian);
        assert!(eval.reasoning[1].contains("matches your preferred cuisine"));

        let eggs = parse_ingredients("eggs").unwrap();
        let eval = recommender.evaluate(&eggs, &SkillState::new()).unwrap();
        assert!(eval.reasoning[1].contains("no italian recipe matched as well"));
    }
}

use std::sync::Arc;

use chefai::ChefError;
use chefai::kitchen::{KnowledgeBase, parse_ingredients};
use chefai::storage::{SessionRecord, StoredSession};
use chefai::suggestions::{ChefSession, Recommender, SkillState, SkillTier, TierPolicy};
use chefai::test_utils::fixtures::{builtin_session, recommender_with, scenario_recommender};
use chefai::test_utils::{TestCase, run_table_tests};

fn session_at(recommender: Recommender, count: u64, tier: SkillTier) -> ChefSession {
    let stored = StoredSession {
        record: SessionRecord {
            interaction_count: count,
            skill_tier: tier,
            history_count: count,
            confidence: 0.0,
        },
        ..StoredSession::default()
    };
    ChefSession::restore(Arc::new(recommender), 50, stored)
}

#[test]
fn parsing_dedups_case_insensitively() {
    let set = parse_ingredients("Chicken, Tomato, chicken").unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.tags().collect::<Vec<_>>(), vec!["chicken", "tomato"]);
}

#[test]
fn normalization_table() {
    let cases = vec![
        TestCase {
            name: "mixed case and padding",
            input: "  GARLIC ,onion",
            expected: String::from("garlic|onion"),
        },
        TestCase {
            name: "inner whitespace collapses",
            input: "soy   sauce, Soy Sauce",
            expected: String::from("soy sauce"),
        },
        TestCase {
            name: "empty tokens dropped",
            input: "rice,,, ,eggs",
            expected: String::from("eggs|rice"),
        },
        TestCase {
            name: "fullwidth letters fold",
            input: "ｔｏｆｕ",
            expected: String::from("tofu"),
        },
    ];
    run_table_tests(cases, |input| {
        parse_ingredients(input)
            .unwrap()
            .tags()
            .collect::<Vec<_>>()
            .join("|")
    })
    .unwrap();
}

#[test]
fn garlic_chicken_onion_selects_t1_at_0_6() {
    let recommender = scenario_recommender();
    let input = parse_ingredients("garlic, chicken, onion").unwrap();
    let eval = recommender.evaluate(&input, &SkillState::new()).unwrap();

    assert_eq!(eval.template.id, 1);
    assert!((eval.match_ratio - 1.0).abs() < 1e-9);
    assert!((eval.confidence - 0.6).abs() < 1e-9);
    let t2 = eval.candidates.iter().find(|c| c.template_id == 2).unwrap();
    assert!((t2.match_ratio - 0.667).abs() < 1e-3);
    assert!((t2.score - 0.4).abs() < 1e-9);
}

#[test]
fn equal_ratio_gives_equal_confidence_at_beginner() {
    let recommender = recommender_with(&[
        (1, &["chicken", "garlic"][..]),
        (2, &["tomato", "onion"][..]),
        (3, &["rice", "egg", "scallion", "soy sauce"][..]),
    ]);
    let beginner = SkillState::new();
    let half_a = recommender
        .evaluate(&parse_ingredients("chicken").unwrap(), &beginner)
        .unwrap();
    let half_b = recommender
        .evaluate(&parse_ingredients("rice, eggs, kale").unwrap(), &beginner)
        .unwrap();

    assert_ne!(half_a.template.id, half_b.template.id);
    assert!((half_a.match_ratio - half_b.match_ratio).abs() < 1e-12);
    assert!((half_a.confidence - half_b.confidence).abs() < 1e-12);
    assert!((half_a.confidence - 0.3).abs() < 1e-9);
}

#[test]
fn repeated_evaluation_is_deterministic() {
    let knowledge = KnowledgeBase::builtin().unwrap();
    let recommender = Recommender::new(knowledge, TierPolicy::default());
    let state = SkillState::restore(20, SkillTier::Advanced, 0.5);
    let input = parse_ingredients("onion, garlic, tomato, rice, cheese, mushroom").unwrap();

    let first = recommender.evaluate(&input, &state).unwrap();
    for _ in 0..20 {
        let again = recommender.evaluate(&input, &state).unwrap();
        assert_eq!(again.template.id, first.template.id);
        assert!((again.confidence - first.confidence).abs() < f64::EPSILON);
        assert_eq!(again.reasoning, first.reasoning);
        assert_eq!(again.recipe, first.recipe);
    }
}

#[test]
fn no_overlap_raises_no_match_and_keeps_count() {
    let mut session = builtin_session();
    session.suggest_text("chicken, garlic").unwrap();

    let err = session.suggest_text("marshmallow, licorice").unwrap_err();
    assert!(matches!(err, ChefError::NoMatch { .. }));
    assert!(err.is_recoverable());
    assert_eq!(session.skill().interaction_count(), 1);
    assert_eq!(session.snapshot().history_count, 1);
}

#[test]
fn fifth_interaction_advances_exactly_once() {
    let mut session = session_at(
        Recommender::new(KnowledgeBase::builtin().unwrap(), TierPolicy::default()),
        4,
        SkillTier::Beginner,
    );
    // Many templates match this input.
    let result = session
        .suggest_text("onion, garlic, tomato, chicken, potato, rice, egg")
        .unwrap();

    assert_eq!(result.promoted_to, Some(SkillTier::Intermediate));
    assert_eq!(session.skill().interaction_count(), 5);
    assert_eq!(session.skill().tier(), SkillTier::Intermediate);
}

#[test]
fn lagging_tier_climbs_one_step_per_call() {
    let mut session = session_at(scenario_recommender(), 14, SkillTier::Beginner);

    session.suggest_text("chicken, garlic").unwrap();
    assert_eq!(session.skill().interaction_count(), 15);
    assert_eq!(session.skill().tier(), SkillTier::Intermediate);

    session.suggest_text("chicken, garlic").unwrap();
    assert_eq!(session.skill().tier(), SkillTier::Advanced);

    session.suggest_text("chicken, garlic").unwrap();
    assert_eq!(session.skill().tier(), SkillTier::Advanced);
}

#[test]
fn tier_never_decreases_over_a_long_run() {
    let mut session = builtin_session();
    let mut previous = session.skill().tier();
    let mut promotions = 0;
    for _ in 0..40 {
        let result = session.suggest_text("salmon, lemon, butter").unwrap();
        let tier = session.skill().tier();
        assert!(tier >= previous);
        if result.promoted_to.is_some() {
            promotions += 1;
            assert_eq!(previous.next(), Some(tier));
        }
        previous = tier;
    }
    assert_eq!(promotions, 3);
    assert_eq!(previous, SkillTier::Master);
    assert!((session.skill().confidence() - 1.0).abs() < 1e-9);
}

#[test]
fn history_ring_keeps_newest_and_counts_all() {
    let recommender = Recommender::new(KnowledgeBase::builtin().unwrap(), TierPolicy::default());
    let mut session = ChefSession::new(Arc::new(recommender), 3);
    for text in ["eggs", "beef, bread", "tofu, ginger", "potato, onion", "lentils, cumin"] {
        session.suggest_text(text).unwrap();
    }
    let snapshot = session.snapshot();
    assert_eq!(snapshot.history_count, 5);
    assert_eq!(snapshot.history_retained, 3);
    let names: Vec<&str> = session.history(10).iter().map(|r| r.template.name.as_str()).collect();
    assert_eq!(names.len(), 3);
    assert_eq!(names[2], "Ginger Soy Stir-Fry");
}

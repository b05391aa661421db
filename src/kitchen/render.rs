//! Filling a recipe template in with the cook's ingredients.

use serde::{Deserialize, Serialize};

use super::catalog::RecipeTemplate;
use super::pantry::{Classified, Pantry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub item: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    /// False when a required ingredient is missing from the input.
    pub on_hand: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedStep {
    pub number: usize,
    pub instruction: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRecipe {
    pub title: String,
    pub ingredients: Vec<IngredientLine>,
    pub steps: Vec<RenderedStep>,
    pub total_time: String,
    pub difficulty: String,
    pub sides: Vec<String>,
}

#[must_use]
pub fn difficulty_label(difficulty: u8) -> &'static str {
    match difficulty {
        0..=2 => "Easy",
        3 => "Medium",
        _ => "Hard",
    }
}

/// Render `template` for the classified input.
#[must_use]
pub fn render(template: &RecipeTemplate, input: &Classified, pantry: &Pantry) -> RenderedRecipe {
    let have = |tag: &String| input.known.binary_search(tag).is_ok();

    let required: Vec<&str> = template.required.iter().map(String::as_str).collect();
    let extras: Vec<&str> = template
        .optional
        .iter()
        .filter(|tag| have(tag))
        .map(String::as_str)
        .collect();
    let all: Vec<&str> = template
        .required
        .iter()
        .chain(template.optional.iter())
        .filter(|tag| have(tag))
        .map(String::as_str)
        .collect();

    let mut ingredients: Vec<IngredientLine> = template
        .required
        .iter()
        .map(|tag| line(tag, pantry, have(tag)))
        .chain(extras.iter().map(|tag| line(tag, pantry, true)))
        .collect();
    ingredients.extend(input.unknown.iter().map(|item| IngredientLine {
        item: item.clone(),
        amount: "to taste".to_string(),
        preparation: None,
        on_hand: true,
    }));

    let required_text = natural_join(&required);
    let extras_text = if extras.is_empty() {
        "your favorite seasonings".to_string()
    } else {
        natural_join(&extras)
    };
    let all_text = natural_join(&all);

    let steps: Vec<RenderedStep> = template
        .steps
        .iter()
        .enumerate()
        .map(|(idx, step)| RenderedStep {
            number: idx + 1,
            instruction: step
                .text
                .replace("{required}", &required_text)
                .replace("{extras}", &extras_text)
                .replace("{all}", &all_text),
            time: minute_range(step.minutes[0], step.minutes[1]),
        })
        .collect();

    let min_total: u32 = template.steps.iter().map(|s| s.minutes[0]).sum();
    let max_total: u32 = template.steps.iter().map(|s| s.minutes[1]).sum();

    RenderedRecipe {
        title: template.name.clone(),
        ingredients,
        steps,
        total_time: minute_range(min_total, max_total),
        difficulty: difficulty_label(template.difficulty).to_string(),
        sides: template.sides.clone(),
    }
}

fn line(tag: &str, pantry: &Pantry, on_hand: bool) -> IngredientLine {
    let item = pantry.get(tag);
    IngredientLine {
        item: tag.to_string(),
        amount: item
            .and_then(|i| i.amount.clone())
            .unwrap_or_else(|| "to taste".to_string()),
        preparation: item.and_then(|i| i.preparation.clone()),
        on_hand,
    }
}

fn minute_range(min: u32, max: u32) -> String {
    if min == max {
        let unit = if min == 1 { "minute" } else { "minutes" };
        format!("{min} {unit}")
    } else {
        format!("{min}-{max} minutes")
    }
}

fn natural_join(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => (*one).to_string(),
        [rest @ .., last] => format!("{} and {last}", rest.join(", ")),
    }
}

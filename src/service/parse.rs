//! Parsing and enhancement of AI generator output.

use serde_json::Value;

use crate::types::{Meal, PlannedDay, TimeFrame, match_percentage, pantry_covers};
use crate::{LarderError, Result};

/// Parse meals from generator JSON.
///
/// Accepts `{"meals": [...]}`, `{"recipes": [...]}`, a bare array, or a single
/// meal object.
pub(crate) fn parse_meals(json: &str) -> Result<Vec<Meal>> {
    let value = parse_value(json)?;
    meals_from_value(value)
}

/// Parse a meal plan from generator JSON.
///
/// Accepts `{"days": [{"label", "meals", "totals"?}]}`; anything
/// [`parse_meals`] accepts is read as a single day.
pub(crate) fn parse_plan_days(json: &str, time_frame: TimeFrame) -> Result<Vec<PlannedDay>> {
    let mut value = parse_value(json)?;

    if let Some(days) = value.get_mut("days").map(Value::take) {
        let mut days: Vec<PlannedDay> = serde_json::from_value(days)
            .map_err(|e| LarderError::Parse(format!("invalid meal plan days: {e}")))?;
        for (idx, day) in days.iter_mut().enumerate() {
            if day.label.trim().is_empty() {
                day.label = default_label(time_frame, idx);
            }
        }
        return Ok(days);
    }

    Ok(vec![PlannedDay {
        label: default_label(time_frame, 0),
        meals: meals_from_value(value)?,
        totals: None,
    }])
}

fn parse_value(json: &str) -> Result<Value> {
    if json.trim().is_empty() {
        return Err(LarderError::EmptyResponse);
    }
    serde_json::from_str(json).map_err(|e| LarderError::Parse(e.to_string()))
}

fn meals_from_value(mut value: Value) -> Result<Vec<Meal>> {
    let list = ["meals", "recipes"]
        .iter()
        .find_map(|field| value.get_mut(*field).map(Value::take));

    let meals = match (list, value) {
        (Some(list), _) => serde_json::from_value(list),
        (None, array @ Value::Array(_)) => serde_json::from_value(array),
        (None, object @ Value::Object(_)) => serde_json::from_value(object).map(|m| vec![m]),
        (None, other) => {
            return Err(LarderError::Parse(format!(
                "expected a meal object or list, got {other}"
            )));
        }
    };
    meals.map_err(|e| LarderError::Parse(format!("invalid meal: {e}")))
}

fn default_label(time_frame: TimeFrame, idx: usize) -> String {
    match time_frame {
        TimeFrame::Day => "day".to_string(),
        TimeFrame::Week => format!("day {}", idx + 1),
    }
}

/// Tidy AI meals and annotate them with pantry coverage.
///
/// Trims text, drops blank ingredients and steps, derives calories from the
/// macros when the generator left them out, and sets `match_percentage`
/// when a pantry is known.
pub(crate) fn enhance_meals(meals: Vec<Meal>, pantry: &[String]) -> Vec<Meal> {
    meals
        .into_iter()
        .map(|mut meal| {
            meal.name = meal.name.trim().to_string();
            meal.description = meal.description.trim().to_string();
            meal.ingredients.retain(|i| !i.name.trim().is_empty());
            for ingredient in &mut meal.ingredients {
                ingredient.name = ingredient.name.trim().to_string();
            }
            meal.instructions = meal
                .instructions
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            if meal.nutrition.calories <= 0.0 {
                meal.nutrition.calories = meal.nutrition.calories_from_macros().round();
            }

            if !pantry.is_empty() && !meal.ingredients.is_empty() {
                let used = meal
                    .ingredients
                    .iter()
                    .filter(|i| pantry_covers(pantry, &i.name))
                    .count() as u32;
                let missed = meal.ingredients.len() as u32 - used;
                meal.match_percentage = Some(match_percentage(used, missed));
            }
            meal
        })
        .collect()
}

//! Prompts for the AI meal generator.
//!
//! The wording is deliberately plain; what matters is that the requested
//! JSON shape matches what [`parse`](super::parse) accepts.

use std::fmt::Write;

use crate::types::{FindRecipesRequest, MealPlanRequest, UserProfile};

const MEAL_SHAPE: &str = r#"{"name": string, "mealType": "breakfast"|"lunch"|"dinner"|"snack", "description": string, "ingredients": [{"name": string, "amount": number, "unit": string}], "instructions": [string], "nutrition": {"calories": number, "protein": number, "carbs": number, "fat": number}, "readyInMinutes": number, "servings": number}"#;

/// Prompt asking for recipes that use the given pantry ingredients.
pub(crate) fn recipes_prompt(request: &FindRecipesRequest) -> String {
    let ingredients = request.normalized_ingredients();
    let mut prompt = format!(
        "Suggest up to {} recipes that make the most of these pantry ingredients: {}.\n",
        request.number.clamp(1, 10),
        ingredients.join(", ")
    );
    if let Some(profile) = &request.profile {
        push_profile(&mut prompt, profile);
    }
    let _ = write!(
        prompt,
        "Respond with JSON of the form {{\"meals\": [MEAL, ...]}} where MEAL is {MEAL_SHAPE}."
    );
    prompt
}

/// Prompt asking for a day or week of meals.
pub(crate) fn meal_plan_prompt(request: &MealPlanRequest) -> String {
    let days = request.time_frame.days();
    let mut prompt = if days == 1 {
        "Create a one-day meal plan with breakfast, lunch and dinner.\n".to_string()
    } else {
        format!("Create a {days}-day meal plan with breakfast, lunch and dinner each day.\n")
    };
    if let Some(calories) = request.effective_target_calories() {
        let _ = writeln!(prompt, "Target about {calories} kcal per day.");
    }
    if let Some(diet) = request.effective_diet() {
        let _ = writeln!(prompt, "Diet: {diet}.");
    }
    let exclude = request.effective_exclude();
    if !exclude.is_empty() {
        let _ = writeln!(prompt, "Never use: {}.", exclude.join(", "));
    }
    if !request.pantry.is_empty() {
        let _ = writeln!(
            prompt,
            "Prefer these pantry ingredients: {}.",
            request.pantry.join(", ")
        );
    }
    if let Some(targets) = request.profile.as_ref().and_then(UserProfile::macro_targets) {
        let _ = writeln!(
            prompt,
            "Daily macro targets: {}g protein, {}g carbs, {}g fat.",
            targets.protein_g, targets.carbs_g, targets.fat_g
        );
    }
    let _ = write!(
        prompt,
        "Respond with JSON of the form {{\"days\": [{{\"label\": string, \"meals\": [MEAL, ...]}}]}} \
         with exactly {days} entries, where MEAL is {MEAL_SHAPE}."
    );
    prompt
}

fn push_profile(prompt: &mut String, profile: &UserProfile) {
    let restrictions = profile.normalized_restrictions();
    if !restrictions.is_empty() {
        let _ = writeln!(prompt, "Dietary restrictions: {}.", restrictions.join(", "));
    }
    let allergies = profile.normalized_allergies();
    if !allergies.is_empty() {
        let _ = writeln!(
            prompt,
            "Allergies (must not appear in any recipe): {}.",
            allergies.join(", ")
        );
    }
}

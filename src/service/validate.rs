//! Pluggable result validation.
//!
//! A validator is a predicate over a complete result set. Rejecting an API
//! result makes the orchestrator treat it as "no usable result" (and fall
//! back to the AI generator when allowed); rejecting an AI result is terminal.

use crate::types::{Meal, RecipeMatch, UserProfile, normalize_name};

/// Outcome of a validation check; `Err` carries the rejection reason.
pub type Verdict = std::result::Result<(), String>;

/// What the validator may check results against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub profile: Option<&'a UserProfile>,
    /// Ingredients the caller asked to leave out.
    pub exclude: &'a [String],
}

impl<'a> ValidationContext<'a> {
    pub fn new(profile: Option<&'a UserProfile>, exclude: &'a [String]) -> Self {
        Self { profile, exclude }
    }

    /// Allergies plus exclusions, normalised.
    pub fn forbidden_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = self
            .profile
            .map(|p| p.allergies.iter().map(|a| normalize_name(a)).collect())
            .unwrap_or_default();
        terms.extend(self.exclude.iter().map(|e| normalize_name(e)));
        terms.retain(|t| !t.is_empty());
        terms.sort();
        terms.dedup();
        terms
    }
}

/// Predicate applied to results before they are cached.
pub trait ResultValidator: Send + Sync {
    fn validate_recipes(&self, _recipes: &[RecipeMatch], _ctx: &ValidationContext<'_>) -> Verdict {
        Ok(())
    }

    fn validate_meals(&self, _meals: &[Meal], _ctx: &ValidationContext<'_>) -> Verdict {
        Ok(())
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ResultValidator for AcceptAll {}

/// Rejects results whose name or ingredients mention an allergen or excluded
/// ingredient, and meals without a name.
///
/// Terms match whole words, so "oat" flags "rolled oats" but not "coat", and
/// a trailing plural "s" or "es" on the text side is tolerated.
#[derive(Debug, Clone, Copy, Default)]
pub struct DietaryValidator;

impl ResultValidator for DietaryValidator {
    fn validate_recipes(&self, recipes: &[RecipeMatch], ctx: &ValidationContext<'_>) -> Verdict {
        let forbidden = ctx.forbidden_terms();
        for recipe in recipes {
            if let Some(term) = first_forbidden(recipe.dietary_fields(), &forbidden) {
                return Err(format!("recipe '{}' contains '{term}'", recipe.title));
            }
        }
        Ok(())
    }

    fn validate_meals(&self, meals: &[Meal], ctx: &ValidationContext<'_>) -> Verdict {
        let forbidden = ctx.forbidden_terms();
        for meal in meals {
            if meal.name.trim().is_empty() {
                return Err("meal without a name".to_string());
            }
            if let Some(term) = first_forbidden(meal.dietary_fields(), &forbidden) {
                return Err(format!("meal '{}' contains '{term}'", meal.name));
            }
        }
        Ok(())
    }
}

fn first_forbidden<'f, 't>(
    fields: impl Iterator<Item = &'f str>,
    forbidden: &'t [String],
) -> Option<&'t str> {
    let fields: Vec<Vec<String>> = fields.map(words).collect();
    forbidden
        .iter()
        .find(|term| {
            let term = words(term);
            !term.is_empty() && fields.iter().any(|field| contains_phrase(field, &term))
        })
        .map(String::as_str)
}

/// Lowercased alphanumeric words.
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `phrase` occurs as consecutive words of `field`.
fn contains_phrase(field: &[String], phrase: &[String]) -> bool {
    field
        .windows(phrase.len())
        .any(|window| window.iter().zip(phrase).all(|(w, p)| word_matches(w, p)))
}

fn word_matches(word: &str, term: &str) -> bool {
    match word.strip_prefix(term) {
        Some(rest) => rest.is_empty() || rest == "s" || rest == "es",
        None => false,
    }
}

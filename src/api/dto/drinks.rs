/*
 * Responsibility
 * - Drinks の request/response DTO
 * - summary (id, title) と detail (id, title, recipe) の2つの射影
 * - validation (形式チェック) 用の validate()
 */
use serde::{Deserialize, Serialize};

use crate::repos::{Drink, Ingredient, NewDrink};

pub const TITLE_MAX_CHARS: usize = 80;

/// A recipe may be sent as a list of ingredients or as a single ingredient object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    fn as_slice(&self) -> &[Ingredient] {
        match self {
            RecipeInput::Many(v) => v,
            RecipeInput::One(i) => std::slice::from_ref(i),
        }
    }

    fn into_vec(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(v) => v,
            RecipeInput::One(i) => vec![i],
        }
    }
}

fn validate_title(title: &str) -> Result<(), &'static str> {
    let title = title.trim();
    if title.is_empty() {
        return Err("title cannot be empty");
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err("title must be <= 80 chars");
    }
    Ok(())
}

fn validate_recipe(recipe: &RecipeInput) -> Result<(), &'static str> {
    let ingredients = recipe.as_slice();
    if ingredients.is_empty() {
        return Err("recipe needs at least one ingredient");
    }
    for ingredient in ingredients {
        if ingredient.name.trim().is_empty() {
            return Err("ingredient name cannot be empty");
        }
        if ingredient.parts == 0 {
            return Err("ingredient parts must be positive");
        }
    }
    Ok(())
}

// Fields are optional at the serde level so a missing field is a 400 with our own
// message rather than a deserializer error.
#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let Some(title) = &self.title else {
            return Err("title is required");
        };
        let Some(recipe) = &self.recipe else {
            return Err("recipe is required");
        };
        validate_title(title)?;
        validate_recipe(recipe)
    }

    pub fn into_new_drink(self) -> Result<NewDrink, &'static str> {
        self.validate()?;
        match (self.title, self.recipe) {
            (Some(title), Some(recipe)) => Ok(NewDrink {
                title: title.trim().to_string(),
                recipe: recipe.into_vec(),
            }),
            _ => Err("title and recipe are required"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(recipe) = &self.recipe {
            validate_recipe(recipe)?;
        }
        Ok(())
    }

    /// Partial update: only the fields present in the request replace stored ones.
    pub fn apply_to(self, mut drink: Drink) -> Drink {
        if let Some(title) = self.title {
            drink.title = title.trim().to_string();
        }
        if let Some(recipe) = self.recipe {
            drink.recipe = recipe.into_vec();
        }
        drink
    }
}

#[derive(Debug, Serialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<Drink> for DrinkSummary {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
        }
    }
}

impl From<Drink> for DrinkDetail {
    fn from(d: Drink) -> Self {
        Self {
            id: d.id,
            title: d.title,
            recipe: d.recipe,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i64,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn create(v: serde_json::Value) -> CreateDrinkRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn create_requires_title_and_recipe() {
        assert_eq!(
            create(json!({"recipe": [{"name": "water", "color": "blue", "parts": 1}]})).validate(),
            Err("title is required")
        );
        assert_eq!(
            create(json!({"title": "Water"})).validate(),
            Err("recipe is required")
        );
        assert_eq!(
            create(json!({"title": "  ", "recipe": [{"name": "water", "color": "blue", "parts": 1}]}))
                .validate(),
            Err("title cannot be empty")
        );
        assert_eq!(
            create(json!({"title": "Water", "recipe": []})).validate(),
            Err("recipe needs at least one ingredient")
        );
    }

    #[test]
    fn single_ingredient_object_is_a_one_item_recipe() {
        let drink = create(json!({
            "title": " Water ",
            "recipe": {"name": "water", "color": "blue", "parts": 1}
        }))
        .into_new_drink()
        .unwrap();

        assert_eq!(drink.title, "Water");
        assert_eq!(
            drink.recipe,
            vec![Ingredient {
                name: "water".into(),
                color: "blue".into(),
                parts: 1
            }]
        );
    }

    #[test]
    fn long_titles_are_rejected() {
        let long = "x".repeat(TITLE_MAX_CHARS + 1);
        let req = create(json!({"title": long, "recipe": [{"name": "a", "color": "b", "parts": 1}]}));
        assert_eq!(req.validate(), Err("title must be <= 80 chars"));
    }

    #[test]
    fn update_keeps_absent_fields() {
        let before = Drink {
            id: 7,
            title: "Water".into(),
            recipe: vec![Ingredient {
                name: "water".into(),
                color: "blue".into(),
                parts: 1,
            }],
        };
        let req: UpdateDrinkRequest = serde_json::from_value(json!({"title": "Lemonade"})).unwrap();
        assert_eq!(req.validate(), Ok(()));

        let after = req.apply_to(before.clone());
        assert_eq!(after.id, 7);
        assert_eq!(after.title, "Lemonade");
        assert_eq!(after.recipe, before.recipe);
    }

    #[test]
    fn summary_has_no_recipe() {
        let drink = Drink {
            id: 1,
            title: "Water".into(),
            recipe: vec![],
        };
        let v = serde_json::to_value(DrinkSummary::from(drink)).unwrap();
        assert_eq!(v, json!({"id": 1, "title": "Water"}));
    }
}

/*
 * Responsibility
 * - Drink の型と、ストレージに求める契約 (DrinkRepo)
 * - 実装は postgres / memory
 */
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::repos::error::RepoError;

/// Strictly `{name, color, parts}`; any other key makes the recipe unreadable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// A drink that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Storage operations the handlers rely on.
///
/// Titles are unique; a clash is reported as `RepoError::Conflict`.
#[async_trait]
pub trait DrinkRepo: Send + Sync + std::fmt::Debug {
    async fn find_all(&self) -> Result<Vec<Drink>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, RepoError>;

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepoError>;

    /// Overwrites title and recipe of `drink.id`. `RepoError::NotFound` if it is gone.
    async fn update(&self, drink: Drink) -> Result<Drink, RepoError>;

    /// Removes exactly the rows with this id and returns how many there were.
    async fn delete_by_id(&self, id: i64) -> Result<u64, RepoError>;
}

//! Process-local `DrinkRepo`, used when no database is configured and in tests.
//! Same observable rules as the Postgres table: increasing ids, unique titles.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::repos::{
    drink_repo::{Drink, DrinkRepo, NewDrink},
    error::RepoError,
};

#[derive(Debug, Default)]
pub struct MemoryDrinkRepo {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    drinks: BTreeMap<i64, Drink>,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

impl MemoryDrinkRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkRepo for MemoryDrinkRepo {
    async fn find_all(&self) -> Result<Vec<Drink>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.drinks.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, RepoError> {
        let inner = self.inner.read().await;
        Ok(inner.drinks.get(&id).cloned())
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepoError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(&drink.title, None) {
            return Err(RepoError::Conflict);
        }

        inner.last_id += 1;
        let stored = Drink {
            id: inner.last_id,
            title: drink.title,
            recipe: drink.recipe,
        };
        inner.drinks.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update(&self, drink: Drink) -> Result<Drink, RepoError> {
        let mut inner = self.inner.write().await;
        if !inner.drinks.contains_key(&drink.id) {
            return Err(RepoError::NotFound);
        }
        if inner.title_taken(&drink.title, Some(drink.id)) {
            return Err(RepoError::Conflict);
        }

        inner.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, RepoError> {
        let mut inner = self.inner.write().await;
        Ok(u64::from(inner.drinks.remove(&id).is_some()))
    }
}

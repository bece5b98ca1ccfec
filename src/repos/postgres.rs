/*
 * Responsibility
 * - drinks テーブル向け SQLx 操作
 * - recipe は JSON 文字列として保存し、読み出し時に復元する
 * - テーブルの作成は setup-db が行う (ここでは存在を前提とする)
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};

use crate::repos::{
    drink_repo::{Drink, DrinkRepo, NewDrink},
    error::RepoError,
};

#[derive(Debug, FromRow)]
struct DrinkRow {
    id: i64,
    title: String,
    recipe: String,
}

impl TryFrom<DrinkRow> for Drink {
    type Error = RepoError;

    fn try_from(row: DrinkRow) -> Result<Self, Self::Error> {
        Ok(Drink {
            id: row.id,
            title: row.title,
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PgDrinkRepo {
    pool: PgPool,
}

impl PgDrinkRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, RepoError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl DrinkRepo for PgDrinkRepo {
    async fn find_all(&self) -> Result<Vec<Drink>, RepoError> {
        let rows = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut drinks = Vec::with_capacity(rows.len());
        for row in rows {
            drinks.push(Drink::try_from(row)?);
        }

        Ok(drinks)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, RepoError> {
        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            SELECT id, title, recipe
            FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Drink::try_from).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, RepoError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            INSERT INTO drinks (title, recipe)
            VALUES ($1, $2)
            RETURNING id, title, recipe
            "#,
        )
        .bind(&drink.title)
        .bind(recipe)
        .fetch_one(&self.pool)
        .await?;

        Drink::try_from(row)
    }

    async fn update(&self, drink: Drink) -> Result<Drink, RepoError> {
        let recipe = serde_json::to_string(&drink.recipe)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            r#"
            UPDATE drinks
            SET
                title = $2,
                recipe = $3
            WHERE id = $1
            RETURNING id, title, recipe
            "#,
        )
        .bind(drink.id)
        .bind(&drink.title)
        .bind(recipe)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepoError::NotFound)?;

        Drink::try_from(row)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, RepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM drinks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

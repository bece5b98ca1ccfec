/*
 * Responsibility
 * - setup-db: デプロイ時にだけ実行するストレージ準備
 *   - --reset: drinks テーブルと migration 履歴を削除
 *   - migrations/ を適用
 *   - --seed: サンプルの drink を1件入れる
 * - serve 側からは呼ばない
 */
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;

use crate::{
    cli::SetupDbArgs,
    config::Config,
    repos::{DrinkRepo, Ingredient, NewDrink, PgDrinkRepo, RepoError},
};

pub async fn run(args: SetupDbArgs) -> Result<()> {
    let database_url = Config::database_url_from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    if args.reset {
        tracing::warn!("dropping drinks table");
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
            .execute(&pool)
            .await?;
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to apply migrations")?;
    tracing::info!("migrations applied");

    if args.seed {
        let repo = PgDrinkRepo::new(pool);
        match repo.insert(sample_drink()).await {
            Ok(drink) => tracing::info!(drink_id = drink.id, "seeded sample drink"),
            Err(RepoError::Conflict) => tracing::info!("sample drink already present"),
            Err(err) => return Err(err).context("failed to seed sample drink"),
        }
    }

    Ok(())
}

fn sample_drink() -> NewDrink {
    NewDrink {
        title: "water".to_string(),
        recipe: vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1,
        }],
    }
}

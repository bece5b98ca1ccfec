/*
 * Responsibility
 * - /drinks 系 handler
 * - 認可は routes 側の guard が済ませている (ここに届いた時点で scope は確認済み)
 * - handler は AuthCtx を受け取り、DTO validation → repo 呼び出し → 射影
 */
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::{
    api::{
        dto::drinks::{
            CreateDrinkRequest, DeletedResponse, DrinkDetail, DrinkSummary, DrinksResponse,
            UpdateDrinkRequest,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkSummary>>, AppError> {
    let drinks = state.drinks.find_all().await?;
    let res = drinks.into_iter().map(DrinkSummary::from).collect();

    Ok(Json(DrinksResponse::new(res)))
}

pub async fn list_drinks_detail(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let drinks = state.drinks.find_all().await?;
    tracing::debug!(
        subject = %ctx.subject,
        permissions = ?ctx.permissions,
        count = drinks.len(),
        "listing drink details"
    );

    let res = drinks.into_iter().map(DrinkDetail::from).collect();
    Ok(Json(DrinksResponse::new(res)))
}

pub async fn create_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    body: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let Json(req) = body?;
    let new_drink = req.into_new_drink().map_err(AppError::Validation)?;

    let drink = state.drinks.insert(new_drink).await?;
    tracing::info!(subject = %ctx.subject, jti = ?ctx.jti, drink_id = drink.id, "drink created");

    Ok(Json(DrinksResponse::new(vec![DrinkDetail::from(drink)])))
}

pub async fn update_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    drink_id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse<DrinkDetail>>, AppError> {
    let Path(drink_id) = drink_id?;
    let Json(req) = body?;

    let current = state
        .drinks
        .find_by_id(drink_id)
        .await?
        .ok_or(AppError::not_found("drink"))?;

    req.validate().map_err(AppError::Validation)?;

    let drink = state.drinks.update(req.apply_to(current)).await?;
    tracing::info!(subject = %ctx.subject, jti = ?ctx.jti, drink_id, "drink updated");

    Ok(Json(DrinksResponse::new(vec![DrinkDetail::from(drink)])))
}

pub async fn delete_drink(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    drink_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, AppError> {
    let Path(drink_id) = drink_id?;

    state
        .drinks
        .find_by_id(drink_id)
        .await?
        .ok_or(AppError::not_found("drink"))?;

    let deleted = state.drinks.delete_by_id(drink_id).await?;
    if deleted == 0 {
        // Removed by someone else between the lookup and the delete.
        return Err(AppError::not_found("drink"));
    }
    tracing::info!(subject = %ctx.subject, jti = ?ctx.jti, drink_id, "drink deleted");

    Ok(Json(DeletedResponse {
        success: true,
        deleted: drink_id,
    }))
}

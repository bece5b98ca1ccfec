/*
 * Responsibility
 * - URL 構造と、route ごとに必要な scope を定義
 * - guard は route ごとに明示的に掛ける (GET /drinks と /health は public)
 * - 404 / 405 も統一エラー形式で返す
 * - body 上限 (1 MiB) は extractor 側で判定させ、413 も統一エラー形式にする
 */
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::error::{method_not_allowed_fallback, not_found_fallback};
use crate::middleware::auth::guard;
use crate::services::auth::Permission;
use crate::state::AppState;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/drinks",
            get(list_drinks).merge(guard::require(
                Permission::PostDrinks,
                &state,
                post(create_drink),
            )),
        )
        .route(
            "/drinks-detail",
            guard::require(Permission::GetDrinksDetail, &state, get(list_drinks_detail)),
        )
        .route(
            "/drinks/{drink_id}",
            guard::require(Permission::PatchDrinks, &state, patch(update_drink)).merge(
                guard::require(Permission::DeleteDrinks, &state, delete(delete_drink)),
            ),
        )
        .fallback(not_found_fallback)
        .method_not_allowed_fallback(method_not_allowed_fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

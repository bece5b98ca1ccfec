//! Scope guard: access token 検証 → scope 確認 → AuthCtx を extensions に入れる
//!
//! Route ごとに必要な `Permission` を1つ決めて `require` で包む。
//! 検証/確認に失敗した場合は handler を呼ばずにそのまま AppError を返す。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, AuthService, ClaimSet, Permission, permission};
use crate::state::AppState;

#[derive(Clone)]
struct Guard {
    auth: Arc<AuthService>,
    permission: Permission,
}

/// Wrap `route` so it only runs for tokens granting `permission`.
///
/// 例：
/// ```ignore
/// .route("/drinks-detail", guard::require(Permission::GetDrinksDetail, &state, get(list_drinks_detail)))
/// ```
pub fn require(
    permission: Permission,
    state: &AppState,
    route: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let guard = Guard {
        auth: state.auth.clone(),
        permission,
    };
    // route_layer: 存在する method にだけ掛かる (405/404 は guard を通らない)
    route.route_layer(middleware::from_fn_with_state(guard, guard_middleware))
}

/// Verify the bearer token in `headers` and check it grants `permission`.
pub async fn authorize(
    auth: &AuthService,
    headers: &HeaderMap,
    permission: Permission,
) -> Result<ClaimSet, AuthError> {
    let raw = match headers.get(header::AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| AuthError::InvalidHeader)?),
        None => None,
    };

    let claims = auth.verify(raw).await?;
    permission::check(&claims, permission)?;

    Ok(claims)
}

async fn guard_middleware(
    State(guard): State<Guard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let claims = match authorize(&guard.auth, req.headers(), guard.permission).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                kind = err.kind(),
                permission = %guard.permission,
                method = %req.method(),
                path = %req.uri().path(),
                "request rejected by auth guard"
            );
            return Err(AppError::Auth(err));
        }
    };

    tracing::debug!(subject = %claims.subject, permission = %guard.permission, "authorized");

    // guard → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(claims));

    Ok(next.run(req).await)
}

/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::guard (scope 判定), cors, http (request-id / trace / limit / timeout / panic)
 */
pub mod auth;
pub mod cors;
pub mod http;

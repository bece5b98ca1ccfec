/*
 * Responsibility
 * - Handler から見える「認可済みコンテキスト」の型
 * - guard が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは services 側、scope の判定は guard の責務
 */
use std::collections::BTreeSet;

use crate::services::auth::ClaimSet;

/// 認可済みのリクエストに付与されるコンテキスト
///
/// - `subject` は token の `sub`
/// - `permissions` は token が持っていた scope 全体 (guard は必要な1つだけを確認済み)
/// - `jti` は監査/相関用
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub subject: String,
    pub permissions: BTreeSet<String>,
    pub jti: Option<String>,
}

impl From<ClaimSet> for AuthCtx {
    fn from(claims: ClaimSet) -> Self {
        Self {
            subject: claims.subject,
            permissions: claims.permissions,
            jti: claims.jti,
        }
    }
}

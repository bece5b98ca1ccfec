/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - drinks: ストレージ (Postgres / memory), auth: AuthService (検証鍵を保持)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::{repos::DrinkRepo, services::auth::AuthService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepo>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkRepo>, auth: Arc<AuthService>) -> Self {
        Self { drinks, auth }
    }
}

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::JwtConfig, db::OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(orm: OrmConn, jwt: JwtConfig) -> Self {
        Self {
            orm,
            jwt: Arc::new(jwt),
        }
    }
}

impl FromRef<AppState> for Arc<JwtConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

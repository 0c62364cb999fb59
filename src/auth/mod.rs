use crate::state::AppState;
use axum::Router;

mod claims;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
mod repo_types;
pub mod reset;

pub use extractors::{authorize, CurrentUser};
pub use repo_types::{Role, User};

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

use axum::{
    extract::{Extension, Query},
    response::Html,
};
use minijinja::context;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    gate::Unauthenticated,
    web::pages::{PageError, Pages},
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    registered: Option<String>,
}

pub async fn login(
    _guard: Unauthenticated,
    Query(query): Query<LoginQuery>,
    pages: Extension<Arc<Pages>>,
) -> Result<Html<String>, PageError> {
    let registered = query.registered.as_deref() == Some("1");
    pages.render("login.html", context! { registered })
}

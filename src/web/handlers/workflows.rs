use axum::{extract::Extension, response::Html};
use minijinja::context;
use std::sync::Arc;

use crate::{
    gate::Authenticated,
    web::pages::{PageError, Pages},
};

pub async fn workflows(
    Authenticated(session): Authenticated,
    pages: Extension<Arc<Pages>>,
) -> Result<Html<String>, PageError> {
    pages.render(
        "workflows.html",
        context! { user => session.display_name() },
    )
}

//! Server-rendered pages. Templates are compiled into the binary and every
//! interpolated value is HTML-escaped by `minijinja` (auto-escape on `.html`).

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::{Environment, Value};
use thiserror::Error;
use tracing::error;

const TEMPLATES: [(&str, &str); 4] = [
    ("layout.html", include_str!("templates/layout.html")),
    ("login.html", include_str!("templates/login.html")),
    ("register.html", include_str!("templates/register.html")),
    ("workflows.html", include_str!("templates/workflows.html")),
];

#[derive(Debug, Error)]
#[error("failed to render {name}: {source}")]
pub struct PageError {
    name: String,
    #[source]
    source: minijinja::Error,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!("{self}");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

#[derive(Debug)]
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile all page templates.
    ///
    /// # Errors
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Lenient);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render a page template with the given context.
    ///
    /// # Errors
    /// Returns `PageError` if the template is missing or rendering fails.
    pub fn render(&self, name: &str, context: Value) -> Result<Html<String>, PageError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(context))
            .map(Html)
            .map_err(|source| PageError {
                name: name.to_string(),
                source,
            })
    }
}

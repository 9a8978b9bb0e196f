//! Wire types for the Better Auth compatible HTTP API. Sign-up bodies carry a
//! plaintext password and must never be logged.

use serde::{Deserialize, Serialize};

use super::Session;

#[derive(Debug, Deserialize)]
pub(super) struct SessionEnvelope {
    session: SessionPayload,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionPayload {
    id: String,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl From<SessionEnvelope> for Session {
    fn from(envelope: SessionEnvelope) -> Self {
        let SessionEnvelope { session, user } = envelope;
        Self {
            id: session.id,
            user_id: session.user_id.unwrap_or(user.id),
            email: user.email,
            name: user.name,
            expires_at: session.expires_at,
        }
    }
}

#[derive(Serialize)]
pub(super) struct SignUpBody<'a> {
    pub(super) name: &'a str,
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: Option<String>,
    #[serde(default)]
    pub(super) code: Option<String>,
}

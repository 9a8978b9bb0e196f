use crate::gate::{Redirect, WORKFLOWS_PATH};

// The workflows page applies its own gate, so visitors land on `/login` from there.
pub async fn root() -> Redirect {
    Redirect::to(WORKFLOWS_PATH)
}

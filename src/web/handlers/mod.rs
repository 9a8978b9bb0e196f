//! Page and status handlers. Page handlers declare their gate through the
//! `Authenticated` / `Unauthenticated` extractors.

pub mod health;
pub mod login;
pub mod register;
pub mod root;
pub mod workflows;

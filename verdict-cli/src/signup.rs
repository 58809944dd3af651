//! Sign-up form used by the demo.

use std::time::Duration;

use serde::Serialize;
use verdict::prelude::*;

/// Addresses the fake registry treats as taken.
const TAKEN: &[&str] = &["ada@example.com", "admin@example.com"];

#[derive(Debug, Clone, Default, Serialize, Record)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
    #[record(rename = "confirm")]
    pub password_confirmation: String,
    pub accept: bool,
}

/// Pretends to ask a server whether `email` is registered.
async fn is_registered(email: String) -> bool {
    tokio::time::sleep(Duration::from_millis(200)).await;
    TAKEN.contains(&email.as_str())
}

pub fn schema() -> Schema<Signup> {
    Schema::new()
        .field(
            "name",
            |s: &Signup| s.name.clone(),
            |b| b.has_min_length(2).and(b.is_alphanumeric()),
        )
        .field(
            "email",
            |s: &Signup| s.email.clone(),
            |b| {
                let taken = b.from_promise(|email: String, _| async move {
                    if is_registered(email.clone()).await {
                        Outcome::failed("taken", data! { "given" => email })
                    } else {
                        Outcome::Passed
                    }
                });
                b.is_required().and(b.is_email()).to_async().and(taken)
            },
        )
        .field(
            "password",
            |s: &Signup| s.password.clone(),
            |b| b.has_min_length(8),
        )
        .field(
            "confirm",
            |s: &Signup| s.password_confirmation.clone(),
            |b| b.equal_to("password"),
        )
        .field("accept", |s: &Signup| s.accept, |b| b.is(true))
}

use serde::Serialize;
use serde_json::json;
use verdict::{Builder, Record, Schema, Validator};

#[derive(Clone, Serialize, Record)]
struct Signup {
    name: String,
    password: String,
    #[record(rename = "confirm")]
    password_confirmation: String,
    #[record(skip)]
    #[allow(dead_code)]
    session: u64,
    tags: Vec<String>,
}

fn signup(password: &str, confirm: &str) -> Signup {
    Signup {
        name: "Ada".into(),
        password: password.into(),
        password_confirmation: confirm.into(),
        session: 42,
        tags: vec!["beta".into()],
    }
}

#[test]
fn test_fields_are_exposed() {
    let record = signup("hunter2", "hunter2");

    assert_eq!(record.get("name"), Some(json!("Ada")));
    assert_eq!(record.get("tags"), Some(json!(["beta"])));
}

#[test]
fn test_rename_and_skip() {
    let record = signup("hunter2", "hunter2");

    assert_eq!(record.get("confirm"), Some(json!("hunter2")));
    assert_eq!(record.get("password_confirmation"), None);
    assert_eq!(record.get("session"), None);
    assert_eq!(record.get("missing"), None);
}

#[test]
fn test_equal_to_reads_derived_sibling() {
    let schema = Schema::<Signup>::new().field(
        "confirm",
        |s| s.password_confirmation.clone(),
        |b: Builder<Signup, String>| b.equal_to("password"),
    );
    let validator = Validator::new(schema);

    assert!(validator.validate(&signup("hunter2", "hunter2")).passed("confirm"));

    let mismatch = validator.validate(&signup("hunter2", "hunter3"));
    let failure = mismatch.failure("confirm").unwrap();
    assert_eq!(failure.rule(), "equal_to");
    assert_eq!(failure.get("expected"), Some(&json!("hunter2")));
}

#[test]
fn test_keyed_field_through_derive() {
    let schema = Schema::<Signup>::new().keyed("name", |b: Builder<Signup, String>| b.has_min_length(4));
    let validator = Validator::new(schema).validate(&signup("a", "a"));

    assert_eq!(validator.failure("name").unwrap().get("length"), Some(&json!(3)));
}

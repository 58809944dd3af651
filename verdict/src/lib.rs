//! Declarative, incremental validation for structured records
//!
//! A [`Schema`] maps field names to rules built from a closed catalog of
//! primitives. A [`Validator`] holds one immutable state snapshot per field;
//! synchronous rules resolve in place, asynchronous and debounced ones are
//! queued as jobs that a [`Driver`] starts and folds back on each tick.

extern crate self as verdict;

pub mod builder;
pub mod error;
pub mod field;
pub mod message;
pub mod outcome;
pub mod record;
pub mod rule;

mod config;
mod driver;
mod schema;
mod validator;

pub use builder::Builder;
pub use config::*;
pub use driver::{Driver, Patch, SETTLE_POLL};
pub use field::{FieldState, JobId, Jobs, Kind, Status};
pub use message::{Lookup, MessageCatalog, MessageOptions};
pub use outcome::{Data, Failure, NAME_KEY, Outcome};
pub use record::{Record, field_value};
pub use rule::{AsyncRule, BoxFuture, Checked, Rule, SyncRule};
pub use schema::{FieldRule, Schema};
pub use validator::{Summary, ValidateRequest, Validator};

pub use verdict_derive::Record;

pub mod prelude {
    pub use crate::builder::Builder;
    pub use crate::config::{CancelPolicy, ValidatorConfig};
    pub use crate::driver::Driver;
    pub use crate::field::Kind;
    pub use crate::message::{Lookup, MessageCatalog, MessageOptions};
    pub use crate::outcome::{Failure, Outcome};
    pub use crate::record::Record;
    pub use crate::schema::Schema;
    pub use crate::validator::{ValidateRequest, Validator};

    pub use crate::data;
    pub use verdict_derive::Record;
}

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{Value, to_value};
}

//! lodgekit
//!
//! The data-access and input-validation core of a small hotel-booking site.
//! Two independently usable pieces: a declarative field validator that turns
//! per-field rules into a map of human-readable error messages, and a query
//! layer that runs every SQL statement as a prepared statement with
//! positionally bound, explicitly typed values.
//!
//! Page controllers sanitize raw input, build field specs, call the
//! [`Validator`], and on a clean pass hand SQL plus bound values to the
//! [`QueryExecutor`].

pub mod config;
pub mod db;
pub mod validation;

pub use config::{ErrorMessages, ValidationConfig, DEFAULT_CONFIG, DEFAULT_DATE_FORMAT};
pub use db::{connect, init_schema, BoundQuery, QueryError, QueryExecutor, Row, SqlValue};
pub use validation::{
    is_valid_email, sanitize, sanitize_all, strip_markup, ErrorMap, FieldRule, FieldSpec,
    SanitizeFilter, ValidationOutcome, Validator,
};

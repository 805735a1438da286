//! Spreadsheet question import: parse, validate, translate, persist.

pub mod answer_key;
pub mod error;
pub mod parser;
pub mod persist;
pub mod row;
pub mod validator;

pub use error::ImportError;

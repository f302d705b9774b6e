//! Substitution of delimited placeholder names in query templates.
//!
//! This is plain text substitution: the template is never parsed as SQL.

pub mod template;

pub use template::{resolve, Segment, Template};

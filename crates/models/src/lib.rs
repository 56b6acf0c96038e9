//! Domain-side helpers: entity descriptors for log correlation and input
//! validation for forms.

pub mod entity;
pub mod validation;

pub use entity::{derive_label, Entity, EntityType, ParentRef};
pub use validation::{validate_alnum, validate_float, AlnumRules, Validator};

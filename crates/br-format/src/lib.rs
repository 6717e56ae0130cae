//! Formatting and validation for Brazilian onboarding fields.
//!
//! All functions are pure and total: they accept any string and never fail.

mod national_id;
mod phone;
mod text;

pub use national_id::*;
pub use phone::*;
pub use text::*;

pub mod category;
pub mod contact;
pub mod estimate;
pub mod extension;
pub mod labor;
pub mod pricing;
pub mod product;
pub mod project;
pub mod supplier;
pub mod user;

use std::str::FromStr;

use crate::error::AppError;

/// Parses a path segment such as a category kind or level.
pub(crate) fn parse_segment<T: FromStr<Err = String>>(raw: &str) -> Result<T, AppError> {
    raw.parse().map_err(AppError::validation)
}

pub mod category;
pub mod contact;
pub mod estimate;
pub mod extension;
pub mod labor;
pub mod pricing;
pub mod product;
pub mod project;
pub mod response;
pub mod supplier;
pub mod user;

pub mod category;
pub mod contact;
pub mod estimate;
pub mod labor;
pub mod payment_schedule;
pub mod pricing;
pub mod product;
pub mod project;
pub mod supplier;
pub mod user;

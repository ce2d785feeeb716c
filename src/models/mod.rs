pub mod admin;
pub mod lead;
pub mod product;

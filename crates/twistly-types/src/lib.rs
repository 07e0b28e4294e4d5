pub mod identity;
pub mod models;

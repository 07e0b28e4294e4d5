pub mod app;
pub mod auth;
pub mod feed;
pub mod messaging;
pub mod upload;

pub use app::App;

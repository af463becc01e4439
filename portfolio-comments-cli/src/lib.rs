#![warn(rust_2018_idioms)]

pub mod error;
pub mod render;
pub mod text;
pub mod theme;
pub mod util;

/// Address of a locally running development server. Used as the default base URL
pub const DEV_SERVER_URL: &str = "http://localhost:8080/";

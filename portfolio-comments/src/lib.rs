#![warn(rust_2018_idioms)]

//! # Portfolio comments client
//!
//! ## What
//!
//! An asynchronous client for the comments section of a personal portfolio site, and the
//! view logic that goes with it. The backend owns storage, authentication and business
//! rules; this crate only talks to it and renders what it returns.
//!
//! The crate allows the following to be performed:
//!
//! * Fetch a page of comments and render it
//! * Resolve whether the viewer is logged in, and where to log in or out
//! * Delete a single comment by identifier, or every comment of a page
//! * Resolve the one-time upload URL a new comment with an image is posted to
//! * Submit a new comment
//!
//! ## How
//!
//! [`Client`] speaks HTTP to the backend and implements [`Backend`]. A [`Controller`] drives
//! a `Backend` and keeps a [`PageView`](render::PageView) up to date. Rendering lives in
//! [`render`] and is pure, so it can be used without a network at all:
//!
//! ```
//! use portfolio_comments::models::Comment;
//! use portfolio_comments::render;
//!
//! let json = r#"[{"userName": "Ada", "content": "Hi", "date": "2020-06-10T15:04:05Z",
//!                "emotion": "sad", "isAbleToDelete": false}]"#;
//! let comments: Vec<Comment> = serde_json::from_str(json).unwrap();
//! let items = render::render_comments(&comments);
//!
//! assert_eq!(items[0].date, "6/10/2020");
//! assert!(items[0].delete.is_none());
//! ```
//!
//! Check out the `comments` binary in `portfolio-comments-cli` for sample usage of the
//! controller.

pub mod backend;
pub mod client;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;

pub use backend::Backend;
pub use client::Client;
pub use controller::Controller;
pub use error::Error;
pub use url;

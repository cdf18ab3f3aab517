//! # API Module
//!
//! HTTP handlers served by the local redirect catcher.
//!
//! Only one endpoint exists: [`callback`], mounted at `/`, which receives the
//! Spotify authorization redirect (`http://localhost:9292/?code=..&state=..`
//! or `?error=..`). It hands the decoded parameters to the waiting
//! authorization flow through a single-slot channel and answers the browser
//! with a small HTML page telling the user the window can be closed.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use lastospot::api::{CallbackSlot, callback};
//!
//! let (slot, result) = CallbackSlot::new(false);
//! let app = Router::new().route("/", get(callback).layer(Extension(slot)));
//! ```

mod callback;

pub use callback::{CallbackSlot, callback, render_page};

//! # plainwiki
//!
//! A minimal personal wiki. Pages are plain-text files on disk, one per title, edited and viewed
//! over a handful of HTTP routes. The only markup is the link token: `[PageName]` in a page body
//! becomes a link to that page.
//!
//! ## Architecture
//!
//! - **[`store`]**: [`store::PageStore`] maps a validated [`title::PageTitle`] to
//!   `<root>/<title>.txt` and loads or saves whole bodies.
//! - **[`links`]**: [`links::LinkRenderer`] rewrites `[Title]` tokens into links.
//! - **[`template`]**: compiled HTML templates that escape everything they substitute.
//! - **[`render`]**: [`render::PageRenderer`] composes the two: escape first, then inject links.
//! - **[`server`]** (feature `service`): the axum routes around all of the above.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use plainwiki::{links::LinkRenderer, page::Page, render::PageRenderer, store::PageStore,
//!     template::Templates};
//!
//! fn main() -> Result<(), plainwiki::WikiError> {
//!     let store = PageStore::ensure_root("./data")?;
//!     store.save(&Page::new("FrontPage".parse()?, "Welcome! See [OtherPage]."))?;
//!
//!     let renderer = PageRenderer::new(Templates::builtin()?, LinkRenderer::default());
//!     let html = renderer.view(&store.load("FrontPage")?)?;
//!     assert!(html.contains("<a href=\"/view/OtherPage\">OtherPage</a>"));
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: `service`
//! - **service**: HTTP routes (`axum`, `tower-http`)
//! - **bin**: the `wiki` command line

pub mod config;
pub mod error;
pub mod links;
pub mod page;
pub mod render;
#[cfg(feature = "service")]
pub mod server;
pub mod store;
pub mod template;
pub mod title;

pub use error::*;

//! A small virtual DOM engine.
//!
//! [`VNode`] trees are materialized into a live document through the [`Dom`] trait, then brought up to date with
//! [`Renderer::patch`], which diffs child lists either by position or, where children carry a `key`, by identity.
//!
//! [`mem::Document`] is an in-memory [`Dom`] usable anywhere. On `wasm32`, `web::WebDom` drives the browser's DOM.

#![doc(html_root_url = "https://docs.rs/thicket-dom/0.1.0")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod create;
pub mod diff;
pub mod error;
pub mod host;
pub mod load;
pub mod mem;
pub mod node;
pub mod props;
mod rc_hash_map;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{Config, ConfigUpdate, ErrorHandler};
pub use create::LiveNode;
pub use diff::{ChildStrategy, Renderer};
pub use error::{Error, HostError, RenderError};
pub use host::Dom;
pub use node::{fragment, h, Child, DomRef, InnerHtml, Key, Listener, Props, RefCallback, VNode, VNodeType, Value};
pub use props::PropKind;

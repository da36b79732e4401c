//! Error values and the reporting boundary.
//!
//! Nothing here is fatal: failures end up as a [`RenderError`] handed to [`report`],
//! and the caller degrades to a placeholder or stops working on the affected slot.

use crate::{config::Config, node::VNode};
use core::fmt::Display;
use thiserror::Error;
use tracing::{error, warn as log_warn};

/// The live DOM rejected an operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct HostError {
	pub operation: &'static str,
	pub message: String,
}
impl HostError {
	#[must_use]
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self {
			operation,
			message: message.into(),
		}
	}
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
	/// A value presented as [`VNode`] doesn't have the required shape.
	#[error("Invalid VNode structure: {0}")]
	InvalidVNode(String),
	#[error(transparent)]
	Host(#[from] HostError),
}

/// An [`Error`] together with the offending [`VNode`] (if known) and the operation it happened in.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct RenderError {
	#[source]
	pub error: Error,
	pub vnode: Option<VNode>,
	pub context: Option<&'static str>,
}
impl RenderError {
	#[must_use]
	pub fn new(error: Error, vnode: Option<VNode>, context: &'static str) -> Self {
		Self {
			error,
			vnode,
			context: Some(context),
		}
	}
}

/// Routes `error` to [`Config::on_error`] if set, otherwise logs it.
///
/// A failing handler is logged together with the original error. This function never fails.
pub fn report(config: &Config, error: &RenderError) {
	if let Some(on_error) = &config.on_error {
		if let Err(handler_error) = on_error.call(error) {
			error!("Error in custom error handler: {}", handler_error);
			error!("Original error: {}", error);
		}
	} else if config.dev_mode {
		error!("VDOM Error: {}", error);
		if let Some(vnode) = &error.vnode {
			error!("VNode: {:?}", vnode);
		}
		if let Some(context) = error.context {
			error!("Context: {}", context);
		}
	} else {
		error!("VDOM Error (enable dev mode for details)");
	}
}

/// Logs a warning in dev mode only.
pub fn warn(config: &Config, message: impl Display) {
	if config.dev_mode {
		log_warn!("[VDOM Warning]: {}", message);
	}
}

/// The text shown in place of a subtree that failed to materialize.
#[must_use]
pub fn placeholder_text(config: &Config, error: &Error) -> String {
	if config.dev_mode {
		format!("[Render Error: {}]", error)
	} else {
		"[Render Error]".to_owned()
	}
}

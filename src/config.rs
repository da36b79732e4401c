use crate::error::RenderError;
use core::fmt;
use std::{error::Error as StdError, rc::Rc};

/// Settings read by a [`Renderer`](`crate::Renderer`) at call time.
#[derive(Debug, Clone)]
pub struct Config {
	/// Verbose placeholders, diagnostics and warnings.
	///
	/// Defaults to `cfg!(debug_assertions)`.
	pub dev_mode: bool,
	/// Read by markup-parsing collaborators only. The reconciler never sanitizes.
	///
	/// Defaults to `true`.
	pub sanitize_html: bool,
	/// Replaces the default logging sink of [`report`](`crate::error::report`).
	pub on_error: Option<ErrorHandler>,
}
impl Default for Config {
	fn default() -> Self {
		Self {
			dev_mode: cfg!(debug_assertions),
			sanitize_html: true,
			on_error: None,
		}
	}
}
impl Config {
	/// Applies each field of `update` that is [`Some`].
	pub fn update(&mut self, update: ConfigUpdate) {
		let ConfigUpdate { dev_mode, sanitize_html, on_error } = update;
		if let Some(dev_mode) = dev_mode {
			self.dev_mode = dev_mode;
		}
		if let Some(sanitize_html) = sanitize_html {
			self.sanitize_html = sanitize_html;
		}
		if let Some(on_error) = on_error {
			self.on_error = on_error;
		}
	}
}

/// A partial [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigUpdate {
	pub dev_mode: Option<bool>,
	pub sanitize_html: Option<bool>,
	/// `Some(None)` removes the handler.
	pub on_error: Option<Option<ErrorHandler>>,
}

/// A custom error callback. Returning [`Err`] is logged alongside the original error.
#[derive(Clone)]
pub struct ErrorHandler(Rc<dyn Fn(&RenderError) -> Result<(), Box<dyn StdError>>>);
impl ErrorHandler {
	pub fn new(handler: impl 'static + Fn(&RenderError) -> Result<(), Box<dyn StdError>>) -> Self {
		Self(Rc::new(handler))
	}

	/// # Errors
	///
	/// Iff the handler does.
	pub fn call(&self, error: &RenderError) -> Result<(), Box<dyn StdError>> {
		(self.0)(error)
	}
}
impl fmt::Debug for ErrorHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("ErrorHandler(..)")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_update() {
		let mut config = Config {
			dev_mode: false,
			..Config::default()
		};
		config.update(ConfigUpdate {
			dev_mode: Some(true),
			on_error: Some(Some(ErrorHandler::new(|_| Ok(())))),
			..ConfigUpdate::default()
		});
		assert!(config.dev_mode);
		assert!(config.sanitize_html);
		assert!(config.on_error.is_some());

		config.update(ConfigUpdate {
			on_error: Some(None),
			..ConfigUpdate::default()
		});
		assert!(config.dev_mode);
		assert!(config.on_error.is_none());
	}
}

//! Property reconciliation: turns prop map differences into attribute, style, listener and ref updates.

use crate::{
	diff::Renderer,
	error::{warn, Error},
	host::Dom,
	node::{DomRef, Props, Value},
};
use tracing::{instrument, trace};

/// Attributes whose presence alone means `true`.
///
/// These are matched case-sensitively against prop keys and written lowercased.
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
	"checked",
	"selected",
	"disabled",
	"readOnly",
	"required",
	"autoFocus",
	"multiple",
	"hidden",
	"autoplay",
	"controls",
	"loop",
	"muted",
	"open",
	"reversed",
];

/// How a prop key is applied to an element.
///
/// Setting and removing a prop always go through the same classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKind {
	/// `children` and `key`.
	Ignored,
	/// `on` + name, with the (lowercased) event name.
	EventListener(String),
	Ref,
	ClassName,
	Style,
	DangerousHtml,
	/// With the lowercased attribute name.
	BooleanAttribute(String),
	Attribute,
}
impl PropKind {
	#[must_use]
	pub fn classify(key: &str) -> Self {
		match key {
			"children" | "key" => Self::Ignored,
			_ if key.len() > 2 && key.starts_with("on") => Self::EventListener(key[2..].to_lowercase()),
			"ref" => Self::Ref,
			"className" | "class" => Self::ClassName,
			"style" => Self::Style,
			"dangerouslySetInnerHTML" => Self::DangerousHtml,
			_ if BOOLEAN_ATTRIBUTES.contains(&key) => Self::BooleanAttribute(key.to_ascii_lowercase()),
			_ => Self::Attribute,
		}
	}
}

impl<D: Dom> Renderer<D> {
	/// Removes props missing from `new_props` and sets those whose value changed.
	///
	/// Unchanged values (including listeners and refs, by identity) cause no DOM calls at all.
	///
	/// # Errors
	///
	/// Iff the host rejects an update. Updates before the failing one stay applied.
	#[instrument(skip(self, old_props, new_props))]
	pub fn update_props(&mut self, element: &D::Node, old_props: &Props, new_props: &Props) -> Result<(), Error> {
		for (key, old_value) in old_props.iter() {
			if !new_props.contains_key(key) {
				self.remove_property(element, key, old_value)?;
			}
		}
		for (key, value) in new_props.iter() {
			let old_value = old_props.get(key);
			if old_value != Some(value) {
				self.set_property(element, key, value, old_value)?;
			}
		}
		Ok(())
	}

	/// Applies one prop unconditionally. `old_value` is needed to swap listeners.
	///
	/// # Errors
	///
	/// Iff the host rejects the update, for example because `key` isn't a valid attribute name.
	pub fn set_property(&mut self, element: &D::Node, key: &str, value: &Value, old_value: Option<&Value>) -> Result<(), Error> {
		trace!(key, ?value, "Setting property.");
		match PropKind::classify(key) {
			PropKind::Ignored => (),
			PropKind::EventListener(event) => match value {
				Value::Listener(listener) => {
					if let Some(Value::Listener(old)) = old_value {
						self.dom.remove_event_listener(element, &event, old)?;
					}
					self.dom.add_event_listener(element, &event, listener)?;
				}
				// Includes `Null`: the old listener stays attached.
				_ => warn(&self.config, format_args!("Event handler {} is not a function", key)),
			},
			PropKind::Ref => match value {
				Value::Ref(callback) => callback.call(DomRef::Attached(element)),
				Value::Null => (),
				_ => warn(&self.config, "ref is not a function"),
			},
			PropKind::ClassName => self.set_class_name(element, value)?,
			PropKind::Style => self.set_style(element, value)?,
			PropKind::DangerousHtml => match value {
				Value::Html(inner_html) if !inner_html.html.is_empty() => self.dom.set_inner_html(element, &inner_html.html)?,
				_ => (),
			},
			PropKind::BooleanAttribute(name) => match value {
				Value::Null | Value::Bool(false) => self.dom.remove_attribute(element, &name)?,
				_ => self.dom.set_attribute(element, &name, "")?,
			},
			PropKind::Attribute => match value {
				Value::Null | Value::Bool(false) => self.dom.remove_attribute(element, key)?,
				_ => match value.to_attribute_string() {
					Some(string) => self.dom.set_attribute(element, key, &string)?,
					None => warn(&self.config, format_args!("Attribute {} can't be set to {:?}", key, value)),
				},
			},
		}
		Ok(())
	}

	/// Undoes a prop that was set to `old_value`.
	///
	/// Refs are called with [`DomRef::Detached`]. Markup set through `dangerouslySetInnerHTML` stays in place.
	///
	/// # Errors
	///
	/// Iff the host rejects the update.
	pub fn remove_property(&mut self, element: &D::Node, key: &str, old_value: &Value) -> Result<(), Error> {
		trace!(key, "Removing property.");
		match PropKind::classify(key) {
			PropKind::Ignored | PropKind::DangerousHtml => (),
			PropKind::EventListener(event) => {
				if let Value::Listener(old) = old_value {
					self.dom.remove_event_listener(element, &event, old)?;
				}
			}
			PropKind::Ref => {
				if let Value::Ref(callback) = old_value {
					callback.call(DomRef::Detached);
				}
			}
			PropKind::ClassName => self.clear_class_name(element)?,
			PropKind::Style => self.dom.remove_attribute(element, "style")?,
			PropKind::BooleanAttribute(name) => self.dom.remove_attribute(element, &name)?,
			PropKind::Attribute => self.dom.remove_attribute(element, key)?,
		}
		Ok(())
	}

	fn set_class_name(&mut self, element: &D::Node, value: &Value) -> Result<(), Error> {
		let class_name = match value {
			Value::Null | Value::Bool(false) => return self.clear_class_name(element),
			_ => match value.to_attribute_string() {
				Some(class_name) => class_name,
				None => {
					warn(&self.config, format_args!("className can't be set to {:?}", value));
					return Ok(());
				}
			},
		};

		let class_name = class_name.trim();
		if class_name.is_empty() {
			self.clear_class_name(element)
		} else {
			self.dom.set_class_name(element, class_name);
			Ok(())
		}
	}

	fn clear_class_name(&mut self, element: &D::Node) -> Result<(), Error> {
		self.dom.set_class_name(element, "");
		self.dom.remove_attribute(element, "class")?;
		Ok(())
	}

	fn set_style(&mut self, element: &D::Node, value: &Value) -> Result<(), Error> {
		match value {
			Value::Null => self.dom.remove_attribute(element, "style")?,
			Value::Str(css) => self.dom.set_attribute(element, "style", css)?,
			Value::Style(declarations) => {
				for (property, value) in declarations {
					self.dom.set_style_property(element, property, value.as_deref().unwrap_or(""))?;
				}
			}
			_ => warn(&self.config, format_args!("style can't be set to {:?}", value)),
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classification() {
		assert_eq!(PropKind::classify("key"), PropKind::Ignored);
		assert_eq!(PropKind::classify("children"), PropKind::Ignored);
		assert_eq!(PropKind::classify("onClick"), PropKind::EventListener("click".to_owned()));
		assert_eq!(PropKind::classify("onMouseDown"), PropKind::EventListener("mousedown".to_owned()));
		assert_eq!(PropKind::classify("on"), PropKind::Attribute);
		assert_eq!(PropKind::classify("ref"), PropKind::Ref);
		assert_eq!(PropKind::classify("class"), PropKind::ClassName);
		assert_eq!(PropKind::classify("className"), PropKind::ClassName);
		assert_eq!(PropKind::classify("style"), PropKind::Style);
		assert_eq!(PropKind::classify("dangerouslySetInnerHTML"), PropKind::DangerousHtml);
		assert_eq!(PropKind::classify("readOnly"), PropKind::BooleanAttribute("readonly".to_owned()));
		assert_eq!(PropKind::classify("readonly"), PropKind::Attribute);
		assert_eq!(PropKind::classify("id"), PropKind::Attribute);
	}
}

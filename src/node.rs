//! The immutable tree description consumed by [`Renderer`](`crate::Renderer`).
//!
//! A [`VNode`] is a tag (or [`VNodeType::Fragment`]), a [`Props`] map and an ordered list of [`Child`] descriptors.
//! None of the types in this module hold a reference to the live DOM.

use core::{any::Any, fmt};
use std::{borrow::Cow, rc::Rc};

use crate::error::Error;

/// The `type` string that marks a [`VNodeType::Fragment`].
pub const FRAGMENT: &str = "fragment";

/// Either an element tag name or the fragment sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VNodeType {
	Element(String),
	/// Contributes its children directly to the parent, without an element of its own.
	Fragment,
}
impl VNodeType {
	#[must_use]
	pub fn new(name: &str) -> Self {
		if name == FRAGMENT {
			Self::Fragment
		} else {
			Self::Element(name.to_owned())
		}
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			Self::Element(tag) => tag,
			Self::Fragment => FRAGMENT,
		}
	}

	#[must_use]
	pub fn is_fragment(&self) -> bool {
		matches!(self, Self::Fragment)
	}
}
impl fmt::Display for VNodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One node of the virtual tree.
#[derive(Debug, Clone, PartialEq)]
pub struct VNode {
	pub kind: VNodeType,
	pub props: Props,
	pub children: Vec<Child>,
}
impl VNode {
	#[must_use]
	pub fn new(kind: VNodeType, props: Props, children: Vec<Child>) -> Self {
		Self { kind, props, children }
	}

	/// Starts an element with no props and no children.
	#[must_use]
	pub fn element(tag: &str) -> Self {
		Self::new(VNodeType::new(tag), Props::new(), Vec::new())
	}

	/// Sets a prop, normalizing `class` to `className`.
	#[must_use]
	pub fn prop(mut self, key: &str, value: impl Into<Value>) -> Self {
		let key = if key == "class" { "className" } else { key };
		self.props.insert(key, value);
		self
	}

	#[must_use]
	pub fn key(self, key: impl Into<Value>) -> Self {
		self.prop("key", key)
	}

	#[must_use]
	pub fn child(mut self, child: impl Into<Child>) -> Self {
		self.children.push(child.into());
		self
	}

	#[must_use]
	pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
		self.children.extend(children.into_iter().map(Into::into));
		self
	}

	/// The identity key, if present and not nullish.
	#[must_use]
	pub fn key_value(&self) -> Option<&Value> {
		self.props.get("key").filter(|key| !key.is_nullish())
	}

	/// Non-empty `dangerouslySetInnerHTML` markup. If present, it replaces [`children`](`VNode::children`) entirely.
	#[must_use]
	pub fn inner_html(&self) -> Option<&str> {
		match self.props.get("dangerouslySetInnerHTML") {
			Some(Value::Html(inner_html)) if !inner_html.html.is_empty() => Some(&inner_html.html),
			_ => None,
		}
	}

	/// Checks the parts of the node the type system can't.
	///
	/// # Errors
	///
	/// Iff the element type is empty or contains whitespace or markup delimiters.
	pub fn validate(&self) -> Result<(), Error> {
		match &self.kind {
			VNodeType::Fragment => Ok(()),
			VNodeType::Element(tag) if tag.is_empty() => Err(Error::InvalidVNode("element type must not be empty".to_owned())),
			VNodeType::Element(tag) if tag.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '/' | '"' | '\'' | '=')) => {
				Err(Error::InvalidVNode(format!("invalid element type {:?}", tag)))
			}
			VNodeType::Element(_) => Ok(()),
		}
	}
}

/// Creates an element (or fragment) the way JSX-style factories do:
/// skip values are dropped from `children` and `class` is normalized to `className`.
#[must_use]
pub fn h<C: Into<Child>>(tag: &str, props: Props, children: impl IntoIterator<Item = C>) -> VNode {
	let children = children.into_iter().map(Into::into).filter(|child: &Child| !child.is_skippable()).collect();

	let kind = VNodeType::new(tag);
	if kind.is_fragment() {
		return VNode::new(kind, Props::new(), children);
	}

	let mut props = props;
	if !props.contains_key("className") {
		if let Some(class) = props.remove("class") {
			props.insert("className", class);
		}
	}
	VNode::new(kind, props, children)
}

#[must_use]
pub fn fragment<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> VNode {
	h(FRAGMENT, Props::new(), children)
}

/// An entry of [`VNode::children`].
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
	Node(VNode),
	Text(String),
	Number(f64),
	/// Renders nothing, but occupies a position until list-level filtering removes it.
	Bool(bool),
	/// Renders nothing, but occupies a position until list-level filtering removes it.
	Null,
}
impl Child {
	/// `true` for [`Child::Null`] and either [`Child::Bool`].
	#[must_use]
	pub fn is_skippable(&self) -> bool {
		matches!(self, Self::Bool(_) | Self::Null)
	}

	/// `true` for text and numbers, which materialize as text nodes.
	#[must_use]
	pub fn is_primitive(&self) -> bool {
		matches!(self, Self::Text(_) | Self::Number(_))
	}

	#[must_use]
	pub fn is_structured(&self) -> bool {
		matches!(self, Self::Node(_))
	}

	#[must_use]
	pub fn as_vnode(&self) -> Option<&VNode> {
		match self {
			Self::Node(vnode) => Some(vnode),
			_ => None,
		}
	}

	/// The text a primitive materializes as.
	#[must_use]
	pub fn to_text(&self) -> Option<Cow<'_, str>> {
		match self {
			Self::Text(text) => Some(Cow::Borrowed(text)),
			Self::Number(number) => Some(Cow::Owned(format_number(*number))),
			Self::Node(_) | Self::Bool(_) | Self::Null => None,
		}
	}
}
impl From<VNode> for Child {
	fn from(vnode: VNode) -> Self {
		Self::Node(vnode)
	}
}
impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}
impl From<String> for Child {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}
impl From<f64> for Child {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}
impl From<i32> for Child {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}
impl From<u32> for Child {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}
impl From<bool> for Child {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl<T: Into<Child>> From<Option<T>> for Child {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// Formats a number the way text content displays it: integral values without a fraction, `NaN`, `Infinity`,
/// and exponent notation (`1e+21`, `1e-7`) for decimal exponents of 21 and up or below -6.
#[must_use]
pub fn format_number(number: f64) -> String {
	if number.is_nan() {
		"NaN".to_owned()
	} else if number.is_infinite() {
		let infinity = if number > 0.0 { "Infinity" } else { "-Infinity" };
		infinity.to_owned()
	} else if number == 0.0 {
		// Also catches `-0.0`.
		"0".to_owned()
	} else {
		let scientific = format!("{:e}", number);
		match scientific.split_once('e').map(|(mantissa, exponent)| (mantissa, exponent.parse::<i32>())) {
			Some((mantissa, Ok(exponent))) if !(-6..21).contains(&exponent) => {
				format!("{}e{}{}", mantissa, if exponent < 0 { '-' } else { '+' }, exponent.abs())
			}
			_ => number.to_string(),
		}
	}
}

/// A prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Nullish (`null` or `undefined`).
	Null,
	Bool(bool),
	Number(f64),
	Str(String),
	/// Inline style as CSS property → value. [`None`] clears that one property.
	Style(Vec<(String, Option<String>)>),
	Html(InnerHtml),
	Listener(Listener),
	Ref(RefCallback),
}
impl Value {
	#[must_use]
	pub fn is_nullish(&self) -> bool {
		matches!(self, Self::Null)
	}

	/// Stringifies primitives. Structured values have no attribute representation.
	#[must_use]
	pub fn to_attribute_string(&self) -> Option<Cow<'_, str>> {
		match self {
			Self::Str(string) => Some(Cow::Borrowed(string)),
			Self::Number(number) => Some(Cow::Owned(format_number(*number))),
			Self::Bool(true) => Some(Cow::Borrowed("true")),
			Self::Bool(false) => Some(Cow::Borrowed("false")),
			Self::Null => Some(Cow::Borrowed("null")),
			Self::Style(_) | Self::Html(_) | Self::Listener(_) | Self::Ref(_) => None,
		}
	}

	/// Builds a [`Value::Style`] from property/value pairs.
	#[must_use]
	pub fn style<K: Into<String>, V: Into<String>>(declarations: impl IntoIterator<Item = (K, Option<V>)>) -> Self {
		Self::Style(declarations.into_iter().map(|(k, v)| (k.into(), v.map(Into::into))).collect())
	}
}
impl From<&str> for Value {
	fn from(string: &str) -> Self {
		Self::Str(string.to_owned())
	}
}
impl From<String> for Value {
	fn from(string: String) -> Self {
		Self::Str(string)
	}
}
impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Self::Number(number)
	}
}
impl From<i32> for Value {
	fn from(number: i32) -> Self {
		Self::Number(number.into())
	}
}
impl From<u32> for Value {
	fn from(number: u32) -> Self {
		Self::Number(number.into())
	}
}
impl From<InnerHtml> for Value {
	fn from(html: InnerHtml) -> Self {
		Self::Html(html)
	}
}
impl From<Listener> for Value {
	fn from(listener: Listener) -> Self {
		Self::Listener(listener)
	}
}
impl From<RefCallback> for Value {
	fn from(callback: RefCallback) -> Self {
		Self::Ref(callback)
	}
}
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

/// The `dangerouslySetInnerHTML` payload. Non-empty markup replaces all structural children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerHtml {
	pub html: String,
}
impl InnerHtml {
	#[must_use]
	pub fn new(html: impl Into<String>) -> Self {
		Self { html: html.into() }
	}
}

/// An event handler.
///
/// The host passes its native event type as `&dyn Any`:
/// [`mem::Event`](`crate::mem::Event`) for the in-memory document, `web_sys::Event` in the browser.
///
/// Equality is identity of the shared closure, so clones compare equal and separately created listeners never do.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&dyn Any)>);
impl Listener {
	pub fn new(handler: impl 'static + Fn(&dyn Any)) -> Self {
		Self(Rc::new(handler))
	}

	pub fn call(&self, event: &dyn Any) {
		(self.0)(event)
	}

	pub(crate) fn id(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}
impl PartialEq for Listener {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}
impl fmt::Debug for Listener {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Listener({:#x})", self.id())
	}
}

/// What a [`RefCallback`] is called with.
#[derive(Debug, Clone, Copy)]
pub enum DomRef<'a> {
	/// The live host node, e.g. a [`mem::NodeRef`](`crate::mem::NodeRef`) or `web_sys::Node`.
	Attached(&'a dyn Any),
	Detached,
}
impl<'a> DomRef<'a> {
	#[must_use]
	pub fn downcast<T: Any>(self) -> Option<&'a T> {
		match self {
			DomRef::Attached(node) => node.downcast_ref(),
			DomRef::Detached => None,
		}
	}
}

/// The `ref` prop: called with the live element when set and with [`DomRef::Detached`] when the prop is removed.
///
/// # Panics
///
/// A panic in the callback isn't contained. It unwinds through [`Renderer::render`](`crate::Renderer::render`)
/// or [`Renderer::patch`](`crate::Renderer::patch`) and may leave the DOM partially updated.
#[derive(Clone)]
pub struct RefCallback(Rc<dyn Fn(DomRef<'_>)>);
impl RefCallback {
	pub fn new(callback: impl 'static + Fn(DomRef<'_>)) -> Self {
		Self(Rc::new(callback))
	}

	pub fn call(&self, dom_ref: DomRef<'_>) {
		(self.0)(dom_ref)
	}

	fn id(&self) -> usize {
		Rc::as_ptr(&self.0).cast::<()>() as usize
	}
}
impl PartialEq for RefCallback {
	fn eq(&self, other: &Self) -> bool {
		self.id() == other.id()
	}
}
impl fmt::Debug for RefCallback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RefCallback({:#x})", self.id())
	}
}

/// A hashable identity key, used by keyed child diffing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
	Str(String),
	/// Bits of the (zero- and NaN-normalized) number.
	Number(u64),
	Bool(bool),
}
impl Key {
	/// [`None`] for nullish and for values that can't serve as a key.
	#[must_use]
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::Str(string) => Some(Self::Str(string.clone())),
			Value::Number(number) => Some(Self::Number(if number.is_nan() {
				f64::NAN.to_bits()
			} else if *number == 0.0 {
				0.0_f64.to_bits()
			} else {
				number.to_bits()
			})),
			Value::Bool(value) => Some(Self::Bool(*value)),
			Value::Null | Value::Style(_) | Value::Html(_) | Value::Listener(_) | Value::Ref(_) => None,
		}
	}
}

/// An insertion-ordered prop map.
///
/// Prop maps are small, so lookups are linear. Order is kept so that attributes are applied deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(Vec<(String, Value)>);
impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self(Vec::new())
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.iter().any(|(k, _)| k == key)
	}

	/// Replaces the value in place if `key` is already present.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		let key = key.into();
		let value = value.into();
		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some((_, existing)) => Some(core::mem::replace(existing, value)),
			None => {
				self.0.push((key, value));
				None
			}
		}
	}

	pub fn remove(&mut self, key: &str) -> Option<Value> {
		let index = self.0.iter().position(|(k, _)| k == key)?;
		Some(self.0.remove(index).1)
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(key, value);
		self
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Props {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		let mut props = Self::new();
		for (key, value) in iter {
			props.insert(key, value);
		}
		props
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifier() {
		assert!(Child::Null.is_skippable());
		assert!(Child::Bool(true).is_skippable());
		assert!(Child::Bool(false).is_skippable());
		assert!(!Child::from("").is_skippable());
		assert!(!Child::from(0).is_skippable());

		assert!(Child::from("a").is_primitive());
		assert!(Child::from(1.5).is_primitive());
		assert!(!Child::Null.is_primitive());

		assert!(Child::from(VNode::element("div")).is_structured());
		assert!(!Child::from("div").is_structured());
	}

	#[test]
	fn numbers_format_like_text_content() {
		assert_eq!(format_number(1.0), "1");
		assert_eq!(format_number(-0.0), "0");
		assert_eq!(format_number(1.5), "1.5");
		assert_eq!(format_number(-42.0), "-42");
		assert_eq!(format_number(f64::NAN), "NaN");
		assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
		assert_eq!(format_number(1e20), "100000000000000000000");
		assert_eq!(format_number(1e21), "1e+21");
		assert_eq!(format_number(-1.5e300), "-1.5e+300");
		assert_eq!(format_number(0.000_001), "0.000001");
		assert_eq!(format_number(1e-7), "1e-7");
		assert_eq!(format_number(1.25e-10), "1.25e-10");
	}

	#[test]
	fn h_normalizes_class_and_drops_skip_values() {
		let vnode = h("div", Props::new().with("class", "a"), vec![Child::from("x"), Child::Null, Child::Bool(false), Child::from(2)]);
		assert_eq!(vnode.props.get("className"), Some(&Value::from("a")));
		assert!(!vnode.props.contains_key("class"));
		assert_eq!(vnode.children, vec![Child::from("x"), Child::from(2)]);
	}

	#[test]
	fn h_keeps_explicit_class_name() {
		let vnode = h("div", Props::new().with("class", "a").with("className", "b"), Vec::<Child>::new());
		assert_eq!(vnode.props.get("className"), Some(&Value::from("b")));
		assert_eq!(vnode.props.get("class"), Some(&Value::from("a")));
	}

	#[test]
	fn fragments_drop_props() {
		let vnode = h("fragment", Props::new().with("id", "x"), ["a"]);
		assert!(vnode.kind.is_fragment());
		assert!(vnode.props.is_empty());
	}

	#[test]
	fn listener_identity() {
		let a = Listener::new(|_| ());
		let b = Listener::new(|_| ());
		assert_eq!(a, a.clone());
		assert_ne!(a, b);
	}

	#[test]
	fn keys_normalize_numbers() {
		assert_eq!(Key::from_value(&Value::Number(0.0)), Key::from_value(&Value::Number(-0.0)));
		assert_ne!(Key::from_value(&Value::from(1)), Key::from_value(&Value::from("1")));
		assert_eq!(Key::from_value(&Value::Null), None);
	}

	#[test]
	fn validation() {
		assert!(VNode::element("div").validate().is_ok());
		assert!(VNode::element("my-element").validate().is_ok());
		assert!(VNode::element("").validate().is_err());
		assert!(VNode::element("bad tag").validate().is_err());
		assert!(fragment(["a"]).validate().is_ok());
	}

	#[test]
	fn props_keep_insertion_order() {
		let mut props = Props::new().with("b", 1).with("a", 2);
		assert_eq!(props.insert("b", 3), Some(Value::from(1)));
		assert_eq!(props.iter().map(|(k, _)| k).collect::<Vec<_>>(), ["b", "a"]);
		assert_eq!(props.remove("b"), Some(Value::from(3)));
		assert_eq!(props.len(), 1);
	}
}

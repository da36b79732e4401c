//! A headless, in-memory [`Dom`].
//!
//! This is what native targets and the test suite render into. It models the parts of an HTML document the reconciler
//! touches: elements with (lowercased) attributes and listeners, text nodes, and opaque markup set through
//! [`Dom::set_inner_html`]. Serialization follows the browser's `innerHTML` closely enough to compare markup.

use crate::{error::HostError, host::Dom, node::Listener, rc_hash_map::RcHashMap};
use core::fmt;
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::trace;

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// A handle to a node of a [`Document`]. Clones refer to the same node.
#[derive(Clone)]
pub struct NodeRef(Rc<RefCell<NodeData>>);

struct NodeData {
	parent: Weak<RefCell<NodeData>>,
	kind: NodeKind,
	children: Vec<NodeRef>,
}

enum NodeKind {
	Element {
		tag: String,
		attributes: Vec<(String, String)>,
		listeners: Vec<(String, Listener)>,
	},
	Text(String),
	/// Markup set via `innerHTML`, serialized verbatim.
	Raw(String),
}

impl NodeRef {
	fn new(kind: NodeKind) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			parent: Weak::new(),
			kind,
			children: Vec::new(),
		})))
	}

	#[must_use]
	pub fn is_element(&self) -> bool {
		matches!(self.0.borrow().kind, NodeKind::Element { .. })
	}

	#[must_use]
	pub fn is_text(&self) -> bool {
		matches!(self.0.borrow().kind, NodeKind::Text(_))
	}

	/// Lowercase, [`None`] for non-elements.
	#[must_use]
	pub fn tag_name(&self) -> Option<String> {
		match &self.0.borrow().kind {
			NodeKind::Element { tag, .. } => Some(tag.clone()),
			NodeKind::Text(_) | NodeKind::Raw(_) => None,
		}
	}

	#[must_use]
	pub fn parent(&self) -> Option<NodeRef> {
		self.0.borrow().parent.upgrade().map(NodeRef)
	}

	#[must_use]
	pub fn child_nodes(&self) -> Vec<NodeRef> {
		self.0.borrow().children.clone()
	}

	/// Element children only.
	#[must_use]
	pub fn children(&self) -> Vec<NodeRef> {
		self.child_nodes().into_iter().filter(NodeRef::is_element).collect()
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<String> {
		let name = name.to_ascii_lowercase();
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.iter().find(|(n, _)| *n == name).map(|(_, v)| v.clone()),
			NodeKind::Text(_) | NodeKind::Raw(_) => None,
		}
	}

	#[must_use]
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attribute(name).is_some()
	}

	#[must_use]
	pub fn attributes(&self) -> Vec<(String, String)> {
		match &self.0.borrow().kind {
			NodeKind::Element { attributes, .. } => attributes.clone(),
			NodeKind::Text(_) | NodeKind::Raw(_) => Vec::new(),
		}
	}

	/// The number of listeners registered for `event`.
	#[must_use]
	pub fn listener_count(&self, event: &str) -> usize {
		match &self.0.borrow().kind {
			NodeKind::Element { listeners, .. } => listeners.iter().filter(|(e, _)| e == event).count(),
			NodeKind::Text(_) | NodeKind::Raw(_) => 0,
		}
	}

	/// Calls this node's listeners for `event` in registration order and returns how many were called.
	///
	/// Events don't bubble.
	pub fn dispatch_event(&self, event: &str) -> usize {
		let listeners: Vec<Listener> = match &self.0.borrow().kind {
			NodeKind::Element { listeners, .. } => listeners.iter().filter(|(e, _)| e == event).map(|(_, l)| l.clone()).collect(),
			NodeKind::Text(_) | NodeKind::Raw(_) => Vec::new(),
		};
		let event = Event {
			name: event.to_owned(),
			target: self.clone(),
		};
		for listener in &listeners {
			listener.call(&event);
		}
		listeners.len()
	}

	#[must_use]
	pub fn text_content(&self) -> String {
		let data = self.0.borrow();
		match &data.kind {
			NodeKind::Text(text) | NodeKind::Raw(text) => text.clone(),
			NodeKind::Element { .. } => data.children.iter().map(NodeRef::text_content).collect(),
		}
	}

	#[must_use]
	pub fn outer_html(&self) -> String {
		let mut html = String::new();
		self.write_html(&mut html);
		html
	}

	#[must_use]
	pub fn inner_html(&self) -> String {
		let mut html = String::new();
		for child in &self.0.borrow().children {
			child.write_html(&mut html);
		}
		html
	}

	fn write_html(&self, out: &mut String) {
		let data = self.0.borrow();
		match &data.kind {
			NodeKind::Text(text) => escape(text, false, out),
			NodeKind::Raw(html) => out.push_str(html),
			NodeKind::Element { tag, attributes, .. } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					escape(value, true, out);
					out.push('"');
				}
				out.push('>');
				if VOID_ELEMENTS.contains(&tag.as_str()) {
					return;
				}
				for child in &data.children {
					child.write_html(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}

	fn detach(&self) {
		let parent = self.0.borrow().parent.upgrade();
		if let Some(parent) = parent {
			parent.borrow_mut().children.retain(|child| child != self);
			self.0.borrow_mut().parent = Weak::new();
		}
	}

	fn adopt_into(&self, parent: &NodeRef) {
		self.0.borrow_mut().parent = Rc::downgrade(&parent.0);
	}

	fn position_in(&self, parent: &NodeRef) -> Option<usize> {
		parent.0.borrow().children.iter().position(|child| child == self)
	}
}
impl PartialEq for NodeRef {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for NodeRef {}
impl fmt::Debug for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0.try_borrow() {
			Ok(data) => match &data.kind {
				NodeKind::Element { tag, .. } => write!(f, "NodeRef(<{}>)", tag),
				NodeKind::Text(text) => write!(f, "NodeRef(#text {:?})", text),
				NodeKind::Raw(_) => f.write_str("NodeRef(#raw)"),
			},
			Err(_) => f.write_str("NodeRef(<borrowed>)"),
		}
	}
}

fn escape(text: &str, attribute: bool, out: &mut String) {
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'\u{a0}' => out.push_str("&nbsp;"),
			'"' if attribute => out.push_str("&quot;"),
			'<' if !attribute => out.push_str("&lt;"),
			'>' if !attribute => out.push_str("&gt;"),
			c => out.push(c),
		}
	}
}

/// What listeners of a [`Document`] receive, as `&dyn Any`.
#[derive(Debug, Clone)]
pub struct Event {
	pub name: String,
	pub target: NodeRef,
}

/// Counts of listener (un)registration calls, including redundant ones.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListenerStats {
	pub added: usize,
	pub removed: usize,
}

/// The in-memory document. Nodes live as long as a [`NodeRef`] to them (or an ancestor) does.
#[derive(Default)]
pub struct Document {
	listeners: RcHashMap<usize, u32, Listener>,
	stats: ListenerStats,
}
impl Document {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn listener_stats(&self) -> ListenerStats {
		self.stats
	}

	/// The number of distinct listeners currently registered on any element.
	#[must_use]
	pub fn live_listener_count(&self) -> usize {
		self.listeners.strong_len()
	}

	fn check_insertion(operation: &'static str, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
		if !parent.is_element() {
			return Err(HostError::new(operation, "HierarchyRequestError: the parent is not an element"));
		}
		let mut ancestor = Some(parent.clone());
		while let Some(node) = ancestor {
			if node == *child {
				return Err(HostError::new(operation, "HierarchyRequestError: the new child is an ancestor of the parent"));
			}
			ancestor = node.parent();
		}
		Ok(())
	}

	fn check_child(operation: &'static str, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
		if child.parent().as_ref() == Some(parent) {
			Ok(())
		} else {
			Err(HostError::new(operation, "NotFoundError: the node is not a child of this node"))
		}
	}
}
impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("live_listeners", &self.listeners.strong_len())
			.field("stats", &self.stats)
			.finish()
	}
}

fn is_valid_element_name(name: &str) -> bool {
	let mut chars = name.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}

fn is_valid_attribute_name(name: &str) -> bool {
	!name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='))
}

fn not_an_element(operation: &'static str) -> HostError {
	HostError::new(operation, "InvalidNodeTypeError: the node is not an element")
}

/// `backgroundColor` → `background-color`. Custom properties are kept as they are.
fn camel_to_kebab(property: &str) -> String {
	if property.starts_with("--") {
		return property.to_owned();
	}
	let mut kebab = String::with_capacity(property.len() + 4);
	let mut previous_lower = false;
	for c in property.chars() {
		if c.is_ascii_uppercase() && previous_lower {
			kebab.push('-');
		}
		kebab.push(c.to_ascii_lowercase());
		previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
	}
	kebab
}

fn parse_declarations(style: &str) -> Vec<(String, String)> {
	style
		.split(';')
		.filter_map(|declaration| declaration.split_once(':'))
		.map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
		.filter(|(name, value)| !name.is_empty() && !value.is_empty())
		.collect()
}

fn serialize_declarations(declarations: &[(String, String)]) -> String {
	declarations.iter().map(|(name, value)| format!("{}: {};", name, value)).collect::<Vec<_>>().join(" ")
}

impl Dom for Document {
	type Node = NodeRef;

	fn create_element(&mut self, tag: &str) -> Result<NodeRef, HostError> {
		if !is_valid_element_name(tag) {
			return Err(HostError::new("createElement", format!("InvalidCharacterError: {:?} is not a valid element name", tag)));
		}
		Ok(NodeRef::new(NodeKind::Element {
			tag: tag.to_ascii_lowercase(),
			attributes: Vec::new(),
			listeners: Vec::new(),
		}))
	}

	fn create_text_node(&mut self, data: &str) -> NodeRef {
		NodeRef::new(NodeKind::Text(data.to_owned()))
	}

	fn child_nodes(&self, parent: &NodeRef) -> Vec<NodeRef> {
		parent.child_nodes()
	}

	fn child_node(&self, parent: &NodeRef, index: usize) -> Option<NodeRef> {
		parent.0.borrow().children.get(index).cloned()
	}

	fn child_count(&self, parent: &NodeRef) -> usize {
		parent.0.borrow().children.len()
	}

	fn last_child(&self, parent: &NodeRef) -> Option<NodeRef> {
		parent.0.borrow().children.last().cloned()
	}

	fn element_children(&self, parent: &NodeRef) -> Vec<NodeRef> {
		parent.children()
	}

	fn parent_node(&self, node: &NodeRef) -> Option<NodeRef> {
		node.parent()
	}

	fn tag_name(&self, node: &NodeRef) -> Option<String> {
		node.tag_name()
	}

	fn text_data(&self, node: &NodeRef) -> Option<String> {
		match &node.0.borrow().kind {
			NodeKind::Text(text) => Some(text.clone()),
			NodeKind::Element { .. } | NodeKind::Raw(_) => None,
		}
	}

	fn set_text(&mut self, node: &NodeRef, data: &str) {
		if node.is_element() {
			self.clear_children(node);
			let text = self.create_text_node(data);
			text.adopt_into(node);
			node.0.borrow_mut().children.push(text);
		} else if let NodeKind::Text(text) | NodeKind::Raw(text) = &mut node.0.borrow_mut().kind {
			*text = data.to_owned();
		}
	}

	fn append_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
		Self::check_insertion("appendChild", parent, child)?;
		child.detach();
		child.adopt_into(parent);
		parent.0.borrow_mut().children.push(child.clone());
		Ok(())
	}

	fn insert_before(&mut self, parent: &NodeRef, child: &NodeRef, reference: &NodeRef) -> Result<(), HostError> {
		Self::check_insertion("insertBefore", parent, child)?;
		Self::check_child("insertBefore", parent, reference)?;
		if child == reference {
			return Ok(());
		}
		child.detach();
		let index = reference.position_in(parent).ok_or_else(|| HostError::new("insertBefore", "NotFoundError: reference node went missing"))?;
		child.adopt_into(parent);
		parent.0.borrow_mut().children.insert(index, child.clone());
		Ok(())
	}

	fn replace_child(&mut self, parent: &NodeRef, new: &NodeRef, old: &NodeRef) -> Result<(), HostError> {
		Self::check_insertion("replaceChild", parent, new)?;
		Self::check_child("replaceChild", parent, old)?;
		if new == old {
			return Ok(());
		}
		new.detach();
		let index = old.position_in(parent).ok_or_else(|| HostError::new("replaceChild", "NotFoundError: replaced node went missing"))?;
		new.adopt_into(parent);
		parent.0.borrow_mut().children[index] = new.clone();
		old.0.borrow_mut().parent = Weak::new();
		Ok(())
	}

	fn remove_child(&mut self, parent: &NodeRef, child: &NodeRef) -> Result<(), HostError> {
		Self::check_child("removeChild", parent, child)?;
		child.detach();
		Ok(())
	}

	fn clear_children(&mut self, parent: &NodeRef) {
		let children = core::mem::take(&mut parent.0.borrow_mut().children);
		for child in children {
			child.0.borrow_mut().parent = Weak::new();
		}
	}

	fn attributes(&self, element: &NodeRef) -> Vec<(String, String)> {
		element.attributes()
	}

	fn set_attribute(&mut self, element: &NodeRef, name: &str, value: &str) -> Result<(), HostError> {
		if !is_valid_attribute_name(name) {
			return Err(HostError::new("setAttribute", format!("InvalidCharacterError: {:?} is not a valid attribute name", name)));
		}
		let name = name.to_ascii_lowercase();
		match &mut element.0.borrow_mut().kind {
			NodeKind::Element { attributes, .. } => {
				match attributes.iter_mut().find(|(n, _)| *n == name) {
					Some((_, existing)) => value.clone_into(existing),
					None => attributes.push((name, value.to_owned())),
				}
				Ok(())
			}
			NodeKind::Text(_) | NodeKind::Raw(_) => Err(not_an_element("setAttribute")),
		}
	}

	fn remove_attribute(&mut self, element: &NodeRef, name: &str) -> Result<(), HostError> {
		let name = name.to_ascii_lowercase();
		match &mut element.0.borrow_mut().kind {
			NodeKind::Element { attributes, .. } => {
				attributes.retain(|(n, _)| *n != name);
				Ok(())
			}
			NodeKind::Text(_) | NodeKind::Raw(_) => Err(not_an_element("removeAttribute")),
		}
	}

	fn set_class_name(&mut self, element: &NodeRef, value: &str) {
		if element.is_element() {
			// Only fails for non-elements.
			let _ = self.set_attribute(element, "class", value);
		}
	}

	fn set_style_property(&mut self, element: &NodeRef, property: &str, value: &str) -> Result<(), HostError> {
		if !element.is_element() {
			return Err(not_an_element("style"));
		}
		let property = camel_to_kebab(property);
		let existing = element.attribute("style");
		let mut declarations = existing.as_deref().map(parse_declarations).unwrap_or_default();
		match declarations.iter().position(|(name, _)| *name == property) {
			Some(index) if value.is_empty() => {
				declarations.remove(index);
			}
			Some(index) => value.clone_into(&mut declarations[index].1),
			None if value.is_empty() => (),
			None => declarations.push((property, value.to_owned())),
		}
		if existing.is_none() && declarations.is_empty() {
			return Ok(());
		}
		self.set_attribute(element, "style", &serialize_declarations(&declarations))
	}

	fn set_inner_html(&mut self, element: &NodeRef, html: &str) -> Result<(), HostError> {
		if !element.is_element() {
			return Err(not_an_element("innerHTML"));
		}
		self.clear_children(element);
		if !html.is_empty() {
			let raw = NodeRef::new(NodeKind::Raw(html.to_owned()));
			raw.adopt_into(element);
			element.0.borrow_mut().children.push(raw);
		}
		Ok(())
	}

	fn add_event_listener(&mut self, element: &NodeRef, event: &str, listener: &Listener) -> Result<(), HostError> {
		self.stats.added += 1;
		match &mut element.0.borrow_mut().kind {
			NodeKind::Element { listeners, .. } => {
				// Identical registrations are ignored, as in the browser.
				if listeners.iter().any(|(e, l)| e == event && l == listener) {
					return Ok(());
				}
				listeners.push((event.to_owned(), listener.clone()));
			}
			NodeKind::Text(_) | NodeKind::Raw(_) => return Err(not_an_element("addEventListener")),
		}
		self.listeners
			.increment_or_insert_with(listener.id(), || listener.clone())
			.map(drop)
			.map_err(|_| HostError::new("addEventListener", "Too many active registrations of the same listener"))
	}

	fn remove_event_listener(&mut self, element: &NodeRef, event: &str, listener: &Listener) -> Result<(), HostError> {
		self.stats.removed += 1;
		let removed = match &mut element.0.borrow_mut().kind {
			NodeKind::Element { listeners, .. } => match listeners.iter().position(|(e, l)| e == event && l == listener) {
				Some(index) => {
					listeners.remove(index);
					true
				}
				None => false,
			},
			NodeKind::Text(_) | NodeKind::Raw(_) => return Err(not_an_element("removeEventListener")),
		};
		if removed {
			self.listeners
				.weak_decrement(&listener.id())
				.map_err(|_| HostError::new("removeEventListener", "Listener was removed more often than added"))?;
		}
		Ok(())
	}

	fn end_of_pass(&mut self) {
		let freed = self.listeners.drain_weak().count();
		if freed > 0 {
			trace!("Freed {} listener registration(s).", freed);
		}
		trace!("Listener count/capacity: {}/{}", self.listeners.len(), self.listeners.capacity());
	}
}

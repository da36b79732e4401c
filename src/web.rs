//! The browser [`Dom`], via [`web_sys`].

use crate::{error::HostError, host::Dom, node::Listener, rc_hash_map::RcHashMap};
use core::fmt;
use js_sys::{Function, Reflect};
use tracing::{info, instrument, trace};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Element, Node, Text};

/// Wraps a [`web_sys::Document`].
///
/// # Listeners
///
/// Each distinct [`Listener`] is bridged through one JavaScript closure, reference-counted per `WebDom` instance.
/// Closures are released in [`Dom::end_of_pass`] once no element uses them anymore.
///
/// Associated event listeners will start throwing errors into JavaScript if the instance is dropped while they are still attached.
pub struct WebDom {
	document: web_sys::Document,
	handler_handles: RcHashMap<usize, u16, Closure<dyn Fn(web_sys::Event)>>,
}
impl WebDom {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self {
			document,
			handler_handles: RcHashMap::new(),
		}
	}

	/// The current window's document, if there is one.
	#[must_use]
	pub fn from_window() -> Option<Self> {
		web_sys::window()?.document().map(Self::new)
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}
impl fmt::Debug for WebDom {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WebDom")
			.field("document", &self.document)
			.field("handler_handles", &self.handler_handles.len())
			.finish()
	}
}

fn host_error(operation: &'static str, error: &JsValue) -> HostError {
	let message = error
		.dyn_ref::<js_sys::Error>()
		.map(|error| String::from(error.message()))
		.or_else(|| error.as_string())
		.unwrap_or_else(|| format!("{:?}", error));
	HostError::new(operation, message)
}

fn as_element<'a>(operation: &'static str, node: &'a Node) -> Result<&'a Element, HostError> {
	node.dyn_ref::<Element>()
		.ok_or_else(|| HostError::new(operation, format!("Expected an element but found {:?}", node)))
}

impl Dom for WebDom {
	type Node = Node;

	fn create_element(&mut self, tag: &str) -> Result<Node, HostError> {
		self.document
			.create_element(tag)
			.map(Into::into)
			.map_err(|error| host_error("createElement", &error))
	}

	fn create_text_node(&mut self, data: &str) -> Node {
		self.document.create_text_node(data).into()
	}

	fn child_nodes(&self, parent: &Node) -> Vec<Node> {
		let child_nodes = parent.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).collect()
	}

	fn child_node(&self, parent: &Node, index: usize) -> Option<Node> {
		parent.child_nodes().item(u32::try_from(index).ok()?)
	}

	fn child_count(&self, parent: &Node) -> usize {
		parent.child_nodes().length() as usize
	}

	fn last_child(&self, parent: &Node) -> Option<Node> {
		parent.last_child()
	}

	fn element_children(&self, parent: &Node) -> Vec<Node> {
		match parent.dyn_ref::<Element>() {
			Some(element) => {
				let children = element.children();
				(0..children.length()).filter_map(|i| children.item(i)).map(Into::into).collect()
			}
			None => Vec::new(),
		}
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn tag_name(&self, node: &Node) -> Option<String> {
		node.dyn_ref::<Element>().map(|element| element.tag_name().to_lowercase())
	}

	fn text_data(&self, node: &Node) -> Option<String> {
		node.dyn_ref::<Text>().map(|text| text.data())
	}

	fn set_text(&mut self, node: &Node, data: &str) {
		node.set_text_content(Some(data));
	}

	fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		parent.append_child(child).map(drop).map_err(|error| host_error("appendChild", &error))
	}

	fn insert_before(&mut self, parent: &Node, child: &Node, reference: &Node) -> Result<(), HostError> {
		parent
			.insert_before(child, Some(reference))
			.map(drop)
			.map_err(|error| host_error("insertBefore", &error))
	}

	fn replace_child(&mut self, parent: &Node, new: &Node, old: &Node) -> Result<(), HostError> {
		parent.replace_child(new, old).map(drop).map_err(|error| host_error("replaceChild", &error))
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		parent.remove_child(child).map(drop).map_err(|error| host_error("removeChild", &error))
	}

	fn clear_children(&mut self, parent: &Node) {
		parent.set_text_content(None);
	}

	fn attributes(&self, element: &Node) -> Vec<(String, String)> {
		match element.dyn_ref::<Element>() {
			Some(element) => {
				let attributes = element.attributes();
				(0..attributes.length())
					.filter_map(|i| attributes.item(i))
					.map(|attribute| (attribute.name(), attribute.value()))
					.collect()
			}
			None => Vec::new(),
		}
	}

	fn set_attribute(&mut self, element: &Node, name: &str, value: &str) -> Result<(), HostError> {
		as_element("setAttribute", element)?
			.set_attribute(name, value)
			.map_err(|error| host_error("setAttribute", &error))
	}

	fn remove_attribute(&mut self, element: &Node, name: &str) -> Result<(), HostError> {
		as_element("removeAttribute", element)?
			.remove_attribute(name)
			.map_err(|error| host_error("removeAttribute", &error))
	}

	fn set_class_name(&mut self, element: &Node, value: &str) {
		if let Some(element) = element.dyn_ref::<Element>() {
			element.set_class_name(value);
		}
	}

	/// Assigns through the live `style` object, so camelCase property names work as they do in JavaScript.
	fn set_style_property(&mut self, element: &Node, property: &str, value: &str) -> Result<(), HostError> {
		let style = Reflect::get(element, &JsValue::from_str("style")).map_err(|error| host_error("style", &error))?;
		if !style.is_object() {
			return Err(HostError::new("style", format!("{:?} has no style object", element)));
		}
		Reflect::set(&style, &JsValue::from_str(property), &JsValue::from_str(value))
			.map(drop)
			.map_err(|error| host_error("style", &error))
	}

	fn set_inner_html(&mut self, element: &Node, html: &str) -> Result<(), HostError> {
		as_element("innerHTML", element)?.set_inner_html(html);
		Ok(())
	}

	#[instrument(skip(self))]
	fn add_event_listener(&mut self, element: &Node, event: &str, listener: &Listener) -> Result<(), HostError> {
		let closure = self
			.handler_handles
			.increment_or_insert_with(listener.id(), || {
				let listener = listener.clone();
				Closure::wrap(Box::new(move |event: web_sys::Event| listener.call(&event)) as Box<dyn Fn(web_sys::Event)>)
			})
			.map_err(|_| HostError::new("addEventListener", "Too many (more than 65k) active references to the same listener"))?;
		element
			.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())
			.map_err(|error| host_error("addEventListener", &error))
	}

	#[instrument(skip(self))]
	fn remove_event_listener(&mut self, element: &Node, event: &str, listener: &Listener) -> Result<(), HostError> {
		let closure = self
			.handler_handles
			.weak_decrement(&listener.id())
			.map_err(|_| HostError::new("removeEventListener", "Listener was removed more often than it was added"))?;
		match closure {
			Some(closure) => element
				.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref::<Function>())
				.map_err(|error| host_error("removeEventListener", &error)),
			None => {
				trace!("No closure for {:?}", listener);
				Ok(())
			}
		}
	}

	fn end_of_pass(&mut self) {
		{
			let drain = self.handler_handles.drain_weak();
			trace!("Freed {} event listener(s).", drain.count());
		}
		info!("Event listener count/cached capacity: {}/{}", self.handler_handles.len(), self.handler_handles.capacity());
	}
}

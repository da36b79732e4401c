//! The seam between the reconciler and a live DOM.

use crate::{error::HostError, node::Listener};
use core::fmt::Debug;

/// A live document the [`Renderer`](`crate::Renderer`) mutates.
///
/// Implementations: [`mem::Document`](`crate::mem::Document`) everywhere,
/// and `web::WebDom` on `wasm32`.
///
/// `Node` handles are cheap to clone and compare by identity.
/// Element-only operations may be called with any node and should fail or do nothing for non-elements.
pub trait Dom {
	type Node: 'static + Clone + PartialEq + Debug;

	/// # Errors
	///
	/// If the host rejects `tag`.
	fn create_element(&mut self, tag: &str) -> Result<Self::Node, HostError>;
	fn create_text_node(&mut self, data: &str) -> Self::Node;

	fn child_nodes(&self, parent: &Self::Node) -> Vec<Self::Node>;
	fn child_node(&self, parent: &Self::Node, index: usize) -> Option<Self::Node> {
		self.child_nodes(parent).into_iter().nth(index)
	}
	fn child_count(&self, parent: &Self::Node) -> usize {
		self.child_nodes(parent).len()
	}
	fn last_child(&self, parent: &Self::Node) -> Option<Self::Node> {
		self.child_nodes(parent).pop()
	}
	/// Element children only, in document order.
	fn element_children(&self, parent: &Self::Node) -> Vec<Self::Node> {
		self.child_nodes(parent).into_iter().filter(|node| self.tag_name(node).is_some()).collect()
	}
	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

	/// [`None`] iff `node` isn't an element.
	fn tag_name(&self, node: &Self::Node) -> Option<String>;
	/// [`None`] iff `node` isn't a text node.
	fn text_data(&self, node: &Self::Node) -> Option<String>;
	fn is_text(&self, node: &Self::Node) -> bool {
		self.text_data(node).is_some()
	}
	fn set_text(&mut self, node: &Self::Node, data: &str);

	/// Moves `child` to the end of `parent`'s child list.
	///
	/// # Errors
	///
	/// If the host rejects the insertion.
	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
	/// # Errors
	///
	/// If `reference` isn't a child of `parent` or the host rejects the insertion.
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: &Self::Node) -> Result<(), HostError>;
	/// # Errors
	///
	/// If `old` isn't a child of `parent` or the host rejects the insertion.
	fn replace_child(&mut self, parent: &Self::Node, new: &Self::Node, old: &Self::Node) -> Result<(), HostError>;
	/// # Errors
	///
	/// If `child` isn't a child of `parent`.
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;
	fn clear_children(&mut self, parent: &Self::Node);

	fn attributes(&self, element: &Self::Node) -> Vec<(String, String)>;
	/// # Errors
	///
	/// If the host rejects `name`.
	fn set_attribute(&mut self, element: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;
	/// # Errors
	///
	/// If the host rejects `name`.
	fn remove_attribute(&mut self, element: &Self::Node, name: &str) -> Result<(), HostError>;
	fn set_class_name(&mut self, element: &Self::Node, value: &str);
	/// Sets one property of the live style object. An empty `value` clears it.
	///
	/// # Errors
	///
	/// If `element` has no style object.
	fn set_style_property(&mut self, element: &Self::Node, property: &str, value: &str) -> Result<(), HostError>;
	/// # Errors
	///
	/// If `element` can't hold markup.
	fn set_inner_html(&mut self, element: &Self::Node, html: &str) -> Result<(), HostError>;

	/// # Errors
	///
	/// If `element` isn't an event target or the host rejects the listener.
	fn add_event_listener(&mut self, element: &Self::Node, event: &str, listener: &Listener) -> Result<(), HostError>;
	/// # Errors
	///
	/// If `element` isn't an event target or the host rejects the removal.
	fn remove_event_listener(&mut self, element: &Self::Node, event: &str, listener: &Listener) -> Result<(), HostError>;

	/// Called once after each root [`render`](`crate::Renderer::render`) or [`patch`](`crate::Renderer::patch`).
	///
	/// Hosts can release listener resources here.
	fn end_of_pass(&mut self) {}
}

//! Reads existing live nodes back into descriptors.
//!
//! Use this to adopt markup the [`Renderer`](`crate::Renderer`) didn't create (for example server-rendered HTML)
//! as the "old" side of a first [`patch`](`crate::Renderer::patch`).
//!
//! Listeners and refs can't be recovered, and `style` is loaded as a plain string.

use crate::{
	host::Dom,
	node::{Child, Props, VNode, VNodeType, Value},
};
use tracing::trace;

#[must_use]
pub fn load_child_nodes<D: Dom>(dom: &D, parent: &D::Node) -> Vec<Child> {
	dom.child_nodes(parent).iter().filter_map(|node| load_node(dom, node)).collect()
}

/// [`None`] for nodes that are neither elements nor text.
#[must_use]
pub fn load_node<D: Dom>(dom: &D, node: &D::Node) -> Option<Child> {
	if let Some(text) = dom.text_data(node) {
		Some(Child::Text(text))
	} else if let Some(vnode) = load_element(dom, node) {
		Some(Child::Node(vnode))
	} else {
		trace!("Skipping unrecognised child node: {:?}", node);
		None
	}
}

/// [`None`] iff `element` isn't an element.
#[must_use]
pub fn load_element<D: Dom>(dom: &D, element: &D::Node) -> Option<VNode> {
	let tag = dom.tag_name(element)?.to_lowercase();
	Some(VNode::new(VNodeType::new(&tag), load_attributes(dom, element), load_child_nodes(dom, element)))
}

/// All attributes as string props, with `class` as `className`.
#[must_use]
pub fn load_attributes<D: Dom>(dom: &D, element: &D::Node) -> Props {
	dom.attributes(element)
		.into_iter()
		.map(|(name, value)| {
			let name = if name == "class" { "className".to_owned() } else { name };
			(name, Value::Str(value))
		})
		.collect()
}

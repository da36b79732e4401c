//! Materialization: building live nodes from descriptors, with no prior DOM to reuse.

use crate::{
	diff::Renderer,
	error::{placeholder_text, report, Error, RenderError},
	host::Dom,
	node::{Child, Props, VNode, VNodeType},
};
use tracing::trace_span;

/// What a descriptor materializes as.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveNode<N> {
	Element(N),
	Text(N),
	/// Nodes to be spliced into the caller's parent, in order. May be empty.
	Fragment(Vec<N>),
}
impl<N> LiveNode<N> {
	#[must_use]
	pub fn into_nodes(self) -> Vec<N> {
		match self {
			LiveNode::Element(node) | LiveNode::Text(node) => vec![node],
			LiveNode::Fragment(nodes) => nodes,
		}
	}
}

impl<D: Dom> Renderer<D> {
	/// Materializes any child descriptor. Skip values produce an empty [`LiveNode::Fragment`].
	pub fn materialize(&mut self, child: &Child) -> LiveNode<D::Node> {
		match child {
			Child::Node(vnode) => self.materialize_vnode(vnode),
			Child::Text(_) | Child::Number(_) => {
				let text = child.to_text().unwrap_or_default();
				LiveNode::Text(self.dom.create_text_node(&text))
			}
			Child::Bool(_) | Child::Null => LiveNode::Fragment(Vec::new()),
		}
	}

	/// Materializes `vnode` and its subtree.
	///
	/// This is a failure boundary: if the node is invalid or the host rejects part of it, the error is [reported](`crate::error::report`)
	/// and a placeholder text node is returned instead.
	pub fn materialize_vnode(&mut self, vnode: &VNode) -> LiveNode<D::Node> {
		let span = trace_span!("materialize", kind = %vnode.kind);
		let _enter = span.enter();

		match self.try_materialize(vnode) {
			Ok(live) => live,
			Err(error) => {
				let placeholder = placeholder_text(&self.config, &error);
				report(&self.config, &RenderError::new(error, Some(vnode.clone()), "materialize"));
				LiveNode::Text(self.dom.create_text_node(&placeholder))
			}
		}
	}

	fn try_materialize(&mut self, vnode: &VNode) -> Result<LiveNode<D::Node>, Error> {
		vnode.validate()?;
		match &vnode.kind {
			VNodeType::Fragment => {
				let mut nodes = Vec::with_capacity(vnode.children.len());
				for child in vnode.children.iter().filter(|child| !child.is_skippable()) {
					nodes.extend(self.materialize(child).into_nodes());
				}
				Ok(LiveNode::Fragment(nodes))
			}
			VNodeType::Element(tag) => {
				let element = self.dom.create_element(tag)?;
				self.update_props(&element, &Props::new(), &vnode.props)?;
				if vnode.inner_html().is_none() {
					self.append_children(&element, &vnode.children)?;
				}
				Ok(LiveNode::Element(element))
			}
		}
	}

	pub(crate) fn append_children(&mut self, parent: &D::Node, children: &[Child]) -> Result<(), Error> {
		for child in children.iter().filter(|child| !child.is_skippable()) {
			let live = self.materialize(child);
			self.append_live(parent, live)?;
		}
		Ok(())
	}

	pub(crate) fn append_live(&mut self, parent: &D::Node, live: LiveNode<D::Node>) -> Result<(), Error> {
		for node in live.into_nodes() {
			self.dom.append_child(parent, &node)?;
		}
		Ok(())
	}
}

use crate::{
	config::{Config, ConfigUpdate},
	create::LiveNode,
	error::{report, warn, Error, RenderError},
	host::Dom,
	node::{Child, Key, VNode},
};
use hashbrown::HashMap;
use tracing::{instrument, trace, trace_span};

/// Materializes and patches [`VNode`] trees into a [`Dom`].
///
/// A `Renderer` holds no tree state between calls: each [`patch`](`Renderer::patch`) is given both the old and the new descriptors.
///
/// # Correct Use
///
/// The old descriptors passed to [`patch`](`Renderer::patch`) must be the ones that were last rendered or patched into that slot.
/// Any other mutations of the affected live subtree between calls must be undone before patching it again.
/// Violating this is memory-safe, but may lead to an unexpected DOM structure and logged errors.
#[derive(Debug)]
pub struct Renderer<D: Dom> {
	pub(crate) dom: D,
	pub(crate) config: Config,
}

/// How a child list is diffed. Chosen once per list by [`ChildStrategy::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStrategy {
	/// Pairs old and new children by index.
	Positional,
	/// Reuses live elements by `key`, then re-appends the whole list in the new order.
	Keyed,
}
impl ChildStrategy {
	/// [`Keyed`](`ChildStrategy::Keyed`) iff any new child is a node with a non-nullish `key`.
	#[must_use]
	pub fn select(new_children: &[Child]) -> Self {
		if new_children.iter().filter_map(Child::as_vnode).any(|vnode| vnode.key_value().is_some()) {
			Self::Keyed
		} else {
			Self::Positional
		}
	}
}

impl<D: Dom> Renderer<D> {
	#[must_use]
	pub fn new(dom: D) -> Self {
		Self::with_config(dom, Config::default())
	}

	#[must_use]
	pub fn with_config(dom: D, config: Config) -> Self {
		Self { dom, config }
	}

	#[must_use]
	pub fn dom(&self) -> &D {
		&self.dom
	}

	pub fn dom_mut(&mut self) -> &mut D {
		&mut self.dom
	}

	#[must_use]
	pub fn into_dom(self) -> D {
		self.dom
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn update_config(&mut self, update: ConfigUpdate) {
		self.config.update(update);
	}

	/// Discards `container`'s current content and materializes `vnode` into it.
	///
	/// Failures are [reported](`crate::error::report`), never returned.
	#[instrument(skip(self, vnode))]
	pub fn render(&mut self, vnode: &VNode, container: &D::Node) {
		self.dom.clear_children(container);
		let live = self.materialize_vnode(vnode);
		if let Err(error) = self.append_live(container, live) {
			report(&self.config, &RenderError::new(error, Some(vnode.clone()), "render"));
		}
		self.dom.end_of_pass();
	}

	/// Brings the live node at `index` of `parent` from `old` to `new`.
	///
	/// [`None`] and skip values mean "absent": absent → present appends, present → absent removes.
	///
	/// # Self-addressing
	///
	/// If `parent`'s own tag equals the type of both `old` and `new` and the slot is empty or holds an element of another tag,
	/// `parent` itself is updated in place instead of a child. This lets `patch(ul, ul_a, ul_b, 0)` update `ul`'s children.
	/// It's decided by tag coincidence only, so an intended child insertion can be misread as a self-update.
	///
	/// Failures are [reported](`crate::error::report`), never returned. Work on the affected slot stops at the failure.
	#[instrument(skip(self, old, new))]
	pub fn patch(&mut self, parent: &D::Node, old: Option<&Child>, new: Option<&Child>, index: usize) {
		self.patch_slot(parent, old, new, index);
		self.dom.end_of_pass();
	}

	fn patch_slot(&mut self, parent: &D::Node, old: Option<&Child>, new: Option<&Child>, index: usize) {
		if let Err(error) = self.try_patch(parent, old, new, index) {
			report(&self.config, &RenderError::new(error, new.and_then(Child::as_vnode).cloned(), "patch"));
		}
	}

	fn try_patch(&mut self, parent: &D::Node, old: Option<&Child>, new: Option<&Child>, index: usize) -> Result<(), Error> {
		let old = old.filter(|child| !child.is_skippable());
		let new = new.filter(|child| !child.is_skippable());
		let old_node = self.dom.child_node(parent, index);

		match (old, new) {
			(None, None) => Ok(()),
			(None, Some(new)) => {
				trace!(index, "Adding node.");
				let live = self.materialize(new);
				self.append_live(parent, live)
			}
			(Some(_), None) => {
				trace!(index, "Removing node.");
				self.remove_node(parent, old_node.as_ref())
			}
			(Some(old), Some(new)) => self.update_node(parent, old, new, old_node),
		}
	}

	fn update_node(&mut self, parent: &D::Node, old: &Child, new: &Child, old_node: Option<D::Node>) -> Result<(), Error> {
		match (old, new) {
			_ if old.is_primitive() && new.is_primitive() => self.update_text(parent, old, new, old_node),
			(Child::Node(old), Child::Node(new)) if old.kind == new.kind && old.props.get("key") == new.props.get("key") => {
				self.update_element(parent, old, new, old_node)
			}
			_ => {
				let span = trace_span!("Replacing node", ?old_node);
				let _enter = span.enter();
				let live = self.materialize(new);
				self.place(parent, live, old_node.as_ref())
			}
		}
	}

	fn update_text(&mut self, parent: &D::Node, old: &Child, new: &Child, old_node: Option<D::Node>) -> Result<(), Error> {
		let new_text = new.to_text().unwrap_or_default();
		if old.to_text().unwrap_or_default() == new_text {
			return Ok(());
		}

		match old_node {
			Some(node) if self.dom.is_text(&node) => {
				trace!(?node, text = %new_text, "Updating text in place.");
				self.dom.set_text(&node, &new_text);
				Ok(())
			}
			old_node => {
				let text = self.dom.create_text_node(&new_text);
				self.place(parent, LiveNode::Text(text), old_node.as_ref())
			}
		}
	}

	fn update_element(&mut self, parent: &D::Node, old: &VNode, new: &VNode, old_node: Option<D::Node>) -> Result<(), Error> {
		let parent_tag = self.dom.tag_name(parent).map(|tag| tag.to_lowercase());
		let parent_matches = parent_tag.as_deref() == Some(old.kind.as_str()) && parent_tag.as_deref() == Some(new.kind.as_str());
		let old_tag = old_node.as_ref().and_then(|node| self.dom.tag_name(node)).map(|tag| tag.to_lowercase());
		let old_tag_differs = old_tag.as_ref().map_or(false, |tag| tag != old.kind.as_str());

		let target = match old_node {
			None if parent_matches => parent.clone(),
			Some(_) if parent_matches && old_tag_differs => parent.clone(),
			Some(node) if old_tag.is_some() => node,
			old_node => {
				let span = trace_span!("Replacing non-element", ?old_node);
				let _enter = span.enter();
				let live = self.materialize_vnode(new);
				return self.place(parent, live, old_node.as_ref());
			}
		};

		let span = trace_span!("Updating element", kind = %new.kind, ?target);
		let _enter = span.enter();
		self.update_props(&target, &old.props, &new.props)?;
		self.patch_content(&target, old, new)
	}

	/// Reconciles an updated element's children. Raw markup takes the place of structural children.
	fn patch_content(&mut self, element: &D::Node, old: &VNode, new: &VNode) -> Result<(), Error> {
		match (old.inner_html(), new.inner_html()) {
			// Set (or kept) by `update_props`.
			(_, Some(_)) => Ok(()),
			(Some(_), None) => {
				trace!(?element, "Replacing raw markup with children.");
				self.dom.clear_children(element);
				self.append_children(element, &new.children)
			}
			(None, None) => self.patch_children(element, &old.children, &new.children),
		}
	}

	/// Puts `live` where `old_node` is, or at the end of `parent` if there is none.
	fn place(&mut self, parent: &D::Node, live: LiveNode<D::Node>, old_node: Option<&D::Node>) -> Result<(), Error> {
		let old_node = match old_node {
			Some(old_node) => old_node,
			None => return self.append_live(parent, live),
		};
		match live {
			LiveNode::Element(node) | LiveNode::Text(node) => self.dom.replace_child(parent, &node, old_node)?,
			LiveNode::Fragment(nodes) => {
				for node in &nodes {
					self.dom.insert_before(parent, node, old_node)?;
				}
				self.dom.remove_child(parent, old_node)?;
			}
		}
		Ok(())
	}

	/// Detaches `node` if it's (still) a child of `parent`.
	fn remove_node(&mut self, parent: &D::Node, node: Option<&D::Node>) -> Result<(), Error> {
		match node {
			Some(node) if self.dom.parent_node(node).as_ref() == Some(parent) => self.dom.remove_child(parent, node).map_err(Into::into),
			_ => Ok(()),
		}
	}

	/// Reconciles `parent`'s children from `old` to `new`, with the [`ChildStrategy`] selected for `new`.
	///
	/// # Errors
	///
	/// Iff the host rejects a structural change outside of an individual slot.
	pub fn patch_children(&mut self, parent: &D::Node, old: &[Child], new: &[Child]) -> Result<(), Error> {
		match ChildStrategy::select(new) {
			ChildStrategy::Positional => self.patch_children_by_index(parent, old, new),
			ChildStrategy::Keyed => self.patch_children_with_keys(parent, old, new),
		}
	}

	/// Patches slot `i` from `old[i]` to `new[i]` for each index, then trims trailing live nodes
	/// down to the number of renderable entries in `new`.
	///
	/// Each slot is its own failure boundary.
	///
	/// # Errors
	///
	/// Iff the host rejects a removal.
	#[instrument(skip(self, old, new), fields(old_len = old.len(), new_len = new.len()))]
	pub fn patch_children_by_index(&mut self, parent: &D::Node, old: &[Child], new: &[Child]) -> Result<(), Error> {
		for i in 0..old.len().max(new.len()) {
			let old_child = old.get(i);
			match new.get(i) {
				Some(new_child) if !new_child.is_skippable() => self.patch_slot(parent, old_child, Some(new_child), i),
				_ => {
					if old_child.map_or(false, |old_child| !old_child.is_skippable()) {
						if let Some(node) = self.dom.child_node(parent, i) {
							self.dom.remove_child(parent, &node)?;
						}
					}
				}
			}
		}

		let keep = new.iter().filter(|child| !child.is_skippable()).count();
		while self.dom.child_count(parent) > keep {
			match self.dom.last_child(parent) {
				Some(last) => self.dom.remove_child(parent, &last)?,
				None => break,
			}
		}
		Ok(())
	}

	/// Reuses `parent`'s element children by key and re-appends all children in the order of `new`.
	///
	/// Primitives are always recreated. Unmatched old elements are dropped without further notice.
	///
	/// # Errors
	///
	/// Iff the host rejects an update of a reused element or the final re-append.
	#[instrument(skip(self, old, new), fields(old_len = old.len(), new_len = new.len()))]
	pub fn patch_children_with_keys(&mut self, parent: &D::Node, old: &[Child], new: &[Child]) -> Result<(), Error> {
		let mut reusable = HashMap::new();
		let mut elements = self.dom.element_children(parent).into_iter();
		for old_vnode in old.iter().filter_map(Child::as_vnode) {
			let element = match elements.next() {
				Some(element) => element,
				None => break,
			};
			let value = match old_vnode.key_value() {
				Some(value) => value,
				None => continue,
			};
			match Key::from_value(value) {
				Some(key) => {
					if reusable.insert(key, (old_vnode, element)).is_some() {
						warn(&self.config, format_args!("Duplicate key {:?} on <{}>, only the last one is reused", value, old_vnode.kind));
					}
				}
				None => warn(&self.config, format_args!("Unusable key {:?}", value)),
			}
		}

		let mut nodes = Vec::with_capacity(new.len());
		for child in new {
			match child {
				Child::Bool(_) | Child::Null => (),
				Child::Text(_) | Child::Number(_) => {
					let text = child.to_text().unwrap_or_default();
					nodes.push(self.dom.create_text_node(&text));
				}
				Child::Node(vnode) => match vnode.key_value().and_then(Key::from_value).and_then(|key| reusable.remove(&key)) {
					Some((old_vnode, element)) => {
						let span = trace_span!("Reusing keyed element", key = ?vnode.key_value(), ?element);
						let _enter = span.enter();
						self.update_props(&element, &old_vnode.props, &vnode.props)?;
						self.patch_content(&element, old_vnode, vnode)?;
						nodes.push(element);
					}
					None => nodes.extend(self.materialize_vnode(vnode).into_nodes()),
				},
			}
		}
		if !reusable.is_empty() {
			trace!("Dropping {} unmatched keyed element(s).", reusable.len());
		}

		self.dom.clear_children(parent);
		for node in &nodes {
			self.dom.append_child(parent, node)?;
		}
		Ok(())
	}
}

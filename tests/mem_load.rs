use thicket_dom::{
	load::{load_child_nodes, load_element},
	Child, Dom, Props, VNode, Value,
};

use mem_common_::renderer;

#[test]
fn loads_elements_and_text() {
	let (mut renderer, container) = renderer();
	let dom = renderer.dom_mut();
	let nav = dom.create_element("NAV").unwrap();
	dom.set_attribute(&nav, "class", "top").unwrap();
	dom.set_attribute(&nav, "id", "menu").unwrap();
	let link = dom.create_element("a").unwrap();
	dom.set_attribute(&link, "href", "/").unwrap();
	let home = dom.create_text_node("Home");
	dom.append_child(&link, &home).unwrap();
	dom.append_child(&nav, &link).unwrap();
	dom.append_child(&container, &nav).unwrap();
	let trailing = dom.create_text_node("!");
	dom.append_child(&container, &trailing).unwrap();

	let loaded = load_child_nodes(renderer.dom(), &container);

	assert_eq!(
		loaded,
		[
			Child::from(VNode::new(
				thicket_dom::VNodeType::new("nav"),
				Props::new().with("className", "top").with("id", "menu"),
				vec![VNode::element("a").prop("href", "/").child("Home").into()],
			)),
			Child::from("!"),
		]
	);
}

#[test]
fn raw_markup_is_skipped() {
	let (mut renderer, container) = renderer();
	let dom = renderer.dom_mut();
	let div = dom.create_element("div").unwrap();
	dom.set_inner_html(&div, "<b>opaque</b>").unwrap();
	dom.append_child(&container, &div).unwrap();

	assert_eq!(load_element(renderer.dom(), &div), Some(VNode::element("div")));
	assert_eq!(load_element(renderer.dom(), &div.child_nodes()[0]), None);
}

#[test]
fn loaded_markup_can_be_patched_in_place() {
	let (mut renderer, container) = renderer();
	let dom = renderer.dom_mut();
	let ul = dom.create_element("ul").unwrap();
	for text in ["one", "two"] {
		let li = dom.create_element("li").unwrap();
		let text = dom.create_text_node(text);
		dom.append_child(&li, &text).unwrap();
		dom.append_child(&ul, &li).unwrap();
	}
	dom.append_child(&container, &ul).unwrap();
	let items = ul.child_nodes();

	let old = load_child_nodes(renderer.dom(), &container);
	let new = Child::from(
		VNode::element("ul")
			.prop("role", "list")
			.child(VNode::element("li").child("one"))
			.child(VNode::element("li").prop("hidden", Value::Bool(true)).child("zwei")),
	);
	renderer.patch(&container, old.first(), Some(&new), 0);

	assert_eq!(container.inner_html(), r#"<ul role="list"><li>one</li><li hidden="">zwei</li></ul>"#);
	assert_eq!(container.child_nodes(), [ul.clone()]);
	assert_eq!(ul.child_nodes(), items);
}

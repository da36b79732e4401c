use thicket_dom::{fragment, h, Child, Dom, LiveNode, Props, VNode};

use mem_common_::{renderer, tags};

#[test]
fn element_with_class_and_text() {
	let (mut renderer, container) = renderer();

	renderer.render(&h("div", Props::new().with("className", "box"), ["Hello"]), &container);

	assert_eq!(container.inner_html(), r#"<div class="box">Hello</div>"#);
}

#[test]
fn render_discards_previous_content() {
	let (mut renderer, container) = renderer();
	let stale = renderer.dom_mut().create_text_node("stale");
	renderer.dom_mut().append_child(&container, &stale).unwrap();

	renderer.render(&VNode::element("p").child("fresh"), &container);

	assert_eq!(container.inner_html(), "<p>fresh</p>");
	assert!(stale.parent().is_none());
}

#[test]
fn primitives_and_skip_values() {
	let (mut renderer, container) = renderer();
	let vnode = VNode::element("p")
		.child(1.5)
		.child(Child::Null)
		.child(true)
		.child("x")
		.child(false)
		.child(0)
		.child("");

	renderer.render(&vnode, &container);

	let p = &container.child_nodes()[0];
	assert_eq!(p.inner_html(), "1.5x0");
	// The empty string still materializes.
	assert_eq!(tags(&p.child_nodes()), ["#text", "#text", "#text", "#text"]);
}

#[test]
fn nested_elements() {
	let (mut renderer, container) = renderer();
	let vnode = h(
		"ul",
		Props::new().with("id", "list"),
		vec![
			VNode::element("li").child("one"),
			VNode::element("li").child(VNode::element("b").child("two")),
		],
	);

	renderer.render(&vnode, &container);

	assert_eq!(container.inner_html(), r#"<ul id="list"><li>one</li><li><b>two</b></li></ul>"#);
}

#[test]
fn fragments_splice_into_their_parent() {
	let (mut renderer, container) = renderer();

	renderer.render(&fragment(vec![Child::from("a"), VNode::element("span").into(), Child::from(2)]), &container);
	assert_eq!(container.inner_html(), "a<span></span>2");

	let nested = VNode::element("div").child("<").child(fragment(vec![VNode::element("i"), VNode::element("b")])).child(">");
	renderer.render(&nested, &container);
	assert_eq!(container.inner_html(), "<div>&lt;<i></i><b></b>&gt;</div>");
}

#[test]
fn materialize_shapes() {
	let (mut renderer, _) = renderer();

	match renderer.materialize(&Child::from(42)) {
		LiveNode::Text(text) => assert_eq!(text.text_content(), "42"),
		other => panic!("Expected text, found {:?}", other),
	}

	match renderer.materialize(&Child::from(VNode::element("em"))) {
		LiveNode::Element(element) => assert_eq!(element.tag_name().as_deref(), Some("em")),
		other => panic!("Expected an element, found {:?}", other),
	}

	assert_eq!(renderer.materialize(&Child::Null), LiveNode::Fragment(Vec::new()));
	assert_eq!(renderer.materialize(&Child::Bool(false)), LiveNode::Fragment(Vec::new()));

	match renderer.materialize(&fragment(vec!["a", "b"]).into()) {
		LiveNode::Fragment(nodes) => assert_eq!(nodes.iter().map(|node| node.text_content()).collect::<Vec<_>>(), ["a", "b"]),
		other => panic!("Expected a fragment, found {:?}", other),
	}
}

#[test]
fn tags_are_lowercased_by_the_document() {
	let (mut renderer, container) = renderer();

	renderer.render(&VNode::element("SECTION").child(VNode::element("Br")), &container);

	assert_eq!(container.inner_html(), "<section><br></section>");
}

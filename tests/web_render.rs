#![cfg(target_arch = "wasm32")]

use std::{cell::Cell, rc::Rc};
use thicket_dom::{web::WebDom, Child, Dom, Listener, Renderer, VNode};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{HtmlBodyElement, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static mut LOG_INITIALIZED: bool = false;

fn setup() -> (Renderer<WebDom>, web_sys::Node) {
	unsafe {
		if !LOG_INITIALIZED {
			tracing_wasm::set_as_global_default();
			LOG_INITIALIZED = true;
		}
	}

	let mut renderer = Renderer::new(WebDom::from_window().unwrap());
	let body = renderer.dom().document().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let container = renderer.dom_mut().create_element("main").unwrap();
	body.append_child(&container).unwrap();
	(renderer, container)
}

#[wasm_bindgen_test]
fn render_markup() {
	let (mut renderer, container) = setup();

	renderer.render(&VNode::element("div").prop("className", "box").child("Hello"), &container);

	let container: &web_sys::Element = container.unchecked_ref();
	assert_eq!(container.inner_html(), r#"<div class="box">Hello</div>"#);
	container.remove();
}

#[wasm_bindgen_test]
fn keyed_reorder() {
	let (mut renderer, container) = setup();
	let list = |keys: &[&str]| Child::from(VNode::element("ul").children(keys.iter().map(|key| VNode::element("li").key(*key).child(*key))));
	let old = list(&["a", "b", "c"]);
	let new = list(&["c", "a", "b"]);

	renderer.patch(&container, None, Some(&old), 0);
	let ul = container.first_child().unwrap();
	let a = ul.first_child().unwrap();

	renderer.patch(&container, Some(&old), Some(&new), 0);

	let container: &web_sys::Element = container.unchecked_ref();
	assert_eq!(container.inner_html(), "<ul><li>c</li><li>a</li><li>b</li></ul>");
	assert_eq!(ul.child_nodes().item(1).unwrap(), a);
	container.remove();
}

#[wasm_bindgen_test]
fn click() {
	let (mut renderer, container) = setup();
	let clicks = Rc::new(Cell::new(0));
	let on_click = Listener::new({
		let clicks = Rc::clone(&clicks);
		move |event| {
			event.downcast_ref::<web_sys::Event>().expect("Expected Event but received something else.");
			clicks.set(clicks.get() + 1);
		}
	});
	let button = Child::from(VNode::element("button").prop("onClick", on_click).child("Click me"));

	renderer.patch(&container, None, Some(&button), 0);
	assert_eq!(clicks.get(), 0);

	let element: HtmlElement = container.first_child().unwrap().dyn_into().unwrap();
	element.click();
	assert_eq!(clicks.get(), 1);

	let plain = Child::from(VNode::element("button").child("Click me"));
	renderer.patch(&container, Some(&button), Some(&plain), 0);
	assert_eq!(container.first_child().unwrap(), **element);
	element.click();
	assert_eq!(clicks.get(), 1);
	container.unchecked_ref::<web_sys::Element>().remove();
}

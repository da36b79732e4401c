use std::{cell::Cell, rc::Rc};
use thicket_dom::{
	config::ErrorHandler,
	error::{placeholder_text, report},
	Child, Config, ConfigUpdate, Error, HostError, RenderError, VNode,
};

use mem_common_::{capture_logs, collecting_handler, renderer, renderer_with};

#[test]
fn invalid_vnode_becomes_a_dev_placeholder() {
	let (mut renderer, container) = renderer();
	let (handler, errors) = collecting_handler();
	renderer.update_config(ConfigUpdate {
		on_error: Some(Some(handler)),
		..ConfigUpdate::default()
	});

	renderer.render(&VNode::element("div").child(VNode::element("bad tag")).child("ok"), &container);

	assert_eq!(container.inner_html(), r#"<div>[Render Error: Invalid VNode structure: invalid element type "bad tag"]ok</div>"#);
	let errors = errors.borrow();
	assert_eq!(errors.len(), 1);
	assert!(matches!(errors[0].error, Error::InvalidVNode(_)));
	assert_eq!(errors[0].context, Some("materialize"));
	assert_eq!(errors[0].vnode, Some(VNode::element("bad tag")));
}

#[test]
fn production_placeholders_are_generic() {
	let (mut renderer, container) = renderer_with(Config {
		dev_mode: false,
		..Config::default()
	});

	renderer.render(&VNode::element("").child("lost"), &container);

	assert_eq!(container.text_content(), "[Render Error]");
}

#[test]
fn host_failures_replace_the_subtree() {
	let (mut renderer, container) = renderer();
	let (handler, errors) = collecting_handler();
	renderer.update_config(ConfigUpdate {
		on_error: Some(Some(handler)),
		..ConfigUpdate::default()
	});

	renderer.render(&VNode::element("p").child(VNode::element("span").prop("bad name", "x").child("gone")), &container);

	assert_eq!(container.inner_html(), "<p>[Render Error: setAttribute failed: InvalidCharacterError: \"bad name\" is not a valid attribute name]</p>");
	assert!(matches!(&errors.borrow()[0].error, Error::Host(HostError { operation: "setAttribute", .. })));
}

#[test]
fn patch_failures_are_reported_with_context() {
	let (mut renderer, container) = renderer();
	let (handler, errors) = collecting_handler();
	renderer.update_config(ConfigUpdate {
		on_error: Some(Some(handler)),
		..ConfigUpdate::default()
	});
	let old = Child::from(VNode::element("div").child("a"));
	let new = Child::from(VNode::element("div").prop("=", "x").child("b"));

	renderer.patch(&container, None, Some(&old), 0);
	renderer.patch(&container, Some(&old), Some(&new), 0);

	let errors = errors.borrow();
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].context, Some("patch"));
	assert_eq!(errors[0].vnode.as_ref(), new.as_vnode());
	// The slot stopped at the failing prop.
	assert_eq!(container.inner_html(), "<div>a</div>");
}

#[test]
fn failing_error_handlers_are_contained() {
	let (mut renderer, container) = renderer();
	let calls = Rc::new(Cell::new(0));
	renderer.update_config(ConfigUpdate {
		on_error: Some(Some(ErrorHandler::new({
			let calls = Rc::clone(&calls);
			move |_| {
				calls.set(calls.get() + 1);
				Err("handler broke".into())
			}
		}))),
		..ConfigUpdate::default()
	});

	renderer.render(&VNode::element("<>"), &container);

	assert_eq!(calls.get(), 1);
	assert_eq!(container.child_nodes().len(), 1);
}

#[test]
fn report_without_handler_only_logs() {
	let config = Config {
		dev_mode: true,
		..Config::default()
	};
	let error = RenderError::new(Error::InvalidVNode("test".to_owned()), Some(VNode::element("p")), "render");

	let ((), dev_logs) = capture_logs(|| report(&config, &error));
	let ((), production_logs) = capture_logs(|| report(&Config { dev_mode: false, ..config }, &error));

	assert!(dev_logs.contains("VDOM Error: Invalid VNode structure: test"), "{}", dev_logs);
	assert!(dev_logs.contains("Context: render"), "{}", dev_logs);
	assert!(production_logs.contains("VDOM Error (enable dev mode for details)"), "{}", production_logs);
	assert!(!production_logs.contains("Invalid VNode"), "{}", production_logs);
}

#[test]
fn failing_handlers_log_both_errors() {
	let config = Config {
		on_error: Some(ErrorHandler::new(|_| Err("handler broke".into()))),
		..Config::default()
	};
	let error = RenderError::new(Error::InvalidVNode("inner".to_owned()), None, "patch");

	let ((), logs) = capture_logs(|| report(&config, &error));

	assert!(logs.contains("Error in custom error handler: handler broke"), "{}", logs);
	assert!(logs.contains("Original error: Invalid VNode structure: inner"), "{}", logs);
}

#[test]
fn placeholder_text_depends_on_dev_mode() {
	let error = Error::InvalidVNode("oops".to_owned());
	let mut config = Config {
		dev_mode: true,
		..Config::default()
	};
	assert_eq!(placeholder_text(&config, &error), "[Render Error: Invalid VNode structure: oops]");

	config.update(ConfigUpdate {
		dev_mode: Some(false),
		..ConfigUpdate::default()
	});
	assert_eq!(placeholder_text(&config, &error), "[Render Error]");
}

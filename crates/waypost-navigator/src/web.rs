//! Browser bindings, available on `wasm32` only.
//!
//! These implement the collaborator traits of [`crate::env`] on top of
//! `web-sys`, plus the title and layout sinks of the built-in middleware.

use crate::env::{
	ClickEvent, EventSource, History, LocationSource, NavigationListener, NavigationTask, Outlet,
	PathNode, Timer,
};
use crate::mode::{Anchor, Location};
use crate::navigator::NavigatorOptions;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use waypost_core::middleware::{LayoutSink, TitleSink};
use waypost_core::{Context, Result, RouteHandler, RouterError, async_handler};
use web_sys::{
	Comment, Document, DocumentFragment, Element, Event, EventTarget, HtmlAnchorElement,
	HtmlElement, HtmlTemplateElement, MouseEvent,
};

/// Headings searched for a page title, in document order.
const TITLE_HEADINGS: &str = "h1, h2, h3, h4";

fn js_error(value: JsValue) -> RouterError {
	RouterError::NavigationFailed(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn window() -> Result<web_sys::Window> {
	web_sys::window().ok_or_else(|| RouterError::navigation("no window object"))
}

fn document() -> Result<Document> {
	window()?
		.document()
		.ok_or_else(|| RouterError::navigation("no document object"))
}

/// Drives a navigation task started by a DOM event.
///
/// Nothing awaits an event listener, so failures end up in the log.
fn spawn_task(task: NavigationTask) {
	wasm_bindgen_futures::spawn_local(async move {
		if let Err(e) = task.await {
			error!(error = %e, "navigation failed");
		}
	});
}

/// Renders into an element, after a marker comment.
///
/// Nodes before the marker are left alone, so the outlet can share its
/// element with static content.
pub struct ElementOutlet {
	root: Element,
	marker: Comment,
}

impl ElementOutlet {
	/// Appends the marker to `root`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] if the marker cannot be
	/// inserted.
	pub fn new(root: Element) -> Result<Self> {
		let marker = document()?.create_comment("outlet");
		root.append_child(&marker).map_err(js_error)?;
		Ok(Self { root, marker })
	}
}

#[async_trait(?Send)]
impl Outlet<Element> for ElementOutlet {
	async fn render(&self, element: Element) -> Result<()> {
		while let Some(sibling) = self.marker.next_sibling() {
			self.root.remove_child(&sibling).map_err(js_error)?;
		}
		self.root.append_child(&element).map_err(js_error)?;
		Ok(())
	}
}

/// `window.history`.
pub struct BrowserHistory {
	history: web_sys::History,
}

impl BrowserHistory {
	/// Wraps `window.history`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] outside a browser window.
	pub fn new() -> Result<Self> {
		Ok(Self {
			history: window()?.history().map_err(js_error)?,
		})
	}
}

impl History for BrowserHistory {
	fn push_state(&self, url: &str) -> Result<()> {
		self.history
			.push_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(js_error)
	}

	fn replace_state(&self, url: &str) -> Result<()> {
		self.history
			.replace_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(js_error)
	}

	fn go(&self, delta: i32) -> Result<()> {
		self.history.go_with_delta(delta).map_err(js_error)
	}
}

/// `window.location`.
pub struct BrowserLocation {
	location: web_sys::Location,
}

impl BrowserLocation {
	/// Wraps `window.location`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] outside a browser window.
	pub fn new() -> Result<Self> {
		Ok(Self {
			location: window()?.location(),
		})
	}
}

impl LocationSource for BrowserLocation {
	fn location(&self) -> Result<Location> {
		Ok(Location::new(
			self.location.pathname().map_err(js_error)?,
			self.location.search().map_err(js_error)?,
			self.location.hash().map_err(js_error)?,
		))
	}
}

/// Timer backed by `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		Box::pin(gloo_timers::future::sleep(duration))
	}
}

/// A DOM click event.
pub struct BrowserClickEvent {
	event: Event,
}

impl BrowserClickEvent {
	/// Wraps `event`.
	pub fn new(event: Event) -> Self {
		Self { event }
	}
}

impl ClickEvent for BrowserClickEvent {
	fn composed_path(&self) -> Vec<PathNode> {
		let origin = window().ok().and_then(|w| w.location().origin().ok());
		self.event
			.composed_path()
			.iter()
			.map(|target| {
				if let Some(anchor) = target.dyn_ref::<HtmlAnchorElement>() {
					let same_origin = origin
						.as_deref()
						.is_none_or(|origin| origin == anchor.origin());
					PathNode::Anchor(
						Anchor::new(
							Location::new(anchor.pathname(), anchor.search(), anchor.hash()),
							anchor.href(),
						)
						.with_target(anchor.target())
						.with_download(anchor.has_attribute("download"))
						.with_same_origin(same_origin),
					)
				} else if let Some(element) = target.dyn_ref::<Element>() {
					PathNode::Element(element.tag_name().to_lowercase())
				} else {
					PathNode::Other
				}
			})
			.collect()
	}

	fn is_modified(&self) -> bool {
		self.event.dyn_ref::<MouseEvent>().is_some_and(|event| {
			event.ctrl_key()
				|| event.meta_key()
				|| event.shift_key()
				|| event.alt_key()
				|| event.button() != 0
		})
	}

	fn prevent_default(&self) {
		self.event.prevent_default();
	}

	fn stop_propagation(&self) {
		self.event.stop_immediate_propagation();
	}
}

type EventClosure = Closure<dyn FnMut(Event)>;

struct Bound {
	popstate: EventClosure,
	click: EventClosure,
}

/// Delivers `popstate` and `click` events from an event target, usually the
/// window.
pub struct WindowEvents {
	target: EventTarget,
	bound: RefCell<Option<Bound>>,
}

impl WindowEvents {
	/// Listens on `target`.
	pub fn new(target: EventTarget) -> Self {
		Self {
			target,
			bound: RefCell::new(None),
		}
	}
}

impl EventSource for WindowEvents {
	fn bind(&self, listener: Rc<dyn NavigationListener>) -> Result<()> {
		self.unbind();

		let on_popstate = Rc::clone(&listener);
		let popstate = Closure::wrap(Box::new(move |_event: Event| {
			spawn_task(on_popstate.on_popstate());
		}) as Box<dyn FnMut(_)>);

		let click = Closure::wrap(Box::new(move |event: Event| {
			if let Some(task) = listener.on_click(&BrowserClickEvent::new(event)) {
				spawn_task(task);
			}
		}) as Box<dyn FnMut(_)>);

		self.target
			.add_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref())
			.map_err(js_error)?;
		if let Err(e) = self
			.target
			.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())
		{
			let _ = self
				.target
				.remove_event_listener_with_callback("popstate", popstate.as_ref().unchecked_ref());
			return Err(js_error(e));
		}

		*self.bound.borrow_mut() = Some(Bound { popstate, click });
		Ok(())
	}

	fn unbind(&self) {
		let Some(bound) = self.bound.borrow_mut().take() else {
			return;
		};
		for (name, closure) in [("popstate", &bound.popstate), ("click", &bound.click)] {
			if let Err(e) = self
				.target
				.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref())
			{
				warn!(event = name, error = ?e, "failed to remove listener");
			}
		}
	}
}

/// Writes `document.title`.
pub struct DocumentTitle {
	document: Document,
}

impl DocumentTitle {
	/// Wraps the current document.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] outside a browser window.
	pub fn new() -> Result<Self> {
		Ok(Self {
			document: document()?,
		})
	}
}

impl TitleSink for DocumentTitle {
	fn set_title(&self, title: &str) {
		self.document.set_title(title);
	}
}

/// Manages the `layout` attribute of an element.
pub struct ElementLayout {
	element: Element,
}

impl ElementLayout {
	/// Manages `element`'s `layout` attribute.
	pub fn new(element: Element) -> Self {
		Self { element }
	}
}

impl LayoutSink for ElementLayout {
	fn set_layout(&self, name: &str) {
		if let Err(e) = self.element.set_attribute("layout", name) {
			warn!(error = ?e, "failed to set layout attribute");
		}
	}

	fn remove_layout(&self) {
		if let Err(e) = self.element.remove_attribute("layout") {
			warn!(error = ?e, "failed to remove layout attribute");
		}
	}
}

/// Title extractor for [`Title`](waypost_core::middleware::Title).
///
/// Uses the element's `title` attribute, or else the text of its first
/// `h1`..`h4`, looked up in the shadow root when the element has one.
pub fn element_title(element: &Element) -> Option<String> {
	let own = element
		.dyn_ref::<HtmlElement>()
		.map(HtmlElement::title)
		.filter(|title| !title.trim().is_empty());
	if own.is_some() {
		return own;
	}

	let heading = match element.shadow_root() {
		Some(root) => root.query_selector(TITLE_HEADINGS),
		None => element.query_selector(TITLE_HEADINGS),
	};
	heading
		.ok()
		.flatten()
		.and_then(|heading| heading.text_content())
		.filter(|text| !text.trim().is_empty())
}

/// Layout extractor for [`Layout`](waypost_core::middleware::Layout).
///
/// Reads the element's `layout` property, falling back to its `layout`
/// attribute.
pub fn element_layout(element: &Element) -> Option<String> {
	js_sys::Reflect::get(element, &JsValue::from_str("layout"))
		.ok()
		.and_then(|value| value.as_string())
		.or_else(|| element.get_attribute("layout"))
		.filter(|layout| !layout.is_empty())
}

/// Route handler creating a fresh element named `tag`.
pub fn component(
	tag: impl Into<String>,
) -> impl Fn(&mut Context<Element>) -> Result<Option<Element>> + 'static {
	let tag = tag.into();
	move |_: &mut Context<Element>| -> Result<Option<Element>> {
		document()?.create_element(&tag).map(Some).map_err(js_error)
	}
}

/// Like [`component`], but awaits `load` first, typically to fetch the
/// element's definition or data.
pub fn component_with_load<L>(tag: impl Into<String>, load: L) -> impl RouteHandler<Element>
where
	L: for<'a> Fn(&'a mut Context<Element>) -> LocalBoxFuture<'a, Result<()>> + 'static,
{
	let tag: Rc<str> = Rc::from(tag.into());
	let load = Rc::new(load);
	async_handler(move |ctx: &mut Context<Element>| {
		let tag = Rc::clone(&tag);
		let load = Rc::clone(&load);
		Box::pin(async move {
			load(ctx).await?;
			let element = document()?.create_element(&tag).map_err(js_error)?;
			Ok::<_, RouterError>(Some(element))
		})
	})
}

/// Route handler rendering a deep copy of the template's first element.
///
/// Fails with [`RouterError::InvalidTemplate`] when the template holds no
/// element.
pub fn template(
	tpl: HtmlTemplateElement,
) -> impl Fn(&mut Context<Element>) -> Result<Option<Element>> + 'static {
	move |_: &mut Context<Element>| -> Result<Option<Element>> {
		let content = document()?
			.import_node_with_deep(&tpl.content(), true)
			.map_err(js_error)?;
		content
			.dyn_into::<DocumentFragment>()
			.ok()
			.and_then(|fragment| fragment.first_element_child())
			.map(Some)
			.ok_or(RouterError::InvalidTemplate)
	}
}

impl NavigatorOptions<Element> {
	/// Options wired to the real browser: renders into `document.body` and
	/// listens on `window`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] outside a browser window or
	/// when the document has no body.
	pub fn browser() -> Result<Self> {
		let window = window()?;
		let body = document()?
			.body()
			.ok_or_else(|| RouterError::navigation("no document body"))?;

		Ok(Self::new(
			ElementOutlet::new(body.into())?,
			BrowserHistory::new()?,
			BrowserLocation::new()?,
			WindowEvents::new(window.into()),
		)
		.timer(BrowserTimer))
	}
}

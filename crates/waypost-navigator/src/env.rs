//! Narrow interfaces to the browser environment.
//!
//! The navigator never talks to `window` directly. Everything it needs is
//! one of these traits, implemented for the real browser in [`crate::web`]
//! and by mocks in tests.

use crate::mode::{Anchor, Location};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Duration;
use waypost_core::Result;

/// Mounts the element produced by a navigation.
#[async_trait(?Send)]
pub trait Outlet<E: 'static>: 'static {
	/// Replaces the currently rendered element with `element`.
	///
	/// # Errors
	///
	/// Returns an error if the element cannot be mounted.
	async fn render(&self, element: E) -> Result<()>;
}

/// Write-only view of the session history.
pub trait History: 'static {
	/// Adds a history entry for `url`.
	fn push_state(&self, url: &str) -> Result<()>;

	/// Replaces the current history entry with `url`.
	fn replace_state(&self, url: &str) -> Result<()>;

	/// Moves `delta` entries through the session history.
	fn go(&self, delta: i32) -> Result<()>;
}

/// Source of the current location.
pub trait LocationSource: 'static {
	/// Returns the current location.
	fn location(&self) -> Result<Location>;
}

/// Sleeps without blocking the event loop.
pub trait Timer: 'static {
	/// Returns a future completing after `duration`.
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Timer backed by the tokio runtime.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
impl Timer for TokioTimer {
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		Box::pin(tokio::time::sleep(duration))
	}
}

/// Returns the timer used when none is configured.
pub fn default_timer() -> Rc<dyn Timer> {
	#[cfg(not(target_arch = "wasm32"))]
	{
		Rc::new(TokioTimer)
	}
	#[cfg(target_arch = "wasm32")]
	{
		Rc::new(crate::web::BrowserTimer)
	}
}

/// Asynchronous remainder of a navigation triggered by a browser event.
///
/// Event sources drive it to completion on their own, since nothing awaits
/// an event listener.
pub type NavigationTask = LocalBoxFuture<'static, Result<()>>;

/// One node of a click event's composed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
	/// An `<a>` element with a resolvable target.
	Anchor(Anchor),
	/// Any other element, by lowercase tag name.
	Element(String),
	/// Non-element nodes (text, shadow roots, document, window).
	Other,
}

/// The parts of a DOM click event the navigator uses.
pub trait ClickEvent {
	/// Returns the event path, starting at the target.
	fn composed_path(&self) -> Vec<PathNode>;

	/// Returns whether a modifier key was held or a button other than the
	/// primary one was used. Such clicks belong to the browser.
	fn is_modified(&self) -> bool;

	/// Cancels the browser's default navigation.
	fn prevent_default(&self);

	/// Stops other listeners from seeing the event.
	fn stop_propagation(&self);
}

/// Receives `popstate` and `click` events.
pub trait NavigationListener {
	/// Handles a `popstate` event.
	fn on_popstate(&self) -> NavigationTask;

	/// Handles a click.
	///
	/// Returns `None` when the click is not a navigation, in which case the
	/// event is left untouched.
	fn on_click(&self, event: &dyn ClickEvent) -> Option<NavigationTask>;
}

/// Delivers browser events to a [`NavigationListener`].
pub trait EventSource: 'static {
	/// Starts delivering `popstate` and `click` events to `listener`.
	///
	/// # Errors
	///
	/// Returns an error if the listeners cannot be registered.
	fn bind(&self, listener: Rc<dyn NavigationListener>) -> Result<()>;

	/// Stops delivering events. Does nothing if not bound.
	fn unbind(&self);
}

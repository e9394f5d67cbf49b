//! The navigator: binds a dispatcher to the browser.
//!
//! A [`Navigator`] owns the collaborators of one running application and
//! guarantees that at most one dispatch is in flight. Concurrent navigation
//! intents queue behind the dispatch lock, and intents that resolve to the
//! context already displayed are dropped before they reach the dispatcher.

use crate::config::NavigatorConfig;
use crate::env::{
	ClickEvent, EventSource, History, LocationSource, NavigationListener, NavigationTask, Outlet,
	PathNode, Timer, default_timer,
};
use crate::mode::{Anchor, Mode};
use futures::channel::oneshot;
use futures::lock::Mutex;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{debug, trace};
use waypost_core::{Context, Dispatcher, Result, RouterError};

/// Collaborators and settings for a [`Navigator`].
pub struct NavigatorOptions<E: 'static> {
	outlet: Rc<dyn Outlet<E>>,
	history: Rc<dyn History>,
	location: Rc<dyn LocationSource>,
	events: Rc<dyn EventSource>,
	mode: Option<Box<dyn Mode>>,
	timer: Option<Rc<dyn Timer>>,
	config: NavigatorConfig,
}

impl<E: 'static> NavigatorOptions<E> {
	/// Creates options from the four required collaborators.
	pub fn new<O, H, L, S>(outlet: O, history: H, location: L, events: S) -> Self
	where
		O: Outlet<E>,
		H: History,
		L: LocationSource,
		S: EventSource,
	{
		Self::from_shared(
			Rc::new(outlet),
			Rc::new(history),
			Rc::new(location),
			Rc::new(events),
		)
	}

	/// Creates options from shared collaborators, so callers can keep a
	/// handle on them.
	pub fn from_shared(
		outlet: Rc<dyn Outlet<E>>,
		history: Rc<dyn History>,
		location: Rc<dyn LocationSource>,
		events: Rc<dyn EventSource>,
	) -> Self {
		Self {
			outlet,
			history,
			location,
			events,
			mode: None,
			timer: None,
			config: NavigatorConfig::default(),
		}
	}

	/// Uses `mode` instead of the one described by the configuration.
	pub fn mode<M>(mut self, mode: M) -> Self
	where
		M: Mode,
	{
		self.mode = Some(Box::new(mode));
		self
	}

	/// Uses `timer` for the pop timeout.
	pub fn timer<T>(mut self, timer: T) -> Self
	where
		T: Timer,
	{
		self.timer = Some(Rc::new(timer));
		self
	}

	/// Replaces the configuration.
	pub fn config(mut self, config: NavigatorConfig) -> Self {
		self.config = config;
		self
	}
}

impl<E: 'static> std::fmt::Debug for NavigatorOptions<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NavigatorOptions")
			.field("has_mode", &self.mode.is_some())
			.field("has_timer", &self.timer.is_some())
			.field("config", &self.config)
			.finish()
	}
}

struct Inner<E: 'static> {
	dispatcher: Rc<dyn Dispatcher<E>>,
	outlet: Rc<dyn Outlet<E>>,
	history: Rc<dyn History>,
	location: Rc<dyn LocationSource>,
	events: Rc<dyn EventSource>,
	mode: Box<dyn Mode>,
	timer: Rc<dyn Timer>,
	pop_timeout: Duration,
	running: Cell<bool>,
	current: RefCell<Option<Context<E>>>,
	dispatching: Mutex<()>,
	popping: Mutex<()>,
	pending_pop: RefCell<Option<oneshot::Sender<()>>>,
}

/// Handle to a running navigator.
///
/// Cloning is cheap and every clone drives the same navigator. Once the
/// owning [`Runtime`](crate::Runtime) is reset, every operation fails with
/// [`RouterError::NotRunning`].
pub struct Navigator<E: 'static> {
	inner: Rc<Inner<E>>,
}

impl<E: 'static> Clone for Navigator<E> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<E: 'static> std::fmt::Debug for Navigator<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Navigator")
			.field("running", &self.inner.running.get())
			.field("current_path", &self.current_path())
			.field("pop_timeout", &self.inner.pop_timeout)
			.finish()
	}
}

impl<E: 'static> Navigator<E> {
	pub(crate) fn new(dispatcher: Rc<dyn Dispatcher<E>>, options: NavigatorOptions<E>) -> Self {
		let NavigatorOptions {
			outlet,
			history,
			location,
			events,
			mode,
			timer,
			config,
		} = options;

		Self {
			inner: Rc::new(Inner {
				dispatcher,
				outlet,
				history,
				location,
				events,
				mode: mode.unwrap_or_else(|| config.mode.build()),
				timer: timer.unwrap_or_else(default_timer),
				pop_timeout: config.pop_timeout(),
				running: Cell::new(false),
				current: RefCell::new(None),
				dispatching: Mutex::new(()),
				popping: Mutex::new(()),
				pending_pop: RefCell::new(None),
			}),
		}
	}

	/// Binds the event listeners and marks the navigator as running.
	pub(crate) fn bind(&self) -> Result<()> {
		let listener: Rc<dyn NavigationListener> = Rc::new(Listener {
			inner: Rc::downgrade(&self.inner),
		});
		self.inner.events.bind(listener)?;
		self.inner.running.set(true);
		Ok(())
	}

	/// Dispatches the context for the current location.
	pub(crate) async fn start(&self) -> Result<()> {
		let path = self.inner.location_path()?;
		debug!(%path, "starting navigator");
		self.inner.dispatch(Context::new(&path)).await
	}

	/// Unbinds the listeners and waits for in-flight work to settle.
	pub(crate) async fn stop(&self) {
		self.inner.running.set(false);
		self.inner.events.unbind();
		drop(self.inner.dispatching.lock().await);
		drop(self.inner.popping.lock().await);
		debug!("navigator stopped");
	}

	/// Returns whether this navigator is still running.
	pub fn is_running(&self) -> bool {
		self.inner.running.get()
	}

	/// Returns the path of the context most recently dispatched.
	pub fn current_path(&self) -> Option<String> {
		self.inner
			.current
			.borrow()
			.as_ref()
			.map(|ctx| ctx.path().to_string())
	}

	fn ensure_running(&self) -> Result<()> {
		if self.is_running() {
			Ok(())
		} else {
			Err(RouterError::NotRunning)
		}
	}

	/// Adds a history entry for `path` and navigates to it.
	///
	/// The history entry is written even when `path` is the page already
	/// displayed, in which case no dispatch happens.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] after a reset, the history error
	/// if the entry cannot be written, or the dispatch error.
	pub async fn push(&self, path: &str) -> Result<()> {
		self.ensure_running()?;
		let ctx = Context::new(path);
		let url = self.inner.mode.history_url(path);
		debug!(%url, "push state");
		self.inner.history.push_state(&url)?;
		self.inner.dispatch(ctx).await
	}

	/// Replaces the current history entry with `path` and navigates to it.
	///
	/// # Errors
	///
	/// Same as [`Navigator::push`].
	pub async fn replace(&self, path: &str) -> Result<()> {
		self.ensure_running()?;
		let ctx = Context::new(path);
		let url = self.inner.mode.history_url(path);
		debug!(%url, "replace state");
		self.inner.history.replace_state(&url)?;
		self.inner.dispatch(ctx).await
	}

	/// Moves `delta` entries through history and waits for the resulting
	/// `popstate` navigation, or for the pop timeout, whichever comes first.
	///
	/// Calls are serialized: a second `go` waits until the first settled.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] after a reset or the history
	/// error. Dispatch errors of the resulting `popstate` navigation are not
	/// reported here.
	pub async fn go(&self, delta: i32) -> Result<()> {
		self.ensure_running()?;
		self.inner.go(delta).await
	}

	/// Goes back one entry. Same as `go(-1)`.
	///
	/// # Errors
	///
	/// Same as [`Navigator::go`].
	pub async fn pop(&self) -> Result<()> {
		self.go(-1).await
	}
}

impl<E: 'static> Inner<E> {
	fn location_path(&self) -> Result<String> {
		let location = self.location.location()?;
		self.mode.context_path(&location)
	}

	async fn dispatch(&self, ctx: Context<E>) -> Result<()> {
		if self
			.current
			.borrow()
			.as_ref()
			.is_some_and(|current| current.equals(&ctx))
		{
			debug!(path = ctx.path(), "already displayed, skipping dispatch");
			return Ok(());
		}

		let _guard = self.dispatching.lock().await;
		*self.current.borrow_mut() = Some(ctx.fresh());

		debug!(path = ctx.path(), "dispatch");
		let mut ctx = self.dispatcher.dispatch(ctx).await?;
		let Some(element) = ctx.take_result() else {
			return Err(RouterError::NoResult(ctx.path().to_string()));
		};
		self.outlet.render(element).await
	}

	async fn go(&self, delta: i32) -> Result<()> {
		let _guard = self.popping.lock().await;

		let (sender, receiver) = oneshot::channel();
		*self.pending_pop.borrow_mut() = Some(sender);

		debug!(delta, "go");
		if let Err(e) = self.history.go(delta) {
			self.pending_pop.borrow_mut().take();
			return Err(e);
		}

		let timeout = self.timer.sleep(self.pop_timeout);
		match futures::future::select(receiver, timeout).await {
			futures::future::Either::Left(_) => trace!(delta, "popstate settled"),
			futures::future::Either::Right(_) => debug!(delta, "no popstate before timeout"),
		}
		self.pending_pop.borrow_mut().take();
		Ok(())
	}

	async fn popstate(&self) -> Result<()> {
		let result = match self.location_path() {
			Ok(path) => self.dispatch(Context::new(&path)).await,
			Err(e) => Err(e),
		};

		let pending = self.pending_pop.borrow_mut().take();
		if let Some(sender) = pending {
			let _ = sender.send(());
		}
		result
	}

	fn click(self: Rc<Self>, anchor: Anchor) -> Result<NavigationTask> {
		let path = self.mode.context_path(&anchor.location)?;
		debug!(href = %anchor.href, "push state from link");
		self.history.push_state(&anchor.href)?;
		Ok(Box::pin(async move { self.dispatch(Context::new(&path)).await }))
	}
}

struct Listener<E: 'static> {
	inner: Weak<Inner<E>>,
}

impl<E: 'static> NavigationListener for Listener<E> {
	fn on_popstate(&self) -> NavigationTask {
		let inner = self.inner.upgrade().filter(|inner| inner.running.get());
		Box::pin(async move {
			match inner {
				Some(inner) => inner.popstate().await,
				None => Ok(()),
			}
		})
	}

	fn on_click(&self, event: &dyn ClickEvent) -> Option<NavigationTask> {
		let inner = self.inner.upgrade().filter(|inner| inner.running.get())?;
		if event.is_modified() {
			return None;
		}
		let anchor = event.composed_path().into_iter().find_map(|node| match node {
			PathNode::Anchor(anchor) => Some(anchor),
			_ => None,
		})?;
		if !anchor.is_in_document() {
			trace!(href = %anchor.href, "leaving link to the browser");
			return None;
		}

		event.prevent_default();
		event.stop_propagation();

		Some(match inner.click(anchor) {
			Ok(task) => task,
			Err(e) => Box::pin(async move { Err(e) }),
		})
	}
}

//! In-memory stand-ins for the browser collaborators.
//!
//! Every mock is a cheap handle over shared state, so a test keeps one clone
//! and hands another to the navigator.

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use waypost_core::{Context, Dispatcher, Result, Router, RouterError};
use waypost_navigator::{
	ClickEvent, EventSource, History, Location, LocationSource, NavigationListener, Outlet,
	PathNode,
};

/// Shared, ordered record of calls.
#[derive(Clone, Default)]
pub struct Hits(Rc<RefCell<Vec<String>>>);

impl Hits {
	pub fn push(&self, hit: impl Into<String>) {
		self.0.borrow_mut().push(hit.into());
	}

	pub fn all(&self) -> Vec<String> {
		self.0.borrow().clone()
	}

	pub fn last(&self) -> Option<String> {
		self.0.borrow().last().cloned()
	}

	pub fn count_prefix(&self, prefix: &str) -> usize {
		self.0
			.borrow()
			.iter()
			.filter(|hit| hit.starts_with(prefix))
			.count()
	}

	pub fn len(&self) -> usize {
		self.0.borrow().len()
	}
}

/// Records `push:<url>`, `replace:<url>` and `go:<delta>`.
#[derive(Clone, Default)]
pub struct MockHistory {
	pub hits: Hits,
}

impl History for MockHistory {
	fn push_state(&self, url: &str) -> Result<()> {
		self.hits.push(format!("push:{}", url));
		Ok(())
	}

	fn replace_state(&self, url: &str) -> Result<()> {
		self.hits.push(format!("replace:{}", url));
		Ok(())
	}

	fn go(&self, delta: i32) -> Result<()> {
		self.hits.push(format!("go:{}", delta));
		Ok(())
	}
}

/// Location the test can move around.
#[derive(Clone, Default)]
pub struct MockLocation {
	location: Rc<RefCell<Location>>,
}

impl MockLocation {
	pub fn at(pathname: &str, search: &str, hash: &str) -> Self {
		let location = Self::default();
		location.set(pathname, search, hash);
		location
	}

	pub fn set(&self, pathname: &str, search: &str, hash: &str) {
		*self.location.borrow_mut() = Location::new(pathname, search, hash);
	}
}

impl LocationSource for MockLocation {
	fn location(&self) -> Result<Location> {
		Ok(self.location.borrow().clone())
	}
}

/// Records every rendered element.
#[derive(Clone, Default)]
pub struct MockOutlet {
	pub rendered: Hits,
}

#[async_trait(?Send)]
impl Outlet<String> for MockOutlet {
	async fn render(&self, element: String) -> Result<()> {
		self.rendered.push(element);
		Ok(())
	}
}

/// Captures the listener the navigator binds.
#[derive(Clone, Default)]
pub struct MockEvents {
	listener: Rc<RefCell<Option<Rc<dyn NavigationListener>>>>,
	pub binds: Rc<Cell<usize>>,
}

impl MockEvents {
	pub fn listener(&self) -> Option<Rc<dyn NavigationListener>> {
		self.listener.borrow().clone()
	}

	pub fn is_bound(&self) -> bool {
		self.listener.borrow().is_some()
	}
}

impl EventSource for MockEvents {
	fn bind(&self, listener: Rc<dyn NavigationListener>) -> Result<()> {
		self.binds.set(self.binds.get() + 1);
		*self.listener.borrow_mut() = Some(listener);
		Ok(())
	}

	fn unbind(&self) {
		self.listener.borrow_mut().take();
	}
}

/// Event source that refuses to bind.
#[derive(Clone, Default)]
pub struct FailingEvents;

impl EventSource for FailingEvents {
	fn bind(&self, _listener: Rc<dyn NavigationListener>) -> Result<()> {
		Err(RouterError::navigation("listeners unavailable"))
	}

	fn unbind(&self) {}
}

/// Click with a fixed composed path.
pub struct MockClickEvent {
	path: Vec<PathNode>,
	modified: bool,
	pub prevented: Cell<bool>,
	pub stopped: Cell<bool>,
}

impl MockClickEvent {
	pub fn new(path: Vec<PathNode>) -> Self {
		Self {
			path,
			modified: false,
			prevented: Cell::new(false),
			stopped: Cell::new(false),
		}
	}

	/// Same click with a modifier key held.
	pub fn modified(mut self) -> Self {
		self.modified = true;
		self
	}
}

impl ClickEvent for MockClickEvent {
	fn composed_path(&self) -> Vec<PathNode> {
		self.path.clone()
	}

	fn is_modified(&self) -> bool {
		self.modified
	}

	fn prevent_default(&self) {
		self.prevented.set(true);
	}

	fn stop_propagation(&self) {
		self.stopped.set(true);
	}
}

/// Wraps a router, records `start:<path>` and `end:<path>`, and yields to
/// the executor in between so concurrent navigations get a chance to run.
pub struct MockDispatcher {
	router: Router<String>,
	pub log: Hits,
}

impl MockDispatcher {
	pub fn new(router: Router<String>, log: Hits) -> Self {
		Self { router, log }
	}
}

#[async_trait(?Send)]
impl Dispatcher<String> for MockDispatcher {
	async fn dispatch(&self, ctx: Context<String>) -> Result<Context<String>> {
		let path = ctx.path().to_string();
		self.log.push(format!("start:{}", path));
		tokio::task::yield_now().await;
		let result = self.router.dispatch(ctx).await;
		self.log.push(format!("end:{}", path));
		result
	}
}

//! Common fixtures for navigator tests.

use super::mocks::*;
use rstest::*;
use std::rc::Rc;
use std::time::Duration;
use waypost_core::{Context, Result, Router, RouterError};
use waypost_navigator::{NavigationListener, Navigator, NavigatorConfig, NavigatorOptions, Runtime};

/// Routes used across the navigator tests:
/// - `/` renders `home`
/// - `/foo` renders `foo`
/// - `/bar/{id}` renders `bar <id>`
/// - `/empty` renders nothing
/// - `/boom` fails
pub fn test_router() -> Router<String> {
	Router::new()
		.route("/", |_: &mut Context<String>| -> Result<Option<String>> {
			Ok(Some("home".to_string()))
		})
		.unwrap()
		.route("/foo", |_: &mut Context<String>| -> Result<Option<String>> {
			Ok(Some("foo".to_string()))
		})
		.unwrap()
		.route("/bar/{id}", |ctx: &mut Context<String>| -> Result<Option<String>> {
			Ok(Some(format!("bar {}", ctx.param("id").unwrap_or_default())))
		})
		.unwrap()
		.route("/empty", |_: &mut Context<String>| -> Result<Option<String>> { Ok(None) })
		.unwrap()
		.route("/boom", |_: &mut Context<String>| -> Result<Option<String>> {
			Err(RouterError::handler(anyhow::anyhow!("boom")))
		})
		.unwrap()
}

/// Everything a navigator test observes.
pub struct Harness {
	pub runtime: Runtime<String>,
	pub history: MockHistory,
	pub location: MockLocation,
	pub outlet: MockOutlet,
	pub events: MockEvents,
	pub dispatches: Hits,
	pub config: NavigatorConfig,
}

impl Harness {
	pub fn new(pathname: &str) -> Self {
		Self {
			runtime: Runtime::new(),
			history: MockHistory::default(),
			location: MockLocation::at(pathname, "", ""),
			outlet: MockOutlet::default(),
			events: MockEvents::default(),
			dispatches: Hits::default(),
			config: NavigatorConfig::default().with_pop_timeout(Duration::from_millis(20)),
		}
	}

	pub fn options(&self) -> NavigatorOptions<String> {
		NavigatorOptions::new(
			self.outlet.clone(),
			self.history.clone(),
			self.location.clone(),
			self.events.clone(),
		)
		.config(self.config.clone())
	}

	pub fn dispatcher(&self) -> MockDispatcher {
		MockDispatcher::new(test_router(), self.dispatches.clone())
	}

	pub async fn run(&self) -> Navigator<String> {
		self.runtime
			.run(self.dispatcher(), self.options())
			.await
			.expect("navigator starts")
	}

	pub fn listener(&self) -> Rc<dyn NavigationListener> {
		self.events.listener().expect("listener bound")
	}
}

#[fixture]
pub fn harness() -> Harness {
	Harness::new("/")
}

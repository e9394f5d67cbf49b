//! End-to-end navigation through the facade crate.

use rstest::{fixture, rstest};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use waypost::navigator::{Location, Mode};
use waypost::prelude::*;

type Log = Rc<RefCell<Vec<String>>>;

fn entries(log: &Log) -> Vec<String> {
	log.borrow().clone()
}

/// Browser stand-in: one shared record per collaborator.
#[derive(Clone, Default)]
struct Browser {
	rendered: Log,
	history: Log,
	titles: Log,
	bound: Rc<RefCell<Option<Rc<dyn NavigationListener>>>>,
}

#[async_trait(?Send)]
impl Outlet<String> for Browser {
	async fn render(&self, element: String) -> Result<()> {
		self.rendered.borrow_mut().push(element);
		Ok(())
	}
}

impl History for Browser {
	fn push_state(&self, url: &str) -> Result<()> {
		self.history.borrow_mut().push(format!("push:{}", url));
		Ok(())
	}

	fn replace_state(&self, url: &str) -> Result<()> {
		self.history.borrow_mut().push(format!("replace:{}", url));
		Ok(())
	}

	fn go(&self, delta: i32) -> Result<()> {
		self.history.borrow_mut().push(format!("go:{}", delta));
		Ok(())
	}
}

impl LocationSource for Browser {
	fn location(&self) -> Result<Location> {
		Ok(Location::new("/shop/", "", ""))
	}
}

impl EventSource for Browser {
	fn bind(&self, listener: Rc<dyn NavigationListener>) -> Result<()> {
		*self.bound.borrow_mut() = Some(listener);
		Ok(())
	}

	fn unbind(&self) {
		self.bound.borrow_mut().take();
	}
}

fn app_router(titles: Log) -> Router<String> {
	Router::new()
		.with_middleware(NotFound::new(
			|ctx: &mut Context<String>| -> Result<Option<String>> {
				Ok(Some(format!("missing {}", ctx.path())))
			},
		))
		.with_middleware(Title::new(
			"Shop",
			move |title: &str| titles.borrow_mut().push(title.to_string()),
			|page: &String| Some(page.clone()),
		))
		.route("/", |_: &mut Context<String>| -> Result<Option<String>> {
			Ok(Some("catalog".to_string()))
		})
		.unwrap()
		.route(
			"/items/{id:\\d+}[/{tab}]",
			|ctx: &mut Context<String>| -> Result<Option<String>> {
				let id = ctx.param("id").unwrap_or_default().to_string();
				Ok(Some(match ctx.param("tab") {
					Some(tab) => format!("item {} {}", id, tab),
					None => format!("item {}", id),
				}))
			},
		)
		.unwrap()
}

#[fixture]
fn browser() -> Browser {
	Browser::default()
}

#[rstest]
#[tokio::test]
async fn test_full_navigation(browser: Browser) {
	// Arrange
	let runtime = Runtime::new();
	let options = NavigatorOptions::new(
		browser.clone(),
		browser.clone(),
		browser.clone(),
		browser.clone(),
	)
	.mode(HistoryMode::new("/shop"))
	.config(NavigatorConfig::default().with_pop_timeout(Duration::from_millis(10)));

	// Act
	runtime
		.run(app_router(browser.titles.clone()), options)
		.await
		.unwrap();
	runtime.push("/items/42").await.unwrap();
	runtime.replace("/items/42/reviews").await.unwrap();
	runtime.push("/items/abc").await.unwrap();
	runtime.pop().await.unwrap();
	runtime.reset().await;

	// Assert
	assert_eq!(
		entries(&browser.rendered),
		vec![
			"catalog",
			"item 42",
			"item 42 reviews",
			"missing /items/abc"
		]
	);
	assert_eq!(
		entries(&browser.history),
		vec![
			"push:/shop/items/42",
			"replace:/shop/items/42/reviews",
			"push:/shop/items/abc",
			"go:-1"
		]
	);
	// NotFound runs outside Title, so the fallback page has no title yet.
	assert_eq!(
		entries(&browser.titles),
		vec![
			"catalog - Shop",
			"item 42 - Shop",
			"item 42 reviews - Shop",
			"Shop"
		]
	);
	assert!(browser.bound.borrow().is_none());
	assert!(!runtime.is_running());
}

#[rstest]
fn test_config_selects_hash_mode() {
	let config = NavigatorConfig::from_json(r#"{"mode": {"kind": "hash"}, "pop_timeout_ms": 5}"#)
		.unwrap();

	assert_eq!(config.mode, ModeConfig::Hash);
	assert_eq!(config.pop_timeout(), Duration::from_millis(5));
	assert_eq!(config.mode.build().history_url("/items/1"), "#!/items/1");
}

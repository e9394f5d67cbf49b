//! Routing core for waypost.
//!
//! This crate holds everything that does not touch the browser:
//!
//! - [`Context`]: one decoded navigation request and its scratch state
//! - [`RoutePattern`]: compiled route templates (`/users/{id}[/{tab}]`)
//! - [`Route`] and [`RouteHandler`]: a template bound to an element factory
//! - [`Router`]: ordered route table behind an onion-model [`Middleware`] chain
//! - [`Dispatcher`]: the seam the navigator drives
//! - [`middleware`]: built-in `NotFound`, `Title` and `Layout` middleware
//!
//! The element type `E` produced by routes is left to the caller. In the
//! browser it is a DOM element, in tests any plain value.
//!
//! ## Example
//!
//! ```
//! use waypost_core::{Context, Next, Result, Router};
//!
//! # futures::executor::block_on(async {
//! let router: Router<String> = Router::new()
//! 	.with_middleware(|ctx: Context<String>, next: Next<String>| async move {
//! 		let mut ctx = next.run(ctx).await?;
//! 		if let Some(page) = ctx.result_mut() {
//! 			page.push_str(" (wrapped)");
//! 		}
//! 		Ok::<_, waypost_core::RouterError>(ctx)
//! 	})
//! 	.route("/hello/{name}", |ctx: &mut Context<String>| -> Result<Option<String>> {
//! 		Ok(ctx.param("name").map(|name| format!("hello {}", name)))
//! 	})
//! 	.unwrap();
//!
//! let ctx = router.dispatch(Context::new("/hello/world")).await.unwrap();
//! assert_eq!(ctx.result().map(String::as_str), Some("hello world (wrapped)"));
//! # });
//! ```

pub mod context;
pub mod error;
pub mod middleware;
pub mod pattern;
pub mod route;
pub mod router;

pub use context::Context;
pub use error::{PatternError, Result, RouterError, StateError};
pub use pattern::{Matcher, RoutePattern};
pub use route::{AsyncHandler, HandlerFuture, Route, RouteHandler, async_handler};
pub use router::{Dispatcher, Middleware, Next, Router};

//! # Waypost
//!
//! Client-side navigation for Rust web frontends.
//!
//! Waypost maps browser locations to rendered elements. A navigation goes
//! through three layers:
//!
//! - **Context**: the parsed path, query, route params and per-navigation
//!   state ([`Context`])
//! - **Router**: ordered route templates behind an onion-style middleware
//!   stack ([`Router`], [`Middleware`])
//! - **Navigator**: owns the browser history, intercepts link clicks and
//!   runs at most one dispatch at a time ([`Runtime`], [`Navigator`])
//!
//! ## Crates
//!
//! - [`core`] (`waypost-core`): environment-free routing, usable on any target
//! - [`navigator`] (`waypost-navigator`): history and hash modes, the
//!   navigator, and `web-sys` bindings on `wasm32`
//!
//! ## Example
//!
//! ```
//! use waypost::prelude::*;
//!
//! let router = Router::new()
//! 	.route("/users/{id}", |ctx: &mut Context<String>| -> Result<Option<String>> {
//! 		Ok(ctx.param("id").map(|id| format!("user {}", id)))
//! 	})
//! 	.unwrap();
//!
//! let ctx = futures::executor::block_on(router.dispatch(Context::new("/users/7"))).unwrap();
//! assert_eq!(ctx.result().map(String::as_str), Some("user 7"));
//! ```

pub use waypost_core as core;
pub use waypost_navigator as navigator;

pub use waypost_core::{
	Context, Dispatcher, Middleware, Next, PatternError, Result, Route, RouteHandler, RoutePattern,
	Router, RouterError, StateError, async_handler,
};
pub use waypost_navigator::{
	HashMode, HistoryMode, ModeConfig, Navigator, NavigatorConfig, NavigatorOptions, Runtime,
};

/// Prelude for applications.
pub mod prelude {
	pub use crate::{
		Context, Dispatcher, HashMode, HistoryMode, Middleware, ModeConfig, Navigator,
		NavigatorConfig, NavigatorOptions, Next, Result, Route, Router, RouterError, Runtime,
		async_handler,
	};

	// Built-in middleware
	pub use waypost_core::middleware::{Layout, LayoutSink, NotFound, Title, TitleSink};

	// Browser environment
	pub use waypost_navigator::{
		ClickEvent, EventSource, History, LocationSource, NavigationListener, Outlet,
	};

	// External
	pub use async_trait::async_trait;
}

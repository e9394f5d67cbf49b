//! Browser navigation for waypost.
//!
//! A [`Runtime`] owns at most one running [`Navigator`]. The navigator binds
//! a [`Dispatcher`](waypost_core::Dispatcher), usually a
//! [`Router`](waypost_core::Router), to the browser environment:
//!
//! - it intercepts link clicks and `popstate` events
//! - it owns `history.pushState`, `replaceState` and `go`
//! - it runs at most one dispatch at a time, queueing the rest
//! - it renders each result through an [`Outlet`]
//!
//! The environment is reached only through the traits in [`env`], so the
//! navigator runs unchanged against mocks on native targets. The real
//! browser bindings live in `web` and are compiled for `wasm32` only.

pub mod config;
pub mod env;
pub mod mode;
pub mod navigator;
pub mod runtime;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{DEFAULT_POP_TIMEOUT_MS, ModeConfig, NavigatorConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use env::TokioTimer;
pub use env::{
	ClickEvent, EventSource, History, LocationSource, NavigationListener, NavigationTask, Outlet,
	PathNode, Timer, default_timer,
};
pub use mode::{Anchor, HashMode, HistoryMode, Location, Mode};
pub use navigator::{Navigator, NavigatorOptions};
pub use runtime::Runtime;

//! The single navigator slot of an application.

use crate::navigator::{Navigator, NavigatorOptions};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};
use waypost_core::{Dispatcher, Result, RouterError};

/// Owns at most one running [`Navigator`].
///
/// Applications create one runtime at startup and keep it (or clones of it)
/// wherever navigation is triggered.
///
/// # Examples
///
/// ```no_run
/// # async fn example(
/// # 	router: waypost_core::Router<String>,
/// # 	options: waypost_navigator::NavigatorOptions<String>,
/// # ) -> waypost_core::Result<()> {
/// use waypost_navigator::Runtime;
///
/// let runtime = Runtime::new();
/// runtime.run(router, options).await?;
/// runtime.push("/users/7").await?;
/// runtime.reset().await;
/// # Ok(())
/// # }
/// ```
pub struct Runtime<E: 'static> {
	slot: Rc<RefCell<Option<Navigator<E>>>>,
}

impl<E: 'static> Clone for Runtime<E> {
	fn clone(&self) -> Self {
		Self {
			slot: Rc::clone(&self.slot),
		}
	}
}

impl<E: 'static> Default for Runtime<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: 'static> std::fmt::Debug for Runtime<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Runtime")
			.field("navigator", &*self.slot.borrow())
			.finish()
	}
}

impl<E: 'static> Runtime<E> {
	/// Creates an empty runtime.
	pub fn new() -> Self {
		Self {
			slot: Rc::new(RefCell::new(None)),
		}
	}

	/// Starts a navigator: binds the event listeners and dispatches the
	/// current location.
	///
	/// The navigator occupies the slot before the first dispatch, so it stays
	/// running even if that dispatch fails.
	///
	/// # Errors
	///
	/// Returns [`RouterError::AlreadyRunning`] if a navigator is running,
	/// the binding error (leaving the slot empty), or the error of the first
	/// dispatch.
	pub async fn run<D>(&self, dispatcher: D, options: NavigatorOptions<E>) -> Result<Navigator<E>>
	where
		D: Dispatcher<E> + 'static,
	{
		if self.slot.borrow().is_some() {
			return Err(RouterError::AlreadyRunning);
		}

		let navigator = Navigator::new(Rc::new(dispatcher), options);
		navigator.bind()?;
		*self.slot.borrow_mut() = Some(navigator.clone());

		if let Err(e) = navigator.start().await {
			warn!(error = %e, "initial navigation failed");
			return Err(e);
		}
		Ok(navigator)
	}

	/// Returns the running navigator.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] if none is running.
	pub fn navigator(&self) -> Result<Navigator<E>> {
		self.slot.borrow().clone().ok_or(RouterError::NotRunning)
	}

	/// Returns whether a navigator is running.
	pub fn is_running(&self) -> bool {
		self.slot.borrow().is_some()
	}

	/// See [`Navigator::push`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] if no navigator is running.
	pub async fn push(&self, path: &str) -> Result<()> {
		self.navigator()?.push(path).await
	}

	/// See [`Navigator::replace`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] if no navigator is running.
	pub async fn replace(&self, path: &str) -> Result<()> {
		self.navigator()?.replace(path).await
	}

	/// See [`Navigator::go`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] if no navigator is running.
	pub async fn go(&self, delta: i32) -> Result<()> {
		self.navigator()?.go(delta).await
	}

	/// See [`Navigator::pop`].
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotRunning`] if no navigator is running.
	pub async fn pop(&self) -> Result<()> {
		self.navigator()?.pop().await
	}

	/// Stops the running navigator and empties the slot.
	///
	/// Waits for the in-flight dispatch and pop to settle. Does nothing if no
	/// navigator is running.
	pub async fn reset(&self) {
		let Some(navigator) = self.slot.borrow().clone() else {
			return;
		};
		navigator.stop().await;
		*self.slot.borrow_mut() = None;
		debug!("runtime reset");
	}
}

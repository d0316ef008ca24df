//! The capability interface implemented by components.

use crate::{ComponentContext, ComponentError};

/// Hooks a component implements.
///
/// Every hook defaults to doing nothing. The [`LifecycleDriver`]
/// performs all subscription bookkeeping before calling a hook, so a
/// hook only does the component's own work:
///
/// | Hook | Called | State during the hook |
/// |------|--------|-----------------------|
/// | `init` | once, when the component is attached | `Stopped` |
/// | `start` | on `start_components` | `Running` |
/// | `stop` | on `stop_components` | `Stopped` |
/// | `pause` | on `pause_components` | `Paused` |
/// | `resume` | on `resume_components` | `Running` |
///
/// Hooks take `&self`; keep mutable state behind a lock or atomics.
/// A hook is never re-entered: a meta-event fired from inside a hook is
/// applied to this component after the hook returns.
///
/// # Example
///
/// ```
/// use mousetrap_component::{ComponentContext, ComponentError, Lifecycle};
/// use mousetrap_event::{Callback, Event};
///
/// struct Display;
///
/// impl Lifecycle for Display {
///     fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
///         ctx.call(
///             Callback::new("show", |event: &Event| {
///                 let _frame = event.get("image")?;
///                 Ok(())
///             }),
///             "captured_image",
///         );
///         Ok(())
///     }
/// }
/// ```
///
/// [`LifecycleDriver`]: crate::LifecycleDriver
pub trait Lifecycle: Send + Sync + 'static {
    /// Declares registrations and publications. Runs once.
    ///
    /// # Errors
    ///
    /// An error aborts loading; the driver undoes everything `init` declared.
    fn init(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called after entering `Running` from `Stopped`.
    ///
    /// # Errors
    ///
    /// Propagated to whoever fired `start_components`.
    fn start(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called after entering `Stopped`.
    ///
    /// # Errors
    ///
    /// Propagated to whoever fired `stop_components`.
    fn stop(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called after entering `Paused`.
    ///
    /// # Errors
    ///
    /// Propagated to whoever fired `pause_components`.
    fn pause(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Ok(())
    }

    /// Called after returning to `Running` from `Paused`.
    ///
    /// # Errors
    ///
    /// Propagated to whoever fired `resume_components`.
    fn resume(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
        Ok(())
    }
}

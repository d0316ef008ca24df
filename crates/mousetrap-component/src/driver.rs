//! LifecycleDriver - generic state machine over any [`Lifecycle`].
//!
//! # Transition Bookkeeping
//!
//! On every legal meta-event the driver, in this order:
//!
//! 1. swaps the component's meta-event subscriptions so they equal the
//!    triggers of the new state,
//! 2. registers all declared registrations when entering `Running`, or
//!    unregisters them when leaving it,
//! 3. records the new state,
//! 4. calls the matching hook.
//!
//! | From | Trigger | To | Hook |
//! |------|---------|----|------|
//! | Stopped | `start_components` | Running | `start` |
//! | Running | `stop_components` | Stopped | `stop` |
//! | Running | `pause_components` | Paused | `pause` |
//! | Paused | `resume_components` | Running | `resume` |
//! | Paused | `stop_components` | Stopped | `stop` |
//!
//! A meta-event that is not legal from the current state is ignored.
//! Meta-events that reach the component while one of its hooks is
//! running are queued and applied, in order, once the hook returns.

use crate::{ComponentContext, ComponentError, Lifecycle, LifecycleState};
use mousetrap_event::{Callback, CallbackError, LifecycleEvent, Origin};
use mousetrap_types::ComponentId;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Object-safe handle the engine keeps for each loaded component.
pub trait ManagedComponent: Send + Sync {
    /// Returns the component's identity.
    fn id(&self) -> &ComponentId;

    /// Returns the current lifecycle state.
    fn state(&self) -> LifecycleState;

    /// Returns the component's context.
    fn context(&self) -> &ComponentContext;

    /// Takes the component off the bus for good.
    ///
    /// Stops it first if needed (running its `stop` hook), then removes
    /// its meta-event subscriptions and publisher declarations.
    ///
    /// # Errors
    ///
    /// The `stop` hook's error, if any. The component is detached
    /// regardless.
    fn detach(&self) -> Result<(), ComponentError>;
}

#[derive(Debug, Default)]
struct Pending {
    queue: VecDeque<LifecycleEvent>,
    busy: bool,
    /// Teardown requested while a hook was running.
    detaching: bool,
}

/// Drives one component through its lifecycle.
///
/// # Example
///
/// ```
/// use mousetrap_component::{ComponentContext, Lifecycle, LifecycleDriver, LifecycleState, ManagedComponent};
/// use mousetrap_event::{Bus, LifecycleEvent};
/// use mousetrap_types::ComponentId;
///
/// struct Idle;
/// impl Lifecycle for Idle {}
///
/// let bus = Bus::new();
/// let ctx = ComponentContext::new(ComponentId::builtin("idle"), bus.clone());
/// let driver = LifecycleDriver::attach(Idle, ctx).unwrap();
/// assert_eq!(driver.state(), LifecycleState::Stopped);
///
/// bus.fire(LifecycleEvent::StartComponents).unwrap();
/// assert_eq!(driver.state(), LifecycleState::Running);
///
/// bus.fire(LifecycleEvent::PauseComponents).unwrap();
/// assert_eq!(driver.state(), LifecycleState::Paused);
/// ```
pub struct LifecycleDriver<L: Lifecycle> {
    component: L,
    ctx: ComponentContext,
    /// One callback per meta-event, indexed by `LifecycleEvent as usize`.
    triggers: [Callback; 4],
    pending: Mutex<Pending>,
}

impl<L: Lifecycle> LifecycleDriver<L> {
    /// Attaches `component` to the bus behind `ctx` and runs its `init`.
    ///
    /// The component starts out `Stopped`, subscribed to
    /// `start_components` only.
    ///
    /// # Errors
    ///
    /// [`ComponentError::InitFailed`] if `init` fails. Everything the
    /// component declared so far is undone before returning, so a failed
    /// component leaves no trace on the bus.
    pub fn attach(component: L, ctx: ComponentContext) -> Result<Arc<Self>, ComponentError> {
        let fqn = ctx.id().fqn();
        let driver = Arc::new_cyclic(|weak: &Weak<Self>| {
            let triggers = LifecycleEvent::ALL.map(|event| {
                let weak = weak.clone();
                Callback::new(format!("{fqn}/{event}"), move |_| match weak.upgrade() {
                    Some(driver) => driver.handle(event).map_err(CallbackError::from),
                    None => Ok(()),
                })
            });
            Self {
                component,
                ctx,
                triggers,
                pending: Mutex::new(Pending::default()),
            }
        });

        driver.subscribe(LifecycleEvent::StartComponents);

        let span = driver.ctx.span().clone();
        let result = span.in_scope(|| driver.component.init(&driver.ctx));
        if let Err(source) = result {
            driver.teardown();
            warn!(parent: &span, error = %source, "init failed, rolled back");
            return Err(ComponentError::InitFailed {
                component: fqn,
                source: Box::new(source),
            });
        }

        debug!(
            parent: &span,
            registrations = driver.ctx.registrations().len(),
            publications = driver.ctx.publications().len(),
            "attached"
        );
        Ok(driver)
    }

    /// Returns the wrapped component.
    #[must_use]
    pub fn component(&self) -> &L {
        &self.component
    }

    fn trigger(&self, event: LifecycleEvent) -> &Callback {
        &self.triggers[event as usize]
    }

    fn subscribe(&self, event: LifecycleEvent) {
        let origin = Origin::new(format!("{}/lifecycle", self.ctx.id().fqn()));
        self.ctx
            .bus()
            .call_with(self.trigger(event).clone(), event, true, Some(origin));
    }

    fn unsubscribe(&self, event: LifecycleEvent) {
        if let Err(err) = self.ctx.bus().dont_call(self.trigger(event), event) {
            warn!(parent: self.ctx.span(), %event, error = %err, "lifecycle subscription already gone");
        }
    }

    /// Applies `trigger`, or queues it if a hook is already running.
    fn handle(&self, trigger: LifecycleEvent) -> Result<(), ComponentError> {
        {
            let mut pending = self.pending.lock();
            pending.queue.push_back(trigger);
            if pending.busy {
                debug!(parent: self.ctx.span(), %trigger, "deferred until current hook returns");
                return Ok(());
            }
            pending.busy = true;
        }

        loop {
            let next = {
                let mut pending = self.pending.lock();
                let popped = pending.queue.pop_front();
                match popped {
                    Some(next) => next,
                    None => {
                        pending.busy = false;
                        let detaching = std::mem::take(&mut pending.detaching);
                        drop(pending);
                        if detaching {
                            self.finish_detach();
                        }
                        return Ok(());
                    }
                }
            };

            if let Err(err) = self.transition(next) {
                let mut pending = self.pending.lock();
                let dropped: Vec<LifecycleEvent> = pending.queue.drain(..).collect();
                pending.busy = false;
                let detaching = std::mem::take(&mut pending.detaching);
                drop(pending);
                if !dropped.is_empty() {
                    warn!(parent: self.ctx.span(), ?dropped, "discarding deferred lifecycle events");
                }
                if detaching {
                    self.finish_detach();
                }
                return Err(err);
            }
        }
    }

    fn finish_detach(&self) {
        self.teardown();
        info!(parent: self.ctx.span(), "detached");
    }

    fn transition(&self, trigger: LifecycleEvent) -> Result<(), ComponentError> {
        let _entered = self.ctx.span().enter();

        let (from, to) = {
            let mut state = self.ctx.lock_state();
            let from = state.lifecycle;
            let Some(to) = from.next(trigger) else {
                debug!(state = %from, %trigger, "ignoring lifecycle event");
                return Ok(());
            };

            for &event in from.triggers() {
                if !to.triggers().contains(&event) {
                    self.unsubscribe(event);
                }
            }
            for &event in to.triggers() {
                if !from.triggers().contains(&event) {
                    self.subscribe(event);
                }
            }

            let bus = self.ctx.bus();
            if to.is_running() {
                for registration in &state.registrations {
                    registration.register(bus);
                }
            } else if from.is_running() {
                for registration in &state.registrations {
                    if let Err(err) = registration.unregister(bus) {
                        warn!(event = %registration.event_name, error = %err, "registration already gone");
                    }
                }
            }

            state.lifecycle = to;
            (from, to)
        };

        info!(%from, %to, "transition");

        match trigger {
            LifecycleEvent::StartComponents => self.component.start(&self.ctx),
            LifecycleEvent::StopComponents => self.component.stop(&self.ctx),
            LifecycleEvent::PauseComponents => self.component.pause(&self.ctx),
            LifecycleEvent::ResumeComponents => self.component.resume(&self.ctx),
        }
    }

    /// Removes every trace of the component from the bus.
    fn teardown(&self) {
        {
            let mut state = self.ctx.lock_state();
            for &event in state.lifecycle.triggers() {
                self.unsubscribe(event);
            }
            if state.lifecycle.is_running() {
                for registration in &state.registrations {
                    if let Err(err) = registration.unregister(self.ctx.bus()) {
                        warn!(parent: self.ctx.span(), event = %registration.event_name, error = %err, "registration already gone");
                    }
                }
            }
            state.registrations.clear();
        }

        let publications = std::mem::take(&mut self.ctx.lock_state().publications);
        for name in publications {
            if let Err(err) = self.ctx.bus().wont_fire(self.ctx.id(), name) {
                warn!(parent: self.ctx.span(), error = %err, "publication already withdrawn");
            }
        }
    }
}

impl<L: Lifecycle> ManagedComponent for LifecycleDriver<L> {
    fn id(&self) -> &ComponentId {
        self.ctx.id()
    }

    fn state(&self) -> LifecycleState {
        self.ctx.state()
    }

    fn context(&self) -> &ComponentContext {
        &self.ctx
    }

    fn detach(&self) -> Result<(), ComponentError> {
        {
            let mut pending = self.pending.lock();
            if pending.busy {
                // Called from one of our own hooks: stop and tear down once it returns.
                pending.detaching = true;
                if self.ctx.state() != LifecycleState::Stopped {
                    pending.queue.push_back(LifecycleEvent::StopComponents);
                }
                debug!(parent: self.ctx.span(), "detach deferred until current hook returns");
                return Ok(());
            }
        }

        let result = if self.ctx.state() == LifecycleState::Stopped {
            Ok(())
        } else {
            self.handle(LifecycleEvent::StopComponents)
        };
        self.finish_detach();
        result
    }
}

impl<L: Lifecycle> std::fmt::Debug for LifecycleDriver<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDriver")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousetrap_event::Bus;
    use mousetrap_types::ErrorCode;

    struct FailingInit;

    impl Lifecycle for FailingInit {
        fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
            ctx.call(Callback::new("never", |_| Ok(())), "captured_image");
            ctx.may_fire("nose_moved");
            Err(ComponentError::failed("camera missing"))
        }
    }

    /// Fires `stop_components` from inside its own `start` hook.
    struct StopsItself {
        log: Mutex<Vec<&'static str>>,
    }

    impl Lifecycle for StopsItself {
        fn start(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
            self.log.lock().push("start:enter");
            ctx.fire(LifecycleEvent::StopComponents)?;
            self.log.lock().push("start:exit");
            Ok(())
        }

        fn stop(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
            self.log.lock().push("stop");
            Ok(())
        }
    }

    /// Detaches itself from inside a hook: from `start`, or from `stop`
    /// after asking for a restart.
    struct DetachesItself {
        me: Mutex<Weak<LifecycleDriver<DetachesItself>>>,
        restart: bool,
        log: Mutex<Vec<&'static str>>,
    }

    impl DetachesItself {
        fn new(restart: bool) -> Self {
            Self {
                me: Mutex::new(Weak::new()),
                restart,
                log: Mutex::new(Vec::new()),
            }
        }

        fn detach_self(&self) -> Result<(), ComponentError> {
            match self.me.lock().upgrade() {
                Some(me) => me.detach(),
                None => Ok(()),
            }
        }
    }

    impl Lifecycle for DetachesItself {
        fn init(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
            ctx.call(Callback::new("on_image", |_| Ok(())), "captured_image");
            ctx.may_fire("nose_moved");
            Ok(())
        }

        fn start(&self, _ctx: &ComponentContext) -> Result<(), ComponentError> {
            self.log.lock().push("start:enter");
            if !self.restart {
                self.detach_self()?;
            }
            self.log.lock().push("start:exit");
            Ok(())
        }

        fn stop(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
            self.log.lock().push("stop");
            if self.restart {
                ctx.fire(LifecycleEvent::StartComponents)?;
                self.detach_self()?;
            }
            Ok(())
        }
    }

    fn attach_self_detaching(bus: &Bus, restart: bool) -> Arc<LifecycleDriver<DetachesItself>> {
        let driver =
            LifecycleDriver::attach(DetachesItself::new(restart), ctx(bus, "quitter")).unwrap();
        *driver.component().me.lock() = Arc::downgrade(&driver);
        driver
    }

    fn assert_no_trace(bus: &Bus, driver: &LifecycleDriver<DetachesItself>) {
        for event in LifecycleEvent::ALL {
            assert!(!bus.is_registered(driver.trigger(event), event.as_str()), "{event}");
        }
        assert_eq!(bus.callback_count("captured_image"), 0);
        assert!(!bus.has_publisher("nose_moved"));
    }

    fn ctx(bus: &Bus, name: &str) -> ComponentContext {
        ComponentContext::new(ComponentId::builtin(name), bus.clone())
    }

    #[test]
    fn attach_subscribes_to_start_only() {
        struct Idle;
        impl Lifecycle for Idle {}

        let bus = Bus::new();
        let driver = LifecycleDriver::attach(Idle, ctx(&bus, "idle")).unwrap();
        for event in LifecycleEvent::ALL {
            assert_eq!(
                bus.is_registered(driver.trigger(event), event.as_str()),
                event == LifecycleEvent::StartComponents,
                "{event}"
            );
        }
    }

    #[test]
    fn failed_init_is_rolled_back() {
        let bus = Bus::new();
        let err = LifecycleDriver::attach(FailingInit, ctx(&bus, "nose")).unwrap_err();

        assert_eq!(err.code(), "COMPONENT_INIT_FAILED");
        assert!(err.to_string().contains("camera missing"));
        assert_eq!(bus.callback_count(LifecycleEvent::StartComponents.as_str()), 0);
        assert!(!bus.has_publisher("nose_moved"));
        assert!(bus.unpublished_required_registrations().is_empty());
    }

    #[test]
    fn meta_event_from_own_hook_is_deferred() {
        let bus = Bus::new();
        let driver = LifecycleDriver::attach(
            StopsItself {
                log: Mutex::new(Vec::new()),
            },
            ctx(&bus, "self_stopper"),
        )
        .unwrap();

        bus.fire(LifecycleEvent::StartComponents).unwrap();

        assert_eq!(
            *driver.component().log.lock(),
            vec!["start:enter", "start:exit", "stop"]
        );
        assert_eq!(driver.state(), LifecycleState::Stopped);
    }

    #[test]
    fn detach_from_own_hook_waits_for_it() {
        let bus = Bus::new();
        let driver = attach_self_detaching(&bus, false);

        bus.fire(LifecycleEvent::StartComponents).unwrap();

        assert_eq!(
            *driver.component().log.lock(),
            vec!["start:enter", "start:exit", "stop"]
        );
        assert_eq!(driver.state(), LifecycleState::Stopped);
        assert_no_trace(&bus, &driver);
    }

    #[test]
    fn deferred_detach_clears_running_registrations() {
        let bus = Bus::new();
        let driver = attach_self_detaching(&bus, true);
        bus.fire(LifecycleEvent::StartComponents).unwrap();

        bus.fire(LifecycleEvent::StopComponents).unwrap();

        // The restart queued ahead of the detach leaves it running at teardown.
        assert_eq!(
            *driver.component().log.lock(),
            vec!["start:enter", "start:exit", "stop", "start:enter", "start:exit"]
        );
        assert_eq!(driver.state(), LifecycleState::Running);
        assert_no_trace(&bus, &driver);
    }

    #[test]
    fn dropped_driver_ignores_triggers() {
        struct Idle;
        impl Lifecycle for Idle {}

        let bus = Bus::new();
        let driver = LifecycleDriver::attach(Idle, ctx(&bus, "idle")).unwrap();
        drop(driver);
        assert!(bus.fire(LifecycleEvent::StartComponents).is_ok());
    }
}

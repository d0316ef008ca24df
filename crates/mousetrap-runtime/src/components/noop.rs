//! NoopComponent - does nothing.
//!
//! Loading it proves the registry, the driver and the meta-events are
//! wired up, without any subscriptions of its own.

use mousetrap_component::{ComponentContext, ComponentError, Lifecycle};
use tracing::debug;

/// Component with no subscriptions and no publications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopComponent;

impl Lifecycle for NoopComponent {
    fn start(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        debug!(component = %ctx.id().fqn(), "noop started");
        Ok(())
    }

    fn stop(&self, ctx: &ComponentContext) -> Result<(), ComponentError> {
        debug!(component = %ctx.id().fqn(), "noop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousetrap_component::testing::LifecycleHarness;
    use mousetrap_component::LifecycleState;

    #[test]
    fn full_cycle() {
        let harness = LifecycleHarness::new(NoopComponent).unwrap();

        harness.start().unwrap();
        harness.pause().unwrap();
        harness.resume().unwrap();
        harness.stop().unwrap();

        assert_eq!(harness.state(), LifecycleState::Stopped);
        assert_eq!(harness.transitions().len(), 4);
        assert!(harness.transitions().iter().all(|t| t.error.is_none()));
        assert!(harness.context().registrations().is_empty());
    }
}

use crate::context::BuildContext;

/// The selection stages, in orchestration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub enum BuildStage {
    Priority,
    SpecialLands,
    BasicLands,
    Categories,
    Fallback,
    Finalize,
}

impl BuildStage {
    pub const ALL: [BuildStage; 6] = [
        BuildStage::Priority,
        BuildStage::SpecialLands,
        BuildStage::BasicLands,
        BuildStage::Categories,
        BuildStage::Fallback,
        BuildStage::Finalize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuildStage::Priority => "priority",
            BuildStage::SpecialLands => "special_lands",
            BuildStage::BasicLands => "basic_lands",
            BuildStage::Categories => "categories",
            BuildStage::Fallback => "fallback",
            BuildStage::Finalize => "finalize",
        }
    }
}

/// When a hook fires relative to its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookTiming {
    Before,
    After,
}

/// Observation event handed to hooks. Hooks see the live context but
/// cannot mutate it.
#[derive(Debug)]
pub struct HookEvent<'a> {
    pub stage: BuildStage,
    pub timing: HookTiming,
    /// Set for the per-category event fired after each category fill.
    pub category: Option<&'a str>,
    pub context: &'a BuildContext,
}

/// Error returned by a hook. Hook failures are caught per-invocation,
/// logged into the operation log, and never abort the stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError(pub String);

impl std::fmt::Display for HookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hook error: {}", self.0)
    }
}

impl std::error::Error for HookError {}

type Hook = Box<dyn Fn(&HookEvent<'_>) -> Result<(), HookError>>;

struct Registration {
    stage: Option<BuildStage>,
    timing: Option<HookTiming>,
    hook: Hook,
}

/// Named extension points fired around each build stage.
#[derive(Default)]
pub struct BuildHooks {
    registrations: Vec<Registration>,
}

impl BuildHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook for every stage event.
    pub fn on_any(&mut self, hook: impl Fn(&HookEvent<'_>) -> Result<(), HookError> + 'static) {
        self.registrations.push(Registration {
            stage: None,
            timing: None,
            hook: Box::new(hook),
        });
    }

    pub fn on_before(
        &mut self,
        stage: BuildStage,
        hook: impl Fn(&HookEvent<'_>) -> Result<(), HookError> + 'static,
    ) {
        self.registrations.push(Registration {
            stage: Some(stage),
            timing: Some(HookTiming::Before),
            hook: Box::new(hook),
        });
    }

    pub fn on_after(
        &mut self,
        stage: BuildStage,
        hook: impl Fn(&HookEvent<'_>) -> Result<(), HookError> + 'static,
    ) {
        self.registrations.push(Registration {
            stage: Some(stage),
            timing: Some(HookTiming::After),
            hook: Box::new(hook),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Fires every matching hook, collecting (not propagating) errors.
    pub(crate) fn fire(
        &self,
        stage: BuildStage,
        timing: HookTiming,
        category: Option<&str>,
        context: &BuildContext,
    ) -> Vec<HookError> {
        let event = HookEvent {
            stage,
            timing,
            category,
            context,
        };
        self.registrations
            .iter()
            .filter(|r| r.stage.is_none_or(|s| s == stage))
            .filter(|r| r.timing.is_none_or(|t| t == timing))
            .filter_map(|r| (r.hook)(&event).err())
            .collect()
    }
}

impl std::fmt::Debug for BuildHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildHooks")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_hooks_filter_by_stage_and_timing() {
        let mut hooks = BuildHooks::new();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        hooks.on_after(BuildStage::Priority, move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        });

        let ctx = BuildContext::new("test");
        hooks.fire(BuildStage::Priority, HookTiming::Before, None, &ctx);
        hooks.fire(BuildStage::Categories, HookTiming::After, None, &ctx);
        assert_eq!(count.get(), 0);
        hooks.fire(BuildStage::Priority, HookTiming::After, None, &ctx);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_hook_errors_are_collected() {
        let mut hooks = BuildHooks::new();
        hooks.on_any(|_| Err(HookError("boom".to_string())));
        hooks.on_any(|_| Ok(()));

        let ctx = BuildContext::new("test");
        let errors = hooks.fire(BuildStage::Finalize, HookTiming::After, None, &ctx);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "boom");
    }

    #[test]
    fn test_category_event_carries_name() {
        let mut hooks = BuildHooks::new();
        hooks.on_after(BuildStage::Categories, |event| {
            match event.category {
                Some("removal") => Ok(()),
                other => Err(HookError(format!("unexpected category {other:?}"))),
            }
        });

        let ctx = BuildContext::new("test");
        let errors = hooks.fire(
            BuildStage::Categories,
            HookTiming::After,
            Some("removal"),
            &ctx,
        );
        assert!(errors.is_empty());
    }
}

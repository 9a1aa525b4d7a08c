//! Input session: left and right devices over one action namespace

use tracing::{debug, info};

use crate::action_set::ActionRegistry;
use crate::binder::{binding_count, SuggestedBindings};
use crate::config::ResolverConfig;
use crate::delegate::ControllerDelegate;
use crate::error::{InputError, RuntimeError};
use crate::input_source::{FrameContext, InputSource};
use crate::mapping::{MappingCatalog, SystemProperties};
use crate::runtime::{Handedness, XrRuntime};

/// Consumer device indices of the two hands
pub const LEFT_DEVICE_INDEX: usize = 0;
pub const RIGHT_DEVICE_INDEX: usize = 1;

#[derive(Debug)]
pub struct InputSession {
    registry: ActionRegistry,
    sources: Vec<InputSource>,
    bindings: SuggestedBindings,
    emulate_profile: Option<String>,
}

impl InputSession {
    /// Filter the catalog, build both devices and submit their bindings
    pub fn new(
        runtime: &dyn XrRuntime,
        catalog: &MappingCatalog,
        system: &SystemProperties,
        config: &ResolverConfig,
    ) -> Result<Self, InputError> {
        let mappings = catalog.filter(system);
        let mut registry = ActionRegistry::new();

        let mut sources = Vec::with_capacity(2);
        for (hand, index) in [
            (Handedness::Left, LEFT_DEVICE_INDEX),
            (Handedness::Right, RIGHT_DEVICE_INDEX),
        ] {
            let source = InputSource::create(
                runtime,
                &mut registry,
                mappings.clone(),
                hand,
                index,
                config,
            )?;
            sources.push(source);
        }

        let mut bindings = SuggestedBindings::new();
        for source in &sources {
            source.suggest_bindings(&mut bindings)?;
        }

        for (profile, profile_bindings) in &bindings {
            runtime
                .suggest_bindings(profile, profile_bindings)
                .map_err(|source| InputError::SuggestBindings {
                    profile: profile.clone(),
                    count: profile_bindings.len(),
                    source,
                })?;
            debug!("Suggested {} bindings for {}", profile_bindings.len(), profile);
        }

        info!(
            "Input session ready: {} mappings, {} actions, {} bindings",
            mappings.len(),
            registry.len(),
            binding_count(&bindings)
        );

        Ok(Self {
            registry,
            sources,
            bindings,
            emulate_profile: config.emulate_profile.clone(),
        })
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn bindings(&self) -> &SuggestedBindings {
        &self.bindings
    }

    pub fn sources(&self) -> &[InputSource] {
        &self.sources
    }

    pub fn source(&self, hand: Handedness) -> Option<&InputSource> {
        self.sources.iter().find(|s| s.hand() == hand)
    }

    /// Re-select active mappings, e.g. after the runtime reports a profile change
    pub fn update_interaction_profiles(
        &mut self,
        runtime: &dyn XrRuntime,
        delegate: &mut dyn ControllerDelegate,
    ) -> Result<(), RuntimeError> {
        let emulate = self.emulate_profile.as_deref();
        for source in &mut self.sources {
            source.update_interaction_profile(runtime, delegate, emulate)?;
        }
        Ok(())
    }

    /// Run one frame for both devices
    pub fn update(
        &mut self,
        runtime: &dyn XrRuntime,
        frame: &FrameContext,
        delegate: &mut dyn ControllerDelegate,
    ) {
        for source in &mut self.sources {
            source.update(runtime, frame, delegate);
        }
    }
}

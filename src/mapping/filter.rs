//! Startup filtering of the mapping catalog against the live system

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DeviceMapping, Dof};

/// What the runtime reports about the headset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemProperties {
    /// System name, compared against mapping system filters
    pub name: String,
    /// Whether the system tracks position (6DoF)
    pub position_tracking: bool,
}

impl SystemProperties {
    pub fn new(name: &str, position_tracking: bool) -> Self {
        Self {
            name: name.to_string(),
            position_tracking,
        }
    }
}

/// Keep the mappings usable on `system`, preserving catalog order.
///
/// A mapping is dropped when it names a different system, or when its DoF
/// class disagrees with the system's position tracking. Repeated rows
/// (same profile and system filter) are dropped.
pub fn filter_mappings(all: &[DeviceMapping], system: &SystemProperties) -> Vec<DeviceMapping> {
    let system_is_6dof = system.position_tracking;
    let mut filtered: Vec<DeviceMapping> = Vec::new();

    for mapping in all {
        if let Some(filter) = &mapping.system_filter {
            if filter != &system.name {
                continue;
            }
        }

        let mapping_is_6dof = mapping.dof == Dof::SixDof;
        if mapping_is_6dof != system_is_6dof {
            continue;
        }

        let duplicate = filtered
            .iter()
            .any(|m| m.profile == mapping.profile && m.system_filter == mapping.system_filter);
        if duplicate {
            warn!("Ignoring duplicate mapping for {}", mapping.profile);
            continue;
        }

        filtered.push(mapping.clone());
    }

    debug!(
        "{} of {} mappings usable on '{}' ({})",
        filtered.len(),
        all.len(),
        system.name,
        if system_is_6dof { "6DoF" } else { "3DoF" }
    );

    filtered
}

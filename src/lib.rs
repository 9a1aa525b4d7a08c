//! XR input resolver
//!
//! Turns XR runtime actions and tracked hands into uniform per-device
//! controller state: mapping selection, button/axis fusion, hand-tracking
//! controller emulation and haptic sequencing.

pub mod action_set;
pub mod binder;
pub mod config;
pub mod delegate;
pub mod elbow;
pub mod error;
pub mod hand;
pub mod haptics;
pub mod input_source;
pub mod mapping;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod sim;

pub use config::ResolverConfig;
pub use delegate::{ControllerDelegate, HapticRequest, RenderMode};
pub use error::{InputError, RuntimeError};
pub use input_source::{FrameContext, InputSource};
pub use mapping::{DeviceMapping, MappingCatalog, SystemProperties};
pub use runtime::{Handedness, XrRuntime};
pub use session::InputSession;

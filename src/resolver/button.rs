//! Button sub-channel fusion (click / touch / value)

use tracing::{debug, warn};

use crate::action_set::ButtonActions;
use crate::mapping::{ButtonFlags, ButtonSpec};
use crate::runtime::{Handedness, XrRuntime};

/// Default analog level above which a button without a click channel counts as clicked
pub const DEFAULT_CLICK_THRESHOLD: f32 = 0.91;

/// Fused state of one logical button for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedButtonState {
    pub clicked: bool,
    pub touched: bool,
    pub value: f32,
}

/// Fuse the successfully queried sub-channels of a button
///
/// # Arguments
/// * `click` - Click channel reading, `None` if not declared or the query failed
/// * `touch` - Touch channel reading, same convention
/// * `value` - Analog channel reading, same convention
/// * `click_threshold` - Analog level above which a click is inferred
///
/// # Returns
/// The fused state, or `None` when no channel produced a reading
pub fn fuse_button_state(
    click: Option<bool>,
    touch: Option<bool>,
    value: Option<f32>,
    click_threshold: f32,
) -> Option<ResolvedButtonState> {
    if click.is_none() && touch.is_none() && value.is_none() {
        return None;
    }

    let mut clicked = click.unwrap_or(false);
    let touched = touch.unwrap_or(clicked);
    let value = value.unwrap_or(if clicked { 1.0 } else { 0.0 });

    // Analog-only triggers have no detent
    if click.is_none() && value > click_threshold {
        clicked = true;
    }

    Some(ResolvedButtonState {
        clicked,
        touched,
        value,
    })
}

/// Query and fuse the channels `spec` declares for `hand`
///
/// A failed query is logged and treated as "not queried".
pub fn resolve_button(
    runtime: &dyn XrRuntime,
    actions: &ButtonActions,
    spec: &ButtonSpec,
    hand: Handedness,
    click_threshold: f32,
) -> Option<ResolvedButtonState> {
    let click = match actions.click {
        Some(action) if spec.flags.contains(ButtonFlags::CLICK) => {
            match runtime.query_bool(action, hand) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("Click query for '{}' failed: {}", spec.path, e);
                    None
                }
            }
        }
        _ => None,
    };

    let touch = match actions.touch {
        Some(action) if spec.flags.contains(ButtonFlags::TOUCH) => {
            match runtime.query_bool(action, hand) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("Touch query for '{}' failed: {}", spec.path, e);
                    None
                }
            }
        }
        _ => None,
    };

    let value = match actions.value {
        Some(action) if spec.flags.contains(ButtonFlags::VALUE) => {
            match runtime.query_float(action, hand) {
                Ok(v) => Some(v),
                Err(e) => {
                    debug!("Value query for '{}' failed: {}", spec.path, e);
                    None
                }
            }
        }
        _ => None,
    };

    let state = fuse_button_state(click, touch, value, click_threshold);
    match &state {
        Some(s) if s.clicked => debug!("Button clicked: {}", spec.button_type.name()),
        Some(_) => {}
        None => warn!("Can't read {} button at '{}'", hand.name(), spec.path),
    }
    state
}

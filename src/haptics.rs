//! Haptic pulse sequencing
//!
//! The consumer exposes at most one pending pulse per device, identified by
//! the frame it was requested on. The sequencer turns that level into
//! start/stop calls: one start per new frame id, one stop when the request
//! goes away.

use tracing::{debug, warn};

use crate::delegate::HapticRequest;
use crate::runtime::{ActionHandle, Handedness, XrRuntime, FREQUENCY_UNSPECIFIED};

/// Default lower bound for pulse amplitude
pub const DEFAULT_MIN_HAPTIC_AMPLITUDE: f32 = 0.1;

const NANOS_PER_SECOND: f32 = 1_000_000_000.0;

/// Runtime call the sequencer decided on for this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HapticCommand {
    Start { duration_nanos: i64, amplitude: f32 },
    Stop,
}

#[derive(Debug, Clone)]
pub struct HapticsSequencer {
    /// Frame id of the pulse currently playing, 0 when idle
    start_frame_id: u64,
    min_amplitude: f32,
}

impl Default for HapticsSequencer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_HAPTIC_AMPLITUDE)
    }
}

impl HapticsSequencer {
    pub fn new(min_amplitude: f32) -> Self {
        Self {
            start_frame_id: 0,
            min_amplitude,
        }
    }

    pub fn active_frame_id(&self) -> Option<u64> {
        (self.start_frame_id != 0).then_some(self.start_frame_id)
    }

    /// Advance the latch for `request` and return the call to make, if any
    pub fn plan(&mut self, request: &HapticRequest) -> Option<HapticCommand> {
        if request.frame_id == 0 || request.duration <= 0.0 || request.intensity <= 0.0 {
            if self.start_frame_id != 0 {
                self.start_frame_id = 0;
                return Some(HapticCommand::Stop);
            }
            return None;
        }

        if request.frame_id == self.start_frame_id {
            return None;
        }
        self.start_frame_id = request.frame_id;

        let duration_nanos = (request.duration * NANOS_PER_SECOND).round() as i64;
        let amplitude = request.intensity.max(self.min_amplitude).min(1.0);

        Some(HapticCommand::Start {
            duration_nanos,
            amplitude,
        })
    }

    /// Apply `request` against the runtime's haptic action
    ///
    /// Failures are logged and not retried; the latch still advances so the
    /// same request is not re-sent every frame.
    pub fn update(
        &mut self,
        runtime: &dyn XrRuntime,
        action: ActionHandle,
        hand: Handedness,
        request: &HapticRequest,
    ) {
        match self.plan(request) {
            Some(HapticCommand::Start {
                duration_nanos,
                amplitude,
            }) => {
                debug!(
                    "Haptic pulse on {} hand: {} ns at {:.2}",
                    hand.name(),
                    duration_nanos,
                    amplitude
                );
                if let Err(e) = runtime.apply_haptic_pulse(
                    action,
                    hand,
                    duration_nanos,
                    FREQUENCY_UNSPECIFIED,
                    amplitude,
                ) {
                    warn!("Failed to start haptic pulse on {} hand: {}", hand.name(), e);
                }
            }
            Some(HapticCommand::Stop) => {
                if let Err(e) = runtime.stop_haptic_pulse(action, hand) {
                    warn!("Failed to stop haptic pulse on {} hand: {}", hand.name(), e);
                }
            }
            None => {}
        }
    }
}

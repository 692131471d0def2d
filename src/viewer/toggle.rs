use rustc_hash::FxHashMap;

use crate::animation::{AnimationMixer, LoopMode};
use crate::config::ToggleRule;

/// Resting pose a toggled animation is heading to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    Open,
    #[default]
    Closed,
}

/// Open/closed state per toggleable animation name.
///
/// `Closed → Open` plays the clip forward from 0; `Open → Closed` plays it
/// backwards from its full duration. Both are one-shot and clamp on the
/// final pose. Toggling while the action is still moving only flips the
/// direction, so the part reverses from wherever it currently is.
#[derive(Debug, Clone, Default)]
pub struct AnimationToggleController {
    states: FxHashMap<String, ToggleState>,
}

impl AnimationToggleController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One `Closed` entry per distinct animation named by `rules`.
    #[must_use]
    pub fn from_rules(rules: &[ToggleRule]) -> Self {
        let states = rules
            .iter()
            .map(|rule| (rule.animation.clone(), ToggleState::Closed))
            .collect();
        Self { states }
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<ToggleState> {
        self.states.get(name).copied()
    }

    /// Flips `name` and drives its action accordingly.
    ///
    /// Returns `false` (and changes nothing) when the name has no toggle
    /// entry or the mixer has no action for it.
    pub fn toggle(&mut self, name: &str, mixer: &mut AnimationMixer) -> bool {
        let Some(state) = self.states.get_mut(name) else {
            return false;
        };
        let Some(action) = mixer.clip_action(name) else {
            return false;
        };

        let in_flight = action.is_running();

        match *state {
            ToggleState::Closed => {
                if in_flight {
                    action.reset_playback_state();
                } else {
                    action.reset();
                }
                action.time_scale = 1.0;
                *state = ToggleState::Open;
            }
            ToggleState::Open => {
                if !in_flight {
                    action.time = action.duration();
                }
                action.reset_playback_state();
                action.time_scale = -1.0;
                *state = ToggleState::Closed;
            }
        }

        action.loop_mode = LoopMode::Once;
        action.clamp_when_finished = true;
        action.play();

        log::debug!("Toggled '{name}' to {:?}", *state);
        true
    }
}

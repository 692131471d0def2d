use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::animation::action::{AnimationAction, PlayDirection, TrackValue};
use crate::animation::binding::TargetPath;
use crate::scene::Scene;

/// Emitted by [`AnimationMixer::update`] when a one-shot action reaches a bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixerEvent {
    Finished {
        action: String,
        direction: PlayDirection,
    },
}

/// Owns every action of the loaded model, addressed by clip name.
///
/// Each frame it advances the scheduled actions and writes the sampled
/// translation / rotation / scale into the bound node transforms.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    by_name: FxHashMap<String, usize>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an action under its clip name. A later clip with the same
    /// name replaces the earlier lookup entry.
    pub fn add_action(&mut self, action: AnimationAction) {
        let index = self.actions.len();
        self.by_name.insert(action.name().to_string(), index);
        self.actions.push(action);
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.by_name.get(name).and_then(|&i| self.actions.get(i))
    }

    /// Mutable access to the action playing clip `name`.
    pub fn clip_action(&mut self, name: &str) -> Option<&mut AnimationAction> {
        let index = *self.by_name.get(name)?;
        self.actions.get_mut(index)
    }

    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(AnimationAction::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn update(&mut self, dt: f32, scene: &mut Scene) -> SmallVec<[MixerEvent; 2]> {
        let mut events = SmallVec::new();

        for action in &mut self.actions {
            if let Some(direction) = action.update(dt) {
                log::debug!("Animation '{}' finished ({direction:?})", action.name());
                events.push(MixerEvent::Finished {
                    action: action.name().to_string(),
                    direction,
                });
            }

            if !action.is_scheduled() || action.weight <= 0.0 {
                continue;
            }

            for binding_index in 0..action.bindings.len() {
                let binding = action.bindings[binding_index];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                match (value, binding.target) {
                    (TrackValue::Vector3(v), TargetPath::Translation) => node.transform.position = v,
                    (TrackValue::Vector3(v), TargetPath::Scale) => node.transform.scale = v,
                    (TrackValue::Quaternion(q), TargetPath::Rotation) => node.transform.rotation = q,
                    _ => continue,
                }
                node.transform.mark_dirty();
            }
        }

        events
    }
}

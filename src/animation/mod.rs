//! Keyframe animation: clips, tracks, actions and the mixer that drives them.

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode, PlayDirection, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::{AnimationMixer, MixerEvent};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};

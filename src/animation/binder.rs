use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Resolves each track of `clip` to a node below `root` by node name.
    ///
    /// Tracks whose node cannot be found are skipped; the first match in
    /// depth-first pre-order wins when names repeat.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        clip.tracks
            .iter()
            .enumerate()
            .filter_map(|(track_index, track)| {
                let node_handle = scene.find_by_name(root, &track.meta.node_name)?;
                Some(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                })
            })
            .collect()
    }
}

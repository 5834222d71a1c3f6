mod blend_mask;
mod blend_profile;

pub use blend_mask::*;
pub use blend_profile::*;

use crate::skeleton::JointSkeleton;

/// Name a per-joint table should be read under: the joint itself, or its mirror partner
/// when the table is mirrored. Joints without a partner read their own entry.
fn lookup_name<'a>(joint: &'a str, skeleton: &'a JointSkeleton, mirrored: bool) -> &'a str {
    if mirrored {
        skeleton.mirror_joint(joint).unwrap_or(joint)
    } else {
        joint
    }
}

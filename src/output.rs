use bytemuck::{Pod, Zeroable};

use crate::chain::LinkId;
use crate::math::Transform;

/// Component-space transform for one configured bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneTransform {
    pub link: LinkId,
    pub transform: Transform,
}

impl BoneTransform {
    pub fn new(link: LinkId, transform: Transform) -> Self {
        Self { link, transform }
    }
}

/// Byte-stable form of [`BoneTransform`] for hosts that copy poses across an
/// FFI or GPU boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PackedBoneTransform {
    pub position: [f32; 3],
    pub bone_index: u32,
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub _padding: u32,
}

impl From<&BoneTransform> for PackedBoneTransform {
    fn from(bone: &BoneTransform) -> Self {
        Self {
            position: bone.transform.position.to_array(),
            bone_index: bone.link.0 as u32,
            rotation: bone.transform.rotation.to_array(),
            scale: bone.transform.scale.to_array(),
            _padding: 0,
        }
    }
}

pub fn pack(bones: &[BoneTransform]) -> Vec<PackedBoneTransform> {
    bones.iter().map(PackedBoneTransform::from).collect()
}

/// Writes `bones` back into a component-space pose indexed by bone.
pub fn write_back(bones: &[BoneTransform], pose: &mut [Transform]) {
    for bone in bones {
        if let Some(slot) = pose.get_mut(bone.link.0) {
            *slot = bone.transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn packed_layout_has_no_padding_bytes() {
        assert_eq!(std::mem::size_of::<PackedBoneTransform>(), 48);
    }

    #[test]
    fn pack_preserves_fields() {
        let bone = BoneTransform::new(
            LinkId(7),
            Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::splat(2.0)),
        );
        let packed = pack(&[bone]);
        assert_eq!(packed[0].bone_index, 7);
        assert_eq!(packed[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(packed[0].rotation, [0.0, 0.0, 0.0, 1.0]);

        let bytes: &[u8] = bytemuck::cast_slice(&packed);
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn write_back_skips_out_of_range_links() {
        let mut pose = vec![Transform::IDENTITY; 2];
        let bones = [
            BoneTransform::new(LinkId(1), Transform::from_position(Vec3::X)),
            BoneTransform::new(LinkId(5), Transform::from_position(Vec3::Y)),
        ];
        write_back(&bones, &mut pose);
        assert_eq!(pose[0], Transform::IDENTITY);
        assert_eq!(pose[1].position, Vec3::X);
    }
}

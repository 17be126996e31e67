use glam::Vec3;

use super::link::Link;
use super::skeleton::LinkId;
use crate::error::ChainError;
use crate::math::vector::safe_normal;
use crate::math::Transform;

/// Ordered links, root first, rebuilt from the base pose every frame while the
/// solver-owned state survives.
#[derive(Debug, Clone)]
pub struct ChainModel {
    identities: Vec<LinkId>,
    links: Vec<Link>,
}

impl ChainModel {
    pub fn new(identities: Vec<LinkId>) -> Self {
        Self {
            identities,
            links: Vec::new(),
        }
    }

    pub fn identities(&self) -> &[LinkId] {
        &self.identities
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// True once the first refresh allocated the links.
    pub fn is_built(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn root(&self) -> Option<&Link> {
        self.links.first()
    }

    pub fn tip(&self) -> Option<&Link> {
        self.links.last()
    }

    /// Segment lengths between neighbours, root first; one fewer than links.
    pub fn segment_lengths(&self) -> impl Iterator<Item = f32> + '_ {
        let count = self.links.len().saturating_sub(1);
        self.links.iter().take(count).map(|link| link.segment_length)
    }

    pub fn total_length(&self) -> f32 {
        self.segment_lengths().sum()
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.links.iter().map(Link::position)
    }

    /// Checks the configuration against a base pose of `pose_len` bones.
    pub fn validate(&self, pose_len: usize) -> Result<(), ChainError> {
        if self.identities.len() < 2 {
            return Err(ChainError::TooFewLinks {
                configured: self.identities.len(),
            });
        }
        match self.identities.iter().find(|id| id.0 >= pose_len) {
            Some(&link) => Err(ChainError::BoneOutOfRange { link, pose_len }),
            None => Ok(()),
        }
    }

    /// Pulls this frame's base pose into the links.
    ///
    /// The first successful call allocates the links and measures the segment
    /// lengths in world space. Later calls only overwrite `original_pose`.
    /// On error nothing is touched.
    pub fn refresh(&mut self, base_pose: &[Transform], owner: &Transform) -> Result<(), ChainError> {
        self.validate(base_pose.len())?;

        let world = |id: LinkId| base_pose[id.0].then(owner);

        if self.links.len() != self.identities.len() {
            self.links = self
                .identities
                .iter()
                .map(|&id| Link::new(id, world(id)))
                .collect();
            self.measure();
            log::trace!(
                "chain built: {} links, length {:.2}",
                self.links.len(),
                self.total_length()
            );
        } else {
            for link in &mut self.links {
                link.original_pose = world(link.identity);
            }
        }
        Ok(())
    }

    /// Forces the next refresh to rebuild links and segment lengths.
    pub fn rebind(&mut self) {
        self.links.clear();
    }

    pub fn snap_to_original(&mut self) {
        self.links.iter_mut().for_each(Link::snap_to_original);
    }

    fn measure(&mut self) {
        let n = self.links.len();
        for i in 0..n {
            let (length, heading) = match self.links.get(i + 1) {
                Some(next) => {
                    let delta = next.original_pose.position - self.links[i].original_pose.position;
                    (delta.length(), safe_normal(delta).unwrap_or(Vec3::X))
                }
                None => (0.0, self.links[i].heading),
            };
            self.links[i].segment_length = length;
            self.links[i].heading = heading;
        }
    }
}

//! Link records and the per-frame chain model.

mod link;
mod model;
mod skeleton;

pub use link::{GroundContact, Link};
pub use model::ChainModel;
pub use skeleton::{resolve_links, LinkId, NamedSkeleton, Skeleton};

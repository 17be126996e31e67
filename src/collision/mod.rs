//! Surface queries for the ground-adaptive tail.

mod obstacle;
mod query;
mod raycast;
mod world;

pub use obstacle::{AabbObstacle, Obstacle, SphereObstacle};
pub use query::{QueryError, SurfaceQuery, TraceResult, TraceSchedule, TraceShape};
pub use raycast::{Ray, RayHit};
pub use world::ObstacleWorld;

//! Types shared between the window list and its collaborators

mod geometry;

pub use geometry::Geometry;

//! Geometric core: predicates, dual segment chains, the triangulation seam
//! and the Voronoi diagram builder

pub mod delaunay;
pub mod predicates;
pub mod segment;
pub mod voronoi;

pub use delaunay::{SiteTriangulation, Triangulator};
pub use segment::{DualSegment, SegId, SegmentArena};
pub use voronoi::VoronoiBuilder;

//! Delaunay triangulation seam
//!
//! Diagram construction only needs a handful of triangulation queries, kept
//! behind the [`Triangulator`] trait. [`SiteTriangulation`] implements it on
//! top of spade's incremental Delaunay triangulation.

use glam::DVec2;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, Point2, Triangulation};

use crate::error::{ApproxError, Result};
use crate::geometry::segment::DualSegment;

/// How far unbounded dual rays are extended so clipping can treat every
/// segment as finite.
pub const FAR_DISTANCE: f64 = 1e10;

/// Flag for the far endpoint of an unbounded dual chain that was never
/// clipped against the domain.
pub const FAR_POINT_FLAG: i32 = -1_000_000;

/// The triangulation queries the diagram builder consumes
///
/// Vertex indices must be dense, 0-based and stable under insertion.
pub trait Triangulator {
    /// Number of sites currently triangulated
    fn vertex_count(&self) -> usize;

    /// Position of site `v`
    fn position(&self, v: usize) -> DVec2;

    /// Index of the site nearest to `p`, if any site exists
    fn nearest_vertex(&self, p: DVec2) -> Option<usize>;

    /// Sites connected to `v` by a triangulation edge
    fn neighbor_sites(&self, v: usize) -> Vec<usize>;

    /// The dual of site `v`: circumcenters of its incident triangles joined
    /// into a circular chain of oriented segments
    ///
    /// Segments follow the cell boundary counterclockwise; `prev`/`next`
    /// link positions within the returned vector. Where the cell is
    /// unbounded, the two hull segments are extended [`FAR_DISTANCE`] along
    /// the perpendicular bisector and the chain is left open there
    /// (`prev`/`next` of `None`).
    fn dual_chain(&self, v: usize) -> Vec<DualSegment>;
}

/// Incremental Delaunay triangulation of the site set
pub struct SiteTriangulation {
    tri: DelaunayTriangulation<Point2<f64>>,
    handles: Vec<FixedVertexHandle>,
    site_of_vertex: Vec<usize>,
}

impl SiteTriangulation {
    pub fn new() -> Self {
        Self {
            tri: DelaunayTriangulation::new(),
            handles: Vec::new(),
            site_of_vertex: Vec::new(),
        }
    }

    /// Rebuild the triangulation from a full site list
    ///
    /// Sites are expected to be distinct; coinciding sites collapse onto one
    /// triangulation vertex and share its cell.
    pub fn set_vertices(&mut self, sites: &[DVec2]) -> Result<()> {
        self.tri = DelaunayTriangulation::new();
        self.handles.clear();
        self.site_of_vertex.clear();

        for (i, p) in sites.iter().enumerate() {
            let before = self.tri.num_vertices();
            let handle = self
                .tri
                .insert(Point2::new(p.x, p.y))
                .map_err(|e| ApproxError::Triangulation(format!("{:?}", e)))?;
            if self.tri.num_vertices() > before {
                self.site_of_vertex.push(i);
            }
            self.handles.push(handle);
        }

        Ok(())
    }

    /// Insert one additional site
    ///
    /// Returns the new site index, or `None` when the position coincides
    /// with an existing site.
    pub fn insert_site(&mut self, p: DVec2) -> Result<Option<usize>> {
        let before = self.tri.num_vertices();
        let handle = self
            .tri
            .insert(Point2::new(p.x, p.y))
            .map_err(|e| ApproxError::Triangulation(format!("{:?}", e)))?;
        if self.tri.num_vertices() == before {
            return Ok(None);
        }

        let index = self.handles.len();
        self.handles.push(handle);
        self.site_of_vertex.push(index);
        Ok(Some(index))
    }

    fn site_index(&self, handle: FixedVertexHandle) -> usize {
        self.site_of_vertex[handle.index()]
    }
}

impl Default for SiteTriangulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Triangulator for SiteTriangulation {
    fn vertex_count(&self) -> usize {
        self.handles.len()
    }

    fn position(&self, v: usize) -> DVec2 {
        let p = self.tri.vertex(self.handles[v]).position();
        DVec2::new(p.x, p.y)
    }

    fn nearest_vertex(&self, p: DVec2) -> Option<usize> {
        self.tri
            .nearest_neighbor(Point2::new(p.x, p.y))
            .map(|h| self.site_index(h.fix()))
    }

    fn neighbor_sites(&self, v: usize) -> Vec<usize> {
        self.tri
            .vertex(self.handles[v])
            .out_edges()
            .map(|e| self.site_index(e.to().fix()))
            .collect()
    }

    fn dual_chain(&self, v: usize) -> Vec<DualSegment> {
        let vertex = self.tri.vertex(self.handles[v]);
        let site = DVec2::new(vertex.position().x, vertex.position().y);

        let mut segs: Vec<DualSegment> = Vec::new();
        let mut start = None;
        let mut end = None;

        // Outgoing edges circulate counterclockwise; the dual of each edge
        // runs from the circumcenter on its right to the one on its left,
        // which strings the segments into a counterclockwise cell boundary.
        for edge in vertex.out_edges() {
            let neighbor = edge.to();
            let npos = DVec2::new(neighbor.position().x, neighbor.position().y);
            let flag = self.site_index(neighbor.fix()) as i32;

            let left = edge.face().as_inner().map(|f| {
                let c = f.circumcenter();
                DVec2::new(c.x, c.y)
            });
            let right = edge.rev().face().as_inner().map(|f| {
                let c = f.circumcenter();
                DVec2::new(c.x, c.y)
            });

            let Some(dir) = (npos - site).perp().try_normalize() else {
                continue;
            };

            let (source, target) = match (right, left) {
                (Some(r), Some(l)) => (r, l),
                (None, Some(l)) => {
                    start = Some(segs.len());
                    (l - dir * FAR_DISTANCE, l)
                }
                (Some(r), None) => {
                    end = Some(segs.len());
                    (r, r + dir * FAR_DISTANCE)
                }
                (None, None) => continue,
            };

            segs.push(DualSegment::new(source, target, flag));
        }

        let n = segs.len();
        for i in 0..n {
            if Some(i) != end {
                segs[i].next = Some((i + 1) % n);
            }
            if Some(i) != start {
                segs[i].prev = Some((i + n - 1) % n);
            }
        }

        segs
    }
}

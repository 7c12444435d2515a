//! Voronoi diagram construction by triangulation duality and boundary
//! clipping
//!
//! Every site's tentative cell starts as the dual chain of its triangulation
//! vertex. Each domain boundary edge is then clipped against the chains of
//! the cells it traverses: segments outside the edge's half-plane are cut
//! away and a border segment tagged with the edge id is threaded into the
//! chain. Because a crossed dual segment is shared with exactly one
//! neighboring site, clipping one cell reveals which neighbor the same
//! boundary edge continues into; that work propagates through a stack with a
//! per-(site, edge) visited set, which bounds the total work by
//! sites x boundary edges.

use std::collections::HashSet;

use glam::DVec2;

use crate::cell::PolygonCell;
use crate::domain::BoundaryDomain;
use crate::geometry::delaunay::{Triangulator, FAR_POINT_FLAG};
use crate::geometry::predicates::{on_segment, segment_intersection, side};
use crate::geometry::segment::{DualSegment, SegId, SegmentArena};

/// Per-site clipping state, reclaimed wholesale after the cell is finalized
#[derive(Debug, Default)]
struct CellWork {
    arena: SegmentArena,
    duals: Vec<SegId>,
    borders: Vec<Option<SegId>>,
    chain_built: bool,
}

impl CellWork {
    fn build_chain(&mut self, chain: Vec<DualSegment>) {
        self.chain_built = true;
        for seg in chain {
            // chain links already index positions in order
            let id = self.arena.alloc(seg);
            self.duals.push(id);
        }
    }

    fn has_borders(&self) -> bool {
        self.borders.iter().any(|b| b.is_some())
    }

    fn ensure_borders(&mut self, n: usize) {
        if self.borders.is_empty() {
            self.borders.resize(n, None);
        }
    }
}

/// What one boundary-edge clip asks the caller to continue with
#[derive(Debug, Default)]
struct ClipOutcome {
    /// Sites across the dual segments this edge crossed
    crossed_neighbors: Vec<usize>,
    /// The edge lies inside the cell without crossing it, so the
    /// face-adjacent boundary edges belong to this cell too
    contained: bool,
}

/// Builds one [`PolygonCell`] per site: the Voronoi region of the site
/// intersected with the boundary domain
#[derive(Debug, Default)]
pub struct VoronoiBuilder {
    domain: BoundaryDomain,
    cells: Vec<PolygonCell>,
}

impl VoronoiBuilder {
    pub fn new(domain: BoundaryDomain) -> Self {
        Self {
            domain,
            cells: Vec::new(),
        }
    }

    #[inline]
    pub fn domain(&self) -> &BoundaryDomain {
        &self.domain
    }

    #[inline]
    pub fn cells(&self) -> &[PolygonCell] {
        &self.cells
    }

    pub fn cell(&self, v: usize) -> Option<&PolygonCell> {
        self.cells.get(v)
    }

    /// Rebuild every cell from the current triangulation
    pub fn compute<T: Triangulator>(&mut self, dt: &T) {
        let vnb = dt.vertex_count();
        self.cells.clear();
        if vnb == 0 || self.domain.point_count() == 0 {
            return;
        }

        let mut works: Vec<CellWork> = Vec::with_capacity(vnb);
        works.resize_with(vnb, CellWork::default);

        let mut marks = vec![false; self.domain.point_count()];
        let mut visited: Vec<HashSet<usize>> = vec![HashSet::new(); vnb];
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for f in 0..self.domain.face_count() {
            for s in self.domain.face_begin(f)..self.domain.face_end(f) {
                if marks[s] {
                    continue;
                }

                let Some(seed) = dt.nearest_vertex(self.domain.point(s)) else {
                    continue;
                };
                push_work(seed, s, &mut visited, &mut marks, &mut stack);

                while let Some((v, edge)) = stack.pop() {
                    if !works[v].chain_built {
                        works[v].build_chain(dt.dual_chain(v));
                    }

                    let outcome = clip_edge(&self.domain, &mut works[v], edge);

                    for nv in outcome.crossed_neighbors {
                        if nv < vnb {
                            push_work(nv, edge, &mut visited, &mut marks, &mut stack);
                        }
                    }
                    if outcome.contained {
                        let ef = self.domain.face_of(edge);
                        let next = self.domain.next_around_face(ef, edge);
                        let prev = self.domain.prev_around_face(ef, edge);
                        push_work(v, next, &mut visited, &mut marks, &mut stack);
                        push_work(v, prev, &mut visited, &mut marks, &mut stack);
                    }
                }
            }
        }

        self.cells = (0..vnb)
            .map(|v| self.fill_cell(dt, &mut works[v], v))
            .collect();
    }

    /// Recompute the cell of a single site against a fresh dual chain
    ///
    /// Used for local incremental updates after a site insertion; the rest
    /// of the diagram is left untouched.
    pub fn compute_site<T: Triangulator>(&mut self, dt: &T, v: usize) {
        if v >= dt.vertex_count() || self.domain.point_count() == 0 {
            return;
        }

        let mut work = CellWork::default();
        work.build_chain(dt.dual_chain(v));

        for f in 0..self.domain.face_count() {
            for s in self.domain.face_begin(f)..self.domain.face_end(f) {
                let _ = clip_edge(&self.domain, &mut work, s);
            }
        }

        let cell = self.fill_cell(dt, &mut work, v);
        if self.cells.len() <= v {
            self.cells.resize_with(v + 1, PolygonCell::new);
        }
        self.cells[v] = cell;
    }

    /// Stitch a site's clipped segments into closed faces
    fn fill_cell<T: Triangulator>(&self, dt: &T, work: &mut CellWork, v: usize) -> PolygonCell {
        let mut cell = PolygonCell::new();

        if !work.chain_built {
            work.build_chain(dt.dual_chain(v));
        }

        if work.has_borders() {
            let mut consumed: HashSet<SegId> = HashSet::new();
            let walk_limit = work.arena.len() + self.domain.point_count();

            for f in 0..self.domain.face_count() {
                for i in self.domain.face_begin(f)..self.domain.face_end(f) {
                    let Some(start) = work.borders[i] else {
                        continue;
                    };
                    if consumed.contains(&start) {
                        continue;
                    }

                    let mut loop_points: Vec<(DVec2, i32)> = Vec::new();
                    let mut closed = false;
                    let mut cur = start;

                    for _ in 0..=walk_limit {
                        let seg = &work.arena[cur];
                        loop_points.push((seg.source, seg.flag));
                        consumed.insert(cur);

                        let next = match seg.next {
                            Some(n) => n,
                            None => {
                                // a border segment without an explicit link
                                // continues on the next boundary edge
                                if seg.flag >= 0 {
                                    break;
                                }
                                let edge = (-seg.flag - 1) as usize;
                                let ef = self.domain.face_of(edge);
                                let nexti = self.domain.next_around_face(ef, edge);
                                match work.borders.get(nexti).copied().flatten() {
                                    Some(b) => b,
                                    None => break,
                                }
                            }
                        };

                        if next == start {
                            closed = true;
                            break;
                        }
                        cur = next;
                    }

                    if closed && loop_points.len() >= 3 {
                        for (p, flag) in loop_points {
                            cell.add_point(p, flag);
                        }
                        cell.close_face();
                    }
                }
            }

            return cell;
        }

        if !work.duals.is_empty() {
            // no boundary crossing at all: the raw dual chain is the cell,
            // unless the site sits outside the domain entirely
            if !self.domain.contains(dt.position(v)) {
                return cell;
            }
            if work.duals.len() < 3 {
                return cell;
            }

            let mut open_target: Option<DVec2> = None;
            for &sid in &work.duals {
                let seg = &work.arena[sid];
                cell.add_point(seg.source, seg.flag);
                if seg.next.is_none() {
                    open_target = Some(seg.target);
                }
            }
            if let Some(far) = open_target {
                cell.add_point(far, FAR_POINT_FLAG);
            }
            cell.close_face();
        }

        cell
    }
}

fn push_work(
    v: usize,
    s: usize,
    visited: &mut [HashSet<usize>],
    marks: &mut [bool],
    stack: &mut Vec<(usize, usize)>,
) {
    if !visited[v].insert(s) {
        return;
    }
    marks[s] = true;
    stack.push((v, s));
}

/// Clip one boundary edge against one cell's segment chain
///
/// Every dual segment is classified against the edge's supporting line; a
/// crossing segment is split at the intersection and the border segment is
/// spliced into the chain in its place. The surviving border piece shrinks
/// toward `q1`/`q2` as crossings are found; at most two crossings exist
/// against a convex chain.
fn clip_edge(domain: &BoundaryDomain, work: &mut CellWork, bs: usize) -> ClipOutcome {
    let mut outcome = ClipOutcome::default();
    if work.duals.is_empty() {
        return outcome;
    }

    let face = domain.face_of(bs);
    let nexts = domain.next_around_face(face, bs);
    let mut q1 = domain.point(bs);
    let mut q2 = domain.point(nexts);
    let qvec = q2 - q1;

    let result = work
        .arena
        .alloc(DualSegment::new(q1, q2, -(bs as i32) - 1));

    let mut edge_outside_cell = false;
    let mut has_intersection = false;
    let mut crossing_count = 0;

    let snb = work.duals.len();
    for idx in 0..snb {
        if crossing_count == 2 {
            break;
        }

        let sid = work.duals[idx];
        let p1 = work.arena[sid].source;
        let p2 = work.arena[sid].target;
        let segvec = p2 - p1;

        let mut has = false;
        if segvec.perp_dot(qvec) >= 0.0 {
            if on_segment(q1, q2, p1) {
                continue;
            }
            if on_segment(q1, q2, p2) {
                work.arena[sid].next = Some(result);
                work.arena[result].prev = Some(sid);
                q1 = p2;
                has = true;
            } else if let Some(ip) = segment_intersection(p1, p2, q1, q2) {
                let old_next = work.arena[sid].next;

                let mut tail = work.arena[sid].clone();
                tail.source = ip;
                tail.prev = None;
                let tail_id = work.arena.alloc(tail);
                work.duals.push(tail_id);

                if let Some(nx) = old_next {
                    work.arena[nx].prev = Some(tail_id);
                }

                work.arena[sid].target = ip;
                work.arena[sid].next = Some(result);
                work.arena[result].prev = Some(sid);

                q1 = ip;
                has = true;
            }
        } else {
            if on_segment(q1, q2, p2) {
                continue;
            }
            if on_segment(q1, q2, p1) {
                work.arena[sid].prev = Some(result);
                work.arena[result].next = Some(sid);
                q2 = p1;
                has = true;
            } else if let Some(ip) = segment_intersection(p1, p2, q1, q2) {
                let old_prev = work.arena[sid].prev;

                let mut head = work.arena[sid].clone();
                head.target = ip;
                head.next = None;
                let head_id = work.arena.alloc(head);
                work.duals.push(head_id);

                if let Some(pv) = old_prev {
                    work.arena[pv].next = Some(head_id);
                }

                work.arena[sid].source = ip;
                work.arena[sid].prev = Some(result);
                work.arena[result].next = Some(sid);

                q2 = ip;
                has = true;
            }
        }

        if has {
            crossing_count += 1;
            has_intersection = true;

            let flag = work.arena[sid].flag;
            if flag > -1 {
                outcome.crossed_neighbors.push(flag as usize);
            }
        } else if !has_intersection && !edge_outside_cell && side(p1, p2, q1) < 0.0 {
            edge_outside_cell = true;
        }
    }

    // the surviving border piece degenerated to a point: unlink and drop it
    if (q1.x - q2.x).abs() < f64::EPSILON && (q1.y - q2.y).abs() < f64::EPSILON {
        let prev = work.arena[result].prev;
        let next = work.arena[result].next;
        if let Some(p) = prev {
            work.arena[p].next = next;
        }
        if let Some(n) = next {
            work.arena[n].prev = prev;
        }
        return outcome;
    }

    if has_intersection {
        work.ensure_borders(domain.point_count());
        work.arena[result].source = q1;
        work.arena[result].target = q2;
        work.borders[bs] = Some(result);
        return outcome;
    }

    if edge_outside_cell {
        return outcome;
    }

    // the whole edge lies inside the cell
    work.ensure_borders(domain.point_count());
    work.arena[result].source = q1;
    work.arena[result].target = q2;
    work.borders[bs] = Some(result);
    outcome.contained = true;
    outcome
}

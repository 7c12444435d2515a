//! Clipping domain
//!
//! The boundary domain is an ordered polygon (or several) that every Voronoi
//! cell is intersected with. Boundary corners double as boundary *edge*
//! indices: edge `i` runs from corner `i` to the next corner around its face.

use glam::DVec2;

use crate::cell::PolygonCell;
use crate::geometry::predicates::locate_point_in_polygon;

/// An ordered clip polygon with counterclockwise winding
#[derive(Debug, Clone, Default)]
pub struct BoundaryDomain {
    shape: PolygonCell,
}

impl BoundaryDomain {
    pub fn new() -> Self {
        Self {
            shape: PolygonCell::new(),
        }
    }

    /// The rectangle `[-1, 1] x [-ratio, ratio]`, counterclockwise
    ///
    /// This matches the domain an image of aspect ratio `height / width`
    /// occupies in normalized coordinates.
    pub fn rectangle(ratio: f64) -> Self {
        let mut domain = Self::new();
        domain.add_polygon(&[
            DVec2::new(-1.0, -ratio),
            DVec2::new(1.0, -ratio),
            DVec2::new(1.0, ratio),
            DVec2::new(-1.0, ratio),
        ]);
        domain
    }

    /// Append one closed polygon as a new face
    ///
    /// Corner indices continue across faces, so edge ids stay unique.
    pub fn add_polygon(&mut self, polygon: &[DVec2]) {
        let mut count = self.shape.point_count() as i32;
        for p in polygon {
            self.shape.add_point(*p, count);
            count += 1;
        }
        self.shape.close_face();
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.shape.face_count()
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.shape.point_count()
    }

    #[inline]
    pub fn face_begin(&self, f: usize) -> usize {
        self.shape.face_begin(f)
    }

    #[inline]
    pub fn face_end(&self, f: usize) -> usize {
        self.shape.face_end(f)
    }

    #[inline]
    pub fn point(&self, i: usize) -> DVec2 {
        self.shape.point(i)
    }

    #[inline]
    pub fn next_around_face(&self, f: usize, i: usize) -> usize {
        self.shape.next_around_face(f, i)
    }

    #[inline]
    pub fn prev_around_face(&self, f: usize, i: usize) -> usize {
        self.shape.prev_around_face(f, i)
    }

    /// The face a boundary corner/edge index belongs to
    pub fn face_of(&self, i: usize) -> usize {
        for f in 0..self.face_count() {
            if i < self.face_end(f) {
                return f;
            }
        }
        self.face_count().saturating_sub(1)
    }

    /// Total area enclosed by the domain faces
    pub fn area(&self) -> f64 {
        (0..self.face_count()).map(|f| self.shape.face_area(f)).sum()
    }

    /// True when `p` lies inside or on the boundary of any face
    pub fn contains(&self, p: DVec2) -> bool {
        (0..self.face_count())
            .any(|f| locate_point_in_polygon(p, self.shape.face_points(f)) >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangle() {
        let domain = BoundaryDomain::rectangle(0.5);
        assert_eq!(domain.face_count(), 1);
        assert_eq!(domain.point_count(), 4);
        assert!((domain.area() - 2.0).abs() < 1e-12);
        assert_eq!(domain.next_around_face(0, 3), 0);
        assert_eq!(domain.prev_around_face(0, 0), 3);
    }

    #[test]
    fn test_contains() {
        let domain = BoundaryDomain::rectangle(1.0);
        assert!(domain.contains(DVec2::new(0.0, 0.0)));
        assert!(domain.contains(DVec2::new(-1.0, -1.0)));
        assert!(!domain.contains(DVec2::new(1.5, 0.0)));
        assert!(!domain.contains(DVec2::new(0.0, -2.0)));
    }

    #[test]
    fn test_face_of_two_polygons() {
        let mut domain = BoundaryDomain::new();
        domain.add_polygon(&[
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
        ]);
        domain.add_polygon(&[
            DVec2::new(2.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 1.0),
            DVec2::new(2.0, 1.0),
        ]);

        assert_eq!(domain.face_of(0), 0);
        assert_eq!(domain.face_of(2), 0);
        assert_eq!(domain.face_of(3), 1);
        assert_eq!(domain.face_of(6), 1);
        assert!((domain.area() - 1.5).abs() < 1e-12);
    }
}

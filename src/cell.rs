//! Polygon cell storage
//!
//! A cell is one or more closed loops ("faces") stored in flat arrays:
//! face offsets, points and a per-point flag. For a point at index `i` the
//! flag describes the cell edge starting at that point: a value >= 0 is the
//! index of the neighboring site across the edge, a negative value
//! `-(edge)-1` marks an edge lying on clip boundary edge `edge`.

use glam::DVec2;

/// A flat, multi-face polygon container with per-point neighbor flags
///
/// Face boundaries partition the point array contiguously; a well-formed
/// face has at least 3 points. `next_around_face`/`prev_around_face` wrap
/// within a single face only.
#[derive(Debug, Clone)]
pub struct PolygonCell {
    faces: Vec<usize>,
    points: Vec<DVec2>,
    flags: Vec<i32>,
}

impl Default for PolygonCell {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonCell {
    pub fn new() -> Self {
        Self {
            faces: vec![0],
            points: Vec::new(),
            flags: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.faces.clear();
        self.faces.push(0);
        self.points.clear();
        self.flags.clear();
    }

    /// Number of closed faces
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len() - 1
    }

    /// Total number of points across all faces
    #[inline]
    pub fn point_count(&self) -> usize {
        self.flags.len()
    }

    /// Append a point (and its edge flag) to the face under construction
    pub fn add_point(&mut self, p: DVec2, flag: i32) {
        self.points.push(p);
        self.flags.push(flag);
    }

    /// Close the face under construction
    ///
    /// Points added afterwards start a new face.
    pub fn close_face(&mut self) {
        self.faces.push(self.point_count());
    }

    /// Index of the first point of face `f`
    #[inline]
    pub fn face_begin(&self, f: usize) -> usize {
        self.faces[f]
    }

    /// One past the index of the last point of face `f`
    #[inline]
    pub fn face_end(&self, f: usize) -> usize {
        self.faces[f + 1]
    }

    #[inline]
    pub fn face_size(&self, f: usize) -> usize {
        self.face_end(f) - self.face_begin(f)
    }

    #[inline]
    pub fn point(&self, i: usize) -> DVec2 {
        self.points[i]
    }

    #[inline]
    pub fn point_flag(&self, i: usize) -> i32 {
        self.flags[i]
    }

    pub fn set_point_flag(&mut self, i: usize, flag: i32) {
        self.flags[i] = flag;
    }

    /// Successor of point `i` within face `f`, wrapping at the face end
    #[inline]
    pub fn next_around_face(&self, f: usize, i: usize) -> usize {
        if i + 1 == self.face_end(f) {
            self.face_begin(f)
        } else {
            i + 1
        }
    }

    /// Predecessor of point `i` within face `f`, wrapping at the face start
    #[inline]
    pub fn prev_around_face(&self, f: usize, i: usize) -> usize {
        if i == self.face_begin(f) {
            self.face_end(f) - 1
        } else {
            i - 1
        }
    }

    /// The points of face `f` as a contiguous slice
    pub fn face_points(&self, f: usize) -> &[DVec2] {
        &self.points[self.face_begin(f)..self.face_end(f)]
    }

    /// Arithmetic mean of the points of face `f`
    pub fn face_center(&self, f: usize) -> DVec2 {
        let pts = self.face_points(f);
        let sum: DVec2 = pts.iter().copied().sum();
        sum / pts.len() as f64
    }

    /// Signed area of face `f` (positive for counterclockwise loops)
    ///
    /// Computed as a triangle fan from the first point.
    pub fn face_area(&self, f: usize) -> f64 {
        let pts = self.face_points(f);
        if pts.len() < 3 {
            return 0.0;
        }

        let p0 = pts[0];
        let mut a = pts[1] - p0;
        let mut area = 0.0;
        for p in &pts[2..] {
            let b = *p - p0;
            area += 0.5 * a.perp_dot(b);
            a = b;
        }

        area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_cell() -> PolygonCell {
        let mut cell = PolygonCell::new();
        cell.add_point(DVec2::new(0.0, 0.0), 1);
        cell.add_point(DVec2::new(1.0, 0.0), 2);
        cell.add_point(DVec2::new(1.0, 1.0), -1);
        cell.add_point(DVec2::new(0.0, 1.0), -2);
        cell.close_face();
        cell
    }

    #[test]
    fn test_single_face() {
        let cell = square_cell();
        assert_eq!(cell.face_count(), 1);
        assert_eq!(cell.point_count(), 4);
        assert_eq!(cell.face_begin(0), 0);
        assert_eq!(cell.face_end(0), 4);
        assert_eq!(cell.face_size(0), 4);
        assert_eq!(cell.point_flag(1), 2);
    }

    #[test]
    fn test_wrap_around_face() {
        let cell = square_cell();
        assert_eq!(cell.next_around_face(0, 3), 0);
        assert_eq!(cell.next_around_face(0, 1), 2);
        assert_eq!(cell.prev_around_face(0, 0), 3);
        assert_eq!(cell.prev_around_face(0, 2), 1);
    }

    #[test]
    fn test_area_and_center() {
        let cell = square_cell();
        assert!((cell.face_area(0) - 1.0).abs() < 1e-12);
        assert!(cell.face_center(0).distance(DVec2::new(0.5, 0.5)) < 1e-12);
    }

    #[test]
    fn test_two_faces() {
        let mut cell = square_cell();
        cell.add_point(DVec2::new(2.0, 0.0), 0);
        cell.add_point(DVec2::new(3.0, 0.0), 0);
        cell.add_point(DVec2::new(3.0, 2.0), 0);
        cell.close_face();

        assert_eq!(cell.face_count(), 2);
        assert_eq!(cell.face_begin(1), 4);
        assert_eq!(cell.face_size(1), 3);
        assert!((cell.face_area(1) - 1.0).abs() < 1e-12);
        // wrapping stays inside the second face
        assert_eq!(cell.next_around_face(1, 6), 4);
        assert_eq!(cell.prev_around_face(1, 4), 6);
    }

    #[test]
    fn test_clear() {
        let mut cell = square_cell();
        cell.clear();
        assert_eq!(cell.face_count(), 0);
        assert_eq!(cell.point_count(), 0);
    }
}

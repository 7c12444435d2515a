//! 2D geometric predicates used by the clipping algorithm

use glam::DVec2;

/// Tolerance for near-degenerate side tests during segment intersection.
pub const INTERSECTION_EPS: f64 = 2e-10;

/// Unsigned area of the triangle `a b c`.
pub fn triangle_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (0.5 * (b - a).perp_dot(c - a)).abs()
}

/// Which side of the directed line `a -> b` the point `p` lies on.
///
/// Positive on the left, negative on the right, zero on the line.
pub fn side(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (a - p).perp_dot(b - p)
}

/// True when `q` lies strictly inside the segment `p1 p2`.
///
/// Points coinciding with either endpoint are not on the segment.
pub fn on_segment(p1: DVec2, p2: DVec2, q: DVec2) -> bool {
    let d1 = q - p1;
    let d2 = q - p2;
    if d1.perp_dot(d2).abs() > INTERSECTION_EPS {
        return false;
    }
    d1.dot(d2) < 0.0
}

/// Intersection point of segments `p1 p2` and `q1 q2`, if any.
///
/// Side tests within [`INTERSECTION_EPS`] are snapped to zero so that shared
/// endpoints neither miss nor duplicate the intersection. The returned point
/// is the area-weighted point on `q1 q2`.
pub fn segment_intersection(p1: DVec2, p2: DVec2, q1: DVec2, q2: DVec2) -> Option<DVec2> {
    if p1.x.min(p2.x) > q1.x.max(q2.x)
        || q1.x.min(q2.x) > p1.x.max(p2.x)
        || p1.y.min(p2.y) > q1.y.max(q2.y)
        || q1.y.min(q2.y) > p1.y.max(p2.y)
    {
        return None;
    }

    // q1 and q2 on the same side of p1p2
    let p1p2 = p2 - p1;
    let mut cross1 = (q1 - p1).perp_dot(p1p2);
    let mut cross2 = (q2 - p1).perp_dot(p1p2);
    if cross1.abs() < INTERSECTION_EPS {
        cross1 = 0.0;
    }
    if cross2.abs() < INTERSECTION_EPS {
        cross2 = 0.0;
    }
    if cross1 * cross2 > 0.0 {
        return None;
    }

    // p1 and p2 on the same side of q1q2
    let q1q2 = q2 - q1;
    let mut cross1 = (p1 - q1).perp_dot(q1q2);
    let mut cross2 = (p2 - q1).perp_dot(q1q2);
    if cross1.abs() < INTERSECTION_EPS {
        cross1 = 0.0;
    }
    if cross2.abs() < INTERSECTION_EPS {
        cross2 = 0.0;
    }
    if cross1 * cross2 > 0.0 {
        return None;
    }

    let s1 = triangle_area(p1, q1, p2);
    let s2 = triangle_area(p1, p2, q2);
    let sum = s1 + s2;
    if sum == 0.0 {
        return None;
    }

    Some((q2 * s1 + q1 * s2) / sum)
}

fn quadrant(p: DVec2) -> i32 {
    if p.x >= 0.0 {
        if p.y >= 0.0 {
            0
        } else {
            3
        }
    } else if p.y >= 0.0 {
        1
    } else {
        2
    }
}

/// Locate a point relative to a closed polygon using the quadrant
/// (arc-length counting) method.
///
/// Returns -1 outside, 0 on the boundary, 1 inside. Polygons with fewer than
/// 3 corners are unbounded and everything is outside.
pub fn locate_point_in_polygon(p: DVec2, polygon: &[DVec2]) -> i32 {
    let nb = polygon.len();
    if nb < 3 {
        return -1;
    }

    let mut prev = polygon[nb - 1] - p;
    if prev == DVec2::ZERO {
        return 0;
    }
    let mut prev_quad = quadrant(prev);

    let mut sum = 0;
    for corner in polygon {
        let d = *corner - p;
        if d == DVec2::ZERO {
            return 0;
        }

        let cross = prev.perp_dot(d);
        if cross == 0.0 && prev.x * d.x <= 0.0 && prev.y * d.y <= 0.0 {
            return 0;
        }

        let quad = quadrant(d);
        if quad == (prev_quad + 1) % 4 {
            sum += 1;
        } else if quad == (prev_quad + 3) % 4 {
            sum -= 1;
        } else if quad == (prev_quad + 2) % 4 {
            if cross > 0.0 {
                sum += 2;
            } else {
                sum -= 2;
            }
        }

        prev = d;
        prev_quad = quad;
    }

    if sum != 0 {
        1
    } else {
        -1
    }
}

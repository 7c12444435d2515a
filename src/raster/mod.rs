//! Scanline rasterization of cell polygons
//!
//! A polygon in domain coordinates (`[-1,1] x [-ratio,ratio]`, y up) is
//! converted into per-row pixel column spans. The same domain-to-raster
//! mapping is shared by every consumer so pixel ownership, color fitting and
//! gradient sampling all agree on where a pixel sits.

use glam::DVec2;

/// Per-cell scanline pixel membership
///
/// Rows `ymin..=ymax` carry inclusive column bounds `left[row - ymin]` and
/// `right[row - ymin]`. Rows outside the range are not touched by the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSet {
    pub ymin: i32,
    pub ymax: i32,
    pub left: Vec<i32>,
    pub right: Vec<i32>,
}

impl PixelSet {
    pub fn new() -> Self {
        Self {
            ymin: i32::MAX,
            ymax: -1,
            left: Vec::new(),
            right: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.ymin = i32::MAX;
        self.ymax = -1;
        self.left.clear();
        self.right.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ymax < self.ymin
    }

    /// Iterate the rows as `(row, left, right)` with inclusive bounds
    pub fn rows(&self) -> impl Iterator<Item = (i32, i32, i32)> + '_ {
        let ymin = self.ymin;
        self.left
            .iter()
            .zip(self.right.iter())
            .enumerate()
            .map(move |(k, (&l, &r))| (ymin + k as i32, l, r))
    }

    /// Number of pixels covered
    pub fn pixel_count(&self) -> usize {
        self.rows()
            .map(|(_, l, r)| (r - l + 1).max(0) as usize)
            .sum()
    }
}

impl Default for PixelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel width in domain units for a raster of `width` columns
#[inline]
pub fn pixel_width(width: usize) -> f64 {
    2.0 / width as f64
}

/// Map a domain point to the pixel containing it, clamped to the raster
pub fn locate_point(width: usize, height: usize, p: DVec2) -> (i32, i32) {
    let ratio = height as f64 / width as f64;

    let x = (0.5 * (p.x + 1.0)).clamp(0.0, 1.0);
    let y = (0.5 * (p.y + ratio) / ratio).clamp(0.0, 1.0);

    let mut i = (x * width as f64).floor() as i32;
    let mut j = (y * height as f64).floor() as i32;

    if i == width as i32 {
        i -= 1;
    }
    if j == height as i32 {
        j -= 1;
    }

    (i, j)
}

/// Domain coordinates of the center of pixel `(i, j)`
pub fn pixel_center(width: usize, height: usize, i: i32, j: i32) -> DVec2 {
    let ratio = height as f64 / width as f64;
    let pix = pixel_width(width);
    DVec2::new(
        pix * (i as f64 + 0.5) - 1.0,
        pix * (j as f64 + 0.5) - ratio,
    )
}

/// Scan-convert a polygon into per-row column spans
///
/// The polygon winding is taken from the signed area of its first triangle;
/// each non-horizontal edge then contributes to either the left or the right
/// bound of the rows it crosses. Polygons with fewer than 3 vertices yield
/// an empty set.
pub fn rasterize(polygon: &[DVec2], width: usize, height: usize) -> PixelSet {
    let mut pixels = PixelSet::new();

    if polygon.len() < 3 || width == 0 || height == 0 {
        return pixels;
    }

    let signed = (polygon[1] - polygon[0]).perp_dot(polygon[2] - polygon[0]);
    let ccw = signed < 0.0;

    let mut xs = Vec::with_capacity(polygon.len());
    let mut ys = Vec::with_capacity(polygon.len());
    pixels.ymin = height as i32;
    pixels.ymax = -1;
    for p in polygon {
        let (i, j) = locate_point(width, height, *p);
        xs.push(i);
        ys.push(j);
        pixels.ymin = pixels.ymin.min(j);
        pixels.ymax = pixels.ymax.max(j);
    }

    let mut x_left = vec![0i32; height];
    let mut x_right = vec![0i32; height];
    for j in pixels.ymin..=pixels.ymax {
        x_left[j as usize] = width as i32 - 1;
        x_right[j as usize] = 0;
    }

    scan_edges(ccw, &xs, &ys, &mut x_left, &mut x_right);

    for j in pixels.ymin..=pixels.ymax {
        pixels.left.push(x_left[j as usize]);
        pixels.right.push(x_right[j as usize]);
    }

    pixels
}

/// Walk each polygon edge with integer steps, updating exactly one bound per
/// row crossed.
fn scan_edges(ccw: bool, xs: &[i32], ys: &[i32], x_left: &mut [i32], x_right: &mut [i32]) {
    let n = xs.len();

    for a in 0..n {
        let b = (a + 1) % n;
        let x1 = xs[a];
        let y1 = ys[a];
        let x2 = xs[b];
        let y2 = ys[b];

        if y1 == y2 {
            // horizontal edges widen both bounds directly
            let (lo, hi) = if x2 > x1 { (x1, x2) } else { (x2, x1) };
            x_left[y1 as usize] = x_left[y1 as usize].min(lo);
            x_right[y1 as usize] = x_right[y1 as usize].max(hi);
            continue;
        }

        let is_left = (y2 < y1) ^ ccw;

        let mut dx = x2 - x1;
        let mut dy = y2 - y1;
        let sx = if dx > 0 { 1 } else { -1 };
        let sy = if dy > 0 { 1 } else { -1 };
        dx *= sx;
        dy *= sy;
        let mut x = x1;
        let mut y = y1;

        let line: &mut [i32] = if is_left { &mut *x_left } else { &mut *x_right };
        if (is_left && sx > 0) || (!is_left && sx < 0) {
            line[y as usize] = x;
        }

        let mut e = dy - dx;
        while (sy > 0 && y < y2) || (sy < 0 && y > y2) {
            while e < 0 || (e == 0 && ((is_left && sx > 0) || (!is_left && sx < 0))) {
                x += sx;
                e += 2 * dy;
            }
            if (!is_left && sx > 0) || (is_left && sx < 0) {
                line[y as usize] = x;
            }
            y += sy;
            e -= 2 * dx;
            if (is_left && sx > 0) || (!is_left && sx < 0) {
                line[y as usize] = x;
            }
        }
        if (!is_left && sx > 0) || (is_left && sx < 0) {
            line[y2 as usize] = x2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain_rect(ratio: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(-1.0, -ratio),
            DVec2::new(1.0, -ratio),
            DVec2::new(1.0, ratio),
            DVec2::new(-1.0, ratio),
        ]
    }

    #[test]
    fn test_locate_point_clamps() {
        assert_eq!(locate_point(8, 4, DVec2::new(-1.0, -0.5)), (0, 0));
        assert_eq!(locate_point(8, 4, DVec2::new(1.0, 0.5)), (7, 3));
        assert_eq!(locate_point(8, 4, DVec2::new(-5.0, 9.0)), (0, 3));
        assert_eq!(locate_point(8, 4, DVec2::new(0.0, 0.0)), (4, 2));
    }

    #[test]
    fn test_pixel_center_round_trip() {
        for i in 0..8 {
            for j in 0..4 {
                let c = pixel_center(8, 4, i, j);
                assert_eq!(locate_point(8, 4, c), (i, j));
            }
        }
    }

    #[test]
    fn test_full_domain_covers_everything() {
        let pixels = rasterize(&domain_rect(0.5), 16, 8);
        assert_eq!(pixels.ymin, 0);
        assert_eq!(pixels.ymax, 7);
        for (_, l, r) in pixels.rows() {
            assert_eq!(l, 0);
            assert_eq!(r, 15);
        }
        assert_eq!(pixels.pixel_count(), 16 * 8);
    }

    #[test]
    fn test_bounds_ordered() {
        let triangle = vec![
            DVec2::new(-0.8, -0.4),
            DVec2::new(0.9, -0.1),
            DVec2::new(-0.2, 0.45),
        ];
        let pixels = rasterize(&triangle, 32, 16);
        assert!(!pixels.is_empty());
        for (_, l, r) in pixels.rows() {
            assert!(l <= r, "left bound {} exceeds right bound {}", l, r);
        }
    }

    #[test]
    fn test_winding_independence() {
        let ratio = 1.0;
        let mut reversed = domain_rect(ratio);
        reversed.reverse();

        let a = rasterize(&domain_rect(ratio), 8, 8);
        let b = rasterize(&reversed, 8, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_polygon() {
        let pixels = rasterize(&[DVec2::ZERO, DVec2::new(1.0, 0.0)], 8, 8);
        assert!(pixels.is_empty());
        assert_eq!(pixels.pixel_count(), 0);
    }

    #[test]
    fn test_quadrants_tile_the_raster() {
        // four axis-aligned quadrant cells of the square domain
        let quads = [
            [DVec2::new(-1.0, -1.0), DVec2::new(0.0, -1.0), DVec2::new(0.0, 0.0), DVec2::new(-1.0, 0.0)],
            [DVec2::new(0.0, -1.0), DVec2::new(1.0, -1.0), DVec2::new(1.0, 0.0), DVec2::new(0.0, 0.0)],
            [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(0.0, 1.0)],
            [DVec2::new(-1.0, 0.0), DVec2::new(0.0, 0.0), DVec2::new(0.0, 1.0), DVec2::new(-1.0, 1.0)],
        ];

        let (w, h) = (16, 16);
        let mut covered = vec![0u32; w * h];
        for quad in &quads {
            let pixels = rasterize(quad, w, h);
            for (j, l, r) in pixels.rows() {
                for i in l..=r {
                    covered[j as usize * w + i as usize] += 1;
                }
            }
        }

        // every pixel owned at least once; doubled coverage only along the
        // shared center lines
        for (id, &c) in covered.iter().enumerate() {
            assert!(c >= 1, "pixel {} not covered", id);
        }
    }
}

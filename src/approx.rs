//! The approximation driver
//!
//! [`VoroApprox`] owns the full pipeline state: the input image, the site
//! set, the triangulation, the clipped diagram, per-cell pixel sets,
//! polynomial fits and the energy table. Sites are initialized randomly or
//! greedily, then relocated by gradient descent on the reconstruction
//! energy; all derived structures are rebuilt wholesale on each pass.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::cell::PolygonCell;
use crate::config::ApproxConfig;
use crate::domain::BoundaryDomain;
use crate::error::{ApproxError, Result};
use crate::fit::Polynomial;
use crate::geometry::delaunay::{SiteTriangulation, Triangulator};
use crate::geometry::voronoi::VoronoiBuilder;
use crate::image::Image;
use crate::raster::{locate_point, pixel_center, pixel_width, rasterize, PixelSet};

/// Annealing base for the optimization step size
const SIGMA: f64 = 0.5;

/// Number of random seed sites greedy initialization starts from
const GREEDY_SEED_SITES: usize = 3;

/// Worst-cell priority entry; stale entries are skipped on pop by comparing
/// against the live energy table
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    energy: f64,
    site: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.energy
            .partial_cmp(&other.energy)
            .unwrap_or(Ordering::Equal)
            .then(self.site.cmp(&other.site))
    }
}

/// Voronoi-based polynomial approximation of a raster image
pub struct VoroApprox {
    config: ApproxConfig,
    rng: ChaCha8Rng,
    degree: usize,

    image: Option<Image>,
    sites: Vec<DVec2>,
    triangulation: Option<SiteTriangulation>,
    builder: Option<VoronoiBuilder>,

    pixels: Vec<PixelSet>,
    polynomials: Vec<Polynomial>,
    energies: Vec<f64>,
}

impl VoroApprox {
    pub fn new(config: ApproxConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            degree: config.degree,
            config,
            image: None,
            sites: Vec::new(),
            triangulation: None,
            builder: None,
            pixels: Vec::new(),
            polynomials: Vec::new(),
            energies: Vec::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &ApproxConfig {
        &self.config
    }

    /// Set the image to approximate
    ///
    /// Drops the previous diagram and derived state; sites are kept and can
    /// be re-applied with [`set_sites`](Self::set_sites).
    pub fn set_image(&mut self, image: Image) {
        self.image = Some(image);
        self.builder = None;
        self.triangulation = None;
        self.pixels.clear();
        self.polynomials.clear();
        self.energies.clear();
    }

    #[inline]
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    /// Finalized cells of the current diagram
    pub fn cells(&self) -> &[PolygonCell] {
        self.builder.as_ref().map(|b| b.cells()).unwrap_or(&[])
    }

    #[inline]
    pub fn pixel_sets(&self) -> &[PixelSet] {
        &self.pixels
    }

    #[inline]
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    pub fn total_energy(&self) -> f64 {
        self.energies.iter().sum()
    }

    /// Scatter `n` sites uniformly over the domain and build the diagram
    ///
    /// Does nothing until an image is set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for fewer than 3 sites.
    pub fn random_init(&mut self, n: usize) -> Result<()> {
        if n < 3 {
            return Err(ApproxError::InvalidConfig(format!(
                "at least 3 sites are required (got {})",
                n
            )));
        }
        let Some(image) = &self.image else {
            return Ok(());
        };

        let ratio = image.ratio();
        self.sites = (0..n)
            .map(|_| {
                DVec2::new(
                    self.rng.gen_range(-1.0..1.0),
                    self.rng.gen_range(-1.0..1.0) * ratio,
                )
            })
            .collect();

        self.compute_voronoi()
    }

    /// Seed `n` sites by repeatedly splitting the worst-approximated cell
    ///
    /// Starts from 3 random sites. Each round pops the cell with the highest
    /// energy, inserts a new site at the cell corner farthest from its own
    /// site and locally recomputes only the cells incident to the insertion.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for fewer than 3 sites.
    pub fn greedy_init(&mut self, n: usize) -> Result<()> {
        if n < 3 {
            return Err(ApproxError::InvalidConfig(format!(
                "at least 3 sites are required (got {})",
                n
            )));
        }

        self.random_init(GREEDY_SEED_SITES.min(n))?;
        if self.image.is_none() || self.builder.is_none() || self.triangulation.is_none() {
            return Ok(());
        }

        let start = Instant::now();
        eprintln!("[Greedy] seeding {} sites from {}", n, self.sites.len());

        self.assign_pixels();
        self.compute_polynomials();
        self.compute_energies();

        let mut heap: BinaryHeap<HeapEntry> = self
            .energies
            .iter()
            .enumerate()
            .map(|(site, &energy)| HeapEntry { energy, site })
            .collect();

        while self.sites.len() < n {
            let Some(entry) = heap.pop() else {
                break;
            };
            let v = entry.site;
            if v >= self.energies.len() || entry.energy != self.energies[v] {
                continue; // stale entry
            }

            // split at the cell corner farthest from the owning site
            let new_site = {
                let Some(builder) = &self.builder else { break };
                let Some(cell) = builder.cell(v) else { continue };
                if cell.face_count() == 0 {
                    continue;
                }
                let site = self.sites[v];
                let mut best = None;
                let mut best_dist = 0.0;
                for i in cell.face_begin(0)..cell.face_end(0) {
                    let dist = cell.point(i).distance_squared(site);
                    if dist > best_dist {
                        best_dist = dist;
                        best = Some(cell.point(i));
                    }
                }
                match best {
                    Some(p) => p,
                    None => continue,
                }
            };

            let Some(dt) = self.triangulation.as_mut() else {
                break;
            };
            let Some(new_id) = dt.insert_site(new_site)? else {
                continue; // landed on an existing site
            };
            self.sites.push(new_site);

            let (Some(dt), Some(builder), Some(image)) = (
                self.triangulation.as_ref(),
                self.builder.as_mut(),
                self.image.as_ref(),
            ) else {
                break;
            };

            let mut update = dt.neighbor_sites(new_id);
            for &u in &update {
                builder.compute_site(dt, u);
            }
            update.push(new_id);
            builder.compute_site(dt, new_id);

            self.pixels.push(PixelSet::new());
            self.polynomials.push(Polynomial::default());
            self.energies.push(0.0);

            for &u in &update {
                let cell = &builder.cells()[u];
                self.pixels[u] = if cell.face_count() == 0 {
                    PixelSet::new()
                } else {
                    rasterize(cell.face_points(0), image.width(), image.height())
                };
                self.polynomials[u] = Polynomial::fit(image, &self.pixels[u], self.degree);
                self.energies[u] =
                    self.polynomials[u].energy(image, &self.pixels[u], self.config.lp);
                heap.push(HeapEntry {
                    energy: self.energies[u],
                    site: u,
                });
            }
        }

        eprintln!(
            "[Greedy] done: {} sites, {:?}",
            self.sites.len(),
            start.elapsed()
        );
        Ok(())
    }

    /// Replace the site set and rebuild the diagram
    pub fn set_sites(&mut self, sites: &[DVec2]) -> Result<()> {
        self.sites = sites.to_vec();
        self.compute_voronoi()
    }

    /// Triangulate the current sites and clip the diagram to the domain
    pub fn compute_voronoi(&mut self) -> Result<()> {
        let Some(image) = &self.image else {
            return Ok(());
        };
        if self.sites.is_empty() {
            return Ok(());
        }

        let mut dt = SiteTriangulation::new();
        dt.set_vertices(&self.sites)?;

        let ratio = image.ratio();
        let builder = self
            .builder
            .get_or_insert_with(|| VoronoiBuilder::new(BoundaryDomain::rectangle(ratio)));
        builder.compute(&dt);
        self.triangulation = Some(dt);

        Ok(())
    }

    /// Rasterize every cell into its pixel set at image resolution
    pub fn assign_pixels(&mut self) {
        let (Some(image), Some(builder)) = (&self.image, &self.builder) else {
            return;
        };

        self.pixels = builder
            .cells()
            .iter()
            .map(|cell| {
                if cell.face_count() == 0 {
                    PixelSet::new()
                } else {
                    rasterize(cell.face_points(0), image.width(), image.height())
                }
            })
            .collect();
    }

    /// Fit one polynomial per cell at the current working degree
    pub fn compute_polynomials(&mut self) {
        let Some(image) = &self.image else {
            return;
        };
        if self.pixels.is_empty() {
            return;
        }

        self.polynomials = self
            .pixels
            .iter()
            .map(|px| Polynomial::fit(image, px, self.degree))
            .collect();
    }

    /// Refresh the per-cell energy table; returns the total
    pub fn compute_energies(&mut self) -> f64 {
        let Some(image) = &self.image else {
            return 0.0;
        };
        if self.pixels.is_empty() || self.polynomials.is_empty() {
            return 0.0;
        }

        self.energies = self
            .pixels
            .iter()
            .zip(self.polynomials.iter())
            .map(|(px, poly)| poly.energy(image, px, self.config.lp))
            .collect();

        self.energies.iter().sum()
    }

    /// Gradient of the total energy with respect to every site position
    ///
    /// Each edge shared with a neighboring cell is sampled along its length;
    /// the energy difference between the two cells' fits at a sample drives
    /// the owning site toward or away from that stretch of boundary.
    pub fn compute_gradients(&self) -> Vec<DVec2> {
        let (Some(image), Some(builder)) = (&self.image, &self.builder) else {
            return Vec::new();
        };

        let n = builder.cells().len();
        if self.polynomials.len() != n || self.sites.len() < n {
            return Vec::new();
        }

        let mut gradients = vec![DVec2::ZERO; n];
        for v in 0..n {
            let cell = &builder.cells()[v];
            if cell.face_count() == 0 {
                continue;
            }

            for i in cell.face_begin(0)..cell.face_end(0) {
                let flag = cell.point_flag(i);
                if flag < 0 {
                    continue;
                }
                let nv = flag as usize;
                if nv >= n {
                    continue;
                }

                let next = cell.next_around_face(0, i);
                gradients[v] += edge_gradient(
                    image,
                    self.sites[v],
                    &self.polynomials[v],
                    self.sites[nv],
                    &self.polynomials[nv],
                    cell.point(i),
                    cell.point(next),
                );
            }
        }

        gradients
    }

    /// Relocate sites by annealed gradient descent on the reconstruction
    /// energy, using the configured step scale
    pub fn optimize(&mut self, degree: usize, iterations: usize) {
        self.optimize_with_scale(degree, iterations, self.config.step_scale);
    }

    /// Relocate sites by annealed gradient descent on the reconstruction
    /// energy
    ///
    /// Per iteration: compute gradients, move every site by
    /// `sqrt(cell_area) * step_scale * SIGMA^(it/(iterations-it))` against
    /// its normalized gradient, clamp to the domain and rebuild the full
    /// diagram, pixel assignment and fits.
    pub fn optimize_with_scale(&mut self, degree: usize, iterations: usize, step_scale: f64) {
        if self.image.is_none() || self.builder.is_none() || iterations == 0 {
            return;
        }
        self.degree = degree.min(2);

        let ratio = self.image.as_ref().map(|im| im.ratio()).unwrap_or(1.0);
        let steps: Vec<f64> = self
            .builder
            .as_ref()
            .map(|b| {
                b.cells()
                    .iter()
                    .map(|cell| {
                        if cell.face_count() == 0 {
                            0.0
                        } else {
                            cell.face_area(0).max(0.0).sqrt() * step_scale
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        self.assign_pixels();
        self.compute_polynomials();
        let mut total = self.compute_energies();

        let run_start = Instant::now();
        eprintln!(
            "[Optimize] start: {} sites, degree {}, energy {:.6}",
            self.sites.len(),
            self.degree,
            total
        );

        for it in 0..iterations {
            let iter_start = Instant::now();

            let gradients = self.compute_gradients();
            let shrink = SIGMA.powf(it as f64 / (iterations - it) as f64);

            for v in 0..self.sites.len() {
                let Some(&g) = gradients.get(v) else {
                    break;
                };
                let norm = g.length();
                if norm == 0.0 {
                    continue;
                }
                let Some(&step) = steps.get(v) else {
                    break;
                };

                let moved = self.sites[v] - g / norm * (step * shrink);
                self.sites[v] =
                    DVec2::new(moved.x.clamp(-1.0, 1.0), moved.y.clamp(-ratio, ratio));
            }

            if let Err(e) = self.compute_voronoi() {
                eprintln!("[Optimize] aborted at iteration {}: {}", it + 1, e);
                break;
            }
            self.assign_pixels();
            self.compute_polynomials();
            total = self.compute_energies();

            eprintln!(
                "[Optimize] it {}: energy {:.6}, {:?}",
                it + 1,
                total,
                iter_start.elapsed()
            );
        }

        eprintln!(
            "[Optimize] finished: energy {:.6}, {:?}",
            total,
            run_start.elapsed()
        );
    }

    /// Render the approximation at the requested resolution
    ///
    /// Every cell is rasterized at the output resolution and its polynomial
    /// evaluated over the owned pixels; overlapping contributions along
    /// shared boundaries are averaged and the result clamped to the byte
    /// range. Returns `None` until an image and a diagram exist, or when
    /// more channels are requested than the image carries.
    pub fn approximate(
        &mut self,
        degree: usize,
        width: usize,
        height: usize,
        channels: usize,
    ) -> Option<Vec<u8>> {
        let image_channels = self.image.as_ref()?.channels();
        if self.builder.is_none()
            || width == 0
            || height == 0
            || channels == 0
            || channels > image_channels
        {
            return None;
        }

        self.degree = degree.min(2);
        self.assign_pixels();
        self.compute_polynomials();

        let builder = self.builder.as_ref()?;

        let mut sums = vec![0.0f64; width * height * channels];
        let mut counts = vec![0u32; width * height];

        for (v, cell) in builder.cells().iter().enumerate() {
            if cell.face_count() == 0 {
                continue;
            }
            let poly = self.polynomials.get(v)?;

            let px = rasterize(cell.face_points(0), width, height);
            for (j, l, r) in px.rows() {
                for i in l..=r {
                    let p = pixel_center(width, height, i, j);
                    let id = j as usize * width + i as usize;
                    for c in 0..channels {
                        sums[id * channels + c] += poly.evaluate(c, p.x, p.y);
                    }
                    counts[id] += 1;
                }
            }
        }

        let mut output = vec![0u8; width * height * channels];
        for id in 0..width * height {
            if counts[id] == 0 {
                continue;
            }
            for c in 0..channels {
                let avg = (sums[id * channels + c] / counts[id] as f64).clamp(0.0, 255.0);
                output[id * channels + c] = avg as u8;
            }
        }

        Some(output)
    }

    /// Site positions as a flat float array for a render layer
    pub fn sites_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.sites.len() * 2);
        for p in &self.sites {
            data.push(p.x as f32);
            data.push(p.y as f32);
        }
        data
    }

    /// Cell corner positions and edge index pairs for a render layer
    pub fn voronoi_data(&self) -> (Vec<f32>, Vec<u32>) {
        let mut corners = Vec::new();
        let mut edges = Vec::new();

        let Some(builder) = &self.builder else {
            return (corners, edges);
        };

        let mut offset = 0u32;
        for cell in builder.cells() {
            for f in 0..cell.face_count() {
                let size = cell.face_size(f) as u32;
                for (k, i) in (cell.face_begin(f)..cell.face_end(f)).enumerate() {
                    let p = cell.point(i);
                    corners.push(p.x as f32);
                    corners.push(p.y as f32);

                    edges.push(offset + k as u32);
                    edges.push(offset + (k as u32 + 1) % size);
                }
                offset += size;
            }
        }

        (corners, edges)
    }
}

/// Boundary-sampled energy gradient contribution of one shared cell edge
fn edge_gradient(
    image: &Image,
    a: DVec2,
    poly_a: &Polynomial,
    b: DVec2,
    poly_b: &Polynomial,
    source: DVec2,
    target: DVec2,
) -> DVec2 {
    let length = source.distance(target);
    // a clipped edge never exceeds the domain diagonal; the cap only guards
    // against sampling an unclipped far ray
    let max_samples = 4 * (image.width() + image.height()) as i64;
    let samples = ((length / pixel_width(image.width()) + 0.5) as i64).min(max_samples);
    if samples <= 0 {
        return DVec2::ZERO;
    }

    let axis_length = a.distance(b);
    if axis_length == 0.0 {
        return DVec2::ZERO;
    }

    let ds = length / samples as f64;
    let doubled = 2 * samples;

    let mut result = DVec2::ZERO;
    let mut s = 1;
    while s < doubled {
        let lambda = s as f64 / doubled as f64;
        let p = source * (1.0 - lambda) + target * lambda;

        let (i, j) = locate_point(image.width(), image.height(), p);
        let color = image.pixel(i, j);

        let mut energy_a = 0.0;
        let mut energy_b = 0.0;
        for c in 0..image.channels() {
            let diff = color[c] as f64 - poly_a.evaluate(c, p.x, p.y);
            energy_a += diff * diff;
            let diff = color[c] as f64 - poly_b.evaluate(c, p.x, p.y);
            energy_b += diff * diff;
        }

        result += (p - a) * ((energy_a - energy_b) * ds);
        s += 2;
    }

    result / axis_length
}

/// Parse a whitespace-separated list of `x y` site coordinates
///
/// Pairs may span lines. An odd number of coordinates or an unparsable
/// token is an error.
pub fn parse_sites(text: &str) -> Result<Vec<DVec2>> {
    let mut values = Vec::new();
    for token in text.split_whitespace() {
        let value: f64 = token.parse().map_err(|_| {
            ApproxError::InvalidConfig(format!("invalid coordinate: {}", token))
        })?;
        values.push(value);
    }

    if values.len() % 2 != 0 {
        return Err(ApproxError::InvalidConfig(format!(
            "odd number of coordinates ({})",
            values.len()
        )));
    }

    Ok(values.chunks(2).map(|c| DVec2::new(c[0], c[1])).collect())
}

/// Format sites as whitespace-separated `x y` pairs, one per line
///
/// Coordinates round-trip exactly through [`parse_sites`].
pub fn format_sites(sites: &[DVec2]) -> String {
    sites
        .iter()
        .map(|p| format!("{} {}", p.x, p.y))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApproxConfigBuilder;

    fn gray_image(width: usize, height: usize, f: impl Fn(i32, i32) -> u8) -> Image {
        let mut data = vec![0u8; width * height];
        for j in 0..height {
            for i in 0..width {
                data[j * width + i] = f(i as i32, j as i32);
            }
        }
        Image::from_raw(data, width, height, 1).unwrap()
    }

    fn approx_with_image(seed: u64, width: usize, height: usize) -> VoroApprox {
        let config = ApproxConfigBuilder::new().seed(seed).build().unwrap();
        let mut approx = VoroApprox::new(config);
        approx.set_image(gray_image(width, height, |i, j| (8 * i + 4 * j) as u8));
        approx
    }

    fn quadrant_sites(ratio: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(-0.5, -0.5 * ratio),
            DVec2::new(0.5, -0.5 * ratio),
            DVec2::new(0.5, 0.5 * ratio),
            DVec2::new(-0.5, 0.5 * ratio),
        ]
    }

    #[test]
    fn test_random_init() {
        let mut approx = approx_with_image(42, 16, 16);
        approx.random_init(20).unwrap();

        assert_eq!(approx.sites().len(), 20);
        assert_eq!(approx.cells().len(), 20);
        for p in approx.sites() {
            assert!(p.x >= -1.0 && p.x <= 1.0);
            assert!(p.y >= -1.0 && p.y <= 1.0);
        }
    }

    #[test]
    fn test_random_init_requires_three_sites() {
        let mut approx = approx_with_image(42, 16, 16);
        assert!(approx.random_init(2).is_err());
    }

    #[test]
    fn test_random_init_without_image_is_noop() {
        let config = ApproxConfigBuilder::new().seed(1).build().unwrap();
        let mut approx = VoroApprox::new(config);

        approx.random_init(10).unwrap();
        assert!(approx.sites().is_empty());
        assert!(approx.cells().is_empty());
        assert!(approx.approximate(1, 8, 8, 1).is_none());
    }

    #[test]
    fn test_pixel_sets_cover_every_pixel() {
        let (w, h) = (16, 16);
        let mut approx = approx_with_image(7, w, h);
        approx.random_init(12).unwrap();
        approx.assign_pixels();

        let mut covered = vec![0u32; w * h];
        for px in approx.pixel_sets() {
            for (j, l, r) in px.rows() {
                for i in l..=r {
                    assert!(l <= r);
                    covered[j as usize * w + i as usize] += 1;
                }
            }
        }
        for (id, &c) in covered.iter().enumerate() {
            assert!(c >= 1, "pixel {} not covered by any cell", id);
        }
    }

    #[test]
    fn test_quadrant_sites_pixel_ownership() {
        let (w, h) = (16, 16);
        let mut approx = approx_with_image(1, w, h);
        approx.set_sites(&quadrant_sites(1.0)).unwrap();
        approx.assign_pixels();

        assert_eq!(approx.pixel_sets().len(), 4);
        for px in approx.pixel_sets() {
            // every quadrant owns at least its own quarter of the raster
            assert!(px.pixel_count() >= (w / 2) * (h / 2));
        }
    }

    #[test]
    fn test_greedy_init_reaches_target() {
        let mut approx = approx_with_image(5, 24, 24);
        approx.greedy_init(10).unwrap();

        assert_eq!(approx.sites().len(), 10);
        assert_eq!(approx.cells().len(), 10);
        assert_eq!(approx.energies().len(), 10);
        for p in approx.sites() {
            assert!(p.x >= -1.0 && p.x <= 1.0);
            assert!(p.y >= -1.0 && p.y <= 1.0);
        }
    }

    #[test]
    fn test_optimize_keeps_sites_bounded_and_energy_finite() {
        let mut approx = approx_with_image(9, 16, 16);
        approx.random_init(8).unwrap();
        approx.optimize(1, 4);

        assert!(approx.total_energy().is_finite());
        for p in approx.sites() {
            assert!(p.x >= -1.0 && p.x <= 1.0);
            assert!(p.y >= -1.0 && p.y <= 1.0);
        }
    }

    #[test]
    fn test_site_codec_round_trip() {
        let mut approx = approx_with_image(13, 16, 16);
        approx.random_init(10).unwrap();
        approx.assign_pixels();
        let pixels_before = approx.pixel_sets().to_vec();

        let text = format_sites(approx.sites());
        let restored = parse_sites(&text).unwrap();
        assert_eq!(restored, approx.sites());

        approx.set_sites(&restored).unwrap();
        approx.assign_pixels();
        assert_eq!(approx.pixel_sets(), &pixels_before[..]);
    }

    #[test]
    fn test_parse_sites_multiline_and_errors() {
        let sites = parse_sites("0.5 -0.25\n0.125\n0.75").unwrap();
        assert_eq!(sites, vec![DVec2::new(0.5, -0.25), DVec2::new(0.125, 0.75)]);

        assert!(parse_sites("1.0 2.0 3.0").is_err());
        assert!(parse_sites("1.0 abc").is_err());
    }

    #[test]
    fn test_approximate_constant_image() {
        let config = ApproxConfigBuilder::new().seed(21).build().unwrap();
        let mut approx = VoroApprox::new(config);
        approx.set_image(gray_image(32, 16, |_, _| 128));
        approx.random_init(6).unwrap();

        let output = approx.approximate(0, 32, 16, 1).unwrap();
        assert_eq!(output.len(), 32 * 16);
        for &byte in &output {
            assert!(
                (127..=129).contains(&byte),
                "constant image rendered {}",
                byte
            );
        }
    }

    #[test]
    fn test_approximate_rejects_extra_channels() {
        let mut approx = approx_with_image(2, 8, 8);
        approx.random_init(4).unwrap();
        assert!(approx.approximate(1, 8, 8, 3).is_none());
    }

    #[test]
    fn test_render_data() {
        let mut approx = approx_with_image(3, 16, 16);
        approx.set_sites(&quadrant_sites(1.0)).unwrap();

        let sites = approx.sites_data();
        assert_eq!(sites.len(), 8);

        let (corners, edges) = approx.voronoi_data();
        assert!(!corners.is_empty());
        assert_eq!(corners.len() % 2, 0);
        assert_eq!(edges.len() % 2, 0);
        // every edge index addresses a corner
        let corner_count = (corners.len() / 2) as u32;
        assert!(edges.iter().all(|&e| e < corner_count));
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut approx = approx_with_image(77, 16, 16);
            approx.random_init(10).unwrap();
            approx.optimize(1, 2);
            approx.sites().to_vec()
        };
        assert_eq!(run(), run());
    }
}

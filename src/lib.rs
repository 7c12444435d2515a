//! Voronoi-based polynomial image approximation
//!
//! Approximates a raster image by a partition of its domain into convex
//! Voronoi cells, each replaced by a low-degree polynomial color fit. Sites
//! are seeded randomly or greedily and then relocated by gradient descent on
//! the reconstruction error, shrinking the step geometrically over the run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_approx::*;
//!
//! // wrap a raw grayscale buffer (rows bottom-up)
//! let image = Image::from_raw(vec![128u8; 64 * 64], 64, 64, 1).unwrap();
//!
//! let config = ApproxConfigBuilder::new()
//!     .seed(42)
//!     .degree(1)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut approx = VoroApprox::new(config);
//! approx.set_image(image);
//!
//! // seed sites where the approximation is worst, then optimize
//! approx.greedy_init(500).unwrap();
//! approx.optimize(1, 30);
//!
//! // render the approximation back into a byte buffer
//! let rendered = approx.approximate(1, 64, 64, 1).unwrap();
//! println!("energy {}", approx.total_energy());
//! # let _ = rendered;
//! ```

pub mod approx;
pub mod cell;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod image;
pub mod raster;

// Re-export core types for convenience
pub use approx::{format_sites, parse_sites, VoroApprox};
pub use cell::PolygonCell;
pub use config::{ApproxConfig, ApproxConfigBuilder};
pub use domain::BoundaryDomain;
pub use error::{ApproxError, Result};
pub use fit::Polynomial;
pub use geometry::{DualSegment, SiteTriangulation, Triangulator, VoronoiBuilder};
pub use image::Image;
pub use raster::{rasterize, PixelSet};

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;

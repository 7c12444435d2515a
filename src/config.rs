//! Approximation configuration and builder
//!
//! This module provides configuration types for deterministic, reproducible
//! approximation runs.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ApproxError, Result};

/// Configuration for a deterministic approximation run
///
/// The same configuration (and the same image) always produces the identical
/// site layout and optimization trajectory.
///
/// # Serialization
///
/// With the `serde` feature enabled the configuration can be serialized and
/// shared; the run is reproduced from it rather than persisting any derived
/// state.
///
/// # Example
///
/// ```rust
/// use voronoi_approx::*;
///
/// let config = ApproxConfigBuilder::new()
///     .seed(42)
///     .degree(1)
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(config.seed, 42);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxConfig {
    /// Random seed for site initialization
    ///
    /// The same seed (with the same image and parameters) always produces
    /// the exact same initial sites.
    pub seed: u64,

    /// Polynomial degree used for per-cell color fitting (0, 1 or 2)
    ///
    /// - 0: constant color per cell
    /// - 1: linear gradient per cell (default)
    /// - 2: full quadratic per cell
    pub degree: usize,

    /// Exponent of the per-pixel error norm (default 2, squared error)
    pub lp: u32,

    /// Scale applied to the per-site optimization step
    ///
    /// Each site moves by `sqrt(cell_area) * step_scale` at the first
    /// iteration; the step then shrinks geometrically over the run.
    pub step_scale: f64,
}

impl Default for ApproxConfig {
    fn default() -> Self {
        ApproxConfigBuilder::new().build().unwrap()
    }
}

/// Builder for creating an [`ApproxConfig`] with validation
///
/// # Example
///
/// ```rust
/// use voronoi_approx::*;
///
/// // Use defaults (random seed)
/// let config = ApproxConfigBuilder::new().build().unwrap();
///
/// // Customize
/// let config = ApproxConfigBuilder::new()
///     .seed(12345)
///     .degree(2)
///     .unwrap()
///     .lp(2)
///     .unwrap()
///     .step_scale(0.2)
///     .unwrap()
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ApproxConfigBuilder {
    seed: Option<u64>,
    degree: usize,
    lp: u32,
    step_scale: f64,
}

impl ApproxConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: random
    /// - degree: 1 (linear fit)
    /// - lp: 2 (squared error)
    /// - step_scale: 0.3
    pub fn new() -> Self {
        Self {
            seed: None,
            degree: 1,
            lp: 2,
            step_scale: 0.3,
        }
    }

    /// Set the random seed for site initialization
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the polynomial degree for color fitting
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if degree > 2
    pub fn degree(mut self, degree: usize) -> Result<Self> {
        if degree > 2 {
            return Err(ApproxError::InvalidConfig(format!(
                "polynomial degree must be <= 2 (got {})",
                degree
            )));
        }
        self.degree = degree;
        Ok(self)
    }

    /// Set the error norm exponent
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if lp is 0
    pub fn lp(mut self, lp: u32) -> Result<Self> {
        if lp == 0 {
            return Err(ApproxError::InvalidConfig(
                "error norm exponent must be >= 1".to_string(),
            ));
        }
        self.lp = lp;
        Ok(self)
    }

    /// Set the optimization step scale
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the scale is not a positive finite number
    pub fn step_scale(mut self, scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ApproxError::InvalidConfig(format!(
                "step scale must be positive (got {})",
                scale
            )));
        }
        self.step_scale = scale;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// If no seed was provided, generates a random one.
    pub fn build(self) -> Result<ApproxConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);

        Ok(ApproxConfig {
            seed,
            degree: self.degree,
            lp: self.lp,
            step_scale: self.step_scale,
        })
    }
}

impl Default for ApproxConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ApproxConfigBuilder::new().build().unwrap();
        assert_eq!(config.degree, 1);
        assert_eq!(config.lp, 2);
        assert!((config.step_scale - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_builder_custom() {
        let config = ApproxConfigBuilder::new()
            .seed(42)
            .degree(2)
            .unwrap()
            .lp(1)
            .unwrap()
            .step_scale(0.5)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.seed, 42);
        assert_eq!(config.degree, 2);
        assert_eq!(config.lp, 1);
        assert!((config.step_scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_builder_invalid_degree() {
        assert!(ApproxConfigBuilder::new().degree(3).is_err());
    }

    #[test]
    fn test_builder_invalid_lp() {
        assert!(ApproxConfigBuilder::new().lp(0).is_err());
    }

    #[test]
    fn test_builder_invalid_step_scale() {
        assert!(ApproxConfigBuilder::new().step_scale(0.0).is_err());
        assert!(ApproxConfigBuilder::new().step_scale(-1.0).is_err());
        assert!(ApproxConfigBuilder::new().step_scale(f64::NAN).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_config_serialization() {
        let config = ApproxConfigBuilder::new()
            .seed(12345)
            .degree(2)
            .unwrap()
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        let restored: ApproxConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, restored);
    }
}

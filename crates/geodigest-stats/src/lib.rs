//! Numeric summary statistics for the geodigest project.
//!
//! This crate provides the dependency-free numeric building blocks used when
//! summarizing feature layers:
//!
//! - **Descriptive statistics**: min, max, mean, median, quartiles and population standard deviation
//! - **Quantiles**: linear-interpolation quantile estimation over sorted data
//! - **Histogram generation**: equal-width binning over the observed value range
//! - **Comprehensive statistics**: descriptive statistics and a histogram computed in one pass
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Quantile computation
//! - [`histogram`]: Equal-width histogram construction
//! - [`comprehensive`]: Descriptive statistics and histogram combined
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use geodigest_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.p25, 2.0);
//! ```
//!
//! ## Computing a quantile
//!
//! ```
//! use geodigest_stats::percentiles::compute_quantile;
//!
//! let sorted = [1.0, 2.0, 3.0, 4.0];
//! assert_eq!(compute_quantile(&sorted, 0.5), 2.5);
//! ```
//!
//! ## Creating a histogram
//!
//! ```
//! use geodigest_stats::histogram::Histogram;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
//! let histogram = Histogram::new(&values, 5);
//! assert_eq!(histogram.bins.len(), 5);
//! assert_eq!(histogram.total_count(), 10);
//! ```

pub mod comprehensive;
pub mod descriptive;
pub mod histogram;
pub mod percentiles;

//! Numeric routines behind the canned analyses.
//!
//! Inputs are polars `Float64Chunked` arrays with missing cells as nulls.
//! Nothing here panics on empty or all-null input; undefined results come
//! back as `NaN` or an empty collection.

use std::f64::consts::PI;

use polars::prelude::*;

/// Upper bound on histogram bins, whatever the binning rule suggests.
pub const MAX_BINS: usize = 100;

// ---------------------------------------------------------------------------
// Moments and quantiles
// ---------------------------------------------------------------------------

fn present_count(ca: &Float64Chunked) -> usize {
    ca.len() - ca.null_count()
}

/// Linear-interpolation quantile over the non-null values.
fn quantile(ca: &Float64Chunked, q: f64) -> f64 {
    ca.quantile(q, QuantileMethod::Linear)
        .ok()
        .flatten()
        .unwrap_or(f64::NAN)
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(ca: &Float64Chunked) -> f64 {
    if present_count(ca) < 2 {
        return f64::NAN;
    }
    ca.std(1).unwrap_or(f64::NAN)
}

/// Non-null, finite values as a dense array.
fn finite(ca: &Float64Chunked) -> Float64Chunked {
    let values: Vec<f64> = ca.into_iter().flatten().filter(|v| v.is_finite()).collect();
    Float64Chunked::from_vec(ca.name().clone(), values)
}

/// The eight numbers of a describe row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

pub fn summarize(ca: &Float64Chunked) -> NumericSummary {
    NumericSummary {
        count: present_count(ca),
        mean: ca.mean().unwrap_or(f64::NAN),
        std: sample_std(ca),
        min: ca.min().unwrap_or(f64::NAN),
        q1: quantile(ca, 0.25),
        median: ca.median().unwrap_or(f64::NAN),
        q3: quantile(ca, 0.75),
        max: ca.max().unwrap_or(f64::NAN),
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over the rows where both sides are present.
/// `NaN` with fewer than two such rows or when either side is constant.
pub fn pearson(x: &Float64Chunked, y: &Float64Chunked) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .into_iter()
        .zip(y)
        .filter_map(|(a, b)| Some((a?, b?)))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }

    let xs = Float64Chunked::from_vec(x.name().clone(), xs);
    let ys = Float64Chunked::from_vec(y.name().clone(), ys);
    let flat = |ca: &Float64Chunked| !matches!(ca.std(1), Some(s) if s > 0.0);
    if flat(&xs) || flat(&ys) {
        return f64::NAN;
    }

    cov::pearson_corr(&xs, &ys)
        .map_or(f64::NAN, |r| r.clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// One histogram bin, `[start, end)` (the last bin also includes `end`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins using the "auto" rule: the narrower of the Sturges and
/// Freedman–Diaconis widths.
pub fn histogram(ca: &Float64Chunked) -> Vec<Bin> {
    let s = finite(ca);
    let (Some(min), Some(max)) = (s.min(), s.max()) else {
        return Vec::new();
    };
    let n = s.len();

    if max == min {
        return vec![Bin {
            start: min - 0.5,
            end: max + 0.5,
            count: n,
        }];
    }

    let range = max - min;
    let sturges = range / ((n as f64).log2() + 1.0);
    let iqr = quantile(&s, 0.75) - quantile(&s, 0.25);
    let fd = 2.0 * iqr / (n as f64).cbrt();
    let bin_width = if fd > 0.0 { fd.min(sturges) } else { sturges };
    let n_bins = ((range / bin_width).ceil() as usize).clamp(1, MAX_BINS);

    let width = range / n_bins as f64;
    let mut bins: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            start: min + i as f64 * width,
            end: if i + 1 == n_bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for v in s.into_no_null_iter() {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// Kernel density
// ---------------------------------------------------------------------------

/// Gaussian KDE with Scott's bandwidth, sampled at `points` evenly spaced
/// positions between the smallest and largest value. Returns `[x, density]`.
pub fn gaussian_kde(ca: &Float64Chunked, points: usize) -> Vec<[f64; 2]> {
    let s = finite(ca);
    let n = s.len();
    let std = sample_std(&s);
    let (Some(min), Some(max)) = (s.min(), s.max()) else {
        return Vec::new();
    };
    if n < 2 || points < 2 || !(std > 0.0) {
        return Vec::new();
    }
    let bandwidth = std * (n as f64).powf(-0.2);
    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * PI).sqrt());
    let step = (max - min) / (points - 1) as f64;

    (0..points)
        .map(|i| {
            let x = min + i as f64 * step;
            let sum: f64 = s
                .into_no_null_iter()
                .map(|xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            [x, norm * sum]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

/// Tukey box-plot summary.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value not below `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Largest value not above `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(ca: &Float64Chunked) -> Option<BoxStats> {
    let s = finite(ca);
    if s.is_empty() {
        return None;
    }
    let q1 = quantile(&s, 0.25);
    let median = s.median().unwrap_or(f64::NAN);
    let q3 = quantile(&s, 0.75);
    let iqr = q3 - q1;
    let low_fence = q1 - 1.5 * iqr;
    let high_fence = q3 + 1.5 * iqr;

    let mut sorted: Vec<f64> = s.into_no_null_iter().collect();
    sorted.sort_by(f64::total_cmp);

    let inside = || {
        sorted
            .iter()
            .copied()
            .filter(|v| *v >= low_fence && *v <= high_fence)
    };
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < low_fence || *v > high_fence)
        .collect();

    Some(BoxStats {
        q1,
        median,
        q3,
        lower_whisker,
        upper_whisker,
        outliers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn ca(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("v".into(), values)
    }

    fn with_nulls(values: &[Option<f64>]) -> Float64Chunked {
        Float64Chunked::from_iter_options("v".into(), values.iter().copied())
    }

    #[test]
    fn summary_of_one_two_three() {
        let s = summarize(&ca(&[3.0, 1.0, 2.0]));
        assert_eq!(s.count, 3);
        assert!(close(s.mean, 2.0));
        assert!(close(s.std, 1.0));
        assert!(close(s.min, 1.0));
        assert!(close(s.q1, 1.5));
        assert!(close(s.median, 2.0));
        assert!(close(s.q3, 2.5));
        assert!(close(s.max, 3.0));
    }

    #[test]
    fn summary_skips_nulls() {
        let s = summarize(&with_nulls(&[Some(1.0), None, Some(3.0)]));
        assert_eq!(s.count, 2);
        assert!(close(s.mean, 2.0));
        assert!(close(s.median, 2.0));
    }

    #[test]
    fn summary_of_nothing_is_nan() {
        let s = summarize(&with_nulls(&[None, None]));
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert!(s.std.is_nan());
        assert!(s.min.is_nan());
        assert!(s.q1.is_nan());
        assert!(s.max.is_nan());
        assert!(summarize(&ca(&[4.0])).std.is_nan());
    }

    #[test]
    fn pearson_uses_pairwise_complete_rows() {
        let x = with_nulls(&[Some(1.0), Some(2.0), Some(3.0), None]);
        let y = with_nulls(&[Some(2.0), Some(4.0), Some(6.0), Some(100.0)]);
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-9);

        let z = with_nulls(&[Some(3.0), Some(2.0), Some(1.0), Some(0.0)]);
        assert!((pearson(&x, &z) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_of_constant_is_nan() {
        assert!(pearson(&ca(&[1.0, 1.0, 1.0]), &ca(&[1.0, 2.0, 3.0])).is_nan());
        assert!(pearson(&ca(&[1.0]), &ca(&[2.0])).is_nan());
    }

    #[test]
    fn histogram_covers_every_value() {
        let values: Vec<f64> = (0..50).map(|i| (i * 7 % 13) as f64).collect();
        let bins = histogram(&ca(&values));
        assert!(!bins.is_empty() && bins.len() <= MAX_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert!(close(bins[0].start, 0.0));
        assert!(close(bins[bins.len() - 1].end, 12.0));
    }

    #[test]
    fn histogram_of_constant_has_one_unit_bin() {
        let bins = histogram(&ca(&[5.0, 5.0]));
        assert_eq!(bins.len(), 1);
        assert!(close(bins[0].width(), 1.0));
        assert!(close(bins[0].center(), 5.0));
        assert_eq!(bins[0].count, 2);
        assert!(histogram(&ca(&[])).is_empty());
        assert!(histogram(&with_nulls(&[None])).is_empty());
    }

    #[test]
    fn kde_is_positive_and_peaks_in_the_middle() {
        let values = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0, 4.0, 4.0, 5.0];
        let curve = gaussian_kde(&ca(&values), 101);
        assert_eq!(curve.len(), 101);
        assert!(curve.iter().all(|p| p[1] > 0.0));
        let peak = curve
            .iter()
            .max_by(|a, b| a[1].total_cmp(&b[1]))
            .map(|p| p[0])
            .unwrap();
        assert!((peak - 3.0).abs() < 0.2);
        assert!(gaussian_kde(&ca(&[2.0, 2.0]), 10).is_empty());
    }

    #[test]
    fn box_stats_separate_outliers() {
        let mut values: Vec<f64> = (1..=9).map(f64::from).collect();
        values.push(100.0);
        let b = box_stats(&ca(&values)).unwrap();
        assert!(close(b.median, 5.5));
        assert!(close(b.lower_whisker, 1.0));
        assert!(close(b.upper_whisker, 9.0));
        assert_eq!(b.outliers, vec![100.0]);
        assert!(box_stats(&ca(&[])).is_none());
    }
}

//! Descriptive statistics used by the explorer report and the plot heuristics.
//!
//! Everything here works on plain slices of `f64` (temporal values are elapsed days)
//! or on a [`ColumnData`] for frequency counts. Undefined results are `NaN`, never errors.

use std::collections::HashMap;

use crate::data::ColumnData;

/// count / mean / std / quartiles of a numeric or temporal column
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

/// count / unique / top / freq of a categorical column
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

/// A single histogram bin `[start, end)`; the last bin also includes its end
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

pub fn summarize_numeric(values: &[f64]) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let (min, q25, q50, q75, max) = if sorted.is_empty() {
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    } else {
        (
            sorted[0],
            percentile(&sorted, 0.25),
            percentile(&sorted, 0.5),
            percentile(&sorted, 0.75),
            sorted[sorted.len() - 1],
        )
    };

    NumericSummary {
        count: values.len(),
        mean: mean(values),
        std: sample_std(values),
        min,
        q25,
        q50,
        q75,
        max,
    }
}

pub fn summarize_categorical(data: &ColumnData) -> CategoricalSummary {
    let counts = value_counts(data);
    let count = counts.iter().map(|(_, c)| c).sum();
    let (top, freq) = match counts.first() {
        Some((label, n)) => (Some(label.clone()), Some(*n)),
        None => (None, None),
    };
    CategoricalSummary {
        count,
        unique: counts.len(),
        top,
        freq,
    }
}

/// Linear-interpolated percentile of already sorted data, `p` in `[0, 1]`
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    let n = sorted_data.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_data[0];
    }

    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = rank.ceil() as usize;

    if lower_idx == upper_idx {
        sorted_data[lower_idx]
    } else {
        let weight = rank - lower_idx as f64;
        sorted_data[lower_idx] * (1.0 - weight) + sorted_data[upper_idx] * weight
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with one delta degree of freedom
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Adjusted Fisher-Pearson skewness. NaN below three values, 0 for constant data.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return f64::NAN;
    }
    let nf = n as f64;
    let m = mean(values);
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return 0.0;
    }
    let g1 = m3 / m2.powf(1.5);
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1
}

/// `max - min`, or 0 for empty input
pub fn value_range(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    max - min
}

/// Frequency of every distinct non-null label, most frequent first.
/// Ties keep the order in which the labels first appear.
pub fn value_counts(data: &ColumnData) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for row in 0..data.len() {
        if let Some(label) = data.label(row) {
            let entry = counts.entry(label.clone()).or_insert_with(|| {
                order.push(label);
                0
            });
            *entry += 1;
        }
    }

    let mut result: Vec<(String, usize)> = order
        .into_iter()
        .map(|label| {
            let n = counts[&label];
            (label, n)
        })
        .collect();
    // stable sort keeps first-appearance order among equal counts
    result.sort_by(|a, b| b.1.cmp(&a.1));
    result
}

/// Sturges' rule
pub fn sturges_bins(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    ((n as f64).log2().ceil() as usize) + 1
}

/// Equal-width histogram over the data range
pub fn histogram(values: &[f64], bin_count: usize) -> Vec<Bin> {
    if values.is_empty() || bin_count == 0 {
        return Vec::new();
    }

    let mut min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bin_count as f64;

    let mut bins: Vec<Bin> = (0..bin_count)
        .map(|i| Bin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(bin_count - 1);
        bins[idx].count += 1;
    }

    bins
}

/// Pearson correlation over the rows where both values are present
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Square matrix of pairwise correlations between the given columns
pub fn correlation_matrix(columns: &[&ColumnData]) -> Vec<Vec<f64>> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|c| (0..c.len()).map(|i| c.as_f64(i)).collect())
        .collect();

    let n = series.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let r = pearson(&series[i], &series[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summarize_numeric() {
        let s = summarize_numeric(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert!(approx(s.mean, 2.5));
        assert!(approx(s.std, 1.2909944487358056));
        assert_eq!(s.min, 1.0);
        assert!(approx(s.q25, 1.75));
        assert!(approx(s.q50, 2.5));
        assert!(approx(s.q75, 3.25));
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_summarize_empty_is_nan() {
        let s = summarize_numeric(&[]);
        assert_eq!(s.count, 0);
        assert!(s.mean.is_nan());
        assert!(s.std.is_nan());
        assert!(s.max.is_nan());
    }

    #[test]
    fn test_summarize_categorical() {
        let data = ColumnData::Text(vec![
            Some("b".to_string()),
            Some("a".to_string()),
            None,
            Some("a".to_string()),
        ]);
        let s = summarize_categorical(&data);
        assert_eq!(s.count, 3);
        assert_eq!(s.unique, 2);
        assert_eq!(s.top.as_deref(), Some("a"));
        assert_eq!(s.freq, Some(2));
    }

    #[test]
    fn test_value_counts_ties_keep_first_appearance() {
        let data = ColumnData::Text(
            ["x", "y", "z", "y", "x", "w"]
                .iter()
                .map(|s| Some(s.to_string()))
                .collect(),
        );
        let counts = value_counts(&data);
        let labels: Vec<&str> = counts.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["x", "y", "z", "w"]);
        assert_eq!(counts[0].1, 2);
    }

    #[test]
    fn test_skewness() {
        assert!(skewness(&[1.0, 2.0]).is_nan());
        assert_eq!(skewness(&[5.0, 5.0, 5.0]), 0.0);
        assert!(approx(skewness(&[1.0, 2.0, 3.0]), 0.0));
        // long right tail
        let s = skewness(&[1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 3.0, 50.0]);
        assert!(s > 1.0);
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let bins = histogram(&values, 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        // max lands in the last bin
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 10.0);
    }

    #[test]
    fn test_histogram_constant_values() {
        let bins = histogram(&[3.0, 3.0], 2);
        assert_eq!(bins[0].start, 2.5);
        assert_eq!(bins[1].end, 3.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_sturges() {
        assert_eq!(sturges_bins(0), 1);
        assert_eq!(sturges_bins(1), 1);
        assert_eq!(sturges_bins(8), 4);
        assert_eq!(sturges_bins(100), 8);
    }

    #[test]
    fn test_pearson() {
        let x = vec![Some(1.0), Some(2.0), Some(3.0), None];
        let y = vec![Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!(approx(pearson(&x, &y), 1.0));
        let neg = vec![Some(3.0), Some(2.0), Some(1.0), Some(0.0)];
        assert!(approx(pearson(&x, &neg), -1.0));
        let constant = vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert!(pearson(&x, &constant).is_nan());
    }

    #[test]
    fn test_correlation_matrix_symmetric() {
        let a = ColumnData::Integer(vec![Some(1), Some(2), Some(3)]);
        let b = ColumnData::Float(vec![Some(3.0), Some(1.0), Some(2.0)]);
        let m = correlation_matrix(&[&a, &b]);
        assert!(approx(m[0][0], 1.0));
        assert!(approx(m[0][1], m[1][0]));
        assert!(approx(m[0][1], -0.5));
    }
}

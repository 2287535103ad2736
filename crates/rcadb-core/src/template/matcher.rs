//! Locate a reference bitmap inside a page bitmap.
//!
//! Three normalized similarity measures are evaluated and the best location
//! among those that clear the confidence threshold wins. Large references
//! are searched on a box-downsampled copy first and refined at full
//! resolution around each coarse optimum.

use std::ops::Range;

use ndarray::{s, Array2, Zip};
use tracing::{debug, trace};

use super::{Intensity, Point};
use crate::models::config::MatchingConfig;

/// Short side the reference keeps at the coarse level.
const MIN_COARSE_SIDE: usize = 8;

/// Scores this close above 1.0 are rounding noise.
const SCORE_EPSILON: f64 = 1e-9;

/// Similarity measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Normalized cross-correlation.
    CrossCorrelation,
    /// Normalized correlation coefficient (mean-subtracted).
    CorrelationCoefficient,
    /// Normalized squared difference, reported as `1 - score`.
    SquaredDifference,
}

impl MatchMethod {
    const ALL: [MatchMethod; 3] = [
        MatchMethod::CrossCorrelation,
        MatchMethod::CorrelationCoefficient,
        MatchMethod::SquaredDifference,
    ];

    /// Whether the raw score improves downwards.
    fn minimizes(self) -> bool {
        matches!(self, MatchMethod::SquaredDifference)
    }

    /// Raw score mapped so that higher is better.
    fn normalized(self, raw: f64) -> f64 {
        if self.minimizes() { 1.0 - raw } else { raw }
    }
}

/// Best location of a reference inside a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    /// Left edge of the match, in page pixels.
    pub x: u32,
    /// Top edge of the match, in page pixels.
    pub y: u32,
    /// Reference width.
    pub width: u32,
    /// Reference height.
    pub height: u32,
    /// Confidence in `[0, 1]`, higher is better.
    pub score: f64,
    /// Measure that produced the match.
    pub method: MatchMethod,
}

impl TemplateMatch {
    /// Top-left corner as an anchor point.
    pub fn top_left(&self) -> Point {
        Point::new(i64::from(self.x), i64::from(self.y))
    }
}

/// Raw optimum of one measure over a search window.
#[derive(Debug, Clone, Copy)]
struct Optimum {
    row: usize,
    col: usize,
    raw: f64,
}

/// Summed-area tables of a page and of its squares.
struct Integral {
    sum: Array2<f64>,
    squares: Array2<f64>,
}

impl Integral {
    fn new(image: &Intensity) -> Self {
        let (rows, cols) = image.dim();
        let mut sum = Array2::<f64>::zeros((rows + 1, cols + 1));
        let mut squares = Array2::<f64>::zeros((rows + 1, cols + 1));
        for r in 0..rows {
            let mut row_sum = 0.0;
            let mut row_squares = 0.0;
            for c in 0..cols {
                let v = image[[r, c]];
                row_sum += v;
                row_squares += v * v;
                sum[[r + 1, c + 1]] = sum[[r, c + 1]] + row_sum;
                squares[[r + 1, c + 1]] = squares[[r, c + 1]] + row_squares;
            }
        }
        Self { sum, squares }
    }

    fn window(table: &Array2<f64>, row: usize, col: usize, height: usize, width: usize) -> f64 {
        table[[row + height, col + width]] - table[[row, col + width]] - table[[row + height, col]]
            + table[[row, col]]
    }
}

/// Template matcher with a confidence threshold.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    threshold: f64,
    max_coarse_factor: usize,
}

impl TemplateMatcher {
    /// Create a matcher with the default threshold of 0.8.
    pub fn new() -> Self {
        Self::from_config(&MatchingConfig::default())
    }

    /// Create a matcher from configuration.
    pub fn from_config(config: &MatchingConfig) -> Self {
        Self {
            threshold: config.threshold,
            max_coarse_factor: config.max_coarse_factor.max(1) as usize,
        }
    }

    /// Set the confidence threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the largest coarse downscale factor (1 disables the coarse pass).
    pub fn with_max_coarse_factor(mut self, factor: usize) -> Self {
        self.max_coarse_factor = factor.max(1);
        self
    }

    /// Locate `reference` in `page`. Returns `None` when no measure clears
    /// the threshold.
    pub fn locate(&self, page: &Intensity, reference: &Intensity) -> Option<TemplateMatch> {
        let (page_rows, page_cols) = page.dim();
        let (ref_rows, ref_cols) = reference.dim();
        if ref_rows == 0 || ref_cols == 0 || ref_rows > page_rows || ref_cols > page_cols {
            debug!(
                "Reference {}x{} cannot fit page {}x{}",
                ref_cols, ref_rows, page_cols, page_rows
            );
            return None;
        }

        let optima = self.search(page, reference);

        let best = MatchMethod::ALL
            .iter()
            .zip(optima.iter())
            .filter_map(|(&method, optimum)| {
                let optimum = (*optimum)?;
                let score = accept_score(method.normalized(optimum.raw))?;
                trace!("{:?}: score {:.4} at ({}, {})", method, score, optimum.col, optimum.row);
                (score >= self.threshold).then_some(TemplateMatch {
                    x: optimum.col as u32,
                    y: optimum.row as u32,
                    width: ref_cols as u32,
                    height: ref_rows as u32,
                    score,
                    method,
                })
            })
            .fold(None, |best: Option<TemplateMatch>, candidate| match best {
                Some(b) if b.score >= candidate.score => Some(b),
                _ => Some(candidate),
            });

        match &best {
            Some(m) => debug!("Reference located at ({}, {}) score {:.3} via {:?}", m.x, m.y, m.score, m.method),
            None => debug!("Reference not located above threshold {:.2}", self.threshold),
        }
        best
    }

    fn coarse_factor(&self, ref_rows: usize, ref_cols: usize) -> usize {
        let short_side = ref_rows.min(ref_cols);
        let mut factor = 1;
        while factor * 2 <= self.max_coarse_factor && short_side / (factor * 2) >= MIN_COARSE_SIDE {
            factor *= 2;
        }
        factor
    }

    fn search(&self, page: &Intensity, reference: &Intensity) -> [Option<Optimum>; 3] {
        let (page_rows, page_cols) = page.dim();
        let (ref_rows, ref_cols) = reference.dim();
        let last_row = page_rows - ref_rows;
        let last_col = page_cols - ref_cols;

        let factor = self.coarse_factor(ref_rows, ref_cols);
        let integral = Integral::new(page);
        if factor == 1 {
            return scan(page, &integral, reference, 0..last_row + 1, 0..last_col + 1);
        }

        let coarse_page = downsample(page, factor);
        let coarse_ref = downsample(reference, factor);
        let (coarse_rows, coarse_cols) = coarse_page.dim();
        let (coarse_ref_rows, coarse_ref_cols) = coarse_ref.dim();
        if coarse_ref_rows > coarse_rows || coarse_ref_cols > coarse_cols {
            return scan(page, &integral, reference, 0..last_row + 1, 0..last_col + 1);
        }

        trace!("Coarse search at 1/{} scale", factor);
        let coarse_integral = Integral::new(&coarse_page);
        let coarse = scan(
            &coarse_page,
            &coarse_integral,
            &coarse_ref,
            0..coarse_rows - coarse_ref_rows + 1,
            0..coarse_cols - coarse_ref_cols + 1,
        );

        let mut refined = [None; 3];
        for (i, method) in MatchMethod::ALL.iter().enumerate() {
            let Some(seed) = coarse[i] else {
                continue;
            };
            let center_row = seed.row * factor;
            let center_col = seed.col * factor;
            let rows = center_row.saturating_sub(factor)..(center_row + factor).min(last_row) + 1;
            let cols = center_col.saturating_sub(factor)..(center_col + factor).min(last_col) + 1;
            refined[i] = scan(page, &integral, reference, rows, cols)[i];
            trace!("{:?}: refined {:?} -> {:?}", method, seed, refined[i]);
        }
        refined
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate all three measures over a window of top-left positions.
fn scan(
    page: &Intensity,
    integral: &Integral,
    reference: &Intensity,
    rows: Range<usize>,
    cols: Range<usize>,
) -> [Option<Optimum>; 3] {
    let (ref_rows, ref_cols) = reference.dim();
    let n = (ref_rows * ref_cols) as f64;
    let ref_sum = reference.sum();
    let ref_squares = reference.fold(0.0, |acc, v| acc + v * v);
    let ref_variance = ref_squares - ref_sum * ref_sum / n;

    let mut optima: [Option<Optimum>; 3] = [None; 3];

    for row in rows {
        for col in cols.clone() {
            let window = page.slice(s![row..row + ref_rows, col..col + ref_cols]);
            let cross = Zip::from(&window)
                .and(reference)
                .fold(0.0, |acc, &p, &t| acc + p * t);

            let sum = Integral::window(&integral.sum, row, col, ref_rows, ref_cols);
            let squares = Integral::window(&integral.squares, row, col, ref_rows, ref_cols);
            let energy = (ref_squares * squares).sqrt();
            let variance = squares - sum * sum / n;

            let raw = [
                cross / energy,
                (cross - ref_sum * sum / n) / (ref_variance * variance).sqrt(),
                (ref_squares + squares - 2.0 * cross) / energy,
            ];

            for (i, method) in MatchMethod::ALL.iter().enumerate() {
                let value = raw[i];
                if !value.is_finite() {
                    continue;
                }
                let better = match optima[i] {
                    None => true,
                    Some(current) if method.minimizes() => value < current.raw,
                    Some(current) => value > current.raw,
                };
                if better {
                    optima[i] = Some(Optimum { row, col, raw: value });
                }
            }
        }
    }

    optima
}

/// Box-average downsample by an integer factor.
fn downsample(image: &Intensity, factor: usize) -> Intensity {
    let (rows, cols) = image.dim();
    let area = (factor * factor) as f64;
    Array2::from_shape_fn((rows / factor, cols / factor), |(r, c)| {
        image
            .slice(s![r * factor..(r + 1) * factor, c * factor..(c + 1) * factor])
            .sum()
            / area
    })
}

/// Keep finite scores in `[0, 1]`, absorbing rounding overshoot.
fn accept_score(score: f64) -> Option<f64> {
    if !score.is_finite() || score < 0.0 || score > 1.0 + SCORE_EPSILON {
        return None;
    }
    Some(score.min(1.0))
}

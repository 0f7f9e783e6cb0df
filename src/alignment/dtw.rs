//! Windowed DTW kernel.
//!
//! Computes a minimum-cost monotone correspondence between two MFCC
//! sequences inside a band constraint. The band is either the diagonal
//! Sakoe-Chiba band or, on refinement passes, a per-row band centered on the
//! previous pass's path. Only the in-band cells are stored: one fixed-width
//! slab of `2W+1` cells per reference row.

use crate::error::AlignmentError;

use super::path::AlignmentPath;

/// Euclidean (L2) distance between two feature vectors. The default frame
/// cost.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    let sum: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum();
    sum.sqrt()
}

/// Bytes the banded cost matrix will occupy for the given shape. Callers may
/// warn or abort before the allocation happens.
pub fn estimate_banded_matrix_bytes(
    reference_frames: usize,
    source_frames: usize,
    half_width: usize,
) -> u64 {
    let width = (2 * half_width + 1).min(source_frames.max(1));
    reference_frames as u64 * width as u64 * std::mem::size_of::<f32>() as u64
}

/// Aligns `reference` to `source` with the default Euclidean frame cost.
///
/// `half_width` is the band half-width in frames; `centers`, when present,
/// gives a per-reference-row center column for the band (one entry per
/// reference frame). Without it the band follows the matrix diagonal.
pub fn align_mfcc_dtw(
    reference: &[Vec<f32>],
    source: &[Vec<f32>],
    half_width: usize,
    centers: Option<&[usize]>,
) -> Result<AlignmentPath, AlignmentError> {
    align_mfcc_dtw_with_cost(reference, source, half_width, centers, |a, b| {
        euclidean_distance(a, b)
    })
}

/// Aligns `reference` to `source` with a caller-provided frame cost.
pub fn align_mfcc_dtw_with_cost<F>(
    reference: &[Vec<f32>],
    source: &[Vec<f32>],
    half_width: usize,
    centers: Option<&[usize]>,
    cost_fn: F,
) -> Result<AlignmentPath, AlignmentError>
where
    F: Fn(&[f32], &[f32]) -> f32,
{
    let reference_len = reference.len();
    let source_len = source.len();
    if reference_len == 0 || source_len == 0 {
        return Err(AlignmentError::invalid_input(
            "DTW requires non-empty MFCC sequences",
        ));
    }
    if let Some(centers) = centers {
        if centers.len() != reference_len {
            return Err(AlignmentError::invalid_input(format!(
                "band centers length {} does not match reference frame count {}",
                centers.len(),
                reference_len
            )));
        }
    }

    let half_width = half_width.max(1);
    let mut matrix = BandedMatrix::new(reference_len, source_len, half_width, centers);

    // Row 0 seeds directionally: only left predecessors exist.
    let (row_lo, row_hi) = matrix.band(0);
    let mut accumulated = 0.0f32;
    for j in row_lo..=row_hi {
        accumulated += cost_fn(&reference[0], &source[j]);
        matrix.set(0, j, accumulated);
    }

    for i in 1..reference_len {
        let (row_lo, row_hi) = matrix.band(i);
        let (prev_lo, prev_hi) = matrix.band(i - 1);
        for j in row_lo..=row_hi {
            let cost = cost_fn(&reference[i], &source[j]);
            let up = matrix.get(i - 1, j);
            let diagonal = if j > 0 { matrix.get(i - 1, j - 1) } else { None };
            let left = if j > row_lo { matrix.get(i, j - 1) } else { None };
            let predecessor = match min_predecessor(diagonal, up, left) {
                Some((value, _)) => value,
                // Band gap between this row and the previous one. Widen
                // locally by clamping to the previous row's band edge so the
                // end cell stays reachable.
                None => matrix.at(i - 1, j.clamp(prev_lo, prev_hi)),
            };
            matrix.set(i, j, cost + predecessor);
        }
    }

    Ok(backtrack(&matrix, reference_len, source_len))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Diagonal,
    Up,
    Left,
}

/// Minimum of the available predecessors. Ties resolve in the fixed order
/// diagonal, up, left.
fn min_predecessor(
    diagonal: Option<f32>,
    up: Option<f32>,
    left: Option<f32>,
) -> Option<(f32, Step)> {
    let mut best: Option<(f32, Step)> = None;
    for (value, step) in [
        (diagonal, Step::Diagonal),
        (up, Step::Up),
        (left, Step::Left),
    ] {
        let Some(value) = value else { continue };
        match best {
            Some((best_value, _)) if value >= best_value => {}
            _ => best = Some((value, step)),
        }
    }
    best
}

fn backtrack(matrix: &BandedMatrix, reference_len: usize, source_len: usize) -> AlignmentPath {
    let mut path = AlignmentPath::with_capacity(reference_len + source_len);
    let mut i = reference_len - 1;
    let mut j = source_len - 1;
    path.push((i, j));

    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diagonal = matrix.get(i - 1, j - 1);
            let up = matrix.get(i - 1, j);
            let left = matrix.get(i, j - 1);
            match min_predecessor(diagonal, up, left) {
                Some((_, Step::Diagonal)) => {
                    i -= 1;
                    j -= 1;
                }
                Some((_, Step::Up)) => i -= 1,
                Some((_, Step::Left)) => j -= 1,
                None => {
                    // All predecessors out of band: step toward the previous
                    // row's band one cell at a time so the path stays
                    // gap-free.
                    let (_, prev_hi) = matrix.band(i - 1);
                    if j > prev_hi {
                        j -= 1;
                    } else {
                        i -= 1;
                    }
                }
            }
        }
        path.push((i, j));
    }

    path.reverse();
    path
}

/// Ragged cost matrix storing only the in-band cells: `width` cells per
/// reference row, starting at `row_start[i]`.
struct BandedMatrix {
    row_start: Vec<usize>,
    width: usize,
    values: Vec<f32>,
}

impl BandedMatrix {
    fn new(
        reference_len: usize,
        source_len: usize,
        half_width: usize,
        centers: Option<&[usize]>,
    ) -> Self {
        // A single-row matrix must span the full source axis to keep both
        // corners in band.
        let width = if reference_len == 1 {
            source_len
        } else {
            (2 * half_width + 1).min(source_len)
        };

        let mut row_start = Vec::with_capacity(reference_len);
        for i in 0..reference_len {
            let center = match centers {
                Some(centers) => centers[i].min(source_len - 1),
                None => {
                    ((i as f64 * source_len as f64) / reference_len as f64).round() as usize
                }
            };
            row_start.push(center.saturating_sub(half_width).min(source_len - width));
        }
        // The path must start at (0, 0) and end at the opposite corner;
        // shift the boundary rows' bands to guarantee both are in band.
        row_start[0] = 0;
        if let Some(last) = row_start.last_mut() {
            *last = source_len - width;
        }

        Self {
            row_start,
            width,
            values: vec![f32::INFINITY; reference_len * width],
        }
    }

    /// Inclusive column range of row `i`'s band.
    fn band(&self, i: usize) -> (usize, usize) {
        let start = self.row_start[i];
        (start, start + self.width - 1)
    }

    fn get(&self, i: usize, j: usize) -> Option<f32> {
        let start = self.row_start[i];
        if j < start || j >= start + self.width {
            return None;
        }
        Some(self.values[i * self.width + (j - start)])
    }

    /// In-band access; callers guarantee `j` is inside row `i`'s band.
    fn at(&self, i: usize, j: usize) -> f32 {
        debug_assert!(j >= self.row_start[i] && j < self.row_start[i] + self.width);
        self.values[i * self.width + (j - self.row_start[i])]
    }

    fn set(&mut self, i: usize, j: usize, value: f32) {
        debug_assert!(j >= self.row_start[i] && j < self.row_start[i] + self.width);
        self.values[i * self.width + (j - self.row_start[i])] = value;
    }
}

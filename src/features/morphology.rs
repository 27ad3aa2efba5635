//! Grey and binary morphology on spectrograms
//!
//! The peak extractor needs two neighborhood operations over a diamond
//! footprint: a maximum filter (with symmetric reflection at the borders)
//! and a binary erosion of the zero-background mask (with the outside of the
//! matrix counted as background).

use super::spectrogram::Spectrogram;

/// Neighborhood shape: a 4-connected cross grown by repeated dilation
///
/// Growing the 3x3 cross `n` times yields the diamond `|df| + |dt| <= n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    radius: usize,
    offsets: Vec<(isize, isize)>,
}

impl Footprint {
    /// Build the footprint by dilating a 3x3 cross with itself
    ///
    /// `iterations` of 0 or 1 both give the bare cross.
    pub fn grown_cross(iterations: usize) -> Self {
        let radius = iterations.max(1);
        let side = 2 * radius + 1;
        let center = radius as isize;

        let mut mask = vec![false; side * side];
        let at = |r: isize, c: isize| (r as usize) * side + c as usize;
        mask[at(center, center)] = true;

        let cross = [(0isize, 0isize), (-1, 0), (1, 0), (0, -1), (0, 1)];
        for _ in 0..radius {
            let mut grown = mask.clone();
            for r in 0..side as isize {
                for c in 0..side as isize {
                    if !mask[at(r, c)] {
                        continue;
                    }
                    for (dr, dc) in cross {
                        let (nr, nc) = (r + dr, c + dc);
                        if nr >= 0 && nc >= 0 && nr < side as isize && nc < side as isize {
                            grown[at(nr, nc)] = true;
                        }
                    }
                }
            }
            mask = grown;
        }

        let offsets = (0..side as isize)
            .flat_map(|r| (0..side as isize).map(move |c| (r, c)))
            .filter(|&(r, c)| mask[at(r, c)])
            .map(|(r, c)| (r - center, c - center))
            .collect();

        Self { radius, offsets }
    }

    /// Diamond radius in cells
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Relative (freq, time) offsets covered by the footprint, center included
    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Binary erosion of the zero-background mask at one cell
    ///
    /// True when every in-bounds cell under the footprint is exactly zero.
    /// Cells beyond the matrix edge count as background.
    pub fn is_eroded_background(&self, spec: &Spectrogram, freq: usize, time: usize) -> bool {
        let (rows, cols) = (spec.freq_bins() as isize, spec.time_bins() as isize);
        self.offsets.iter().all(|&(df, dt)| {
            let (f, t) = (freq as isize + df, time as isize + dt);
            if f < 0 || t < 0 || f >= rows || t >= cols {
                return true;
            }
            spec.get(f as usize, t as usize) == 0.0
        })
    }
}

/// Maximum filter over `footprint` with symmetric reflection at the borders
///
/// The diamond is the cross dilated `radius` times, so the filter is the 3x3
/// cross filter applied `radius` times. For a one-cell reach, reflection is
/// the same as clamping to the edge.
///
/// # Returns
///
/// Row-major filtered values with the same layout as [`Spectrogram::values`]
pub fn maximum_filter(spec: &Spectrogram, footprint: &Footprint) -> Vec<f32> {
    let (rows, cols) = (spec.freq_bins(), spec.time_bins());
    let mut current = spec.values().to_vec();

    if rows == 0 || cols == 0 {
        return current;
    }

    let mut next = vec![0.0f32; current.len()];
    for _ in 0..footprint.radius() {
        for f in 0..rows {
            let up = f.saturating_sub(1);
            let down = (f + 1).min(rows - 1);
            for t in 0..cols {
                let left = t.saturating_sub(1);
                let right = (t + 1).min(cols - 1);

                let value = current[f * cols + t]
                    .max(current[up * cols + t])
                    .max(current[down * cols + t])
                    .max(current[f * cols + left])
                    .max(current[f * cols + right]);
                next[f * cols + t] = value;
            }
        }
        std::mem::swap(&mut current, &mut next);
    }

    current
}

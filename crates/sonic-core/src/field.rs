//! Scalar height-field synthesis.
//!
//! Every frame the grid is rebuilt from coherent noise, additive species
//! influence kernels and a pointer depression. Only the noise phase carries
//! over between frames, and that lives with the caller.

use crate::config::FieldParams;
use crate::species::Species;
use glam::Vec2;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Cubic smoothstep of a linear falloff: 1 at the center, 0 at `radius`.
#[inline]
pub fn smooth_falloff(dist: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 0.0;
    }
    let i = (1.0 - dist / radius).max(0.0);
    i * i * (3.0 - 2.0 * i)
}

/// Dense grid of vertex heights in [0,1], row-major, `(rows + 1) x (cols + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl Field {
    pub fn filled(cols: usize, rows: usize, value: f32) -> Self {
        Self {
            cols,
            rows,
            values: vec![value; (cols + 1) * (rows + 1)],
        }
    }

    /// Build a field from explicit vertex rows; every row must hold the same
    /// number of values and there must be at least two rows and columns.
    pub fn from_rows(rows: &[Vec<f32>]) -> Option<Self> {
        let width = rows.first()?.len();
        if rows.len() < 2 || width < 2 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self {
            cols: width - 1,
            rows: rows.len() - 1,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    /// Number of cells along x.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells along y.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.values[row * (self.cols + 1) + col]
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Corner values of cell `(row, col)` as `[top-left, top-right, bottom-right, bottom-left]`.
    #[inline]
    pub fn cell_corners(&self, row: usize, col: usize) -> [f32; 4] {
        [
            self.at(row, col),
            self.at(row, col + 1),
            self.at(row + 1, col + 1),
            self.at(row + 1, col),
        ]
    }

    /// Field value under a screen-space pointer, used for the depth readout.
    ///
    /// The pointer is mapped to a cell index clamped to the grid; the value
    /// of that cell's top-left vertex is returned. Non-finite input reads 0.5.
    pub fn sample_at_pointer(&self, pointer: Vec2, width: f32, height: f32) -> f32 {
        if !pointer.is_finite() || width <= 0.0 || height <= 0.0 {
            return 0.5;
        }
        let cell_w = width / self.cols as f32;
        let cell_h = height / self.rows as f32;
        let last_col = self.cols.saturating_sub(1) as f32;
        let last_row = self.rows.saturating_sub(1) as f32;
        let cx = (pointer.x / cell_w).clamp(0.0, last_col).floor() as usize;
        let cy = (pointer.y / cell_h).clamp(0.0, last_row).floor() as usize;
        self.at(cy, cx)
    }
}

/// Per-frame inputs to [`FieldGenerator::generate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldInput {
    /// Monotonic noise phase (advanced by the caller once per frame).
    pub time: f64,
    /// Pointer position in normalized [0,1] space.
    pub pointer: Vec2,
    /// Pointer displacement since the previous frame, in pixels.
    pub pointer_speed: f32,
    /// While dragging, the pointer does not depress the field.
    pub dragging: bool,
}

pub struct FieldGenerator {
    noise: Fbm<Perlin>,
    params: FieldParams,
}

impl FieldGenerator {
    /// Grids smaller than one cell are widened to one cell.
    pub fn new(mut params: FieldParams) -> Self {
        params.cols = params.cols.max(1);
        params.rows = params.rows.max(1);
        let noise = Fbm::<Perlin>::new(params.noise_seed)
            .set_octaves(params.noise_octaves.max(1))
            .set_persistence(0.5);
        Self { noise, params }
    }

    #[inline]
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// Coherent noise remapped to [0,1].
    #[inline]
    fn base_value(&self, nx: f64, ny: f64, time: f64) -> f32 {
        let [kx, ky] = self.params.noise_scale;
        let [ta, tb, tc] = self.params.noise_rates;
        let n = self
            .noise
            .get([nx * kx + time * ta, ny * ky + time * tb, time * tc]);
        ((n * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Strength of the pointer depression for a pointer moving `speed_px` per frame.
    #[inline]
    pub fn depression_strength(&self, speed_px: f32) -> f32 {
        let boost = (speed_px.max(0.0) * self.params.speed_scale).min(self.params.speed_boost_max);
        self.params.depression_base + boost
    }

    pub fn generate(&self, input: &FieldInput, species: &[Species]) -> Field {
        let cols = self.params.cols;
        let rows = self.params.rows;
        let depression = self.depression_strength(input.pointer_speed);
        let mut values = Vec::with_capacity((cols + 1) * (rows + 1));
        for r in 0..=rows {
            let ny = r as f32 / rows as f32;
            for c in 0..=cols {
                let nx = c as f32 / cols as f32;
                let p = Vec2::new(nx, ny);
                let mut v = self.base_value(nx as f64, ny as f64, input.time);
                // Kernels superpose; clamping happens once at the end.
                for sp in species {
                    let soft = smooth_falloff(p.distance(sp.position()), sp.radius);
                    v += soft * sp.depth * self.params.species_weight;
                }
                if !input.dragging {
                    let soft =
                        smooth_falloff(p.distance(input.pointer), self.params.pointer_radius);
                    v -= soft * depression;
                }
                values.push(if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) });
            }
        }
        Field { cols, rows, values }
    }
}

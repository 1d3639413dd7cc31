//! Animated bicubic Bezier patch (the flag).
//!
//! The 4x4 control grid is regenerated from simulation time every frame and
//! uploaded whole. Evaluation of the patch happens in the surface vertex
//! shader over a fixed (u, v) lattice; [`ControlGrid::evaluate`] is the same
//! math on the CPU.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Control points per side
pub const GRID_SIZE: usize = 4;
pub const CONTROL_POINT_COUNT: usize = GRID_SIZE * GRID_SIZE;
/// Polynomial degree in both directions
pub const DEGREE: usize = GRID_SIZE - 1;

pub const DEFAULT_TESSELLATION_LEVEL: u32 = 16;
/// Upper bound on lattice segments per side; keeps index math inside u32
pub const MAX_TESSELLATION_LEVEL: u32 = 256;

/// Vertical step between columns
const ROW_RISE: f32 = 0.5;

/// How the x coordinate of a control point is derived from its row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpacing {
    /// x = i, one world unit per row
    #[default]
    RowIndex,
    /// x = i / (N - 1), same parametrization as the texture coordinates
    Normalized,
}

impl GridSpacing {
    fn x(self, row: usize) -> f32 {
        match self {
            GridSpacing::RowIndex => row as f32,
            GridSpacing::Normalized => row as f32 / DEGREE as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPoint {
    pub position: Vec3,
    pub tex_coords: Vec2,
}

/// A point on the evaluated patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Vec3,
    pub tex_coords: Vec2,
    pub normal: Vec3,
}

/// Row-major grid: `points[i][j]` is row `i`, column `j`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlGrid {
    pub points: [[ControlPoint; GRID_SIZE]; GRID_SIZE],
}

impl ControlGrid {
    /// Rebuild every control point for simulation time `time` (seconds)
    pub fn generate(time: f32, spacing: GridSpacing) -> Self {
        let (sin_t, cos_t) = time.sin_cos();
        let mut points = [[ControlPoint::default(); GRID_SIZE]; GRID_SIZE];

        for (i, row) in points.iter_mut().enumerate() {
            for (j, point) in row.iter_mut().enumerate() {
                let base = j as f32 * ROW_RISE;
                let y = match i {
                    1 => base + cos_t,
                    2 => base + sin_t,
                    _ => base,
                };
                let z = match j {
                    1 => cos_t,
                    2 => sin_t,
                    _ => 0.0,
                };
                point.position = Vec3::new(spacing.x(i), y, z);
                point.tex_coords = Vec2::new(i as f32 / DEGREE as f32, j as f32 / DEGREE as f32);
            }
        }

        Self { points }
    }

    pub fn point(&self, row: usize, column: usize) -> &ControlPoint {
        &self.points[row][column]
    }

    /// Flattened in upload order (row-major)
    pub fn iter(&self) -> impl Iterator<Item = &ControlPoint> {
        self.points.iter().flat_map(|row| row.iter())
    }

    /// Bicubic Bernstein evaluation. `u` runs along rows, `v` along columns.
    pub fn evaluate(&self, u: f32, v: f32) -> SurfaceSample {
        let (bu, du) = (bernstein(u), bernstein_derivative(u));
        let (bv, dv) = (bernstein(v), bernstein_derivative(v));

        let mut position = Vec3::ZERO;
        let mut tex_coords = Vec2::ZERO;
        let mut d_du = Vec3::ZERO;
        let mut d_dv = Vec3::ZERO;

        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                let point = &self.points[i][j];
                position += point.position * bu[i] * bv[j];
                tex_coords += point.tex_coords * bu[i] * bv[j];
                d_du += point.position * du[i] * bv[j];
                d_dv += point.position * bu[i] * dv[j];
            }
        }

        SurfaceSample {
            position,
            tex_coords,
            normal: d_du.cross(d_dv).normalize_or_zero(),
        }
    }
}

/// Cubic Bernstein basis at `t`
pub fn bernstein(t: f32) -> [f32; GRID_SIZE] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

/// Derivative of the cubic Bernstein basis at `t`
pub fn bernstein_derivative(t: f32) -> [f32; GRID_SIZE] {
    let s = 1.0 - t;
    [
        -3.0 * s * s,
        3.0 * s * s - 6.0 * t * s,
        6.0 * t * s - 3.0 * t * t,
        3.0 * t * t,
    ]
}

/// World placement of the flag
pub fn flag_matrix() -> Mat4 {
    Mat4::from_translation(Vec3::new(10.5, 2.0, -23.5))
        * Mat4::from_scale(Vec3::splat(0.4))
        * Mat4::from_rotation_y((-90f32).to_radians())
}

/// Static (u, v) lattice the surface shader evaluates the patch over
#[derive(Debug, Clone)]
pub struct TessellationMesh {
    pub level: u32,
    pub vertices: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl TessellationMesh {
    /// `level` segments per side, clamped to `1..=MAX_TESSELLATION_LEVEL`
    pub fn new(level: u32) -> Self {
        let level = level.clamp(1, MAX_TESSELLATION_LEVEL);
        let side = level + 1;

        let vertices = (0..side)
            .flat_map(|i| {
                (0..side).map(move |j| [i as f32 / level as f32, j as f32 / level as f32])
            })
            .collect();

        let indices = (0..level)
            .flat_map(|i| {
                (0..level).flat_map(move |j| {
                    let a = i * side + j;
                    let b = a + side;
                    [a, b, a + 1, a + 1, b, b + 1]
                })
            })
            .collect();

        Self {
            level,
            vertices,
            indices,
        }
    }
}

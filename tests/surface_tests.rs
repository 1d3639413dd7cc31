use car_scene::surface::{
    flag_matrix, ControlGrid, GridSpacing, TessellationMesh, DEGREE, GRID_SIZE,
    MAX_TESSELLATION_LEVEL,
};
use car_scene::types::SurfaceUniforms;
use glam::{Vec2, Vec3};

const EPS: f32 = 1e-4;

#[cfg(test)]
mod control_grid_tests {
    use super::*;

    #[test]
    fn test_row_heights_follow_time() {
        for t in [0.0f32, 0.7, 2.5, 11.0] {
            let grid = ControlGrid::generate(t, GridSpacing::RowIndex);
            for j in 0..GRID_SIZE {
                let base = j as f32 * 0.5;
                let expected = [base, base + t.cos(), base + t.sin(), base];
                for (i, y) in expected.into_iter().enumerate() {
                    let actual = grid.point(i, j).position.y;
                    assert!((actual - y).abs() < EPS, "t {t}, cell ({i}, {j}): {actual} != {y}");
                }
            }
        }
    }

    #[test]
    fn test_generate_is_periodic() {
        let a = ControlGrid::generate(0.4, GridSpacing::RowIndex);
        let b = ControlGrid::generate(0.4 + std::f32::consts::TAU, GridSpacing::RowIndex);
        for (p, q) in a.iter().zip(b.iter()) {
            assert!((p.position - q.position).length() < EPS);
        }
    }

    #[test]
    fn test_spacing_only_changes_x() {
        let rows = ControlGrid::generate(1.5, GridSpacing::RowIndex);
        let unit = ControlGrid::generate(1.5, GridSpacing::Normalized);
        for i in 0..GRID_SIZE {
            for j in 0..GRID_SIZE {
                let (p, q) = (rows.point(i, j), unit.point(i, j));
                assert_eq!(p.position.x, i as f32);
                assert!((q.position.x - i as f32 / DEGREE as f32).abs() < EPS);
                assert_eq!((p.position.y, p.position.z), (q.position.y, q.position.z));
                assert_eq!(p.tex_coords, q.tex_coords);
            }
        }
    }

    #[test]
    fn test_tex_coords_span_unit_square() {
        let grid = ControlGrid::generate(0.0, GridSpacing::RowIndex);
        assert_eq!(grid.point(0, 0).tex_coords, Vec2::ZERO);
        assert_eq!(grid.point(DEGREE, DEGREE).tex_coords, Vec2::ONE);
    }
}

#[cfg(test)]
mod evaluation_tests {
    use super::*;

    #[test]
    fn test_patch_interpolates_corners() {
        let grid = ControlGrid::generate(0.9, GridSpacing::RowIndex);
        for (u, v, i, j) in [(0.0, 0.0, 0, 0), (1.0, 0.0, DEGREE, 0), (0.0, 1.0, 0, DEGREE), (1.0, 1.0, DEGREE, DEGREE)] {
            let sample = grid.evaluate(u, v);
            assert!((sample.position - grid.point(i, j).position).length() < EPS);
            assert!((sample.tex_coords - grid.point(i, j).tex_coords).length() < EPS);
        }
    }

    #[test]
    fn test_normals_are_unit() {
        let grid = ControlGrid::generate(0.3, GridSpacing::RowIndex);
        for (u, v) in [(0.25, 0.25), (0.5, 0.5), (0.8, 0.1)] {
            assert!((grid.evaluate(u, v).normal.length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_flat_grid_has_z_normal() {
        // flatten into the z = 0 plane
        let mut grid = ControlGrid::generate(0.0, GridSpacing::RowIndex);
        for row in grid.points.iter_mut() {
            for point in row.iter_mut() {
                point.position.z = 0.0;
                point.position.y = point.tex_coords.y;
            }
        }
        let normal = grid.evaluate(0.5, 0.5).normal;
        assert!((normal.abs() - Vec3::Z).length() < EPS);
    }
}

#[cfg(test)]
mod gpu_layout_tests {
    use super::*;

    #[test]
    fn test_lattice_covers_unit_square() {
        let mesh = TessellationMesh::new(8);
        assert_eq!(mesh.vertices.len(), 81);
        assert_eq!(mesh.indices.len(), 8 * 8 * 6);
        assert!(mesh.vertices.contains(&[0.0, 0.0]));
        assert!(mesh.vertices.contains(&[1.0, 1.0]));
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_zero_level_is_one_quad() {
        let mesh = TessellationMesh::new(0);
        assert_eq!(mesh.level, 1);
        assert_eq!(mesh.indices.len(), 6);
    }

    #[test]
    fn test_huge_level_is_capped() {
        let mesh = TessellationMesh::new(u32::MAX);
        assert_eq!(mesh.level, MAX_TESSELLATION_LEVEL);
        let side = (MAX_TESSELLATION_LEVEL + 1) as usize;
        assert_eq!(mesh.vertices.len(), side * side);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_uniforms_hold_grid_row_major() {
        let grid = ControlGrid::generate(1.1, GridSpacing::RowIndex);
        let mut uniforms = SurfaceUniforms::default();
        uniforms.set_control_grid(&grid);

        let k = 2 * GRID_SIZE + 1;
        let p = grid.point(2, 1).position;
        assert_eq!(&uniforms.control_points[k][..3], &p.to_array()[..]);
        assert_eq!(uniforms.u_degree, DEGREE as i32);
    }

    #[test]
    fn test_flag_sits_above_ground() {
        let origin = flag_matrix().transform_point3(Vec3::ZERO);
        assert!(origin.y > 0.0);
    }
}

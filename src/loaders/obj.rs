use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::{compute_normals, MaterialData, MeshData, ModelData, TextureSource};
use crate::mesh::ModelVertex;

/// Load a Wavefront OBJ with its MTL. Texture paths are resolved against the
/// OBJ's directory and decoded later by the renderer.
pub fn load_obj_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    log::info!("Loading OBJ model: {:?}", path);

    let (models, obj_materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)
        .with_context(|| format!("Failed to load OBJ file: {:?}", path))?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut materials: Vec<MaterialData> = match obj_materials {
        Ok(materials) => materials
            .into_iter()
            .map(|m| MaterialData {
                diffuse: texture_path(&base_dir, m.diffuse_texture.as_deref()),
                specular: texture_path(&base_dir, m.specular_texture.as_deref()),
                name: m.name,
            })
            .collect(),
        Err(e) => {
            log::warn!("No usable MTL for {:?}: {}", path, e);
            Vec::new()
        }
    };

    let default_material = materials.len();
    materials.push(MaterialData {
        name: "default".to_string(),
        ..Default::default()
    });

    let meshes = models
        .into_iter()
        .map(|model| convert_mesh(model, default_material))
        .collect();

    let model = ModelData { meshes, materials };
    log::info!(
        "Loaded {:?}: {} meshes, {} triangles",
        path,
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

fn texture_path(base_dir: &Path, name: Option<&str>) -> Option<TextureSource> {
    let name = name.filter(|n| !n.is_empty())?;
    // MTL files exported on Windows often use backslashes
    let relative: PathBuf = name.split(['\\', '/']).collect();
    Some(TextureSource::File(base_dir.join(relative)))
}

fn convert_mesh(model: tobj::Model, default_material: usize) -> MeshData {
    let mesh = model.mesh;
    let vertex_count = mesh.positions.len() / 3;
    let has_normals = mesh.normals.len() == mesh.positions.len();

    let mut vertices: Vec<ModelVertex> = (0..vertex_count)
        .map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            normal: if has_normals {
                [
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                ]
            } else {
                [0.0; 3]
            },
            // OBJ v runs bottom to top
            tex_coords: [
                mesh.texcoords.get(i * 2).copied().unwrap_or(0.0),
                1.0 - mesh.texcoords.get(i * 2 + 1).copied().unwrap_or(0.0),
            ],
        })
        .collect();

    if !has_normals {
        compute_normals(&mut vertices, &mesh.indices);
    }

    MeshData {
        name: model.name,
        vertices,
        indices: mesh.indices,
        material: mesh.material_id.unwrap_or(default_material),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("car-scene-obj-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_quad_without_mtl() {
        let path = write_temp(
            "quad.obj",
            "v 0 0 0\nv 1 0 0\nv 1 0 -1\nv 0 0 -1\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nf 1/1 2/2 3/3 4/4\n",
        );
        let model = load_obj_model(&path).unwrap();

        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.triangle_count(), 2);
        assert_eq!(model.materials.len(), 1);
        assert_eq!(model.meshes[0].material, 0);

        let mesh = &model.meshes[0];
        // computed normals point up, v is flipped
        assert!(mesh.vertices.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
        assert!(mesh.vertices.iter().any(|v| v.tex_coords == [0.0, 1.0]));
    }

    #[test]
    fn test_texture_paths_are_relative_to_obj() {
        let source = texture_path(Path::new("assets/map"), Some("textures\\wall.png"));
        assert_eq!(
            source,
            Some(TextureSource::File(PathBuf::from("assets/map/textures/wall.png")))
        );
        assert_eq!(texture_path(Path::new("x"), Some("")), None);
    }

    #[test]
    fn test_missing_obj_is_an_error() {
        assert!(load_obj_model("/no/such/map.obj").is_err());
    }
}

use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use std::path::Path;

use super::texture::ImageData;
use super::{compute_normals, MaterialData, MeshData, ModelData, TextureSource};
use crate::mesh::ModelVertex;

/// Load every mesh of the default scene (or all scenes), baking node transforms
/// into vertex positions and normals
pub fn load_gltf_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    log::info!("Loading glTF model: {:?}", path);

    let (document, buffers, images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    log::debug!(
        "glTF {:?}: {} nodes, {} meshes, {} materials, {} images",
        path,
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count(),
        images.len()
    );

    let textures: Vec<Option<ImageData>> = images.iter().enumerate().map(convert_image).collect();

    let mut materials: Vec<MaterialData> = document
        .materials()
        .map(|material| {
            let diffuse = material
                .pbr_metallic_roughness()
                .base_color_texture()
                .and_then(|info| textures.get(info.texture().source().index()).cloned().flatten())
                .map(TextureSource::Embedded);

            MaterialData {
                name: material.name().unwrap_or("unnamed").to_string(),
                diffuse,
                specular: None,
            }
        })
        .collect();

    // Primitives without a material use the trailing untextured entry
    let default_material = materials.len();
    materials.push(MaterialData {
        name: "default".to_string(),
        ..Default::default()
    });

    let mut meshes = Vec::new();
    let scenes: Vec<gltf::Scene> = match document.default_scene() {
        Some(scene) => vec![scene],
        None => document.scenes().collect(),
    };
    for scene in scenes {
        for node in scene.nodes() {
            process_node(&node, &buffers, Mat4::IDENTITY, default_material, &mut meshes)?;
        }
    }

    let model = ModelData { meshes, materials };
    log::info!(
        "Loaded {:?}: {} meshes, {} triangles",
        path,
        model.meshes.len(),
        model.triangle_count()
    );
    Ok(model)
}

fn convert_image((index, image): (usize, &gltf::image::Data)) -> Option<ImageData> {
    use gltf::image::Format;

    let channels = match image.format {
        Format::R8 => 1,
        Format::R8G8 => 2,
        Format::R8G8B8 => 3,
        Format::R8G8B8A8 => 4,
        other => {
            log::warn!("glTF image {}: unsupported format {:?}, left untextured", index, other);
            return None;
        }
    };

    let converted = ImageData::from_channels(image.width, image.height, channels, &image.pixels);
    if converted.is_none() {
        log::warn!("glTF image {}: pixel data does not match its size", index);
    }
    converted
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: Mat4,
    default_material: usize,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, global_transform, default_material, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, global_transform, default_material, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: Mat4,
    default_material: usize,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
    let name = mesh.name().unwrap_or("mesh");

    for (primitive_index, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!("Skipping non-triangle primitive {} of {}", primitive_index, name);
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        let normals: Option<Vec<Vec3>> = reader.read_normals().map(|normals| {
            normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect()
        });

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let mut vertices = assemble_vertices(&positions, normals.as_deref(), &uvs);

        if normals.is_none() {
            compute_normals(&mut vertices, &indices);
        }

        meshes.push(MeshData {
            name: format!("{}#{}", name, primitive_index),
            vertices,
            indices,
            material: primitive.material().index().unwrap_or(default_material),
        });
    }

    Ok(())
}

/// Zip per-vertex attributes. Short normal or uv streams pad with zeros.
fn assemble_vertices(
    positions: &[Vec3],
    normals: Option<&[Vec3]>,
    uvs: &[[f32; 2]],
) -> Vec<ModelVertex> {
    positions
        .iter()
        .enumerate()
        .map(|(i, position)| ModelVertex {
            position: position.to_array(),
            normal: normals
                .and_then(|n| n.get(i))
                .map_or([0.0; 3], |n| n.to_array()),
            tex_coords: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect()
}

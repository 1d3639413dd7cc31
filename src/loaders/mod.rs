//! CPU-side asset loading: models and images, no GPU access.

pub mod gltf;
pub mod obj;
pub mod texture;

use anyhow::{bail, Result};
use glam::Vec3;
use std::path::{Path, PathBuf};

use crate::mesh::ModelVertex;

pub use self::gltf::load_gltf_model;
pub use obj::load_obj_model;
pub use texture::{load_image, load_image_or_fallback, ImageData};

/// Where a material's texture comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    File(PathBuf),
    Embedded(ImageData),
}

impl TextureSource {
    /// Decode now; a failure is logged and replaced by the fallback image
    pub fn resolve(&self) -> ImageData {
        match self {
            TextureSource::File(path) => load_image_or_fallback(path),
            TextureSource::Embedded(image) => image.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse: Option<TextureSource>,
    pub specular: Option<TextureSource>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index into `ModelData::materials`
    pub material: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    /// Never empty; models without materials get one untextured entry
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Load a model, picking the loader from the file extension
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("gltf") | Some("glb") => load_gltf_model(path),
        Some("obj") => load_obj_model(path),
        _ => bail!("Unsupported model format: {:?}", path),
    }
}

/// Area-weighted smooth normals, for meshes that ship without any
pub fn compute_normals(vertices: &mut [ModelVertex], indices: &[u32]) {
    let mut normals = vec![Vec3::ZERO; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        if a >= vertices.len() || b >= vertices.len() || c >= vertices.len() {
            continue;
        }
        let pa = Vec3::from_array(vertices[a].position);
        let pb = Vec3::from_array(vertices[b].position);
        let pc = Vec3::from_array(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    for (vertex, normal) in vertices.iter_mut().zip(normals) {
        vertex.normal = normal.normalize_or_zero().to_array();
    }
}

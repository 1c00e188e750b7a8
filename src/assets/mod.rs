use crate::material::MaterialCapabilities;
use crate::parts::{Bounds, PartRegistry};
use crate::textures::{decode_image, TextureResource};
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF {path}: {source}")]
    ParseGltf {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF {path} has no scene")]
    NoScene { path: String },
    #[error("glTF {path} contains no meshes")]
    NoMeshes { path: String },
    #[error("failed to decode texture {path}: {reason}")]
    Texture { path: String, reason: String },
    #[error("environment face {path} is {actual:?}, expected {expected:?}")]
    FaceSize {
        path: String,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// A loaded model: the pickable parts plus the file it came from.
#[derive(Debug)]
pub struct LoadedModel {
    pub name: String,
    pub parts: PartRegistry,
}

pub fn load_model(path: &Path) -> Result<LoadedModel, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("gltf")
        .to_string();
    let parts = parts_from_gltf(&bytes, path.parent(), &path.display().to_string())?;
    log::info!("Loaded model '{}' with {} parts", name, parts.len());
    Ok(LoadedModel { name, parts })
}

/// Registers one part per mesh node of the default scene, in traversal order.
/// External buffers resolve against `base`.
pub fn parts_from_gltf(
    bytes: &[u8],
    base: Option<&Path>,
    path: &str,
) -> Result<PartRegistry, AssetError> {
    let parse_error = |source| AssetError::ParseGltf {
        path: path.to_string(),
        source,
    };
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes).map_err(parse_error)?;
    let buffers = gltf::import_buffers(&document, base, blob).map_err(parse_error)?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene {
            path: path.to_string(),
        })?;

    let mut parts = PartRegistry::new();
    let mut stack: Vec<(gltf::Node, Mat4)> = scene
        .nodes()
        .map(|node| (node, Mat4::IDENTITY))
        .collect();
    stack.reverse();
    while let Some((node, parent)) = stack.pop() {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            if let Some(bounds) = mesh_bounds(&mesh) {
                let capabilities = MaterialCapabilities {
                    emissive: mesh.primitives().all(|primitive| !primitive.material().unlit()),
                };
                let name = node.name().or_else(|| mesh.name());
                let triangles = mesh_triangles(&mesh, &buffers, &world);
                parts.register_mesh(name, bounds.transformed(&world), triangles, capabilities);
            }
        }
        let mut children: Vec<_> = node.children().map(|child| (child, world)).collect();
        children.reverse();
        stack.extend(children);
    }

    if parts.is_empty() {
        return Err(AssetError::NoMeshes {
            path: path.to_string(),
        });
    }
    Ok(parts)
}

fn mesh_bounds(mesh: &gltf::Mesh) -> Option<Bounds> {
    mesh.primitives()
        .map(|primitive| {
            let bbox = primitive.bounding_box();
            Bounds::new(Vec3::from(bbox.min), Vec3::from(bbox.max))
        })
        .reduce(|acc, bounds| acc.union(&bounds))
}

/// Triangle-list primitives in world space. Other topologies are left to the
/// bounding box.
fn mesh_triangles(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    world: &Mat4,
) -> Vec<[Vec3; 3]> {
    let mut triangles = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            continue;
        }
        let reader = primitive
            .reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<Vec3> = positions
            .map(|p| world.transform_point3(Vec3::from(p)))
            .collect();
        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        for corner in indices.chunks_exact(3) {
            let vertex = |i: u32| positions.get(i as usize).copied();
            if let (Some(a), Some(b), Some(c)) =
                (vertex(corner[0]), vertex(corner[1]), vertex(corner[2]))
            {
                triangles.push([a, b, c]);
            }
        }
    }
    triangles
}

/// Six cube-map faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug)]
pub struct EnvironmentMap {
    pub faces: Vec<TextureResource>,
}

impl EnvironmentMap {
    pub fn face_size(&self) -> (u32, u32) {
        self.faces
            .first()
            .map_or((0, 0), |face| (face.width(), face.height()))
    }
}

pub fn load_environment(base_dir: &Path, faces: &[PathBuf; 6]) -> Result<EnvironmentMap, AssetError> {
    let mut loaded: Vec<TextureResource> = Vec::with_capacity(6);
    for face in faces {
        let path = base_dir.join(face);
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let label = face.display().to_string();
        let texture = decode_image(&label, &bytes).map_err(|err| AssetError::Texture {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        if let Some(first) = loaded.first() {
            let expected = (first.width(), first.height());
            let actual = (texture.width(), texture.height());
            if expected != actual {
                return Err(AssetError::FaceSize {
                    path: path.display().to_string(),
                    expected,
                    actual,
                });
            }
        }
        loaded.push(texture);
    }
    log::info!("Loaded environment cube map");
    Ok(EnvironmentMap { faces: loaded })
}

//! Mesh geometry in flat, `-1`-terminated index stream form.
//!
//! [`MeshData`] is the raw geometry a [`Separator`](crate::scene::Separator) is
//! built from. It comes either from the built-in cube or from an OBJ file.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::math::vec3::Vec3;
use crate::scene::FACE_SENTINEL;

/// Error type for mesh loading operations.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load OBJ file {}: {source}", .path.display())]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ file {} contains no faces", .0.display())]
    Empty(PathBuf),
}

/// Points, optional normals and their face index streams.
///
/// `indices` and `normal_indices` list one face after another, each face
/// terminated by `-1`. An empty `normal_indices` means there are no
/// per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub points: Vec<Vec3>,
    pub indices: Vec<i32>,
    pub normals: Vec<Vec3>,
    pub normal_indices: Vec<i32>,
}

// Cube corners, shared by all six faces.
const CUBE_VERTICES: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(-1.0, -1.0, 1.0),
];

// One quad per side, counter-clockwise seen from outside, with its normal.
const CUBE_FACES: [([usize; 4], Vec3); 6] = [
    ([7, 5, 4, 6], Vec3::new(0.0, 0.0, 1.0)),
    ([3, 0, 1, 2], Vec3::new(0.0, 0.0, -1.0)),
    ([5, 3, 2, 4], Vec3::new(1.0, 0.0, 0.0)),
    ([0, 7, 6, 1], Vec3::new(-1.0, 0.0, 0.0)),
    ([6, 4, 2, 1], Vec3::new(0.0, 1.0, 0.0)),
    ([0, 3, 5, 7], Vec3::new(0.0, -1.0, 0.0)),
];

impl MeshData {
    /// The `[-1, 1]³` cube made of six quads with flat per-face normals.
    pub fn cube() -> Self {
        let mut mesh = Self {
            points: CUBE_VERTICES.to_vec(),
            ..Self::default()
        };
        for (corners, normal) in CUBE_FACES {
            let n = mesh.normals.len();
            mesh.normals.push(normal);
            mesh.push_face(&corners, Some(&[n; 4][..]));
        }
        mesh
    }

    /// Append one face, with a normal index per vertex if `normals` is given.
    pub fn push_face(&mut self, vertices: &[usize], normals: Option<&[usize]>) {
        self.indices.extend(vertices.iter().map(|&i| i as i32));
        self.indices.push(FACE_SENTINEL);
        if let Some(normals) = normals {
            self.normal_indices.extend(normals.iter().map(|&i| i as i32));
            self.normal_indices.push(FACE_SENTINEL);
        }
    }

    pub fn face_count(&self) -> usize {
        self.indices.iter().filter(|&&i| i == FACE_SENTINEL).count()
    }

    /// Load every model of an OBJ file into one mesh.
    ///
    /// Polygons are kept as-is (the renderer fan-triangulates them). Normals
    /// are kept only if every model in the file has them.
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let options = tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        };
        let (models, _materials) =
            tobj::load_obj(path, &options).map_err(|source| LoadError::Obj {
                path: path.to_path_buf(),
                source,
            })?;

        let mut mesh = Self::default();
        let mut all_have_normals = true;
        for model in &models {
            all_have_normals &= mesh.append_obj_mesh(&model.mesh);
        }
        if !all_have_normals {
            mesh.normals.clear();
            mesh.normal_indices.clear();
        }

        if mesh.indices.is_empty() {
            return Err(LoadError::Empty(path.to_path_buf()));
        }
        debug!(
            path = %path.display(),
            models = models.len(),
            points = mesh.points.len(),
            faces = mesh.face_count(),
            normals = mesh.normals.len(),
            "loaded OBJ mesh"
        );
        Ok(mesh)
    }

    /// Returns whether the appended mesh carried normals.
    fn append_obj_mesh(&mut self, obj: &tobj::Mesh) -> bool {
        let point_base = self.points.len();
        let normal_base = self.normals.len();
        self.points.extend(
            obj.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        self.normals.extend(
            obj.normals
                .chunks_exact(3)
                .map(|n| Vec3::new(n[0], n[1], n[2])),
        );

        // Normals indexed like the positions when tobj reports no separate stream.
        let normal_indices: Option<&[u32]> = if !obj.normal_indices.is_empty() {
            Some(obj.normal_indices.as_slice())
        } else if !obj.normals.is_empty() && obj.normals.len() == obj.positions.len() {
            Some(obj.indices.as_slice())
        } else {
            None
        };

        // No arities means every face is a triangle.
        let arities: Vec<usize> = if obj.face_arities.is_empty() {
            vec![3; obj.indices.len() / 3]
        } else {
            obj.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0;
        for arity in arities {
            let end = start + arity;
            let vertices: Vec<usize> = obj.indices[start..end]
                .iter()
                .map(|&i| point_base + i as usize)
                .collect();
            let normals: Option<Vec<usize>> = normal_indices.map(|stream| {
                stream[start..end]
                    .iter()
                    .map(|&i| normal_base + i as usize)
                    .collect()
            });
            self.push_face(&vertices, normals.as_deref());
            start = end;
        }

        normal_indices.is_some()
    }
}

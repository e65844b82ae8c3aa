//! In-memory scene: camera, lights and separators.
//!
//! A scene is validated once when it is built. Index streams arrive in the
//! flat `-1`-terminated format of [`MeshData`] and are decoded into explicit
//! [`Face`] lists here, so the renderer only ever walks well-formed faces.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::light::{Material, PointLight};
use crate::math::{mat4::Mat4, vec3::Vec3, vec4::Vec4};
use crate::mesh::MeshData;
use crate::projection::{Frustum, ProjectionKind};
use crate::transform::Transform;

/// Terminates one face in a flat index stream.
pub const FACE_SENTINEL: i32 = -1;

/// Structural problem found while building a scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("index {index} at position {position} is negative and is not the face terminator -1")]
    InvalidIndex { position: usize, index: i32 },

    #[error("{kind} index {index} is out of range for {len} {kind}s")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    #[error("index stream has {indices} entries but normal index stream has {normal_indices}")]
    NormalIndexLengthMismatch { indices: usize, normal_indices: usize },

    #[error("index and normal index streams disagree on face terminator at position {position}")]
    SentinelMismatch { position: usize },

    #[error("transform has a zero scale component: {scale:?}")]
    ZeroScale { scale: [f32; 3] },

    #[error("rotation axis must be non-zero")]
    ZeroRotationAxis,

    #[error("invalid camera frustum: {reason}")]
    InvalidFrustum { reason: &'static str },
}

/// Decode a `-1`-terminated index stream into one index list per face.
///
/// Empty faces (repeated terminators) are dropped and a trailing face without
/// a terminator is kept. Indices are checked against `len`; `kind` names the
/// indexed array in error messages.
pub fn decode_index_stream(
    stream: &[i32],
    len: usize,
    kind: &'static str,
) -> Result<Vec<Vec<usize>>, SceneError> {
    let mut faces = Vec::new();
    let mut current = Vec::new();
    for (position, &index) in stream.iter().enumerate() {
        match index {
            FACE_SENTINEL => {
                if !current.is_empty() {
                    faces.push(std::mem::take(&mut current));
                }
            }
            i if i < 0 => return Err(SceneError::InvalidIndex { position, index }),
            i => {
                let i = i as usize;
                if i >= len {
                    return Err(SceneError::IndexOutOfRange { kind, index: i, len });
                }
                current.push(i);
            }
        }
    }
    if !current.is_empty() {
        faces.push(current);
    }
    Ok(faces)
}

/// One polygon of a separator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub vertices: Vec<usize>,
    /// Parallel to `vertices` when the mesh has per-vertex normals.
    pub normals: Option<Vec<usize>>,
}

/// Indices of one triangle from a fan-triangulated face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleIndices {
    pub vertices: [usize; 3],
    pub normals: Option<[usize; 3]>,
}

impl Face {
    /// Fan-triangulate around the first vertex: `(0, 1, 2), (0, 2, 3), ...`.
    pub fn triangles(&self) -> impl Iterator<Item = TriangleIndices> + '_ {
        (2..self.vertices.len()).map(move |i| TriangleIndices {
            vertices: [self.vertices[0], self.vertices[i - 1], self.vertices[i]],
            normals: self.normals.as_ref().map(|n| [n[0], n[i - 1], n[i]]),
        })
    }
}

/// A mesh with its transform stack and material.
#[derive(Debug, Clone)]
pub struct Separator {
    transforms: Vec<Transform>,
    points: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    material: Material,
    model_matrix: Mat4,
    normal_matrix: Mat4,
}

impl Separator {
    /// Validate `mesh` and `transforms` and decode the index streams.
    ///
    /// An empty normal index stream means the mesh has no per-vertex normals;
    /// otherwise it must have the same length and the same terminator
    /// positions as the vertex index stream.
    pub fn new(
        mesh: MeshData,
        transforms: Vec<Transform>,
        material: Material,
    ) -> Result<Self, SceneError> {
        for transform in &transforms {
            transform.validate()?;
        }

        let MeshData {
            points,
            indices,
            normals,
            normal_indices,
        } = mesh;

        let vertex_faces = decode_index_stream(&indices, points.len(), "point")?;
        let faces = if normal_indices.is_empty() {
            vertex_faces
                .into_iter()
                .map(|vertices| Face {
                    vertices,
                    normals: None,
                })
                .collect()
        } else {
            check_streams_aligned(&indices, &normal_indices)?;
            let normal_faces = decode_index_stream(&normal_indices, normals.len(), "normal")?;
            vertex_faces
                .into_iter()
                .zip(normal_faces)
                .map(|(vertices, normals)| Face {
                    vertices,
                    normals: Some(normals),
                })
                .collect()
        };

        let (model_matrix, normal_matrix) = transforms.iter().fold(
            (Mat4::identity(), Mat4::identity()),
            |(model, normal), t| (model * t.to_matrix(), normal * t.normal_matrix()),
        );

        Ok(Self {
            transforms,
            points,
            normals,
            faces,
            material,
            model_matrix,
            normal_matrix,
        })
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Product of every transform's `T·S·R`, in list order.
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }

    /// Product of every transform's inverse-transpose, in list order.
    pub fn normal_matrix(&self) -> Mat4 {
        self.normal_matrix
    }

    /// Every triangle of every face.
    pub fn triangles(&self) -> impl Iterator<Item = TriangleIndices> + '_ {
        self.faces.iter().flat_map(Face::triangles)
    }
}

fn check_streams_aligned(indices: &[i32], normal_indices: &[i32]) -> Result<(), SceneError> {
    if indices.len() != normal_indices.len() {
        return Err(SceneError::NormalIndexLengthMismatch {
            indices: indices.len(),
            normal_indices: normal_indices.len(),
        });
    }
    match indices
        .iter()
        .zip(normal_indices)
        .position(|(a, b)| (*a == FACE_SENTINEL) != (*b == FACE_SENTINEL))
    {
        Some(position) => Err(SceneError::SentinelMismatch { position }),
        None => Ok(()),
    }
}

/// Pinhole camera placed with a position and an axis-angle orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation axis in xyz, angle in radians in w.
    pub orientation: Vec4,
    pub frustum: Frustum,
    pub projection: ProjectionKind,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            orientation: Vec4::new(0.0, 0.0, 1.0, 0.0),
            frustum: Frustum::default(),
            projection: ProjectionKind::default(),
        }
    }
}

impl Camera {
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.orientation.to_vec3() == Vec3::ZERO {
            return Err(SceneError::ZeroRotationAxis);
        }
        self.frustum.validate(self.projection)
    }

    /// World to camera: `R⁻¹ · T⁻¹`.
    pub fn view_matrix(&self) -> Mat4 {
        let p = self.position;
        Mat4::rotation(self.orientation.to_vec3(), -self.orientation.w)
            * Mat4::translation(-p.x, -p.y, -p.z)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.frustum.matrix(self.projection)
    }

    /// World to clip space: `P · R⁻¹ · T⁻¹`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Everything needed to render one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    camera: Camera,
    lights: Vec<PointLight>,
    separators: Vec<Separator>,
}

impl Scene {
    pub fn new(
        camera: Camera,
        lights: Vec<PointLight>,
        separators: Vec<Separator>,
    ) -> Result<Self, SceneError> {
        camera.validate()?;
        Ok(Self {
            camera,
            lights,
            separators,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn separators(&self) -> &[Separator] {
        &self.separators
    }

    pub fn triangle_count(&self) -> usize {
        self.separators.iter().map(|s| s.triangles().count()).sum()
    }
}

//! CPU-side geometry parts and their vertex channels.
//!
//! A [`RawGeometry`] is what the OBJ loader hands over: flat attribute arrays
//! where an empty array means the attribute is absent. [`GeometryPart::from_raw`]
//! turns it into a part whose channels are all populated, either with real
//! per-vertex data or with a single constant value, so the renderer never has
//! to care whether an attribute existed in the source file.

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::data_structures::model::ModelVertex;

/// Colour used when a part has no usable per-vertex colours.
pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
/// Texture coordinate used when a part has no texcoords.
pub const DEFAULT_TEXCOORD: [f32; 2] = [0.0, 0.0];
/// Normal used when a part has no normals.
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];
/// Tangent used when tangents cannot be generated.
pub const DEFAULT_TANGENT: [f32; 3] = [1.0, 0.0, 0.0];

/// Attribute arrays of one geometry group as parsed from an OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawGeometry {
    pub name: String,
    pub material: Option<String>,
    pub position: Vec<f32>,
    pub color: Vec<f32>,
    pub texcoord: Vec<f32>,
    pub normal: Vec<f32>,
    pub indices: Vec<u32>,
}

/// A vertex attribute channel.
#[derive(Clone, Debug, PartialEq)]
pub enum Channel {
    /// One value of `components` floats per vertex.
    PerVertex { components: usize, data: Vec<f32> },
    /// The same value for every vertex.
    Constant(Vec<f32>),
}

impl Channel {
    pub fn components(&self) -> usize {
        match self {
            Channel::PerVertex { components, .. } => *components,
            Channel::Constant(value) => value.len(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Channel::Constant(_))
    }

    /// Number of vertices with their own value, `None` for constants.
    pub fn len(&self) -> Option<usize> {
        match self {
            Channel::PerVertex { components, data } if *components > 0 => {
                Some(data.len() / components)
            }
            Channel::PerVertex { .. } => Some(0),
            Channel::Constant(_) => None,
        }
    }

    /// Value for vertex `index`, widened to `N` components with `fallback`.
    ///
    /// Components missing from the channel (e.g. alpha of an RGB colour) and
    /// out of range reads keep the fallback value.
    pub fn value<const N: usize>(&self, index: usize, fallback: [f32; N]) -> [f32; N] {
        let (values, start) = match self {
            Channel::PerVertex { components, data } => (data.as_slice(), index * components),
            Channel::Constant(value) => (value.as_slice(), 0),
        };
        let mut out = fallback;
        for (k, slot) in out.iter_mut().enumerate().take(self.components()) {
            if let Some(v) = values.get(start + k) {
                *slot = *v;
            }
        }
        out
    }
}

/// A geometry group with every vertex channel populated.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryPart {
    pub name: String,
    pub material: Option<String>,
    pub position: Vec<f32>,
    pub color: Channel,
    pub texcoord: Channel,
    pub normal: Channel,
    pub tangent: Channel,
    pub indices: Vec<u32>,
}

impl GeometryPart {
    /// Fill in missing channels.
    ///
    /// - colours are only used as a per-vertex RGB channel when there are
    ///   exactly as many colour floats as position floats
    /// - tangents are generated only when both texcoords and normals exist
    pub fn from_raw(raw: RawGeometry) -> Self {
        let RawGeometry {
            name,
            material,
            position,
            color,
            texcoord,
            normal,
            indices,
        } = raw;

        let color = if !color.is_empty() && color.len() == position.len() {
            Channel::PerVertex {
                components: 3,
                data: color,
            }
        } else {
            Channel::Constant(DEFAULT_COLOR.to_vec())
        };

        let tangent = if !texcoord.is_empty() && !normal.is_empty() {
            Channel::PerVertex {
                components: 3,
                data: generate_tangents(&position, &texcoord, &indices),
            }
        } else {
            Channel::Constant(DEFAULT_TANGENT.to_vec())
        };

        let texcoord = if texcoord.is_empty() {
            Channel::Constant(DEFAULT_TEXCOORD.to_vec())
        } else {
            Channel::PerVertex {
                components: 2,
                data: texcoord,
            }
        };

        let normal = if normal.is_empty() {
            Channel::Constant(DEFAULT_NORMAL.to_vec())
        } else {
            Channel::PerVertex {
                components: 3,
                data: normal,
            }
        };

        Self {
            name,
            material,
            position,
            color,
            texcoord,
            normal,
            tangent,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    pub fn positions(&self) -> impl Iterator<Item = Vector3<f32>> + '_ {
        self.position
            .chunks_exact(3)
            .map(|p| Vector3::new(p[0], p[1], p[2]))
    }

    /// Interleave all channels into GPU vertices, broadcasting constants.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        self.positions()
            .enumerate()
            .map(|(i, position)| ModelVertex {
                position: position.into(),
                tex_coords: self.texcoord.value(i, DEFAULT_TEXCOORD),
                normal: self.normal.value(i, DEFAULT_NORMAL),
                tangent: self.tangent.value(i, DEFAULT_TANGENT),
                color: self.color.value(i, DEFAULT_COLOR),
            })
            .collect()
    }
}

/**
 * Obj files don't come with tangents so they have to be calculated for
 * normal maps to work correctly.
 *
 * Every triangle contributes its tangent to its three corners; the sums are
 * normalized per vertex. Triangles with a degenerate UV mapping contribute
 * nothing and vertices without any usable triangle get [`DEFAULT_TANGENT`].
 * Without indices the positions are read as a plain triangle list.
 */
pub fn generate_tangents(position: &[f32], texcoord: &[f32], indices: &[u32]) -> Vec<f32> {
    let vertex_count = position.len() / 3;
    let mut sums = vec![Vector3::new(0.0_f32, 0.0, 0.0); vertex_count];

    let pos = |i: usize| Vector3::new(position[i * 3], position[i * 3 + 1], position[i * 3 + 2]);
    let uv = |i: usize| {
        Vector2::new(
            texcoord.get(i * 2).copied().unwrap_or(0.0),
            texcoord.get(i * 2 + 1).copied().unwrap_or(0.0),
        )
    };

    let triangles: Vec<[usize; 3]> = if indices.is_empty() {
        (0..vertex_count / 3)
            .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
            .collect()
    } else {
        indices
            .chunks_exact(3)
            .map(|c| [c[0] as usize, c[1] as usize, c[2] as usize])
            .collect()
    };

    for [a, b, c] in triangles {
        if a >= vertex_count || b >= vertex_count || c >= vertex_count {
            continue;
        }
        let dp12 = pos(b) - pos(a);
        let dp13 = pos(c) - pos(a);
        let duv12 = uv(b) - uv(a);
        let duv13 = uv(c) - uv(a);

        let f = 1.0 / (duv12.x * duv13.y - duv13.x * duv12.y);
        if !f.is_finite() {
            continue;
        }
        let tangent = (dp12 * duv13.y - dp13 * duv12.y) * f;
        sums[a] += tangent;
        sums[b] += tangent;
        sums[c] += tangent;
    }

    sums.into_iter()
        .flat_map(|t| {
            let length = t.magnitude();
            let t = if length.is_finite() && length > f32::EPSILON {
                t / length
            } else {
                DEFAULT_TANGENT.into()
            };
            [t.x, t.y, t.z]
        })
        .collect()
}

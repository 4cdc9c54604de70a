use crate::{
    data_structures::{
        geometry::RawGeometry,
        material::{MapRef, MaterialPatch},
    },
    resources::relative_to,
};

/// Flatten a tobj model into raw attribute arrays.
///
/// The v coordinate is flipped because OBJ puts the texture origin bottom-left
/// while wgpu samples from the top-left.
pub fn raw_geometry(model: tobj::Model, materials: &[tobj::Material]) -> RawGeometry {
    let tobj::Model { mesh, name } = model;
    let material = mesh
        .material_id
        .and_then(|id| materials.get(id))
        .map(|m| m.name.clone());

    let texcoord = mesh
        .texcoords
        .chunks_exact(2)
        .flat_map(|uv| [uv[0], 1.0 - uv[1]])
        .collect();

    RawGeometry {
        name,
        material,
        position: mesh.positions,
        color: mesh.vertex_color,
        texcoord,
        normal: mesh.normals,
        indices: mesh.indices,
    }
}

/// Translate a parsed MTL material into a patch.
///
/// Only the keys the shader uses are carried over; map files are resolved
/// against the directory of `obj_path`.
pub fn material_patch(material: &tobj::Material, obj_path: &str) -> MaterialPatch {
    let map = |file: &str| {
        let file = map_file(file)?;
        Some(MapRef::new(file, relative_to(obj_path, file)))
    };
    let unknown = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| material.unknown_param.get(*k))
            .map(String::as_str)
    };

    let normal_file = material
        .normal_texture
        .as_deref()
        .or_else(|| unknown(&["map_Bump", "map_bump", "bump", "norm"]));
    let specular_file = material
        .shininess_texture
        .as_deref()
        .or(material.specular_texture.as_deref());

    MaterialPatch {
        diffuse: material.diffuse,
        ambient: material.ambient,
        emissive: unknown(&["Ke"]).and_then(parse_rgb),
        specular: material.specular,
        shininess: material.shininess,
        opacity: material.dissolve,
        diffuse_map: material.diffuse_texture.as_deref().and_then(map),
        specular_map: specular_file.and_then(map),
        normal_map: normal_file.and_then(map),
        render_order: None,
    }
}

/// The file name of a map statement, skipping any leading options such as `-bm 1.0`.
fn map_file(statement: &str) -> Option<&str> {
    statement.split_whitespace().last()
}

fn parse_rgb(value: &str) -> Option<[f32; 3]> {
    let parsed = value
        .split_whitespace()
        .map(str::parse::<f32>)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    match parsed.as_slice() {
        [r, g, b, ..] => Some([*r, *g, *b]),
        [v] => Some([*v, *v, *v]),
        _ => None,
    }
}

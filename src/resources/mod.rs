use std::{
    cell::RefCell,
    collections::HashMap,
    io::{BufReader, Cursor},
};

use anyhow::Context as _;

use crate::data_structures::{geometry::RawGeometry, material::MaterialPatch};

/**
 * This module contains all logic for loading meshes, materials and textures from external files.
 */
pub mod mesh;
pub mod texture;

/// Where asset files are read from.
///
/// Natively `root` is a directory; on the web it is a path relative to the
/// page the viewer is embedded in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetSource {
    pub root: String,
}

impl AssetSource {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for AssetSource {
    fn default() -> Self {
        Self::new("assets")
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(assets: &AssetSource, file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No window available")?;
    let href = window
        .location()
        .href()
        .map_err(|e| anyhow::anyhow!("Could not read the page location: {e:?}"))?;
    let page = reqwest::Url::parse(&href)?;
    let root = assets.root.trim_end_matches('/');
    let base = if root.is_empty() {
        page
    } else {
        page.join(&format!("{root}/"))?
    };
    Ok(base.join(file_name)?)
}

pub async fn load_string(assets: &AssetSource, file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(assets, file_name)?;
        reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("Could not fetch {url}"))?
            .text()
            .await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new(&assets.root).join(file_name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Could not read {}", path.display()))?
    };

    Ok(txt)
}

pub async fn load_binary(assets: &AssetSource, file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(assets, file_name)?;
        reqwest::get(url.clone())
            .await?
            .error_for_status()
            .with_context(|| format!("Could not fetch {url}"))?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new(&assets.root).join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Could not read {}", path.display()))?
    };

    Ok(data)
}

/// Resolve `name` against the directory of `base_file`.
///
/// Backslashes are normalized to `/`. Absolute paths and URLs pass through.
pub fn relative_to(base_file: &str, name: &str) -> String {
    let name = name.replace('\\', "/");
    if name.starts_with('/') || name.contains("://") {
        return name;
    }
    let base_file = base_file.replace('\\', "/");
    match base_file.rfind('/') {
        Some(i) => format!("{}/{}", &base_file[..i], name),
        None => name,
    }
}

/// Arguments of every `directive` line in an OBJ document, in file order.
///
/// The rest of the line is one argument, so names may contain spaces.
pub fn directive_arguments(obj_text: &str, directive: &str) -> Vec<String> {
    obj_text
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix(directive)?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            Some(rest.trim())
        })
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

/// A parsed OBJ file with the materials of all its MTL libraries.
#[derive(Clone, Debug, Default)]
pub struct ObjAsset {
    pub path: String,
    pub geometries: Vec<RawGeometry>,
    pub materials: HashMap<String, MaterialPatch>,
}

/// Load an OBJ file and every MTL library it references.
///
/// The MTL files are fetched concurrently and concatenated in the order they
/// are referenced, so a later library wins on duplicate material names.
pub async fn load_obj(assets: &AssetSource, obj_path: &str) -> anyhow::Result<ObjAsset> {
    let obj_text = load_string(assets, obj_path)
        .await
        .with_context(|| format!("Could not load the mesh {obj_path}"))?;

    let mtl_paths: Vec<String> = directive_arguments(&obj_text, "mtllib")
        .iter()
        .map(|lib| relative_to(obj_path, lib))
        .collect();
    let mtl_texts = futures::future::join_all(mtl_paths.iter().map(|p| async move {
        load_string(assets, p)
            .await
            .with_context(|| format!("Could not load the material library {p}"))
    }))
    .await
    .into_iter()
    .collect::<anyhow::Result<Vec<_>>>()?;
    log::info!(
        "Loaded {obj_path} with {} material librar{}",
        mtl_texts.len(),
        if mtl_texts.len() == 1 { "y" } else { "ies" }
    );

    let (mut mtl_materials, mut mtl_names) =
        tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_texts.join("\n"))))
            .with_context(|| format!("Could not parse the materials of {obj_path}"))?;

    // usemtl names missing from every library still name their parts
    for name in directive_arguments(&obj_text, "usemtl") {
        if !mtl_names.contains_key(&name) {
            log::warn!("{obj_path} uses the undefined material {name}");
            mtl_names.insert(name.clone(), mtl_materials.len());
            mtl_materials.push(tobj::Material {
                name,
                ..Default::default()
            });
        }
    }

    // tobj only asks for materials when it meets an mtllib line
    let obj_text = if mtl_paths.is_empty() && !mtl_materials.is_empty() {
        format!("mtllib undefined.mtl\n{obj_text}")
    } else {
        obj_text
    };

    let library = RefCell::new(Some((mtl_materials, mtl_names)));
    let (models, materials) = tobj::load_obj_buf_async(
        &mut BufReader::new(Cursor::new(obj_text)),
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| {
            // every library was fetched up front, hand them all to the first mtllib
            let prefetched = library.borrow_mut().take().unwrap_or_default();
            async move { Ok(prefetched) }
        },
    )
    .await
    .with_context(|| format!("Could not parse {obj_path}"))?;
    let materials = materials.with_context(|| format!("Could not parse the materials of {obj_path}"))?;

    let geometries = models
        .into_iter()
        .map(|model| mesh::raw_geometry(model, &materials))
        .collect();
    let materials = materials
        .iter()
        .map(|m| (m.name.clone(), mesh::material_patch(m, obj_path)))
        .collect();

    Ok(ObjAsset {
        path: obj_path.to_string(),
        geometries,
        materials,
    })
}

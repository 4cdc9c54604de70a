//! Material records and their composition.
//!
//! A part's final material is layered from three sources, later layers winning:
//! the built-in default, the record parsed from the MTL file and the caller's
//! override for the same material name. Overrides are plain configuration
//! ([`MaterialOverrides`]), so scene specific tweaks never leak into the
//! composition logic.

use std::collections::HashMap;

use crate::resources::texture::{Placeholder, TextureCache, TextureFetcher, TextureId, TextureSlot};

/// A texture file referenced by a material.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapRef {
    /// Cache key. Two refs with the same name share one texture.
    pub name: String,
    /// Location handed to the fetcher.
    pub path: String,
}

impl MapRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// A file addressed relative to the asset root, keyed by that same path.
    pub fn at_root(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: path.clone(),
            path,
        }
    }
}

/// A partial material. Unset fields leave the layer beneath untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialPatch {
    pub diffuse: Option<[f32; 3]>,
    pub ambient: Option<[f32; 3]>,
    pub emissive: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub shininess: Option<f32>,
    pub opacity: Option<f32>,
    pub diffuse_map: Option<MapRef>,
    pub specular_map: Option<MapRef>,
    pub normal_map: Option<MapRef>,
    pub render_order: Option<i32>,
}

impl MaterialPatch {
    pub fn diffuse(mut self, rgb: [f32; 3]) -> Self {
        self.diffuse = Some(rgb);
        self
    }

    pub fn specular(mut self, rgb: [f32; 3]) -> Self {
        self.specular = Some(rgb);
        self
    }

    pub fn shininess(mut self, shininess: f32) -> Self {
        self.shininess = Some(shininess);
        self
    }

    pub fn diffuse_map(mut self, map: MapRef) -> Self {
        self.diffuse_map = Some(map);
        self
    }

    pub fn render_order(mut self, order: i32) -> Self {
        self.render_order = Some(order);
        self
    }
}

/// Caller supplied adjustments for one material name.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialOverride {
    pub patch: MaterialPatch,
    /// Whether the parsed MTL record is layered beneath the patch.
    pub inherit_parsed: bool,
}

impl MaterialOverride {
    /// Applied on top of the parsed MTL record.
    pub fn layered(patch: MaterialPatch) -> Self {
        Self {
            patch,
            inherit_parsed: true,
        }
    }

    /// Applied on top of the default material only.
    pub fn replacing(patch: MaterialPatch) -> Self {
        Self {
            patch,
            inherit_parsed: false,
        }
    }
}

/// Material name -> override table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialOverrides(HashMap<String, MaterialOverride>);

impl MaterialOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: MaterialOverride) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MaterialOverride) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&MaterialOverride> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A fully resolved material.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialRecord {
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub emissive: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub opacity: f32,
    pub diffuse_map: TextureSlot,
    pub specular_map: TextureSlot,
    pub normal_map: TextureSlot,
}

impl Default for MaterialRecord {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0],
            ambient: [0.0, 0.0, 0.0],
            emissive: [0.0, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0],
            shininess: 400.0,
            opacity: 1.0,
            diffuse_map: TextureSlot::Placeholder(Placeholder::White),
            specular_map: TextureSlot::Placeholder(Placeholder::White),
            normal_map: TextureSlot::Placeholder(Placeholder::FlatNormal),
        }
    }
}

impl MaterialRecord {
    pub fn references(&self, id: TextureId) -> bool {
        [self.diffuse_map, self.specular_map, self.normal_map].contains(&TextureSlot::Texture(id))
    }

    fn apply<T, F: TextureFetcher + ?Sized>(
        &mut self,
        patch: &MaterialPatch,
        textures: &mut TextureCache<T>,
        fetcher: &mut F,
    ) {
        if let Some(v) = patch.diffuse {
            self.diffuse = v;
        }
        if let Some(v) = patch.ambient {
            self.ambient = v;
        }
        if let Some(v) = patch.emissive {
            self.emissive = v;
        }
        if let Some(v) = patch.specular {
            self.specular = v;
        }
        if let Some(v) = patch.shininess {
            self.shininess = v;
        }
        if let Some(v) = patch.opacity {
            self.opacity = v;
        }

        let mut resolve = |map: &MapRef, placeholder| {
            TextureSlot::Texture(textures.resolve(&map.name, &map.path, placeholder, &mut *fetcher))
        };
        if let Some(map) = &patch.diffuse_map {
            self.diffuse_map = resolve(map, Placeholder::White);
        }
        if let Some(map) = &patch.specular_map {
            self.specular_map = resolve(map, Placeholder::White);
        }
        if let Some(map) = &patch.normal_map {
            self.normal_map = resolve(map, Placeholder::FlatNormal);
        }
    }
}

/// A resolved material together with where its parts go in the draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct ComposedMaterial {
    pub record: MaterialRecord,
    pub render_order: i32,
}

impl Default for ComposedMaterial {
    fn default() -> Self {
        Self {
            record: MaterialRecord::default(),
            render_order: 0,
        }
    }
}

pub struct MaterialComposer<'a> {
    parsed: &'a HashMap<String, MaterialPatch>,
    overrides: &'a MaterialOverrides,
}

impl<'a> MaterialComposer<'a> {
    pub fn new(
        parsed: &'a HashMap<String, MaterialPatch>,
        overrides: &'a MaterialOverrides,
    ) -> Self {
        Self { parsed, overrides }
    }

    /// Compose the material for a part, resolving every referenced map.
    ///
    /// Parts without a material name get the default material.
    pub fn compose<T, F: TextureFetcher + ?Sized>(
        &self,
        name: Option<&str>,
        textures: &mut TextureCache<T>,
        fetcher: &mut F,
    ) -> ComposedMaterial {
        let mut composed = ComposedMaterial::default();
        let Some(name) = name else {
            return composed;
        };
        let overridden = self.overrides.get(name);

        let inherit = overridden.is_none_or(|o| o.inherit_parsed);
        if inherit {
            if let Some(parsed) = self.parsed.get(name) {
                composed.record.apply(parsed, textures, fetcher);
                if let Some(order) = parsed.render_order {
                    composed.render_order = order;
                }
            }
        }
        if let Some(o) = overridden {
            composed.record.apply(&o.patch, textures, fetcher);
            if let Some(order) = o.patch.render_order {
                composed.render_order = order;
            }
        }
        composed
    }
}

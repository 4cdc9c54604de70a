//! Scene assembly: framing the model and turning loaded geometry into GPU parts.

use anyhow::bail;
use cgmath::{InnerSpace, Point3, Vector3};

use crate::{
    config::{CameraConfig, ViewerConfig},
    context::Context,
    data_structures::{
        geometry::GeometryPart,
        material::MaterialComposer,
        model::Part,
        texture::Texture,
    },
    resources::{
        ObjAsset,
        texture::{Placeholder, TextureCache, TextureFetcher, TextureId},
    },
};

/// Axis aligned bounds of a set of positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extents {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Extents {
    /// Bounds of a flat `[x, y, z, ...]` array; `None` when it holds no point.
    pub fn of_positions(position: &[f32]) -> Option<Self> {
        let mut points = position.chunks_exact(3);
        let first = points.next()?;
        let first = Point3::new(first[0], first[1], first[2]);
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |e, p| Self {
                min: Point3::new(e.min.x.min(p[0]), e.min.y.min(p[1]), e.min.z.min(p[2])),
                max: Point3::new(e.max.x.max(p[0]), e.max.y.max(p[1]), e.max.z.max(p[2])),
            },
        ))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn of_geometries<'a>(parts: impl IntoIterator<Item = &'a GeometryPart>) -> Option<Self> {
        parts
            .into_iter()
            .filter_map(|p| Self::of_positions(&p.position))
            .reduce(Self::union)
    }

    pub fn range(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Point3<f32> {
        self.min + self.range() / 2.0
    }
}

/// Where the camera goes and how the model is shifted to face it.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneFraming {
    pub center_offset: Vector3<f32>,
    pub target: Point3<f32>,
    pub radius: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl SceneFraming {
    pub fn from_extents(extents: &Extents, camera: &CameraConfig) -> Self {
        let range = extents.range();
        let center_offset = -(extents.center() - Point3::new(0.0, 0.0, 0.0));

        let mut radius = range.magnitude() * camera.radius_factor;
        if !radius.is_finite() || radius <= 0.0 {
            log::warn!("The scene has no extent, falling back to a camera radius of 1");
            radius = 1.0;
        }

        Self {
            center_offset,
            target: camera.target,
            radius,
            z_near: radius / camera.near_divisor,
            z_far: radius * camera.far_factor,
        }
    }
}

/// Stable ascending sort, so equal keys keep their original order.
pub fn sort_by_render_order<T>(items: &mut [T], key: impl FnMut(&T) -> i32) {
    items.sort_by_key(key);
}

/// Everything drawn each frame.
#[derive(Debug)]
pub struct GpuScene {
    /// In draw order.
    pub parts: Vec<Part>,
    pub textures: TextureCache<Texture>,
    pub framing: SceneFraming,
}

impl GpuScene {
    pub fn build<F: TextureFetcher + ?Sized>(
        ctx: &Context,
        asset: ObjAsset,
        config: &ViewerConfig,
        fetcher: &mut F,
    ) -> anyhow::Result<Self> {
        let geometries: Vec<GeometryPart> = asset
            .geometries
            .into_iter()
            .map(GeometryPart::from_raw)
            .collect();

        let Some(extents) = Extents::of_geometries(&geometries) else {
            bail!("{} contains no vertex positions", asset.path);
        };
        let framing = SceneFraming::from_extents(&extents, &config.camera);

        let mut textures = TextureCache::new(
            Texture::from_pixel(
                &ctx.device,
                &ctx.queue,
                Placeholder::White.rgba(),
                "white placeholder",
                false,
            ),
            Texture::from_pixel(
                &ctx.device,
                &ctx.queue,
                Placeholder::FlatNormal.rgba(),
                "flat normal placeholder",
                true,
            ),
        );

        let composer = MaterialComposer::new(&asset.materials, &config.overrides);
        let mut parts: Vec<Part> = geometries
            .iter()
            .filter(|g| {
                let drawable = g.vertex_count() > 0;
                if !drawable {
                    log::warn!("Skipping the empty part {}", g.name);
                }
                drawable
            })
            .map(|g| {
                let material = composer.compose(g.material.as_deref(), &mut textures, &mut *fetcher);
                Part::new(ctx, g, material, &textures)
            })
            .collect();
        sort_by_render_order(&mut parts, Part::render_order);

        log::info!(
            "Built {} parts with {} textures from {}",
            parts.len(),
            textures.len(),
            asset.path
        );

        Ok(Self {
            parts,
            textures,
            framing,
        })
    }

    /// Upload a fetched image and rebind every part that samples it.
    pub fn install_texture(
        &mut self,
        ctx: &Context,
        id: TextureId,
        image: &image::DynamicImage,
    ) -> anyhow::Result<()> {
        let is_normal_map = self
            .textures
            .placeholder(id)
            .is_some_and(Placeholder::is_normal_map);
        let label = self.textures.name(id).unwrap_or("texture").to_string();
        let texture = Texture::from_image(&ctx.device, &ctx.queue, image, Some(&label), is_normal_map)?;
        if !self.textures.install(id, texture) {
            bail!("Unknown texture {id:?}");
        }
        log::debug!("Installed texture {label}");

        for part in self.parts.iter_mut().filter(|p| p.uses_texture(id)) {
            part.rebind(ctx, &self.textures);
        }
        Ok(())
    }

    pub fn texture_failed(&mut self, id: TextureId, error: &anyhow::Error) {
        self.textures.mark_failed(id);
        log::warn!(
            "Texture {} could not be loaded, keeping its placeholder: {error:#}",
            self.textures.name(id).unwrap_or("<unknown>")
        );
    }
}

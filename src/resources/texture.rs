use std::collections::HashMap;

use anyhow::Context as _;

use crate::resources::{AssetSource, load_binary};

/// Handle of a texture cache entry. Stable for the process lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// 1x1 stand-ins used for unset maps and for maps that are still loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placeholder {
    White,
    FlatNormal,
}

impl Placeholder {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Placeholder::White => [255, 255, 255, 255],
            Placeholder::FlatNormal => [128, 128, 255, 255],
        }
    }

    /// Normal maps are sampled in linear space, everything else as sRGB.
    pub fn is_normal_map(self) -> bool {
        matches!(self, Placeholder::FlatNormal)
    }
}

/// What a material samples for one of its maps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    Placeholder(Placeholder),
    Texture(TextureId),
}

/// Starts a background fetch for a texture cache entry.
///
/// Implementations must not block: the result is delivered later and handed to
/// [`TextureCache::install`] or [`TextureCache::mark_failed`].
pub trait TextureFetcher {
    fn fetch(&mut self, id: TextureId, path: &str);
}

#[derive(Debug)]
enum EntryState<T> {
    Pending,
    Loaded(T),
    Failed,
}

#[derive(Debug)]
struct Entry<T> {
    name: String,
    placeholder: Placeholder,
    state: EntryState<T>,
}

/// Texture registry keyed by file name and colour space.
///
/// A file used both as a colour map and as a normal map gets two entries, so
/// each upload uses the right format. Generic over the texture type so it can be driven without a GPU; the viewer
/// uses it with [`crate::data_structures::texture::Texture`].
#[derive(Debug)]
pub struct TextureCache<T> {
    white: T,
    flat_normal: T,
    by_name: HashMap<(String, bool), TextureId>,
    entries: Vec<Entry<T>>,
}

impl<T> TextureCache<T> {
    pub fn new(white: T, flat_normal: T) -> Self {
        Self {
            white,
            flat_normal,
            by_name: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Look up `name` for the colour space of `placeholder`, registering it and
    /// starting a fetch of `path` when it is new.
    ///
    /// The returned id is drawable right away: until the fetch completes it
    /// samples `placeholder`.
    pub fn resolve<F: TextureFetcher + ?Sized>(
        &mut self,
        name: &str,
        path: &str,
        placeholder: Placeholder,
        fetcher: &mut F,
    ) -> TextureId {
        let key = (name.to_string(), placeholder.is_normal_map());
        if let Some(id) = self.by_name.get(&key) {
            return *id;
        }
        let id = TextureId(self.entries.len());
        self.entries.push(Entry {
            name: name.to_string(),
            placeholder,
            state: EntryState::Pending,
        });
        self.by_name.insert(key, id);
        log::debug!("Fetching texture {name} from {path}");
        fetcher.fetch(id, path);
        id
    }

    /// Install the uploaded texture for `id`. Returns false for unknown ids.
    pub fn install(&mut self, id: TextureId, texture: T) -> bool {
        match self.entries.get_mut(id.0) {
            Some(entry) => {
                entry.state = EntryState::Loaded(texture);
                true
            }
            None => false,
        }
    }

    /// Keep the placeholder of `id` for good.
    pub fn mark_failed(&mut self, id: TextureId) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.state = EntryState::Failed;
        }
    }

    pub fn get(&self, slot: TextureSlot) -> &T {
        match slot {
            TextureSlot::Placeholder(p) => self.placeholder_texture(p),
            TextureSlot::Texture(id) => match self.entries.get(id.0) {
                Some(Entry {
                    state: EntryState::Loaded(texture),
                    ..
                }) => texture,
                Some(entry) => self.placeholder_texture(entry.placeholder),
                None => &self.white,
            },
        }
    }

    fn placeholder_texture(&self, placeholder: Placeholder) -> &T {
        match placeholder {
            Placeholder::White => &self.white,
            Placeholder::FlatNormal => &self.flat_normal,
        }
    }

    pub fn placeholder(&self, id: TextureId) -> Option<Placeholder> {
        self.entries.get(id.0).map(|e| e.placeholder)
    }

    pub fn name(&self, id: TextureId) -> Option<&str> {
        self.entries.get(id.0).map(|e| e.name.as_str())
    }

    pub fn is_loaded(&self, id: TextureId) -> bool {
        matches!(
            self.entries.get(id.0),
            Some(Entry {
                state: EntryState::Loaded(_),
                ..
            })
        )
    }

    pub fn has_failed(&self, id: TextureId) -> bool {
        matches!(
            self.entries.get(id.0),
            Some(Entry {
                state: EntryState::Failed,
                ..
            })
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind group layout shared by every part: material uniform, the diffuse,
/// specular and normal maps and one sampler for all three.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let map = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            map(1),
            map(2),
            map(3),
            wgpu::BindGroupLayoutEntry {
                binding: 4,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("material_bind_group_layout"),
    })
}

/// Fetch and decode an image. Runs off the event loop; touches no viewer state.
pub async fn load_image(assets: &AssetSource, path: &str) -> anyhow::Result<image::DynamicImage> {
    let data = load_binary(assets, path).await?;
    image::load_from_memory(&data).with_context(|| format!("Could not decode image {path}"))
}

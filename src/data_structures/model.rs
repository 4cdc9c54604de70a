//! GPU-side parts: vertex layout, material uniform and draw helpers.

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{geometry::GeometryPart, material::ComposedMaterial, texture::Texture},
    resources::texture::{TextureCache, TextureId},
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 11]>() as wgpu::BufferAddress,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Scalar material properties as laid out in the shader's `Material` struct.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// rgb = diffuse, a = opacity
    pub diffuse: [f32; 4],
    /// rgb = ambient, a = shininess
    pub ambient: [f32; 4],
    pub emissive: [f32; 4],
    pub specular: [f32; 4],
}

impl From<&ComposedMaterial> for MaterialUniform {
    fn from(material: &ComposedMaterial) -> Self {
        let m = &material.record;
        let [dr, dg, db] = m.diffuse;
        let [ar, ag, ab] = m.ambient;
        let [er, eg, eb] = m.emissive;
        let [sr, sg, sb] = m.specular;
        Self {
            diffuse: [dr, dg, db, m.opacity],
            ambient: [ar, ag, ab, m.shininess],
            emissive: [er, eg, eb, 0.0],
            specular: [sr, sg, sb, 0.0],
        }
    }
}

/// One drawable geometry group with its material bound.
#[derive(Debug)]
pub struct Part {
    pub name: String,
    pub material: ComposedMaterial,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: Option<wgpu::Buffer>,
    pub num_elements: u32,
    pub material_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Part {
    pub fn new(
        ctx: &Context,
        geometry: &GeometryPart,
        material: ComposedMaterial,
        textures: &TextureCache<Texture>,
    ) -> Self {
        let vertices = geometry.vertices();
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", geometry.name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let (index_buffer, num_elements) = if geometry.indices.is_empty() {
            (None, vertices.len() as u32)
        } else {
            let buffer = ctx
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Index Buffer", geometry.name)),
                    contents: bytemuck::cast_slice(&geometry.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            (Some(buffer), geometry.indices.len() as u32)
        };

        let material_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Material Buffer", geometry.name)),
                contents: bytemuck::cast_slice(&[MaterialUniform::from(&material)]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        let bind_group = material_bind_group(ctx, &geometry.name, &material, &material_buffer, textures);

        Self {
            name: geometry.name.clone(),
            material,
            vertex_buffer,
            index_buffer,
            num_elements,
            material_buffer,
            bind_group,
        }
    }

    pub fn render_order(&self) -> i32 {
        self.material.render_order
    }

    pub fn uses_texture(&self, id: TextureId) -> bool {
        self.material.record.references(id)
    }

    /// Rebuild the bind group after a referenced texture finished loading.
    pub fn rebind(&mut self, ctx: &Context, textures: &TextureCache<Texture>) {
        self.bind_group = material_bind_group(
            ctx,
            &self.name,
            &self.material,
            &self.material_buffer,
            textures,
        );
    }
}

fn material_bind_group(
    ctx: &Context,
    name: &str,
    material: &ComposedMaterial,
    material_buffer: &wgpu::Buffer,
    textures: &TextureCache<Texture>,
) -> wgpu::BindGroup {
    let record = &material.record;
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: &ctx.material_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: material_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&textures.get(record.diffuse_map).view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(
                    &textures.get(record.specular_map).view,
                ),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::TextureView(&textures.get(record.normal_map).view),
            },
            wgpu::BindGroupEntry {
                binding: 4,
                resource: wgpu::BindingResource::Sampler(&ctx.sampler),
            },
        ],
        label: Some(&format!("{name} material bind group")),
    })
}

pub trait DrawPart {
    fn draw_part(&mut self, part: &Part, frame_bind_group: &wgpu::BindGroup);
}

impl DrawPart for wgpu::RenderPass<'_> {
    fn draw_part(&mut self, part: &Part, frame_bind_group: &wgpu::BindGroup) {
        if part.num_elements == 0 {
            return;
        }
        self.set_vertex_buffer(0, part.vertex_buffer.slice(..));
        self.set_bind_group(0, frame_bind_group, &[]);
        self.set_bind_group(1, &part.bind_group, &[]);
        match &part.index_buffer {
            Some(index_buffer) => {
                self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                self.draw_indexed(0..part.num_elements, 0, 0..1);
            }
            None => self.draw(0..part.num_elements, 0..1),
        }
    }
}

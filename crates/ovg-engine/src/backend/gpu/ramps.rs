use std::collections::HashMap;

use crate::paint::RAMP_WIDTH;

/// Ramps one atlas holds between submits.
pub(super) const RAMP_ROWS: u32 = 64;

/// One texture holding this submit's gradient ramps, one per row.
///
/// Rows are handed out per distinct ramp and recycled after every submit,
/// so a row is never rewritten while a recorded draw still samples it.
#[derive(Default)]
pub(super) struct RampAtlas {
    texture: Option<wgpu::Texture>,
    bind_group: Option<wgpu::BindGroup>,
    rows: HashMap<Vec<[u8; 4]>, u32>,
}

impl RampAtlas {
    fn ensure(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout) {
        if self.texture.is_some() && self.bind_group.is_some() {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ovg ramp atlas"),
            size: wgpu::Extent3d {
                width: RAMP_WIDTH as u32,
                height: RAMP_ROWS,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Premultiplied texels, sampled without sRGB decoding.
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ovg ramp sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });
        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ovg ramp bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        }));
        self.texture = Some(texture);
    }

    /// Texture `v` of the row holding `ramp`, uploading it into a free row
    /// when needed. `None` once every row is taken until the next submit.
    pub fn row_for(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        ramp: &[[u8; 4]],
    ) -> Option<f32> {
        if ramp.len() != RAMP_WIDTH {
            log::warn!("gradient ramp of {} texels ignored", ramp.len());
            return None;
        }
        if let Some(&row) = self.rows.get(ramp) {
            return Some(row_v(row));
        }
        let row = self.rows.len() as u32;
        if row >= RAMP_ROWS {
            return None;
        }

        self.ensure(device, layout);
        let texture = self.texture.as_ref()?;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: row, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(ramp),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(RAMP_WIDTH as u32 * 4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: RAMP_WIDTH as u32,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        self.rows.insert(ramp.to_vec(), row);
        Some(row_v(row))
    }

    /// Frees every row; call after the draws using them were submitted.
    pub fn recycle(&mut self) {
        self.rows.clear();
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Texture coordinate of the center of `row`.
#[inline]
pub(super) fn row_v(row: u32) -> f32 {
    (row as f32 + 0.5) / RAMP_ROWS as f32
}

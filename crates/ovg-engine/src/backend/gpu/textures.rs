use std::collections::HashMap;

use crate::backend::cmd::{ImageFilter, TextureRef};
use crate::resources::BufferId;

/// Frames an unused texture survives before it is released.
const EVICT_AFTER_FRAMES: u64 = 120;

struct CachedTexture {
    version: u64,
    size: (u32, u32),
    texture: wgpu::Texture,
    nearest: wgpu::BindGroup,
    linear: wgpu::BindGroup,
    last_used: u64,
}

/// GPU copies of image pixel buffers, keyed by buffer and refreshed when the
/// buffer version changes. Child images share their root's texture.
#[derive(Default)]
pub(super) struct TextureCache {
    entries: HashMap<BufferId, CachedTexture>,
    nearest: Option<wgpu::Sampler>,
    linear: Option<wgpu::Sampler>,
}

impl TextureCache {
    fn ensure_samplers(&mut self, device: &wgpu::Device) {
        if self.nearest.is_some() && self.linear.is_some() {
            return;
        }
        let sampler = |label, filter| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some(label),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter,
                min_filter: filter,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        };
        self.nearest = Some(sampler("ovg image sampler (nearest)", wgpu::FilterMode::Nearest));
        self.linear = Some(sampler("ovg image sampler (linear)", wgpu::FilterMode::Linear));
    }

    /// Makes the texture for `tex` current, uploading when new or stale.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        tex: &TextureRef<'_>,
        frame: u64,
    ) {
        self.ensure_samplers(device);

        let size = (tex.width, tex.height);
        let stale = self
            .entries
            .get(&tex.buffer)
            .is_none_or(|e| e.size != size);
        if stale {
            let Some(entry) = self.create_entry(device, layout, size) else { return };
            self.entries.insert(tex.buffer, entry);
        }

        let Some(entry) = self.entries.get_mut(&tex.buffer) else { return };
        entry.last_used = frame;
        if !stale && entry.version == tex.version {
            return;
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &entry.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            tex.texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(tex.width * 4),
                rows_per_image: Some(tex.height),
            },
            wgpu::Extent3d {
                width: tex.width,
                height: tex.height,
                depth_or_array_layers: 1,
            },
        );
        entry.version = tex.version;
    }

    fn create_entry(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        (width, height): (u32, u32),
    ) -> Option<CachedTexture> {
        let nearest_sampler = self.nearest.as_ref()?;
        let linear_sampler = self.linear.as_ref()?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ovg image texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = |sampler: &wgpu::Sampler| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ovg image bind group"),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };

        Some(CachedTexture {
            version: 0,
            size: (width, height),
            nearest: bind_group(nearest_sampler),
            linear: bind_group(linear_sampler),
            texture,
            last_used: 0,
        })
    }

    /// Whether [`TextureCache::prepare`] would write new texels into an
    /// existing texture for `tex`.
    pub fn would_overwrite(&self, tex: &TextureRef<'_>) -> bool {
        self.entries
            .get(&tex.buffer)
            .is_some_and(|e| overwrites(e.version, e.size, tex))
    }

    pub fn bind_group(&self, buffer: BufferId, filter: ImageFilter) -> Option<&wgpu::BindGroup> {
        let entry = self.entries.get(&buffer)?;
        Some(match filter {
            ImageFilter::Nearest => &entry.nearest,
            ImageFilter::Linear => &entry.linear,
        })
    }

    /// Drops textures not drawn for a while (their images were likely
    /// destroyed).
    pub fn evict_stale(&mut self, frame: u64) {
        let before = self.entries.len();
        self.entries
            .retain(|_, e| frame.saturating_sub(e.last_used) <= EVICT_AFTER_FRAMES);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} image texture(s)");
        }
    }
}

/// A cached texture at `version` and `size` gets rewritten (or replaced)
/// when `tex` differs in either.
fn overwrites(version: u64, size: (u32, u32), tex: &TextureRef<'_>) -> bool {
    version != tex.version || size != (tex.width, tex.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn texture(version: u64, width: u32, height: u32) -> TextureRef<'static> {
        TextureRef {
            buffer: BufferId::from(KeyData::from_ffi(1)),
            version,
            width,
            height,
            texels: &[],
        }
    }

    #[test]
    fn new_pixels_or_size_overwrite_the_cached_texture() {
        assert!(!overwrites(3, (4, 4), &texture(3, 4, 4)));
        assert!(overwrites(3, (4, 4), &texture(4, 4, 4)));
        assert!(overwrites(3, (4, 4), &texture(3, 8, 4)));
    }

    #[test]
    fn uncached_buffers_are_never_overwritten() {
        let cache = TextureCache::default();
        assert!(!cache.would_overwrite(&texture(1, 2, 2)));
    }
}

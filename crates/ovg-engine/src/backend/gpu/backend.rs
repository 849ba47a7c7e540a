use std::collections::HashSet;
use std::ops::Range;

use crate::backend::cmd::{
    BatchDraw, BatchVertex, ClearCmd, GradientFill, ImageDraw, ImageFilter, MeshDraw, MeshPaint,
};
use crate::backend::{Backend, BackendKind};
use crate::math::Mat4;
use crate::resources::BufferId;

use super::common::{uniform_stride, DrawUniform, Vertex, DRAW_UNIFORM_SIZE};
use super::device::Gpu;
use super::pipeline::Pipelines;
use super::ramps::RampAtlas;
use super::textures::TextureCache;

/// One recorded draw, replayed in order when the frame ends.
#[derive(Debug, Clone)]
enum DrawOp {
    Color {
        replace: bool,
        uniform: u32,
        indices: Range<u32>,
    },
    Image {
        texture: BufferId,
        filter: ImageFilter,
        uniform: u32,
        indices: Range<u32>,
    },
    Gradient {
        uniform: u32,
        indices: Range<u32>,
    },
    /// Indices into the batch vertex buffer.
    Batch {
        uniform: u32,
        indices: Range<u32>,
    },
}

/// CPU staging for one submit: every draw shares one index and uniform
/// buffer. Batch triangles carry their own vertex format.
#[derive(Default)]
struct FrameBatch {
    vertices: Vec<Vertex>,
    batch_vertices: Vec<BatchVertex>,
    indices: Vec<u32>,
    uniforms: Vec<DrawUniform>,
    ops: Vec<DrawOp>,
    /// Image buffers sampled by the staged ops.
    textures: HashSet<BufferId>,
}

impl FrameBatch {
    fn clear(&mut self) {
        self.vertices.clear();
        self.batch_vertices.clear();
        self.indices.clear();
        self.uniforms.clear();
        self.ops.clear();
        self.textures.clear();
    }

    /// Appends geometry and its uniform; returns `(uniform index, index range)`.
    fn push(
        &mut self,
        vertices: impl IntoIterator<Item = Vertex>,
        indices: impl IntoIterator<Item = u32>,
        uniform: DrawUniform,
    ) -> (u32, Range<u32>) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(vertices);
        let start = self.indices.len() as u32;
        self.indices.extend(indices.into_iter().map(|i| i + base));
        let end = self.indices.len() as u32;
        self.uniforms.push(uniform);
        (self.uniforms.len() as u32 - 1, start..end)
    }

    fn push_batch(&mut self, cmd: &BatchDraw<'_>, uniform: DrawUniform) -> (u32, Range<u32>) {
        let base = self.batch_vertices.len() as u32;
        self.batch_vertices.extend_from_slice(cmd.vertices);
        let start = self.indices.len() as u32;
        self.indices.extend(cmd.indices.iter().map(|&i| i + base));
        let end = self.indices.len() as u32;
        self.uniforms.push(uniform);
        (self.uniforms.len() as u32 - 1, start..end)
    }
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Backend rendering through wgpu into a caller-provided texture view.
///
/// Draws are staged on the CPU and submitted in one render pass at
/// [`Backend::end_frame`]. The queue is never polled.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    size: (u32, u32),

    target: Option<wgpu::TextureView>,
    offscreen: Option<wgpu::Texture>,

    pipelines: Pipelines,
    textures: TextureCache,
    ramps: RampAtlas,

    vbo: Option<wgpu::Buffer>,
    vbo_capacity: usize,
    batch_vbo: Option<wgpu::Buffer>,
    batch_vbo_capacity: usize,
    ibo: Option<wgpu::Buffer>,
    ibo_capacity: usize,
    ubo: Option<wgpu::Buffer>,
    ubo_capacity: usize,
    uniform_bind_group: Option<wgpu::BindGroup>,

    batch: FrameBatch,
    frame_index: u64,
    warned_no_target: bool,
}

impl WgpuBackend {
    pub fn new(gpu: &Gpu, width: u32, height: u32) -> Self {
        Self {
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            format: gpu.target_format(),
            size: (width.max(1), height.max(1)),
            target: None,
            offscreen: None,
            pipelines: Pipelines::default(),
            textures: TextureCache::default(),
            ramps: RampAtlas::default(),
            vbo: None,
            vbo_capacity: 0,
            batch_vbo: None,
            batch_vbo_capacity: 0,
            ibo: None,
            ibo_capacity: 0,
            ubo: None,
            ubo_capacity: 0,
            uniform_bind_group: None,
            batch: FrameBatch::default(),
            frame_index: 0,
            warned_no_target: false,
        }
    }

    /// Renders subsequent frames into `view`, which must use the backend's
    /// target format. Typically the host's current surface texture.
    pub fn set_target(&mut self, view: wgpu::TextureView) {
        self.target = Some(view);
    }

    /// Allocates an owned render texture of the surface size and targets it.
    pub fn create_offscreen_target(&mut self) -> &wgpu::Texture {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("ovg offscreen target"),
            size: wgpu::Extent3d {
                width: self.size.0,
                height: self.size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        self.target = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.offscreen.insert(texture)
    }

    pub fn offscreen_target(&self) -> Option<&wgpu::Texture> {
        self.offscreen.as_ref()
    }

    // ── private helpers ────────────────────────────────────────────────────

    fn ensure_capacity(
        device: &wgpu::Device,
        slot: &mut Option<wgpu::Buffer>,
        capacity: &mut usize,
        required_bytes: usize,
        usage: wgpu::BufferUsages,
        label: &str,
    ) -> bool {
        if required_bytes <= *capacity && slot.is_some() {
            return false;
        }
        let new_cap = required_bytes.next_power_of_two().max(4096);
        *slot = Some(device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: new_cap as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        *capacity = new_cap;
        true
    }

    /// Uploads the frame's vertices, indices and uniforms.
    fn upload_batch(&mut self) {
        let stride = uniform_stride(&self.device) as usize;
        let mut uniform_bytes = vec![0u8; self.batch.uniforms.len() * stride];
        for (i, u) in self.batch.uniforms.iter().enumerate() {
            uniform_bytes[i * stride..i * stride + DRAW_UNIFORM_SIZE as usize]
                .copy_from_slice(bytemuck::bytes_of(u));
        }
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.batch.vertices);
        let batch_vertex_bytes: &[u8] = bytemuck::cast_slice(&self.batch.batch_vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&self.batch.indices);

        Self::ensure_capacity(
            &self.device,
            &mut self.vbo,
            &mut self.vbo_capacity,
            vertex_bytes.len(),
            wgpu::BufferUsages::VERTEX,
            "ovg frame vbo",
        );
        Self::ensure_capacity(
            &self.device,
            &mut self.batch_vbo,
            &mut self.batch_vbo_capacity,
            batch_vertex_bytes.len(),
            wgpu::BufferUsages::VERTEX,
            "ovg batch vbo",
        );
        Self::ensure_capacity(
            &self.device,
            &mut self.ibo,
            &mut self.ibo_capacity,
            index_bytes.len(),
            wgpu::BufferUsages::INDEX,
            "ovg frame ibo",
        );
        let ubo_reallocated = Self::ensure_capacity(
            &self.device,
            &mut self.ubo,
            &mut self.ubo_capacity,
            uniform_bytes.len(),
            wgpu::BufferUsages::UNIFORM,
            "ovg frame ubo",
        );

        if ubo_reallocated || self.uniform_bind_group.is_none() {
            self.uniform_bind_group = match (self.pipelines.uniform_layout.as_ref(), self.ubo.as_ref()) {
                (Some(layout), Some(ubo)) => Some(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("ovg draw uniform bind group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                            buffer: ubo,
                            offset: 0,
                            size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                        }),
                    }],
                })),
                _ => None,
            };
        }

        if let Some(vbo) = self.vbo.as_ref() {
            self.queue.write_buffer(vbo, 0, vertex_bytes);
        }
        if let Some(vbo) = self.batch_vbo.as_ref() {
            self.queue.write_buffer(vbo, 0, batch_vertex_bytes);
        }
        if let Some(ibo) = self.ibo.as_ref() {
            self.queue.write_buffer(ibo, 0, index_bytes);
        }
        if let Some(ubo) = self.ubo.as_ref() {
            self.queue.write_buffer(ubo, 0, &uniform_bytes);
        }
    }

    /// Submits the staged draws and starts a new batch. Later submits load
    /// the target, so a frame may be split over several.
    fn flush(&mut self) {
        self.submit();
        self.batch.clear();
        self.ramps.recycle();
    }

    fn submit(&mut self) {
        if self.batch.ops.is_empty() {
            return;
        }
        let Some(view) = self.target.clone() else {
            if !self.warned_no_target {
                log::warn!("wgpu backend has no render target; dropping frame");
                self.warned_no_target = true;
            }
            return;
        };

        self.pipelines.ensure(&self.device, self.format);
        self.upload_batch();

        let stride = uniform_stride(&self.device) as u32;
        let Some(uniforms) = self.uniform_bind_group.as_ref() else { return };
        let Some(vbo) = self.vbo.as_ref() else { return };
        let Some(batch_vbo) = self.batch_vbo.as_ref() else { return };
        let Some(ibo) = self.ibo.as_ref() else { return };
        let Some(color) = self.pipelines.color.as_ref() else { return };
        let Some(color_replace) = self.pipelines.color_replace.as_ref() else { return };
        let Some(image) = self.pipelines.image.as_ref() else { return };
        let Some(gradient) = self.pipelines.gradient.as_ref() else { return };
        let Some(batch) = self.pipelines.batch.as_ref() else { return };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ovg frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ovg frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
            let mut batch_bound = None;

            for op in &self.batch.ops {
                let is_batch = matches!(op, DrawOp::Batch { .. });
                if batch_bound != Some(is_batch) {
                    let buffer = if is_batch { batch_vbo } else { vbo };
                    rpass.set_vertex_buffer(0, buffer.slice(..));
                    batch_bound = Some(is_batch);
                }
                match op {
                    DrawOp::Color { replace, uniform, indices } => {
                        rpass.set_pipeline(if *replace { color_replace } else { color });
                        rpass.set_bind_group(0, uniforms, &[uniform * stride]);
                        rpass.draw_indexed(indices.clone(), 0, 0..1);
                    }
                    DrawOp::Image { texture, filter, uniform, indices } => {
                        let Some(group) = self.textures.bind_group(*texture, *filter) else {
                            continue;
                        };
                        rpass.set_pipeline(image);
                        rpass.set_bind_group(0, uniforms, &[uniform * stride]);
                        rpass.set_bind_group(1, group, &[]);
                        rpass.draw_indexed(indices.clone(), 0, 0..1);
                    }
                    DrawOp::Gradient { uniform, indices } => {
                        let Some(ramps) = self.ramps.bind_group() else { continue };
                        rpass.set_pipeline(gradient);
                        rpass.set_bind_group(0, uniforms, &[uniform * stride]);
                        rpass.set_bind_group(1, ramps, &[]);
                        rpass.draw_indexed(indices.clone(), 0, 0..1);
                    }
                    DrawOp::Batch { uniform, indices } => {
                        rpass.set_pipeline(batch);
                        rpass.set_bind_group(0, uniforms, &[uniform * stride]);
                        rpass.draw_indexed(indices.clone(), 0, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        log::trace!("wgpu frame {} submitted: {} draws", self.frame_index, self.batch.ops.len());
    }

    /// Ramp row for `fill`, submitting staged draws to free the atlas when
    /// it is full.
    fn ramp_row(&mut self, fill: &GradientFill<'_>) -> Option<f32> {
        self.pipelines.ensure(&self.device, self.format);
        let layout = self.pipelines.texture_layout.as_ref()?;
        if let Some(v) = self.ramps.row_for(&self.device, &self.queue, layout, fill.ramp) {
            return Some(v);
        }
        self.flush();
        let layout = self.pipelines.texture_layout.as_ref()?;
        self.ramps.row_for(&self.device, &self.queue, layout, fill.ramp)
    }

    fn push_gradient(&mut self, cmd: &MeshDraw<'_>, fill: &GradientFill<'_>) {
        let Some(ramp_v) = self.ramp_row(fill) else {
            log::warn!("gradient ramp could not be uploaded; drawing ramp start");
            self.push_solid(cmd, cmd.paint.flat_color().to_array());
            return;
        };
        let user_to_paint = fill.user_to_paint;
        let (uniform, indices) = self.batch.push(
            cmd.mesh.vertices.iter().map(|&pos| Vertex {
                pos,
                uv: user_to_paint.transform_point(pos.into()).to_array(),
            }),
            cmd.mesh.indices.iter().copied(),
            DrawUniform::gradient(cmd.clip_matrix(), fill, ramp_v),
        );
        self.batch.ops.push(DrawOp::Gradient { uniform, indices });
    }

    fn push_solid(&mut self, cmd: &MeshDraw<'_>, color: [f32; 4]) {
        let (uniform, indices) = self.batch.push(
            cmd.mesh.vertices.iter().map(|&pos| Vertex { pos, uv: [0.0; 2] }),
            cmd.mesh.indices.iter().copied(),
            DrawUniform::solid(cmd.clip_matrix(), color),
        );
        self.batch.ops.push(DrawOp::Color { replace: false, uniform, indices });
    }
}

impl Backend for WgpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Wgpu
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width.max(1), height.max(1));
        if self.offscreen.is_some() {
            self.create_offscreen_target();
        }
    }

    fn begin_frame(&mut self) {
        self.batch.clear();
        self.ramps.recycle();
        self.pipelines.ensure(&self.device, self.format);
    }

    fn clear(&mut self, cmd: &ClearCmd) {
        let r = cmd.rect;
        let (x0, y0) = (r.x as f32, r.y as f32);
        let (x1, y1) = ((r.x + r.width) as f32, (r.y + r.height) as f32);
        let corners = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];

        let (w, h) = (self.size.0 as f32, self.size.1 as f32);
        let Ok(mvp) = Mat4::ortho(0.0, w, 0.0, h, -1.0, 1.0) else { return };

        let (uniform, indices) = self.batch.push(
            corners.map(|pos| Vertex { pos, uv: [0.0; 2] }),
            QUAD_INDICES,
            DrawUniform::solid(mvp, cmd.color.to_array()),
        );
        self.batch.ops.push(DrawOp::Color { replace: true, uniform, indices });
    }

    fn draw_mesh(&mut self, cmd: &MeshDraw<'_>) {
        if cmd.mesh.is_empty() {
            return;
        }
        match cmd.paint {
            MeshPaint::Solid(color) => self.push_solid(cmd, color.to_array()),
            MeshPaint::Gradient(fill) => self.push_gradient(cmd, &fill),
        }
    }

    fn draw_image(&mut self, cmd: &ImageDraw<'_>) {
        self.pipelines.ensure(&self.device, self.format);
        // Texture writes land before the next submit. Staged draws of the
        // old pixels go out first so they keep sampling them.
        if self.batch.textures.contains(&cmd.texture.buffer)
            && self.textures.would_overwrite(&cmd.texture)
        {
            log::trace!("image pixels changed mid-frame; submitting staged draws");
            self.flush();
        }
        let Some(layout) = self.pipelines.texture_layout.as_ref() else { return };
        self.textures
            .prepare(&self.device, &self.queue, layout, &cmd.texture, self.frame_index);

        let (uniform, indices) = self.batch.push(
            cmd.quad().map(|(pos, uv)| Vertex { pos, uv }),
            QUAD_INDICES,
            DrawUniform::solid(cmd.clip_matrix(), cmd.tint.to_array()),
        );
        self.batch.textures.insert(cmd.texture.buffer);
        self.batch.ops.push(DrawOp::Image {
            texture: cmd.texture.buffer,
            filter: cmd.filter,
            uniform,
            indices,
        });
    }

    fn draw_batch(&mut self, cmd: &BatchDraw<'_>) {
        if cmd.indices.is_empty() {
            return;
        }
        let (uniform, indices) = self
            .batch
            .push_batch(cmd, DrawUniform::solid(cmd.projection, [1.0; 4]));
        self.batch.ops.push(DrawOp::Batch { uniform, indices });
    }

    fn end_frame(&mut self) {
        self.flush();
        self.textures.evict_stale(self.frame_index);
        self.frame_index += 1;
    }
}

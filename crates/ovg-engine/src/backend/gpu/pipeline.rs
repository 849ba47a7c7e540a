use super::common::{batch_vertex_layout, premul_alpha_blend, Vertex, DRAW_UNIFORM_SIZE};

/// Render pipelines and layouts, created lazily for one target format.
#[derive(Default)]
pub(super) struct Pipelines {
    format: Option<wgpu::TextureFormat>,

    pub uniform_layout: Option<wgpu::BindGroupLayout>,
    pub texture_layout: Option<wgpu::BindGroupLayout>,

    /// Premultiplied-alpha blending.
    pub color: Option<wgpu::RenderPipeline>,
    /// No blending; writes replace the target (surface clears).
    pub color_replace: Option<wgpu::RenderPipeline>,
    pub image: Option<wgpu::RenderPipeline>,
    /// Per-fragment gradients sampling the ramp atlas.
    pub gradient: Option<wgpu::RenderPipeline>,
    /// Pre-colored batch triangles.
    pub batch: Option<wgpu::RenderPipeline>,
}

impl Pipelines {
    pub fn is_ready(&self, format: wgpu::TextureFormat) -> bool {
        self.format == Some(format)
            && self.color.is_some()
            && self.color_replace.is_some()
            && self.image.is_some()
            && self.gradient.is_some()
            && self.batch.is_some()
    }

    pub fn ensure(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.is_ready(format) {
            return;
        }

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ovg draw uniform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(DRAW_UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ovg image texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let color_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ovg color shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/color.wgsl").into()),
        });
        let image_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ovg image shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/image.wgsl").into()),
        });
        let gradient_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ovg gradient shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gradient.wgsl").into()),
        });
        let batch_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ovg batch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/batch.wgsl").into()),
        });

        let color_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ovg color pipeline layout"),
            bind_group_layouts: &[&uniform_layout],
            immediate_size: 0,
        });
        let image_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ovg image pipeline layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        self.color = Some(build_pipeline(
            device,
            "ovg color pipeline",
            &color_layout,
            &color_shader,
            Vertex::layout(),
            format,
            Some(premul_alpha_blend()),
        ));
        self.color_replace = Some(build_pipeline(
            device,
            "ovg clear pipeline",
            &color_layout,
            &color_shader,
            Vertex::layout(),
            format,
            None,
        ));
        self.image = Some(build_pipeline(
            device,
            "ovg image pipeline",
            &image_layout,
            &image_shader,
            Vertex::layout(),
            format,
            Some(premul_alpha_blend()),
        ));
        self.gradient = Some(build_pipeline(
            device,
            "ovg gradient pipeline",
            &image_layout,
            &gradient_shader,
            Vertex::layout(),
            format,
            Some(premul_alpha_blend()),
        ));
        self.batch = Some(build_pipeline(
            device,
            "ovg batch pipeline",
            &color_layout,
            &batch_shader,
            batch_vertex_layout(),
            format,
            Some(premul_alpha_blend()),
        ));

        self.format = Some(format);
        self.uniform_layout = Some(uniform_layout);
        self.texture_layout = Some(texture_layout);
        log::debug!("wgpu pipelines built for {format:?}");
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

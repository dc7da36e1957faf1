//! Render pipeline management
//!
//! Pipelines are registered as [`PipelineConfig`]s and built lazily on first
//! use. Several pipelines can share one shader module through different
//! entry points.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use super::vertex::Vertex3D;

/// Depth test and write state for a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthConfig {
    pub format: TextureFormat,
    pub write: bool,
    pub compare: CompareFunction,
}

impl DepthConfig {
    /// Nearest fragment wins and is recorded
    pub fn standard(format: TextureFormat) -> Self {
        Self {
            format,
            write: true,
            compare: CompareFunction::Less,
        }
    }

    /// Tested but not written; used for geometry pinned to the far plane
    pub fn backdrop(format: TextureFormat) -> Self {
        Self {
            format,
            write: false,
            compare: CompareFunction::LessEqual,
        }
    }
}

/// Configuration for creating a render pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub vertex_entry: String,
    pub fragment_entry: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth: Option<DepthConfig>,
    pub color_format: TextureFormat,
}

impl PipelineConfig {
    /// Triangle list, back-face culled, no depth, replacing color
    ///
    /// # Arguments
    /// * `label` - Debug label for the pipeline
    /// * `shader` - Name the shader was loaded under
    /// * `color_format` - Format of the single color target
    pub fn new(label: &str, shader: &str, color_format: TextureFormat) -> Self {
        Self {
            label: label.to_string(),
            shader: shader.to_string(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth: None,
            color_format,
        }
    }

    /// Sets the vertex and fragment entry points (builder pattern)
    pub fn with_entry_points(mut self, vertex: &str, fragment: &str) -> Self {
        self.vertex_entry = vertex.to_string();
        self.fragment_entry = fragment.to_string();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Sets all bind group layouts at once (builder pattern)
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing (builder pattern)
    pub fn with_depth(mut self, depth: DepthConfig) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Sets primitive topology (builder pattern)
    pub fn with_primitive_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.primitive_topology = topology;
        self
    }
}

/// Caches shader modules and lazily built pipelines by name
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
}

impl PipelineManager {
    /// # Arguments
    /// * `device` - Shared wgpu device for creating resources
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
        }
    }

    /// Compiles a WGSL module and stores it under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shader_modules.insert(name.to_string(), module);
    }

    /// Registers a pipeline without creating it
    ///
    /// Re-registering a name drops the pipeline built from the old config.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipelines.remove(name);
        self.pipeline_configs.insert(name.to_string(), config);
    }

    /// Builds every registered pipeline that is not built yet
    ///
    /// # Returns
    /// One message per pipeline that could not be created
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let names: Vec<String> = self.pipeline_configs.keys().cloned().collect();
        for name in names {
            if let Err(e) = self.ensure_pipeline(&name) {
                errors.push(format!("pipeline '{name}': {e}"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A built pipeline; `None` until [`ensure_pipeline`](Self::ensure_pipeline) succeeded for it
    pub fn pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Builds `name` from its registered config unless it is already built
    pub fn ensure_pipeline(&mut self, name: &str) -> Result<(), String> {
        if self.pipelines.contains_key(name) {
            return Ok(());
        }
        let config = self
            .pipeline_configs
            .get(name)
            .ok_or_else(|| format!("pipeline '{name}' is not registered"))?;
        let pipeline = self.create_pipeline_from_config(config)?;
        self.pipelines.insert(name.to_string(), pipeline);
        Ok(())
    }

    fn create_pipeline_from_config(&self, config: &PipelineConfig) -> Result<RenderPipeline, String> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| format!("shader '{}' not found", config.shader))?;

        let layout_refs: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", config.label)),
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            });

        let depth_stencil = config.depth.map(|depth| DepthStencilState {
            format: depth.format,
            depth_write_enabled: depth.write,
            depth_compare: depth.compare,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        Ok(self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some(&config.vertex_entry),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: Some(FragmentState {
                    module: shader,
                    entry_point: Some(&config.fragment_entry),
                    targets: &[Some(ColorTargetState {
                        format: config.color_format,
                        blend: Some(BlendState::REPLACE),
                        write_mask: ColorWrites::ALL,
                    })],
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: MultisampleState::default(),
                multiview: None,
                cache: None,
            }))
    }
}

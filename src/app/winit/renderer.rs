//! Forward wgpu renderer.
//!
//! Draws every visible part that carries a mesh with one pipeline: a shared
//! frame uniform (camera and lights) in group 0 and a per-part uniform
//! (world matrix, normal matrix, material color) in group 1. GPU buffers are
//! created lazily the first time a mesh or part is seen and live as long as
//! the renderer.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::app::winit::ui_pass::UiPass;
use crate::errors::{Result, ViewerError};
use crate::scene::{Camera, LightKind, MeshKey, NodeHandle, Scene};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct FrameUniforms {
    view_projection: [[f32; 4]; 4],
    sky_color: [f32; 4],
    ground_color: [f32; 4],
    sun_color: [f32; 4],
    sun_direction: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
}

struct GpuMesh {
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

struct GpuObject {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// What to do with the surface after trying to acquire a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Keep,
    /// The frame is still drawable; reconfigure once it has been presented.
    ReconfigureAfterPresent,
    /// No frame; reconfigure and try again next redraw.
    Reconfigure,
    /// No frame; leave the surface alone.
    Skip,
}

impl SurfaceRecovery {
    fn for_status(status: &wgpu::CurrentSurfaceTexture) -> Self {
        match status {
            wgpu::CurrentSurfaceTexture::Success(_) => Self::Keep,
            wgpu::CurrentSurfaceTexture::Suboptimal(_) => Self::ReconfigureAfterPresent,
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                Self::Reconfigure
            }
            wgpu::CurrentSurfaceTexture::Timeout | wgpu::CurrentSurfaceTexture::Occluded => {
                Self::Skip
            }
            wgpu::CurrentSurfaceTexture::Validation => {
                log::error!("Surface texture acquisition failed validation");
                Self::Skip
            }
        }
    }
}

pub struct Renderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,

    meshes: SecondaryMap<MeshKey, GpuMesh>,
    objects: SecondaryMap<NodeHandle, GpuObject>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ViewerError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Part Viewer Device"),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| ViewerError::AdapterRequestFailed("Surface not supported by adapter".to_string()))?;
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let frame_layout = uniform_layout(&device, "Frame Uniforms Layout");
        let object_layout = uniform_layout(&device, "Object Uniforms Layout");

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let pipeline = create_pipeline(&device, config.format, &frame_layout, &object_layout);

        log::info!(
            "Renderer ready: {} ({:?}), surface {:?} {}x{}",
            adapter.get_info().name,
            adapter.get_info().backend,
            config.format,
            config.width,
            config.height
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            meshes: SecondaryMap::new(),
            objects: SecondaryMap::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    #[inline]
    #[must_use]
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
        }
    }

    /// Draws the scene, then the UI overlay on top, and presents.
    pub fn render(&mut self, scene: &Scene, camera: &Camera, ui: &mut UiPass) {
        let acquired = self.surface.get_current_texture();
        let recovery = SurfaceRecovery::for_status(&acquired);
        let output = match acquired {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            _ => {
                if recovery == SurfaceRecovery::Reconfigure {
                    self.surface.configure(&self.device, &self.config);
                }
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.write_frame_uniforms(scene, camera);
        self.sync_scene(scene);
        ui.prepare(&self.device, &self.queue);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let bg = scene.background;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(bg.x),
                            g: f64::from(bg.y),
                            b: f64::from(bg.z),
                            a: f64::from(bg.w),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for (handle, node) in &scene.nodes {
                if !node.visible {
                    continue;
                }
                let Some(mesh_key) = node.mesh else {
                    continue;
                };
                let (Some(gpu_mesh), Some(object)) = (self.meshes.get(mesh_key), self.objects.get(handle)) else {
                    continue;
                };

                pass.set_bind_group(1, &object.bind_group, &[]);
                pass.set_vertex_buffer(0, gpu_mesh.positions.slice(..));
                pass.set_vertex_buffer(1, gpu_mesh.normals.slice(..));
                pass.set_index_buffer(gpu_mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..gpu_mesh.index_count, 0, 0..1);
            }
        }

        ui.record(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if recovery == SurfaceRecovery::ReconfigureAfterPresent {
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn write_frame_uniforms(&self, scene: &Scene, camera: &Camera) {
        let mut uniforms = FrameUniforms {
            view_projection: camera.view_projection_matrix().to_cols_array_2d(),
            sky_color: [0.0; 4],
            ground_color: [0.0; 4],
            sun_color: [0.0; 4],
            sun_direction: [0.0, 1.0, 0.0, 0.0],
        };

        for light in &scene.lights {
            match light.kind {
                LightKind::Hemisphere(hemi) => {
                    uniforms.sky_color = light.color.extend(light.intensity).to_array();
                    uniforms.ground_color = hemi.ground_color.extend(1.0).to_array();
                }
                LightKind::Directional(sun) => {
                    uniforms.sun_color = light.color.extend(light.intensity).to_array();
                    uniforms.sun_direction = (-sun.direction()).extend(0.0).to_array();
                }
            }
        }

        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Uploads meshes seen for the first time and refreshes per-part uniforms.
    fn sync_scene(&mut self, scene: &Scene) {
        for (key, mesh) in &scene.meshes {
            if self.meshes.contains_key(key) || mesh.indices.is_empty() {
                continue;
            }
            let gpu_mesh = GpuMesh {
                positions: self.create_init_buffer("Positions", bytemuck::cast_slice(&mesh.positions), wgpu::BufferUsages::VERTEX),
                normals: self.create_init_buffer("Normals", bytemuck::cast_slice(&mesh.normals), wgpu::BufferUsages::VERTEX),
                indices: self.create_init_buffer("Indices", bytemuck::cast_slice(&mesh.indices), wgpu::BufferUsages::INDEX),
                index_count: mesh.indices.len() as u32,
            };
            self.meshes.insert(key, gpu_mesh);
        }

        for (handle, node) in &scene.nodes {
            if node.mesh.is_none() {
                continue;
            }

            let model = Mat4::from(*node.world_matrix());
            let color = scene
                .node_material(handle)
                .map_or(Vec4::ONE, |m| m.color);
            let uniforms = ObjectUniforms {
                model: model.to_cols_array_2d(),
                normal_matrix: model.inverse().transpose().to_cols_array_2d(),
                color: color.to_array(),
            };

            if !self.objects.contains_key(handle) {
                let object = self.create_object();
                self.objects.insert(handle, object);
            }
            if let Some(object) = self.objects.get(handle) {
                self.queue
                    .write_buffer(&object.buffer, 0, bytemuck::bytes_of(&uniforms));
            }
        }
    }

    fn create_init_buffer(&self, label: &str, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage,
            })
    }

    fn create_object(&self) -> GpuObject {
        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniforms"),
            size: size_of::<ObjectUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        GpuObject { buffer, bind_group }
    }
}

// ============================================================================
// Setup helpers
// ============================================================================

fn uniform_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Part Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/part.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Part Pipeline Layout"),
        bind_group_layouts: &[Some(frame_layout), Some(object_layout)],
        immediate_size: 0,
    });

    let vertex_layouts = [
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vec3>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 0,
            }],
        },
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Vec3>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 1,
            }],
        },
    ];

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Part Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &vertex_layouts,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // Parts are shaded on both sides; the fragment stage flips back-face normals.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_and_outdated_surfaces_are_reconfigured() {
        for status in [wgpu::CurrentSurfaceTexture::Lost, wgpu::CurrentSurfaceTexture::Outdated] {
            assert_eq!(SurfaceRecovery::for_status(&status), SurfaceRecovery::Reconfigure);
        }
    }

    #[test]
    fn transient_failures_skip_the_frame() {
        for status in [
            wgpu::CurrentSurfaceTexture::Timeout,
            wgpu::CurrentSurfaceTexture::Occluded,
            wgpu::CurrentSurfaceTexture::Validation,
        ] {
            assert_eq!(SurfaceRecovery::for_status(&status), SurfaceRecovery::Skip);
        }
    }
}

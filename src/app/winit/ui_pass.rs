//! egui overlay: the color swatch panel and the part tooltip.
//!
//! Per frame:
//!
//! ```text
//! handle_input()        // forward winit events to egui
//! begin_frame(window)
//! draw_overlay(ctx, viewer)
//! end_frame(window)     // tessellate, capture texture delta
//! prepare(device, queue)
//! record(encoder, view) // draws on top of the scene pass
//! ```

use wgpu::{Device, TextureFormat};
use winit::event::WindowEvent;
use winit::window::Window;

use crate::viewer::Viewer;

pub struct UiPass {
    egui_ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,

    clipped_primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen_descriptor: egui_wgpu::ScreenDescriptor,
}

impl UiPass {
    pub fn new(device: &Device, output_format: TextureFormat, window: &Window) -> Self {
        let size = window.inner_size();
        let egui_ctx = egui::Context::default();

        let id = egui_ctx.viewport_id();
        let state = egui_winit::State::new(egui_ctx.clone(), id, window, None, None, None);

        let renderer =
            egui_wgpu::Renderer::new(device, output_format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            state,
            renderer,
            clipped_primitives: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
            screen_descriptor: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Forwards a winit event to egui. Returns `true` when egui consumed it.
    ///
    /// Button releases are never reported as consumed, so a drag that ends
    /// over a panel still ends for the orbit controls.
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);

        if let WindowEvent::MouseInput {
            state: winit::event::ElementState::Released,
            ..
        } = event
        {
            return false;
        }

        response.consumed
    }

    /// Whether the pointer is over a panel or the tooltip.
    pub fn pointer_over_ui(&self) -> bool {
        self.egui_ctx.is_pointer_over_area()
    }

    pub fn begin_frame(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.egui_ctx.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self, window: &Window) {
        let egui::FullOutput {
            shapes,
            textures_delta,
            platform_output,
            ..
        } = self.egui_ctx.end_pass();

        self.state.handle_platform_output(window, platform_output);
        self.textures_delta = textures_delta;
        self.clipped_primitives = self
            .egui_ctx
            .tessellate(shapes, self.egui_ctx.pixels_per_point());
    }

    pub fn context(&self) -> &egui::Context {
        &self.egui_ctx
    }

    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        self.screen_descriptor.size_in_pixels = [width, height];
        self.screen_descriptor.pixels_per_point = scale_factor;
    }

    /// Uploads egui textures and geometry for this frame.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui buffer upload"),
        });
        let user_cmd_bufs = self.renderer.update_buffers(
            device,
            queue,
            &mut encoder,
            &self.clipped_primitives,
            &self.screen_descriptor,
        );
        let mut cmd_bufs: Vec<wgpu::CommandBuffer> = Vec::with_capacity(1 + user_cmd_bufs.len());
        cmd_bufs.push(encoder.finish());
        cmd_bufs.extend(user_cmd_bufs);
        queue.submit(cmd_bufs);

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
        self.textures_delta.set.clear();
        self.textures_delta.free.clear();
    }

    /// Records the overlay pass on top of `view`.
    pub fn record(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
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
            })
            .forget_lifetime();

        self.renderer
            .render(&mut rpass, &self.clipped_primitives, &self.screen_descriptor);
    }
}

/// Draws the swatch panel and the tooltip. Returns the color value of the
/// swatch clicked this frame.
pub fn draw_overlay(ctx: &egui::Context, viewer: &Viewer) -> Option<String> {
    let mut selected = None;

    egui::Window::new("Color")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .collapsible(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for swatch in viewer.color_controls.swatches() {
                    if ui.button(&swatch.label).clicked() {
                        selected = Some(swatch.value.clone());
                    }
                }
            });
        });

    let tooltip = &viewer.tooltip;
    if tooltip.visible
        && let Some(info) = &tooltip.content
    {
        let pos = tooltip.screen_position(ctx.pixels_per_point());
        egui::Area::new(egui::Id::new("part_tooltip"))
            .fixed_pos([pos.x, pos.y])
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.strong(&info.label);
                    ui.label(format!("Material: {}", info.material));
                    ui.label(&info.description);
                });
            });
    }

    selected
}

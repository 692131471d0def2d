//! Winit front end.
//!
//! [`App`] opens the window described by the config, initializes the GPU on
//! the first `resumed` call and then drives the [`Viewer`] from the event
//! loop: window events go through [`input_adapter`] into viewer events, and
//! every redraw runs one `tick`, the egui overlay and one rendered frame.
//!
//! ```rust,ignore
//! let config = ViewerConfig::load()?;
//! App::new(config).run()?;
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::config::ViewerConfig;
use crate::errors::{Result, ViewerError};
use crate::utils::Timer;
use crate::viewer::{Viewer, ViewerEvent};

pub mod input_adapter;
pub mod renderer;
pub mod ui_pass;

use renderer::Renderer;
use ui_pass::UiPass;

/// Windowed viewer application.
pub struct App {
    config: ViewerConfig,
}

impl App {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Runs the event loop until the window closes. Blocks the current thread.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.config);
        event_loop.run_app(&mut runner)?;

        match runner.fatal_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct Gpu {
    renderer: Renderer,
    ui: UiPass,
}

/// Winit `ApplicationHandler` owning the viewer and its GPU side.
struct AppRunner {
    viewer: Viewer,
    timer: Timer,
    window: Option<Arc<Window>>,
    gpu: Option<Gpu>,
    fatal_error: Option<ViewerError>,
}

impl AppRunner {
    fn new(config: ViewerConfig) -> Self {
        Self {
            viewer: Viewer::from_config(config),
            timer: Timer::new(),
            window: None,
            gpu: None,
            fatal_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.viewer.config.window;
        let window_attributes = Window::default_attributes()
            .with_title(&window_config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                f64::from(window_config.width),
                f64::from(window_config.height),
            ));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.window = Some(window.clone());

        log::info!("Initializing Renderer Backend...");

        let size = window.inner_size();
        let renderer = pollster::block_on(Renderer::new(window.clone(), size.width, size.height))?;
        let ui = UiPass::new(renderer.device(), renderer.surface_format(), &window);
        self.gpu = Some(Gpu { renderer, ui });

        self.viewer.resize(size.width, size.height);
        self.viewer.start_loading();
        self.timer = Timer::new();
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };

        let dt = self.timer.tick();
        self.viewer.handle_event(ViewerEvent::Frame(dt));

        gpu.ui.begin_frame(window);
        let selected = ui_pass::draw_overlay(gpu.ui.context(), &self.viewer);
        gpu.ui.end_frame(window);

        if let Some(value) = selected {
            self.viewer.handle_event(ViewerEvent::ColorSelected(value));
        }

        gpu.renderer
            .render(&self.viewer.scene, &self.viewer.camera, &mut gpu.ui);
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("Fatal Renderer Error: {e}");
            self.fatal_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::RedrawRequested) {
            self.redraw();
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            return;
        }

        let (Some(window), Some(gpu)) = (&self.window, &mut self.gpu) else {
            return;
        };

        let consumed = gpu.ui.handle_input(window, &event);

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(size) => {
                gpu.renderer.resize(size.width, size.height);
                gpu.ui
                    .resize(size.width, size.height, window.scale_factor() as f32);
            }
            _ => {}
        }

        if consumed && !matches!(event, WindowEvent::Resized(_)) {
            return;
        }

        if let Some(viewer_event) = input_adapter::process_window_event(&mut self.viewer.input, &event) {
            // A release over the swatch panel is a button press, not a pick.
            if matches!(viewer_event, ViewerEvent::Click(_)) && gpu.ui.pointer_over_ui() {
                return;
            }
            self.viewer.handle_event(viewer_event);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.gpu.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}

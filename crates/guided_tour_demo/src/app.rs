// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo window setup and event loop.

use crate::scene::DemoScene;
use egui_wgpu::wgpu;
use guided_tour_core::{TourError, TourSettings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Demo application errors
#[derive(Debug, Error)]
pub enum DemoError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    /// Tour settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] TourError),
}

/// Result type for demo operations
pub type Result<T> = std::result::Result<T, DemoError>;

fn init_err(e: impl std::fmt::Display) -> DemoError {
    DemoError::RendererInit(e.to_string())
}

/// Window surface plus the egui renderer drawing into it
struct GpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: egui_wgpu::Renderer,
}

/// Backdrop behind the menu
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.08,
    g: 0.09,
    b: 0.12,
    a: 1.0,
};

impl GpuSurface {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window).map_err(init_err)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..Default::default()
        }))
        .ok_or_else(|| init_err("no suitable GPU adapter"))?;
        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default(), None))
                .map_err(init_err)?;

        let mut config = surface
            .get_default_config(&adapter, size.width.max(1), size.height.max(1))
            .ok_or_else(|| init_err("surface is not supported by the adapter"))?;
        // egui blends in gamma space and prefers a non-sRGB target
        if let Some(linear) = surface
            .get_capabilities(&adapter)
            .formats
            .into_iter()
            .find(|f| !f.is_srgb())
        {
            config.format = linear;
        }
        config.present_mode = wgpu::PresentMode::AutoVsync;
        surface.configure(&device, &config);

        let renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn draw(
        &mut self,
        egui_ctx: &egui::Context,
        output: egui::FullOutput,
        pixels_per_point: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let target = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point,
        };

        let primitives = egui_ctx.tessellate(output.shapes, output.pixels_per_point);
        for (id, delta) in &output.textures_delta.set {
            self.renderer.update_texture(&self.device, &self.queue, *id, delta);
        }

        let mut encoder = self.device.create_command_encoder(&Default::default());
        self.renderer
            .update_buffers(&self.device, &self.queue, &mut encoder, &primitives, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("guided tour overlay"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &primitives, &screen);
        }

        self.queue.submit([encoder.finish()]);
        frame.present();

        for id in &output.textures_delta.free {
            self.renderer.free_texture(id);
        }
        Ok(())
    }
}

/// Load settings from `path`, writing the defaults there first if it does not exist
fn load_or_create_settings(path: &Path) -> Result<TourSettings> {
    if path.exists() {
        return Ok(TourSettings::load(path)?);
    }
    let settings = TourSettings::default();
    settings.save(path)?;
    tracing::info!("Wrote default tour settings to {}", path.display());
    Ok(settings)
}

/// Running state of the demo
struct DemoRunning {
    window: Arc<Window>,
    gpu: GpuSurface,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    scene: DemoScene,
}

/// Demo application
pub struct DemoApp {
    settings: TourSettings,
    running: Option<DemoRunning>,
    /// Set when startup fails inside the event loop
    error: Option<DemoError>,
}

impl DemoApp {
    /// Create a demo with the given tour settings
    pub fn new(settings: TourSettings) -> Self {
        Self {
            settings,
            running: None,
            error: None,
        }
    }

    /// Load settings, open the window, and run until it closes
    pub fn run(settings_path: Option<PathBuf>) -> Result<()> {
        let settings = match settings_path {
            Some(path) => load_or_create_settings(&path)?,
            None => TourSettings::default(),
        };

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = DemoApp::new(settings);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<DemoRunning> {
        tracing::info!("Creating demo window...");

        let window_attrs = Window::default_attributes()
            .with_title("Guided Tour Demo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .with_min_inner_size(winit::dpi::LogicalSize::new(640, 480));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| DemoError::WindowCreation(e.to_string()))?,
        );

        let gpu = GpuSurface::new(window.clone())?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024),
        );

        let scene = DemoScene::new(&self.settings);

        tracing::info!("Demo initialized, window size {:?}", window.inner_size());

        Ok(DemoRunning {
            window,
            gpu,
            egui_ctx,
            egui_state,
            scene,
        })
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.gpu.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    running.scene.update(ctx);
                });

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                let pixels_per_point = running.window.scale_factor() as f32;
                match running.gpu.draw(&running.egui_ctx, full_output, pixels_per_point) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.gpu.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

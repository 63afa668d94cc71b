//! Window and frame loop.
//!
//! [`run`] opens a window, builds the [`Renderer`] once the event loop is
//! resumed, and then on every redraw: measures the frame time, advances the
//! scene by whole ticks, and draws. The window title shows the scene status.
//!
//! Errors in callbacks are stored and returned after the loop exits.

use std::sync::Arc;

use log::{debug, error, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::ViewerError;
use crate::gpu::{Frame, Renderer};
use crate::input::{Command, Input};
use crate::particles::PointVertex;
use crate::scene::Scene;
use crate::time::Clock;

const APP_NAME: &str = "Tinsel";

/// Open a window and run the scene until it is closed.
pub fn run(config: SceneConfig) -> Result<(), ViewerError> {
    let scene = Scene::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut viewer = Viewer::new(scene);
    event_loop.run_app(&mut viewer)?;

    match viewer.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Vertex staging reused between frames.
#[derive(Default)]
struct Staging {
    tree: Vec<PointVertex>,
    snow: Vec<PointVertex>,
    fireworks: Vec<PointVertex>,
}

struct Viewer {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    scene: Scene,
    input: Input,
    clock: Clock,
    staging: Staging,
    title: String,
    error: Option<ViewerError>,
}

impl Viewer {
    fn new(scene: Scene) -> Self {
        Self {
            window: None,
            renderer: None,
            scene,
            input: Input::new(),
            clock: Clock::new(),
            staging: Staging::default(),
            title: String::new(),
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("{}", err);
        self.error = Some(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.scene.teardown();
        event_loop.exit();
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, command: Command) {
        match command {
            Command::Action(action) => {
                self.scene.apply(action);
            }
            Command::DragStart => self.scene.begin_drag(),
            Command::Drag(delta) => self.scene.drag(delta),
            Command::DragEnd => self.scene.end_drag(),
            Command::Zoom(lines) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.zoom(lines);
                }
            }
            Command::Quit => self.shutdown(event_loop),
        }
    }

    fn refresh_title(&mut self) {
        let title = format!("{} · {}", APP_NAME, self.scene.status());
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.update();
        self.scene.update(dt);
        self.refresh_title();

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        let size = self.window.as_ref().map(|w| w.inner_size());
        if size.is_some_and(|s| s.width == 0 || s.height == 0) {
            return;
        }

        self.scene.particles().write_vertices(&mut self.staging.tree);
        self.scene.snow().write_vertices(&mut self.staging.snow);
        self.scene.fireworks().write_vertices(&mut self.staging.fireworks);

        let frame = Frame {
            tree: &self.staging.tree,
            tree_model: glam::Mat4::from_quat(self.scene.tree_orientation()),
            snow: &self.staging.snow,
            fireworks: &self.staging.fireworks,
        };

        match renderer.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("surface lost, reconfiguring");
                renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.shutdown(event_loop);
            }
            Err(wgpu::SurfaceError::Timeout) => debug!("surface timeout, skipping frame"),
            Err(e) => warn!("render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for Viewer {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = Window::default_attributes()
            .with_title(APP_NAME)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.window = Some(window.clone());

        let tree = self.scene.particles().len();
        let snow = self.scene.snow().len();
        match pollster::block_on(Renderer::new(window.clone(), tree, snow)) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(err) => return self.fail(event_loop, err.into()),
        }

        self.refresh_title();
        self.clock = Clock::new();
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => {
                if let Some(command) = self.input.handle_event(&other) {
                    self.dispatch(event_loop, command);
                }
            }
        }
    }
}

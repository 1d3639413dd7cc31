use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use car_scene::cli::Cli;
use car_scene::config::SceneConfig;
use car_scene::core::{FpsCounter, FrameClock, WinitController, FPS_UPDATE_INTERVAL};
use car_scene::renderer::Renderer;
use car_scene::state::{InputOutcome, SceneState};

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    state: SceneState,
    controller: WinitController,
    clock: FrameClock,
    fps: FpsCounter,
    /// Set when the app has to stop with an error; returned from `main`
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let state = SceneState::new(&config);
        Self {
            config,
            window: None,
            renderer: None,
            state,
            controller: WinitController::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(FPS_UPDATE_INTERVAL),
            fatal: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let window = &self.config.window;
        let attributes = Window::default_attributes().with_title(window.title.clone());
        if window.fullscreen {
            attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
        } else {
            attributes.with_inner_size(winit::dpi::PhysicalSize::new(window.width, window.height))
        }
    }

    fn capture_cursor(window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        if let Err(e) = grabbed {
            log::warn!("Cursor grab unavailable: {}", e);
        }
        window.set_cursor_visible(false);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame) = self.clock.next() else {
            return;
        };
        if self.fps.tick(frame.delta) {
            log::debug!("FPS: {:.1}", self.fps.fps());
        }

        if self.state.apply_input(&self.controller, frame.delta) == InputOutcome::Exit {
            event_loop.exit();
            return;
        }
        self.state.update(&frame);
        self.controller.reset_deltas();

        let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) else {
            return;
        };
        match renderer.render(&self.state, window, self.fps.fps()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout, frame skipped"),
            Err(e) => {
                let error = anyhow::Error::new(e).context("Surface error");
                self.fail(event_loop, error);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("Failed to create window"));
                return;
            }
        };

        let renderer = match pollster::block_on(Renderer::new(window.clone(), &self.config)) {
            Ok(renderer) => renderer,
            Err(e) => {
                self.fail(event_loop, e.context("Failed to initialize renderer"));
                return;
            }
        };

        Self::capture_cursor(&window);
        self.window = Some(window);
        self.renderer = Some(renderer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(renderer), Some(window)) = (&mut self.renderer, &self.window) {
            if renderer.handle_event(window, &event) {
                return;
            }
        }

        self.controller.process_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        self.controller.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = SceneConfig::from_cli(&cli)?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);

    log::info!(
        "Controls: WASD free camera, arrows drive, O/L lift, P/; aim headlights, \
         N/M night/day, U/J Blinn/Phong, I/K fog, Y/H overlay, 1/2/3 cameras, Escape quits"
    );
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

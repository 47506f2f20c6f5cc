//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - Driving the arena session once per event-loop iteration

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};
use input_manager::InputManager;
use log::{error, trace, warn};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::{
    core::config::GameConfig,
    engine_state::{buffer_state::WgpuMeshBackend, rendering::WorldRenderer, EngineState},
};

/// Longest frame the simulation is stepped by. Longer stalls slow the game down
/// instead of teleporting everything.
const MAX_FRAME_SECONDS: f32 = 0.1;

/// The main application state container that manages the application's lifecycle.
///
/// It implements `ApplicationHandler` to handle window and device events.
pub struct ApplicationState {
    /// Graphics initialization progress
    pub graphics: MaybeGraphics,

    /// The running session, once graphics exist
    pub state: Option<InitializedApplicationState>,

    /// Settings the session is started with
    pub config: GameConfig,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The arena session
    pub engine_state: EngineState<WgpuMeshBackend>,

    /// Draws the session to the window
    pub renderer: WorldRenderer,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl ApplicationState {
    /// Creates the application, waiting for the first resume to build graphics.
    pub fn new(config: GameConfig, event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            config,
        }
    }
}

/// Hides the cursor and keeps it inside the window for mouse look.
fn capture_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Confined)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked));
    if let Err(err) = grabbed {
        warn!("Could not grab the cursor: {}", err);
    }
    window.set_cursor_visible(false);
}

impl InitializedApplicationState {
    /// Shows weapon, ammo and health in the window title.
    fn update_title(&self) {
        let arsenal = self.engine_state.arsenal();
        let weapon = arsenal.current();
        let health = self.engine_state.player_health();
        let title = if self.engine_state.is_booted() {
            format!(
                "voxel-arena | {:?} {} | health {}",
                weapon,
                arsenal.slot(weapon).ammo,
                health.current
            )
        } else {
            "voxel-arena | loading".to_string()
        };
        self.window.set_title(&title);
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let is_exit = matches!(
            event,
            WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event: KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                    ..
                }
        );
        if is_exit {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.renderer.resize(size.width, size.height);
                state.engine_state.resize(size.width, size.height);
            }
            WindowEvent::Focused(is_focused) => {
                if is_focused {
                    capture_cursor(&state.window);
                } else {
                    state.input_manager.reset_inputs();
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = state.renderer.render(&state.engine_state) {
                    error!("Rendering failed: {}", err);
                    event_loop.exit();
                }
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Starts graphics initialization on the first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the graphics resources and starts the session.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        let Graphics {
            window,
            surface,
            surface_config,
            device,
            queue,
        } = graphics;
        let (width, height) = (surface_config.width, surface_config.height);

        let renderer = WorldRenderer::new(surface, surface_config, device, queue);
        let mut engine_state = EngineState::new(self.config.clone(), renderer.mesh_backend());
        engine_state.resize(width, height);

        capture_cursor(&window);

        self.state = Some(InitializedApplicationState {
            engine_state,
            renderer,
            window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
        self.graphics = MaybeGraphics::Moved;
    }

    /// Steps the session by the time since the last call and requests a frame.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };

        let now = web_time::Instant::now();
        let dt = (now - state.last_wait_time)
            .as_secs_f32()
            .min(MAX_FRAME_SECONDS);
        state.last_wait_time = now;

        let tick_input = state.input_manager.get_and_reset_processed_input().tick_input();
        if let Err(err) = state.engine_state.tick(&tick_input, dt) {
            error!("Simulation stopped: {}", err);
            event_loop.exit();
            return;
        }

        for request in state.engine_state.drain_sound_requests() {
            trace!(
                "Sound {:?} at {:?}, volume {:.2}",
                request.id,
                request.position,
                request.volume
            );
        }

        state.update_title();
        state.window.request_redraw();
    }
}

//! Window and event loop: turns winit input into pointer events and asks for
//! one frame per loop iteration until the stop handle trips.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::glam::{vec2, Vec2};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, KeyEvent, Touch, TouchPhase, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::config::Config;
use crate::driver::FrameDriver;
use crate::graphics::Graphics;
use crate::pointer::{PointerEvent, PointerId};

fn to_vec2(position: PhysicalPosition<f64>) -> Vec2 {
    vec2(position.x as f32, position.y as f32)
}

fn touch_event(touch: Touch) -> PointerEvent {
    finger_event(touch.id, touch.phase, to_vec2(touch.location))
}

fn finger_event(finger: u64, phase: TouchPhase, position: Vec2) -> PointerEvent {
    let id = PointerId::Touch(finger);
    match phase {
        TouchPhase::Started => PointerEvent::Down(id, position),
        TouchPhase::Moved => PointerEvent::Move(id, position),
        TouchPhase::Ended | TouchPhase::Cancelled => PointerEvent::Up,
    }
}

pub fn run(config: &Config) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("portal-cave")
            .with_inner_size(LogicalSize::new(800.0, 600.0))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut graphics = futures::executor::block_on(Graphics::new(
        window,
        config.backend,
        config.cpu_scale,
    ))
    .context("failed to initialize graphics")?;

    let size = graphics.window().inner_size();
    let mut driver = FrameDriver::new(size.width, size.height);
    let stop = driver.stop_handle();
    // winit reports button presses without a position.
    let mut cursor: Option<Vec2> = None;

    tracing::info!(
        backend = config.backend.as_str(),
        width = size.width,
        height = size.height,
        "starting frame loop"
    );

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == graphics.window().id() => {
            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Named(NamedKey::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => stop.stop(),
                WindowEvent::Resized(size) => {
                    tracing::debug!(width = size.width, height = size.height, "resized");
                    graphics.resize(size);
                    driver.resize(size.width, size.height);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = graphics.window().inner_size();
                    graphics.resize(size);
                    driver.resize(size.width, size.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let position = to_vec2(position);
                    cursor = Some(position);
                    driver
                        .pointers_mut()
                        .handle(PointerEvent::Move(PointerId::Mouse, position));
                }
                WindowEvent::MouseInput { state, .. } => match (state, cursor) {
                    (ElementState::Pressed, Some(position)) => driver
                        .pointers_mut()
                        .handle(PointerEvent::Down(PointerId::Mouse, position)),
                    (ElementState::Pressed, None) => {}
                    (ElementState::Released, _) => driver.pointers_mut().handle(PointerEvent::Up),
                },
                WindowEvent::CursorLeft { .. } => {
                    cursor = None;
                    driver.pointers_mut().handle(PointerEvent::Leave);
                }
                WindowEvent::Touch(touch) => driver.pointers_mut().handle(touch_event(touch)),
                WindowEvent::RedrawRequested => {
                    let Some(constants) = driver.tick() else {
                        return;
                    };
                    match graphics.render(&constants) {
                        Ok(()) => {}
                        // Reconfigure the surface if lost or outdated
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            graphics.reconfigure()
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("out of memory, stopping");
                            stop.stop();
                        }
                        Err(error) => tracing::warn!(%error, "dropped frame"),
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            if stop.is_stopped() {
                elwt.exit();
            } else {
                graphics.window().request_redraw();
            }
        }
        Event::LoopExiting => {
            tracing::info!(frames = driver.frames(), "frame loop stopped");
        }
        _ => {}
    })?;
    Ok(())
}

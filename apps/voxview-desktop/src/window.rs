//! winit-backed window host. Events are pumped without blocking so the
//! viewer keeps ownership of the frame loop.

use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;
use voxview_common::WindowConfig;
use voxview_input::{Key, KeyEvent, Modifiers};
use voxview_viewer::{HostEvent, MouseButton, WindowHost};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::platform::scancode::PhysicalKeyExtScancode;
use winit::window::{Window, WindowId};

/// How long to wait for the platform to hand us a window at startup.
const OPEN_POLL: Duration = Duration::from_millis(16);
const OPEN_ATTEMPTS: u32 = 300;

#[rustfmt::skip]
const LETTERS: [(KeyCode, char); 26] = [
    (KeyCode::KeyA, 'A'), (KeyCode::KeyB, 'B'), (KeyCode::KeyC, 'C'), (KeyCode::KeyD, 'D'),
    (KeyCode::KeyE, 'E'), (KeyCode::KeyF, 'F'), (KeyCode::KeyG, 'G'), (KeyCode::KeyH, 'H'),
    (KeyCode::KeyI, 'I'), (KeyCode::KeyJ, 'J'), (KeyCode::KeyK, 'K'), (KeyCode::KeyL, 'L'),
    (KeyCode::KeyM, 'M'), (KeyCode::KeyN, 'N'), (KeyCode::KeyO, 'O'), (KeyCode::KeyP, 'P'),
    (KeyCode::KeyQ, 'Q'), (KeyCode::KeyR, 'R'), (KeyCode::KeyS, 'S'), (KeyCode::KeyT, 'T'),
    (KeyCode::KeyU, 'U'), (KeyCode::KeyV, 'V'), (KeyCode::KeyW, 'W'), (KeyCode::KeyX, 'X'),
    (KeyCode::KeyY, 'Y'), (KeyCode::KeyZ, 'Z'),
];

#[rustfmt::skip]
const DIGITS: [KeyCode; 10] = [
    KeyCode::Digit0, KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4,
    KeyCode::Digit5, KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9,
];

fn translate_key(physical: PhysicalKey) -> Key {
    let scancode = physical.to_scancode().unwrap_or(0);
    let PhysicalKey::Code(code) = physical else {
        return Key::Other(scancode);
    };
    match code {
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Space => Key::Space,
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        _ => {
            if let Some((_, c)) = LETTERS.iter().find(|(k, _)| *k == code) {
                Key::Char(*c)
            } else if let Some(d) = DIGITS.iter().position(|k| *k == code) {
                Key::Digit(d as u8)
            } else {
                Key::Other(scancode)
            }
        }
    }
}

fn translate_modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        control: state.control_key(),
        alt: state.alt_key(),
        super_key: state.super_key(),
    }
}

/// Receives winit callbacks and turns them into [`HostEvent`]s.
struct EventCollector {
    config: WindowConfig,
    window: Option<Arc<Window>>,
    events: Vec<HostEvent>,
    modifiers: Modifiers,
    open_error: Option<String>,
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        match event_loop.create_window(attrs) {
            Ok(window) => {
                tracing::info!(
                    width = self.config.width,
                    height = self.config.height,
                    "window created"
                );
                self.window = Some(Arc::new(window));
            }
            Err(e) => self.open_error = Some(e.to_string()),
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let event = match event {
            WindowEvent::CloseRequested => HostEvent::CloseRequested,
            WindowEvent::Resized(size) => HostEvent::Resized {
                width: size.width,
                height: size.height,
            },
            WindowEvent::ModifiersChanged(m) => {
                self.modifiers = translate_modifiers(m.state());
                return;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let key = KeyEvent {
                    key: translate_key(event.physical_key),
                    scancode: event.physical_key.to_scancode().unwrap_or(0),
                    modifiers: self.modifiers,
                };
                match event.state {
                    ElementState::Pressed => HostEvent::KeyPressed(key),
                    ElementState::Released => HostEvent::KeyReleased(key),
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Left,
                    winit::event::MouseButton::Right => MouseButton::Right,
                    winit::event::MouseButton::Middle => MouseButton::Middle,
                    _ => return,
                };
                HostEvent::MouseButton {
                    button,
                    pressed: state == ElementState::Pressed,
                }
            }
            WindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(x, y) => HostEvent::Scroll {
                    x: x as f64,
                    y: y as f64,
                },
                MouseScrollDelta::PixelDelta(p) => HostEvent::Scroll { x: p.x, y: p.y },
            },
            _ => return,
        };
        self.events.push(event);
    }
}

/// [`WindowHost`] over a winit event loop driven with `pump_app_events`.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    collector: EventCollector,
    size: (u32, u32),
    close: bool,
    presented: u64,
    elapsed: f32,
}

impl WinitWindow {
    /// Create the event loop and pump it until the window exists.
    pub fn open(config: &WindowConfig) -> Result<(Self, Arc<Window>)> {
        let mut event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut collector = EventCollector {
            config: config.clone(),
            window: None,
            events: Vec::new(),
            modifiers: Modifiers::default(),
            open_error: None,
        };

        for _ in 0..OPEN_ATTEMPTS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(OPEN_POLL), &mut collector)
            {
                return Err(anyhow!("event loop exited with code {code} before the window opened"));
            }
            if let Some(error) = collector.open_error.take() {
                return Err(anyhow!("failed to create window: {error}"));
            }
            if collector.window.is_some() {
                break;
            }
        }
        let window = collector
            .window
            .clone()
            .ok_or_else(|| anyhow!("timed out waiting for the window"))?;
        let size = window.inner_size();

        Ok((
            Self {
                event_loop,
                collector,
                size: (size.width, size.height),
                close: false,
                presented: 0,
                elapsed: 0.0,
            },
            window,
        ))
    }
}

impl WindowHost for WinitWindow {
    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    fn poll_events(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.collector);
        if let PumpStatus::Exit(code) = status {
            tracing::info!(code, "event loop exited");
            self.close = true;
        }
    }

    fn drain_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.collector.events)
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn request_close(&mut self) {
        self.close = true;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    /// The render context presents the surface; this only keeps count.
    fn present(&mut self) {
        self.presented += 1;
    }

    fn destroy(&mut self) {
        tracing::debug!(
            presented = self.presented,
            elapsed = self.elapsed,
            size = ?self.size,
            "window destroyed"
        );
        self.collector.window = None;
        self.close = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_and_digits_translate() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyW)), Key::Char('W'));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::KeyZ)), Key::Char('Z'));
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Digit(7));
    }

    #[test]
    fn named_keys_translate() {
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::ArrowUp)), Key::Up);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::Space)), Key::Space);
        assert_eq!(translate_key(PhysicalKey::Code(KeyCode::NumpadEnter)), Key::Enter);
    }

    #[test]
    fn unmapped_keys_are_other() {
        assert!(matches!(
            translate_key(PhysicalKey::Code(KeyCode::F5)),
            Key::Other(_)
        ));
    }

    #[test]
    fn modifiers_translate() {
        let m = translate_modifiers(ModifiersState::SHIFT | ModifiersState::ALT);
        assert!(m.shift && m.alt);
        assert!(!m.control && !m.super_key);
    }
}

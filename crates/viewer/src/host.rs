//! Window and application hosts the viewer is embedded in.

use std::collections::{BTreeMap, VecDeque};
use voxview_input::KeyEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// An event delivered by a window host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    KeyPressed(KeyEvent),
    KeyReleased(KeyEvent),
    Resized { width: u32, height: u32 },
    MouseButton { button: MouseButton, pressed: bool },
    Scroll { x: f64, y: f64 },
    CloseRequested,
}

/// The platform window: event source, presentation target, close signal.
pub trait WindowHost {
    fn update(&mut self, dt: f32);
    /// Pump the platform event queue without blocking.
    fn poll_events(&mut self);
    /// Events gathered by the last poll, oldest first.
    fn drain_events(&mut self) -> Vec<HostEvent>;
    fn should_close(&self) -> bool;
    fn request_close(&mut self);
    fn resize(&mut self, width: u32, height: u32);
    fn present(&mut self);
    fn destroy(&mut self);
}

/// Process-level host with its own close signal.
pub trait ApplicationHost {
    fn update(&mut self, dt: f32);
    fn should_close(&self) -> bool;
    fn destroy(&mut self);
}

/// Window host with no window. Events are queued directly or scheduled for
/// a given poll.
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    scheduled: BTreeMap<u64, Vec<HostEvent>>,
    pending: VecDeque<HostEvent>,
    polls: u64,
    presented: u64,
    elapsed: f32,
    size: (u32, u32),
    close: bool,
    destroyed: bool,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }

    /// Queue an event for the next poll.
    pub fn push(&mut self, event: HostEvent) {
        self.pending.push_back(event);
    }

    /// Deliver `event` on poll number `poll`, counting from zero.
    pub fn schedule(&mut self, poll: u64, event: HostEvent) {
        self.scheduled.entry(poll).or_default().push(event);
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl WindowHost for HeadlessWindow {
    fn update(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    fn poll_events(&mut self) {
        if let Some(events) = self.scheduled.remove(&self.polls) {
            self.pending.extend(events);
        }
        self.polls += 1;
    }

    fn drain_events(&mut self) -> Vec<HostEvent> {
        self.pending.drain(..).collect()
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

    fn present(&mut self) {
        self.presented += 1;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

/// Application host that asks to close after a number of updates.
#[derive(Debug, Default)]
pub struct HeadlessApplication {
    frame_limit: Option<u64>,
    updates: u64,
    close: bool,
    destroyed: bool,
}

impl HeadlessApplication {
    pub fn new() -> Self {
        Self::default()
    }

    /// A limit of zero is closed before the first frame.
    pub fn with_frame_limit(frames: u64) -> Self {
        Self {
            frame_limit: Some(frames),
            close: frames == 0,
            ..Default::default()
        }
    }

    pub fn request_close(&mut self) {
        self.close = true;
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl ApplicationHost for HeadlessApplication {
    fn update(&mut self, _dt: f32) {
        self.updates += 1;
        if self.frame_limit.is_some_and(|limit| self.updates >= limit) {
            self.close = true;
        }
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

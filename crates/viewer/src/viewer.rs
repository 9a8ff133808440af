use crate::ViewerError;
use crate::camera::Camera;
use crate::clock::{FrameClock, FrameTiming};
use crate::host::{ApplicationHost, HostEvent, MouseButton, WindowHost};
use crate::hud::{self, HudInput, HudLine};
use crate::state::ViewerState;
use crate::weapons::WeaponOp;
use glam::{Mat4, Vec3};
use voxview_assets::{AssetPaths, WeaponAsset};
use voxview_character::{
    AnimationSection, AnimationTimer, Character, IdleSettings, RenderOptions, SectionSpeeds,
};
use voxview_common::{Colour, ViewerConfig};
use voxview_input::{Action, InputCommand, InputFlag, InputFlags, KeyBindings, KeyEvent};
use voxview_render::{
    ClearFlags, CullMode, FontHandle, ProjectionMode, RenderContext, RenderMode, TextRenderer,
    Viewport, ViewportId,
};

/// Eye position of the fixed camera used for the 2D overlay.
const OVERLAY_EYE: Vec3 = Vec3::new(0.0, 0.0, 50.0);

/// Owns every piece of viewer state and drives one character through the
/// `poll_events -> update -> render` loop.
///
/// `R` draws, `C` is the character, `W` and `A` are the window and
/// application hosts.
pub struct Viewer<R, C, W, A> {
    config: ViewerConfig,
    render: R,
    character: C,
    window: W,
    app: A,
    clock: FrameClock,
    timer: AnimationTimer,
    camera: Camera,
    input: InputFlags,
    bindings: KeyBindings,
    state: ViewerState,
    viewport: ViewportId,
    font: FontHandle,
    timing: FrameTiming,
}

impl<R, C, W, A> Viewer<R, C, W, A>
where
    R: RenderContext + TextRenderer,
    C: Character,
    W: WindowHost,
    A: ApplicationHost,
{
    /// Build the camera, default viewport and HUD font, then load the
    /// character. Any missing asset is fatal.
    pub fn create(
        config: ViewerConfig,
        mut render: R,
        window: W,
        app: A,
        clock: FrameClock,
    ) -> Result<Self, ViewerError> {
        config.validate()?;
        let (width, height) = (config.window.width, config.window.height);

        let camera = Camera::from_config(&config.camera);
        let viewport = render.create_viewport(Viewport::new(width, height, config.camera.fov_degrees));
        let font = render.load_font(&config.font.path, config.font.point_size)?;

        let paths = AssetPaths::resolve(&config.model);
        let mut character = C::load(&paths, config.character.seed)?;
        character.configure(&IdleSettings {
            scale: config.character.scale,
            ..IdleSettings::default()
        });

        let state = ViewerState::new(&config);
        tracing::info!(
            width,
            height,
            model = %config.model.name,
            animations = character.animation_count(),
            "viewer created"
        );

        Ok(Self {
            config,
            render,
            character,
            window,
            app,
            clock,
            timer: AnimationTimer::new(),
            camera,
            input: InputFlags::new(),
            bindings: KeyBindings::default(),
            state,
            viewport,
            font,
            timing: FrameTiming::default(),
        })
    }

    /// Advance one frame: timing, animation, then camera motion.
    pub fn update(&mut self) -> FrameTiming {
        let timing = self.clock.tick();
        let _span = tracing::info_span!("update", frame = timing.frame).entered();
        let dt = timing.delta;

        self.timer.advance(dt);
        self.character
            .update(dt, &self.timer, &SectionSpeeds::uniform(1.0));
        self.character.update_weapon_trails(dt, Mat4::IDENTITY);

        self.update_controls(dt);

        self.app.update(dt);
        self.window.update(dt);

        self.timing = timing;
        tracing::trace!(dt, fps = timing.fps, "frame updated");
        timing
    }

    fn update_controls(&mut self, dt: f32) {
        let step = self.config.camera.move_speed * dt;
        if self.input.is_set(InputFlag::Forward) {
            self.camera.fly(step);
        }
        if self.input.is_set(InputFlag::Backward) {
            self.camera.fly(-step);
        }
        if self.input.is_set(InputFlag::StrafeLeft) {
            self.camera.strafe(-step);
        }
        if self.input.is_set(InputFlag::StrafeRight) {
            self.camera.strafe(step);
        }
    }

    /// Draw the 3D pass, then the HUD overlay, then present.
    pub fn render(&mut self) -> Result<(), ViewerError> {
        let _span = tracing::info_span!("render", frame = self.timing.frame).entered();
        let r = &mut self.render;

        r.begin_scene(ClearFlags::ALL)?;

        r.push_matrix();
        r.set_projection_mode(ProjectionMode::Perspective, self.viewport)?;
        r.set_cull_mode(CullMode::Back);
        self.camera.look(r);
        r.set_multisampling(self.state.multisampling);

        let world = Mat4::IDENTITY;
        let options = RenderOptions {
            outline_colour: Colour::YELLOW,
            ..RenderOptions::default()
        };
        r.push_matrix();
        r.multiply_world_matrix(world);
        self.character.render_weapons(r, &options);
        self.character.render(r, &options);
        r.pop_matrix();

        r.push_matrix();
        r.multiply_world_matrix(world);
        r.disable_texturing();
        self.character.render_face(r);
        r.pop_matrix();
        r.pop_matrix();

        let lines = self.hud_lines();
        let r = &mut self.render;
        r.push_matrix();
        r.disable_texturing();
        r.set_render_mode(RenderMode::Solid);
        r.set_projection_mode(ProjectionMode::TwoD, self.viewport)?;
        r.set_look_at(OVERLAY_EYE, Vec3::ZERO, Vec3::Y);
        for line in &lines {
            r.draw_text(self.font, line.x, line.y, Colour::WHITE, 1.0, &line.text);
        }
        r.pop_matrix();

        r.end_scene()?;
        self.window.present();
        Ok(())
    }

    /// HUD lines for the current state, in draw order.
    pub fn hud_lines(&self) -> Vec<HudLine> {
        let hints = self.bindings.hints();
        let index = self.state.animation_index;
        hud::compose(&HudInput {
            timing: self.timing,
            width: self.state.width,
            height: self.state.height,
            text_height: self.render.text_height(self.font, "a"),
            help_text: self.state.help_text,
            camera: self.camera.describe(),
            animation_index: index,
            animation_count: self.character.animation_count(),
            animation_name: self.character.animation_name(index).unwrap_or(""),
            weapon_name: self.state.weapons.name(),
            hints: &hints,
        })
    }

    pub fn key_pressed(&mut self, event: KeyEvent) {
        self.handle_key(event, true);
    }

    pub fn key_released(&mut self, event: KeyEvent) {
        self.handle_key(event, false);
    }

    fn handle_key(&mut self, event: KeyEvent, pressed: bool) {
        match self.bindings.resolve(event.key, pressed) {
            Some(InputCommand::SetFlag(flag, held)) => self.input.set(flag, held),
            Some(InputCommand::Fire(action)) => self.fire(action),
            None => tracing::trace!(key = %event.key, pressed, "key ignored"),
        }
    }

    fn fire(&mut self, action: Action) {
        match action {
            Action::ToggleHelpText => self.state.help_text = !self.state.help_text,
            Action::ToggleMultisampling => {
                self.state.multisampling = !self.state.multisampling;
            }
            Action::ToggleWireframe => {
                self.state.wireframe = !self.state.wireframe;
                self.character.set_wireframe(self.state.wireframe);
            }
            Action::ToggleTalking => {
                self.state.talking = !self.state.talking;
                self.character.set_talking(self.state.talking);
            }
            Action::NextAnimation => {
                self.state.next_animation(self.character.animation_count());
                self.play_current_animation();
            }
            Action::ReplayAnimation => self.play_current_animation(),
            Action::CycleWeapon => self.cycle_weapon(),
        }
        tracing::debug!(?action, "action fired");
    }

    fn play_current_animation(&mut self) {
        let index = self.state.animation_index;
        let Some(name) = self.character.animation_name(index).map(str::to_owned) else {
            tracing::warn!(index, "no animation to play");
            return;
        };
        let full = AnimationSection::FullBody;
        if let Err(error) = self.character.play_animation(full, false, full, &name) {
            tracing::warn!(%error, animation = %name, "animation failed to start");
        }
    }

    fn cycle_weapon(&mut self) {
        for op in self.state.weapons.advance() {
            match *op {
                WeaponOp::Load(hand, name) => {
                    let asset = WeaponAsset::resolve(&self.config.weapons_dir, name);
                    if let Err(error) = self.character.load_weapon(hand, &asset.path) {
                        tracing::warn!(%error, weapon = name, ?hand, "weapon failed to load");
                    }
                }
                WeaponOp::Unload(hand) => self.character.unload_weapon(hand),
            }
        }
        tracing::debug!(weapon = self.state.weapons.name(), "weapon cycled");
    }

    /// Record the new window size. The render context and default viewport
    /// are only resized when both dimensions are non-zero.
    pub fn resize_window(&mut self, width: u32, height: u32) {
        self.state.width = width;
        self.state.height = height;
        self.window.resize(width, height);

        if width == 0 || height == 0 {
            tracing::debug!(width, height, "window minimised, render resize skipped");
            return;
        }
        self.render.resize_window(width, height);
        let viewport = Viewport::new(width, height, self.config.camera.fov_degrees);
        if let Err(error) = self.render.resize_viewport(self.viewport, viewport) {
            tracing::warn!(%error, "default viewport resize failed");
        }
    }

    pub fn mouse_left_pressed(&mut self) {
        tracing::trace!("mouse left pressed");
    }

    pub fn mouse_left_released(&mut self) {
        tracing::trace!("mouse left released");
    }

    pub fn mouse_right_pressed(&mut self) {
        tracing::trace!("mouse right pressed");
    }

    pub fn mouse_right_released(&mut self) {
        tracing::trace!("mouse right released");
    }

    pub fn mouse_middle_pressed(&mut self) {
        tracing::trace!("mouse middle pressed");
    }

    pub fn mouse_middle_released(&mut self) {
        tracing::trace!("mouse middle released");
    }

    pub fn mouse_scroll(&mut self, x: f64, y: f64) {
        tracing::trace!(x, y, "mouse scroll");
    }

    /// Pump the window host and dispatch what it delivered.
    pub fn poll_events(&mut self) {
        self.window.poll_events();
        for event in self.window.drain_events() {
            self.dispatch(event);
        }
    }

    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::KeyPressed(key) => self.key_pressed(key),
            HostEvent::KeyReleased(key) => self.key_released(key),
            HostEvent::Resized { width, height } => self.resize_window(width, height),
            HostEvent::MouseButton { button, pressed } => match (button, pressed) {
                (MouseButton::Left, true) => self.mouse_left_pressed(),
                (MouseButton::Left, false) => self.mouse_left_released(),
                (MouseButton::Right, true) => self.mouse_right_pressed(),
                (MouseButton::Right, false) => self.mouse_right_released(),
                (MouseButton::Middle, true) => self.mouse_middle_pressed(),
                (MouseButton::Middle, false) => self.mouse_middle_released(),
            },
            HostEvent::Scroll { x, y } => self.mouse_scroll(x, y),
            HostEvent::CloseRequested => {
                tracing::info!("close requested");
                self.window.request_close();
            }
        }
    }

    pub fn should_close(&self) -> bool {
        self.window.should_close() || self.app.should_close()
    }

    /// Run frames until a host asks to close. Returns the number of frames.
    pub fn run(&mut self) -> Result<u64, ViewerError> {
        let mut frames = 0;
        while !self.should_close() {
            self.poll_events();
            self.update();
            self.render()?;
            frames += 1;
        }
        Ok(frames)
    }

    /// Tear down the window, then the application, and hand both back.
    pub fn destroy(mut self) -> (W, A) {
        tracing::info!(frames = self.clock.frames(), "viewer destroyed");
        self.window.destroy();
        self.app.destroy();
        (self.window, self.app)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn input_flags(&self) -> &InputFlags {
        &self.input
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    pub fn character(&self) -> &C {
        &self.character
    }

    pub fn render_context(&self) -> &R {
        &self.render
    }

    pub fn render_context_mut(&mut self) -> &mut R {
        &mut self.render
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn application(&self) -> &A {
        &self.app
    }

    pub fn application_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn viewport(&self) -> ViewportId {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::host::{HeadlessApplication, HeadlessWindow};
    use std::path::Path;
    use std::time::Duration;
    use voxview_assets::AssetError;
    use voxview_character::{CharacterError, Hand, VoxelCharacter};
    use voxview_input::Key;
    use voxview_render::{CubeInstance, RecordingRenderer, RenderCommand};

    const ANIMATIONS: [&str; 3] = ["BindPose", "Walk", "Run"];

    #[derive(Debug, Default)]
    struct FakeCharacter {
        calls: Vec<String>,
        updates: Vec<f32>,
        wireframe: bool,
    }

    fn cube() -> CubeInstance {
        CubeInstance::new(Vec3::ZERO, Vec3::ONE, Colour::WHITE)
    }

    impl Character for FakeCharacter {
        fn load(_paths: &AssetPaths, _seed: u64) -> Result<Self, CharacterError> {
            Ok(Self::default())
        }

        fn update(&mut self, dt: f32, _timer: &AnimationTimer, speeds: &SectionSpeeds) {
            assert_eq!(*speeds, SectionSpeeds::uniform(1.0));
            self.updates.push(dt);
        }

        fn update_weapon_trails(&mut self, _dt: f32, _world: Mat4) {}

        fn render(&self, ctx: &mut dyn RenderContext, options: &RenderOptions) {
            assert_eq!(options.outline_colour, Colour::YELLOW);
            ctx.draw_cubes(&[cube(); 1]);
        }

        fn render_weapons(&self, ctx: &mut dyn RenderContext, _options: &RenderOptions) {
            ctx.draw_cubes(&[cube(); 2]);
        }

        // Leaves wireframe mode set, so the HUD pass has to reset it.
        fn render_face(&self, ctx: &mut dyn RenderContext) {
            if self.wireframe {
                ctx.set_render_mode(RenderMode::Wireframe);
            }
            ctx.draw_cubes(&[cube(); 3]);
        }

        fn animation_count(&self) -> usize {
            ANIMATIONS.len()
        }

        fn animation_name(&self, index: usize) -> Option<&str> {
            ANIMATIONS.get(index).copied()
        }

        fn play_animation(
            &mut self,
            section: AnimationSection,
            blend: bool,
            _blend_from: AnimationSection,
            name: &str,
        ) -> Result<(), CharacterError> {
            assert_eq!(section, AnimationSection::FullBody);
            assert!(!blend);
            self.calls.push(format!("play {name}"));
            Ok(())
        }

        fn set_breathing(&mut self, enabled: bool) {
            self.calls.push(format!("breathing {enabled}"));
        }

        fn set_wink(&mut self, enabled: bool) {
            self.calls.push(format!("wink {enabled}"));
        }

        fn set_talking(&mut self, enabled: bool) {
            self.calls.push(format!("talking {enabled}"));
        }

        fn set_random_mouth(&mut self, enabled: bool) {
            self.calls.push(format!("random_mouth {enabled}"));
        }

        fn set_random_look(&mut self, enabled: bool) {
            self.calls.push(format!("random_look {enabled}"));
        }

        fn set_wireframe(&mut self, enabled: bool) {
            self.wireframe = enabled;
            self.calls.push(format!("wireframe {enabled}"));
        }

        fn set_scale(&mut self, scale: f32) {
            self.calls.push(format!("scale {scale}"));
        }

        fn load_weapon(&mut self, hand: Hand, path: &Path) -> Result<(), CharacterError> {
            self.calls.push(format!("load {hand:?} {}", path.display()));
            Ok(())
        }

        fn unload_weapon(&mut self, hand: Hand) {
            self.calls.push(format!("unload {hand:?}"));
        }
    }

    type TestViewer = Viewer<RecordingRenderer, FakeCharacter, HeadlessWindow, HeadlessApplication>;

    fn viewer() -> (TestViewer, ManualClock) {
        let clock = ManualClock::new();
        let v = Viewer::create(
            ViewerConfig::default(),
            RecordingRenderer::new(800, 800),
            HeadlessWindow::new(800, 800),
            HeadlessApplication::new(),
            FrameClock::manual(&clock),
        )
        .unwrap();
        (v, clock)
    }

    fn tap(v: &mut TestViewer, key: Key) {
        v.key_pressed(key.into());
        v.key_released(key.into());
    }

    fn calls_since(v: &TestViewer, start: usize) -> Vec<String> {
        v.character().calls[start..].to_vec()
    }

    #[test]
    fn create_applies_idle_settings() {
        let (v, _) = viewer();
        assert_eq!(
            v.character().calls,
            [
                "breathing true",
                "wink true",
                "talking false",
                "random_mouth true",
                "random_look true",
                "wireframe false",
                "scale 0.08",
            ]
        );
        assert!(!v.input_flags().any());
        assert_eq!(v.state(), &ViewerState::default());
        assert_eq!(v.render_context().fonts()[0].1, 12);
    }

    #[test]
    fn direction_flags_follow_latest_transition() {
        let (mut v, _) = viewer();
        v.key_pressed(Key::Up.into());
        v.key_pressed(Key::Left.into());
        v.key_released(Key::Up.into());
        v.key_pressed(Key::Down.into());
        v.key_pressed(Key::Right.into());
        v.key_released(Key::Left.into());

        let flags = v.input_flags();
        assert!(!flags.is_set(InputFlag::Forward));
        assert!(flags.is_set(InputFlag::Backward));
        assert!(!flags.is_set(InputFlag::StrafeLeft));
        assert!(flags.is_set(InputFlag::StrafeRight));
    }

    #[test]
    fn direction_flags_match_model_for_every_three_step_sequence() {
        let keys = [Key::Up, Key::Down, Key::Left, Key::Right];
        let flags = [
            InputFlag::Forward,
            InputFlag::Backward,
            InputFlag::StrafeLeft,
            InputFlag::StrafeRight,
        ];
        // Each step is one of 8 transitions: key index * 2 + (0 press, 1 release).
        for seq in 0..8u32.pow(3) {
            let (mut v, _) = viewer();
            let mut model = [false; 4];
            let mut code = seq;
            for _ in 0..3 {
                let (key, press) = ((code % 8 / 2) as usize, code % 2 == 0);
                code /= 8;
                if press {
                    v.key_pressed(keys[key].into());
                } else {
                    v.key_released(keys[key].into());
                }
                model[key] = press;
            }
            for (flag, expected) in flags.iter().zip(model) {
                assert_eq!(v.input_flags().is_set(*flag), expected, "sequence {seq}");
            }
        }
    }

    #[test]
    fn unbound_keys_change_nothing() {
        let (mut v, _) = viewer();
        let before = v.state().clone();
        tap(&mut v, Key::Char('X'));
        tap(&mut v, Key::Other(999));
        assert_eq!(v.state(), &before);
        assert!(!v.input_flags().any());
    }

    #[test]
    fn actions_fire_on_release_only() {
        let (mut v, _) = viewer();
        v.key_pressed(Key::Char('H').into());
        assert!(v.state().help_text);
        v.key_released(Key::Char('H').into());
        assert!(!v.state().help_text);
    }

    #[test]
    fn holding_forward_flies_two_units_in_a_tenth_of_a_second() {
        let (mut v, clock) = viewer();
        v.update();
        let start = v.camera().position;

        v.key_pressed(Key::Up.into());
        clock.advance(Duration::from_millis(100));
        let t = v.update();

        assert!((t.delta - 0.1).abs() < 1e-6);
        let moved = v.camera().position - start;
        assert!((moved.length() - 2.0).abs() < 1e-4);
        assert!((moved.normalize() - v.camera().facing).length() < 1e-5);
    }

    #[test]
    fn strafe_and_backward_directions() {
        let (mut v, clock) = viewer();
        v.update();
        let start = v.camera().position;
        v.key_pressed(Key::Left.into());
        v.key_pressed(Key::Down.into());
        clock.advance(Duration::from_millis(50));
        v.update();
        let moved = v.camera().position - start;
        assert!((moved.x + 1.0).abs() < 1e-4);
        assert!((moved.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn animation_advances_before_camera_and_hosts() {
        let (mut v, clock) = viewer();
        v.update();
        clock.advance(Duration::from_millis(20));
        v.update();
        assert_eq!(v.character().updates.len(), 2);
        assert_eq!(v.application().updates(), 2);
        assert!((v.window().elapsed() - 0.04).abs() < 1e-5);
    }

    #[test]
    fn next_animation_wraps_and_plays() {
        let (mut v, _) = viewer();
        let start = v.character().calls.len();
        for _ in 0..3 {
            tap(&mut v, Key::Char('Q'));
        }
        assert_eq!(v.state().animation_index, 0);
        assert_eq!(calls_since(&v, start), ["play Walk", "play Run", "play BindPose"]);

        tap(&mut v, Key::Char('Z'));
        assert_eq!(v.character().calls.last().unwrap(), "play BindPose");
    }

    #[test]
    fn weapon_cycle_names_and_operations() {
        let (mut v, _) = viewer();
        let start = v.character().calls.len();
        let mut names = Vec::new();
        for _ in 0..4 {
            tap(&mut v, Key::Char('A'));
            names.push(v.state().weapons.name());
        }
        assert_eq!(names, ["Sword", "Sword & Shield", "Staff", "Bow"]);
        assert_eq!(v.state().weapons.index(), 4);

        let weapons = Path::new("media/gamedata/weapons");
        let path = |n: &str| weapons.join(n).join(format!("{n}.weapon")).display().to_string();
        assert_eq!(
            calls_since(&v, start),
            [
                format!("load Right {}", path("Sword")),
                format!("load Left {}", path("Shield")),
                "unload Left".to_string(),
                format!("load Right {}", path("Staff")),
                "unload Right".to_string(),
                format!("load Left {}", path("Bow")),
            ]
        );
    }

    #[test]
    fn toggles_twice_are_identity() {
        let (mut v, _) = viewer();
        let before = v.state().clone();
        for key in ['H', 'W', 'E', 'R'] {
            tap(&mut v, Key::Char(key));
            assert_ne!(v.state(), &before);
            tap(&mut v, Key::Char(key));
            assert_eq!(v.state(), &before);
        }
    }

    #[test]
    fn wireframe_and_talking_reach_character() {
        let (mut v, _) = viewer();
        let start = v.character().calls.len();
        tap(&mut v, Key::Char('W'));
        tap(&mut v, Key::Char('E'));
        assert_eq!(calls_since(&v, start), ["wireframe true", "talking true"]);
    }

    #[test]
    fn should_close_is_logical_or() {
        for (window, app) in [(false, false), (true, false), (false, true), (true, true)] {
            let (mut v, _) = viewer();
            if window {
                v.window_mut().request_close();
            }
            if app {
                v.application_mut().request_close();
            }
            assert_eq!(v.should_close(), window || app, "window={window} app={app}");
        }
    }

    #[test]
    fn render_issues_passes_in_order() {
        let (mut v, _) = viewer();
        v.update();
        v.render().unwrap();

        let frame = v.render_context().last_frame().unwrap();
        let cubes: Vec<usize> = frame
            .commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawCubes { count, .. } => Some(*count),
                _ => None,
            })
            .collect();
        assert_eq!(cubes, [2, 1, 3]);

        let vp = v.viewport();
        let cmds = &frame.commands;
        let pos = |cmd: &RenderCommand| cmds.iter().position(|c| c == cmd).unwrap();
        assert_eq!(cmds[0], RenderCommand::BeginScene(ClearFlags::ALL));
        assert!(pos(&RenderCommand::SetProjectionMode(ProjectionMode::Perspective, vp))
            < pos(&RenderCommand::SetCullMode(CullMode::Back)));
        assert!(frame.contains(&RenderCommand::SetLookAt {
            eye: Vec3::new(0.0, 1.25, 3.0),
            target: Vec3::new(0.0, 1.25, 2.0),
            up: Vec3::Y,
        }));
        assert!(frame.contains(&RenderCommand::SetMultisampling(true)));
        assert!(frame.contains(&RenderCommand::SetLookAt {
            eye: OVERLAY_EYE,
            target: Vec3::ZERO,
            up: Vec3::Y,
        }));
        assert!(pos(&RenderCommand::SetProjectionMode(ProjectionMode::TwoD, vp))
            > pos(&RenderCommand::SetProjectionMode(ProjectionMode::Perspective, vp)));
        assert_eq!(cmds.last(), Some(&RenderCommand::EndScene));
        assert_eq!(v.window().presented(), 1);

        let draws: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, RenderCommand::DrawCubes { .. }))
            .map(|(i, _)| i)
            .collect();
        let (first_draw, face_draw) = (draws[0], draws[2]);
        assert!(pos(&RenderCommand::SetMultisampling(true)) < first_draw);

        // Face pass: its own world push, then texturing off, then the face.
        let face_push = (0..face_draw)
            .rev()
            .find(|&i| cmds[i] == RenderCommand::PushMatrix)
            .unwrap();
        assert_eq!(cmds[face_push + 1], RenderCommand::MultiplyWorldMatrix(Mat4::IDENTITY));
        assert!(cmds[face_push..face_draw].contains(&RenderCommand::DisableTexturing));
        assert!(!cmds[..face_push].contains(&RenderCommand::DisableTexturing));

        // Overlay pass: texturing off and solid fill before the 2D projection.
        let two_d = pos(&RenderCommand::SetProjectionMode(ProjectionMode::TwoD, vp));
        assert!(cmds[face_draw..two_d].contains(&RenderCommand::DisableTexturing));
        assert!(cmds[face_draw..two_d].contains(&RenderCommand::SetRenderMode(RenderMode::Solid)));
    }

    #[test]
    fn overlay_text_is_drawn_solid_after_wireframe_model() {
        let (mut v, _) = viewer();
        tap(&mut v, Key::Char('W'));
        v.update();
        v.render().unwrap();

        let cmds = &v.render_context().last_frame().unwrap().commands;
        let first_text = cmds
            .iter()
            .position(|c| matches!(c, RenderCommand::DrawText(_)))
            .unwrap();
        let modes: Vec<RenderMode> = cmds[..first_text]
            .iter()
            .filter_map(|c| match c {
                RenderCommand::SetRenderMode(mode) => Some(*mode),
                _ => None,
            })
            .collect();
        assert_eq!(modes, [RenderMode::Wireframe, RenderMode::Solid]);
        assert!(cmds[first_text..]
            .iter()
            .all(|c| !matches!(c, RenderCommand::SetRenderMode(RenderMode::Wireframe))));
    }

    #[test]
    fn hud_shows_state() {
        let (mut v, _) = viewer();
        tap(&mut v, Key::Char('A'));
        v.update();
        v.render().unwrap();
        let lines = v.render_context().last_frame().unwrap().text_lines();
        assert!(lines[0].starts_with("FPS: "));
        assert!(lines[0].contains("Delta: 0.0200"));
        assert!(lines[1].starts_with("Pos(0.00, 1.25, 3.00)"));
        assert_eq!(lines[2], "Animation [0/2]: BindPose");
        assert_eq!(lines[3], "Weapon: Sword");
        assert_eq!(lines[4], "H - Toggle HelpText");
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn help_toggle_leaves_fps_only() {
        let (mut v, _) = viewer();
        tap(&mut v, Key::Char('H'));
        v.update();
        v.render().unwrap();
        let lines = v.render_context().last_frame().unwrap().text_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("FPS: "));
    }

    #[test]
    fn multisampling_toggle_reaches_renderer() {
        let (mut v, _) = viewer();
        tap(&mut v, Key::Char('R'));
        v.render().unwrap();
        let frame = v.render_context().last_frame().unwrap();
        assert!(frame.contains(&RenderCommand::SetMultisampling(false)));
    }

    #[test]
    fn resize_updates_viewport_but_skips_zero() {
        let (mut v, _) = viewer();
        v.resize_window(1024, 768);
        assert_eq!(v.render_context().window_size(), (1024, 768));
        let vp = *v.render_context().viewport(v.viewport()).unwrap();
        assert_eq!((vp.width, vp.height), (1024, 768));
        assert_eq!(vp.fov_degrees, 60.0);

        v.resize_window(0, 768);
        assert_eq!((v.state().width, v.state().height), (0, 768));
        assert_eq!(v.window().size(), (0, 768));
        assert_eq!(v.render_context().window_size(), (1024, 768));
    }

    #[test]
    fn polled_events_are_dispatched() {
        let (mut v, _) = viewer();
        v.window_mut().push(HostEvent::KeyPressed(Key::Up.into()));
        v.window_mut().push(HostEvent::Resized { width: 640, height: 480 });
        v.window_mut().push(HostEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        });
        v.window_mut().push(HostEvent::Scroll { x: 0.0, y: -1.0 });
        v.poll_events();
        assert!(v.input_flags().is_set(InputFlag::Forward));
        assert_eq!(v.state().width, 640);
        assert!(!v.should_close());

        v.window_mut().push(HostEvent::CloseRequested);
        v.poll_events();
        assert!(v.should_close());
    }

    #[test]
    fn mouse_hooks_leave_state_alone() {
        let (mut v, _) = viewer();
        let before = (v.state().clone(), *v.camera());
        v.mouse_left_pressed();
        v.mouse_left_released();
        v.mouse_right_pressed();
        v.mouse_right_released();
        v.mouse_middle_pressed();
        v.mouse_middle_released();
        v.mouse_scroll(1.0, 2.0);
        assert_eq!((v.state().clone(), *v.camera()), before);
    }

    #[test]
    fn run_stops_at_application_limit_and_destroy_tears_down() {
        let clock = ManualClock::new();
        let mut v: TestViewer = Viewer::create(
            ViewerConfig::default(),
            RecordingRenderer::new(800, 800),
            HeadlessWindow::new(800, 800),
            HeadlessApplication::with_frame_limit(5),
            FrameClock::manual(&clock),
        )
        .unwrap();
        assert_eq!(v.run().unwrap(), 5);
        assert_eq!(v.render_context().frames_completed(), 5);

        let (window, app) = v.destroy();
        assert!(window.is_destroyed());
        assert!(app.is_destroyed());
    }

    #[test]
    fn zero_frame_limit_renders_nothing() {
        let mut v: TestViewer = Viewer::create(
            ViewerConfig::default(),
            RecordingRenderer::new(800, 800),
            HeadlessWindow::new(800, 800),
            HeadlessApplication::with_frame_limit(0),
            FrameClock::manual(&ManualClock::new()),
        )
        .unwrap();
        assert_eq!(v.run().unwrap(), 0);
        assert_eq!(v.render_context().frames_completed(), 0);
        assert_eq!(v.window().presented(), 0);
    }

    fn voxel_viewer(
        base: &Path,
    ) -> Result<Viewer<RecordingRenderer, VoxelCharacter, HeadlessWindow, HeadlessApplication>, ViewerError>
    {
        let mut config = ViewerConfig::default();
        config.model.base_dir = base.join("models");
        config.weapons_dir = base.join("weapons");
        Viewer::create(
            config,
            RecordingRenderer::new(800, 800),
            HeadlessWindow::new(800, 800),
            HeadlessApplication::new(),
            FrameClock::manual(&ManualClock::new()),
        )
    }

    #[test]
    fn missing_model_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = voxel_viewer(dir.path()).err().unwrap();
        assert!(matches!(
            err,
            ViewerError::Character(CharacterError::Asset(AssetError::Missing { .. }))
        ));
    }

    #[test]
    fn missing_weapon_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ViewerConfig::default();
        config.model.base_dir = dir.path().join("models");
        let paths = AssetPaths::resolve(&config.model);
        std::fs::create_dir_all(dir.path().join("models/Human")).unwrap();
        for (_, p) in paths.files() {
            std::fs::write(p, "BindPose\nWalk 0 10 loop\n").unwrap();
        }

        let mut v = voxel_viewer(dir.path()).unwrap();
        assert_eq!(v.character().animation_count(), 2);
        tap_voxel(&mut v, Key::Char('A'));
        assert_eq!(v.state().weapons.name(), "Sword");
        assert!(v.character().weapon(Hand::Right).is_none());

        v.update();
        v.render().unwrap();
    }

    fn tap_voxel<C: Character>(
        v: &mut Viewer<RecordingRenderer, C, HeadlessWindow, HeadlessApplication>,
        key: Key,
    ) {
        v.key_pressed(key.into());
        v.key_released(key.into());
    }
}

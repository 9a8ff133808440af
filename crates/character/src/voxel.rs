use crate::face::FaceState;
use crate::mannequin::Pose;
use crate::weapon::{AttachedWeapon, Hand, WeaponTrail};
use crate::{
    AnimationSection, AnimationTimer, Character, CharacterError, RenderOptions, SectionSpeeds,
};
use glam::{Mat4, Vec3};
use std::f32::consts::TAU;
use std::path::Path;
use voxview_assets::{AnimationClip, AssetPaths, WeaponAsset, read_animation_list};
use voxview_common::Colour;
use voxview_render::{CubeInstance, RenderContext, RenderMode};

/// Playback rate of animation list frames.
pub const ANIMATION_FPS: f32 = 30.0;
const BLEND_TIME: f32 = 0.2;
const BREATH_PERIOD: f32 = 3.0;
const BREATH_DEPTH: f32 = 0.02;

#[derive(Debug, Clone, Copy, Default)]
struct Blend {
    from: f32,
    elapsed: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct SectionPlayback {
    clip: Option<usize>,
    time: f32,
    blend: Option<Blend>,
}

/// Character rendered as a posed box mannequin.
///
/// Geometry, skeleton and face files must exist but are not decoded; the
/// animation list supplies the clip names and frame ranges that drive the
/// limb swing.
#[derive(Debug)]
pub struct VoxelCharacter {
    paths: AssetPaths,
    clips: Vec<AnimationClip>,
    playback: [SectionPlayback; AnimationSection::COUNT],
    face: FaceState,
    breathing: bool,
    breath: f32,
    wireframe: bool,
    scale: f32,
    weapons: [Option<AttachedWeapon>; 2],
    trails: [WeaponTrail; 2],
}

impl VoxelCharacter {
    pub fn paths(&self) -> &AssetPaths {
        &self.paths
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Clip currently playing on `section`, if any.
    pub fn current_animation(&self, section: AnimationSection) -> Option<&str> {
        self.playback[section.index()]
            .clip
            .map(|i| self.clips[i].name.as_str())
    }

    pub fn weapon(&self, hand: Hand) -> Option<&WeaponAsset> {
        self.weapons[hand.index()].as_ref().map(|w| &w.asset)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_wireframe(&self) -> bool {
        self.wireframe
    }

    fn clip_angle(&self, clip: usize, time: f32) -> f32 {
        let c = &self.clips[clip];
        let frames = c.frame_count() as f32;
        if frames <= 1.0 {
            return 0.0;
        }
        let frame = time * ANIMATION_FPS;
        let frame = if c.looping {
            frame.rem_euclid(frames)
        } else {
            frame.min(frames - 1.0)
        };
        let amplitude = 0.25 + 0.15 * (clip % 4) as f32;
        amplitude * (TAU * frame / frames).sin()
    }

    fn section_angle(&self, section: AnimationSection) -> f32 {
        let p = &self.playback[section.index()];
        let target = p.clip.map_or(0.0, |c| self.clip_angle(c, p.time));
        match p.blend {
            Some(b) => {
                let t = (b.elapsed / BLEND_TIME).clamp(0.0, 1.0);
                b.from + (target - b.from) * t
            }
            None => target,
        }
    }

    fn pose(&self) -> Pose {
        Pose {
            lean: self.section_angle(AnimationSection::HeadBody) * 0.3,
            left_arm: self.section_angle(AnimationSection::LeftArmHand),
            right_arm: -self.section_angle(AnimationSection::RightArmHand),
            legs: self.section_angle(AnimationSection::LegsFeet),
            breath: self.breath,
        }
    }

    fn root(&self) -> Mat4 {
        Mat4::from_scale(Vec3::splat(self.scale))
    }

    fn weapon_cubes(&self, pose: &Pose) -> Vec<CubeInstance> {
        Hand::BOTH
            .iter()
            .filter_map(|&hand| {
                let w = self.weapons[hand.index()].as_ref()?;
                Some(CubeInstance {
                    transform: pose.grip(hand)
                        * Mat4::from_translation(w.shape.centre())
                        * Mat4::from_scale(w.shape.size),
                    colour: w.shape.colour,
                })
            })
            .collect()
    }

    /// Draw `cubes` under the character root with the requested passes.
    fn draw_passes(
        &self,
        ctx: &mut dyn RenderContext,
        options: &RenderOptions,
        cubes: impl Fn(Option<Colour>) -> Vec<CubeInstance>,
    ) {
        let tint = options.silhouette.then_some(Colour::BLACK);

        ctx.push_matrix();
        ctx.multiply_world_matrix(self.root());
        if self.wireframe {
            ctx.set_render_mode(RenderMode::Wireframe);
        }
        ctx.draw_cubes(&cubes(tint));
        if self.wireframe {
            ctx.set_render_mode(RenderMode::Solid);
        }
        if options.outline {
            ctx.set_render_mode(RenderMode::Wireframe);
            ctx.draw_cubes(&cubes(Some(options.outline_colour)));
            ctx.set_render_mode(RenderMode::Solid);
        }
        if options.reflection {
            ctx.push_matrix();
            ctx.multiply_world_matrix(Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0)));
            ctx.draw_cubes(&cubes(tint));
            ctx.pop_matrix();
        }
        ctx.pop_matrix();
    }
}

impl Character for VoxelCharacter {
    fn load(paths: &AssetPaths, seed: u64) -> Result<Self, CharacterError> {
        paths.verify()?;
        let clips = read_animation_list(&paths.animation_list)?;
        tracing::info!(
            model = %paths.model_name,
            kind = %paths.type_name,
            animations = clips.len(),
            "character loaded"
        );
        Ok(Self {
            paths: paths.clone(),
            clips,
            playback: Default::default(),
            face: FaceState::new(seed),
            breathing: false,
            breath: 1.0,
            wireframe: false,
            scale: 1.0,
            weapons: [None, None],
            trails: [WeaponTrail::new(), WeaponTrail::new()],
        })
    }

    fn update(&mut self, dt: f32, timer: &AnimationTimer, speeds: &SectionSpeeds) {
        for section in AnimationSection::PARTS {
            let p = &mut self.playback[section.index()];
            p.time += dt * speeds.get(section);
            if let Some(b) = &mut p.blend {
                b.elapsed += dt;
                if b.elapsed >= BLEND_TIME {
                    p.blend = None;
                }
            }
        }
        self.breath = if self.breathing {
            1.0 + BREATH_DEPTH * (TAU * timer.phase(BREATH_PERIOD)).sin()
        } else {
            1.0
        };
        self.face.update(dt);
    }

    fn update_weapon_trails(&mut self, dt: f32, world: Mat4) {
        let pose = self.pose();
        let root = world * self.root();
        for hand in Hand::BOTH {
            let i = hand.index();
            match &self.weapons[i] {
                Some(w) => {
                    let tip = (root * pose.grip(hand)).transform_point3(w.shape.tip());
                    self.trails[i].record(dt, tip);
                }
                None => self.trails[i].clear(),
            }
        }
    }

    fn render(&self, ctx: &mut dyn RenderContext, options: &RenderOptions) {
        let pose = self.pose();
        self.draw_passes(ctx, options, |tint| pose.body(tint));
    }

    fn render_weapons(&self, ctx: &mut dyn RenderContext, options: &RenderOptions) {
        if self.weapons.iter().all(Option::is_none) {
            return;
        }
        let pose = self.pose();
        self.draw_passes(ctx, options, |tint| {
            let mut cubes = self.weapon_cubes(&pose);
            if let Some(t) = tint {
                cubes.iter_mut().for_each(|c| c.colour = t);
            }
            cubes
        });

        let size = Vec3::splat(self.scale * 0.75);
        let trail: Vec<CubeInstance> = self
            .trails
            .iter()
            .flat_map(|t| t.visible())
            .map(|p| CubeInstance::new(p.position, size, options.outline_colour))
            .collect();
        ctx.draw_cubes(&trail);
    }

    fn render_face(&self, ctx: &mut dyn RenderContext) {
        let cubes = self
            .pose()
            .face(self.face.is_winking(), self.face.mouth_shape(), self.face.look());
        ctx.push_matrix();
        ctx.multiply_world_matrix(self.root());
        ctx.draw_cubes(&cubes);
        ctx.pop_matrix();
    }

    fn animation_count(&self) -> usize {
        self.clips.len()
    }

    fn animation_name(&self, index: usize) -> Option<&str> {
        self.clips.get(index).map(|c| c.name.as_str())
    }

    fn play_animation(
        &mut self,
        section: AnimationSection,
        blend: bool,
        blend_from: AnimationSection,
        name: &str,
    ) -> Result<(), CharacterError> {
        let clip = self
            .clips
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| CharacterError::UnknownAnimation(name.to_string()))?;

        let targets: &[AnimationSection] = match section {
            AnimationSection::FullBody => &AnimationSection::PARTS,
            _ => std::slice::from_ref(&section),
        };
        for &target in targets {
            let source = match blend_from {
                AnimationSection::FullBody => target,
                other => other,
            };
            let from = self.section_angle(source);
            self.playback[target.index()] = SectionPlayback {
                clip: Some(clip),
                time: 0.0,
                blend: blend.then_some(Blend { from, elapsed: 0.0 }),
            };
        }
        self.playback[section.index()].clip = Some(clip);
        tracing::debug!(animation = name, ?section, blend, "animation started");
        Ok(())
    }

    fn set_breathing(&mut self, enabled: bool) {
        self.breathing = enabled;
    }

    fn set_wink(&mut self, enabled: bool) {
        self.face.wink = enabled;
    }

    fn set_talking(&mut self, enabled: bool) {
        self.face.talking = enabled;
    }

    fn set_random_mouth(&mut self, enabled: bool) {
        self.face.random_mouth = enabled;
    }

    fn set_random_look(&mut self, enabled: bool) {
        self.face.random_look = enabled;
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.wireframe = enabled;
    }

    fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    fn load_weapon(&mut self, hand: Hand, path: &Path) -> Result<(), CharacterError> {
        let asset = WeaponAsset::from_path(path)?;
        tracing::debug!(weapon = %asset.name, ?hand, "weapon attached");
        self.weapons[hand.index()] = Some(AttachedWeapon::new(asset));
        self.trails[hand.index()].clear();
        Ok(())
    }

    fn unload_weapon(&mut self, hand: Hand) {
        if let Some(w) = self.weapons[hand.index()].take() {
            tracing::debug!(weapon = %w.asset.name, ?hand, "weapon detached");
        }
        self.trails[hand.index()].clear();
    }
}

//! Box mannequin standing at the origin, facing +z, measured in voxels.

use crate::weapon::Hand;
use glam::{Mat4, Vec3};
use voxview_common::Colour;
use voxview_render::CubeInstance;

const HIP_HEIGHT: f32 = 12.0;
const SHOULDER_HEIGHT: f32 = 24.0;
const ARM_LENGTH: f32 = 12.0;

const SKIN: Colour = Colour::rgb(0.96, 0.76, 0.62);
const SHIRT: Colour = Colour::rgb(0.2, 0.6, 0.75);
const TROUSERS: Colour = Colour::rgb(0.25, 0.25, 0.6);
const EYE: Colour = Colour::rgb(0.1, 0.1, 0.15);
const MOUTH: Colour = Colour::rgb(0.55, 0.2, 0.2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Limb {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl Limb {
    pub const ALL: [Limb; 6] = [
        Limb::Head,
        Limb::Torso,
        Limb::LeftArm,
        Limb::RightArm,
        Limb::LeftLeg,
        Limb::RightLeg,
    ];

    fn pivot(self) -> Vec3 {
        match self {
            Limb::Head => Vec3::new(0.0, SHOULDER_HEIGHT, 0.0),
            Limb::Torso => Vec3::new(0.0, HIP_HEIGHT, 0.0),
            Limb::LeftArm => Vec3::new(6.0, SHOULDER_HEIGHT, 0.0),
            Limb::RightArm => Vec3::new(-6.0, SHOULDER_HEIGHT, 0.0),
            Limb::LeftLeg => Vec3::new(2.0, HIP_HEIGHT, 0.0),
            Limb::RightLeg => Vec3::new(-2.0, HIP_HEIGHT, 0.0),
        }
    }

    /// Box centre relative to the pivot, and box size.
    fn extent(self) -> (Vec3, Vec3) {
        match self {
            Limb::Head => (Vec3::new(0.0, 4.0, 0.0), Vec3::splat(8.0)),
            Limb::Torso => (Vec3::new(0.0, 6.0, 0.0), Vec3::new(8.0, 12.0, 4.0)),
            Limb::LeftArm | Limb::RightArm => {
                (Vec3::new(0.0, -ARM_LENGTH * 0.5, 0.0), Vec3::new(4.0, ARM_LENGTH, 4.0))
            }
            Limb::LeftLeg | Limb::RightLeg => (Vec3::new(0.0, -6.0, 0.0), Vec3::new(4.0, 12.0, 4.0)),
        }
    }

    fn colour(self) -> Colour {
        match self {
            Limb::Head => SKIN,
            Limb::Torso | Limb::LeftArm | Limb::RightArm => SHIRT,
            Limb::LeftLeg | Limb::RightLeg => TROUSERS,
        }
    }
}

/// Joint angles in radians plus the breathing scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pose {
    pub lean: f32,
    pub left_arm: f32,
    pub right_arm: f32,
    pub legs: f32,
    pub breath: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            lean: 0.0,
            left_arm: 0.0,
            right_arm: 0.0,
            legs: 0.0,
            breath: 1.0,
        }
    }
}

fn rotate_about(pivot: Vec3, angle: f32) -> Mat4 {
    Mat4::from_translation(pivot) * Mat4::from_rotation_x(angle)
}

impl Pose {
    /// Joint frame of `limb`, with the origin at its pivot.
    pub fn joint(&self, limb: Limb) -> Mat4 {
        let torso = Mat4::from_translation(Limb::Torso.pivot())
            * Mat4::from_rotation_x(self.lean)
            * Mat4::from_translation(-Limb::Torso.pivot());
        match limb {
            Limb::Torso => rotate_about(limb.pivot(), self.lean),
            Limb::Head => torso * rotate_about(limb.pivot(), self.lean * 0.5),
            Limb::LeftArm => torso * rotate_about(limb.pivot(), self.left_arm),
            Limb::RightArm => torso * rotate_about(limb.pivot(), self.right_arm),
            Limb::LeftLeg => rotate_about(limb.pivot(), self.legs),
            Limb::RightLeg => rotate_about(limb.pivot(), -self.legs),
        }
    }

    pub fn body(&self, tint: Option<Colour>) -> Vec<CubeInstance> {
        Limb::ALL
            .iter()
            .map(|&limb| {
                let (mut centre, mut size) = limb.extent();
                if limb == Limb::Torso {
                    size.y *= self.breath;
                    centre.y *= self.breath;
                }
                CubeInstance {
                    transform: self.joint(limb)
                        * Mat4::from_translation(centre)
                        * Mat4::from_scale(size),
                    colour: tint.unwrap_or_else(|| limb.colour()),
                }
            })
            .collect()
    }

    /// Grip frame at the end of the arm holding `hand`.
    pub fn grip(&self, hand: Hand) -> Mat4 {
        let limb = match hand {
            Hand::Left => Limb::LeftArm,
            Hand::Right => Limb::RightArm,
        };
        self.joint(limb) * Mat4::from_translation(Vec3::new(0.0, -ARM_LENGTH, 0.0))
    }

    /// Eyes and mouth on the front of the head. Closed eyes are omitted.
    pub fn face(&self, winking: bool, mouth_shape: u8, look: glam::Vec2) -> Vec<CubeInstance> {
        let head = self.joint(Limb::Head);
        let front = 4.05;
        let mut cubes = Vec::with_capacity(3);
        if !winking {
            for x in [-2.0, 2.0] {
                let centre = Vec3::new(x + look.x, 5.0 + look.y, front);
                cubes.push(CubeInstance {
                    transform: head
                        * Mat4::from_translation(centre)
                        * Mat4::from_scale(Vec3::new(1.0, 1.0, 0.1)),
                    colour: EYE,
                });
            }
        }
        let mouth_height = 0.5 + mouth_shape as f32 * 0.5;
        cubes.push(CubeInstance {
            transform: head
                * Mat4::from_translation(Vec3::new(0.0, 2.0, front))
                * Mat4::from_scale(Vec3::new(3.0, mouth_height, 0.1)),
            colour: MOUTH,
        });
        cubes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn rest_pose_stands_on_ground() {
        let cubes = Pose::default().body(None);
        assert_eq!(cubes.len(), Limb::ALL.len());
        let lowest = cubes
            .iter()
            .map(|c| c.transform.transform_point3(Vec3::new(0.0, -0.5, 0.0)).y)
            .fold(f32::MAX, f32::min);
        assert!(lowest.abs() < 1e-4);
    }

    #[test]
    fn tint_overrides_colours() {
        let cubes = Pose::default().body(Some(Colour::BLACK));
        assert!(cubes.iter().all(|c| c.colour == Colour::BLACK));
    }

    #[test]
    fn grip_hangs_below_shoulder() {
        let grip = Pose::default().grip(Hand::Left).transform_point3(Vec3::ZERO);
        assert_eq!(grip, Vec3::new(6.0, SHOULDER_HEIGHT - ARM_LENGTH, 0.0));
        let right = Pose::default().grip(Hand::Right).transform_point3(Vec3::ZERO);
        assert_eq!(right.x, -6.0);
    }

    #[test]
    fn swinging_arm_moves_grip() {
        let pose = Pose {
            left_arm: 0.5,
            ..Pose::default()
        };
        let rest = Pose::default().grip(Hand::Left).transform_point3(Vec3::ZERO);
        let swung = pose.grip(Hand::Left).transform_point3(Vec3::ZERO);
        assert!(rest.distance(swung) > 1.0);
    }

    #[test]
    fn winking_hides_eyes() {
        let open = Pose::default().face(false, 0, Vec2::ZERO);
        let closed = Pose::default().face(true, 0, Vec2::ZERO);
        assert_eq!(open.len(), 3);
        assert_eq!(closed.len(), 1);
    }

    #[test]
    fn breathing_stretches_torso() {
        let pose = Pose {
            breath: 1.1,
            ..Pose::default()
        };
        let torso = pose.body(None)[1].transform;
        let top = torso.transform_point3(Vec3::new(0.0, 0.5, 0.0)).y;
        assert!(top > SHOULDER_HEIGHT);
    }
}

use glam::Vec3;
use voxview_assets::WeaponAsset;
use voxview_common::Colour;

pub(crate) const TRAIL_CAPACITY: usize = 10;
pub(crate) const TRAIL_LIFETIME: f32 = 0.3;

/// Which hand a weapon is held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub const BOTH: [Hand; 2] = [Hand::Left, Hand::Right];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Box dimensions for a held weapon, in voxels, blade pointing along +z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WeaponShape {
    pub size: Vec3,
    pub colour: Colour,
}

impl WeaponShape {
    pub fn for_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let steel = Colour::rgb(0.75, 0.75, 0.8);
        let wood = Colour::rgb(0.55, 0.35, 0.2);
        if lower.contains("shield") {
            Self { size: Vec3::new(10.0, 12.0, 1.0), colour: wood }
        } else if lower.contains("2handed") {
            Self { size: Vec3::new(1.5, 1.0, 22.0), colour: steel }
        } else if lower.contains("staff") {
            Self { size: Vec3::new(1.0, 1.0, 24.0), colour: wood }
        } else if lower.contains("bow") {
            Self { size: Vec3::new(1.0, 16.0, 1.0), colour: wood }
        } else {
            Self { size: Vec3::new(1.0, 1.0, 14.0), colour: steel }
        }
    }

    /// Far end of the weapon relative to the grip.
    pub fn tip(&self) -> Vec3 {
        if self.size.z >= self.size.y {
            Vec3::new(0.0, 0.0, self.size.z)
        } else {
            Vec3::new(0.0, self.size.y * 0.5, 0.0)
        }
    }

    /// Box centre relative to the grip.
    pub fn centre(&self) -> Vec3 {
        if self.size.z >= self.size.y {
            Vec3::new(0.0, 0.0, self.size.z * 0.5 - 1.0)
        } else {
            Vec3::ZERO
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AttachedWeapon {
    pub asset: WeaponAsset,
    pub shape: WeaponShape,
}

impl AttachedWeapon {
    pub fn new(asset: WeaponAsset) -> Self {
        let shape = WeaponShape::for_name(&asset.name);
        Self { asset, shape }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TrailPoint {
    pub position: Vec3,
    pub age: f32,
}

/// Fixed-size ring of recent weapon tip positions.
#[derive(Debug, Clone)]
pub(crate) struct WeaponTrail {
    points: Vec<TrailPoint>,
    index: usize,
    filled: bool,
}

impl WeaponTrail {
    pub fn new() -> Self {
        Self {
            points: Vec::with_capacity(TRAIL_CAPACITY),
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: f32, position: Vec3) {
        for p in &mut self.points {
            p.age += dt;
        }
        let point = TrailPoint { position, age: 0.0 };
        if self.filled {
            self.points[self.index] = point;
        } else {
            self.points.push(point);
        }
        self.index = (self.index + 1) % TRAIL_CAPACITY;
        if self.index == 0 {
            self.filled = true;
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Points younger than the trail lifetime that moved away from the newest
    /// one.
    pub fn visible(&self) -> impl Iterator<Item = &TrailPoint> {
        let newest = self
            .points
            .iter()
            .min_by(|a, b| a.age.total_cmp(&b.age))
            .map(|p| p.position);
        self.points.iter().filter(move |p| {
            p.age <= TRAIL_LIFETIME
                && newest.is_some_and(|n| n.distance_squared(p.position) > 1e-8)
        })
    }
}

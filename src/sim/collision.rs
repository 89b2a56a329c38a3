//! Collision primitives for the rectangular field
//!
//! Everything in the arena is a disc (players, bombs, blasts, tile
//! footprints), so contact is always a center-distance test.

use glam::Vec2;
use std::f32::consts::PI;

use crate::normalize_angle;

/// Two discs touch when their centers are closer than the summed radii
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < a_radius + b_radius
}

/// Result of pushing a moving disc back inside the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    /// Clamped position
    pub pos: Vec2,
    /// Heading after reflection
    pub direction: f32,
    pub hit_x: bool,
    pub hit_y: bool,
}

impl WallContact {
    pub fn hit(&self) -> bool {
        self.hit_x || self.hit_y
    }
}

/// Reflect a disc off the walls of the `[0, width] x [0, height]` field.
///
/// Only a disc moving *into* a wall bounces. The offending axis is mirrored
/// (`π - θ` for the side walls, `-θ` for top/bottom) and the position is
/// clamped to exactly touch the wall; the other velocity component is kept.
pub fn bounce_off_walls(
    pos: Vec2,
    radius: f32,
    vel: Vec2,
    direction: f32,
    width: f32,
    height: f32,
) -> WallContact {
    let mut contact = WallContact {
        pos,
        direction,
        hit_x: false,
        hit_y: false,
    };

    if vel.x > 0.0 && pos.x + radius >= width {
        contact.direction = PI - contact.direction;
        contact.pos.x = width - radius;
        contact.hit_x = true;
    } else if vel.x < 0.0 && pos.x - radius <= 0.0 {
        contact.direction = PI - contact.direction;
        contact.pos.x = radius;
        contact.hit_x = true;
    }

    if vel.y > 0.0 && pos.y + radius >= height {
        contact.direction = -contact.direction;
        contact.pos.y = height - radius;
        contact.hit_y = true;
    } else if vel.y < 0.0 && pos.y - radius <= 0.0 {
        contact.direction = -contact.direction;
        contact.pos.y = radius;
        contact.hit_y = true;
    }

    if contact.hit() {
        contact.direction = normalize_angle(contact.direction);
    }
    contact
}

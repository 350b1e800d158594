//! # Positions and Movement
//!
//! Flat-plane coordinates and the single movement primitive shared by every
//! walking entity in the simulation.

use serde::{Deserialize, Serialize};

/// A point on the shard's ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: f32,
    /// North-south coordinate.
    pub z: f32,
}

impl Position {
    /// Creates a position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, z: f32) -> Self {
        Self { x, z }
    }

    /// Euclidean distance to another position.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Advances one step of at most `speed` toward `target`.
    ///
    /// Returns the new position and whether the target was reached. If the
    /// remaining distance is within `speed`, the position snaps exactly onto
    /// the target and arrival is reported. This is the only place movement
    /// speed is applied; every handler that walks somewhere goes through it.
    #[must_use]
    pub fn step_toward(&self, target: Position, speed: f32) -> (Position, bool) {
        let dist = self.distance(target);
        if dist <= speed {
            return (target, true);
        }
        let dx = target.x - self.x;
        let dz = target.z - self.z;
        let angle = dz.atan2(dx);
        let next = Position::new(self.x + angle.cos() * speed, self.z + angle.sin() * speed);
        (next, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_step_snaps_on_arrival() {
        let a = Position::new(0.0, 0.0);
        let target = Position::new(1.0, 1.0);
        let (next, arrived) = a.step_toward(target, 2.5);
        assert!(arrived);
        assert_eq!(next, target);
    }

    #[test]
    fn test_step_advances_by_speed() {
        let a = Position::new(0.0, 0.0);
        let target = Position::new(10.0, 0.0);
        let (next, arrived) = a.step_toward(target, 2.5);
        assert!(!arrived);
        assert!((next.x - 2.5).abs() < 1e-5);
        assert!(next.z.abs() < 1e-5);
    }

    #[test]
    fn test_step_converges() {
        let mut pos = Position::new(-7.0, 13.0);
        let target = Position::new(5.0, -5.0);
        let mut steps = 0;
        loop {
            let (next, arrived) = pos.step_toward(target, 2.5);
            pos = next;
            steps += 1;
            if arrived {
                break;
            }
            assert!(steps < 100, "walk did not converge");
        }
        assert_eq!(pos, target);
    }
}

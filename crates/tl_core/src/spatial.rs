//! Play-area bounds and nearest-target queries over small candidate sets.
//!
//! A linear scan is enough for the tens of entities a scene holds. Callers
//! pass candidates in a stable order; ties go to the first one seen.

use glam::Vec2;

/// Axis-aligned play area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    /// Shrinks every edge by `margin`. `None` when nothing is left.
    pub fn shrink(&self, margin: f32) -> Option<Self> {
        let shrunk = Self {
            min: self.min + Vec2::splat(margin),
            max: self.max - Vec2::splat(margin),
        };
        (shrunk.min.x <= shrunk.max.x && shrunk.min.y <= shrunk.max.y).then_some(shrunk)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }
}

/// Nearest candidate to `origin`, or `None` when `candidates` is empty.
pub fn nearest<K, I>(origin: Vec2, candidates: I) -> Option<(K, f32)>
where
    I: IntoIterator<Item = (K, Vec2)>,
{
    let mut best: Option<(K, f32)> = None;
    for (key, position) in candidates {
        let distance = origin.distance(position);
        match &best {
            Some((_, best_distance)) if distance >= *best_distance => {}
            _ => best = Some((key, distance)),
        }
    }
    best
}

/// Nearest candidate whose distance is at most `radius`.
pub fn nearest_within<K, I>(origin: Vec2, candidates: I, radius: f32) -> Option<(K, f32)>
where
    I: IntoIterator<Item = (K, Vec2)>,
{
    nearest(origin, candidates).filter(|(_, distance)| *distance <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_shrink_and_contain() {
        let bounds = Bounds::from_size(200.0, 100.0);
        let inner = bounds.shrink(20.0).expect("room left");
        assert!(inner.contains(Vec2::new(20.0, 20.0)));
        assert!(!inner.contains(Vec2::new(19.0, 50.0)));
        assert!(bounds.shrink(60.0).is_none());
        assert_eq!(bounds.clamp(Vec2::new(-5.0, 150.0)), Vec2::new(0.0, 100.0));
    }

    #[test]
    fn empty_collection_returns_none() {
        let empty: Vec<(u32, Vec2)> = Vec::new();
        assert!(nearest_within(Vec2::ZERO, empty, 1_000.0).is_none());
    }

    #[test]
    fn single_candidate_respects_radius() {
        let one = [(1u32, Vec2::new(30.0, 40.0))];
        assert_eq!(nearest_within(Vec2::ZERO, one, 50.0), Some((1, 50.0)));
        assert!(nearest_within(Vec2::ZERO, one, 49.9).is_none());
    }

    #[test]
    fn picks_minimum_distance() {
        let candidates = [
            (1u32, Vec2::new(100.0, 0.0)),
            (2, Vec2::new(0.0, 20.0)),
            (3, Vec2::new(-50.0, 0.0)),
        ];
        let (key, distance) = nearest(Vec2::ZERO, candidates).expect("non-empty");
        assert_eq!(key, 2);
        assert!((distance - 20.0).abs() < 1e-5);
    }

    #[test]
    fn ties_keep_first_encountered() {
        let candidates = [
            (10u32, Vec2::new(5.0, 0.0)),
            (11, Vec2::new(0.0, 5.0)),
            (12, Vec2::new(-5.0, 0.0)),
        ];
        assert_eq!(nearest(Vec2::ZERO, candidates).map(|(k, _)| k), Some(10));
    }

    #[test]
    fn nearest_outside_radius_hides_farther_ones_too() {
        let candidates = [(1u32, Vec2::new(60.0, 0.0)), (2, Vec2::new(90.0, 0.0))];
        assert!(nearest_within(Vec2::ZERO, candidates, 40.0).is_none());
    }
}

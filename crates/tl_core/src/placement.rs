//! Clustered procedural placement with rejection sampling.
//!
//! Each cluster picks a random center, then samples polar offsets around it.
//! The radial distance is `min + (max - min) * t^2` with `t` uniform, which
//! packs points near the center and lets a few stray farther out. Candidates
//! too close to an already accepted point (or to an `existing` point) are
//! rejected; a cluster gives up after a bounded number of attempts.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::Deserialize;

use crate::spatial::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    pub cluster_count: u32,
    pub trees_per_cluster_min: u32,
    pub trees_per_cluster_max: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_separation: f32,
    pub max_attempts_per_cluster: u32,
    /// Keeps centers and points this far from the play-area edges.
    pub margin: f32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            cluster_count: 3,
            trees_per_cluster_min: 3,
            trees_per_cluster_max: 6,
            min_radius: 20.0,
            max_radius: 160.0,
            min_separation: 48.0,
            max_attempts_per_cluster: 30,
            margin: 64.0,
        }
    }
}

impl PlacementParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.cluster_count == 0 {
            return Err("cluster_count must be > 0".to_string());
        }
        if self.trees_per_cluster_min > self.trees_per_cluster_max {
            return Err(format!(
                "trees_per_cluster_min ({}) exceeds trees_per_cluster_max ({})",
                self.trees_per_cluster_min, self.trees_per_cluster_max
            ));
        }
        if self.min_radius < 0.0 || self.min_radius > self.max_radius {
            return Err(format!(
                "radius range is invalid: min_radius {} / max_radius {}",
                self.min_radius, self.max_radius
            ));
        }
        if self.min_separation < 0.0 || self.margin < 0.0 {
            return Err("min_separation and margin must be >= 0".to_string());
        }
        Ok(())
    }
}

/// Points accepted by one cluster pass, in acceptance order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterPlacement {
    pub center: Vec2,
    pub target_count: u32,
    pub points: Vec<Vec2>,
}

/// Runs one placement pass. `existing` points only constrain separation;
/// they are never part of the result.
pub fn place_clusters<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: Bounds,
    params: &PlacementParams,
    existing: &[Vec2],
) -> Vec<ClusterPlacement> {
    let Some(area) = bounds.shrink(params.margin) else {
        log::warn!(
            "Placement margin {} leaves no room inside {:?}",
            params.margin,
            bounds
        );
        return Vec::new();
    };

    let min_sep_sq = params.min_separation * params.min_separation;
    let mut accepted: Vec<Vec2> = Vec::new();
    let mut clusters = Vec::with_capacity(params.cluster_count as usize);

    for _ in 0..params.cluster_count {
        let center = Vec2::new(
            rng.random_range(area.min.x..=area.max.x),
            rng.random_range(area.min.y..=area.max.y),
        );
        let target_count =
            rng.random_range(params.trees_per_cluster_min..=params.trees_per_cluster_max);
        let mut cluster = ClusterPlacement {
            center,
            target_count,
            points: Vec::with_capacity(target_count as usize),
        };

        let mut attempts = 0;
        while (cluster.points.len() as u32) < target_count
            && attempts < params.max_attempts_per_cluster
        {
            attempts += 1;
            let angle = rng.random::<f32>() * TAU;
            let t = rng.random::<f32>();
            let distance = params.min_radius + (params.max_radius - params.min_radius) * t * t;
            let candidate = center + Vec2::new(angle.cos(), angle.sin()) * distance;

            if !area.contains(candidate) {
                continue;
            }
            let crowded = accepted
                .iter()
                .chain(existing.iter())
                .any(|other| other.distance_squared(candidate) < min_sep_sq);
            if crowded {
                continue;
            }

            accepted.push(candidate);
            cluster.points.push(candidate);
        }

        log::trace!(
            "Cluster at ({:.0}, {:.0}) placed {}/{} after {} attempts",
            center.x,
            center.y,
            cluster.points.len(),
            target_count,
            attempts
        );
        clusters.push(cluster);
    }

    clusters
}

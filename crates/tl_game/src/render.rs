//! What the host needs to draw a frame.
//!
//! The snapshot is plain data: texture keys, transforms, tint and alpha.
//! Pulses are reported with their progress so the host can run its own
//! easing; the numbers below give the shape each pulse starts from.

use glam::Vec2;

use crate::entity::{Entity, EntityKind, PulseKind};
use crate::world::{Hud, RangeIndicator, World};

/// Stretch applied at the start of a hit flash.
pub const HIT_SCALE: Vec2 = Vec2::new(4.0, 2.0);
/// Squeeze applied to the player at the start of a cut.
pub const CUT_SCALE: Vec2 = Vec2::new(2.5, 2.0);
/// Tree tilt at the start of a sway, in degrees.
pub const SWAY_DEGREES: f32 = 25.0;
pub const GHOST_BASE_ALPHA: f32 = 0.5;
pub const GHOST_ALPHA_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseHint {
    pub kind: PulseKind,
    /// 0 at the start, 1 when finished.
    pub progress: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteHint {
    pub texture: &'static str,
    pub position: Vec2,
    pub scale: Vec2,
    pub depth: i32,
    pub rotation: f32,
    pub alpha: f32,
    pub tinted: bool,
    pub flip_x: bool,
    /// Cyclops only.
    pub life_fraction: Option<f32>,
    pub pulse: Option<PulseHint>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostHint {
    pub position: Vec2,
    pub alpha: f32,
    pub flip_x: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub sprites: Vec<SpriteHint>,
    pub ghosts: Vec<GhostHint>,
    pub range: RangeIndicator,
    pub hud: Hud,
}

fn sprite_for(entity: &Entity, now_ms: u64) -> SpriteHint {
    let kind = entity.kind();
    let pulse = entity.pulse.map(|pulse| PulseHint {
        kind: pulse.kind,
        progress: pulse.progress(now_ms),
    });
    let base_scale = Vec2::splat(entity.scale);

    let mut hint = SpriteHint {
        texture: kind.texture_key(),
        position: entity.position,
        scale: base_scale,
        depth: kind.depth(),
        rotation: entity.rotation,
        alpha: 1.0,
        tinted: false,
        flip_x: entity.facing_left,
        life_fraction: None,
        pulse,
    };
    if kind == EntityKind::Cyclop {
        hint.life_fraction = entity.health.map(|health| health.fraction());
    }

    if let Some(PulseHint { kind, progress }) = pulse {
        let remaining = 1.0 - progress;
        match kind {
            PulseKind::Hit => {
                hint.scale = base_scale.lerp(HIT_SCALE, remaining);
                hint.tinted = progress < 1.0;
            }
            PulseKind::Cut => hint.scale = base_scale.lerp(CUT_SCALE, remaining),
            PulseKind::Sway => {
                hint.rotation += SWAY_DEGREES.to_radians() * remaining;
            }
            PulseKind::FadeOut => hint.alpha = remaining,
        }
    }
    hint
}

impl World {
    pub fn render_snapshot(&self) -> RenderSnapshot {
        let state = self.state();
        let now = state.now_ms;
        let mut sprites: Vec<SpriteHint> =
            state.arena.iter().map(|entity| sprite_for(entity, now)).collect();
        sprites.sort_by_key(|sprite| sprite.depth);

        let ghosts: Vec<GhostHint> = state
            .player()
            .and_then(|player| {
                let data = player.as_player()?;
                Some(
                    data.dash
                        .trail
                        .ghosts()
                        .into_iter()
                        .enumerate()
                        .map(|(i, position)| GhostHint {
                            position,
                            alpha: GHOST_BASE_ALPHA - i as f32 * GHOST_ALPHA_STEP,
                            flip_x: player.facing_left,
                        })
                        .collect(),
                )
            })
            .unwrap_or_default();

        RenderSnapshot {
            sprites,
            ghosts,
            range: *self.range_indicator(),
            hud: self.hud().clone(),
        }
    }
}

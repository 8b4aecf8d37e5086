//! Plank counter and the difficulty steps it unlocks.
//!
//! Each step fires once when the count lands on a multiple of its interval.
//! Its guard clears as soon as the count moves off the multiple, so losing a
//! plank and regaining it fires the step again. Thresholds are checked on
//! every change, so two changes in one tick cannot skip a step.

use crate::config::ProgressionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStep {
    Speed,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    planks: u32,
    speed_every: u32,
    range_every: u32,
    speed_applied: bool,
    range_applied: bool,
    speed_steps: u32,
    range_steps: u32,
    pending: Vec<ProgressStep>,
}

impl Progress {
    /// A starting count that already sits on a multiple unlocks its steps.
    pub fn new(rules: &ProgressionConfig) -> Self {
        let mut progress = Self {
            planks: rules.starting_planks,
            speed_every: rules.speed_every,
            range_every: rules.range_every,
            speed_applied: false,
            range_applied: false,
            speed_steps: 0,
            range_steps: 0,
            pending: Vec::new(),
        };
        progress.check_thresholds();
        progress
    }

    pub fn planks(&self) -> u32 {
        self.planks
    }

    pub fn add_plank(&mut self) -> u32 {
        self.planks = self.planks.saturating_add(1);
        self.check_thresholds();
        self.planks
    }

    /// Floored at zero.
    pub fn lose_plank(&mut self) -> u32 {
        self.planks = self.planks.saturating_sub(1);
        self.check_thresholds();
        self.planks
    }

    pub fn speed_steps(&self) -> u32 {
        self.speed_steps
    }

    pub fn range_steps(&self) -> u32 {
        self.range_steps
    }

    /// Steps unlocked since the last call, in the order they were crossed.
    pub fn take_steps(&mut self) -> Vec<ProgressStep> {
        std::mem::take(&mut self.pending)
    }

    fn check_thresholds(&mut self) {
        if Self::crossed(self.planks, self.speed_every, &mut self.speed_applied) {
            self.speed_steps += 1;
            self.pending.push(ProgressStep::Speed);
        }
        if Self::crossed(self.planks, self.range_every, &mut self.range_applied) {
            self.range_steps += 1;
            self.pending.push(ProgressStep::Range);
        }
    }

    fn crossed(planks: u32, every: u32, applied: &mut bool) -> bool {
        let on_multiple = every > 0 && planks > 0 && planks % every == 0;
        if !on_multiple {
            if planks % every.max(1) != 0 {
                *applied = false;
            }
            return false;
        }
        if *applied {
            return false;
        }
        *applied = true;
        true
    }
}

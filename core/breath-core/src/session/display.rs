//! Derived rendering state.
//!
//! Everything here is a pure function of the run state; nothing is stored.

use crate::types::{Phase, RunState};

/// Expanded scale of the breathing cue relative to its resting size.
pub const EXPANDED_SCALE: f32 = 1.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseColor {
    Sky,
    Cyan,
    Indigo,
}

impl PhaseColor {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseColor::Sky => "sky",
            PhaseColor::Cyan => "cyan",
            PhaseColor::Indigo => "indigo",
        }
    }
}

/// Gradient of the breathing cue. Holds take the colour of the breath they follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueGradient {
    Inhale,
    HoldFull,
    HoldEmpty,
    Exhale,
}

pub fn phase_text(phase: Phase) -> &'static str {
    match phase {
        Phase::Inhale => "Inhale",
        Phase::Hold => "Hold",
        Phase::Exhale => "Exhale",
    }
}

pub fn phase_color(phase: Phase) -> PhaseColor {
    match phase {
        Phase::Inhale => PhaseColor::Sky,
        Phase::Hold => PhaseColor::Cyan,
        Phase::Exhale => PhaseColor::Indigo,
    }
}

pub fn cue_gradient(phase: Phase, is_expanded: bool) -> CueGradient {
    match (phase, is_expanded) {
        (Phase::Inhale, _) => CueGradient::Inhale,
        (Phase::Exhale, _) => CueGradient::Exhale,
        (Phase::Hold, true) => CueGradient::HoldFull,
        (Phase::Hold, false) => CueGradient::HoldEmpty,
    }
}

pub fn cue_scale(is_expanded: bool) -> f32 {
    if is_expanded {
        EXPANDED_SCALE
    } else {
        1.0
    }
}

pub fn cycle_label(cycle: u32, total_cycles: u32) -> String {
    format!("Cycle {} of {}", cycle, total_cycles)
}

/// Everything a client needs to draw one frame of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub state: RunState,
    pub phase: Phase,
    pub phase_text: &'static str,
    pub phase_color: PhaseColor,
    pub is_expanded: bool,
    pub cue_gradient: CueGradient,
    pub cue_scale: f32,
    /// Seconds the cue's transition should take; matches the step duration.
    pub transition_secs: u32,
    pub countdown: u32,
    pub cycle: u32,
    pub total_cycles: u32,
    pub cycle_label: String,
    pub progress: f64,
}

impl SessionView {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        state: RunState,
        phase: Phase,
        step_duration: u32,
        is_expanded: bool,
        countdown: u32,
        cycle: u32,
        total_cycles: u32,
        progress: f64,
    ) -> Self {
        Self {
            state,
            phase,
            phase_text: phase_text(phase),
            phase_color: phase_color(phase),
            is_expanded,
            cue_gradient: cue_gradient(phase, is_expanded),
            cue_scale: cue_scale(is_expanded),
            transition_secs: step_duration,
            countdown,
            cycle,
            total_cycles,
            cycle_label: cycle_label(cycle, total_cycles),
            progress,
        }
    }
}

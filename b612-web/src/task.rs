use crate::gate::GateKey;
use crate::timeline::AnimationId;

/// Staged sequences that can be waiting on a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKey {
    Flyover,
    SunsetText,
    ExitText,
}

/// Everything the narrative schedules on its timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Auto-timer fallback for a gate.
    Fallback(GateKey),
    /// Day/night toggle.
    DayNight,
    /// Timeline cadence tick.
    Sample(AnimationId),
    /// The current stage of a sequence has elapsed.
    Stage(SequenceKey),
    RevealStars,
    PollEngineVolume,
}

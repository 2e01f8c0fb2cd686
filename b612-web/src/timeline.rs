use std::collections::HashMap;

use b612_shared::math::lerp;
use b612_shared::{ColorRamp, Easing};

use crate::scene::{EntityId, Property, Scene};
use crate::task::Task;
use crate::timer::{TimerId, TimerQueue};

/// One sample of a running timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub eased: f32,
    pub complete: bool,
}

/// Bounded, one-shot, time-sampled progress curve.
///
/// `sample` yields eased progress until raw progress reaches 1, yields exactly
/// one completing sample with `eased == 1.0`, then yields `None` forever.
#[derive(Debug, Clone)]
pub struct Timeline {
    started_at: u64,
    duration: u64,
    easing: Easing,
    done: bool,
}

impl Timeline {
    pub fn start(now: u64, duration: u64, easing: Easing) -> Self {
        Self {
            started_at: now,
            duration,
            easing,
            done: false,
        }
    }

    pub fn sample(&mut self, now: u64) -> Option<Sample> {
        if self.done {
            return None;
        }
        let raw = if self.duration == 0 {
            1.0
        } else {
            let elapsed = now.saturating_sub(self.started_at) as f64;
            (elapsed / self.duration as f64).min(1.0) as f32
        };
        if raw >= 1.0 {
            self.done = true;
            return Some(Sample {
                eased: 1.0,
                complete: true,
            });
        }
        Some(Sample {
            eased: self.easing.apply(raw),
            complete: false,
        })
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// An entity property driven by a timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Track {
    Color { entity: EntityId, ramp: ColorRamp },
    Intensity { entity: EntityId, from: f32, to: f32 },
    Opacity { entity: EntityId, from: f32, to: f32 },
}

impl Track {
    pub fn target(&self) -> (&EntityId, Property) {
        match self {
            Track::Color { entity, .. } => (entity, Property::Color),
            Track::Intensity { entity, .. } => (entity, Property::LightIntensity),
            Track::Opacity { entity, .. } => (entity, Property::Opacity),
        }
    }

    fn apply<S: Scene>(&self, scene: &mut S, t: f32) {
        match self {
            Track::Color { entity, ramp } => scene.set_color(entity, ramp.sample(t)),
            Track::Intensity { entity, from, to } => {
                scene.set_light_intensity(entity, lerp(*from, *to, t))
            }
            Track::Opacity { entity, from, to } => scene.set_opacity(entity, lerp(*from, *to, t)),
        }
    }
}

/// Who started an animation; used for continuations and bulk cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    DayNight,
    Sunset,
    Nightfall,
    SunsetText,
    ExitText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

/// Parameters for [`Animator::play`].
#[derive(Debug, Clone)]
pub struct Playback {
    pub owner: Owner,
    pub tracks: Vec<Track>,
    pub duration: u64,
    pub cadence: u64,
    pub easing: Easing,
}

struct Running {
    timeline: Timeline,
    tracks: Vec<Track>,
    owner: Owner,
    timer: TimerId,
}

/// Runs timelines on the narrative timer queue, one repeating cadence timer
/// per animation.
#[derive(Default)]
pub struct Animator {
    running: HashMap<AnimationId, Running>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an animation now. Any running animation touching one of the same
    /// entity properties is cancelled first.
    pub fn play(&mut self, playback: Playback, timers: &mut TimerQueue<Task>) -> AnimationId {
        let superseded: Vec<AnimationId> = self
            .running
            .iter()
            .filter(|(_, running)| {
                running.tracks.iter().any(|old| {
                    playback
                        .tracks
                        .iter()
                        .any(|new| old.target() == new.target())
                })
            })
            .map(|(id, _)| *id)
            .collect();
        for id in superseded {
            log::debug!("Animation {id:?} superseded");
            self.cancel(id, timers);
        }

        self.next_id += 1;
        let id = AnimationId(self.next_id);
        let timer = timers.every(playback.cadence, Task::Sample(id));
        self.running.insert(
            id,
            Running {
                timeline: Timeline::start(timers.now(), playback.duration, playback.easing),
                tracks: playback.tracks,
                owner: playback.owner,
                timer,
            },
        );
        id
    }

    /// Apply one cadence tick. Returns the owner when this tick completed the
    /// animation; the animation is gone afterwards.
    pub fn sample<S: Scene>(
        &mut self,
        id: AnimationId,
        timers: &mut TimerQueue<Task>,
        scene: &mut S,
    ) -> Option<Owner> {
        let running = self.running.get_mut(&id)?;
        let sample = running.timeline.sample(timers.now())?;
        for track in &running.tracks {
            track.apply(scene, sample.eased);
        }
        if !sample.complete {
            return None;
        }
        let running = self.running.remove(&id)?;
        timers.cancel(running.timer);
        Some(running.owner)
    }

    pub fn cancel(&mut self, id: AnimationId, timers: &mut TimerQueue<Task>) -> bool {
        match self.running.remove(&id) {
            Some(running) => {
                timers.cancel(running.timer);
                true
            }
            None => false,
        }
    }

    /// Cancel every animation started by `owner`. Returns how many stopped.
    pub fn cancel_owned(&mut self, owner: Owner, timers: &mut TimerQueue<Task>) -> usize {
        let ids: Vec<AnimationId> = self
            .running
            .iter()
            .filter(|(_, running)| running.owner == owner)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.cancel(*id, timers);
        }
        ids.len()
    }

    pub fn is_running(&self, id: AnimationId) -> bool {
        self.running.contains_key(&id)
    }

    pub fn running_for(&self, owner: Owner) -> usize {
        self.running.values().filter(|r| r.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

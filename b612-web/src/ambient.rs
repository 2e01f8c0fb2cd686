//! Sky and sunlight: the day/night cycle, the golden-hour sunset, nightfall,
//! and the fades of the narrative text.

use b612_shared::{ColorRamp, Easing};

use crate::config::{DayNightConfig, NarrativeConfig, NightfallConfig, RevealConfig, SunsetConfig};
use crate::scene::{EntityId, Scene};
use crate::sequence::Sequence;
use crate::task::{SequenceKey, Task};
use crate::timeline::{AnimationId, Animator, Owner, Playback, Track};
use crate::timer::{TimerId, TimerQueue};

/// Stages of a narrative text reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStage {
    FadeIn,
    Hold,
    FadeOut,
}

/// Things the ambient controller reports back to the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbientEvent {
    /// Golden hour reached.
    SunsetComplete,
}

pub struct AmbientController {
    sky: EntityId,
    sun: EntityId,
    text: EntityId,
    day_night: DayNightConfig,
    sunset: SunsetConfig,
    reveal: RevealConfig,
    nightfall: NightfallConfig,
    animator: Animator,
    cycle: Option<TimerId>,
    daytime: bool,
    sunset_complete: bool,
    sunset_text: Sequence<RevealStage>,
    exit_text: Sequence<RevealStage>,
}

impl AmbientController {
    pub fn new(config: &NarrativeConfig) -> Self {
        let reveal = config.reveal.clone();
        let stages = [
            (RevealStage::FadeIn, reveal.fade_in_ms),
            (RevealStage::Hold, reveal.hold_ms),
            (RevealStage::FadeOut, reveal.fade_out_ms),
        ];
        Self {
            sky: config.entities.sky.clone(),
            sun: config.entities.sun.clone(),
            text: config.entities.narrative_text.clone(),
            day_night: config.day_night.clone(),
            sunset: config.sunset.clone(),
            reveal,
            nightfall: config.nightfall.clone(),
            animator: Animator::new(),
            cycle: None,
            daytime: true,
            sunset_complete: false,
            sunset_text: Sequence::new(stages),
            exit_text: Sequence::new(stages),
        }
    }

    pub fn is_daytime(&self) -> bool {
        self.daytime
    }

    pub fn is_cycling(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn sunset_complete(&self) -> bool {
        self.sunset_complete
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    // ─── Day/night ──────────────────────────────────────────────────────

    /// Toggle day and night every period until cancelled.
    pub fn start_day_night(&mut self, timers: &mut TimerQueue<Task>) {
        if self.cycle.is_none() {
            self.cycle = Some(timers.every(self.day_night.period_ms, Task::DayNight));
        }
    }

    pub fn toggle_day_night<S: Scene>(&mut self, timers: &mut TimerQueue<Task>, scene: &S) {
        self.daytime = !self.daytime;
        let c = &self.day_night;
        let (target, from_sky, from, to) = if self.daytime {
            (c.day_sky, c.night_sky, c.night_intensity, c.day_intensity)
        } else {
            (c.night_sky, c.day_sky, c.day_intensity, c.night_intensity)
        };
        let start = scene.color(&self.sky).unwrap_or(from_sky);
        log::info!("Sky turning to {}", if self.daytime { "day" } else { "night" });

        let playback = Playback {
            owner: Owner::DayNight,
            tracks: vec![
                Track::Color {
                    entity: self.sky.clone(),
                    ramp: ColorRamp::between(start, target),
                },
                Track::Intensity {
                    entity: self.sun.clone(),
                    from,
                    to,
                },
            ],
            duration: c.transition_ms,
            cadence: c.cadence_ms,
            easing: Easing::EaseInOutQuad,
        };
        self.animator.play(playback, timers);
    }

    /// Stop the cycle, including a toggle already in progress.
    pub fn cancel_day_night(&mut self, timers: &mut TimerQueue<Task>) -> bool {
        let Some(cycle) = self.cycle.take() else {
            return false;
        };
        timers.cancel(cycle);
        let interrupted = self.animator.cancel_owned(Owner::DayNight, timers);
        log::info!("Day/night cycle stopped ({interrupted} transition(s) interrupted)");
        true
    }

    // ─── Sunset ─────────────────────────────────────────────────────────

    /// Start the golden-hour sequence.
    pub fn start_sunset(&mut self, timers: &mut TimerQueue<Task>) -> AnimationId {
        log::info!("Golden hour begins ({} ms)", self.sunset.duration_ms);
        let playback = Playback {
            owner: Owner::Sunset,
            tracks: vec![
                Track::Color {
                    entity: self.sky.clone(),
                    ramp: self.sunset.sky.clone(),
                },
                Track::Intensity {
                    entity: self.sun.clone(),
                    from: self.sunset.sun_from,
                    to: self.sunset.sun_to,
                },
            ],
            duration: self.sunset.duration_ms,
            cadence: self.sunset.cadence_ms,
            easing: Easing::EaseInOutQuad,
        };
        self.animator.play(playback, timers)
    }

    /// Sky to black and the sun down to a glimmer, from wherever they are.
    pub fn start_nightfall<S: Scene>(
        &mut self,
        timers: &mut TimerQueue<Task>,
        scene: &S,
    ) -> AnimationId {
        let from_sky = scene.color(&self.sky).unwrap_or(self.sunset.sky.last());
        let from_sun = scene
            .light_intensity(&self.sun)
            .unwrap_or(self.nightfall.sun_fallback);
        log::info!("Night falls over the moon");
        let playback = Playback {
            owner: Owner::Nightfall,
            tracks: vec![
                Track::Color {
                    entity: self.sky.clone(),
                    ramp: ColorRamp::between(from_sky, self.nightfall.sky),
                },
                Track::Intensity {
                    entity: self.sun.clone(),
                    from: from_sun,
                    to: self.nightfall.sun_to,
                },
            ],
            duration: self.nightfall.duration_ms,
            cadence: self.nightfall.cadence_ms,
            easing: Easing::EaseInOutQuad,
        };
        self.animator.play(playback, timers)
    }

    /// Handle a cadence tick for one of our animations.
    pub fn on_sample<S: Scene>(
        &mut self,
        id: AnimationId,
        timers: &mut TimerQueue<Task>,
        scene: &mut S,
    ) -> Option<AmbientEvent> {
        match self.animator.sample(id, timers, scene)? {
            Owner::Sunset => {
                self.sunset_complete = true;
                scene.set_color(&self.sky, self.sunset.sky.last());
                log::info!("Sunset complete, golden hour reached");
                self.reveal_text(SequenceKey::SunsetText, timers);
                Some(AmbientEvent::SunsetComplete)
            }
            _ => None,
        }
    }

    // ─── Narrative text ─────────────────────────────────────────────────

    /// Fade the narrative text in, hold it, fade it out. Each reveal runs once.
    pub fn reveal_text(&mut self, key: SequenceKey, timers: &mut TimerQueue<Task>) {
        let Some(sequence) = self.reveal_sequence(key) else {
            return;
        };
        if let Some(stage) = sequence.start(timers, Task::Stage(key)) {
            self.enter_reveal(key, stage, timers);
        }
    }

    /// The current reveal stage of `key` has elapsed.
    pub fn on_stage(&mut self, key: SequenceKey, timers: &mut TimerQueue<Task>) {
        let Some(sequence) = self.reveal_sequence(key) else {
            return;
        };
        let transition = sequence.advance(timers, Task::Stage(key));
        if let Some(stage) = transition.entered {
            self.enter_reveal(key, stage, timers);
        }
    }

    pub fn reveal_stage(&self, key: SequenceKey) -> Option<RevealStage> {
        match key {
            SequenceKey::SunsetText => self.sunset_text.current(),
            SequenceKey::ExitText => self.exit_text.current(),
            SequenceKey::Flyover => None,
        }
    }

    fn reveal_sequence(&mut self, key: SequenceKey) -> Option<&mut Sequence<RevealStage>> {
        match key {
            SequenceKey::SunsetText => Some(&mut self.sunset_text),
            SequenceKey::ExitText => Some(&mut self.exit_text),
            SequenceKey::Flyover => None,
        }
    }

    fn enter_reveal(
        &mut self,
        key: SequenceKey,
        stage: RevealStage,
        timers: &mut TimerQueue<Task>,
    ) {
        let (owner, cadence) = match key {
            SequenceKey::ExitText => (Owner::ExitText, self.reveal.exit_cadence_ms),
            _ => (Owner::SunsetText, self.reveal.sunset_cadence_ms),
        };
        let (from, to, duration) = match stage {
            RevealStage::FadeIn => (0.0, 1.0, self.reveal.fade_in_ms),
            RevealStage::FadeOut => (1.0, 0.0, self.reveal.fade_out_ms),
            RevealStage::Hold => return,
        };
        self.animator.play(
            Playback {
                owner,
                tracks: vec![Track::Opacity {
                    entity: self.text.clone(),
                    from,
                    to,
                }],
                duration,
                cadence,
                easing: Easing::Linear,
            },
            timers,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingScene, Write};
    use b612_shared::Rgb;

    struct Rig {
        ambient: AmbientController,
        timers: TimerQueue<Task>,
        scene: RecordingScene,
        events: Vec<(u64, AmbientEvent)>,
    }

    impl Rig {
        fn new(config: NarrativeConfig) -> Self {
            Self {
                ambient: AmbientController::new(&config),
                timers: TimerQueue::new(0),
                scene: RecordingScene::with_entities(&["dome", "sun", "rose-text"]),
                events: Vec::new(),
            }
        }

        fn run_until(&mut self, until: u64) {
            while let Some((_, task)) = self.timers.pop_due(until) {
                match task {
                    Task::DayNight => self.ambient.toggle_day_night(&mut self.timers, &self.scene),
                    Task::Sample(id) => {
                        let event = self.ambient.on_sample(id, &mut self.timers, &mut self.scene);
                        if let Some(ev) = event {
                            self.events.push((self.timers.now(), ev));
                        }
                    }
                    Task::Stage(key) => self.ambient.on_stage(key, &mut self.timers),
                    other => panic!("unexpected task {other:?}"),
                }
            }
            self.timers.settle(until);
        }
    }

    // ── day/night ──

    #[test]
    fn test_day_night_toggles_every_period() {
        let mut rig = Rig::new(NarrativeConfig::default());
        rig.scene.set_color(&"dome".into(), Rgb::from_u32(0x87CEEB));
        rig.ambient.start_day_night(&mut rig.timers);

        rig.run_until(29_999);
        assert!(rig.ambient.is_daytime());
        rig.run_until(30_000 + 5000 + 16);
        assert!(!rig.ambient.is_daytime());
        assert_eq!(rig.scene.color_of("dome"), Some(Rgb::from_u32(0x191970)));
        assert!((rig.scene.intensity_of("sun").unwrap() - 0.3).abs() < 1e-6);

        rig.run_until(60_000 + 5000 + 16);
        assert!(rig.ambient.is_daytime());
        assert_eq!(rig.scene.color_of("dome"), Some(Rgb::from_u32(0x87CEEB)));
        assert!((rig.scene.intensity_of("sun").unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_mid_transition_leaves_nothing_running() {
        let mut rig = Rig::new(NarrativeConfig::default());
        rig.ambient.start_day_night(&mut rig.timers);
        rig.run_until(32_000);
        assert_eq!(rig.ambient.animator().running_for(Owner::DayNight), 1);

        assert!(rig.ambient.cancel_day_night(&mut rig.timers));
        assert!(!rig.ambient.is_cycling());
        assert!(rig.ambient.animator().is_empty());
        assert!(rig.timers.is_empty());

        let writes = rig.scene.log.len();
        rig.run_until(120_000);
        assert_eq!(rig.scene.log.len(), writes, "sky kept changing after cancellation");
        assert!(!rig.ambient.cancel_day_night(&mut rig.timers));
    }

    // ── sunset ──

    #[test]
    fn test_sunset_completes_once_and_reports() {
        let mut config = NarrativeConfig::default();
        config.sunset.cadence_ms = 16;
        let mut rig = Rig::new(config);
        rig.ambient.start_sunset(&mut rig.timers);

        rig.run_until(14_992);
        assert!(!rig.ambient.sunset_complete());
        assert!(rig.events.is_empty());

        rig.run_until(15_008);
        assert!(rig.ambient.sunset_complete());
        assert_eq!(rig.events, vec![(15_008, AmbientEvent::SunsetComplete)]);
        assert_eq!(rig.scene.color_of("dome"), Some(Rgb::from_u32(0xFF8C42)));
        assert!((rig.scene.intensity_of("sun").unwrap() - 0.7).abs() < 1e-6);

        rig.run_until(60_000);
        assert_eq!(rig.events.len(), 1);
    }

    #[test]
    fn test_sunset_sky_passes_through_keyframes_in_order() {
        let mut rig = Rig::new(NarrativeConfig::default());
        rig.ambient.start_sunset(&mut rig.timers);
        rig.run_until(20_000);
        let colors: Vec<Rgb> = rig
            .scene
            .writes_to("dome")
            .into_iter()
            .filter_map(|w| match w {
                Write::Color(c) => Some(c),
                _ => None,
            })
            .collect();
        // Red rises monotonically from night blue to golden orange
        assert!(colors.windows(2).all(|w| w[1].r >= w[0].r));
        assert_eq!(*colors.last().unwrap(), Rgb::from_u32(0xFF8C42));
    }

    #[test]
    fn test_sunset_text_fades_in_holds_and_fades_out() {
        let mut config = NarrativeConfig::default();
        config.sunset.duration_ms = 0;
        let mut rig = Rig::new(config);
        rig.ambient.start_sunset(&mut rig.timers);

        // Completes on the first 33 ms tick; the reveal starts there
        rig.run_until(33);
        assert!(rig.ambient.sunset_complete());
        assert_eq!(rig.ambient.reveal_stage(SequenceKey::SunsetText), Some(RevealStage::FadeIn));

        rig.run_until(33 + 2000);
        assert_eq!(rig.scene.opacity_of("rose-text"), Some(1.0));
        assert_eq!(rig.ambient.reveal_stage(SequenceKey::SunsetText), Some(RevealStage::Hold));

        rig.run_until(33 + 4000);
        assert_eq!(rig.scene.opacity_of("rose-text"), Some(1.0));

        rig.run_until(33 + 7000 + 50);
        assert_eq!(rig.scene.opacity_of("rose-text"), Some(0.0));
        assert_eq!(rig.ambient.reveal_stage(SequenceKey::SunsetText), None);
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn test_reveal_runs_once_per_key() {
        let mut rig = Rig::new(NarrativeConfig::default());
        rig.ambient.reveal_text(SequenceKey::ExitText, &mut rig.timers);
        rig.run_until(10_000);
        let writes = rig.scene.writes_to("rose-text").len();
        rig.ambient.reveal_text(SequenceKey::ExitText, &mut rig.timers);
        rig.run_until(20_000);
        assert_eq!(rig.scene.writes_to("rose-text").len(), writes);
    }

    // ── nightfall ──

    #[test]
    fn test_nightfall_starts_from_current_sky_and_sun() {
        let mut rig = Rig::new(NarrativeConfig::default());
        rig.scene.set_color(&"dome".into(), Rgb::from_u32(0xFF8C42));
        rig.scene.set_light_intensity(&"sun".into(), 0.7);
        rig.ambient.start_nightfall(&mut rig.timers, &rig.scene);

        rig.run_until(16);
        let first = rig.scene.color_of("dome").unwrap();
        assert!(first.r > 0xf0, "should start near golden orange, got {first}");

        rig.run_until(8016);
        assert_eq!(rig.scene.color_of("dome"), Some(Rgb::BLACK));
        assert!((rig.scene.intensity_of("sun").unwrap() - 0.1).abs() < 1e-6);
        assert!(rig.ambient.animator().is_empty());
    }
}

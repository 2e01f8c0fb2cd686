//! The narrative sequencer: gates, fallback timers and the flyover, wired to
//! the world switcher, the ambient controller and the audio mixer.

use b612_shared::math::volume_between;
use glam::Vec3;

use crate::ambient::{AmbientController, AmbientEvent};
use crate::audio::{Audio, Channel, CueHandle, Mixer};
use crate::config::NarrativeConfig;
use crate::error::Error;
use crate::gate::{Gate, GateKey, GateState};
use crate::input::{InteractionDispatcher, InteractionSignal, SourceKind};
use crate::scene::{AnimationSpec, EntityId, Scene};
use crate::sequence::{Sequence, Transition};
use crate::task::{SequenceKey, Task};
use crate::timer::{TimerId, TimerQueue};
use crate::world::{World, WorldSwitcher};

/// Stages of the flying airplane's pass over the moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyoverStage {
    /// Waiting for the plane to appear.
    Approach,
    /// The plane crosses the sky.
    Crossing,
}

/// What happens when the airplane gate fires, in order. Day/night stops
/// before any audio changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    CancelFallback,
    StopDayNight,
    EnterMoon,
    SwapMusic,
    HideStars,
    Sunset,
    Flyover,
}

const LANDING: [Landing; 7] = [
    Landing::CancelFallback,
    Landing::StopDayNight,
    Landing::EnterMoon,
    Landing::SwapMusic,
    Landing::HideStars,
    Landing::Sunset,
    Landing::Flyover,
];

/// The whole experience. The host owns one and feeds it input, audio-ended
/// notifications and frame times; everything else happens on its timer queue.
pub struct Experience<S: Scene, A: Audio> {
    config: NarrativeConfig,
    scene: S,
    audio: A,
    timers: TimerQueue<Task>,
    dispatcher: InteractionDispatcher,
    mixer: Mixer,
    ambient: AmbientController,
    worlds: WorldSwitcher,
    airplane: Gate,
    rose: Gate,
    rose_wired: bool,
    fox: Option<EntityId>,
    missing: Vec<EntityId>,
    started: bool,
    desert_fallback: Option<TimerId>,
    moon_fallback: Option<TimerId>,
    flyover: Sequence<FlyoverStage>,
    engine_poll: Option<TimerId>,
    /// Parts of each matched star, in document order.
    stars: Vec<Vec<EntityId>>,
    stars_shown: usize,
    star_timer: Option<TimerId>,
}

impl<S: Scene, A: Audio> Experience<S, A> {
    /// Wire the experience to a loaded scene.
    ///
    /// Missing entities are logged and their wiring skipped; nothing here
    /// fails.
    pub fn new(config: NarrativeConfig, scene: S, audio: A, now: u64) -> Self {
        let entities = &config.entities;
        let worlds = &config.worlds;
        let expected = [
            &entities.sky,
            &entities.sun,
            &entities.camera_rig,
            &entities.airplane,
            &entities.rose,
            &entities.flying_airplane,
            &entities.blink_light,
            &entities.narrative_text,
            &entities.balloons,
            &worlds.desert.root,
            &worlds.moon.root,
            &worlds.flower_field.root,
        ];
        let missing: Vec<EntityId> = expected
            .into_iter()
            .filter(|id| !scene.exists(id))
            .cloned()
            .collect();
        for id in &missing {
            log::warn!("{}", Error::MissingEntity(id.clone()));
        }

        let fox = scene.query_all(&entities.fox).into_iter().next();
        if fox.is_none() {
            log::warn!("Nothing matches the fox selector {:?}", entities.fox);
        }

        let mut dispatcher = InteractionDispatcher::new();
        let debounce = config.timing.debounce_ms;
        for id in [&entities.airplane, &entities.rose] {
            if scene.exists(id) {
                dispatcher.register(id.clone(), debounce);
            }
        }
        if let Some(id) = &fox {
            dispatcher.register(id.clone(), config.timing.fox_cooldown_ms);
        }

        let airplane = if scene.exists(&entities.airplane) {
            Gate::armed(GateKey::Airplane)
        } else {
            Gate::locked(GateKey::Airplane)
        };
        let rose_wired = scene.exists(&entities.rose);

        let switcher = WorldSwitcher::new(
            config.worlds.clone(),
            entities.sky.clone(),
            entities.camera_rig.clone(),
            entities.balloons.clone(),
        );
        let flyover = Sequence::new([
            (FlyoverStage::Approach, config.flyover.delay_ms),
            (FlyoverStage::Crossing, config.flyover.crossing_ms),
        ]);

        let mut timers = TimerQueue::new(now);
        let mut ambient = AmbientController::new(&config);
        ambient.start_day_night(&mut timers);
        log::info!("Experience ready ({} entities missing)", missing.len());

        Self {
            config,
            scene,
            audio,
            timers,
            dispatcher,
            mixer: Mixer::new(),
            ambient,
            worlds: switcher,
            airplane,
            rose: Gate::locked(GateKey::Rose),
            rose_wired,
            fox,
            missing,
            started: false,
            desert_fallback: None,
            moon_fallback: None,
            flyover,
            engine_poll: None,
            stars: Vec::new(),
            stars_shown: 0,
            star_timer: None,
        }
    }

    // ─── Host entry points ──────────────────────────────────────────────

    /// The start button: desert wind and the desert → moon fallback.
    /// Returns false if already started.
    pub fn start(&mut self, now: u64) -> bool {
        self.advance(now);
        if self.started {
            return false;
        }
        self.started = true;
        log::info!("Experience started");

        if self.worlds.current() == World::Desert {
            self.mixer
                .play(&mut self.audio, Channel::Ambience, &self.config.audio.wind);
        }
        if self.airplane.state() == GateState::Armed {
            self.desert_fallback = Some(self.timers.after(
                self.config.timing.desert_fallback_ms,
                Task::Fallback(GateKey::Airplane),
            ));
        }
        true
    }

    /// A raw click or trigger-down on `target`.
    pub fn pointer(&mut self, target: &EntityId, source: SourceKind, now: u64) {
        self.advance(now);
        if let Some(signal) = self.dispatcher.raw(target, source, now) {
            self.route(signal);
        }
    }

    /// The host finished playing a cue.
    pub fn audio_ended(&mut self, handle: CueHandle, now: u64) {
        self.advance(now);
        let Some((channel, clip)) = self.mixer.ended(handle) else {
            return;
        };
        log::debug!("{clip} ended on {channel:?}");
        if channel == Channel::Music
            && clip == self.config.audio.theme.clip
            && self.worlds.current() == World::Moon
        {
            log::info!("Theme over, the moon goes quiet");
            self.mixer
                .play(&mut self.audio, Channel::Ambience, &self.config.audio.space);
            self.ambient.start_nightfall(&mut self.timers, &self.scene);
        }
    }

    /// Run every timer due up to `now`.
    pub fn frame(&mut self, now: u64) {
        self.advance(now);
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    pub fn world(&self) -> World {
        self.worlds.current()
    }

    pub fn gate(&self, key: GateKey) -> &Gate {
        match key {
            GateKey::Airplane => &self.airplane,
            GateKey::Rose => &self.rose,
        }
    }

    pub fn ambient(&self) -> &AmbientController {
        &self.ambient
    }

    pub fn flyover_stage(&self) -> Option<FlyoverStage> {
        self.flyover.current()
    }

    pub fn missing_entities(&self) -> &[EntityId] {
        &self.missing
    }

    /// Entities the host should forward clicks and trigger presses for.
    pub fn interactive_targets(&self) -> Vec<EntityId> {
        let entities = &self.config.entities;
        [&entities.airplane, &entities.rose]
            .into_iter()
            .chain(self.fox.as_ref())
            .filter(|id| self.dispatcher.is_registered(id))
            .cloned()
            .collect()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    // ─── Scheduling ─────────────────────────────────────────────────────

    fn advance(&mut self, now: u64) {
        while let Some((_, task)) = self.timers.pop_due(now) {
            self.run(task);
        }
        self.timers.settle(now);
    }

    fn run(&mut self, task: Task) {
        match task {
            Task::Fallback(key) => self.fallback_fired(key),
            Task::DayNight => self.ambient.toggle_day_night(&mut self.timers, &self.scene),
            Task::Sample(id) => {
                let event = self.ambient.on_sample(id, &mut self.timers, &mut self.scene);
                if event == Some(AmbientEvent::SunsetComplete) {
                    self.mixer
                        .play(&mut self.audio, Channel::Effect, &self.config.audio.activation);
                }
            }
            Task::Stage(SequenceKey::Flyover) => {
                let transition = self
                    .flyover
                    .advance(&mut self.timers, Task::Stage(SequenceKey::Flyover));
                self.flyover_transition(transition);
            }
            Task::Stage(key) => self.ambient.on_stage(key, &mut self.timers),
            Task::RevealStars => self.reveal_stars(),
            Task::PollEngineVolume => self.poll_engine_volume(),
        }
    }

    // ─── Signals and gates ──────────────────────────────────────────────

    fn route(&mut self, signal: InteractionSignal) {
        let entities = &self.config.entities;
        if signal.target == entities.airplane {
            self.offer(GateKey::Airplane, signal);
        } else if signal.target == entities.rose {
            self.offer(GateKey::Rose, signal);
        } else if self.fox.as_ref() == Some(&signal.target) {
            log::info!("The fox cries");
            self.mixer
                .play(&mut self.audio, Channel::Effect, &self.config.audio.fox);
        }
    }

    fn fallback_fired(&mut self, key: GateKey) {
        let target = match key {
            GateKey::Airplane => {
                self.desert_fallback = None;
                self.config.entities.airplane.clone()
            }
            GateKey::Rose => {
                self.moon_fallback = None;
                self.config.entities.rose.clone()
            }
        };
        log::info!("Fallback timer fired for the {} gate", key.label());
        let signal = InteractionDispatcher::synthetic(target, self.timers.now());
        self.offer(key, signal);
    }

    fn offer(&mut self, key: GateKey, signal: InteractionSignal) {
        let fired = match key {
            GateKey::Airplane => self.airplane.offer(&signal),
            GateKey::Rose => self.rose.offer(&signal),
        };
        if !fired {
            return;
        }
        match key {
            GateKey::Airplane => self.airplane_fired(),
            GateKey::Rose => self.rose_fired(),
        }
    }

    /// Desert → moon.
    fn airplane_fired(&mut self) {
        for step in LANDING {
            self.land(step);
        }
    }

    fn land(&mut self, step: Landing) {
        match step {
            Landing::CancelFallback => {
                if let Some(timer) = self.desert_fallback.take() {
                    self.timers.cancel(timer);
                    log::info!("Desert fallback cancelled");
                }
            }
            Landing::StopDayNight => {
                self.ambient.cancel_day_night(&mut self.timers);
            }
            Landing::EnterMoon => self.worlds.switch(World::Moon, &mut self.scene),
            Landing::SwapMusic => {
                self.mixer.stop(&mut self.audio, Channel::Ambience);
                self.mixer
                    .play(&mut self.audio, Channel::Music, &self.config.audio.theme);
            }
            Landing::HideStars => self.start_star_reveal(),
            Landing::Sunset => {
                self.ambient.start_sunset(&mut self.timers);
            }
            Landing::Flyover => {
                if self
                    .flyover
                    .start(&mut self.timers, Task::Stage(SequenceKey::Flyover))
                    .is_some()
                {
                    log::info!("Plane due in {} ms", self.config.flyover.delay_ms);
                }
            }
        }
    }

    /// Moon → flower field.
    fn rose_fired(&mut self) {
        if let Some(timer) = self.moon_fallback.take() {
            self.timers.cancel(timer);
            log::info!("Moon fallback cancelled");
        }
        self.mixer
            .play(&mut self.audio, Channel::Ambience, &self.config.audio.flower);
        self.worlds.switch(World::FlowerField, &mut self.scene);
    }

    // ─── Flyover ────────────────────────────────────────────────────────

    fn flyover_transition(&mut self, transition: Transition<FlyoverStage>) {
        if transition.exited == Some(FlyoverStage::Crossing) {
            self.plane_left();
        }
        if transition.entered == Some(FlyoverStage::Crossing) {
            self.plane_appears();
        }
    }

    fn plane_appears(&mut self) {
        let plane = &self.config.entities.flying_airplane;
        let flyover = &self.config.flyover;
        if !self.scene.exists(plane) {
            log::warn!("{}, skipping the flyover visuals", Error::MissingEntity(plane.clone()));
            return;
        }
        log::info!("A plane crosses the sky");
        self.scene.set_visible(plane, true);
        self.scene.animate(
            plane,
            &AnimationSpec::move_to(Vec3::from_array(flyover.exit_to), flyover.crossing_ms),
        );
        self.mixer
            .play(&mut self.audio, Channel::Engine, &self.config.audio.engine);
        self.engine_poll = Some(self.timers.every(flyover.volume_poll_ms, Task::PollEngineVolume));

        let light = &self.config.entities.blink_light;
        if self.scene.exists(light) {
            self.scene.animate(
                light,
                &AnimationSpec::blink(flyover.blink_from, flyover.blink_to, flyover.blink_ms),
            );
        }
    }

    fn plane_left(&mut self) {
        if let Some(timer) = self.engine_poll.take() {
            self.timers.cancel(timer);
        }
        self.mixer.stop(&mut self.audio, Channel::Engine);
        log::info!("The plane has left the sky");

        if self.rose_wired && self.rose.arm() {
            log::info!("The rose can be touched");
            self.moon_fallback = Some(self.timers.after(
                self.config.timing.moon_fallback_ms,
                Task::Fallback(GateKey::Rose),
            ));
        }
        self.ambient.reveal_text(SequenceKey::ExitText, &mut self.timers);
    }

    fn poll_engine_volume(&mut self) {
        let entities = &self.config.entities;
        let (Some(plane), Some(rose)) = (
            self.scene.position(&entities.flying_airplane),
            self.scene.position(&entities.rose),
        ) else {
            return;
        };
        let flyover = &self.config.flyover;
        let volume = volume_between(plane, rose, flyover.near, flyover.far, flyover.floor);
        log::debug!("Engine at {:.1} from the rose, volume {volume:.2}", plane.distance(rose));
        self.mixer.set_volume(&mut self.audio, Channel::Engine, volume);
    }

    // ─── Stars ──────────────────────────────────────────────────────────

    /// Hide the parts of every star and schedule their reveal.
    fn start_star_reveal(&mut self) {
        let config = &self.config.stars;
        let matches = self.scene.query_all(&config.selector);
        if matches.is_empty() {
            return;
        }
        let stars: Vec<Vec<EntityId>> = matches
            .iter()
            .map(|star| {
                config
                    .parts
                    .iter()
                    .flat_map(|part| self.scene.query_all(&format!("#{star} {part}")))
                    .collect()
            })
            .collect();
        for part in stars.iter().flatten() {
            self.scene.set_visible(part, false);
        }
        let per_step = config.per_step.max(1) as u64;
        let interval = config.reveal_ms * per_step / stars.len() as u64;
        log::info!(
            "{} stars will appear over {} ms",
            stars.iter().filter(|parts| !parts.is_empty()).count(),
            config.reveal_ms
        );
        self.stars = stars;
        self.stars_shown = 0;
        self.star_timer = Some(self.timers.every(interval, Task::RevealStars));
    }

    fn reveal_stars(&mut self) {
        let per_step = self.config.stars.per_step.max(1);
        let end = (self.stars_shown + per_step).min(self.stars.len());
        for part in self.stars[self.stars_shown..end].iter().flatten() {
            self.scene.set_visible(part, true);
        }
        self.stars_shown = end;
        if self.stars_shown >= self.stars.len() {
            if let Some(timer) = self.star_timer.take() {
                self.timers.cancel(timer);
            }
            log::info!("Every star is out");
        }
    }
}

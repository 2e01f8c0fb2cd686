//! Recording doubles for the host scene and audio.

use std::collections::{HashMap, HashSet};

use b612_shared::Rgb;
use glam::Vec3;

use crate::audio::{Audio, AudioCue, CueHandle};
use crate::error::{Error, Result};
use crate::scene::{AnimationSpec, EntityId, Scene};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One attribute write, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Color(Rgb),
    Intensity(f32),
    Visible(bool),
    Opacity(f32),
    Position(Vec3),
    Animation(AnimationSpec),
}

#[derive(Default)]
pub struct RecordingScene {
    entities: HashSet<EntityId>,
    pub colors: HashMap<EntityId, Rgb>,
    pub intensities: HashMap<EntityId, f32>,
    pub visible: HashMap<EntityId, bool>,
    pub opacity: HashMap<EntityId, f32>,
    pub positions: HashMap<EntityId, Vec3>,
    pub selections: HashMap<String, Vec<EntityId>>,
    pub log: Vec<(EntityId, Write)>,
}

impl RecordingScene {
    pub fn with_entities(ids: &[&str]) -> Self {
        Self {
            entities: ids.iter().map(|id| EntityId::from(*id)).collect(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, id: &str) {
        self.entities.insert(id.into());
    }

    /// Register a selector result; the matched entities are created too.
    pub fn select(&mut self, selector: &str, ids: &[&str]) {
        for id in ids {
            self.add(id);
        }
        self.selections
            .insert(selector.to_string(), ids.iter().map(|id| EntityId::from(*id)).collect());
    }

    pub fn writes_to(&self, id: &str) -> Vec<Write> {
        self.log
            .iter()
            .filter(|(entity, _)| entity.as_str() == id)
            .map(|(_, w)| w.clone())
            .collect()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.get(&EntityId::from(id)).copied().unwrap_or(false)
    }

    pub fn color_of(&self, id: &str) -> Option<Rgb> {
        self.colors.get(&EntityId::from(id)).copied()
    }

    pub fn intensity_of(&self, id: &str) -> Option<f32> {
        self.intensities.get(&EntityId::from(id)).copied()
    }

    pub fn opacity_of(&self, id: &str) -> Option<f32> {
        self.opacity.get(&EntityId::from(id)).copied()
    }

    pub fn position_of(&self, id: &str) -> Option<Vec3> {
        self.positions.get(&EntityId::from(id)).copied()
    }

    pub fn animations_of(&self, id: &str) -> Vec<AnimationSpec> {
        self.writes_to(id)
            .into_iter()
            .filter_map(|w| match w {
                Write::Animation(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, id: &EntityId, write: Write) {
        self.log.push((id.clone(), write));
    }
}

impl Scene for RecordingScene {
    fn exists(&self, id: &EntityId) -> bool {
        self.entities.contains(id)
    }

    fn color(&self, id: &EntityId) -> Option<Rgb> {
        self.colors.get(id).copied()
    }

    fn set_color(&mut self, id: &EntityId, color: Rgb) {
        self.colors.insert(id.clone(), color);
        self.record(id, Write::Color(color));
    }

    fn light_intensity(&self, id: &EntityId) -> Option<f32> {
        self.intensities.get(id).copied()
    }

    fn set_light_intensity(&mut self, id: &EntityId, intensity: f32) {
        self.intensities.insert(id.clone(), intensity);
        self.record(id, Write::Intensity(intensity));
    }

    fn set_visible(&mut self, id: &EntityId, visible: bool) {
        self.visible.insert(id.clone(), visible);
        self.record(id, Write::Visible(visible));
    }

    fn set_opacity(&mut self, id: &EntityId, opacity: f32) {
        self.opacity.insert(id.clone(), opacity);
        self.record(id, Write::Opacity(opacity));
    }

    fn position(&self, id: &EntityId) -> Option<Vec3> {
        self.positions.get(id).copied()
    }

    fn set_position(&mut self, id: &EntityId, position: Vec3) {
        self.positions.insert(id.clone(), position);
        self.record(id, Write::Position(position));
    }

    fn animate(&mut self, id: &EntityId, spec: &AnimationSpec) {
        self.record(id, Write::Animation(spec.clone()));
    }

    fn query_all(&self, selector: &str) -> Vec<EntityId> {
        self.selections.get(selector).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Play(CueHandle, String),
    Stop(CueHandle),
    Volume(CueHandle, f32),
}

#[derive(Default)]
pub struct RecordingAudio {
    pub events: Vec<AudioEvent>,
    pub reject: bool,
    volumes: HashMap<CueHandle, f32>,
    clips: HashMap<CueHandle, String>,
}

impl RecordingAudio {
    /// Audio whose every `play` fails, like a browser blocking autoplay.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Default::default()
        }
    }

    pub fn volume_of(&self, handle: CueHandle) -> Option<f32> {
        self.volumes.get(&handle).copied()
    }

    pub fn handle_of(&self, clip: &str) -> Option<CueHandle> {
        self.clips
            .iter()
            .filter(|(_, c)| c.as_str() == clip)
            .map(|(h, _)| *h)
            .max()
    }

    /// Clips in the order they were started.
    pub fn played(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AudioEvent::Play(_, clip) => Some(clip.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn stopped(&self, clip: &str) -> bool {
        self.events.iter().any(|e| match e {
            AudioEvent::Stop(h) => self.clips.get(h).is_some_and(|c| c == clip),
            _ => false,
        })
    }
}

impl Audio for RecordingAudio {
    fn play(&mut self, handle: CueHandle, cue: &AudioCue) -> Result<()> {
        if self.reject {
            return Err(Error::Audio {
                clip: cue.clip.clone(),
                reason: "autoplay blocked".into(),
            });
        }
        self.volumes.insert(handle, cue.volume);
        self.clips.insert(handle, cue.clip.clone());
        self.events.push(AudioEvent::Play(handle, cue.clip.clone()));
        Ok(())
    }

    fn stop(&mut self, handle: CueHandle) {
        self.events.push(AudioEvent::Stop(handle));
    }

    fn set_volume(&mut self, handle: CueHandle, volume: f32) {
        self.volumes.insert(handle, volume);
        self.events.push(AudioEvent::Volume(handle, volume));
    }
}

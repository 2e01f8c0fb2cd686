use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A sound to play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioCue {
    pub clip: String,
    #[serde(default)]
    pub looping: bool,
    #[serde(default = "full_volume")]
    pub volume: f32,
}

fn full_volume() -> f32 {
    1.0
}

impl AudioCue {
    pub fn once(clip: &str, volume: f32) -> Self {
        Self {
            clip: clip.to_string(),
            looping: false,
            volume,
        }
    }

    pub fn looped(clip: &str, volume: f32) -> Self {
        Self {
            clip: clip.to_string(),
            looping: true,
            volume,
        }
    }
}

/// Handle to one playing cue, allocated by the [`Mixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CueHandle(pub u64);

/// Mixer slot. Each holds at most one cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Looping background bed (wind, space, flower theme).
    Ambience,
    /// The main theme.
    Music,
    /// The flying airplane's engine loop.
    Engine,
    /// One-shot effects.
    Effect,
}

/// The host audio primitive.
///
/// The host reports end of playback through
/// [`crate::Experience::audio_ended`].
pub trait Audio {
    fn play(&mut self, handle: CueHandle, cue: &AudioCue) -> Result<()>;
    /// Pause and rewind.
    fn stop(&mut self, handle: CueHandle);
    fn set_volume(&mut self, handle: CueHandle, volume: f32);
}

struct Active {
    handle: CueHandle,
    clip: String,
}

/// Tracks which cue occupies each channel; starting a cue on a busy channel
/// stops the previous one first.
#[derive(Default)]
pub struct Mixer {
    channels: HashMap<Channel, Active>,
    next_handle: u64,
}

impl Mixer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play<A: Audio>(
        &mut self,
        audio: &mut A,
        channel: Channel,
        cue: &AudioCue,
    ) -> Option<CueHandle> {
        self.stop(audio, channel);

        self.next_handle += 1;
        let handle = CueHandle(self.next_handle);
        let cue = AudioCue {
            volume: cue.volume.clamp(0.0, 1.0),
            ..cue.clone()
        };
        if let Err(e) = audio.play(handle, &cue) {
            log::warn!("{e}");
            return None;
        }
        log::info!("Playing {} on {channel:?}", cue.clip);
        self.channels.insert(
            channel,
            Active {
                handle,
                clip: cue.clip,
            },
        );
        Some(handle)
    }

    pub fn stop<A: Audio>(&mut self, audio: &mut A, channel: Channel) -> bool {
        match self.channels.remove(&channel) {
            Some(active) => {
                log::debug!("Stopping {} on {channel:?}", active.clip);
                audio.stop(active.handle);
                true
            }
            None => false,
        }
    }

    pub fn set_volume<A: Audio>(&mut self, audio: &mut A, channel: Channel, volume: f32) {
        if let Some(active) = self.channels.get(&channel) {
            audio.set_volume(active.handle, volume.clamp(0.0, 1.0));
        }
    }

    /// Forget a cue the host reports as finished. Returns the channel and
    /// clip it was playing on, if it was still current.
    pub fn ended(&mut self, handle: CueHandle) -> Option<(Channel, String)> {
        let channel = self
            .channels
            .iter()
            .find(|(_, active)| active.handle == handle)
            .map(|(channel, _)| *channel)?;
        let active = self.channels.remove(&channel)?;
        Some((channel, active.clip))
    }

    pub fn current(&self, channel: Channel) -> Option<&str> {
        self.channels.get(&channel).map(|a| a.clip.as_str())
    }

    pub fn handle(&self, channel: Channel) -> Option<CueHandle> {
        self.channels.get(&channel).map(|a| a.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AudioEvent, RecordingAudio};

    #[test]
    fn test_play_on_busy_channel_stops_previous() {
        let mut audio = RecordingAudio::default();
        let mut mixer = Mixer::new();
        let wind = mixer
            .play(&mut audio, Channel::Ambience, &AudioCue::looped("WindSFX.m4a", 0.5))
            .unwrap();
        let space = mixer
            .play(&mut audio, Channel::Ambience, &AudioCue::looped("SpaceSFX.mp3", 0.5))
            .unwrap();
        assert_ne!(wind, space);
        assert_eq!(mixer.current(Channel::Ambience), Some("SpaceSFX.mp3"));
        assert_eq!(
            audio.events,
            vec![
                AudioEvent::Play(wind, "WindSFX.m4a".into()),
                AudioEvent::Stop(wind),
                AudioEvent::Play(space, "SpaceSFX.mp3".into()),
            ]
        );
    }

    #[test]
    fn test_channels_are_independent() {
        let mut audio = RecordingAudio::default();
        let mut mixer = Mixer::new();
        mixer.play(&mut audio, Channel::Ambience, &AudioCue::looped("WindSFX.m4a", 0.5));
        mixer.play(&mut audio, Channel::Effect, &AudioCue::once("Foxsfx.mp3", 1.0));
        assert_eq!(mixer.current(Channel::Ambience), Some("WindSFX.m4a"));
        assert_eq!(mixer.current(Channel::Effect), Some("Foxsfx.mp3"));
        assert!(!audio.events.iter().any(|e| matches!(e, AudioEvent::Stop(_))));
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = RecordingAudio::default();
        let mut mixer = Mixer::new();
        let h = mixer
            .play(&mut audio, Channel::Engine, &AudioCue::looped("SFXAirplane.m4a", 1.4))
            .unwrap();
        assert_eq!(audio.volume_of(h), Some(1.0));
        mixer.set_volume(&mut audio, Channel::Engine, -0.5);
        assert_eq!(audio.volume_of(h), Some(0.0));
    }

    #[test]
    fn test_ended_releases_channel_once() {
        let mut audio = RecordingAudio::default();
        let mut mixer = Mixer::new();
        let theme = mixer
            .play(&mut audio, Channel::Music, &AudioCue::once("StarsSong.m4a", 0.6))
            .unwrap();
        assert_eq!(mixer.ended(theme), Some((Channel::Music, "StarsSong.m4a".to_string())));
        assert_eq!(mixer.ended(theme), None);
        assert!(!mixer.stop(&mut audio, Channel::Music));
    }

    #[test]
    fn test_rejected_cue_leaves_channel_empty() {
        let mut audio = RecordingAudio::rejecting();
        let mut mixer = Mixer::new();
        let theme = AudioCue::once("StarsSong.m4a", 0.6);
        assert!(mixer.play(&mut audio, Channel::Music, &theme).is_none());
        assert_eq!(mixer.current(Channel::Music), None);
        assert!(audio.events.is_empty());
        assert!(!mixer.stop(&mut audio, Channel::Music));
    }
}

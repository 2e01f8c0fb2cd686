use b612_shared::{ColorRamp, Rgb};
use serde::{Deserialize, Serialize};

use crate::audio::AudioCue;
use crate::error::Result;
use crate::scene::EntityId;
use crate::world::WorldPreset;

/// Everything tunable about the experience. Defaults reproduce the shipped
/// scene; a TOML document may override any subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    pub entities: EntityConfig,
    pub timing: TimingConfig,
    pub day_night: DayNightConfig,
    pub sunset: SunsetConfig,
    pub reveal: RevealConfig,
    pub nightfall: NightfallConfig,
    pub stars: StarConfig,
    pub flyover: FlyoverConfig,
    pub audio: AudioConfig,
    pub worlds: WorldsConfig,
}

impl NarrativeConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// Scene entity ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    pub sky: EntityId,
    pub sun: EntityId,
    pub camera_rig: EntityId,
    pub airplane: EntityId,
    pub rose: EntityId,
    /// Selector for the fox's clickable part, which carries no id in the
    /// page. The first match is wired.
    pub fox: String,
    pub flying_airplane: EntityId,
    pub blink_light: EntityId,
    pub narrative_text: EntityId,
    pub balloons: EntityId,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            sky: "dome".into(),
            sun: "sun".into(),
            camera_rig: "camera-rig".into(),
            airplane: "airplane".into(),
            rose: "rose".into(),
            fox: "#fox .clickable".to_string(),
            flying_airplane: "flying-airplane".into(),
            blink_light: "airplane-blink-light".into(),
            narrative_text: "rose-text".into(),
            balloons: "balloons".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Per-entity interaction debounce window.
    pub debounce_ms: u64,
    pub fox_cooldown_ms: u64,
    /// Desert → moon auto-transition after the start button.
    pub desert_fallback_ms: u64,
    /// Moon → flower auto-transition after the plane leaves the sky.
    pub moon_fallback_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            fox_cooldown_ms: 3000,
            desert_fallback_ms: 20_000,
            moon_fallback_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightConfig {
    pub period_ms: u64,
    pub transition_ms: u64,
    pub cadence_ms: u64,
    pub day_sky: Rgb,
    pub night_sky: Rgb,
    pub day_intensity: f32,
    pub night_intensity: f32,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            period_ms: 30_000,
            transition_ms: 5000,
            cadence_ms: 16,
            day_sky: Rgb::from_u32(0x87CEEB),
            night_sky: Rgb::from_u32(0x191970),
            day_intensity: 1.0,
            night_intensity: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SunsetConfig {
    pub duration_ms: u64,
    pub cadence_ms: u64,
    pub sky: ColorRamp,
    pub sun_from: f32,
    pub sun_to: f32,
}

impl Default for SunsetConfig {
    fn default() -> Self {
        Self {
            duration_ms: 15_000,
            cadence_ms: 33,
            sky: golden_hour(),
            sun_from: 1.0,
            sun_to: 0.7,
        }
    }
}

fn golden_hour() -> ColorRamp {
    ColorRamp::through([
        Rgb::from_u32(0x1C1C3C),
        Rgb::from_u32(0x7A6A72),
        Rgb::from_u32(0xFF8C42),
    ])
    .unwrap_or_else(|| ColorRamp::between(Rgb::BLACK, Rgb::BLACK))
}

/// Fade-in, hold, fade-out of the narrative text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub fade_in_ms: u64,
    pub hold_ms: u64,
    pub fade_out_ms: u64,
    pub sunset_cadence_ms: u64,
    pub exit_cadence_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            fade_in_ms: 2000,
            hold_ms: 3000,
            fade_out_ms: 2000,
            sunset_cadence_ms: 50,
            exit_cadence_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NightfallConfig {
    pub duration_ms: u64,
    pub cadence_ms: u64,
    pub sky: Rgb,
    pub sun_to: f32,
    /// Used when the sun's current intensity cannot be read.
    pub sun_fallback: f32,
}

impl Default for NightfallConfig {
    fn default() -> Self {
        Self {
            duration_ms: 8000,
            cadence_ms: 16,
            sky: Rgb::BLACK,
            sun_to: 0.1,
            sun_fallback: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub selector: String,
    /// Selectors, relative to each star, of the parts hidden and revealed.
    /// A match without any of these parts is left alone.
    pub parts: Vec<String>,
    /// Time over which every star becomes visible.
    pub reveal_ms: u64,
    pub per_step: usize,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            selector: "#moon-world a-entity[position]".to_string(),
            parts: vec!["a-sphere".to_string(), "a-light[type='point']".to_string()],
            reveal_ms: 35_000,
            per_step: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyoverConfig {
    /// Wait between the moon landing and the plane appearing.
    pub delay_ms: u64,
    pub crossing_ms: u64,
    pub exit_to: [f32; 3],
    pub volume_poll_ms: u64,
    pub near: f32,
    pub far: f32,
    pub floor: f32,
    pub blink_from: f32,
    pub blink_to: f32,
    pub blink_ms: u64,
}

impl Default for FlyoverConfig {
    fn default() -> Self {
        Self {
            delay_ms: 50_000,
            crossing_ms: 20_000,
            exit_to: [-35.0, 10.0, 0.0],
            volume_poll_ms: 100,
            near: 4.7,
            far: 35.0,
            floor: 0.2,
            blink_from: 0.0,
            blink_to: 3.0,
            blink_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub wind: AudioCue,
    pub theme: AudioCue,
    pub space: AudioCue,
    pub engine: AudioCue,
    pub activation: AudioCue,
    pub fox: AudioCue,
    pub flower: AudioCue,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            wind: AudioCue::looped("./WindSFX.m4a", 0.5),
            theme: AudioCue::once("./StarsSong.m4a", 0.6),
            space: AudioCue::looped("./SpaceSFX.mp3", 0.5),
            engine: AudioCue::looped("./SFXAirplane.m4a", 0.3),
            activation: AudioCue::once("./Magical_SFX.m4a", 1.0),
            fox: AudioCue::once("./Foxsfx.mp3", 1.0),
            flower: AudioCue::looped("./FlowerOST.mp3", 0.6),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldsConfig {
    pub desert: WorldPreset,
    pub moon: WorldPreset,
    pub flower_field: WorldPreset,
    pub balloons_to: [f32; 3],
    pub balloons_ms: u64,
}

impl Default for WorldsConfig {
    fn default() -> Self {
        Self {
            desert: WorldPreset {
                root: "desert-world".into(),
                sky: Rgb::from_u32(0xF4A460),
                camera: None,
            },
            moon: WorldPreset {
                root: "moon-world".into(),
                sky: Rgb::from_u32(0x1C1C3C),
                camera: Some([8.0, 20.3, -10.0]),
            },
            flower_field: WorldPreset {
                root: "flower-world".into(),
                sky: Rgb::from_u32(0x4979A7),
                camera: Some([0.0, 15.3, 0.0]),
            },
            balloons_to: [-20.0, 18.0, -8.0],
            balloons_ms: 30_000,
        }
    }
}

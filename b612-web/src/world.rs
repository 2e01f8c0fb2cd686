use b612_shared::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::WorldsConfig;
use crate::scene::{AnimationSpec, EntityId, Scene};

/// The three mutually exclusive macro-scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum World {
    Desert,
    Moon,
    FlowerField,
}

impl World {
    pub const ALL: [World; 3] = [World::Desert, World::Moon, World::FlowerField];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Desert => "desert",
            Self::Moon => "moon",
            Self::FlowerField => "flower field",
        }
    }
}

/// Static configuration of one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldPreset {
    /// Root entity whose visibility is toggled.
    pub root: EntityId,
    pub sky: Rgb,
    /// Camera rig position on arrival; `None` leaves the camera alone.
    #[serde(default)]
    pub camera: Option<[f32; 3]>,
}

/// Owns world visibility. Nothing else writes the world roots' `visible`.
pub struct WorldSwitcher {
    worlds: WorldsConfig,
    sky: EntityId,
    camera_rig: EntityId,
    balloons: EntityId,
    current: World,
}

impl WorldSwitcher {
    pub fn new(
        worlds: WorldsConfig,
        sky: EntityId,
        camera_rig: EntityId,
        balloons: EntityId,
    ) -> Self {
        Self {
            worlds,
            sky,
            camera_rig,
            balloons,
            current: World::Desert,
        }
    }

    pub fn current(&self) -> World {
        self.current
    }

    pub fn preset(&self, world: World) -> &WorldPreset {
        match world {
            World::Desert => &self.worlds.desert,
            World::Moon => &self.worlds.moon,
            World::FlowerField => &self.worlds.flower_field,
        }
    }

    /// Make `target` the only visible world and apply its preset.
    pub fn switch<S: Scene>(&mut self, target: World, scene: &mut S) {
        for world in World::ALL {
            scene.set_visible(&self.preset(world).root, false);
        }
        let preset = self.preset(target).clone();
        scene.set_visible(&preset.root, true);
        scene.set_color(&self.sky, preset.sky);
        if let Some(camera) = preset.camera {
            scene.set_position(&self.camera_rig, Vec3::from_array(camera));
        }

        if target == World::FlowerField && scene.exists(&self.balloons) {
            let spec = AnimationSpec::move_to(
                Vec3::from_array(self.worlds.balloons_to),
                self.worlds.balloons_ms,
            );
            scene.animate(&self.balloons, &spec);
            log::info!("Balloons drifting across the flower field");
        }

        log::info!("World: {} → {}", self.current.label(), target.label());
        self.current = target;
    }
}

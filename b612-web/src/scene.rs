use std::fmt;

use b612_shared::{Easing, Rgb};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier of a scene entity (the element id in the page).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity property written by the runtime's own timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Color,
    LightIntensity,
    Opacity,
}

/// What a host-side animation drives.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationTarget {
    Position { to: Vec3 },
    LightIntensity { from: f32, to: f32 },
}

/// Animation descriptor handed to the scene framework, which plays it on its
/// own clock. Used for decorative motion the narrative never waits on.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub target: AnimationTarget,
    pub duration_ms: u64,
    pub easing: Easing,
    pub looping: bool,
    pub alternate: bool,
}

impl AnimationSpec {
    /// Linear, non-looping move to `to`.
    pub fn move_to(to: Vec3, duration_ms: u64) -> Self {
        Self {
            target: AnimationTarget::Position { to },
            duration_ms,
            easing: Easing::Linear,
            looping: false,
            alternate: false,
        }
    }

    /// Light intensity oscillating between `from` and `to` forever.
    pub fn blink(from: f32, to: f32, duration_ms: u64) -> Self {
        Self {
            target: AnimationTarget::LightIntensity { from, to },
            duration_ms,
            easing: Easing::Linear,
            looping: true,
            alternate: true,
        }
    }

    /// Component property string in the scene framework's attribute syntax.
    pub fn to_attribute(&self) -> String {
        let mut out = match &self.target {
            AnimationTarget::Position { to } => {
                format!("property: position; to: {} {} {}", to.x, to.y, to.z)
            }
            AnimationTarget::LightIntensity { from, to } => {
                format!("property: light.intensity; from: {from}; to: {to}")
            }
        };
        out.push_str(&format!(
            "; dur: {}; easing: {}; loop: {}",
            self.duration_ms,
            self.easing.label(),
            self.looping
        ));
        if self.alternate {
            out.push_str("; dir: alternate");
        }
        out
    }
}

/// The host scene framework: entity lookup and attribute access.
///
/// Implementations must tolerate calls for entities that do not exist
/// (silently do nothing); existence is checked once at startup.
pub trait Scene {
    fn exists(&self, id: &EntityId) -> bool;

    fn color(&self, id: &EntityId) -> Option<Rgb>;
    fn set_color(&mut self, id: &EntityId, color: Rgb);

    fn light_intensity(&self, id: &EntityId) -> Option<f32>;
    fn set_light_intensity(&mut self, id: &EntityId, intensity: f32);

    fn set_visible(&mut self, id: &EntityId, visible: bool);
    fn set_opacity(&mut self, id: &EntityId, opacity: f32);

    fn position(&self, id: &EntityId) -> Option<Vec3>;
    fn set_position(&mut self, id: &EntityId, position: Vec3);

    fn animate(&mut self, id: &EntityId, spec: &AnimationSpec);

    /// Entities matching a selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<EntityId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_attribute() {
        let spec = AnimationSpec::move_to(Vec3::new(-35.0, 10.0, 0.0), 20000);
        assert_eq!(
            spec.to_attribute(),
            "property: position; to: -35 10 0; dur: 20000; easing: linear; loop: false"
        );
    }

    #[test]
    fn test_blink_attribute_alternates() {
        let spec = AnimationSpec::blink(0.0, 3.0, 500);
        let attr = spec.to_attribute();
        assert!(attr.starts_with("property: light.intensity; from: 0; to: 3"));
        assert!(attr.contains("loop: true"));
        assert!(attr.ends_with("dir: alternate"));
    }

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::from("rose-text");
        assert_eq!(id.to_string(), "rose-text");
        assert_eq!(id, EntityId::new(String::from("rose-text")));
    }
}

use serde::{Deserialize, Serialize};

/// Easing curves applied to normalized timeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// Quadratic ease-in-out, symmetric around 0.5.
    #[default]
    EaseInOutQuad,
}

impl Easing {
    /// Map raw progress in [0, 1] to eased progress in [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }

    /// Name understood by the host animation system.
    pub fn label(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInOutQuad => "easeInOutQuad",
        }
    }
}

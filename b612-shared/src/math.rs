use glam::Vec3;

/// Linear blend between two scalars.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map a listener-to-source distance onto a playback volume.
///
/// Distances are clamped to `[near, far]`. At `near` the volume is 1.0, at
/// `far` it is `floor`, linear in between.
pub fn proximity_volume(distance: f32, near: f32, far: f32, floor: f32) -> f32 {
    let span = far - near;
    if span <= 0.0 {
        return 1.0;
    }
    let clamped = distance.clamp(near, far);
    let closeness = 1.0 - (clamped - near) / span;
    floor + closeness * (1.0 - floor)
}

/// Volume for a source at `source` heard from `listener`.
pub fn volume_between(source: Vec3, listener: Vec3, near: f32, far: f32, floor: f32) -> f32 {
    proximity_volume(source.distance(listener), near, far, floor)
}

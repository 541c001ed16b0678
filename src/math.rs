use glam::UVec2;

/// Find the squared distance between two grid cells.
#[inline]
#[must_use]
pub fn distance_squared_to_uvec(a: UVec2, b: UVec2) -> f32 {
    a.as_vec2().distance_squared(b.as_vec2())
}

/// Find the Euclidean distance between two grid cells.
#[inline]
#[must_use]
pub fn distance_to_uvec(a: UVec2, b: UVec2) -> f32 {
    distance_squared_to_uvec(a, b).sqrt()
}

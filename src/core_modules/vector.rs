// Light, eye, normal and reflection vectors all share one type: a 3-component f64
// vector from nalgebra, which already provides dot products, scalar multiplication,
// subtraction and Euclidean normalization.

pub type Vector3 = nalgebra::Vector3<f64>;

/// Reflects `light` about `normal`: `r = l - 2n(n . l)`.
///
/// `normal` is used as given; it is not renormalized first.
#[inline]
pub fn reflect(light: &Vector3, normal: &Vector3) -> Vector3 {
    light - normal * (2.0 * normal.dot(light))
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
#[inline]
pub fn normalized_or_zero(v: &Vector3) -> Vector3 {
    v.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros)
}

use crate::types::Scalar;
use std::f32::consts::SQRT_2;

/// Gaussian error linear unit: `x * 0.5 * (1 + erf(x / sqrt(2)))`
#[inline]
pub fn gelu(x: Scalar) -> Scalar {
    x * 0.5 * (1.0 + libm::erff(x / SQRT_2))
}

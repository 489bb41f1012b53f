//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the range [min, max].
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Get the shortest signed angular distance to go from `a` to `b`.
///
/// The result is in the range [-pi, pi], and accounts for wrapping, so that the distance from
/// `0.1` to `2pi - 0.1` is `-0.2`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::zero);

    let c = rem_euclid(a - b, tau_t);
    let d = rem_euclid(b - a, tau_t);

    if c < d {
        -c
    }
    else {
        d
    }
}

/// Wrap an angle into the range [-pi, pi).
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::zero);

    rem_euclid(value + pi_t, pi_t + pi_t) - pi_t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const TAU: f64 = std::f64::consts::TAU;
    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_get_ang_dist() {
        assert_eq!(get_ang_dist(1f64, 2f64), 1f64);
        assert_eq!(get_ang_dist(2f64, 1f64), -1f64);
        assert_eq!(get_ang_dist(0f64, TAU), 0f64);
        assert_eq!(get_ang_dist(TAU, 0f64), 0f64);
        assert!((get_ang_dist(0.1f64, TAU - 0.1) + 0.2).abs() < 1e-12);

        // 137 deg to 180 deg turns positively, 180 deg to 137 deg negatively
        let a = 137f64.to_radians();
        let b = 180f64.to_radians();
        assert!((get_ang_dist(a, b) - 43f64.to_radians()).abs() < 1e-12);
        assert!((get_ang_dist(b, a) + 43f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_wrap_pi() {
        assert!((wrap_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_pi(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_pi(0.5f64) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&1.5f64, &0f64, &1f64), 1f64);
        assert_eq!(clamp(&-0.5f64, &0f64, &1f64), 0f64);
    }
}

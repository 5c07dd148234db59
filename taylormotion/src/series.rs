//! `series` holds the truncated Taylor (Maclaurin) series used to steer the moving point. Every
//! function takes the number of terms to keep, so callers can trade accuracy for cost and watch
//! what an inaccurate heading does to the motion.

use std::f64::consts::FRAC_PI_2;

/// n! accumulated in a float. The series divide by (2k+1)! which leaves the integer range long
/// before the terms stop mattering, so a float keeps large term counts from overflowing.
pub fn factorial(n: u32) -> f64 {
    let mut acc = 1.0;
    for i in 2..=n {
        acc *= i as f64;
    }
    acc
}

#[inline]
fn alternating(k: u32) -> f64 {
    if k % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

// Partial sum of x - x^3/3 + x^5/5 - ..., only meaningful for |x| <= 1.
fn arctan_partial(value: f64, terms: u32) -> f64 {
    let mut sum = 0.0;
    for k in 0..terms {
        let power = 2 * k + 1;
        sum += alternating(k) * value.powi(power as i32) / power as f64;
    }
    sum
}

/// Arctangent of `value` using `terms` terms of its series. Values outside [-1, 1] are folded
/// back in with atan(x) = sign(x) * pi/2 - atan(1/x), which is applied once; 1/x then always
/// lands inside the unit interval.
pub fn arctan(value: f64, terms: u32) -> f64 {
    if value.abs() <= 1.0 {
        return arctan_partial(value, terms);
    }
    value.signum() * FRAC_PI_2 - arctan_partial(1.0 / value, terms)
}

pub fn sin(angle: f64, terms: u32) -> f64 {
    let mut sum = 0.0;
    for k in 0..terms {
        let power = 2 * k + 1;
        sum += alternating(k) * angle.powi(power as i32) / factorial(power);
    }
    sum
}

pub fn cos(angle: f64, terms: u32) -> f64 {
    let mut sum = 0.0;
    for k in 0..terms {
        let power = 2 * k;
        sum += alternating(k) * angle.powi(power as i32) / factorial(power);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_4, FRAC_PI_6, PI};

    #[test]
    fn factorial_values() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(1), 1.0);
        assert_eq!(factorial(5), 120.0);
        assert_eq!(factorial(10), 3628800.0);
        // Past the u64 range but still finite.
        assert!(factorial(25).is_finite());
        assert!(factorial(25) > u64::MAX as f64);
    }

    #[test]
    fn arctan_of_zero_is_zero() {
        for n in 1..30 {
            assert_eq!(arctan(0.0, n), 0.0);
        }
    }

    #[test]
    fn arctan_of_one_approaches_quarter_pi() {
        assert_eq!(arctan(1.0, 1), 1.0);
        let mut previous = (arctan(1.0, 1) - FRAC_PI_4).abs();
        for n in 2..=50 {
            let err = (arctan(1.0, n) - FRAC_PI_4).abs();
            assert!(err < previous, "error grew at {} terms", n);
            previous = err;
        }
        assert!((arctan(1.0, 50) - FRAC_PI_4).abs() < 0.02);
    }

    #[test]
    fn arctan_reflects_large_values() {
        // One term of atan(1/3.4) is just 1/3.4.
        assert_abs_diff_eq!(arctan(3.4, 1), FRAC_PI_2 - 1.0 / 3.4, epsilon = 1e-12);
        assert_abs_diff_eq!(arctan(3.4, 20), 3.4_f64.atan(), epsilon = 1e-12);
        assert_abs_diff_eq!(arctan(-3.4, 20), (-3.4_f64).atan(), epsilon = 1e-12);
        assert_abs_diff_eq!(arctan(f64::INFINITY, 3), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn arctan_of_nan_terminates() {
        assert!(arctan(f64::NAN, 5).is_nan());
    }

    #[test]
    fn sin_cos_at_zero() {
        for n in 1..20 {
            assert_eq!(sin(0.0, n), 0.0);
            assert_eq!(cos(0.0, n), 1.0);
        }
    }

    #[test]
    fn sin_cos_converge_for_small_angles() {
        assert_abs_diff_eq!(sin(FRAC_PI_6, 10), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(cos(FRAC_PI_6, 10), 3.0_f64.sqrt() / 2.0, epsilon = 1e-6);
        assert!((sin(FRAC_PI_6, 1) - 0.5).abs() > (sin(FRAC_PI_6, 10) - 0.5).abs());
        assert!((cos(FRAC_PI_6, 1) - 0.75_f64.sqrt()).abs() > 1e-3);
    }

    #[test]
    fn low_order_cosine_goes_negative_near_right_angle() {
        // 1 - x^2/2 < 0 once x > sqrt(2); the stepper's step budget exists for this.
        assert!(cos(1.5, 2) < 0.0);
        assert!(cos(1.5, 10) > 0.0);
    }

    #[test]
    fn many_terms_stay_finite() {
        assert_abs_diff_eq!(sin(PI / 2.0, 100), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cos(PI / 2.0, 100), 0.0, epsilon = 1e-12);
    }
}

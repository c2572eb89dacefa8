// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The divergence evaluator: the unit of per-pixel work.

use num::Complex;

/// Counts how many iterations of `z = z*z + c` the orbit of `c` survives
/// before its magnitude reaches 2, up to `max_iterations`.
///
/// The orbit starts at zero, so the first iterate is `c` itself; a point
/// whose very first magnitude check is already outside the radius
/// reports 0.  A point that never escapes reports `max_iterations`.  The
/// escape test compares the squared magnitude against 4.0, which is the
/// same as testing the magnitude against 2.0 without paying for a square
/// root on every round.
///
/// Every input is valid.  A `max_iterations` of zero degenerates to an
/// immediate 0.
pub fn evaluate(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z = c;
    for count in 0..max_iterations {
        if z.norm_sqr() >= 4.0 {
            return count;
        }
        z = z * z + c;
    }
    max_iterations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_point_never_escapes() {
        for max in &[1, 10, 1000] {
            assert_eq!(evaluate(Complex::new(0.0, 0.0), *max), *max);
        }
    }

    #[test]
    fn far_exterior_point_escapes_immediately() {
        assert_eq!(evaluate(Complex::new(5.0, 5.0), 1000), 0);
    }

    #[test]
    fn zero_bound_degenerates_to_zero() {
        assert_eq!(evaluate(Complex::new(0.0, 0.0), 0), 0);
        assert_eq!(evaluate(Complex::new(5.0, 5.0), 0), 0);
    }

    #[test]
    fn count_is_always_within_the_bound() {
        let max = 64;
        for ix in 0..32 {
            for iy in 0..32 {
                let c = Complex::new(-2.0 + 0.125 * ix as f64, -2.0 + 0.125 * iy as f64);
                let count = evaluate(c, max);
                assert!(count <= max, "count {} out of range for {:?}", count, c);
            }
        }
    }

    #[test]
    fn near_boundary_point_takes_a_few_rounds() {
        let count = evaluate(Complex::new(-1.0, 0.5), 1000);
        assert!(count > 0 && count < 1000);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time test.  A point `c` on the complex plane is iterated
//! as `z -> z^e + c`, starting from zero, and the renderer wants to
//! know on which step (if any) `|z|` reaches 2, after which the
//! sequence is guaranteed to head off to infinity.

use num::Complex;

/// The outcome of iterating a single sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Escape {
    /// `|z|` reached 2 on this zero-based iteration.
    Diverged(usize),
    /// `|z|` never reached 2 within the iteration cap.
    Bounded,
}

/// True if `c` lies within the main cardioid of the classic
/// (exponent 2) Mandelbrot set.  The cusp at `0.25` counts as inside.
pub fn in_main_cardioid(c: Complex<f64>) -> bool {
    let q = c - Complex::new(0.25, 0.0);
    let r = q.norm();
    if r == 0.0 {
        return true;
    }
    let theta = (q.re / r).acos();
    r < 0.5 * (1.0 - theta.cos())
}

/// Iterate `z -> z^exponent + c` from `z = 0` for at most `limit`
/// steps, with no shortcuts.
pub fn escape_time(c: Complex<f64>, limit: usize, exponent: f64) -> Escape {
    let mut z: Complex<f64> = Complex::new(0.0, 0.0);
    let power = exponent == 2.0;
    for n in 0..limit {
        z = if power { z * z } else { z.powf(exponent) } + c;
        // A NaN here comes from raising zero to a negative power.
        if z.norm_sqr() >= 4.0 || z.is_nan() {
            return Escape::Diverged(n);
        }
    }
    Escape::Bounded
}

/// Determine the escape time of `c`.  For the classic exponent the
/// main cardioid is known to be bounded and is answered without
/// iterating.
pub fn diverges_within(c: Complex<f64>, limit: usize, exponent: f64) -> Escape {
    if exponent == 2.0 && in_main_cardioid(c) {
        return Escape::Bounded;
    }
    escape_time(c, limit, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn origin_is_bounded() {
        assert_eq!(diverges_within(Complex::new(0.0, 0.0), 64, 2.0), Escape::Bounded);
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 64, 2.0), Escape::Bounded);
    }

    #[test]
    fn far_points_escape_immediately() {
        assert_eq!(diverges_within(Complex::new(2.0, 0.0), 64, 2.0), Escape::Diverged(0));
        assert_eq!(diverges_within(Complex::new(0.0, -3.0), 64, 2.0), Escape::Diverged(0));
    }

    #[test]
    fn one_escapes_on_second_step() {
        // 0 -> 1 -> 2
        assert_eq!(diverges_within(Complex::new(1.0, 0.0), 64, 2.0), Escape::Diverged(1));
    }

    #[test]
    fn zero_limit_is_bounded() {
        assert_eq!(escape_time(Complex::new(5.0, 5.0), 0, 2.0), Escape::Bounded);
    }

    #[test]
    fn cusp_counts_as_cardioid() {
        assert!(in_main_cardioid(Complex::new(0.25, 0.0)));
        assert_eq!(diverges_within(Complex::new(0.25, 0.0), 1, 2.0), Escape::Bounded);
    }

    #[test]
    fn cardioid_membership() {
        assert!(in_main_cardioid(Complex::new(0.0, 0.0)));
        assert!(in_main_cardioid(Complex::new(-0.7, 0.0)));
        assert!(!in_main_cardioid(Complex::new(-1.0, 0.0)));
        assert!(!in_main_cardioid(Complex::new(0.3, 0.0)));
        assert!(!in_main_cardioid(Complex::new(0.0, 1.0)));
    }

    #[test]
    fn cardioid_shortcut_only_for_squares() {
        // Inside the classic cardioid, but escapes under z^3 + c.
        let c = Complex::new(-0.7, 0.0);
        assert_eq!(diverges_within(c, 64, 2.0), Escape::Bounded);
        assert_eq!(diverges_within(c, 64, 3.0), Escape::Diverged(3));
    }

    #[test]
    fn general_power_agrees_with_squaring() {
        // powf goes through polar form, so compare escape steps on
        // points well away from the boundary.
        for &c in &[
            Complex::new(1.0, 1.0),
            Complex::new(-2.5, 0.1),
            Complex::new(0.5, 0.5),
        ] {
            let squared = escape_time(c, 64, 2.0);
            let mut z: Complex<f64> = Complex::new(0.0, 0.0);
            let mut general = Escape::Bounded;
            for n in 0..64 {
                z = z.powf(2.0) + c;
                if z.norm_sqr() >= 4.0 {
                    general = Escape::Diverged(n);
                    break;
                }
            }
            assert_eq!(squared, general, "{:?}", c);
        }
    }

    #[test]
    fn escape_is_deterministic() {
        let c = Complex::new(-0.743_643_9, 0.131_825_9);
        let first = diverges_within(c, 500, 2.0);
        for _ in 0..10 {
            assert_eq!(diverges_within(c, 500, 2.0), first);
        }
        let first = diverges_within(c, 500, 2.5);
        assert_eq!(diverges_within(c, 500, 2.5), first);
    }

    #[test]
    fn cardioid_shortcut_never_claims_an_escaping_point() {
        let mut rng = StdRng::seed_from_u64(0x00c0_ffee);
        let mut inside = 0;
        for _ in 0..20_000 {
            let c = Complex::new(rng.gen_range(-0.8, 0.3), rng.gen_range(-0.7, 0.7));
            if in_main_cardioid(c) {
                inside += 1;
                assert_eq!(escape_time(c, 1000, 2.0), Escape::Bounded, "{:?}", c);
            }
        }
        assert!(inside > 1000);
    }

    #[test]
    fn negative_powers_of_zero_diverge() {
        match escape_time(Complex::new(0.1, 0.0), 10, -2.0) {
            Escape::Diverged(n) => assert!(n <= 1),
            Escape::Bounded => panic!("zero to a negative power should blow up"),
        }
    }
}

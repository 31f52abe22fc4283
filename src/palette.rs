// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps escape times to colours.  Each of the red, green and blue
//! channels follows a squared cosine of the escape time, the three
//! waves a third of a turn apart, so the hue rotates as points get
//! closer to the set.

use image::Rgba;
use std::f64::consts::PI;

use crate::escape::Escape;

/// A third of a turn, the default phase between colour channels.
pub const ONE_THIRD: f64 = 2.0 * PI / 3.0;

/// The colour of points that never escaped.
pub const INTERIOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

// At a frequency of 1.0 the colours repeat every this many iterations.
const HUE_PERIOD: f64 = 18.0;

/// The parameters of the colour function.  Built once from the
/// configuration and read by the collector while it paints.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PaletteConfig {
    /// Phase between successive colour channels, in radians.
    pub phase_increment: f64,
    /// How fast the hue varies with escape time.
    pub color_freq: f64,
    /// Absolute hue offset in turns; 1.0 is the same as 0.0.
    pub hue_offset: f64,
    /// Per-iteration alpha multiplier in `[0, 1]`; 1.0 means no fade.
    pub alpha_decay: f64,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        PaletteConfig {
            phase_increment: ONE_THIRD,
            color_freq: 1.0,
            hue_offset: 0.0,
            alpha_decay: 1.0,
        }
    }
}

impl PaletteConfig {
    /// The colour for an escape time.  Bounded points are always
    /// `INTERIOR`, whatever the configuration.
    pub fn color(&self, escape: Escape) -> Rgba<u8> {
        let n = match escape {
            Escape::Bounded => return INTERIOR,
            Escape::Diverged(n) => n as f64,
        };

        let angular_speed = self.color_freq * 2.0 * PI / HUE_PERIOD;
        let base = self.hue_offset * 2.0 * PI;
        let phases = [
            base,
            base + self.phase_increment,
            base + 2.0 * self.phase_increment,
        ];
        let t = angular_speed * n;
        let channel = |phase: f64| (40.0 + 215.0 * (t + phase).cos().powi(2)) as u8;

        Rgba([
            channel(phases[0]),
            channel(phases[1]),
            channel(phases[2]),
            (255.0 * self.alpha_decay.powf(n)) as u8,
        ])
    }
}

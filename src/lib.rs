#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which the sequence `z -> z^2 + c`, started at zero, never runs
//! off to infinity.  Once `|z|` passes 2 it never comes back, so the
//! step on which that happens (the "escape time") measures how far
//! from the set a point lies, and that is the number used to colour
//! it.  Points that never escape within the iteration cap are drawn
//! black.  Raising `z` to powers other than 2 gives the Multibrot
//! family.
//!
//! A render maps each pixel of the image to the center of its cell on
//! the complex plane (`view`), cuts the image into horizontal bands
//! and hands each band to a worker thread (`workers`) that computes
//! escape times (`escape`), then collects every worker's results into
//! an RGBA buffer (`collector`), colouring them as they arrive
//! (`palette`).

extern crate crossbeam;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

use image::RgbaImage;
use log::{debug, info};

pub mod collector;
pub mod config;
pub mod errors;
pub mod escape;
pub mod palette;
pub mod view;
pub mod workers;

pub use crate::collector::{Collector, Progress};
pub use crate::config::Config;
pub use crate::errors::{ConfigError, RenderError};
pub use crate::escape::{diverges_within, Escape};
pub use crate::palette::{PaletteConfig, INTERIOR};
pub use crate::view::{Pixel, View};
pub use crate::workers::PixelResult;

use crate::workers::{partition, start_work};

/// Render the image described by `config`.
pub fn render(config: &Config) -> Result<RgbaImage, RenderError> {
    render_with_progress(config, |p| debug!("{:05.2}%", p.percent()))
}

/// Render the image described by `config`, calling `progress` each
/// time another row's worth of pixels is done.  Every worker has been
/// joined by the time this returns.
pub fn render_with_progress<P>(config: &Config, progress: P) -> Result<RgbaImage, RenderError>
where
    P: FnMut(Progress),
{
    let view = config.view()?;
    let palette = config.palette();
    let bands = partition(view.height(), config.worker_count());
    info!(
        "rendering {}x{} at {} iterations with {} workers",
        view.width(),
        view.height(),
        config.max_iter,
        bands.len()
    );

    let mut image = RgbaImage::from_pixel(view.width() as u32, view.height() as u32, INTERIOR);
    let written = crossbeam::scope(|scope| {
        let receivers = start_work(scope, &view, &bands, config.max_iter, config.exponent);
        Collector::new(receivers, &view).paint(&mut image, &palette, progress)
    })
    .map_err(|_| RenderError::WorkerPanicked)?;

    info!("Done generating ({} pixels)", written);
    Ok(image)
}

/// Compute the escape time of every pixel described by `config`,
/// without colouring them.  Results from different bands are
/// interleaved in no particular order.
pub fn escape_times(config: &Config) -> Result<Vec<PixelResult>, RenderError> {
    let view = config.view()?;
    let bands = partition(view.height(), config.worker_count());
    let mut results = Vec::with_capacity(view.len());
    crossbeam::scope(|scope| {
        let receivers = start_work(scope, &view, &bands, config.max_iter, config.exponent);
        Collector::new(receivers, &view).drain(|r| results.push(r), |_| ())
    })
    .map_err(|_| RenderError::WorkerPanicked)?;
    Ok(results)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker pool.  The image is cut into horizontal bands, one per
//! worker, and each worker walks its band in row-major order, testing
//! every sample for escape and sending the result down its own
//! channel.  Bands are fixed when the pool starts; there is no work
//! stealing.  A worker's channel closes when its band is exhausted.

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::thread::Scope;
use log::debug;
use num::Complex;

use crate::escape::{diverges_within, Escape};
use crate::view::{Pixel, View};

/// Capacity of each worker's result queue.  The collector drains
/// continuously, so this only needs to absorb scheduling jitter.
pub const RESULT_CAPACITY: usize = 128;

/// The escape time of one pixel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelResult {
    /// Where the result goes in the image.
    pub pixel: Pixel,
    /// How quickly the pixel's sample escaped, if at all.
    pub escape: Escape,
}

/// The rows `[start, stop)` owned by a single worker.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Band {
    /// First row of the band.
    pub start: usize,
    /// One past the last row of the band.
    pub stop: usize,
}

/// Split `rows` rows into equal-height bands, one per worker.  The
/// last band absorbs any remainder.  There are never more bands than
/// rows, and never fewer than one.
pub fn partition(rows: usize, workers: usize) -> Vec<Band> {
    let workers = workers.max(1).min(rows.max(1));
    let step = rows / workers;
    (0..workers)
        .map(|i| Band {
            start: i * step,
            stop: if i + 1 == workers { rows } else { (i + 1) * step },
        })
        .collect()
}

/// Consume a matched pair of sample and pixel sequences in lockstep,
/// sending one result per pair.  Returns the number of results sent.
/// Stops early if the receiving end has gone away.
pub fn run_worker<S, P>(
    samples: S,
    pixels: P,
    limit: usize,
    exponent: f64,
    results: &Sender<PixelResult>,
) -> usize
where
    S: Iterator<Item = Complex<f64>>,
    P: Iterator<Item = Pixel>,
{
    let mut sent = 0;
    for (sample, pixel) in samples.zip(pixels) {
        let escape = diverges_within(sample, limit, exponent);
        if results.send(PixelResult { pixel, escape }).is_err() {
            break;
        }
        sent += 1;
    }
    sent
}

/// Spawn one worker per band inside `scope`, and return the receiving
/// ends of their result queues in band order.  The workers are joined
/// when the scope ends.
pub fn start_work<'env>(
    scope: &Scope<'env>,
    view: &'env View,
    bands: &[Band],
    limit: usize,
    exponent: f64,
) -> Vec<Receiver<PixelResult>> {
    bands
        .iter()
        .enumerate()
        .map(|(id, band)| {
            let (tx, rx) = channel::bounded(RESULT_CAPACITY);
            let rows = view.rows(band.start, band.stop);
            scope.spawn(move |_| {
                let (samples, pixels) = rows.sample_points();
                let sent = run_worker(samples, pixels, limit, exponent, &tx);
                debug!(
                    "worker {} finished rows {}..{} ({} pixels)",
                    id,
                    rows.start(),
                    rows.stop(),
                    sent
                );
            });
            rx
        })
        .collect()
}

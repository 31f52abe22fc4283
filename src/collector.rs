// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fan-in half of the renderer.  The collector waits on every
//! worker queue at once, hands each result to a sink as it arrives,
//! and forgets a queue once it has been closed and drained.  Results
//! from different workers arrive in no particular order, but since
//! the workers' bands don't overlap every pixel arrives exactly once.

use crossbeam::channel::{Receiver, Select};
use image::RgbaImage;

use crate::palette::PaletteConfig;
use crate::view::{Pixel, View};
use crate::workers::PixelResult;

/// How far a render has got.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Pixels received so far.
    pub written: usize,
    /// Pixels in the image.
    pub total: usize,
}

impl Progress {
    /// Completion as a percentage.
    pub fn percent(&self) -> f64 {
        100.0 * (self.written as f64) / (self.total as f64)
    }

    /// True once every pixel has been received.
    pub fn is_complete(&self) -> bool {
        self.written == self.total
    }
}

/// Drains a set of worker queues.
pub struct Collector {
    receivers: Vec<Receiver<PixelResult>>,
    row_width: usize,
    total: usize,
}

impl Collector {
    /// Takes the result queues of the workers rendering `view`.
    pub fn new(receivers: Vec<Receiver<PixelResult>>, view: &View) -> Self {
        Collector {
            receivers,
            row_width: view.width(),
            total: view.len(),
        }
    }

    /// Pass every result from every queue to `sink`, until all of the
    /// queues are closed.  `progress` is called each time another
    /// row's worth of pixels has arrived.  Returns the number of
    /// results received.
    pub fn drain<F, P>(self, mut sink: F, mut progress: P) -> usize
    where
        F: FnMut(PixelResult),
        P: FnMut(Progress),
    {
        let mut select = Select::new();
        for rx in &self.receivers {
            select.recv(rx);
        }

        let mut open = self.receivers.len();
        let mut written = 0;
        while open > 0 {
            let oper = select.select();
            let index = oper.index();
            match oper.recv(&self.receivers[index]) {
                Ok(result) => {
                    sink(result);
                    written += 1;
                    if self.row_width > 0 && written % self.row_width == 0 {
                        progress(Progress {
                            written,
                            total: self.total,
                        });
                    }
                }
                Err(_) => {
                    select.remove(index);
                    open -= 1;
                }
            }
        }
        written
    }

    /// Drain the queues into `image`, colouring each pixel with
    /// `palette`.
    pub fn paint<P>(self, image: &mut RgbaImage, palette: &PaletteConfig, progress: P) -> usize
    where
        P: FnMut(Progress),
    {
        self.drain(
            |result| {
                let Pixel(x, y) = result.pixel;
                image.put_pixel(x as u32, y as u32, palette.color(result.escape));
            },
            progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escape::Escape;
    use crate::palette::INTERIOR;
    use crossbeam::channel;
    use num::Complex;
    use std::collections::HashSet;

    fn feed(view: &View, bands: &[(usize, usize)]) -> Vec<Receiver<PixelResult>> {
        bands
            .iter()
            .map(|&(start, stop)| {
                let (tx, rx) = channel::bounded(4);
                let pixels: Vec<Pixel> = view.rows(start, stop).pixels().collect();
                std::thread::spawn(move || {
                    for pixel in pixels {
                        let escape = Escape::Diverged(pixel.0 + pixel.1);
                        tx.send(PixelResult { pixel, escape }).unwrap();
                    }
                });
                rx
            })
            .collect()
    }

    #[test]
    fn drains_every_queue() {
        let view = View::new(6, 9, 2.0, Complex::new(0.0, 0.0)).unwrap();
        let receivers = feed(&view, &[(0, 3), (3, 6), (6, 9)]);
        let mut seen = HashSet::new();
        let count = Collector::new(receivers, &view).drain(
            |r| {
                assert!(seen.insert(r.pixel), "{:?} arrived twice", r.pixel);
            },
            |_| (),
        );
        assert_eq!(count, view.len());
        assert_eq!(seen.len(), view.len());
    }

    #[test]
    fn reports_progress_once_per_row() {
        let view = View::new(5, 4, 2.0, Complex::new(0.0, 0.0)).unwrap();
        let receivers = feed(&view, &[(0, 1), (1, 4)]);
        let mut reports = Vec::new();
        Collector::new(receivers, &view).drain(|_| (), |p| reports.push(p));
        assert_eq!(reports.len(), 4);
        assert!(reports.windows(2).all(|w| w[0].written < w[1].written));
        let last = reports[3];
        assert!(last.is_complete());
        assert!((last.percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_and_closed_queues_finish() {
        let view = View::new(2, 2, 2.0, Complex::new(0.0, 0.0)).unwrap();
        let (tx, rx) = channel::bounded::<PixelResult>(1);
        drop(tx);
        let count = Collector::new(vec![rx], &view).drain(|_| (), |_| ());
        assert_eq!(count, 0);
    }

    #[test]
    fn paints_through_palette() {
        let view = View::new(2, 1, 2.0, Complex::new(0.0, 0.0)).unwrap();
        let (tx, rx) = channel::bounded(2);
        tx.send(PixelResult {
            pixel: Pixel(0, 0),
            escape: Escape::Bounded,
        })
        .unwrap();
        tx.send(PixelResult {
            pixel: Pixel(1, 0),
            escape: Escape::Diverged(0),
        })
        .unwrap();
        drop(tx);

        let palette = PaletteConfig::default();
        let mut image = RgbaImage::from_pixel(2, 1, image::Rgba([9, 9, 9, 9]));
        let count = Collector::new(vec![rx], &view).paint(&mut image, &palette, |_| ());
        assert_eq!(count, 2);
        assert_eq!(*image.get_pixel(0, 0), INTERIOR);
        assert_eq!(*image.get_pixel(1, 0), palette.color(Escape::Diverged(0)));
    }
}

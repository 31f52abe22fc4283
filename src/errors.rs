// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types for the renderer and its configuration documents.

use failure::Fail;
use std::io;

/// Everything that can stop a render before the first pixel is
/// computed, plus the one thing that can go wrong while it runs.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// The pixel grid has a zero-length side.
    #[fail(
        display = "invalid resolution {}x{}: both dimensions must be positive",
        _0, _1
    )]
    InvalidResolution(usize, usize),

    /// The height of the imaged region of the complex plane is zero,
    /// negative, or not a number.
    #[fail(
        display = "invalid region height {}: must be positive and finite",
        _0
    )]
    InvalidRegion(f64),

    /// A worker thread panicked; the image cannot be trusted.
    #[fail(display = "a render worker panicked")]
    WorkerPanicked,
}

/// Failures reading or writing a saved configuration.
#[derive(Debug, Fail)]
pub enum ConfigError {
    /// The configuration file could not be opened, read, or written.
    #[fail(display = "could not access configuration file: {}", _0)]
    Io(#[cause] io::Error),

    /// The document is not a valid configuration.
    #[fail(display = "malformed configuration document: {}", _0)]
    Json(#[cause] serde_json::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

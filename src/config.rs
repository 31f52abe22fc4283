// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render configuration, and its JSON form.  Keys are PascalCase
//! (`MaxIter`, `PixelWidth`, ...).  A document read on its own takes
//! the default for any key it lacks; a document laid over an existing
//! configuration leaves the keys it lacks untouched.

use num::Complex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::{ConfigError, RenderError};
use crate::palette::{PaletteConfig, ONE_THIRD};
use crate::view::View;

/// Everything needed to render an image.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    /// Iteration cap per pixel.
    pub max_iter: usize,
    /// Pixels per row.
    pub pixel_width: u32,
    /// Rows of pixels.
    pub pixel_height: u32,
    /// The `e` in `z -> z^e + c`.
    pub exponent: f64,
    /// Real part of the point at the center of the image.
    pub center_real: f64,
    /// Imaginary part of the point at the center of the image.
    pub center_imag: f64,
    /// Height of the imaged region of the complex plane.
    pub height: f64,
    /// How fast the hue varies with escape time.
    pub color_freq: f64,
    /// Absolute hue offset, in turns.
    pub hue_offset: f64,
    /// Per-iteration alpha multiplier; 1.0 is no decay.
    pub alpha_decay: f64,
    /// Number of worker threads; 0 means one per logical CPU.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iter: 64,
            pixel_width: 1920,
            pixel_height: 1080,
            exponent: 2.0,
            center_real: -1.0,
            center_imag: 0.0,
            height: 2.0,
            color_freq: 1.0,
            hue_offset: 0.0,
            alpha_decay: 1.0,
            workers: 8,
        }
    }
}

impl Config {
    /// Read a configuration document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Config, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a configuration document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        Config::from_reader(BufReader::new(file))
    }

    /// Lay a configuration document over this configuration.  Keys
    /// present in the document replace the current values; keys it
    /// lacks keep them.  On error the configuration is unchanged.
    pub fn update_from_reader<R: Read>(&mut self, reader: R) -> Result<(), ConfigError> {
        let overrides: Map<String, Value> = serde_json::from_reader(reader)?;
        let mut merged = serde_json::to_value(&*self)?;
        if let Value::Object(ref mut fields) = merged {
            fields.extend(overrides);
        }
        *self = serde_json::from_value(merged)?;
        Ok(())
    }

    /// Lay the configuration document in a file over this one.
    pub fn update_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let file = File::open(path)?;
        self.update_from_reader(BufReader::new(file))
    }

    /// The configuration as an indented JSON document.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the configuration to a file, replacing whatever was
    /// there.  Returns the number of bytes written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<usize, ConfigError> {
        let json = self.to_json()?;
        fs::write(path, &json)?;
        Ok(json.len())
    }

    /// The point at the center of the image.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(self.center_real, self.center_imag)
    }

    /// The pixel-to-plane mapping this configuration describes.
    pub fn view(&self) -> Result<View, RenderError> {
        View::new(
            self.pixel_width as usize,
            self.pixel_height as usize,
            self.height,
            self.center(),
        )
    }

    /// The colour parameters.
    pub fn palette(&self) -> PaletteConfig {
        PaletteConfig {
            phase_increment: ONE_THIRD,
            color_freq: self.color_freq,
            hue_offset: self.hue_offset,
            alpha_decay: self.alpha_decay,
        }
    }

    /// The number of workers to start.
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn keys_are_pascal_case() {
        let json = Config::default().to_json().unwrap();
        for key in &[
            "\"MaxIter\": 64",
            "\"PixelWidth\": 1920",
            "\"PixelHeight\": 1080",
            "\"CenterReal\": -1.0",
            "\"AlphaDecay\": 1.0",
            "\"Workers\": 8",
        ] {
            assert!(json.contains(key), "{} not in {}", key, json);
        }
    }

    #[test]
    fn missing_keys_take_defaults() {
        let doc = r#"{ "MaxIter": 500, "CenterImag": 0.25 }"#;
        let config = Config::from_reader(doc.as_bytes()).unwrap();
        assert_eq!(config.max_iter, 500);
        assert_eq!(config.center(), Complex::new(-1.0, 0.25));
        assert_eq!(config.pixel_width, 1920);
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn reads_documents_without_a_worker_count() {
        let doc = r#"{
  "MaxIter": 64,
  "PixelWidth": 800,
  "PixelHeight": 600,
  "Exponent": 3,
  "CenterReal": -0.5,
  "CenterImag": 0,
  "Height": 2.5,
  "ColorFreq": 1,
  "HueOffset": 0.5,
  "AlphaDecay": 0.9
}"#;
        let config = Config::from_reader(doc.as_bytes()).unwrap();
        assert_eq!(config.exponent, 3.0);
        assert_eq!(config.pixel_height, 600);
        assert_eq!(config.hue_offset, 0.5);
        assert_eq!(config.workers, 8);
    }

    #[test]
    fn overlay_keeps_keys_the_document_lacks() {
        let mut config = Config {
            pixel_width: 7,
            workers: 3,
            center_real: -0.5,
            ..Config::default()
        };
        let doc = r#"{ "MaxIter": 16, "PixelHeight": 5 }"#;
        config.update_from_reader(doc.as_bytes()).unwrap();
        assert_eq!(config.max_iter, 16);
        assert_eq!(config.pixel_height, 5);
        assert_eq!(config.pixel_width, 7);
        assert_eq!(config.workers, 3);
        assert_eq!(config.center_real, -0.5);
    }

    #[test]
    fn overlay_ignores_unknown_keys() {
        let mut config = Config::default();
        let doc = r#"{ "Exponent": 3, "Display": 600 }"#;
        config.update_from_reader(doc.as_bytes()).unwrap();
        assert_eq!(config.exponent, 3.0);
        assert_eq!(config.pixel_width, 1920);
    }

    #[test]
    fn failed_overlay_leaves_config_alone() {
        let mut config = Config {
            max_iter: 99,
            ..Config::default()
        };
        let before = config.clone();
        for doc in &[r#"{ "MaxIter": "lots" }"#, "[1, 2]", "{ not json"] {
            assert!(config.update_from_reader(doc.as_bytes()).is_err(), "{}", doc);
            assert_eq!(config, before);
        }
    }

    #[test]
    fn malformed_documents_fail() {
        match Config::from_reader("{ \"MaxIter\": \"lots\" }".as_bytes()) {
            Err(ConfigError::Json(_)) => (),
            other => panic!("expected a JSON error, got {:?}", other),
        }
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("view.json");
        let config = Config {
            max_iter: 256,
            center_real: -0.75,
            center_imag: 0.125,
            height: 0.0078125,
            alpha_decay: 0.5,
            ..Config::default()
        };
        let written = config.save(&path).unwrap();
        assert_eq!(written, fs::metadata(&path).unwrap().len() as usize);
        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        match Config::load(dir.path().join("absent.json")) {
            Err(ConfigError::Io(_)) => (),
            other => panic!("expected an IO error, got {:?}", other),
        }
    }

    #[test]
    fn zero_workers_means_one_per_cpu() {
        let config = Config {
            workers: 0,
            ..Config::default()
        };
        assert_eq!(config.worker_count(), num_cpus::get());
        assert_eq!(Config::default().worker_count(), 8);
    }

    #[test]
    fn invalid_geometry_is_refused() {
        let config = Config {
            pixel_width: 0,
            ..Config::default()
        };
        assert!(config.view().is_err());
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate image;
extern crate mandelbrot;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use failure::{format_err, Error, ResultExt};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use log::info;
use mandelbrot::Config;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;
use std::str::FromStr;

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const ITER: &str = "iter";
const PIXEL_WIDTH: &str = "pixel-width";
const PIXEL_HEIGHT: &str = "pixel-height";
const EXPONENT: &str = "exp";
const CENTER_REAL: &str = "center-real";
const CENTER_IMAG: &str = "center-imag";
const HEIGHT: &str = "height";
const FREQ: &str = "freq";
const HUE: &str = "hue";
const ALPHA_DECAY: &str = "alpha-decay";
const WORKERS: &str = "workers";
const STDOUT: &str = "stdout";
const PATH: &str = "path";
const OUTPUT: &str = "output";

const DEFAULT_OUTPUT: &str = "./mandelbrot.png";

fn float_arg<'a>(name: &'a str, default: &'a str, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name(name)
        .long(name)
        .takes_value(true)
        .default_value(default)
        .validator(|s| validate_number::<f64>(&s, "Could not parse number"))
        .help(help)
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelbrot")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Escape-time Mandelbrot renderer")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name(ITER)
                .long(ITER)
                .takes_value(true)
                .default_value("64")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 10000000",
                    )
                })
                .help("The most iterations of z -> z^e + c to apply to any one pixel"),
        )
        .arg(
            Arg::with_name(PIXEL_WIDTH)
                .long(PIXEL_WIDTH)
                .takes_value(true)
                .default_value("1920")
                .validator(|s| {
                    validate_range::<u32>(
                        &s,
                        1,
                        1 << 16,
                        "Could not parse pixel width",
                        "Pixel width must be between 1 and 65536",
                    )
                })
                .help("The number of pixels per row"),
        )
        .arg(
            Arg::with_name(PIXEL_HEIGHT)
                .long(PIXEL_HEIGHT)
                .takes_value(true)
                .default_value("1080")
                .validator(|s| {
                    validate_range::<u32>(
                        &s,
                        1,
                        1 << 16,
                        "Could not parse pixel height",
                        "Pixel height must be between 1 and 65536",
                    )
                })
                .help("The number of rows of pixels"),
        )
        .arg(float_arg(
            EXPONENT,
            "2",
            "The Mandelbrot set has exponent 2 (z -> z^2 + c), but others work too",
        ))
        .arg(
            float_arg(
                CENTER_REAL,
                "-1.0",
                "The real part of the point at the center of the image",
            )
            .short("r"),
        )
        .arg(
            float_arg(
                CENTER_IMAG,
                "0.0",
                "The imaginary part of the point at the center of the image",
            )
            .short("i"),
        )
        .arg(float_arg(
            HEIGHT,
            "2.0",
            "The height of the imaged region of the complex plane (not the resolution)",
        ))
        .arg(
            float_arg(
                FREQ,
                "1.0",
                "How fast the hue varies; smaller values give more uniform colour",
            )
            .short("f"),
        )
        .arg(float_arg(
            HUE,
            "0.0",
            "The absolute hue offset; periodic, so 1 is the same as 0",
        ))
        .arg(float_arg(
            ALPHA_DECAY,
            "1.0",
            "Between 0 and 1; the nth colour has (decay)^n alpha. 1 is no decay",
        ))
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value("8")
                .validator(|s| {
                    validate_range::<usize>(
                        &s,
                        0,
                        1024,
                        "Could not parse worker count",
                        "Worker count must be between 0 and 1024",
                    )
                })
                .help("Number of worker threads; 0 is one per CPU"),
        )
        .arg(
            Arg::with_name(STDOUT)
                .long(STDOUT)
                .help("Write the image to stdout instead of a file"),
        )
        .subcommand(
            SubCommand::with_name("dump")
                .about("Write the options to a JSON file instead of rendering")
                .arg(Arg::with_name(PATH).required(true).index(1)),
        )
        .subcommand(
            SubCommand::with_name("load")
                .about("Render from options saved in a JSON file")
                .arg(Arg::with_name(PATH).required(true).index(1))
                .arg(
                    Arg::with_name(OUTPUT)
                        .index(2)
                        .help("Where to save the image"),
                ),
        )
        .subcommand(
            SubCommand::with_name("to")
                .about("Save the image to the given path")
                .arg(Arg::with_name(PATH).required(true).index(1)),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("Missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("Could not parse --{} value {:?}", name, raw))
}

fn config_from_args(matches: &ArgMatches) -> Result<Config, Error> {
    Ok(Config {
        max_iter: value(matches, ITER)?,
        pixel_width: value(matches, PIXEL_WIDTH)?,
        pixel_height: value(matches, PIXEL_HEIGHT)?,
        exponent: value(matches, EXPONENT)?,
        center_real: value(matches, CENTER_REAL)?,
        center_imag: value(matches, CENTER_IMAG)?,
        height: value(matches, HEIGHT)?,
        color_freq: value(matches, FREQ)?,
        hue_offset: value(matches, HUE)?,
        alpha_decay: value(matches, ALPHA_DECAY)?,
        workers: value(matches, WORKERS)?,
    })
}

fn write_png<W: Write>(image: &RgbaImage, mut out: W) -> Result<(), Error> {
    PngEncoder::new(&mut out).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    out.flush()?;
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = args();
    let mut config = config_from_args(&matches)?;
    let mut output = DEFAULT_OUTPUT.to_string();

    match matches.subcommand() {
        ("dump", Some(sub)) => {
            let path = value::<String>(sub, PATH)?;
            info!("Dumping to {}", path);
            let written = config
                .save(&path)
                .with_context(|_| format!("Could not dump options to {}", path))?;
            println!("{} bytes", written);
            return Ok(());
        }
        ("load", Some(sub)) => {
            let path = value::<String>(sub, PATH)?;
            info!("Loading {}", path);
            config
                .update_from_file(&path)
                .with_context(|_| format!("Could not load {}", path))?;
            if let Some(out) = sub.value_of(OUTPUT) {
                output = out.to_string();
            }
        }
        ("to", Some(sub)) => {
            output = value(sub, PATH)?;
        }
        _ => {}
    }

    if matches.is_present(STDOUT) {
        let image = mandelbrot::render(&config)?;
        let stdout = io::stdout();
        let lock = stdout.lock();
        write_png(&image, BufWriter::new(lock))?;
        return Ok(());
    }

    let image = mandelbrot::render_with_progress(&config, |p| {
        eprint!("{:05.2}%\r", p.percent());
    })?;
    eprintln!();

    let file = File::create(&output).with_context(|_| format!("Could not create {}", output))?;
    write_png(&image, BufWriter::new(file))?;
    info!("Wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

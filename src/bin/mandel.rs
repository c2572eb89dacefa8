extern crate clap;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use mandelbrot::session::SessionComputation;
use mandelbrot::worker::ColumnResult;
use mandelbrot::{
    export_png, CancelFlag, ExportOutcome, GridSize, Palette, PlaneWindow, RenderConfig,
    RenderSink, SessionSummary,
};

/// Given a string and a separator, returns the two values separated by
/// the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_size(s: String) -> Result<(), String> {
    match parse_pair::<usize>(&s, 'x') {
        Some((w, h)) if w > 0 && h > 0 => Ok(()),
        Some(_) => Err("Image size axes must both be at least 1".to_string()),
        None => Err("Could not parse the output image size".to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
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

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ORIGIN: &str = "origin";
const EXTENT: &str = "extent";
const WORKERS: &str = "workers";
const ITERATIONS: &str = "iterations";

fn args<'a>() -> ArgMatches<'a> {
    let max_workers = 4 * num_cpus::get();

    App::new("mandel")
        .version("0.1.0")
        .about("Parallel Mandelbrot field renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("640x480")
                .validator(validate_size)
                .help("Size of the output image, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(ORIGIN)
                .required(false)
                .long(ORIGIN)
                .short("g")
                .takes_value(true)
                .default_value("-2.0,-1.2")
                .validator(|s| {
                    validate_pair::<f64>(&s, ',', "Could not parse the window origin")
                })
                .help("Minimum real and imaginary components of the plane window"),
        )
        .arg(
            Arg::with_name(EXTENT)
                .required(false)
                .long(EXTENT)
                .short("e")
                .takes_value(true)
                .default_value("3.2,2.4")
                .validator(|s| {
                    validate_pair::<f64>(&s, ',', "Could not parse the window extent")
                })
                .help("Extent of the plane window along each axis"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .required(false)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value("4")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_workers,
                        "Could not parse the worker count",
                        &format!("Worker count must be between 1 and {}", max_workers),
                    )
                })
                .help("Number of workers (rounded down to a perfect square)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse the iteration depth",
                        "Iteration depth must be between 1 and 1000000",
                    )
                })
                .help("Iteration bound per pixel"),
        )
        .get_matches()
}

/// The presentation layer of this binary: progress on stderr, one line
/// when the field is done.
struct ConsoleSink;

impl RenderSink for ConsoleSink {
    fn on_column(&self, _column: &ColumnResult) {}

    fn on_progress(&self, percent: u32) {
        eprint!("\rcomputing: {:3}%", percent);
    }

    fn on_complete(&self, summary: &SessionSummary) {
        if summary.is_complete() {
            eprintln!("\rfinished in {:.3} seconds", summary.elapsed.as_secs_f64());
        } else {
            eprintln!(
                "\rstopped after {:.3} seconds with {} of {} workers cancelled",
                summary.elapsed.as_secs_f64(),
                summary.cancelled_workers,
                summary.cancelled_workers + summary.completed_workers
            );
        }
    }
}

fn main() {
    let matches = args();

    let (width, height) = parse_pair(matches.value_of(SIZE).unwrap(), 'x')
        .expect("Error parsing the output image size");
    let (x_min, y_min) = parse_pair(matches.value_of(ORIGIN).unwrap(), ',')
        .expect("Error parsing the window origin");
    let (plane_width, plane_height) = parse_pair(matches.value_of(EXTENT).unwrap(), ',')
        .expect("Error parsing the window extent");
    let workers = usize::from_str(matches.value_of(WORKERS).unwrap())
        .expect("Error parsing the worker count");
    let max_iterations = u32::from_str(matches.value_of(ITERATIONS).unwrap())
        .expect("Error parsing the iteration depth");
    let output = matches.value_of(OUTPUT).unwrap();

    let config = RenderConfig {
        window: PlaneWindow {
            x_min,
            y_min,
            width: plane_width,
            height: plane_height,
        },
        grid: GridSize { width, height },
        max_iterations,
        workers,
    };

    eprintln!(
        "rendering {}x{} at depth {} with {} workers",
        width,
        height,
        max_iterations,
        config.effective_workers()
    );

    let session = match SessionComputation::start(config, Arc::new(ConsoleSink)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let outcome = session.wait();

    match export_png(
        &outcome.buffer,
        &Palette::nice(),
        Path::new(output),
        &CancelFlag::new(),
    ) {
        Ok(ExportOutcome::Written) => {
            eprintln!("wrote {}", output);
        }
        Ok(ExportOutcome::Cancelled) => {
            eprintln!("export cancelled; {} was not written", output);
        }
        Err(e) => {
            eprintln!("export failure: {}", e);
            std::process::exit(1);
        }
    }
}

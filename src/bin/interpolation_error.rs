use std::fs;
use std::path::Path;

use clap::Parser;
use nalgebra::Vector3;
use plotters::prelude::*;

use rust_attitudes::astro::{Epoch, Frame, OrbitState, TimeInterpolable, TimeShiftable};
use rust_attitudes::consts::{get_circular_velocity, EARTH_MU};
use rust_attitudes::propagation::MAX_INTERPOLATION_SAMPLES;

/// Plots the worst position error of Hermite interpolation over an orbit arc,
/// against the number of evenly spaced samples used.
#[derive(Debug, Parser)]
struct Args {
    /// Where to write the plot
    #[arg(long, env = "INTERPOLATION_PLOT", default_value = "plots/interpolation-error.png")]
    output: String,

    /// Length of the interpolated arc, as a fraction of the orbital period
    #[arg(long, default_value_t = 0.5)]
    arc: f64,

    /// Largest sample count to try
    #[arg(long, default_value_t = 40)]
    max_samples: usize,
}

pub fn main() {
    let args = Args::parse();

    let radius = 7.0e6;
    let orbit = OrbitState::new(
        Vector3::new(radius, 0.0, 0.0),
        Vector3::new(0.0, get_circular_velocity(radius, EARTH_MU), 0.3 * 7.5e3),
        Epoch::ORIGIN,
        Frame::inertial("EME2000"),
        EARTH_MU,
    )
    .unwrap();
    let span = args.arc * orbit.keplerian_period().unwrap();

    let errors: Vec<(usize, f64)> = (2..=args.max_samples)
        .filter_map(|n| worst_error(&orbit, span, n).map(|e| (n, e)))
        .collect();
    for (n, error) in &errors {
        println!("{:>3} samples: {:e} m", n, error);
    }

    if let Some(dir) = Path::new(&args.output).parent() {
        fs::create_dir_all(dir).unwrap();
    }
    draw_plot(&args.output, &errors, args.max_samples).unwrap();
}

/// Largest position error over the arc, or `None` if interpolation failed.
fn worst_error(orbit: &OrbitState, span: f64, n: usize) -> Option<f64> {
    let sample: Vec<OrbitState> = (0..n)
        .map(|k| orbit.shifted_by(span * k as f64 / (n - 1) as f64))
        .collect::<Result<_, _>>()
        .ok()?;

    let checks = 200;
    let mut worst = 0.0_f64;
    for k in 0..=checks {
        let dt = span * k as f64 / checks as f64;
        let expected = orbit.shifted_by(dt).ok()?;
        let actual = OrbitState::interpolate(Epoch::ORIGIN.shifted_by(dt), &sample).ok()?;
        worst = worst.max((actual.position() - expected.position()).norm());
    }
    Some(worst)
}

fn draw_plot(
    name: &str,
    errors: &[(usize, f64)],
    max_samples: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let points: Vec<(f64, f64)> = errors
        .iter()
        .map(|&(n, e)| (n as f64, e.max(1e-12).log10()))
        .collect();
    let low = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let high = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

    let root = BitMapBackend::new(name, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Hermite interpolation error", ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..max_samples as f64, (low - 1.0)..(high + 1.0))?;

    chart
        .configure_mesh()
        .x_desc("samples")
        .y_desc("log10(max position error / m)")
        .draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), &RED))?;

    // Largest sample a SpacecraftState will interpolate
    let limit = MAX_INTERPOLATION_SAMPLES as f64;
    chart.draw_series(LineSeries::new(
        vec![(limit, low - 1.0), (limit, high + 1.0)],
        &BLUE,
    ))?;

    root.present()?;
    Ok(())
}

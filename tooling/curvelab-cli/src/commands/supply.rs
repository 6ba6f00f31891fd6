use clap::{Args, ValueEnum};
use curvelab_core::plot::plot_supply_curve;
use curvelab_core::supply::{SupplyCurve, SupplyPreset, SupplyProfile};
use curvelab_core::CurveLabConfig;
use serde::Serialize;
use std::path::PathBuf;

use super::{print_heading, print_json, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Preset {
    PumpFun,
    PumpEth,
}

impl From<Preset> for SupplyPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::PumpFun => SupplyPreset::PumpFun,
            Preset::PumpEth => SupplyPreset::PumpEth,
        }
    }
}

#[derive(Args, Debug)]
pub struct SupplyArgs {
    /// Built-in launch profile
    #[arg(long, value_enum, conflicts_with = "point")]
    pub preset: Option<Preset>,

    /// Point `x,y` the curve must pass through (exactly three)
    #[arg(long, value_parser = parse_point, num_args = 1, required_unless_present = "preset")]
    pub point: Vec<(f64, f64)>,

    /// Write a chart to the configured plot directory
    #[arg(long)]
    pub plot: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("`{s}`: {e}"));
    Ok((parse(x)?, parse(y)?))
}

/// Profile through three user points: the right-most one bounds the chart and
/// the middle one is marked.
fn custom_profile(points: &[(f64, f64)]) -> anyhow::Result<SupplyProfile> {
    let [p1, p2, p3]: [(f64, f64); 3] = points
        .try_into()
        .map_err(|_| anyhow::anyhow!("exactly three --point values are required, got {}", points.len()))?;
    let curve = SupplyCurve::fit([p1, p2, p3])?;

    let mut sorted = [p1, p2, p3];
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let max_x = sorted[2].0;
    Ok(SupplyProfile {
        name: "custom",
        currency: "ETH",
        curve,
        total_supply: curve.eval(max_x),
        max_x,
        marker: sorted[1],
    })
}

#[derive(Serialize)]
struct SupplyReport {
    #[serde(flatten)]
    profile: SupplyProfile,
    at_zero: f64,
    at_marker: f64,
    at_max_x: f64,
    plot: Option<PathBuf>,
}

pub fn exec(args: SupplyArgs, config: &CurveLabConfig) -> anyhow::Result<()> {
    let profile = match args.preset {
        Some(preset) => SupplyPreset::from(preset).profile()?,
        None => custom_profile(&args.point)?,
    };

    let plot = if args.plot {
        Some(plot_supply_curve(&profile, &config.plot_dir, config.plot_format)?)
    } else {
        None
    };

    let report = SupplyReport {
        at_zero: profile.curve.eval(0.0),
        at_marker: profile.curve.eval(profile.marker.0),
        at_max_x: profile.curve.eval(profile.max_x),
        profile,
        plot,
    };

    if args.format.is_json() {
        return print_json(&report);
    }
    let curve = &report.profile.curve;
    print_heading(&format!("Supply curve ({})", report.profile.name));
    println!("a: {}, b: {}, k: {}", curve.a, curve.b, curve.k);
    println!("y(0) {}: {} tokens", report.profile.currency, report.at_zero);
    println!(
        "y({}) {}: {} tokens",
        report.profile.marker.0, report.profile.currency, report.at_marker
    );
    println!(
        "y({}) {}: {} tokens",
        report.profile.max_x, report.profile.currency, report.at_max_x
    );
    if let Some(path) = &report.plot {
        println!("plot written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("8, 800000000").unwrap(), (8.0, 8e8));
        assert!(parse_point("8").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_custom_profile_requires_three_points() {
        assert!(custom_profile(&[(0.0, 0.0), (1.0, 1.0)]).is_err());
        let profile = custom_profile(&[(40.0, 1e9), (0.0, 0.0), (8.0, 8e8)]).unwrap();
        assert_eq!(profile.max_x, 40.0);
        assert_eq!(profile.marker, (8.0, 8e8));
    }
}

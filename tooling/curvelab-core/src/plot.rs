//! PNG (or SVG) charts for supply curves, token reserves and the graduation
//! price transition.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::reserves::{LaunchTargets, ReservesCurve};
use crate::supply::SupplyProfile;
use crate::transition::{TransitionRow, TransitionTable};
use crate::{CurveError, Result};

const SIZE: (u32, u32) = (1024, 768);
const SAMPLES: usize = 1000;
const FONT_FAMILY: &str = "sans-serif";
const FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotFormat {
    #[default]
    Png,
    Svg,
}

impl PlotFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PlotFormat::Png => "png",
            PlotFormat::Svg => "svg",
        }
    }
}

/// Registers the bundled font once; text layout needs it for both backends.
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let registered =
        REGISTERED.get_or_init(|| register_font(FONT_FAMILY, FontStyle::Normal, FONT).is_ok());
    if *registered {
        Ok(())
    } else {
        Err(CurveError::Plot("bundled font could not be loaded".into()))
    }
}

fn plot_err<E: Display>(err: E) -> CurveError {
    CurveError::Plot(err.to_string())
}

fn output_path(out_dir: &Path, stem: &str, format: PlotFormat) -> Result<PathBuf> {
    ensure_font()?;
    fs::create_dir_all(out_dir)?;
    Ok(out_dir.join(format!("{stem}.{}", format.extension())))
}

fn wei_to_units(value: &BigInt) -> f64 {
    value.to_f64().unwrap_or(f64::NAN) / 1e18
}

/// Range covering `values` with 5% headroom; never empty.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad)..(hi + pad)
}

/// Supply curve with guides at total supply and `max_x`.
pub fn plot_supply_curve(
    profile: &SupplyProfile,
    out_dir: &Path,
    format: PlotFormat,
) -> Result<PathBuf> {
    let path = output_path(out_dir, &format!("{}_bonding_curve", profile.name), format)?;
    let points = profile.curve.sample(profile.max_x, SAMPLES);

    match format {
        PlotFormat::Png => {
            draw_supply(BitMapBackend::new(&path, SIZE).into_drawing_area(), profile, points)?
        }
        PlotFormat::Svg => {
            draw_supply(SVGBackend::new(&path, SIZE).into_drawing_area(), profile, points)?
        }
    }
    tracing::info!(path = %path.display(), "wrote supply curve plot");
    Ok(path)
}

fn draw_supply<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    profile: &SupplyProfile,
    points: Vec<(f64, f64)>,
) -> Result<()> {
    let y_top = profile.total_supply.max(points.iter().map(|p| p.1).fold(0.0, f64::max)) * 1.05;

    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Bonding Curve", (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..profile.max_x * 1.02, 0f64..y_top)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc(format!("x ({} collected)", profile.currency))
        .y_desc("y (tokens minted)")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(plot_err)?;
    let guide = BLACK.mix(0.4);
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, profile.total_supply), (profile.max_x, profile.total_supply)],
            guide,
        ))
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(
            vec![(profile.max_x, 0.0), (profile.max_x, profile.total_supply)],
            guide,
        ))
        .map_err(plot_err)?;
    chart
        .draw_series([
            Circle::new((profile.max_x, profile.total_supply), 5, GREEN.filled()),
            Circle::new(profile.marker, 5, RED.filled()),
        ])
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}

/// Token reserves against ETH reserves on `[0, max_eth]`, with guides at the
/// graduation point.
pub fn plot_token_reserves(
    curve: &ReservesCurve,
    targets: &LaunchTargets,
    max_eth: &BigInt,
    out_dir: &Path,
    stem: &str,
    format: PlotFormat,
) -> Result<PathBuf> {
    if max_eth <= &BigInt::zero() {
        return Err(CurveError::InvalidRange("max_eth must be > 0".into()));
    }
    let path = output_path(out_dir, &format!("{stem}_token_reserves"), format)?;

    let last = SAMPLES - 1;
    let mut points = Vec::with_capacity(SAMPLES);
    for i in 0..SAMPLES {
        let eth = max_eth * BigInt::from(i) / BigInt::from(last);
        let tokens = curve.token_reserves(&eth)?;
        points.push((wei_to_units(&eth), wei_to_units(&tokens)));
    }
    points.retain(|(_, tokens)| *tokens >= 0.0);
    let frame = ReservesFrame {
        x_max: wei_to_units(max_eth),
        supply: wei_to_units(&targets.total_supply),
        grad_eth: wei_to_units(&targets.graduation_eth),
        grad_tokens: wei_to_units(&targets.graduation_tokens),
    };

    match format {
        PlotFormat::Png => {
            draw_reserves(BitMapBackend::new(&path, SIZE).into_drawing_area(), &frame, points)?
        }
        PlotFormat::Svg => {
            draw_reserves(SVGBackend::new(&path, SIZE).into_drawing_area(), &frame, points)?
        }
    }
    tracing::info!(path = %path.display(), "wrote token reserves plot");
    Ok(path)
}

/// Axis bounds and graduation guides, in whole ETH and whole tokens.
struct ReservesFrame {
    x_max: f64,
    supply: f64,
    grad_eth: f64,
    grad_tokens: f64,
}

fn draw_reserves<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    frame: &ReservesFrame,
    points: Vec<(f64, f64)>,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Token reserves", (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..frame.x_max, 0f64..frame.supply * 1.02)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("ETH reserves")
        .y_desc("Token reserves")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(points, &BLUE))
        .map_err(plot_err)?;
    let guide = BLACK.mix(0.4);
    chart
        .draw_series(LineSeries::new(
            vec![(0.0, frame.grad_tokens), (frame.x_max, frame.grad_tokens)],
            guide,
        ))
        .map_err(plot_err)?;
    chart
        .draw_series(LineSeries::new(
            vec![(frame.grad_eth, 0.0), (frame.grad_eth, frame.supply)],
            guide,
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}

/// Bonding-curve and AMM prices over the scanned ETH reserves, with the
/// closest match marked.
pub fn plot_price_comparison(
    table: &TransitionTable,
    out_dir: &Path,
    stem: &str,
    format: PlotFormat,
) -> Result<PathBuf> {
    let best = table.best_row().ok_or(CurveError::NoCandidate)?;
    let path = output_path(out_dir, &format!("{stem}_price_comparison"), format)?;

    match format {
        PlotFormat::Png => {
            draw_prices(BitMapBackend::new(&path, SIZE).into_drawing_area(), table, best)?
        }
        PlotFormat::Svg => {
            draw_prices(SVGBackend::new(&path, SIZE).into_drawing_area(), table, best)?
        }
    }
    tracing::info!(path = %path.display(), "wrote price comparison plot");
    Ok(path)
}

fn draw_prices<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    table: &TransitionTable,
    best: &TransitionRow,
) -> Result<()> {
    let curve_points: Vec<(f64, f64)> = table
        .rows
        .iter()
        .map(|row| (wei_to_units(&row.eth), row.curve_price.to_f64()))
        .collect();
    let amm_points: Vec<(f64, f64)> = table
        .rows
        .iter()
        .map(|row| (wei_to_units(&row.eth), row.amm_price.to_f64()))
        .collect();

    let x_range = padded_range(curve_points.iter().map(|p| p.0));
    let y_range = padded_range(curve_points.iter().chain(&amm_points).map(|p| p.1));

    root.fill(&WHITE).map_err(plot_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Graduation transition", (FONT_FAMILY, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(110)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;
    chart
        .configure_mesh()
        .x_desc("ETH reserves")
        .y_desc("Price (ETH/token)")
        .y_label_formatter(&|v| format!("{v:.3e}"))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(curve_points, &BLUE))
        .map_err(plot_err)?
        .label("Bonding curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(amm_points, &MAGENTA))
        .map_err(plot_err)?
        .label("AMM")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MAGENTA));
    chart
        .draw_series(std::iter::once(Circle::new(
            (wei_to_units(&best.eth), best.curve_price.to_f64()),
            5,
            RED.filled(),
        )))
        .map_err(plot_err)?;
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font((FONT_FAMILY, 15))
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supply::SupplyPreset;
    use crate::transition::{transition_table, EthScan};
    use crate::units::to_wei;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    #[test]
    fn test_padded_range_never_empty() {
        let range = padded_range([2.0, 2.0].into_iter());
        assert!(range.start < range.end);
        assert_eq!(padded_range(std::iter::empty()), 0.0..1.0);
    }

    #[test]
    fn test_supply_plot_creates_missing_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("img");
        let profile = SupplyPreset::PumpFun.profile().unwrap();
        let path = plot_supply_curve(&profile, &out, PlotFormat::default()).unwrap();
        assert_eq!(path, out.join("pump-fun_bonding_curve.png"));
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn test_supply_plot_as_svg() {
        let dir = TempDir::new().unwrap();
        let profile = SupplyPreset::PumpEth.profile().unwrap();
        let path = plot_supply_curve(&profile, dir.path(), PlotFormat::Svg).unwrap();
        assert_eq!(path.extension().unwrap(), "svg");
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Bonding Curve"));
    }

    #[test]
    fn test_plot_format_from_config_value() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: PlotFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"svg\"").unwrap();
        assert_eq!(parsed.format, PlotFormat::Svg);
        assert!(toml::from_str::<Wrapper>("format = \"gif\"").is_err());
        assert_eq!(PlotFormat::default().extension(), "png");
    }

    #[test]
    fn test_reserves_and_price_plots() {
        let dir = TempDir::new().unwrap();
        let targets = LaunchTargets::default();
        let e0 = to_wei(Decimal::new(3, 0));
        let t0 = targets.derived_t0_floor(&e0);
        let curve = ReservesCurve::from_total_supply(&targets.total_supply, t0, e0).unwrap();

        let reserves = plot_token_reserves(
            &curve,
            &targets,
            &to_wei(Decimal::new(15, 0)),
            dir.path(),
            "fit",
            PlotFormat::Png,
        )
        .unwrap();
        assert_eq!(reserves.file_name().unwrap(), "fit_token_reserves.png");
        assert!(reserves.exists());

        let scan = EthScan {
            from: to_wei(Decimal::new(80, 1)),
            to: to_wei(Decimal::new(90, 1)),
            step: to_wei(Decimal::new(1, 1)),
        };
        let table = transition_table(
            &curve,
            &targets.graduation_fee,
            &targets.creator_supply,
            &scan,
        )
        .unwrap();
        let comparison =
            plot_price_comparison(&table, dir.path(), "fit", PlotFormat::Svg).unwrap();
        assert_eq!(comparison.file_name().unwrap(), "fit_price_comparison.svg");
        assert!(comparison.exists());
    }
}

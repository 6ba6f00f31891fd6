//! Hyperbolic supply curves `y = b - k / (a + x)`, where `x` is the quote
//! currency collected and `y` the tokens minted.

use serde::{Deserialize, Serialize};

use crate::{CurveError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplyCurve {
    pub a: f64,
    pub b: f64,
    pub k: f64,
}

impl SupplyCurve {
    pub fn new(a: f64, b: f64, k: f64) -> Self {
        Self { a, b, k }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.b - self.k / (self.a + x)
    }

    /// Curve through three points with pairwise distinct `x`.
    ///
    /// With `r = (y2 - y1) / (y3 - y1)` the offset solves
    /// `r (x3 - x1)(a + x2) = (x2 - x1)(a + x3)`; `k` and `b` follow.
    pub fn fit(points: [(f64, f64); 3]) -> Result<Self> {
        let [(x1, y1), (x2, y2), (x3, y3)] = points;
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(CurveError::DegenerateFit("points must be finite".into()));
        }
        if x1 == x2 || x1 == x3 || x2 == x3 {
            return Err(CurveError::DegenerateFit("x values must be distinct".into()));
        }
        if y3 == y1 {
            return Err(CurveError::DegenerateFit("y3 must differ from y1".into()));
        }

        let r = (y2 - y1) / (y3 - y1);
        let denominator = r * (x3 - x1) - (x2 - x1);
        if denominator == 0.0 {
            return Err(CurveError::DegenerateFit("points are collinear".into()));
        }
        let a = ((x2 - x1) * x3 - r * (x3 - x1) * x2) / denominator;
        if a + x1 == 0.0 || a + x2 == 0.0 || a + x3 == 0.0 {
            return Err(CurveError::DegenerateFit("curve has a pole at a sample point".into()));
        }
        let k = (y2 - y1) * (a + x1) * (a + x2) / (x2 - x1);
        let b = y1 + k / (a + x1);

        let curve = Self { a, b, k };
        if ![a, b, k].iter().all(|v| v.is_finite()) {
            return Err(CurveError::DegenerateFit("coefficients are not finite".into()));
        }
        tracing::debug!(a, b, k, "fitted supply curve");
        Ok(curve)
    }

    /// `n` evenly spaced `(x, y)` points on `[0, x_max]`, both ends included.
    pub fn sample(&self, x_max: f64, n: usize) -> Vec<(f64, f64)> {
        match n {
            0 => Vec::new(),
            1 => vec![(0.0, self.eval(0.0))],
            _ => {
                let step = x_max / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let x = step * i as f64;
                        (x, self.eval(x))
                    })
                    .collect()
            }
        }
    }
}

/// Named launch profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupplyPreset {
    /// Solana-denominated curve with fixed coefficients.
    PumpFun,
    /// ETH-denominated curve fitted through (0, 0), (8, 800M), (40, 1B).
    PumpEth,
}

/// A curve plus the guides drawn next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplyProfile {
    pub name: &'static str,
    pub currency: &'static str,
    pub curve: SupplyCurve,
    pub total_supply: f64,
    pub max_x: f64,
    /// Graduation point `(x, tokens)`.
    pub marker: (f64, f64),
}

impl SupplyPreset {
    pub fn profile(self) -> Result<SupplyProfile> {
        match self {
            SupplyPreset::PumpFun => Ok(SupplyProfile {
                name: "pump-fun",
                currency: "SOL",
                curve: SupplyCurve::new(30.0, 1_073_000_191.0, 32_190_005_730.0),
                total_supply: 1e9,
                max_x: 410.0,
                marker: (85.0, 8e8),
            }),
            SupplyPreset::PumpEth => Ok(SupplyProfile {
                name: "pump-eth",
                currency: "ETH",
                curve: SupplyCurve::fit([(0.0, 0.0), (8.0, 8e8), (40.0, 1e9)])?,
                total_supply: 1e9,
                max_x: 40.0,
                marker: (8.0, 8e8),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-9
    }

    #[test]
    fn test_pump_eth_fit_constants() {
        let curve = SupplyPreset::PumpEth.profile().unwrap().curve;
        assert!(close(curve.a, 8.0 / 3.0));
        assert!(close(curve.b, 3.2e9 / 3.0));
        assert!(close(curve.k, 25.6e9 / 9.0));
    }

    #[test]
    fn test_fit_passes_through_points() {
        let points = [(1.0, 10.0), (5.0, 50.0), (20.0, 90.0)];
        let curve = SupplyCurve::fit(points).unwrap();
        for (x, y) in points {
            assert!(close(curve.eval(x), y), "x = {x}");
        }
    }

    #[test]
    fn test_fit_rejects_degenerate_input() {
        assert!(matches!(
            SupplyCurve::fit([(0.0, 0.0), (0.0, 1.0), (2.0, 3.0)]),
            Err(CurveError::DegenerateFit(_))
        ));
        assert!(SupplyCurve::fit([(0.0, 5.0), (1.0, 2.0), (2.0, 5.0)]).is_err());
        // straight line has no hyperbola through it
        assert!(SupplyCurve::fit([(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]).is_err());
        assert!(SupplyCurve::fit([(0.0, f64::NAN), (1.0, 1.0), (2.0, 3.0)]).is_err());
    }

    #[test]
    fn test_pump_fun_preset() {
        let profile = SupplyPreset::PumpFun.profile().unwrap();
        // b - k / 30
        assert!(profile.curve.eval(0.0).abs() < 1.0);
        assert!(profile.curve.eval(85.0) > 7.9e8);
        assert_eq!(profile.max_x, 410.0);
    }

    #[test]
    fn test_sample_endpoints() {
        let curve = SupplyCurve::new(1.0, 10.0, 10.0);
        let points = curve.sample(9.0, 4);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (0.0, 0.0));
        assert_eq!(points[3], (9.0, 9.0));
        assert!(curve.sample(9.0, 0).is_empty());
        assert_eq!(curve.sample(9.0, 1), vec![(0.0, 0.0)]);
    }
}

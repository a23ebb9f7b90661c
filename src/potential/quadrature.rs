//! Globally adaptive Gauss–Kronrod (7/15) quadrature on a finite domain.
//!
//! The domain is first cut into equal panels, optionally refined by extra
//! breakpoints around known peaks of the integrand. A peak much narrower than
//! a panel would otherwise fall between the nodes and be missed without any
//! error estimate noticing. After that the panel with the largest error
//! estimate is bisected until the summed error meets the tolerance.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

// Kronrod abscissae on [0, 1]; odd entries are shared with the 7-point Gauss rule.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_639_206_854_697_526_329,
    0.949_107_912_342_758_524_526_189_684_047_851,
    0.864_864_423_359_769_072_789_712_788_640_926,
    0.741_531_185_599_394_439_863_864_773_280_788,
    0.586_087_235_467_691_130_294_144_845_693_013,
    0.405_845_151_377_397_166_906_606_412_076_961,
    0.207_784_955_007_898_467_600_689_403_773_245,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_224_963_732_008_058_970,
    0.063_092_092_629_978_553_290_700_663_189_204,
    0.104_790_010_322_250_183_839_876_322_541_518,
    0.140_653_259_715_525_918_745_189_590_510_238,
    0.169_004_726_639_267_902_826_583_426_598_550,
    0.190_350_578_064_785_409_913_256_402_421_014,
    0.204_432_940_075_298_892_414_161_999_234_649,
    0.209_482_141_084_727_828_012_999_174_891_714,
];

const WG: [f64; 4] = [
    0.129_484_966_168_869_693_270_611_432_679_082,
    0.279_705_391_489_276_667_901_467_771_423_780,
    0.381_830_050_505_118_944_950_369_775_488_975,
    0.417_959_183_673_469_387_755_102_040_816_327,
];

/// Integration domain and tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quadrature {
    pub lower: f64,
    pub upper: f64,
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Equal panels the domain is split into before refinement starts.
    pub initial_panels: usize,
    pub max_subdivisions: usize,
    /// Uniform gradient evaluations used to locate the minima of a potential.
    pub scan_points: usize,
}

impl Default for Quadrature {
    fn default() -> Self {
        Self {
            lower: -100.0,
            upper: 100.0,
            abs_tol: 1e-12,
            rel_tol: 1e-10,
            initial_panels: 64,
            max_subdivisions: 2000,
            scan_points: 20_001,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Panel {
    a: f64,
    b: f64,
    integral: f64,
    error: f64,
}

impl Panel {
    fn new<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Self {
        let (integral, error) = gauss_kronrod_15(f, a, b);
        Self { a, b, integral, error }
    }
}

/// One application of the 15-point Kronrod rule with the embedded Gauss
/// rule as error estimate.
fn gauss_kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64) {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let f_center = f(center);
    let mut kronrod = f_center * WGK[7];
    let mut gauss = f_center * WG[3];

    for j in 0..7 {
        let dx = half * XGK[j];
        let pair = f(center - dx) + f(center + dx);
        kronrod += WGK[j] * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    let integral = kronrod * half;
    let error = ((kronrod - gauss) * half).abs();
    (integral, error)
}

impl Quadrature {
    pub fn validate(&self) -> Result<()> {
        if !(self.lower.is_finite() && self.upper.is_finite() && self.lower < self.upper) {
            return Err(SimError::invalid(format!(
                "quadrature domain [{}, {}] must be finite and non-empty",
                self.lower, self.upper
            )));
        }
        if self.initial_panels == 0 || self.max_subdivisions < self.initial_panels {
            return Err(SimError::invalid(
                "quadrature needs at least one panel and max_subdivisions >= initial_panels",
            ));
        }
        if self.scan_points < 2 {
            return Err(SimError::invalid("quadrature scan needs at least two points"));
        }
        if !(self.abs_tol >= 0.0 && self.rel_tol >= 0.0) {
            return Err(SimError::invalid("quadrature tolerances must be non-negative"));
        }
        Ok(())
    }

    /// Spacing of the uniform scan grid.
    pub fn scan_spacing(&self) -> f64 {
        (self.upper - self.lower) / (self.scan_points.max(2) - 1) as f64
    }

    /// Integrate `f` over the configured domain.
    ///
    /// `kt` is only carried into the error for context.
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F, kt: f64) -> Result<f64> {
        self.integrate_with_breakpoints(f, kt, &[])
    }

    /// Like [`Quadrature::integrate`], with extra panel edges at `breakpoints`.
    ///
    /// Points outside the open domain are ignored.
    pub fn integrate_with_breakpoints<F: Fn(f64) -> f64>(
        &self,
        f: F,
        kt: f64,
        breakpoints: &[f64],
    ) -> Result<f64> {
        self.validate()?;

        let width = (self.upper - self.lower) / self.initial_panels as f64;
        let mut edges: Vec<f64> = (0..self.initial_panels)
            .map(|i| self.lower + i as f64 * width)
            .chain(
                breakpoints
                    .iter()
                    .copied()
                    .filter(|x| x.is_finite() && *x > self.lower && *x < self.upper),
            )
            .collect();
        edges.push(self.upper);
        edges.sort_by(f64::total_cmp);
        edges.dedup();

        let mut panels: Vec<Panel> = edges
            .windows(2)
            .filter(|w| w[1] > w[0])
            .map(|w| Panel::new(&f, w[0], w[1]))
            .collect();

        loop {
            let integral: f64 = panels.iter().map(|p| p.integral).sum();
            let error: f64 = panels.iter().map(|p| p.error).sum();

            if !(integral.is_finite() && error.is_finite()) {
                return Err(SimError::QuadratureDiverged {
                    kt,
                    estimate: integral,
                    error,
                    subdivisions: panels.len(),
                });
            }
            if error <= self.abs_tol.max(self.rel_tol * integral.abs()) {
                return Ok(integral);
            }
            if panels.len() >= self.max_subdivisions {
                return Err(SimError::QuadratureDiverged {
                    kt,
                    estimate: integral,
                    error,
                    subdivisions: panels.len(),
                });
            }

            let worst = panels
                .iter()
                .enumerate()
                .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
                .map_or(0, |(i, _)| i);
            let panel = panels.swap_remove(worst);
            let mid = 0.5 * (panel.a + panel.b);
            panels.push(Panel::new(&f, panel.a, mid));
            panels.push(Panel::new(&f, mid, panel.b));
        }
    }
}

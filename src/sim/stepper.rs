//! Year-by-year simulation.
//!
//! [`YearStepper`] owns the simulated series and advances them one year per
//! call. The closed-form curve evaluation lives in `crate::models`; this module
//! only adds bounded uniform noise and the hydro-development event on top.
//!
//! Stored emission and deforestation values are clamped at zero. The
//! `predict_*` methods return the raw curve value plus noise.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};
use tracing::{debug, info};

use crate::domain::{CurveShape, FittedModel, Series, SimConstants, YearStep};
use crate::error::ModelError;
use crate::models::{evaluate, temperature_change};

/// Advances emission, deforestation and temperature one year at a time.
#[derive(Debug, Clone)]
pub struct YearStepper<R: Rng = StdRng> {
    model: FittedModel,
    constants: SimConstants,
    rng: R,
    emission_noise: Option<Uniform<f64>>,
    deforestation_noise: Option<Uniform<f64>>,
    hydro_event: Bernoulli,
    hydro_extra: Uniform<f64>,
    year: i32,
    emission: Series,
    deforestation: Series,
    temperature: Series,
    hydro_years: BTreeSet<i32>,
}

impl YearStepper<StdRng> {
    /// Build a stepper with a seeded generator, or OS entropy when `seed` is `None`.
    pub fn from_seed(model: FittedModel, constants: SimConstants, seed: Option<u64>) -> Result<Self, ModelError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(model, constants, rng)
    }
}

impl<R: Rng> YearStepper<R> {
    /// Build a stepper around an injected generator.
    ///
    /// The base year is seeded from the fitted curves (with noise) and the
    /// configured starting temperature.
    pub fn with_rng(model: FittedModel, constants: SimConstants, rng: R) -> Result<Self, ModelError> {
        validate(&constants)?;

        let hydro_event = Bernoulli::from_ratio(constants.hydro_odds.0, constants.hydro_odds.1)
            .map_err(|e| ModelError::InvalidConstants(format!("hydro odds: {e}")))?;
        let (extra_lo, extra_hi) = constants.hydro_extra;

        let base_year = constants.base_year;
        let mut stepper = Self {
            emission_noise: symmetric(constants.emission_noise),
            deforestation_noise: symmetric(constants.deforestation_noise),
            hydro_event,
            hydro_extra: Uniform::new_inclusive(extra_lo, extra_hi),
            model,
            rng,
            year: base_year,
            emission: Series::new(),
            deforestation: Series::new(),
            temperature: Series::new(),
            hydro_years: BTreeSet::new(),
            constants,
        };

        let emission = stepper.predict_emission(base_year)?.max(0.0);
        let deforestation = stepper.predict_deforestation(base_year)?.max(0.0);
        stepper.emission.insert(base_year, emission);
        stepper.deforestation.insert(base_year, deforestation);
        stepper.temperature.insert(base_year, stepper.constants.start_temperature);

        debug!(
            target: "climsim.sim",
            year = base_year,
            emission,
            deforestation,
            temperature = stepper.constants.start_temperature,
            "stepper seeded"
        );
        Ok(stepper)
    }

    /// Emission curve at `year` plus uniform noise.
    pub fn predict_emission(&mut self, year: i32) -> Result<f64, ModelError> {
        let value = evaluate(CurveShape::Logarithmic, year as f64, &self.model.emission)?;
        Ok(value + sample_noise(self.emission_noise.as_ref(), &mut self.rng))
    }

    /// Deforestation curve at `year` plus uniform noise.
    pub fn predict_deforestation(&mut self, year: i32) -> Result<f64, ModelError> {
        let value = evaluate(CurveShape::Hyperbolic, year as f64, &self.model.deforestation)?;
        Ok(value + sample_noise(self.deforestation_noise.as_ref(), &mut self.rng))
    }

    /// Next year's temperature given this year's drivers and the prior temperature.
    pub fn predict_temperature(&self, emission: f64, deforestation: f64, prior_temperature: f64) -> f64 {
        prior_temperature + temperature_change(&self.model.correlation, emission, deforestation)
    }

    /// Advance one year and append the new values.
    ///
    /// On error nothing is appended and the current year stays the same.
    pub fn advance_year(&mut self) -> Result<YearStep, ModelError> {
        let year = self.year + 1;
        let hydro = self.hydro_event.sample(&mut self.rng);

        let emission = self.predict_emission(year)?.max(0.0);
        let mut deforestation = self.predict_deforestation(year)?;
        if hydro {
            deforestation += self.hydro_extra.sample(&mut self.rng);
        }
        let deforestation = deforestation.max(0.0);
        let temperature = self.predict_temperature(emission, deforestation, self.current_temperature());

        self.year = year;
        self.emission.insert(year, emission);
        self.deforestation.insert(year, deforestation);
        self.temperature.insert(year, temperature);
        if hydro {
            self.hydro_years.insert(year);
            info!(target: "climsim.sim", year, deforestation, "hydro event");
        }

        let step = YearStep {
            year,
            emission,
            deforestation,
            temperature,
            hydro,
        };
        debug!(target: "climsim.sim", ?step, "year advanced");
        Ok(step)
    }

    /// Most recently simulated year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// State of the most recently simulated year.
    pub fn current(&self) -> YearStep {
        self.step_at(self.year)
    }

    pub fn emission(&self) -> &Series {
        &self.emission
    }

    pub fn deforestation(&self) -> &Series {
        &self.deforestation
    }

    pub fn temperature(&self) -> &Series {
        &self.temperature
    }

    pub fn hydro_years(&self) -> &BTreeSet<i32> {
        &self.hydro_years
    }

    /// Every simulated year in order, starting at the base year.
    pub fn history(&self) -> Vec<YearStep> {
        self.temperature.keys().map(|&year| self.step_at(year)).collect()
    }

    fn current_temperature(&self) -> f64 {
        self.temperature
            .get(&self.year)
            .copied()
            .unwrap_or(self.constants.start_temperature)
    }

    fn step_at(&self, year: i32) -> YearStep {
        YearStep {
            year,
            emission: self.emission.get(&year).copied().unwrap_or(0.0),
            deforestation: self.deforestation.get(&year).copied().unwrap_or(0.0),
            temperature: self.temperature.get(&year).copied().unwrap_or(f64::NAN),
            hydro: self.hydro_years.contains(&year),
        }
    }
}

fn validate(constants: &SimConstants) -> Result<(), ModelError> {
    let invalid = |msg: String| Err(ModelError::InvalidConstants(msg));

    if !constants.start_temperature.is_finite() {
        return invalid(format!("start temperature {} is not finite", constants.start_temperature));
    }
    for (name, width) in [
        ("emission noise", constants.emission_noise),
        ("deforestation noise", constants.deforestation_noise),
    ] {
        if !(width.is_finite() && width >= 0.0) {
            return invalid(format!("{name} {width} must be finite and >= 0"));
        }
    }
    let (lo, hi) = constants.hydro_extra;
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return invalid(format!("hydro extra range [{lo}, {hi}] must be finite with low <= high"));
    }
    Ok(())
}

/// Uniform on `[-width, width]`, or `None` when there is no noise.
fn symmetric(width: f64) -> Option<Uniform<f64>> {
    (width > 0.0).then(|| Uniform::new_inclusive(-width, width))
}

fn sample_noise<R: Rng>(dist: Option<&Uniform<f64>>, rng: &mut R) -> f64 {
    dist.map_or(0.0, |d| d.sample(rng))
}

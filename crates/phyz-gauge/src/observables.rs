//! Energy statistics and inverse-temperature scans.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GaugeError, Result};
use crate::field::{GaugeField, InitPolicy};

/// Upper bound on the number of β values a schedule may expand to.
pub const MAX_SCHEDULE_STEPS: usize = 1_000_000;

/// Statistics of the energy per plaquette over a run of samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyStats {
    /// ⟨E⟩.
    pub mean: f64,

    /// ⟨E²⟩.
    pub mean_sq: f64,

    /// Population standard deviation of E.
    pub std: f64,

    /// Population variance of E (proportional to the specific heat).
    pub variance: f64,

    /// Raw samples in the order they were taken.
    pub samples: Vec<f64>,
}

impl EnergyStats {
    /// Summarize a non-empty sample sequence.
    pub fn from_samples(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(GaugeError::InvalidParameter(
                "energy statistics need at least one sample".into(),
            ));
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let mean_sq = samples.iter().map(|e| e * e).sum::<f64>() / n;
        let variance = samples.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        Ok(Self {
            mean,
            mean_sq,
            std: variance.sqrt(),
            variance,
            samples,
        })
    }
}

/// Histograms over group elements describing the current configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// `links[g]` is the number of links holding element `g`.
    pub links: Vec<usize>,

    /// `plaquettes[g]` is the number of plaquettes whose product is `g`.
    pub plaquettes: Vec<usize>,
}

/// Sequence of β values visited by a hysteresis scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetaSchedule {
    /// Visit exactly these values.
    Explicit(Vec<f64>),
    /// `start, start + step, … < stop`, then `stop, stop - step, … > start`.
    RoundTrip { start: f64, stop: f64, step: f64 },
}

impl BetaSchedule {
    /// Expand into the list of β values.
    pub fn betas(&self) -> Result<Vec<f64>> {
        match *self {
            BetaSchedule::Explicit(ref betas) => Ok(betas.clone()),
            BetaSchedule::RoundTrip { start, stop, step } => {
                if !(step > 0.0 && step.is_finite()) {
                    return Err(GaugeError::InvalidParameter(format!(
                        "beta step must be positive, got {}",
                        step
                    )));
                }
                if !(stop > start) {
                    return Err(GaugeError::InvalidParameter(format!(
                        "beta range must be increasing, got {}..{}",
                        start, stop
                    )));
                }
                let count = ((stop - start) / step).ceil();
                if count > (MAX_SCHEDULE_STEPS / 2) as f64 {
                    return Err(GaugeError::InvalidParameter(format!(
                        "beta schedule {}..{} with step {} exceeds {} steps",
                        start, stop, step, MAX_SCHEDULE_STEPS
                    )));
                }
                let count = count as usize;
                let up = (0..count).map(|i| start + i as f64 * step);
                let down = (0..count).map(|i| stop - i as f64 * step);
                Ok(up.chain(down).collect())
            }
        }
    }
}

/// Sweep counts for a hysteresis scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HysteresisParams {
    /// Equilibration sweeps at each β.
    pub neq: usize,

    /// Samples per statistics block.
    pub nstat: usize,

    /// Sweeps between samples.
    pub relax: usize,

    /// Record statistics only at every `inc`-th β.
    pub inc: usize,

    /// Store the block mean (`true`) or the instantaneous energy after the block.
    pub average: bool,
}

impl Default for HysteresisParams {
    fn default() -> Self {
        Self {
            neq: 2,
            nstat: 10,
            relax: 10,
            inc: 10,
            average: true,
        }
    }
}

/// Result of a hysteresis scan, one entry per recorded β.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HysteresisScan {
    pub betas: Vec<f64>,
    pub energy: Vec<f64>,
    pub energy_sq: Vec<f64>,
    pub std: Vec<f64>,
}

impl<R: Rng> GaugeField<R> {
    /// Run `n * relax` sweeps, sampling the energy every `relax` sweeps.
    pub fn stats(&mut self, n: usize, relax: usize) -> Result<EnergyStats> {
        if n == 0 || relax == 0 {
            return Err(GaugeError::InvalidParameter(format!(
                "stats needs n > 0 and relax > 0, got n={}, relax={}",
                n, relax
            )));
        }
        let mut samples = Vec::with_capacity(n);
        for _ in 0..n {
            self.sweep(relax);
            samples.push(self.total_energy());
        }
        EnergyStats::from_samples(samples)
    }

    /// Element histograms of links and plaquettes.
    pub fn status(&self) -> Status {
        let mut links = vec![0; self.group().size()];
        for &g in self.links() {
            links[g] += 1;
        }
        let mut plaquettes = vec![0; self.group().size()];
        for plaq in self.lattice().plaquettes() {
            plaquettes[self.compose(plaq)] += 1;
        }
        Status { links, plaquettes }
    }

    /// Scan β up and back down, equilibrating at each value and recording
    /// energy statistics every `inc`-th step.
    pub fn hysteresis(
        &mut self,
        schedule: &BetaSchedule,
        params: &HysteresisParams,
    ) -> Result<HysteresisScan> {
        if params.inc == 0 {
            return Err(GaugeError::InvalidParameter("inc must be positive".into()));
        }
        let betas = schedule.betas()?;
        info!(steps = betas.len(), ?params, "starting hysteresis scan");

        let mut scan = HysteresisScan::default();
        for (i, &beta) in betas.iter().enumerate() {
            debug!(step = i, total = betas.len(), beta, "hysteresis step");
            self.set_temperature(beta);
            self.sweep(params.neq);
            if i % params.inc != 0 {
                continue;
            }
            let stats = self.stats(params.nstat, params.relax)?;
            let energy = if params.average {
                stats.mean
            } else {
                self.total_energy()
            };
            scan.betas.push(beta);
            scan.energy.push(energy);
            scan.energy_sq.push(stats.mean_sq);
            scan.std.push(stats.std);
        }

        info!(recorded = scan.betas.len(), "hysteresis scan finished");
        Ok(scan)
    }

    /// For each β, restart from a half-random/half-identity configuration
    /// and record the energy every `inc` sweeps.
    ///
    /// Row `i` holds `1 + num_sweeps / inc` energies, starting with the
    /// energy of the fresh configuration.
    pub fn phase_sweep(
        &mut self,
        betas: &[f64],
        num_sweeps: usize,
        inc: usize,
    ) -> Result<Vec<Vec<f64>>> {
        if inc == 0 {
            return Err(GaugeError::InvalidParameter("inc must be positive".into()));
        }
        info!(betas = betas.len(), num_sweeps, inc, "starting phase sweep");

        let fixed = self.group().identity();
        let mut energy = Vec::with_capacity(betas.len());
        for &beta in betas {
            debug!(beta, "phase sweep");
            self.initialize(InitPolicy::HalfRandom { fixed })?;
            self.set_temperature(beta);

            let mut row = Vec::with_capacity(1 + num_sweeps / inc);
            row.push(self.total_energy());
            for j in 0..num_sweeps {
                self.sweep(1);
                if (j + 1) % inc == 0 {
                    row.push(self.total_energy());
                }
            }
            energy.push(row);
        }
        Ok(energy)
    }
}

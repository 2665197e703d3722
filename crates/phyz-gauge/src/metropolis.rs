//! Metropolis local updates for finite-group gauge fields.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::GaugeField;

/// Acceptance rule applied to each single-link proposal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceRule {
    /// Accept with probability `min(1, exp(-β ΔS))`.
    #[default]
    Metropolis,
    /// Accept every proposal (disable for testing / infinite temperature).
    Always,
}

/// Metropolis acceptance test.
///
/// Moves that do not raise the action are always accepted and consume no
/// random draw; otherwise one uniform draw in `[0, 1)` is compared against
/// `exp(-β ΔS)`.
pub fn metropolis<R: Rng + ?Sized>(
    old_action: f64,
    new_action: f64,
    beta: f64,
    rng: &mut R,
) -> bool {
    let delta_s = new_action - old_action;
    let accept_prob = (-beta * delta_s).exp();
    if delta_s < 0.0 || accept_prob >= 1.0 {
        return true;
    }
    let r: f64 = rng.r#gen();
    r < accept_prob
}

/// Running acceptance statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetropolisState {
    /// Number of single-link proposals evaluated.
    pub n_proposed: usize,

    /// Number of accepted proposals.
    pub n_accepted: usize,

    /// Number of completed full-lattice sweeps.
    pub n_sweeps: usize,
}

impl MetropolisState {
    /// Acceptance rate.
    pub fn acceptance_rate(&self) -> f64 {
        if self.n_proposed == 0 {
            0.0
        } else {
            self.n_accepted as f64 / self.n_proposed as f64
        }
    }
}

impl<R: Rng> GaugeField<R> {
    /// Draw a uniformly random group element as a proposal.
    pub fn propose(&mut self) -> usize {
        let n = self.group().size();
        self.rng.gen_range(0..n)
    }

    /// Apply the configured acceptance rule to a proposed action change.
    pub fn accept(&mut self, old_action: f64, new_action: f64) -> bool {
        match self.acceptance() {
            AcceptanceRule::Metropolis => {
                let beta = self.beta();
                metropolis(old_action, new_action, beta, &mut self.rng)
            }
            AcceptanceRule::Always => true,
        }
    }

    /// Propose a new value for `link` and accept or reject it.
    ///
    /// Returns whether the proposal was committed.
    pub fn update(&mut self, link: usize) -> Result<bool> {
        self.lattice().check_link(link)?;
        Ok(self.update_unchecked(link))
    }

    fn update_unchecked(&mut self, link: usize) -> bool {
        let old_action = self.local_action(link, self.links()[link]);
        let candidate = self.propose();
        self.try_candidate(link, old_action, candidate)
    }

    fn try_candidate(&mut self, link: usize, old_action: f64, candidate: usize) -> bool {
        let new_action = self.local_action(link, candidate);
        let accepted = self.accept(old_action, new_action);
        if accepted {
            self.store(link, candidate);
        }
        self.state.n_proposed += 1;
        if accepted {
            self.state.n_accepted += 1;
        }
        accepted
    }

    /// Update every link once, in link-index order, `num_sweeps` times.
    pub fn sweep(&mut self, num_sweeps: usize) {
        let n_links = self.lattice().n_links();
        for _ in 0..num_sweeps {
            for link in 0..n_links {
                self.update_unchecked(link);
            }
            self.state.n_sweeps += 1;
        }
    }

    /// Update `n` uniformly random links, each with a proposal that differs
    /// from the link's current value.
    ///
    /// Returns the number of accepted updates. For the trivial group no
    /// different value exists and nothing is done.
    pub fn rand_update(&mut self, n: usize) -> usize {
        let order = self.group().size();
        if order < 2 {
            return 0;
        }
        let n_links = self.lattice().n_links();
        let mut accepted = 0;
        for _ in 0..n {
            let link = self.rng.gen_range(0..n_links);
            let current = self.links()[link];
            let mut candidate = self.propose();
            while candidate == current {
                candidate = self.propose();
            }
            let old_action = self.local_action(link, current);
            if self.try_candidate(link, old_action, candidate) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Sweep once, recording the energy before the sweep and after every
    /// link update.
    ///
    /// With `stop = Some(k)` only the first `k` links are updated, giving
    /// `k + 1` energies.
    pub fn watch_sweep(&mut self, stop: Option<usize>) -> Vec<f64> {
        let n_links = self.lattice().n_links();
        let n_updates = stop.map_or(n_links, |k| k.min(n_links));
        let mut energy = Vec::with_capacity(n_updates + 1);
        energy.push(self.total_energy());
        for link in 0..n_updates {
            self.update_unchecked(link);
            energy.push(self.total_energy());
        }
        if n_updates == n_links {
            self.state.n_sweeps += 1;
        }
        energy
    }

    /// Acceptance statistics since construction or the last reset.
    pub fn metropolis_state(&self) -> &MetropolisState {
        &self.state
    }

    pub fn reset_metropolis_state(&mut self) {
        self.state = MetropolisState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::field::InitPolicy;
    use crate::group::FiniteGroup;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_downhill_always_accepted() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(metropolis(3.0, 1.0, 10.0, &mut rng));
            assert!(metropolis(2.0, 2.0, 10.0, &mut rng));
        }
    }

    #[test]
    fn test_zero_beta_accepts_everything() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..1000 {
            assert!(metropolis(0.0, 100.0, 0.0, &mut rng));
        }
    }

    #[test]
    fn test_uphill_acceptance_frequency() {
        let mut rng = StdRng::seed_from_u64(3);
        let (beta, delta_s) = (0.7, 2.0);
        let trials = 200_000;
        let accepted = (0..trials)
            .filter(|_| metropolis(1.0, 1.0 + delta_s, beta, &mut rng))
            .count();
        let freq = accepted as f64 / trials as f64;
        assert_relative_eq!(freq, (-beta * delta_s).exp(), epsilon = 0.01);
    }

    #[test]
    fn test_large_beta_freezes_uphill_moves() {
        let mut rng = StdRng::seed_from_u64(4);
        let accepted = (0..1000)
            .filter(|_| metropolis(0.0, 1.0, 1e3, &mut rng))
            .count();
        assert_eq!(accepted, 0);
    }

    #[test]
    fn test_acceptance_rate() {
        let mut state = MetropolisState::default();
        assert_eq!(state.acceptance_rate(), 0.0);
        state.n_proposed = 8;
        state.n_accepted = 2;
        assert_eq!(state.acceptance_rate(), 0.25);
    }

    #[test]
    fn test_sweep_bookkeeping() {
        let mut field = GaugeField::seeded(
            &[3, 3, 3],
            FiniteGroup::cyclic(3).unwrap(),
            Action::delta(),
            0.5,
            InitPolicy::Random,
            5,
        )
        .unwrap();
        field.sweep(2);
        let state = field.metropolis_state();
        assert_eq!(state.n_sweeps, 2);
        assert_eq!(state.n_proposed, 2 * 81);
        assert!(state.n_accepted <= state.n_proposed);
        assert!(field.links().iter().all(|&v| v < 3));

        field.reset_metropolis_state();
        assert_eq!(field.metropolis_state(), &MetropolisState::default());
    }

    #[test]
    fn test_update_rejects_bad_link() {
        let mut field = GaugeField::seeded(
            &[2, 2],
            FiniteGroup::cyclic(2).unwrap(),
            Action::delta(),
            1.0,
            InitPolicy::Identity,
            0,
        )
        .unwrap();
        assert!(field.update(8).is_err());
        assert!(field.update(7).is_ok());
    }

    #[test]
    fn test_rand_update_changes_value_when_accepted() {
        let mut field = GaugeField::seeded(
            &[3, 3],
            FiniteGroup::cyclic(4).unwrap(),
            Action::delta(),
            1.0,
            InitPolicy::Identity,
            9,
        )
        .unwrap();
        field.set_acceptance(AcceptanceRule::Always);
        let accepted = field.rand_update(1);
        assert_eq!(accepted, 1);
        // Exactly one link moved away from the identity
        assert_eq!(field.links().iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn test_rand_update_trivial_group() {
        let mut field = GaugeField::seeded(
            &[2, 2],
            FiniteGroup::cyclic(1).unwrap(),
            Action::delta(),
            1.0,
            InitPolicy::Identity,
            0,
        )
        .unwrap();
        assert_eq!(field.rand_update(10), 0);
    }

    #[test]
    fn test_watch_sweep_lengths() {
        let mut field = GaugeField::seeded(
            &[2, 2, 2],
            FiniteGroup::cyclic(2).unwrap(),
            Action::delta(),
            1.0,
            InitPolicy::Identity,
            0,
        )
        .unwrap();
        let energy = field.watch_sweep(None);
        assert_eq!(energy.len(), 25);
        assert_eq!(energy[0], 0.0);
        assert_eq!(field.metropolis_state().n_sweeps, 1);

        // k updates record the starting energy plus one entry per update
        let partial = field.watch_sweep(Some(5));
        assert_eq!(partial.len(), 6);
        assert_eq!(field.metropolis_state().n_proposed, 24 + 5);
        assert_eq!(field.watch_sweep(Some(100)).len(), 25);
        assert_eq!(field.metropolis_state().n_sweeps, 1);
    }
}

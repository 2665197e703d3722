//! Gauge field state and Wilson action evaluation.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::Action;
use crate::error::Result;
use crate::group::FiniteGroup;
use crate::lattice::Lattice;
use crate::metropolis::{AcceptanceRule, MetropolisState};

/// How link values are filled when a field is (re)initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitPolicy {
    /// Every link set to the group identity (cold start).
    Identity,
    /// Every link an independent uniform element (hot start).
    Random,
    /// Every link set to the given element.
    Fixed(usize),
    /// Sites with `coord_0 < L_0 / 2` get uniform random links, the rest
    /// get `fixed` on all their links.
    HalfRandom { fixed: usize },
}

/// Finite-group gauge field on a periodic lattice.
///
/// Each link U_μ(n) carries one group element. The field owns its random
/// source so that a seeded field reproduces the same Markov chain.
pub struct GaugeField<R = StdRng> {
    lattice: Lattice,
    group: FiniteGroup,
    action: Action,

    /// `action_table[g]` is the action of plaquette element `g`.
    action_table: Vec<f64>,

    /// Link variables, indexed by link index `site * D + μ`.
    links: Vec<usize>,

    /// Inverse temperature β.
    beta: f64,

    acceptance: AcceptanceRule,
    pub(crate) state: MetropolisState,
    pub(crate) rng: R,
}

impl GaugeField<StdRng> {
    /// Create a field driven by a `StdRng` seeded with `seed`.
    pub fn seeded(
        shape: &[usize],
        group: FiniteGroup,
        action: impl Into<Action>,
        beta: f64,
        init: InitPolicy,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(
            shape,
            group,
            action,
            beta,
            init,
            StdRng::seed_from_u64(seed),
        )
    }
}

impl<R: Rng> GaugeField<R> {
    /// Create a field with an injected random source.
    pub fn with_rng(
        shape: &[usize],
        group: FiniteGroup,
        action: impl Into<Action>,
        beta: f64,
        init: InitPolicy,
        rng: R,
    ) -> Result<Self> {
        let lattice = Lattice::new(shape)?;
        let action = action.into();
        let action_table = action.tabulate(&group);
        let links = vec![group.identity(); lattice.n_links()];

        let mut field = Self {
            lattice,
            group,
            action,
            action_table,
            links,
            beta,
            acceptance: AcceptanceRule::default(),
            state: MetropolisState::default(),
            rng,
        };
        field.initialize(init)?;

        debug!(
            links = field.links.len(),
            group_order = field.group.size(),
            beta,
            ?init,
            "gauge field allocated"
        );

        Ok(field)
    }

    /// Refill every link according to `policy`.
    ///
    /// The field is left untouched if `policy` names an invalid element.
    pub fn initialize(&mut self, policy: InitPolicy) -> Result<()> {
        let n = self.group.size();
        match policy {
            InitPolicy::Identity => self.links.fill(self.group.identity()),
            InitPolicy::Fixed(v) => {
                self.group.check_element(v)?;
                self.links.fill(v);
            }
            InitPolicy::Random => {
                for link in self.links.iter_mut() {
                    *link = self.rng.gen_range(0..n);
                }
            }
            InitPolicy::HalfRandom { fixed } => {
                self.group.check_element(fixed)?;
                // Row-major layout: axis 0 is slowest, so the split is a
                // single cut through the link array.
                let l0 = self.lattice.shape()[0];
                let split = (l0 / 2) * (self.lattice.n_links() / l0);
                let (random, ordered) = self.links.split_at_mut(split);
                for link in random.iter_mut() {
                    *link = self.rng.gen_range(0..n);
                }
                ordered.fill(fixed);
            }
        }
        Ok(())
    }

    /// Set the inverse temperature β.
    pub fn set_temperature(&mut self, beta: f64) {
        self.beta = beta;
    }

    /// Inverse temperature β.
    #[inline]
    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn acceptance(&self) -> AcceptanceRule {
        self.acceptance
    }

    pub fn set_acceptance(&mut self, rule: AcceptanceRule) {
        self.acceptance = rule;
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn group(&self) -> &FiniteGroup {
        &self.group
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// All link values, indexed by link index.
    pub fn links(&self) -> &[usize] {
        &self.links
    }

    /// Value of link `link`.
    pub fn link_value(&self, link: usize) -> Result<usize> {
        self.lattice.check_link(link)?;
        Ok(self.links[link])
    }

    /// Overwrite link `link` with element `value`.
    pub fn set_link_value(&mut self, link: usize, value: usize) -> Result<()> {
        self.lattice.check_link(link)?;
        self.group.check_element(value)?;
        self.links[link] = value;
        Ok(())
    }

    /// Net group element of the plaquette spanned by `d1`, `d2` at `site`.
    pub fn plaquette_element(&self, site: usize, d1: usize, d2: usize) -> Result<usize> {
        let plaq = self.lattice.plaquette_links(site, d1, d2)?;
        Ok(self.compose(plaq))
    }

    /// Wilson action of one plaquette.
    pub fn plaquette_action(&self, site: usize, d1: usize, d2: usize) -> Result<f64> {
        Ok(self.action_table[self.plaquette_element(site, d1, d2)?])
    }

    /// Sum of the actions of the `2(D-1)` plaquettes containing `link`.
    ///
    /// With `value = Some(g)` the link is evaluated as if it held `g`;
    /// stored state is never modified.
    pub fn link_action(&self, link: usize, value: Option<usize>) -> Result<f64> {
        self.lattice.check_link(link)?;
        let value = match value {
            Some(g) => self.group.check_element(g)?,
            None => self.links[link],
        };
        Ok(self.local_action(link, value))
    }

    /// Average action per plaquette, each plaquette counted once.
    pub fn total_energy(&self) -> f64 {
        let sum: f64 = self
            .lattice
            .plaquettes()
            .iter()
            .map(|plaq| self.action_table[self.compose(plaq)])
            .sum();
        sum / self.lattice.n_plaquettes() as f64
    }

    /// Unchecked local action with `link` substituted by `value`.
    #[inline]
    pub(crate) fn local_action(&self, link: usize, value: usize) -> f64 {
        self.lattice
            .link_plaquettes(link)
            .iter()
            .map(|plaq| self.action_table[self.compose_with(plaq, link, value)])
            .sum()
    }

    #[inline]
    pub(crate) fn compose(&self, plaq: &[usize; 4]) -> usize {
        let l = &self.links;
        self.group
            .plaquette_product(l[plaq[0]], l[plaq[1]], l[plaq[2]], l[plaq[3]])
    }

    #[inline]
    fn compose_with(&self, plaq: &[usize; 4], link: usize, value: usize) -> usize {
        let at = |l: usize| if l == link { value } else { self.links[l] };
        self.group
            .plaquette_product(at(plaq[0]), at(plaq[1]), at(plaq[2]), at(plaq[3]))
    }

    #[inline]
    pub(crate) fn store(&mut self, link: usize, value: usize) {
        self.links[link] = value;
    }
}

impl<R> std::fmt::Debug for GaugeField<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GaugeField")
            .field("shape", &self.lattice.shape())
            .field("group_order", &self.group.size())
            .field("action", &self.action)
            .field("beta", &self.beta)
            .field("acceptance", &self.acceptance)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GaugeError;
    use approx::assert_relative_eq;

    fn z2_field(shape: &[usize], init: InitPolicy) -> GaugeField {
        GaugeField::seeded(
            shape,
            FiniteGroup::cyclic(2).unwrap(),
            Action::delta(),
            1.0,
            init,
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_identity_field_has_zero_energy() {
        let field = z2_field(&[2, 2, 2], InitPolicy::Identity);
        assert_eq!(field.total_energy(), 0.0);
        for link in 0..field.lattice().n_links() {
            assert_eq!(field.link_action(link, None).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_single_flipped_link() {
        let mut field = z2_field(&[4, 4, 4], InitPolicy::Identity);
        let link = field.lattice().link_index(5, 1).unwrap();
        field.set_link_value(link, 1).unwrap();

        // Flipping one link excites its 2(D-1) = 4 plaquettes
        assert_eq!(field.link_action(link, None).unwrap(), 4.0);
        assert_relative_eq!(field.total_energy(), 4.0 / (64.0 * 3.0));

        // Hypothetically restoring it removes the excitation without mutating
        assert_eq!(field.link_action(link, Some(0)).unwrap(), 0.0);
        assert_eq!(field.link_value(link).unwrap(), 1);
    }

    #[test]
    fn test_plaquette_action_identity() {
        let field = z2_field(&[3, 3], InitPolicy::Identity);
        assert_eq!(field.plaquette_element(4, 0, 1).unwrap(), 0);
        assert_eq!(field.plaquette_action(4, 1, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_fixed_init_and_validation() {
        let mut field = z2_field(&[2, 2], InitPolicy::Fixed(1));
        assert!(field.links().iter().all(|&v| v == 1));

        assert!(matches!(
            field.initialize(InitPolicy::Fixed(2)),
            Err(GaugeError::ElementOutOfRange { element: 2, size: 2 })
        ));
        assert!(field.links().iter().all(|&v| v == 1));
        assert!(field.set_link_value(0, 5).is_err());
        assert!(field.set_link_value(field.lattice().n_links(), 0).is_err());
    }

    #[test]
    fn test_fixed_abelian_configuration_is_flat() {
        // A constant abelian field has trivial plaquettes: a·a·a⁻¹·a⁻¹ = e
        let field = GaugeField::seeded(
            &[3, 3, 3],
            FiniteGroup::cyclic(5).unwrap(),
            Action::u1_cosine(),
            1.0,
            InitPolicy::Fixed(3),
            0,
        )
        .unwrap();
        assert_relative_eq!(field.total_energy(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_half_random_split() {
        let field = GaugeField::seeded(
            &[4, 3, 3],
            FiniteGroup::cyclic(7).unwrap(),
            Action::delta(),
            1.0,
            InitPolicy::HalfRandom { fixed: 6 },
            11,
        )
        .unwrap();
        let lattice = field.lattice();
        let mut random_non_fixed = 0;
        for link in 0..lattice.n_links() {
            let (site, _) = lattice.link_site_dir(link);
            let x0 = lattice.site_coords(site)[0];
            let v = field.link_value(link).unwrap();
            if x0 >= 2 {
                assert_eq!(v, 6);
            } else if v != 6 {
                random_non_fixed += 1;
            }
        }
        assert!(random_non_fixed > 0);
    }

    #[test]
    fn test_random_init_in_range() {
        let field = GaugeField::seeded(
            &[3, 3, 3],
            FiniteGroup::quaternion(),
            Action::delta(),
            1.0,
            InitPolicy::Random,
            3,
        )
        .unwrap();
        assert!(field.links().iter().all(|&v| v < 8));
        let e = field.total_energy();
        assert!((0.0..=1.0).contains(&e));
        assert!(e > 0.0);
    }

    #[test]
    fn test_set_temperature() {
        let mut field = z2_field(&[2, 2], InitPolicy::Identity);
        field.set_temperature(0.25);
        assert_eq!(field.beta(), 0.25);
    }
}

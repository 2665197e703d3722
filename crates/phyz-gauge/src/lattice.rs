//! D-dimensional periodic lattice topology.
//!
//! Sites are linearized row-major with the last axis fastest. The link
//! leaving site `s` along direction `μ` has index `s * D + μ`, so iterating
//! link indices in order visits sites in lattice order and, within a site,
//! directions in increasing order.
//!
//! Every plaquette is precomputed at construction and stored as a flat
//! array of link-index quadruples. A plaquette spanned by `lo < hi` at base
//! site `n` is always stored in the order
//!
//! ```text
//! [ U_lo(n), U_hi(n+lo), U_lo(n+hi), U_hi(n) ]
//! ```
//!
//! regardless of the order in which the two directions are named.

use tracing::debug;

use crate::error::{GaugeError, Result};

/// Which side of a link a plaquette lies on, along the perpendicular axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub const BOTH: [Sign; 2] = [Sign::Plus, Sign::Minus];

    #[inline]
    fn index(self) -> usize {
        match self {
            Sign::Plus => 0,
            Sign::Minus => 1,
        }
    }
}

impl TryFrom<i32> for Sign {
    type Error = GaugeError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            1 => Ok(Sign::Plus),
            -1 => Ok(Sign::Minus),
            other => Err(GaugeError::InvalidParameter(format!(
                "sign must be +1 or -1, got {}",
                other
            ))),
        }
    }
}

/// Periodic hypercubic lattice with precomputed plaquette tables.
#[derive(Debug, Clone)]
pub struct Lattice {
    /// Extent along each axis.
    shape: Vec<usize>,

    /// Row-major strides for site linearization.
    strides: Vec<usize>,

    /// Number of lattice sites.
    n_sites: usize,

    /// `hops[(site * D + axis) * 2]` is the forward neighbor, `+ 1` the backward one.
    hops: Vec<usize>,

    /// `pair_index[d1 * D + d2]` for `d1 != d2`, symmetric.
    pair_index: Vec<usize>,

    /// Number of unordered direction pairs, `D(D-1)/2`.
    n_pairs: usize,

    /// Plaquettes by `(site, pair)`.
    site_plaquettes: Vec<[usize; 4]>,

    /// Plaquettes by `(link, perpendicular slot, sign)`, `2(D-1)` per link.
    link_plaquettes: Vec<[usize; 4]>,
}

impl Lattice {
    /// Build the lattice and its plaquette tables.
    ///
    /// Requires at least two dimensions and an extent of at least 2 along
    /// every axis. With extent 1 the two plaquettes on either side of a link
    /// coincide and a plaquette meets the same link twice.
    pub fn new(shape: &[usize]) -> Result<Self> {
        let d = shape.len();
        if d < 2 {
            return Err(GaugeError::InvalidShape(format!(
                "need at least 2 dimensions, got {}",
                d
            )));
        }
        if let Some(axis) = shape.iter().position(|&l| l < 2) {
            return Err(GaugeError::InvalidShape(format!(
                "extent along axis {} must be at least 2, got {}",
                axis, shape[axis]
            )));
        }

        let n_sites = shape
            .iter()
            .try_fold(1usize, |acc, &l| acc.checked_mul(l))
            .ok_or_else(|| GaugeError::InvalidShape(format!("{:?} has too many sites", shape)))?;

        let mut strides = vec![1; d];
        for axis in (0..d - 1).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }

        let mut lattice = Self {
            shape: shape.to_vec(),
            strides,
            n_sites,
            hops: Vec::new(),
            pair_index: vec![usize::MAX; d * d],
            n_pairs: d * (d - 1) / 2,
            site_plaquettes: Vec::new(),
            link_plaquettes: Vec::new(),
        };

        let mut pair = 0;
        for lo in 0..d {
            for hi in (lo + 1)..d {
                lattice.pair_index[lo * d + hi] = pair;
                lattice.pair_index[hi * d + lo] = pair;
                pair += 1;
            }
        }

        lattice.hops = Vec::with_capacity(n_sites * d * 2);
        for site in 0..n_sites {
            for axis in 0..d {
                let forward = lattice.shift(site, axis, 1);
                let backward = lattice.shift(site, axis, -1);
                lattice.hops.push(forward);
                lattice.hops.push(backward);
            }
        }

        lattice.site_plaquettes = Vec::with_capacity(n_sites * lattice.n_pairs);
        for site in 0..n_sites {
            for lo in 0..d {
                for hi in (lo + 1)..d {
                    let plaq = [
                        site * d + lo,
                        lattice.neighbor(site, lo) * d + hi,
                        lattice.neighbor(site, hi) * d + lo,
                        site * d + hi,
                    ];
                    lattice.site_plaquettes.push(plaq);
                }
            }
        }

        lattice.link_plaquettes = Vec::with_capacity(n_sites * d * 2 * (d - 1));
        for site in 0..n_sites {
            for dir in 0..d {
                for perp in (0..d).filter(|&p| p != dir) {
                    for sign in Sign::BOTH {
                        let base = match sign {
                            Sign::Plus => site,
                            Sign::Minus => lattice.neighbor_back(site, perp),
                        };
                        let pair = lattice.pair_index[dir * d + perp];
                        let plaq = lattice.site_plaquettes[base * lattice.n_pairs + pair];
                        lattice.link_plaquettes.push(plaq);
                    }
                }
            }
        }

        debug!(
            ?shape,
            sites = n_sites,
            plaquettes = lattice.site_plaquettes.len(),
            "built plaquette tables"
        );

        Ok(lattice)
    }

    /// Extent along each axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions D.
    #[inline]
    pub fn num_dims(&self) -> usize {
        self.shape.len()
    }

    /// Number of lattice sites.
    #[inline]
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Number of links (D per site).
    #[inline]
    pub fn n_links(&self) -> usize {
        self.n_sites * self.num_dims()
    }

    /// Number of distinct plaquettes, `n_sites * D(D-1)/2`.
    #[inline]
    pub fn n_plaquettes(&self) -> usize {
        self.n_sites * self.n_pairs
    }

    /// Wrap a coordinate onto `0..shape[axis]`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    #[inline]
    pub fn wrap(&self, coord: isize, axis: usize) -> usize {
        coord.rem_euclid(self.shape[axis] as isize) as usize
    }

    /// Linear index of the site at `coords`.
    ///
    /// Coordinates must already lie inside the shape; use [`Lattice::wrap`]
    /// for periodic images.
    pub fn site_index(&self, coords: &[usize]) -> Result<usize> {
        if coords.len() != self.num_dims() {
            return Err(GaugeError::InvalidParameter(format!(
                "expected {} coordinates, got {}",
                self.num_dims(),
                coords.len()
            )));
        }
        let mut site = 0;
        for (axis, (&c, &l)) in coords.iter().zip(&self.shape).enumerate() {
            if c >= l {
                return Err(GaugeError::SiteOutOfBounds {
                    axis,
                    coord: c,
                    extent: l,
                });
            }
            site += c * self.strides[axis];
        }
        Ok(site)
    }

    /// Coordinates of a linear site index. `site` must be below `n_sites()`.
    pub fn site_coords(&self, site: usize) -> Vec<usize> {
        debug_assert!(site < self.n_sites, "site {} out of range", site);
        self.shape
            .iter()
            .zip(&self.strides)
            .map(|(&l, &stride)| (site / stride) % l)
            .collect()
    }

    /// Site reached by moving `step` sites along `axis`, with periodic BC.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= D`.
    pub fn shift(&self, site: usize, axis: usize, step: isize) -> usize {
        debug_assert!(site < self.n_sites, "site {} out of range", site);
        let stride = self.strides[axis];
        let c = (site / stride) % self.shape[axis];
        let wrapped = self.wrap(c as isize + step, axis);
        site - c * stride + wrapped * stride
    }

    /// Forward neighbor `n + μ`.
    ///
    /// Unchecked hot-path lookup: `site` and `mu` must be in range.
    #[inline]
    pub fn neighbor(&self, site: usize, mu: usize) -> usize {
        debug_assert!(mu < self.num_dims(), "direction {} out of range", mu);
        self.hops[(site * self.num_dims() + mu) * 2]
    }

    /// Backward neighbor `n - μ`. Same preconditions as [`Lattice::neighbor`].
    #[inline]
    pub fn neighbor_back(&self, site: usize, mu: usize) -> usize {
        debug_assert!(mu < self.num_dims(), "direction {} out of range", mu);
        self.hops[(site * self.num_dims() + mu) * 2 + 1]
    }

    /// Index of the link leaving `site` along `dir`.
    pub fn link_index(&self, site: usize, dir: usize) -> Result<usize> {
        self.check_site(site)?;
        if dir >= self.num_dims() {
            return Err(GaugeError::Dimension {
                d1: dir,
                d2: dir,
                num_dims: self.num_dims(),
                reason: "direction out of range",
            });
        }
        Ok(site * self.num_dims() + dir)
    }

    /// `(site, direction)` of a link index. `link` must be below `n_links()`.
    #[inline]
    pub fn link_site_dir(&self, link: usize) -> (usize, usize) {
        debug_assert!(link < self.n_links(), "link {} out of range", link);
        (link / self.num_dims(), link % self.num_dims())
    }

    /// The four links of the plaquette spanned by `d1` and `d2` at `site`.
    ///
    /// Swapping `d1` and `d2` returns the same quadruple.
    pub fn plaquette_links(&self, site: usize, d1: usize, d2: usize) -> Result<&[usize; 4]> {
        self.check_site(site)?;
        let pair = self.pair(d1, d2)?;
        Ok(&self.site_plaquettes[site * self.n_pairs + pair])
    }

    /// The plaquette containing `link` that extends along `perp` on the
    /// `sign` side.
    pub fn plaquette_links_for_link(
        &self,
        link: usize,
        perp: usize,
        sign: Sign,
    ) -> Result<&[usize; 4]> {
        self.check_link(link)?;
        let (_, dir) = self.link_site_dir(link);
        self.pair(dir, perp)?;
        let slot = if perp < dir { perp } else { perp - 1 };
        Ok(&self.link_plaquettes[link * 2 * (self.num_dims() - 1) + 2 * slot + sign.index()])
    }

    /// All `2(D-1)` plaquettes containing `link`, each exactly once.
    ///
    /// # Panics
    ///
    /// Panics if `link >= n_links()`.
    #[inline]
    pub fn link_plaquettes(&self, link: usize) -> &[[usize; 4]] {
        let per_link = 2 * (self.num_dims() - 1);
        &self.link_plaquettes[link * per_link..(link + 1) * per_link]
    }

    /// Every plaquette exactly once, ordered by site then direction pair.
    pub fn plaquettes(&self) -> &[[usize; 4]] {
        &self.site_plaquettes
    }

    pub(crate) fn check_link(&self, link: usize) -> Result<()> {
        if link < self.n_links() {
            Ok(())
        } else {
            Err(GaugeError::IndexOutOfBounds {
                index: link,
                len: self.n_links(),
            })
        }
    }

    fn check_site(&self, site: usize) -> Result<()> {
        if site < self.n_sites {
            Ok(())
        } else {
            Err(GaugeError::IndexOutOfBounds {
                index: site,
                len: self.n_sites,
            })
        }
    }

    fn pair(&self, d1: usize, d2: usize) -> Result<usize> {
        let d = self.num_dims();
        let reason = if d1 >= d || d2 >= d {
            "direction out of range"
        } else if d1 == d2 {
            "directions must differ"
        } else {
            return Ok(self.pair_index[d1 * d + d2]);
        };
        Err(GaugeError::Dimension {
            d1,
            d2,
            num_dims: d,
            reason,
        })
    }
}

//! Finite gauge groups defined by a multiplication table.
//!
//! Elements are the integers `0..N`. The table is validated once at
//! construction; afterwards every operation is a pure lookup.

use crate::error::{GaugeError, Result};

/// Finite group given by its Cayley table.
///
/// `table[a * N + b]` is the product `a·b`. Identity, inverses and
/// conjugacy classes are derived from the table when the group is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FiniteGroup {
    /// Group order N.
    size: usize,

    /// Row-major N×N multiplication table.
    table: Vec<usize>,

    /// The unique two-sided identity.
    identity: usize,

    /// `inverse[x]` is the unique `y` with `x·y = e`.
    inverse: Vec<usize>,

    /// Distinct conjugacy classes, each sorted, ordered by smallest member.
    classes: Vec<Vec<usize>>,

    /// `class_of[x]` indexes into `classes`.
    class_of: Vec<usize>,

    /// Optional human-readable element names.
    names: Option<Vec<String>>,
}

impl FiniteGroup {
    /// Build a group from an N×N table of integers in `0..N`.
    ///
    /// Fails with [`GaugeError::InvalidGroup`] if the table is not square,
    /// has out-of-range entries, lacks a unique identity or unique
    /// inverses, or is not associative.
    pub fn new(table: Vec<Vec<usize>>) -> Result<Self> {
        let n = table.len();
        if n == 0 {
            return Err(GaugeError::InvalidGroup("table is empty".into()));
        }
        for (i, row) in table.iter().enumerate() {
            if row.len() != n {
                return Err(GaugeError::InvalidGroup(format!(
                    "table must be square: row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            if let Some((j, &v)) = row.iter().enumerate().find(|&(_, &v)| v >= n) {
                return Err(GaugeError::InvalidGroup(format!(
                    "entry ({}, {}) = {} is outside 0..{}",
                    i, j, v, n
                )));
            }
        }

        let flat: Vec<usize> = table.into_iter().flatten().collect();
        let at = |a: usize, b: usize| flat[a * n + b];

        let identities: Vec<usize> = (0..n)
            .filter(|&e| (0..n).all(|x| at(e, x) == x && at(x, e) == x))
            .collect();
        let identity = match identities.as_slice() {
            [e] => *e,
            [] => return Err(GaugeError::InvalidGroup("no identity element".into())),
            many => {
                return Err(GaugeError::InvalidGroup(format!(
                    "identity is not unique: candidates {:?}",
                    many
                )));
            }
        };

        let mut inverse = Vec::with_capacity(n);
        for x in 0..n {
            let candidates: Vec<usize> = (0..n).filter(|&y| at(x, y) == identity).collect();
            let y = match candidates.as_slice() {
                [y] => *y,
                [] => {
                    return Err(GaugeError::InvalidGroup(format!(
                        "row {} has no inverse (identity {} never appears)",
                        x, identity
                    )));
                }
                _ => {
                    return Err(GaugeError::InvalidGroup(format!(
                        "row {} has several right inverses {:?}",
                        x, candidates
                    )));
                }
            };
            if at(y, x) != identity {
                return Err(GaugeError::InvalidGroup(format!(
                    "element {} has right inverse {} which is not a left inverse",
                    x, y
                )));
            }
            if let Some(z) = (0..n).find(|&z| at(y, at(x, z)) != z) {
                return Err(GaugeError::InvalidGroup(format!(
                    "element {} is not invertible: inv·({}·{}) != {}",
                    x, x, z, z
                )));
            }
            inverse.push(y);
        }

        for a in 0..n {
            for b in 0..n {
                let ab = at(a, b);
                for c in 0..n {
                    if at(ab, c) != at(a, at(b, c)) {
                        return Err(GaugeError::InvalidGroup(format!(
                            "table is not associative at ({}, {}, {})",
                            a, b, c
                        )));
                    }
                }
            }
        }

        let (classes, class_of) = conjugacy_classes(n, &flat, &inverse);

        Ok(Self {
            size: n,
            table: flat,
            identity,
            inverse,
            classes,
            class_of,
            names: None,
        })
    }

    /// Attach element names. `names[i]` names element `i`.
    pub fn with_names<S: Into<String>>(mut self, names: Vec<S>) -> Result<Self> {
        if names.len() != self.size {
            return Err(GaugeError::InvalidGroup(format!(
                "{} names given for a group of order {}",
                names.len(),
                self.size
            )));
        }
        self.names = Some(names.into_iter().map(Into::into).collect());
        Ok(self)
    }

    /// Cyclic group Z_N with `a·b = (a + b) mod N`.
    pub fn cyclic(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(GaugeError::InvalidGroup("Z_N requires N >= 1".into()));
        }
        let table = (0..n)
            .map(|i| (0..n).map(|j| (i + j) % n).collect())
            .collect();
        Self::new(table)?.with_names((0..n).map(|i| format!("(w{})^{}", n, i)).collect())
    }

    /// Klein four-group Z_2 × Z_2.
    pub fn klein() -> Self {
        let table = vec![
            vec![0, 1, 2, 3],
            vec![1, 0, 3, 2],
            vec![2, 3, 0, 1],
            vec![3, 2, 1, 0],
        ];
        // Static table, validated in tests.
        Self::new(table).unwrap_or_else(|e| unreachable!("Klein table: {e}"))
    }

    /// Quaternion group Q_8.
    ///
    /// Element numbering: 1→0, −1→1, i→2, −i→3, j→4, −j→5, k→6, −k→7.
    pub fn quaternion() -> Self {
        let table = vec![
            vec![0, 1, 2, 3, 4, 5, 6, 7],
            vec![1, 0, 3, 2, 5, 4, 7, 6],
            vec![2, 3, 1, 0, 6, 7, 5, 4],
            vec![3, 2, 0, 1, 7, 6, 4, 5],
            vec![4, 5, 7, 6, 1, 0, 2, 3],
            vec![5, 4, 6, 7, 0, 1, 3, 2],
            vec![6, 7, 4, 5, 3, 2, 1, 0],
            vec![7, 6, 5, 4, 2, 3, 0, 1],
        ];
        Self::new(table)
            .and_then(|g| g.with_names(vec!["1", "-1", "i", "-i", "j", "-j", "k", "-k"]))
            .unwrap_or_else(|e| unreachable!("quaternion table: {e}"))
    }

    /// Group order N.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The identity element.
    #[inline]
    pub fn identity(&self) -> usize {
        self.identity
    }

    /// Inverse of `x`.
    #[inline]
    pub fn inverse(&self, x: usize) -> usize {
        self.inverse[x]
    }

    /// Inverse lookup table.
    pub fn inverses(&self) -> &[usize] {
        &self.inverse
    }

    /// Product `a·b`.
    #[inline]
    pub fn mul(&self, a: usize, b: usize) -> usize {
        self.table[a * self.size + b]
    }

    /// Left-to-right product of a sequence of elements.
    ///
    /// An empty sequence gives the identity.
    pub fn multiply(&self, elements: &[usize]) -> usize {
        match elements.split_first() {
            Some((&first, rest)) => rest.iter().fold(first, |acc, &x| self.mul(acc, x)),
            None => self.identity,
        }
    }

    /// Net element of a plaquette: `a·b·c⁻¹·d⁻¹`.
    #[inline]
    pub fn plaquette_product(&self, a: usize, b: usize, c: usize, d: usize) -> usize {
        let ab = self.mul(a, b);
        let abc = self.mul(ab, self.inverse[c]);
        self.mul(abc, self.inverse[d])
    }

    /// Conjugacy class `{g·x·g⁻¹}` of `x`, sorted.
    pub fn conjugacy_class(&self, x: usize) -> &[usize] {
        &self.classes[self.class_of[x]]
    }

    /// All distinct conjugacy classes.
    pub fn conjugacy_classes(&self) -> &[Vec<usize>] {
        &self.classes
    }

    /// Check that `x` is an element of this group.
    pub fn check_element(&self, x: usize) -> Result<usize> {
        if x < self.size {
            Ok(x)
        } else {
            Err(GaugeError::ElementOutOfRange {
                element: x,
                size: self.size,
            })
        }
    }

    /// Name of element `x`, if names were attached.
    pub fn name(&self, x: usize) -> Option<&str> {
        self.names.as_ref().and_then(|n| n.get(x)).map(String::as_str)
    }

    /// Element carrying the given name.
    pub fn element_by_name(&self, name: &str) -> Option<usize> {
        self.names.as_ref()?.iter().position(|n| n == name)
    }

    /// Whether `a·b = b·a` for every pair.
    pub fn is_abelian(&self) -> bool {
        (0..self.size).all(|a| (a..self.size).all(|b| self.mul(a, b) == self.mul(b, a)))
    }
}

fn conjugacy_classes(
    n: usize,
    table: &[usize],
    inverse: &[usize],
) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut classes: Vec<Vec<usize>> = Vec::new();
    let mut class_of = vec![usize::MAX; n];
    for x in 0..n {
        if class_of[x] != usize::MAX {
            continue;
        }
        let mut class: Vec<usize> = (0..n)
            .map(|g| table[table[g * n + x] * n + inverse[g]])
            .collect();
        class.sort_unstable();
        class.dedup();
        for &y in &class {
            class_of[y] = classes.len();
        }
        classes.push(class);
    }
    (classes, class_of)
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_group() -> impl Strategy<Value = FiniteGroup> {
        prop_oneof![
            (1usize..12).prop_map(|n| FiniteGroup::cyclic(n).unwrap()),
            Just(FiniteGroup::klein()),
            Just(FiniteGroup::quaternion()),
        ]
    }

    proptest! {
        #[test]
        fn inverse_is_two_sided(g in arb_group()) {
            for x in 0..g.size() {
                prop_assert_eq!(g.multiply(&[x, g.inverse(x)]), g.identity());
                prop_assert_eq!(g.multiply(&[g.inverse(x), x]), g.identity());
            }
        }

        #[test]
        fn classes_partition_elements(g in arb_group()) {
            let mut seen = vec![0usize; g.size()];
            for class in g.conjugacy_classes() {
                for &x in class {
                    seen[x] += 1;
                }
            }
            prop_assert!(seen.iter().all(|&c| c == 1), "counts {:?}", seen);
        }

        #[test]
        fn plaquette_product_matches_fold(g in arb_group(), a in 0usize..8, b in 0usize..8, c in 0usize..8, d in 0usize..8) {
            let n = g.size();
            let (a, b, c, d) = (a % n, b % n, c % n, d % n);
            prop_assert_eq!(
                g.plaquette_product(a, b, c, d),
                g.multiply(&[a, b, g.inverse(c), g.inverse(d)])
            );
        }
    }
}

//! Plaquette action functions.
//!
//! An action maps the net group element of a plaquette to a real energy.
//! Built-ins cover the delta (Potts-like) and U(1)-cosine actions; any pure
//! closure can be injected with [`Action::custom`].

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::group::FiniteGroup;

/// Named built-in actions, selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// `0` at the identity, `1` for every other element.
    Delta,
    /// `1 - cos(2π a / N)`, the Z_N embedding of the U(1) Wilson action.
    U1Cosine,
}

/// Action function `group element → real`.
#[derive(Clone)]
pub enum Action {
    Builtin(ActionKind),
    Custom(Arc<dyn Fn(usize) -> f64 + Send + Sync>),
}

impl Action {
    pub fn delta() -> Self {
        Action::Builtin(ActionKind::Delta)
    }

    pub fn u1_cosine() -> Self {
        Action::Builtin(ActionKind::U1Cosine)
    }

    /// Wrap an arbitrary pure function of the group element.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize) -> f64 + Send + Sync + 'static,
    {
        Action::Custom(Arc::new(f))
    }

    /// Evaluate the action on element `g` of `group`.
    pub fn evaluate(&self, group: &FiniteGroup, g: usize) -> f64 {
        match self {
            Action::Builtin(ActionKind::Delta) => {
                if g == group.identity() {
                    0.0
                } else {
                    1.0
                }
            }
            Action::Builtin(ActionKind::U1Cosine) => {
                1.0 - (2.0 * PI * g as f64 / group.size() as f64).cos()
            }
            Action::Custom(f) => f(g),
        }
    }

    /// Tabulate the action over every element of `group`.
    pub fn tabulate(&self, group: &FiniteGroup) -> Vec<f64> {
        (0..group.size()).map(|g| self.evaluate(group, g)).collect()
    }
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        Action::Builtin(kind)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Builtin(kind) => f.debug_tuple("Builtin").field(kind).finish(),
            Action::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

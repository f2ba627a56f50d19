use crate::error::{DiffError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Finite-difference stencil used to approximate f'(x).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Method {
    /// (f(x+h) - f(x)) / h
    #[default]
    Forward,
    /// (f(x) - f(x-h)) / h
    Backward,
    /// (f(x+h) - f(x-h)) / 2h
    Central,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Forward, Method::Backward, Method::Central];

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(DiffError::InvalidMethodIndex(index))
    }

    pub fn index(self) -> usize {
        match self {
            Method::Forward => 0,
            Method::Backward => 1,
            Method::Central => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Forward => "Forward",
            Method::Backward => "Backward",
            Method::Central => "Central",
        }
    }

    /// Order of accuracy p, where the truncation error is O(h^p).
    pub fn order(self) -> u32 {
        match self {
            Method::Forward | Method::Backward => 1,
            Method::Central => 2,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Method::Forward => {
                "Uses the point ahead (x + h) to approximate the derivative. First-order accuracy O(h)."
            }
            Method::Backward => {
                "Uses the point behind (x - h) to approximate the derivative. First-order accuracy O(h)."
            }
            Method::Central => {
                "Uses the points on both sides of x for better accuracy. Second-order accuracy O(h²)."
            }
        }
    }

    /// Sample offsets in units of h, in ascending order.
    pub fn stencil_offsets(self) -> &'static [f64] {
        match self {
            Method::Forward => &[0.0, 1.0],
            Method::Backward => &[-1.0, 0.0],
            Method::Central => &[-1.0, 0.0, 1.0],
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DiffError::UnknownMethod(trimmed.to_string()))
    }
}

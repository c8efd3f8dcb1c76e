//! Numeric families for capacities, flows and costs.
//!
//! Exactly two families exist, integral (`i64`) and real (`f64`). The family
//! is fixed by the type parameter of a network, so it is resolved once at
//! compile time and never re-tested inside solver loops.

mod magnitude;

pub use magnitude::{huge_capacity, huge_cost, vertex_max_demand, vertex_max_supply};

use std::fmt::{Debug, Display};

use num_bigint::BigInt;
use num_traits::{Num, NumCast, Signed, ToPrimitive};

use crate::FlowError;

/// Slack accepted by `set_flow` on real-valued networks.
pub const FLOW_EPSILON: f64 = 1e-4;
/// Residual capacity below this is treated as saturated when deriving cuts.
pub const CUT_EPSILON: f64 = 1e-5;
/// Allowed imbalance of a real-valued supply vector.
pub const SUPPLY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericFamily {
    Integral,
    Real,
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i64 {}
    impl Sealed for f64 {}
}

pub trait FlowValue:
    Num + Signed + NumCast + Copy + PartialOrd + Debug + Display + Send + Sync + 'static + sealed::Sealed
{
    const FAMILY: NumericFamily;

    /// The comparison slack for this family: `epsilon` for reals, zero for
    /// integers.
    fn tolerance(epsilon: f64) -> Self;

    /// Sums `values`, failing with [`FlowError::Overflow`] when the total is
    /// not representable in this family.
    fn checked_sum<I>(values: I, what: &'static str) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = Self>;

    fn add_checked(self, other: Self, what: &'static str) -> Result<Self, FlowError> {
        Self::checked_sum([self, other], what)
    }

    fn mul_checked(self, other: Self, what: &'static str) -> Result<Self, FlowError>;

    fn as_f64(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }

    fn min_of(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }

    fn max_of(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }
}

impl FlowValue for i64 {
    const FAMILY: NumericFamily = NumericFamily::Integral;

    fn tolerance(_epsilon: f64) -> Self {
        0
    }

    fn checked_sum<I>(values: I, what: &'static str) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = Self>,
    {
        let total = values
            .into_iter()
            .fold(BigInt::from(0), |acc, value| acc + BigInt::from(value));
        total.to_i64().ok_or(FlowError::Overflow(what))
    }

    fn add_checked(self, other: Self, what: &'static str) -> Result<Self, FlowError> {
        self.checked_add(other).ok_or(FlowError::Overflow(what))
    }

    fn mul_checked(self, other: Self, what: &'static str) -> Result<Self, FlowError> {
        self.checked_mul(other).ok_or(FlowError::Overflow(what))
    }
}

impl FlowValue for f64 {
    const FAMILY: NumericFamily = NumericFamily::Real;

    fn tolerance(epsilon: f64) -> Self {
        epsilon
    }

    fn checked_sum<I>(values: I, what: &'static str) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = Self>,
    {
        let total: f64 = values.into_iter().sum();
        if total.is_finite() {
            Ok(total)
        } else {
            Err(FlowError::Overflow(what))
        }
    }

    fn mul_checked(self, other: Self, what: &'static str) -> Result<Self, FlowError> {
        let product = self * other;
        if product.is_finite() {
            Ok(product)
        } else {
            Err(FlowError::Overflow(what))
        }
    }
}

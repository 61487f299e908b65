//! Lattice trait for the local dataflow analyses.
//!
//! Both analyses the hoisting decision needs are *may* analyses over sets of locals, so the
//! only operation the solver requires is a meet that combines the facts of two merging paths.

use std::fmt::Debug;

use crate::utils::BitSet;

/// A meet semi-lattice with a meet (greatest lower bound) operation.
///
/// The meet operation combines information from multiple control flow paths.
/// It must satisfy:
///
/// - **Idempotent**: `x.meet(x) = x`
/// - **Commutative**: `x.meet(y) = y.meet(x)`
/// - **Associative**: `x.meet(y.meet(z)) = (x.meet(y)).meet(z)`
pub trait MeetSemiLattice: Clone + Debug + PartialEq {
    /// Computes the meet of two lattice elements.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;
}

impl MeetSemiLattice for BitSet {
    /// Meet is union: a fact holds if it holds on any path.
    fn meet(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.union_with(other);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitset_meet_is_union() {
        let mut a = BitSet::new(3);
        let mut b = BitSet::new(3);
        a.insert(0);
        b.insert(2);
        let m = a.meet(&b);
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(m.meet(&m), m);
    }
}

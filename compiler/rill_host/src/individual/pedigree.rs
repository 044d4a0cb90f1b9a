//! Pedigree IDs and the relatedness coefficient computed from them.

/// Marks an ancestor that is not known (founders and their parents).
pub(crate) const UNKNOWN: i64 = -1;

/// An individual's ID with those of its parents and grandparents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pedigree {
    pub id: i64,
    pub parents: [i64; 2],
    /// Parent 1's parents, then parent 2's parents.
    pub grandparents: [i64; 4],
}

impl Pedigree {
    /// An individual with no known ancestry.
    pub fn founder(id: i64) -> Self {
        Pedigree {
            id,
            parents: [UNKNOWN; 2],
            grandparents: [UNKNOWN; 4],
        }
    }

    pub fn offspring(id: i64, parent1: &Pedigree, parent2: &Pedigree) -> Self {
        Pedigree {
            id,
            parents: [parent1.id, parent2.id],
            grandparents: [
                parent1.parents[0],
                parent1.parents[1],
                parent2.parents[0],
                parent2.parents[1],
            ],
        }
    }

    fn contains(&self, id: i64) -> bool {
        id != UNKNOWN
            && (self.id == id || self.parents.contains(&id) || self.grandparents.contains(&id))
    }

    /// The pedigree of one parent, as far as this record knows it.
    fn parent(&self, side: usize) -> Pedigree {
        Pedigree {
            id: self.parents[side],
            parents: [self.grandparents[2 * side], self.grandparents[2 * side + 1]],
            grandparents: [UNKNOWN; 4],
        }
    }

    /// Coefficient of relatedness over the recorded ancestry: 1.0 for the
    /// same individual, 0.5 for parent and offspring or full siblings, and
    /// 0.0 when no shared ancestor is recorded.
    pub fn relatedness(&self, other: &Pedigree) -> f64 {
        if self.id == UNKNOWN || other.id == UNKNOWN {
            return 0.0;
        }
        if self.id == other.id {
            return 1.0;
        }
        // Walk up whichever side contains the other; each step halves.
        if other.contains(self.id) {
            (self.relatedness(&other.parent(0)) + self.relatedness(&other.parent(1))) / 2.0
        } else {
            (self.parent(0).relatedness(other) + self.parent(1).relatedness(other)) / 2.0
        }
    }
}

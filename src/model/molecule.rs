use super::atom::Atom;
use super::types::{BondOrder, BondStereo, Dimension};

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
    pub order: BondOrder,
    pub stereo: BondStereo,
}

impl Bond {
    /// Stores the smaller atom index first; the wedge/hash flags describe
    /// the bond as drawn from `i`.
    pub fn new(idx1: usize, idx2: usize, order: BondOrder) -> Self {
        let (i, j) = if idx1 <= idx2 { (idx1, idx2) } else { (idx2, idx1) };
        Self {
            i,
            j,
            order,
            stereo: BondStereo::None,
        }
    }

    pub fn with_stereo(idx1: usize, idx2: usize, order: BondOrder, stereo: BondStereo) -> Self {
        Self {
            stereo,
            ..Self::new(idx1, idx2, order)
        }
    }
}

/// SD-file data item: a named free-form value attached to a molecule.
/// Names need not be unique; order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub value: String,
}

impl Annotation {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One chemical structure record. Bonds reference atoms by 0-based position
/// in `atoms`; wire-format indices are 1-based and converted at the I/O
/// boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    pub title: String,
    pub comment: Option<String>,
    pub dimension: Dimension,
    /// Chirality flag from the V3000 COUNTS line.
    pub chiral: bool,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub annotations: Vec<Annotation>,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// First annotation with the given name, if any.
    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bond_orders_endpoints() {
        let b = Bond::new(4, 1, BondOrder::Double);
        assert_eq!((b.i, b.j), (1, 4));
        assert_eq!(b.stereo, BondStereo::None);
    }

    #[test]
    fn duplicate_annotations_are_kept_in_order() {
        let mut mol = Molecule::new();
        mol.annotations.push(Annotation::new("ID", "first"));
        mol.annotations.push(Annotation::new("ID", "second"));
        assert_eq!(mol.annotation("ID"), Some("first"));
        assert_eq!(mol.annotations.len(), 2);
    }
}

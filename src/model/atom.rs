use super::types::{AtomParity, Element};

#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    pub position: [f64; 3],
    /// Formal charge, canonical range -3..=3.
    pub formal_charge: i8,
    /// Isotope mass number; 0 means natural abundance.
    pub isotope: u16,
    /// Spin multiplicity: 0 none, 2 radical, 3 carbene-like.
    pub spin: u8,
    pub parity: AtomParity,
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self {
            element,
            position,
            formal_charge: 0,
            isotope: 0,
            spin: 0,
            parity: AtomParity::None,
        }
    }
}

//! A pure Rust reader and writer for the MDL Molfile chemical structure
//! format, covering the fixed-column V2000 connection table, the
//! block-structured V3000 connection table, and the SD-file multi-record
//! container with its `$$$$`-delimited data items.
//!
//! # Features
//!
//! - **Both connection tables** — V2000 and V3000 are read transparently
//!   (the counts line decides) and written either explicitly or by the
//!   999-atom/bond auto-selection rule
//! - **Full per-atom state** — element, coordinates, formal charge
//!   (including the V2000 charge-code table and `M  CHG` overrides),
//!   isotopes, spin multiplicity, and stereo parity
//! - **SD data items** — order-preserving molecule-level annotations with
//!   duplicate names allowed
//! - **Streaming** — records are parsed one at a time from any `BufRead`;
//!   [`skip`] fast-forwards over records without materializing them
//!
//! # Quick Start
//!
//! ```
//! use mdlmol::{read, Dimension, Element};
//! use std::io::Cursor;
//!
//! let data = "Methane\n  Tester 2D\n\n  1  0  0  0  0  0  0  0  0  0  1\n    0.0000    0.0000    0.0000 C   0  0\nM  END\n>  <MW>\n16.04\n\n$$$$\n";
//! let mut input = Cursor::new(data);
//!
//! let mol = read(&mut input)?.expect("one record");
//! assert_eq!(mol.title, "Methane");
//! assert_eq!(mol.dimension, Dimension::TwoD);
//! assert_eq!(mol.atoms[0].element, Element::C);
//! assert_eq!(mol.annotation("MW"), Some("16.04"));
//!
//! // A second call picks up the next record; here the stream is done.
//! assert!(read(&mut input)?.is_none());
//! # Ok::<(), mdlmol::Error>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — the molecular graph handed to and from the codec
//! - [`io`] — the Molfile/SD codec itself ([`read`], [`write`], [`skip`])
//!
//! Failures are per record and surfaced through [`Error`]; numeric fields
//! degrade to zero the way legacy tooling expects, while structural
//! problems (truncated records, unbalanced V3000 blocks, unresolvable
//! bond indices) fail hard.

pub mod io;
pub mod model;

pub use model::atom::Atom;
pub use model::molecule::{Annotation, Bond, Molecule};
pub use model::types::{
    AtomParity, BondOrder, BondStereo, Dimension, Element, ParseElementError,
};

pub use io::error::Error;
pub use io::mdl::{read, read_all, skip, write, MolVersion, SkipOutcome, WriteOptions};

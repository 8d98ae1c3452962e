use super::v3000;
use super::{MolVersion, WriteOptions};
use crate::io::{error::Error, util};
use crate::model::{
    molecule::{Bond, Molecule},
    types::{BondStereo, Dimension},
};
use chrono::Local;
use log::error;
use std::io::Write;

/// V2000 fixed-width fields hold at most three digits.
const V2000_LIMIT: usize = 999;

/// Writes one record: header, V2000 or V3000 body, `M  END`, SD data
/// items, and the `$$$$` terminator unless this is the last record of the
/// stream. The sub-format comes from `options.version`, with `Auto`
/// falling back to V3000 only when a count exceeds the V2000 field width.
pub fn write<W: Write>(writer: &mut W, mol: &Molecule, options: &WriteOptions) -> Result<(), Error> {
    writeln!(writer, "{}", mol.title)?;
    // Program tag padded to 10 columns plus the 10-char MMDDYYHHmm stamp
    // puts the dimensionality tag at columns 20..22, where readers look.
    writeln!(
        writer,
        "{:>10}{}{}",
        "mdlmol",
        Local::now().format("%m%d%y%H%M"),
        mol.dimension.as_str()
    )?;
    match &mol.comment {
        Some(comment) => writeln!(writer, "{comment}")?,
        None => writeln!(writer)?,
    }

    let oversized = mol.atom_count() > V2000_LIMIT || mol.bond_count() > V2000_LIMIT;
    let use_v3000 = match options.version {
        MolVersion::V3000 => true,
        MolVersion::V2000 => false,
        MolVersion::Auto => oversized,
    };

    if use_v3000 {
        v3000::write_body(writer, mol)?;
    } else {
        if oversized {
            if mol.atom_count() > V2000_LIMIT {
                error!(
                    "molfile conversion failed: {} atoms exceeds the V2000 limit of {V2000_LIMIT}",
                    mol.atom_count()
                );
            }
            if mol.bond_count() > V2000_LIMIT {
                error!(
                    "molfile conversion failed: {} bonds exceeds the V2000 limit of {V2000_LIMIT}",
                    mol.bond_count()
                );
            }
            return Err(Error::RecordTooLarge {
                atoms: mol.atom_count(),
                bonds: mol.bond_count(),
            });
        }
        write_v2000_body(writer, mol)?;
    }

    writeln!(writer, "M  END")?;

    for annotation in &mol.annotations {
        writeln!(writer, ">  <{}>", annotation.name)?;
        writeln!(writer, "{}", annotation.value)?;
        writeln!(writer)?;
    }

    if !options.last_record {
        writeln!(writer, "$$$$")?;
    }
    Ok(())
}

/// Bonds in canonical emission order: ascending begin index (each bond
/// already stores its smaller endpoint first), insertion order within an
/// atom. This reproduces a neighbor-list traversal of the molecule.
pub(crate) fn sorted_bonds(mol: &Molecule) -> Vec<&Bond> {
    let mut bonds: Vec<&Bond> = mol.bonds.iter().collect();
    bonds.sort_by_key(|b| b.i);
    bonds
}

fn write_v2000_body<W: Write>(writer: &mut W, mol: &Molecule) -> Result<(), Error> {
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0  1",
        mol.atom_count(),
        mol.bond_count()
    )?;

    for atom in &mol.atoms {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3}{:>2}{:>3}{:>3}{:>3}{:>3}",
            atom.position[0],
            atom.position[1],
            atom.position[2],
            atom.element.symbol(),
            0,
            util::charge_to_code(atom.formal_charge),
            0,
            0,
            0
        )?;
    }

    // 3D wedge/hash flags are drawing artifacts and are not serialized.
    let twod = mol.dimension == Dimension::TwoD;
    for bond in sorted_bonds(mol) {
        let stereo = if twod {
            match bond.stereo {
                BondStereo::Wedge => 1,
                BondStereo::Hash => 6,
                _ => 0,
            }
        } else {
            0
        };
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}{:>3}{:>3}{:>3}",
            bond.i + 1,
            bond.j + 1,
            util::bond_order_to_ctfile(bond.order),
            stereo,
            0,
            0
        )?;
    }

    let radicals: Vec<(usize, u8)> = mol
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.spin != 0)
        .map(|(i, a)| (i + 1, a.spin))
        .collect();
    if !radicals.is_empty() {
        write!(writer, "M  RAD{:>3} ", radicals.len())?;
        for (index, spin) in &radicals {
            write!(writer, "{:>3} {:>3} ", index, spin)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mdl::reader::read;
    use crate::model::{
        atom::Atom,
        molecule::Annotation,
        types::{BondOrder, Element},
    };
    use std::io::Cursor;

    fn roundtrip(mol: &Molecule, options: &WriteOptions) -> Molecule {
        let mut buf = Vec::new();
        write(&mut buf, mol, options).expect("write record");
        read(&mut Cursor::new(buf)).expect("read record").expect("one record")
    }

    fn water_2d() -> Molecule {
        let mut mol = Molecule {
            title: "Water".to_string(),
            dimension: Dimension::TwoD,
            ..Molecule::default()
        };
        mol.atoms.push(Atom::new(Element::O, [0.0, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [0.9572, 0.0, 0.0]));
        mol.atoms.push(Atom::new(Element::H, [-0.24, 0.9266, 0.0]));
        mol.bonds.push(Bond::new(0, 1, BondOrder::Single));
        mol.bonds.push(Bond::new(0, 2, BondOrder::Single));
        mol
    }

    #[test]
    fn v2000_roundtrip_preserves_structure() {
        let mut mol = water_2d();
        mol.atoms[0].formal_charge = -1;
        mol.atoms[1].spin = 2;
        mol.bonds[0].stereo = BondStereo::Wedge;
        mol.annotations.push(Annotation::new("MW", "18.02"));

        let back = roundtrip(&mol, &WriteOptions::default());

        assert_eq!(back.title, "Water");
        assert_eq!(back.dimension, Dimension::TwoD);
        assert_eq!(back.atom_count(), 3);
        assert_eq!(back.bond_count(), 2);
        for (a, b) in mol.atoms.iter().zip(back.atoms.iter()) {
            assert_eq!(a.element, b.element);
            assert_eq!(a.formal_charge, b.formal_charge);
            assert_eq!(a.spin, b.spin);
            for k in 0..3 {
                assert!((a.position[k] - b.position[k]).abs() < 1e-4);
            }
        }
        assert_eq!(back.bonds[0].stereo, BondStereo::Wedge);
        assert_eq!(back.annotation("MW"), Some("18.02"));
    }

    #[test]
    fn stereo_is_dropped_without_2d_tag() {
        let mut mol = water_2d();
        mol.dimension = Dimension::ThreeD;
        mol.bonds[0].stereo = BondStereo::Wedge;
        let back = roundtrip(&mol, &WriteOptions::default());
        assert_eq!(back.bonds[0].stereo, BondStereo::None);
    }

    #[test]
    fn charge_codes_roundtrip_across_range() {
        let mut mol = Molecule {
            title: "charges".to_string(),
            ..Molecule::default()
        };
        for (k, charge) in (-3..=3i8).enumerate() {
            let mut atom = Atom::new(Element::N, [k as f64, 0.0, 0.0]);
            atom.formal_charge = charge;
            mol.atoms.push(atom);
        }
        let back = roundtrip(&mol, &WriteOptions::default());
        let charges: Vec<i8> = back.atoms.iter().map(|a| a.formal_charge).collect();
        assert_eq!(charges, vec![-3, -2, -1, 0, 1, 2, 3]);
    }

    #[test]
    fn bonds_are_emitted_in_traversal_order() {
        let mut mol = water_2d();
        // Reverse the declaration order; output must still start at atom 1.
        mol.bonds.reverse();
        let mut buf = Vec::new();
        write(&mut buf, &mol, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let bond_lines: Vec<&str> = text
            .lines()
            .skip(4 + mol.atom_count())
            .take(2)
            .collect();
        assert_eq!(bond_lines[0], "  1  3  1  0  0  0");
        assert_eq!(bond_lines[1], "  1  2  1  0  0  0");
    }

    #[test]
    fn thousand_atoms_selects_v3000() {
        let mut mol = Molecule {
            title: "big".to_string(),
            ..Molecule::default()
        };
        for i in 0..1000 {
            mol.atoms.push(Atom::new(Element::C, [i as f64, 0.0, 0.0]));
        }
        let mut buf = Vec::new();
        write(&mut buf, &mol, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("999 V3000"));
        assert!(text.contains("M  V30 COUNTS 1000 0 0 0 0 0"));

        let back = read(&mut Cursor::new(text)).unwrap().unwrap();
        assert_eq!(back.atom_count(), 1000);
    }

    #[test]
    fn under_threshold_stays_v2000() {
        let mut mol = Molecule {
            title: "medium".to_string(),
            ..Molecule::default()
        };
        for i in 0..999 {
            mol.atoms.push(Atom::new(Element::C, [i as f64, 0.0, 0.0]));
        }
        let mut buf = Vec::new();
        write(&mut buf, &mol, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("V3000"));
        assert!(text.lines().nth(3).unwrap().starts_with("999  0"));
    }

    #[test]
    fn forcing_v2000_on_oversized_record_fails() {
        let mut mol = Molecule::default();
        for i in 0..1000 {
            mol.atoms.push(Atom::new(Element::C, [i as f64, 0.0, 0.0]));
        }
        let options = WriteOptions {
            version: MolVersion::V2000,
            ..WriteOptions::default()
        };
        let err = write(&mut Vec::new(), &mol, &options).unwrap_err();
        assert!(matches!(err, Error::RecordTooLarge { atoms: 1000, .. }));
    }

    #[test]
    fn forcing_v3000_on_small_record() {
        let mol = water_2d();
        let options = WriteOptions {
            version: MolVersion::V3000,
            ..WriteOptions::default()
        };
        let mut buf = Vec::new();
        write(&mut buf, &mol, &options).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("M  V30 BEGIN CTAB"));

        let back = read(&mut Cursor::new(text)).unwrap().unwrap();
        assert_eq!(back.atom_count(), 3);
        assert_eq!(back.bond_count(), 2);
    }

    #[test]
    fn v3000_roundtrip_preserves_charge_isotope_spin() {
        let mut mol = water_2d();
        mol.atoms[0].formal_charge = -2;
        mol.atoms[0].isotope = 18;
        mol.atoms[2].spin = 3;
        mol.chiral = true;
        let options = WriteOptions {
            version: MolVersion::V3000,
            ..WriteOptions::default()
        };
        let mut buf = Vec::new();
        write(&mut buf, &mol, &options).unwrap();
        let back = read(&mut Cursor::new(buf)).unwrap().unwrap();

        assert!(back.chiral);
        assert_eq!(back.atoms[0].formal_charge, -2);
        assert_eq!(back.atoms[0].isotope, 18);
        assert_eq!(back.atoms[2].spin, 3);
    }

    #[test]
    fn last_record_omits_terminator() {
        let mol = water_2d();
        let options = WriteOptions {
            last_record: true,
            ..WriteOptions::default()
        };
        let mut buf = Vec::new();
        write(&mut buf, &mol, &options).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("$$$$"));
        assert!(text.trim_end().ends_with("M  END"));
    }

    #[test]
    fn radical_line_lists_every_spin_carrier() {
        let mut mol = water_2d();
        mol.atoms[1].spin = 2;
        mol.atoms[2].spin = 3;
        let mut buf = Vec::new();
        write(&mut buf, &mol, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("M  RAD  2   2   2   3   3 "));
    }

    #[test]
    fn creator_line_carries_dimension_at_column_20() {
        let mol = water_2d();
        let mut buf = Vec::new();
        write(&mut buf, &mol, &WriteOptions::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let creator = text.lines().nth(1).unwrap();
        assert_eq!(&creator[20..22], "2D");
    }
}

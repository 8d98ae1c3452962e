//! V3000 connection-table blocks: `M V30`-prefixed logical lines with
//! trailing-`-` continuation, a recursive `BEGIN`/`END` structure, and
//! `KEY=VALUE` property tokens. Atom indices in the file are arbitrary and
//! are remapped to sequential record positions while the block is read.

use super::reader::LineCursor;
use super::writer::sorted_bonds;
use crate::io::{error::Error, util};
use crate::model::{
    atom::Atom,
    molecule::{Bond, Molecule},
    types::{AtomParity, BondStereo},
};
use std::collections::HashMap;
use std::io::{BufRead, Write};

fn token<'a>(tokens: &'a [String], i: usize) -> &'a str {
    tokens.get(i).map(String::as_str).unwrap_or("")
}

/// One logical line as a token list, with the `M V30` prefix verified.
/// A physical line ending in `-` continues on the next one, whose own
/// prefix is stripped before its tokens are appended; the result tokenizes
/// exactly like the unsplit line would.
fn read_logical_line<R: BufRead>(cursor: &mut LineCursor<R>) -> Result<Vec<String>, Error> {
    let line = cursor.next_line()?.ok_or(Error::PrematureEndOfStream {
        line: cursor.line_no(),
    })?;
    parse_physical(cursor, &line)
}

fn parse_physical<R: BufRead>(
    cursor: &mut LineCursor<R>,
    line: &str,
) -> Result<Vec<String>, Error> {
    let trimmed = line.trim_end();
    let (body, continued) = match trimmed.strip_suffix('-') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    let mut tokens: Vec<String> = body.split_whitespace().map(str::to_string).collect();
    if token(&tokens, 0) != "M" || token(&tokens, 1) != "V30" {
        return Err(Error::v3000(
            cursor.line_no(),
            "line does not start with 'M V30'",
        ));
    }

    if continued {
        let next = cursor
            .next_line()?
            .ok_or_else(|| Error::v3000(cursor.line_no(), "stream ended inside a continuation"))?;
        let continuation = parse_physical(cursor, &next)?;
        tokens.extend(continuation.into_iter().skip(2));
    }
    Ok(tokens)
}

/// Parses the CTAB block that follows a `V3000` counts line. Atom and bond
/// sub-blocks are dispatched by name; unknown block names are skipped for
/// forward compatibility and `LINKNODE` lines are recognized but ignored.
pub(crate) fn read_body<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
) -> Result<(), Error> {
    // File-local atom index -> 1-based record index, scoped to this call.
    let mut index_map: HashMap<i32, usize> = HashMap::new();

    let opening = read_logical_line(cursor)?;
    if token(&opening, 2) != "BEGIN" || token(&opening, 3) != "CTAB" {
        return Err(Error::block(cursor.line_no(), "expected BEGIN CTAB"));
    }

    let counts = read_logical_line(cursor)?;
    if token(&counts, 2) != "COUNTS" {
        return Err(Error::block(
            cursor.line_no(),
            "expected COUNTS after BEGIN CTAB",
        ));
    }
    let natoms = util::atoi(token(&counts, 3)).max(0) as usize;
    // Bond, S-group and 3D-constraint counts are parsed but not needed for
    // block-delimited reading.
    let _nbonds = util::atoi(token(&counts, 4));
    mol.chiral = util::atoi(token(&counts, 7)) != 0;
    mol.atoms.reserve(natoms);

    loop {
        let tokens = read_logical_line(cursor)?;
        match (token(&tokens, 2), token(&tokens, 3)) {
            ("END", "CTAB") => break,
            ("END", _) => {
                return Err(Error::block(
                    cursor.line_no(),
                    "END does not match an open block",
                ));
            }
            ("LINKNODE", _) => continue,
            ("BEGIN", "ATOM") => read_atom_block(cursor, mol, &mut index_map)?,
            ("BEGIN", "BOND") => read_bond_block(cursor, mol, &index_map)?,
            ("BEGIN", name) if !name.is_empty() => {
                let name = name.to_string();
                skip_block(cursor, &name)?;
            }
            _ => {
                return Err(Error::block(
                    cursor.line_no(),
                    format!("unexpected '{}' inside CTAB", token(&tokens, 2)),
                ));
            }
        }
    }
    Ok(())
}

/// Consumes an unimplemented block (SGROUP, COLLECTION, RGROUP, 3D, ...)
/// through its matching END, recursing into any nested blocks.
fn skip_block<R: BufRead>(cursor: &mut LineCursor<R>, name: &str) -> Result<(), Error> {
    loop {
        let tokens = read_logical_line(cursor)?;
        match (token(&tokens, 2), token(&tokens, 3)) {
            ("END", n) if n == name => return Ok(()),
            ("END", _) => {
                return Err(Error::block(
                    cursor.line_no(),
                    format!("END does not close '{name}'"),
                ));
            }
            ("BEGIN", inner) if !inner.is_empty() => {
                let inner = inner.to_string();
                skip_block(cursor, &inner)?;
            }
            _ => {}
        }
    }
}

fn read_atom_block<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
    index_map: &mut HashMap<i32, usize>,
) -> Result<(), Error> {
    loop {
        let tokens = read_logical_line(cursor)?;
        if token(&tokens, 2) == "END" {
            if token(&tokens, 3) != "ATOM" {
                return Err(Error::block(cursor.line_no(), "END does not close ATOM"));
            }
            return Ok(());
        }

        if tokens.len() < 8 {
            return Err(Error::v3000(
                cursor.line_no(),
                "atom line needs index, symbol, coordinates and mapping fields",
            ));
        }
        let file_index = util::atoi(&tokens[2]);
        let element = util::element_from_symbol(&tokens[3]).ok_or_else(|| {
            Error::atom(
                cursor.line_no(),
                format!("unknown element symbol '{}'", tokens[3]),
            )
        })?;
        let x = util::atof(&tokens[4]);
        let y = util::atof(&tokens[5]);
        let z = util::atof(&tokens[6]);
        // tokens[7] is the atom-atom mapping number, not used here.

        let mut atom = Atom::new(element, [x, y, z]);
        for kv in &tokens[8..] {
            let (key, value) = kv.split_once('=').ok_or_else(|| Error::MalformedKeyValue {
                line: cursor.line_no(),
                token: kv.clone(),
            })?;
            let val = util::atoi(value);
            match key {
                // V3000 charges are literal signed values, unlike V2000 codes.
                "CHG" => atom.formal_charge = val.clamp(-128, 127) as i8,
                "RAD" => atom.spin = val.clamp(0, u8::MAX as i32) as u8,
                "CFG" => {
                    atom.parity = match val {
                        1 => AtomParity::AntiClockwise,
                        2 => AtomParity::Clockwise,
                        _ => AtomParity::None,
                    }
                }
                "MASS" => {
                    if val > 0 {
                        atom.isotope = val.min(u16::MAX as i32) as u16;
                    }
                }
                // Abnormal valence is recognized but not applied.
                "VAL" => {}
                _ => {}
            }
        }

        index_map.insert(file_index, mol.atoms.len() + 1);
        mol.atoms.push(atom);
    }
}

fn read_bond_block<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
    index_map: &HashMap<i32, usize>,
) -> Result<(), Error> {
    loop {
        let tokens = read_logical_line(cursor)?;
        if token(&tokens, 2) == "END" {
            if token(&tokens, 3) != "BOND" {
                return Err(Error::block(cursor.line_no(), "END does not close BOND"));
            }
            return Ok(());
        }

        if tokens.len() < 6 {
            return Err(Error::v3000(
                cursor.line_no(),
                "bond line needs index, order and two atom indices",
            ));
        }
        let order_code = util::atoi(&tokens[3]);
        let order = util::bond_order_from_ctfile(order_code).ok_or_else(|| {
            Error::bond(
                cursor.line_no(),
                format!("unsupported bond order code {order_code}"),
            )
        })?;

        // Unknown file indices map to 0 and fail resolution below.
        let begin = index_map
            .get(&util::atoi(&tokens[4]))
            .copied()
            .unwrap_or(0);
        let end = index_map.get(&util::atoi(&tokens[5])).copied().unwrap_or(0);

        let mut stereo = BondStereo::None;
        for kv in &tokens[6..] {
            let (key, value) = kv.split_once('=').ok_or_else(|| Error::MalformedKeyValue {
                line: cursor.line_no(),
                token: kv.clone(),
            })?;
            if key == "CFG" {
                stereo = match util::atoi(value) {
                    1 => BondStereo::TorsionUp,
                    3 => BondStereo::TorsionDown,
                    _ => stereo,
                };
            }
        }

        let (i, j) = super::reader::resolve_pair(
            begin as i32,
            end as i32,
            mol.atom_count(),
            cursor.line_no(),
        )?;
        mol.bonds.push(Bond::with_stereo(i, j, order, stereo));
    }
}

/// Emits the V3000 rendition of the record body: the `999 V3000` counts
/// line followed by the CTAB block. Lines stay short, so continuations are
/// never produced.
pub(crate) fn write_body<W: Write>(writer: &mut W, mol: &Molecule) -> Result<(), Error> {
    writeln!(writer, "  0  0  0     0  0            999 V3000")?;
    writeln!(writer, "M  V30 BEGIN CTAB")?;
    writeln!(
        writer,
        "M  V30 COUNTS {} {} 0 0 {} 0",
        mol.atom_count(),
        mol.bond_count(),
        i32::from(mol.chiral)
    )?;

    writeln!(writer, "M  V30 BEGIN ATOM")?;
    for (idx, atom) in mol.atoms.iter().enumerate() {
        write!(
            writer,
            "M  V30 {} {} {} {} {} 0",
            idx + 1,
            atom.element.symbol(),
            atom.position[0],
            atom.position[1],
            atom.position[2]
        )?;
        if atom.formal_charge != 0 {
            write!(writer, " CHG={}", atom.formal_charge)?;
        }
        if atom.spin != 0 {
            write!(writer, " RAD={}", atom.spin)?;
        }
        match atom.parity {
            AtomParity::Clockwise => write!(writer, " CFG=1")?,
            AtomParity::AntiClockwise => write!(writer, " CFG=2")?,
            AtomParity::None => {}
        }
        if atom.isotope != 0 {
            write!(writer, " MASS={}", atom.isotope)?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "M  V30 END ATOM")?;

    writeln!(writer, "M  V30 BEGIN BOND")?;
    for (idx, bond) in sorted_bonds(mol).into_iter().enumerate() {
        write!(
            writer,
            "M  V30 {} {} {} {}",
            idx + 1,
            util::bond_order_to_ctfile(bond.order),
            bond.i + 1,
            bond.j + 1
        )?;
        match bond.stereo {
            BondStereo::Wedge => write!(writer, " CFG=1")?,
            BondStereo::Hash => write!(writer, " CFG=3")?,
            _ => {}
        }
        writeln!(writer)?;
    }
    writeln!(writer, "M  V30 END BOND")?;
    writeln!(writer, "M  V30 END CTAB")?;
    Ok(())
}

use super::v3000;
use crate::io::{error::Error, util};
use crate::model::{
    atom::Atom,
    molecule::{Annotation, Bond, Molecule},
    types::{BondStereo, Dimension},
};
use std::io::BufRead;

/// Line-oriented view over the input stream with a running line number for
/// error reporting. One cursor lives per `read` call; nothing is retained
/// between records.
pub(crate) struct LineCursor<'a, R: BufRead> {
    reader: &'a mut R,
    line_no: usize,
}

impl<'a, R: BufRead> LineCursor<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self { reader, line_no: 0 }
    }

    pub(crate) fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next line without its terminator, or `None` at end of stream.
    pub(crate) fn next_line(&mut self) -> Result<Option<String>, Error> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
}

/// Reads one Molfile/SD record from the stream, consuming its `$$$$`
/// terminator when present. Returns `Ok(None)` on a clean end of stream
/// before any record content. Callers drive multi-record files by calling
/// this repeatedly on the same reader.
pub fn read<R: BufRead>(reader: &mut R) -> Result<Option<Molecule>, Error> {
    let mut cursor = LineCursor::new(reader);

    let Some(title) = cursor.next_line()? else {
        return Ok(None);
    };
    let creator = cursor
        .next_line()?
        .ok_or_else(|| Error::header(cursor.line_no(), "missing creator line"))?;
    let comment_line = cursor
        .next_line()?
        .ok_or_else(|| Error::header(cursor.line_no(), "missing comment line"))?;
    let counts = cursor
        .next_line()?
        .ok_or_else(|| Error::header(cursor.line_no(), "missing counts line"))?;

    let mut mol = Molecule {
        title,
        comment: (!comment_line.is_empty()).then_some(comment_line),
        dimension: parse_dimension(&creator),
        ..Molecule::default()
    };

    let natoms = util::atoi(util::field(&counts, 0, 3)).max(0) as usize;
    let nbonds = util::atoi(util::field(&counts, 3, 3)).max(0) as usize;

    if counts.contains("V3000") {
        v3000::read_body(&mut cursor, &mut mol)?;
    } else {
        read_v2000_body(&mut cursor, &mut mol, natoms, nbonds)?;
        read_property_block(&mut cursor, &mut mol)?;
    }

    read_annotations(&mut cursor, &mut mol)?;
    Ok(Some(mol))
}

/// Reads every remaining record until end of stream.
pub fn read_all<R: BufRead>(reader: &mut R) -> Result<Vec<Molecule>, Error> {
    let mut records = Vec::new();
    while let Some(mol) = read(reader)? {
        records.push(mol);
    }
    Ok(records)
}

/// Outcome of [`skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The requested number of record terminators was consumed.
    Skipped,
    /// The stream ended with fewer terminators seen.
    EndOfStream,
}

/// Skips past `n` record terminators (`$$$$`) without materializing the
/// records. `n == 0` is treated as 1.
pub fn skip<R: BufRead>(reader: &mut R, n: usize) -> Result<SkipOutcome, Error> {
    let mut remaining = n.max(1);
    loop {
        let mut chunk = Vec::new();
        if reader.read_until(b'$', &mut chunk)? == 0 {
            return Ok(SkipOutcome::EndOfStream);
        }
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(SkipOutcome::EndOfStream);
        }
        if line.starts_with("$$$") {
            remaining -= 1;
            if remaining == 0 {
                return Ok(SkipOutcome::Skipped);
            }
        }
    }
}

/// The tag lives at columns 20..22 of the creator line; files written by
/// hand often carry it as the trailing token instead, so fall back to that.
fn parse_dimension(creator: &str) -> Dimension {
    let tag = Dimension::from_tag(util::field(creator, 20, 2));
    if tag != Dimension::None {
        return tag;
    }
    creator
        .split_whitespace()
        .last()
        .map(Dimension::from_tag)
        .unwrap_or(Dimension::None)
}

fn read_v2000_body<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
    natoms: usize,
    nbonds: usize,
) -> Result<(), Error> {
    mol.atoms.reserve(natoms);
    for _ in 0..natoms {
        let line = cursor.next_line()?.ok_or(Error::PrematureEndOfStream {
            line: cursor.line_no(),
        })?;
        mol.atoms.push(parse_atom_line(&line, cursor.line_no())?);
    }

    mol.bonds.reserve(nbonds);
    for _ in 0..nbonds {
        let line = cursor.next_line()?.ok_or(Error::PrematureEndOfStream {
            line: cursor.line_no(),
        })?;
        mol.bonds
            .push(parse_bond_line(&line, mol.atom_count(), cursor.line_no())?);
    }
    Ok(())
}

fn parse_atom_line(line: &str, line_no: usize) -> Result<Atom, Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(Error::atom(
            line_no,
            "expected coordinates, element symbol and charge fields",
        ));
    }

    let x = tokens[0]
        .parse::<f64>()
        .map_err(|_| Error::atom(line_no, "invalid x coordinate"))?;
    let y = tokens[1]
        .parse::<f64>()
        .map_err(|_| Error::atom(line_no, "invalid y coordinate"))?;
    let z = tokens[2]
        .parse::<f64>()
        .map_err(|_| Error::atom(line_no, "invalid z coordinate"))?;
    let element = util::element_from_symbol(tokens[3])
        .ok_or_else(|| Error::atom(line_no, format!("unknown element symbol '{}'", tokens[3])))?;

    let mut atom = Atom::new(element, [x, y, z]);
    if let Some(code) = tokens.get(5) {
        atom.formal_charge = util::charge_from_code(util::atoi(code));
    }
    Ok(atom)
}

fn parse_bond_line(line: &str, natoms: usize, line_no: usize) -> Result<Bond, Error> {
    if line.len() < 9 {
        return Err(Error::bond(line_no, "line too short for begin/end/order"));
    }
    let begin = util::atoi(util::field(line, 0, 3));
    let end = util::atoi(util::field(line, 3, 3));
    let order_code = util::atoi(util::field(line, 6, 3));
    let order = util::bond_order_from_ctfile(order_code)
        .ok_or_else(|| Error::bond(line_no, format!("unsupported bond order code {order_code}")))?;

    // Wedge/hash column is optional; only look when the line reaches it.
    let stereo = if line.len() >= 12 {
        match util::atoi(util::field(line, 9, 3)) {
            1 => BondStereo::Wedge,
            6 => BondStereo::Hash,
            _ => BondStereo::None,
        }
    } else {
        BondStereo::None
    };

    let (i, j) = resolve_pair(begin, end, natoms, line_no)?;
    Ok(Bond::with_stereo(i, j, order, stereo))
}

/// Converts a 1-based wire index pair into 0-based atom positions, checking
/// that both endpoints exist and differ.
pub(crate) fn resolve_pair(
    begin: i32,
    end: i32,
    natoms: usize,
    line_no: usize,
) -> Result<(usize, usize), Error> {
    if begin < 1 || end < 1 || begin as usize > natoms || end as usize > natoms {
        return Err(Error::bond(
            line_no,
            format!("bond references atom outside 1..={natoms}"),
        ));
    }
    if begin == end {
        return Err(Error::bond(line_no, "bond endpoints must differ"));
    }
    Ok((begin as usize - 1, end as usize - 1))
}

/// Legacy `M  RAD`/`M  CHG` property lines. The scan consumes lines until
/// one with an entry count of 0 (which `M  END` satisfies) or end of
/// stream; lines without an `M` are passed over. `CHG` overwrites the
/// atom's charge without resetting previously assigned charges, which
/// deviates from the CTfile specification but matches the files in
/// circulation.
fn read_property_block<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
) -> Result<(), Error> {
    while let Some(line) = cursor.next_line()? {
        if !line.contains('M') {
            continue;
        }
        let entries = util::atoi(util::field(&line, 6, 3));
        if entries == 0 {
            break;
        }
        let name = util::field(&line, 3, 3).to_string();
        let mut pos = 10;
        for _ in 0..entries {
            let atom_no = util::atoi(util::field(&line, pos, 3));
            if atom_no == 0 {
                break;
            }
            let value = util::atoi(util::field(&line, pos + 4, 3));
            // Out-of-range indices are dropped rather than followed.
            if let Some(atom) = usize::try_from(atom_no)
                .ok()
                .and_then(|k| mol.atoms.get_mut(k - 1))
            {
                match name.as_str() {
                    "RAD" => atom.spin = value.clamp(0, u8::MAX as i32) as u8,
                    "CHG" => atom.formal_charge = value.clamp(-128, 127) as i8,
                    _ => {}
                }
            }
            pos += 8;
        }
    }
    Ok(())
}

/// SD data items after the structural body, up to and including the record
/// terminator. A `<` with no closing `>` still yields a name running to the
/// end of the line; that tolerance is deliberate.
fn read_annotations<R: BufRead>(
    cursor: &mut LineCursor<R>,
    mol: &mut Molecule,
) -> Result<(), Error> {
    while let Some(line) = cursor.next_line()? {
        if let Some(lt) = line.find('<') {
            let start = lt + 1;
            let end = line
                .rfind('>')
                .filter(|&rt| rt >= start)
                .unwrap_or(line.len());
            let name = line[start..end].to_string();
            let value = cursor.next_line()?.unwrap_or_default();
            mol.annotations.push(Annotation::new(name, value));
        } else if line.starts_with("$$$$") || line.starts_with("$MOL") {
            break;
        }
    }
    Ok(())
}

//! Reading and writing the value table as a NumPy `.npy` (v1.0, `<f8`, C order)
//! array, plus the fixed-precision text dump.

use std::io::{Read, Write};

use byteorder::{ByteOrder, ReadBytesExt, WriteBytesExt, LE};

use crate::ai::{QTable, Row};
use crate::error::TableError;
use crate::game::NUM_ACTIONS;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const DESCR: &str = "<f8";
// magic + version + header length field
const PREAMBLE_LEN: usize = MAGIC.len() + 2 + 2;
const ALIGNMENT: usize = 64;
const VALUE_SIZE: usize = std::mem::size_of::<f64>();

fn header(rows: usize) -> String {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({}, {}), }}",
        DESCR, rows, NUM_ACTIONS
    );
    // Pad with spaces so the data starts on an aligned offset; the header ends in '\n'.
    let unpadded = PREAMBLE_LEN + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');
    header
}

/// Write `table` as a `(rows, 3)` little-endian float64 array.
pub fn write_npy<W: Write>(writer: &mut W, table: &QTable) -> Result<(), TableError> {
    let header = header(table.num_states());
    writer.write_all(MAGIC)?;
    writer.write_u8(1)?;
    writer.write_u8(0)?;
    writer.write_u16::<LE>(header.len() as u16)?;
    writer.write_all(header.as_bytes())?;
    for row in table.rows() {
        for &value in row {
            writer.write_f64::<LE>(value)?;
        }
    }
    Ok(())
}

/// Read a table written by [`write_npy`] (or by `numpy.save` on a float64 `(N, 3)` array).
pub fn read_npy<R: Read>(reader: &mut R) -> Result<QTable, TableError> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(TableError::BadMagic);
    }
    let major = reader.read_u8()?;
    let minor = reader.read_u8()?;
    let header_len = match major {
        1 => reader.read_u16::<LE>()? as usize,
        2 | 3 => reader.read_u32::<LE>()? as usize,
        _ => return Err(TableError::UnsupportedVersion { major, minor }),
    };
    let mut raw = vec![0u8; header_len];
    reader.read_exact(&mut raw)?;
    let header = String::from_utf8_lossy(&raw);

    let descr = quoted_value(&header, "descr")
        .ok_or_else(|| TableError::Header("missing 'descr'".into()))?;
    if descr != DESCR {
        return Err(TableError::UnsupportedDtype(descr.to_string()));
    }
    let fortran = header_value(&header, "fortran_order")
        .ok_or_else(|| TableError::Header("missing 'fortran_order'".into()))?;
    if !fortran.starts_with("False") {
        return Err(TableError::Header("fortran_order arrays are not supported".into()));
    }
    let (rows, cols) = parse_shape(&header)?;
    if cols != NUM_ACTIONS || rows == 0 {
        return Err(TableError::Shape { rows, cols });
    }

    let byte_len = rows
        .checked_mul(NUM_ACTIONS * VALUE_SIZE)
        .ok_or(TableError::Shape { rows, cols })?;
    // The buffer grows with the bytes actually present, not the declared shape.
    let mut data = Vec::new();
    reader.take(byte_len as u64).read_to_end(&mut data)?;
    if data.len() != byte_len {
        return Err(TableError::Truncated {
            expected: byte_len,
            found: data.len(),
        });
    }

    let rows: Vec<Row> = data
        .chunks_exact(NUM_ACTIONS * VALUE_SIZE)
        .map(|chunk| {
            let mut row = [0.0; NUM_ACTIONS];
            LE::read_f64_into(chunk, &mut row);
            row
        })
        .collect();
    Ok(QTable::from_rows(rows))
}

/// Write one line per pile size, values formatted to three decimals.
pub fn write_text<W: Write>(writer: &mut W, table: &QTable) -> std::io::Result<()> {
    for row in table.rows() {
        let line: Vec<String> = row.iter().map(|v| format!("{:.3}", v)).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}

/// Raw text following `'key':` in a header dict.
fn header_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("'{}':", key);
    let start = header.find(&needle)? + needle.len();
    Some(header[start..].trim_start())
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let rest = header_value(header, key)?.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

fn parse_shape(header: &str) -> Result<(usize, usize), TableError> {
    let rest = header_value(header, "shape")
        .and_then(|v| v.strip_prefix('('))
        .ok_or_else(|| TableError::Header("missing 'shape'".into()))?;
    let end = rest
        .find(')')
        .ok_or_else(|| TableError::Header("unterminated 'shape'".into()))?;
    let dims = rest[..end]
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<usize>()
                .map_err(|_| TableError::Header(format!("bad shape dimension '{}'", d)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match dims.as_slice() {
        [rows, cols] => Ok((*rows, *cols)),
        [rows] => Err(TableError::Shape { rows: *rows, cols: 1 }),
        _ => Err(TableError::Header(format!("expected a 2-D shape, got {:?}", dims))),
    }
}

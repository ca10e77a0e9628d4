//! Plain-text matrix interchange format.
//!
//! One row per line, each line a run of `0`/`1` characters with no
//! separators. Drivers store codes as `N{n}_wc{wc}_wr{wr}/H.csv` and
//! `.../G.csv`.

use crate::{LdpcError, Mod2Dense};
use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Matrix file contains no rows")]
    Empty,
    #[error("Line {line} has {found} columns, expected {expected}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Found {found} rows, expected {expected}")]
    RowCount { expected: usize, found: usize },
    #[error("Unexpected character {ch:?} at line {line}, column {column}")]
    InvalidCharacter { line: usize, column: usize, ch: char },
}

/// Read a matrix. When `shape` is given the row and column counts must
/// match it exactly; otherwise the first row fixes the column count.
pub fn read_matrix<R: BufRead>(
    reader: R,
    shape: Option<(usize, usize)>,
) -> Result<Mod2Dense, LdpcError> {
    let mut rows: Vec<Vec<u8>> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let row = parse_row(line, index + 1)?;
        let expected = shape
            .map(|(_, cols)| cols)
            .or_else(|| rows.first().map(Vec::len))
            .unwrap_or(row.len());
        if row.len() != expected {
            return Err(FormatError::RowLength {
                line: index + 1,
                expected,
                found: row.len(),
            }
            .into());
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(FormatError::Empty.into());
    }
    if let Some((expected, _)) = shape {
        if rows.len() != expected {
            return Err(FormatError::RowCount {
                expected,
                found: rows.len(),
            }
            .into());
        }
    }
    Ok(Mod2Dense::from_rows(&rows)?)
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<u8>, FormatError> {
    line.chars()
        .enumerate()
        .map(|(column, ch)| match ch {
            '0' => Ok(0),
            '1' => Ok(1),
            _ => Err(FormatError::InvalidCharacter {
                line: line_no,
                column: column + 1,
                ch,
            }),
        })
        .collect()
}

pub fn write_matrix<W: Write>(mut writer: W, matrix: &Mod2Dense) -> Result<(), LdpcError> {
    let mut line = String::with_capacity(matrix.cols() + 1);
    for row in 0..matrix.rows() {
        line.clear();
        line.extend((0..matrix.cols()).map(|col| if matrix.get(row, col) { '1' } else { '0' }));
        line.push('\n');
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_matrix<P: AsRef<Path>>(
    path: P,
    shape: Option<(usize, usize)>,
) -> Result<Mod2Dense, LdpcError> {
    read_matrix(BufReader::new(File::open(path)?), shape)
}

pub fn save_matrix<P: AsRef<Path>>(path: P, matrix: &Mod2Dense) -> Result<(), LdpcError> {
    write_matrix(BufWriter::new(File::create(path)?), matrix)
}

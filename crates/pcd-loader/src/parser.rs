//! Streaming reader for RF2 release files.
//!
//! RF2 files are tab-separated with one header row and no quoting. Full
//! releases repeat ids across rows, so this module only turns lines into
//! typed rows; [`crate::reducer`] decides which version of an id survives.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use pcd_types::{EffectiveTime, SctId};

use crate::types::{Rf2Error, Rf2Result};

const BOM: char = '\u{feff}';

/// A row type that can be read from an RF2 file.
pub trait Rf2Record: Sized {
    /// Header names the file must start with, in order.
    const COLUMNS: &'static [&'static str];

    /// Column that must be non-empty for a row to carry a record.
    const KEY_COLUMN: usize;

    /// Builds a row from its fields.
    fn from_fields(fields: Fields<'_>) -> Rf2Result<Self>;
}

/// Typed access to the fields of one RF2 line.
///
/// Missing trailing fields read as empty and fail the typed accessors.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    record: &'a StringRecord,
}

impl<'a> Fields<'a> {
    /// Wraps a raw record.
    pub fn new(record: &'a StringRecord) -> Self {
        Self { record }
    }

    /// The field at `index`, or `""` past the end of the row.
    pub fn raw(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("")
    }

    /// An SCTID column.
    pub fn sctid(&self, index: usize) -> Rf2Result<SctId> {
        let value = self.raw(index);
        value.parse().map_err(|_| Rf2Error::InvalidSctId {
            value: value.to_string(),
        })
    }

    /// An `effectiveTime` column: exactly eight digits.
    pub fn effective_time(&self, index: usize) -> Rf2Result<EffectiveTime> {
        let value = self.raw(index);
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Rf2Error::InvalidDate {
                value: value.to_string(),
            });
        }
        value.parse().map_err(|_| Rf2Error::InvalidDate {
            value: value.to_string(),
        })
    }

    /// An `active` column: `1` or `0`.
    pub fn flag(&self, index: usize) -> Rf2Result<bool> {
        match self.raw(index) {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(Rf2Error::InvalidBoolean {
                value: other.to_string(),
            }),
        }
    }

    /// A free-text column, kept verbatim.
    pub fn text(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    /// True for lines that carry no record: blank lines, a header repeated
    /// mid-file, and rows too short to reach `key_column` or with it empty.
    pub fn is_filler(&self, first_column: &str, key_column: usize) -> bool {
        if self.record.iter().all(|field| field.trim().is_empty()) {
            return true;
        }
        if self.raw(0).trim_start_matches(BOM) == first_column {
            return true;
        }
        self.raw(key_column).trim().is_empty()
    }
}

/// Iterates over the rows of one RF2 file.
///
/// The header is checked when the parser is built; data lines are read one
/// at a time into a reused buffer.
pub struct Rf2Parser<R: Read, T: Rf2Record> {
    reader: Reader<R>,
    record: StringRecord,
    _row: PhantomData<T>,
}

impl<T: Rf2Record> Rf2Parser<BufReader<File>, T> {
    /// Opens `path` and checks its header.
    ///
    /// # Errors
    /// [`Rf2Error::FileNotFound`] if there is no such file, or a header error.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Rf2Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Rf2Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        Self::from_reader(BufReader::new(File::open(path)?))
    }
}

impl<R: Read, T: Rf2Record> Rf2Parser<R, T> {
    /// Reads and checks the header of `reader`.
    ///
    /// Terms contain bare double quotes, so quoting is off. Rows may be short;
    /// [`Fields::is_filler`] drops the ones without a key.
    pub fn from_reader(reader: R) -> Rf2Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);
        check_header(reader.headers()?, T::COLUMNS)?;

        Ok(Self {
            reader,
            record: StringRecord::new(),
            _row: PhantomData,
        })
    }
}

fn check_header(header: &StringRecord, columns: &[&str]) -> Rf2Result<()> {
    if header.len() < columns.len() {
        return Err(Rf2Error::InvalidHeader {
            expected: columns.len(),
            found: header.len(),
        });
    }
    for (position, (found, expected)) in header.iter().zip(columns).enumerate() {
        let found = if position == 0 { found.trim_start_matches(BOM) } else { found };
        if found != *expected {
            return Err(Rf2Error::UnexpectedColumn {
                position,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}

impl<R: Read, T: Rf2Record> Iterator for Rf2Parser<R, T> {
    type Item = Rf2Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
                Ok(true) => {
                    let fields = Fields::new(&self.record);
                    if fields.is_filler(T::COLUMNS[0], T::KEY_COLUMN) {
                        continue;
                    }
                    return Some(T::from_fields(fields));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        fields.iter().copied().collect()
    }

    #[test]
    fn test_sctid_field() {
        let row = record(&["404684003", "999000011000230102", "x", ""]);
        let fields = Fields::new(&row);
        assert_eq!(fields.sctid(0).unwrap(), 404684003);
        assert_eq!(fields.sctid(1).unwrap(), 999000011000230102);
        assert!(fields.sctid(2).is_err());
        assert!(fields.sctid(3).is_err());
        assert!(matches!(fields.sctid(9), Err(Rf2Error::InvalidSctId { .. })));
    }

    #[test]
    fn test_flag_field() {
        let row = record(&["0", "1", "true", "2"]);
        let fields = Fields::new(&row);
        assert!(!fields.flag(0).unwrap());
        assert!(fields.flag(1).unwrap());
        assert!(fields.flag(2).is_err());
        assert!(fields.flag(3).is_err());
    }

    #[test]
    fn test_effective_time_field() {
        let row = record(&["20020131", "2020-01-31", "2002013", "+2020013"]);
        let fields = Fields::new(&row);
        assert_eq!(fields.effective_time(0).unwrap(), 20020131);
        assert!(fields.effective_time(1).is_err());
        assert!(fields.effective_time(2).is_err());
        assert!(fields.effective_time(3).is_err());
    }

    #[test]
    fn test_filler_lines() {
        let is_filler = |fields: &[&str]| Fields::new(&record(fields)).is_filler("id", 2);
        assert!(is_filler(&["", " "]));
        assert!(is_filler(&["id", "effectiveTime", "active"]));
        assert!(is_filler(&["\u{feff}id", "effectiveTime", "active"]));
        assert!(is_filler(&["1", "20200101"]));
        assert!(is_filler(&["1", "20200101", ""]));
        assert!(!is_filler(&["1", "20200101", "1"]));
    }

    #[test]
    fn test_header_check() {
        let columns = ["id", "effectiveTime", "active"];
        assert!(check_header(&record(&["id", "effectiveTime", "active", "extra"]), &columns).is_ok());
        assert!(check_header(&record(&["\u{feff}id", "effectiveTime", "active"]), &columns).is_ok());
        assert!(matches!(
            check_header(&record(&["id", "effectiveTime"]), &columns),
            Err(Rf2Error::InvalidHeader { expected: 3, found: 2 })
        ));
        assert!(matches!(
            check_header(&record(&["id", "active", "effectiveTime"]), &columns),
            Err(Rf2Error::UnexpectedColumn { position: 1, .. })
        ));
    }
}

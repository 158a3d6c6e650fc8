// src/dataset/mod.rs
use csv::{ReaderBuilder, StringRecord, Trim};
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

use crate::error::DataLoadError;

pub const YEAR_COLUMN: &str = "Year";
pub const STATE_COLUMN: &str = "State";

/// One row of the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeRecord {
    pub year: i32,
    pub state: String,
    /// Counts, aligned with `CrimeTable::columns`.
    pub counts: Vec<f64>,
}

/// The whole dataset. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeTable {
    columns: Vec<String>,
    records: Vec<CrimeRecord>,
}

impl CrimeTable {
    /// A record with fewer counts than `columns` has no value for the trailing ones.
    pub fn new(columns: Vec<String>, records: Vec<CrimeRecord>) -> Self {
        Self { columns, records }
    }

    /// Numeric column names, in load order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[CrimeRecord] {
        &self.records
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load the CSV at `path`, keeping `Year`, `State` and `required` numeric columns.
#[tracing::instrument(level = "info", skip(path, required), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(
    path: P,
    required: &[String],
) -> Result<CrimeTable, DataLoadError> {
    let file = File::open(&path).map_err(|source| DataLoadError::Open {
        path: path.as_ref().to_path_buf(),
        source,
    })?;
    let table = load_table_from_reader(file, required)?;
    info!(
        rows = table.len(),
        columns = ?table.columns(),
        "dataset loaded"
    );
    Ok(table)
}

/// Same as [`load_table`] over any reader.
pub fn load_table_from_reader<R: Read>(
    reader: R,
    required: &[String],
) -> Result<CrimeTable, DataLoadError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(DataLoadError::Header)?.clone();
    let locate = |name: &str| -> Result<usize, DataLoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
    };

    let year_idx = locate(YEAR_COLUMN)?;
    let state_idx = locate(STATE_COLUMN)?;
    let count_idx: Vec<usize> = required
        .iter()
        .map(|c| locate(c))
        .collect::<Result<_, _>>()?;
    debug!(?headers, "located columns");

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row = idx + 1;
        let record = result.map_err(|source| DataLoadError::Row { row, source })?;

        let year = field(&record, year_idx, row, YEAR_COLUMN)?
            .parse::<i32>()
            .map_err(|e| DataLoadError::Malformed {
                row,
                column: YEAR_COLUMN.to_string(),
                reason: e.to_string(),
            })?;
        let state = field(&record, state_idx, row, STATE_COLUMN)?.to_string();

        let mut counts = Vec::with_capacity(count_idx.len());
        for (name, &i) in required.iter().zip(&count_idx) {
            counts.push(parse_count(field(&record, i, row, name)?, row, name)?);
        }

        records.push(CrimeRecord {
            year,
            state,
            counts,
        });
    }

    if records.is_empty() {
        return Err(DataLoadError::Empty);
    }

    Ok(CrimeTable::new(required.to_vec(), records))
}

fn field<'r>(
    record: &'r StringRecord,
    idx: usize,
    row: usize,
    column: &str,
) -> Result<&'r str, DataLoadError> {
    record.get(idx).ok_or_else(|| DataLoadError::Malformed {
        row,
        column: column.to_string(),
        reason: "field missing".to_string(),
    })
}

fn parse_count(raw: &str, row: usize, column: &str) -> Result<f64, DataLoadError> {
    let malformed = |reason: String| DataLoadError::Malformed {
        row,
        column: column.to_string(),
        reason,
    };
    let value = raw.parse::<f64>().map_err(|e| malformed(e.to_string()))?;
    if !value.is_finite() {
        return Err(malformed(format!("non-finite value {raw:?}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
,State,Year,Rape,K&A,DD
0,ANDHRA PRADESH,2001,871,765,420
1,ASSAM,2001,817,1070,59
2,ANDHRA PRADESH,2002,1002,  800 ,411
";

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_load_from_reader() {
        let table =
            load_table_from_reader(SAMPLE.as_bytes(), &cols(&["Rape", "K&A"])).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.columns(), &cols(&["Rape", "K&A"])[..]);
        assert_eq!(
            table.records()[2],
            CrimeRecord {
                year: 2002,
                state: "ANDHRA PRADESH".into(),
                counts: vec![1002.0, 800.0],
            }
        );
        assert_eq!(table.column_index("K&A"), Some(1));
        assert_eq!(table.column_index("DD"), None);
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(SAMPLE.as_bytes())?;

        let table = load_table(tmp.path(), &cols(&["DD"]))?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[1].counts, vec![59.0]);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = load_table("does/not/exist.csv", &cols(&["Rape"])).unwrap_err();
        assert!(matches!(err, DataLoadError::Open { .. }));
    }

    #[test]
    fn test_missing_column() {
        let err =
            load_table_from_reader(SAMPLE.as_bytes(), &cols(&["Total Crimes"])).unwrap_err();
        match err {
            DataLoadError::MissingColumn(c) => assert_eq!(c, "Total Crimes"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_count() {
        let data = "Year,State,Rape\n2001,ASSAM,12\n2002,ASSAM,many\n";
        let err = load_table_from_reader(data.as_bytes(), &cols(&["Rape"])).unwrap_err();
        match err {
            DataLoadError::Malformed { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Rape");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_count_rejected() {
        let data = "Year,State,Rape\n2001,ASSAM,inf\n";
        let err = load_table_from_reader(data.as_bytes(), &cols(&["Rape"])).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { row: 1, .. }));
    }

    #[test]
    fn test_bad_year() {
        let data = "Year,State,Rape\ntwenty,ASSAM,1\n";
        let err = load_table_from_reader(data.as_bytes(), &cols(&["Rape"])).unwrap_err();
        match err {
            DataLoadError::Malformed { column, .. } => assert_eq!(column, "Year"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row() {
        let data = "Year,State,Rape\n2001,ASSAM,1\n2002,GOA\n";
        let err = load_table_from_reader(data.as_bytes(), &cols(&["Rape"])).unwrap_err();
        assert!(err.to_string().starts_with("unreadable CSV row 2:"));
        assert!(matches!(err, DataLoadError::Row { row: 2, .. }));
    }

    #[test]
    fn test_invalid_utf8_header() {
        let data: &[u8] = b"Ye\xffar,State,Rape\n2001,ASSAM,1\n";
        let err = load_table_from_reader(data, &cols(&["Rape"])).unwrap_err();
        assert!(matches!(err, DataLoadError::Header(_)));
    }

    #[test]
    fn test_empty_dataset() {
        let data = "Year,State,Rape\n";
        let err = load_table_from_reader(data.as_bytes(), &cols(&["Rape"])).unwrap_err();
        assert!(matches!(err, DataLoadError::Empty));
    }
}

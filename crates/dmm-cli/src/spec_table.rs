//! Batch spec table reading and column-matrix export.
//!
//! The spec table is a CSV with one header row: a blank-named column holds
//! the output-column reference, a `filename` column holds an optional
//! explicit artifact name, and every other column is a candidate input,
//! selected for a row when its cell is non-empty. The export writes the
//! inverse companion: an empty matrix the operator fills in.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, WriterBuilder};

use dmm_document::MiningColumn;

/// One generation unit read from the spec table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRow {
    /// 1-based data row number (header row not counted).
    pub row: usize,
    /// Output-column reference; may be blank, which fails the unit later.
    pub output_ref: String,
    /// Explicit artifact name from the `filename` column.
    pub explicit_name: Option<String>,
    /// Input-column references, in header order.
    pub input_refs: Vec<String>,
}

/// Read the whole spec table. Cell content other than "non-empty" is not
/// interpreted.
pub fn read_spec_table(path: &Path) -> Result<Vec<SpecRow>> {
    if !path.is_file() {
        bail!("spec table not found: {}", path.display());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read spec table: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers: {}", path.display()))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();

    let output_index = headers
        .iter()
        .position(|h| h.is_empty())
        .ok_or_else(|| anyhow!("spec table has no blank-named output column"))?;
    let filename_index = headers.iter().position(|h| h == "filename");

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("read record {}: {}", index + 1, path.display()))?;
        let cell = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let explicit = filename_index
            .map(|i| cell(i))
            .filter(|name| !name.is_empty());
        let mut inputs = Vec::new();
        for (column, header) in headers.iter().enumerate() {
            if column == output_index || Some(column) == filename_index || header.is_empty() {
                continue;
            }
            if !cell(column).is_empty() {
                inputs.push(header.clone());
            }
        }
        rows.push(SpecRow {
            row: index + 1,
            output_ref: cell(output_index),
            explicit_name: explicit,
            input_refs: inputs,
        });
    }
    Ok(rows)
}

/// Unique canonical shortnames for the export matrix, sorted, with the `ID`
/// key column left out.
pub fn export_shortnames(columns: &[MiningColumn]) -> Vec<String> {
    let mut names: Vec<String> = columns
        .iter()
        .map(MiningColumn::shortname)
        .filter(|name| !name.eq_ignore_ascii_case("ID"))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Write the empty selection matrix: shortnames as header row and row-label
/// column, plus a trailing `filename` column.
pub fn write_column_matrix(path: &Path, shortnames: &[String]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("write column matrix: {}", path.display()))?;

    let mut header = Vec::with_capacity(shortnames.len() + 2);
    header.push("");
    header.extend(shortnames.iter().map(String::as_str));
    header.push("filename");
    writer.write_record(&header).context("write header")?;

    for name in shortnames {
        let mut row = Vec::with_capacity(shortnames.len() + 2);
        row.push(name.as_str());
        row.extend(std::iter::repeat_n("", shortnames.len() + 1));
        writer
            .write_record(&row)
            .with_context(|| format!("write row for {name}"))?;
    }
    writer.flush().context("flush column matrix")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_rows_and_selected_inputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spec.csv");
        fs::write(
            &path,
            ",Figur,Geschlecht,Rollenrelevanz,filename\n\
             Genre,x,,x,\n\
             Rollenrelevanz,,1,,extern_name\n",
        )
        .expect("write spec");

        let rows = read_spec_table(&path).expect("read spec");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].output_ref, "Genre");
        assert_eq!(rows[0].input_refs, ["Figur", "Rollenrelevanz"]);
        assert_eq!(rows[0].explicit_name, None);
        assert_eq!(rows[1].output_ref, "Rollenrelevanz");
        assert_eq!(rows[1].input_refs, ["Geschlecht"]);
        assert_eq!(rows[1].explicit_name.as_deref(), Some("extern_name"));
    }

    #[test]
    fn missing_spec_table_is_an_error() {
        assert!(read_spec_table(Path::new("/nonexistent/spec.csv")).is_err());
    }

    #[test]
    fn missing_output_column_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("spec.csv");
        fs::write(&path, "Figur,filename\nx,\n").expect("write spec");
        assert!(read_spec_table(&path).is_err());
    }

    #[test]
    fn matrix_round_trips_through_the_reader() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("matrix.csv");
        let names = vec!["Figur".to_string(), "Genre".to_string()];
        write_column_matrix(&path, &names).expect("write matrix");

        let rows = read_spec_table(&path).expect("read matrix");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].output_ref, "Figur");
        assert_eq!(rows[1].output_ref, "Genre");
        // The matrix starts empty: no inputs selected anywhere.
        assert!(rows.iter().all(|row| row.input_refs.is_empty()));
    }
}

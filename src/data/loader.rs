//! Data Loader Module
//! Reads the on-risk extract from a spreadsheet or a delimited-text fallback.

use super::schema::Measure;
use super::table::Table;
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("No readable data source, tried: {}", .attempts.join("; "))]
    DataSourceUnavailable { attempts: Vec<String> },
    #[error("Failed to clean data: {0}")]
    Polars(#[from] PolarsError),
}

/// Why a single candidate could not be read.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to load CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,
    #[error("Worksheet has no header row")]
    MissingHeader,
}

/// File format of a source candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Spreadsheet,
    Delimited,
}

impl SourceFormat {
    /// Guess the format from the file extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" | "tsv" => Self::Delimited,
            _ => Self::Spreadsheet,
        }
    }
}

/// One file the loader may read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceCandidate {
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<SourceFormat>,
}

impl SourceCandidate {
    pub fn spreadsheet(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: Some(SourceFormat::Spreadsheet),
        }
    }

    pub fn delimited(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: Some(SourceFormat::Delimited),
        }
    }

    /// Candidate whose format is inferred from its extension.
    pub fn infer(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = Some(SourceFormat::from_path(&path));
        Self { path, format }
    }

    pub fn resolved_format(&self) -> SourceFormat {
        self.format
            .unwrap_or_else(|| SourceFormat::from_path(&self.path))
    }
}

/// Reads source candidates in priority order.
pub struct DataLoader;

impl DataLoader {
    /// Load the first candidate that reads without error and clean it.
    pub fn load(sources: &[SourceCandidate]) -> Result<Table, LoaderError> {
        let mut attempts = Vec::with_capacity(sources.len());

        for source in sources {
            let format = source.resolved_format();
            debug!(path = %source.path.display(), ?format, "trying source");

            match Self::read_raw(&source.path, format) {
                Ok(raw) => {
                    info!(
                        path = %source.path.display(),
                        rows = raw.height(),
                        columns = raw.width(),
                        "loaded source"
                    );
                    let table = Table::from_raw(raw)?;
                    for measure in Measure::ALL {
                        if table.schema().was_synthesized(measure) {
                            warn!(column = measure.column_name(), "measure column missing, filled with zero");
                        }
                    }
                    debug!(columns = ?table.column_names(), "cleaned table");
                    return Ok(table);
                }
                Err(e) => {
                    warn!(path = %source.path.display(), error = %e, "source unreadable, trying next");
                    attempts.push(format!("{}: {}", source.path.display(), e));
                }
            }
        }

        Err(LoaderError::DataSourceUnavailable { attempts })
    }

    fn read_raw(path: &Path, format: SourceFormat) -> Result<DataFrame, SourceError> {
        match format {
            SourceFormat::Spreadsheet => Self::read_spreadsheet(path),
            SourceFormat::Delimited => Self::read_delimited(path),
        }
    }

    /// Load a CSV file using Polars.
    pub fn read_delimited(path: &Path) -> Result<DataFrame, SourceError> {
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Load the first worksheet of a workbook, first row as header.
    ///
    /// Every non-empty cell is kept as its display text; typing happens
    /// later in [`Table::from_raw`].
    pub fn read_spreadsheet(path: &Path) -> Result<DataFrame, SourceError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(SourceError::EmptyWorkbook)??;

        let mut rows = range.rows();
        let header = rows.next().ok_or(SourceError::MissingHeader)?;

        // Same rule as the CSV path: the first column of a trimmed name wins.
        let mut seen: HashSet<String> = HashSet::new();
        let kept: Vec<(usize, String)> = header_names(header)
            .into_iter()
            .enumerate()
            .filter(|(_, name)| {
                let first = seen.insert(name.clone());
                if !first {
                    warn!(column = %name, "duplicate column name after trimming, dropping later copy");
                }
                first
            })
            .collect();

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
        for row in rows {
            for ((idx, _), values) in kept.iter().zip(cells.iter_mut()) {
                values.push(row.get(*idx).and_then(cell_text));
            }
        }

        let columns = kept
            .into_iter()
            .zip(cells)
            .map(|((_, name), values)| Column::new(name.into(), values))
            .collect();

        Ok(DataFrame::new(columns)?)
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}

/// Trimmed header texts, blanks named by position.
fn header_names(header: &[Data]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            cell_text(cell)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("column_{}", idx + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{Dimension, Measure};
    use anyhow::Result;
    use std::io::Write;
    use tempfile::TempDir;
    use ::zip::write::FileOptions;
    use ::zip::ZipWriter;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path)?;
        file.write_all(content)?;
        Ok(path)
    }

    const CSV: &str = "BRANCH_DESC , COB_DESC,SEGMENT,PREMIUM_GROSS,DISCOUNT,TSI_OC\n\
                       A,Motor,Retail,100,10,1000\n\
                       A,Motor,Retail,abc,5,500\n\
                       B,Fire,Corporate,50,,2000\n";

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("lap.XLS")),
            SourceFormat::Spreadsheet
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("lap.CSV")),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceCandidate {
                path: "x.xlsx".into(),
                format: None
            }
            .resolved_format(),
            SourceFormat::Spreadsheet
        );
    }

    #[test]
    fn falls_back_to_delimited_when_spreadsheet_is_broken() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let xls = write_file(&dir, "lap.XLS", b"<html>not a workbook</html>")?;
        let csv = write_file(&dir, "lap.csv", CSV.as_bytes())?;

        let table = DataLoader::load(&[
            SourceCandidate::spreadsheet(xls),
            SourceCandidate::delimited(csv),
        ])?;

        assert_eq!(table.height(), 3);
        assert!(table.has(Dimension::BranchDesc));
        let premium: Vec<f64> = table
            .measure(Measure::PremiumGross)?
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(premium, vec![100.0, 0.0, 50.0]);
        let discount: Vec<f64> = table
            .measure(Measure::Discount)?
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(discount, vec![10.0, 5.0, 0.0]);
        Ok(())
    }

    enum Cell {
        Text(&'static str),
        Num(f64),
        Blank,
    }

    fn column_letter(idx: usize) -> char {
        (b'A' + idx as u8) as char
    }

    fn sheet_xml(rows: &[Vec<Cell>]) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, cell) in row.iter().enumerate() {
                let reference = format!("{}{}", column_letter(c), r + 1);
                match cell {
                    Cell::Text(text) => xml.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                        reference, text
                    )),
                    Cell::Num(value) => {
                        xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value))
                    }
                    Cell::Blank => {}
                }
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");
        xml
    }

    /// Write a single-sheet workbook with inline-string cells.
    fn write_xlsx(dir: &TempDir, name: &str, rows: &[Vec<Cell>]) -> Result<PathBuf> {
        let path = dir.path().join(name);
        let mut zip = ZipWriter::new(std::fs::File::create(&path)?);
        let options = FileOptions::default();

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#,
        )?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        )?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="LAP" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        )?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#,
        )?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        zip.write_all(sheet_xml(rows).as_bytes())?;
        zip.finish()?;
        Ok(path)
    }

    #[test]
    fn reads_first_worksheet_of_workbook() -> Result<()> {
        use Cell::{Blank, Num, Text};

        let dir = tempfile::tempdir()?;
        let xlsx = write_xlsx(
            &dir,
            "lap.xlsx",
            &[
                vec![
                    Text(" BRANCH_DESC "),
                    Text("COB_DESC"),
                    Text("SEGMENT"),
                    Text("PREMIUM_GROSS"),
                    Text("DISCOUNT"),
                    Text("TSI_OC"),
                    Text("BRANCH"),
                    Text(" SEGMENT"),
                ],
                vec![
                    Text("Jakarta"),
                    Text("Motor"),
                    Text("Retail"),
                    Num(100.5),
                    Num(10.0),
                    Num(1000.0),
                    Num(101.0),
                    Text("Corporate"),
                ],
                vec![
                    Blank,
                    Text("Fire"),
                    Text("Retail"),
                    Text("abc"),
                    Blank,
                    Num(2000.0),
                    Num(102.0),
                    Text("Corporate"),
                ],
                vec![
                    Text("Medan"),
                    Text("Motor"),
                    Blank,
                    Num(50.0),
                    Num(5.0),
                    Num(500.0),
                    Num(101.0),
                    Text("Corporate"),
                ],
            ],
        )?;

        let table = DataLoader::load(&[SourceCandidate::infer(xlsx)])?;
        assert_eq!(table.height(), 3);

        let measure = |m: Measure| -> Result<Vec<f64>> {
            Ok(table.measure(m)?.into_iter().flatten().collect())
        };
        assert_eq!(measure(Measure::PremiumGross)?, vec![100.5, 0.0, 50.0]);
        assert_eq!(measure(Measure::Discount)?, vec![10.0, 0.0, 5.0]);
        assert_eq!(measure(Measure::TsiOc)?, vec![1000.0, 2000.0, 500.0]);

        assert_eq!(
            table.distinct_values(Dimension::BranchDesc)?,
            vec!["Jakarta".to_string(), String::new(), "Medan".to_string()]
        );
        // The later " SEGMENT" column is dropped, not renamed.
        assert_eq!(
            table.distinct_values(Dimension::Segment)?,
            vec!["Retail".to_string(), String::new()]
        );
        assert_eq!(table.dataframe().width(), 7);
        assert_eq!(
            table.distinct_values(Dimension::BranchCode)?,
            vec!["101".to_string(), "102".to_string()]
        );
        Ok(())
    }

    #[test]
    fn every_candidate_failing_is_unavailable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let missing_xls = dir.path().join("missing.XLS");
        let missing_csv = dir.path().join("missing.csv");

        let err = DataLoader::load(&[
            SourceCandidate::spreadsheet(missing_xls),
            SourceCandidate::delimited(missing_csv),
        ])
        .unwrap_err();

        match err {
            LoaderError::DataSourceUnavailable { attempts } => assert_eq!(attempts.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }

    #[test]
    fn no_candidates_is_unavailable() {
        assert!(matches!(
            DataLoader::load(&[]),
            Err(LoaderError::DataSourceUnavailable { .. })
        ));
    }

    #[test]
    fn header_names_trim_and_fill_blanks() {
        let header = vec![
            Data::String(" COB_DESC ".to_string()),
            Data::Empty,
            Data::String("COB_DESC".to_string()),
        ];
        assert_eq!(
            header_names(&header),
            vec!["COB_DESC", "column_2", "COB_DESC"]
        );
    }
}

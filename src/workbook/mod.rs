//! Planilha de termos: listas nomeadas de linhas.
//!
//! A decodificação do arquivo original (xlsx) fica fora do crate. Aqui chega
//! uma exportação JSON com a grade de células de cada lista, que é convertida
//! em linhas de termos pelo mapeamento de cabeçalhos.

mod headers;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::srs::TermRow;
use crate::{LeitboxError, LeitboxResult};

pub use headers::{map_headers, rows_from_grid, ColumnMap};

/// Uma lista (aba) da planilha.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<TermRow>,
}

/// Planilha importada, com as listas na ordem original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workbook {
    pub filename: String,
    pub saved_at: DateTime<Utc>,
    /// SHA-256 do arquivo de origem.
    pub digest: String,
    pub sheets: Vec<Sheet>,
}

/// Formato de entrada: `{"sheets": [{"name": ..., "rows": [[...], ...]}]}`.
#[derive(Debug, Deserialize)]
struct WorkbookSource {
    #[serde(default)]
    sheets: Vec<SheetSource>,
}

#[derive(Debug, Deserialize)]
struct SheetSource {
    name: String,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// SHA-256 em hexadecimal.
pub fn digest_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

impl Workbook {
    /// Monta a planilha a partir das grades já decodificadas de cada lista.
    pub fn from_grids<I>(filename: impl Into<String>, grids: I, digest: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (String, Vec<Vec<String>>)>,
    {
        let sheets = grids
            .into_iter()
            .map(|(name, grid)| Sheet {
                rows: rows_from_grid(&grid),
                name,
            })
            .collect();

        Self {
            filename: filename.into(),
            saved_at: Utc::now(),
            digest: digest.into(),
            sheets,
        }
    }

    /// Interpreta a exportação JSON de uma planilha.
    pub fn from_json_bytes(filename: impl Into<String>, bytes: &[u8]) -> LeitboxResult<Self> {
        let source: WorkbookSource = serde_json::from_slice(bytes)?;
        let grids = source.sheets.into_iter().map(|sheet| {
            let grid = sheet
                .rows
                .iter()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            (sheet.name, grid)
        });

        Ok(Self::from_grids(filename, grids, digest_bytes(bytes)))
    }

    /// Lê a exportação JSON de um arquivo.
    pub fn read_json(path: &Path) -> LeitboxResult<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_json_bytes(filename, &bytes)
    }

    /// Nomes das listas, na ordem da planilha.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Linhas de uma lista.
    pub fn rows_for(&self, sheet: &str) -> LeitboxResult<&[TermRow]> {
        self.sheets
            .iter()
            .find(|s| s.name == sheet)
            .map(|s| s.rows.as_slice())
            .ok_or_else(|| LeitboxError::SheetNotFound(sheet.to_string()))
    }

    /// Lista padrão: a preferida se existir, senão a primeira.
    pub fn default_sheet(&self, preferred: Option<&str>) -> Option<&str> {
        preferred
            .and_then(|p| self.sheets.iter().find(|s| s.name == p))
            .or_else(|| self.sheets.first())
            .map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "sheets": [
            {"name": "Lesson 1", "rows": [["English", "Translation", "Audio"], ["dog", "pes", null], [42, "čtyřicet dva"]]},
            {"name": "Lesson 2", "rows": [["thank you", "děkuji"]]},
            {"name": "Empty"}
        ]
    }"#;

    #[test]
    fn test_from_json_bytes() {
        let wb = Workbook::from_json_bytes("words.json", SAMPLE.as_bytes()).unwrap();

        assert_eq!(wb.sheet_names(), vec!["Lesson 1", "Lesson 2", "Empty"]);
        assert_eq!(wb.filename, "words.json");
        assert_eq!(wb.digest, digest_bytes(SAMPLE.as_bytes()));

        let rows = wb.rows_for("Lesson 1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], TermRow::pair("dog", "pes"));
        assert_eq!(rows[1].term, "42");

        assert_eq!(wb.rows_for("Lesson 2").unwrap()[0].translation, "děkuji");
        assert!(wb.rows_for("Empty").unwrap().is_empty());
    }

    #[test]
    fn test_missing_sheet() {
        let wb = Workbook::from_json_bytes("w.json", SAMPLE.as_bytes()).unwrap();
        assert!(matches!(
            wb.rows_for("Nope"),
            Err(LeitboxError::SheetNotFound(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_default_sheet() {
        let wb = Workbook::from_json_bytes("w.json", SAMPLE.as_bytes()).unwrap();
        assert_eq!(wb.default_sheet(None), Some("Lesson 1"));
        assert_eq!(wb.default_sheet(Some("Lesson 2")), Some("Lesson 2"));
        assert_eq!(wb.default_sheet(Some("Missing")), Some("Lesson 1"));

        let empty = Workbook::from_grids("e.json", Vec::<(String, Vec<Vec<String>>)>::new(), "");
        assert_eq!(empty.default_sheet(None), None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(Workbook::from_json_bytes("w.json", b"not json").is_err());
    }
}

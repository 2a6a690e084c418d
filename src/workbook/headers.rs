//! Extração de linhas de termos a partir da grade de uma planilha.

use crate::srs::TermRow;

/// Apelidos aceitos no cabeçalho (minúsculos, sem espaços).
const TERM_ALIASES: &[&str] = &["english", "word", "en", "term"];
const TRANSLATION_ALIASES: &[&str] = &["translation", "cz", "cs", "czech", "česky"];
const AUDIO_ALIASES: &[&str] = &["pronunciationurl", "pronunciation", "url", "audio"];

/// Posição de cada coluna conhecida no cabeçalho.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub term: Option<usize>,
    pub translation: Option<usize>,
    pub audio_reference: Option<usize>,
}

impl ColumnMap {
    /// Nenhuma coluna reconhecida.
    pub fn is_empty(&self) -> bool {
        self.term.is_none() && self.translation.is_none() && self.audio_reference.is_none()
    }
}

fn normalize_header(cell: &str) -> String {
    cell.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Mapeia o cabeçalho para colunas; a primeira coluna que casa vence.
pub fn map_headers(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();

    for (i, header) in headers.iter().enumerate() {
        let h = normalize_header(header);
        if map.term.is_none() && TERM_ALIASES.contains(&h.as_str()) {
            map.term = Some(i);
        }
        if map.translation.is_none() && TRANSLATION_ALIASES.contains(&h.as_str()) {
            map.translation = Some(i);
        }
        if map.audio_reference.is_none() && AUDIO_ALIASES.contains(&h.as_str()) {
            map.audio_reference = Some(i);
        }
    }

    map
}

fn cell(row: &[String], idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).cloned().unwrap_or_default()
}

/// Converte a grade de uma planilha em linhas de termos.
///
/// Sem cabeçalho reconhecido, as colunas são posicionais (termo, tradução,
/// áudio) e a primeira linha só é descartada se as duas primeiras células
/// estiverem vazias. Linhas sem termo e sem tradução são ignoradas.
pub fn rows_from_grid(grid: &[Vec<String>]) -> Vec<TermRow> {
    let Some(headers) = grid.first() else {
        return Vec::new();
    };

    let mut map = map_headers(headers);
    let mut start = 1;

    if map.is_empty() {
        map = ColumnMap {
            term: Some(0),
            translation: Some(1),
            audio_reference: Some(2),
        };
        let first = cell(headers, Some(0));
        let second = cell(headers, Some(1));
        if !first.trim().is_empty() || !second.trim().is_empty() {
            start = 0;
        }
    }

    grid.iter()
        .skip(start)
        .map(|row| TermRow {
            term: cell(row, map.term),
            translation: cell(row, map.translation),
            audio_reference: cell(row, map.audio_reference),
        })
        .filter(|row| !row.term.is_empty() || !row.translation.is_empty())
        .collect()
}

//! Armazenamento de progresso em SQLite.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::srs::{clamp_box, Card};
use crate::workbook::Workbook;
use crate::LeitboxResult;

use super::ProgressStore;

/// Uma avaliação registrada no log de revisões.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub session_id: Uuid,
    pub set_key: String,
    pub card_id: String,
    pub was_correct: bool,
    pub box_before: u8,
    pub box_after: u8,
    pub reviewed_at: DateTime<Utc>,
}

/// Progresso persistido em um arquivo SQLite.
pub struct SqliteProgressStore {
    pub(crate) conn: Connection,
}

fn millis_to_datetime(col: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(col, ms))
}

impl SqliteProgressStore {
    /// Cria ou abre o banco de progresso.
    pub fn open(db_path: &Path) -> LeitboxResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// Banco em memória, descartado ao fechar.
    pub fn in_memory() -> LeitboxResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> LeitboxResult<Self> {
        // Cria as tabelas se não existirem
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sets (
                set_key TEXT PRIMARY KEY,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cards (
                set_key TEXT NOT NULL,
                position INTEGER NOT NULL,
                id TEXT NOT NULL,
                term TEXT NOT NULL,
                translation TEXT NOT NULL,
                audio_reference TEXT NOT NULL,
                box INTEGER NOT NULL,
                last_reviewed_at INTEGER,
                correct_count INTEGER NOT NULL DEFAULT 0,
                wrong_count INTEGER NOT NULL DEFAULT 0,
                due_at INTEGER NOT NULL,
                PRIMARY KEY (set_key, position)
            );

            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                set_key TEXT NOT NULL,
                card_id TEXT NOT NULL,
                was_correct BOOLEAN NOT NULL,
                box_before INTEGER NOT NULL,
                box_after INTEGER NOT NULL,
                reviewed_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workbook (
                slot INTEGER PRIMARY KEY CHECK (slot = 1),
                payload TEXT NOT NULL,
                saved_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_cards_id ON cards(set_key, id);
            CREATE INDEX IF NOT EXISTS idx_reviews_set ON reviews(set_key, reviewed_at);
        "#,
        )?;

        Ok(Self { conn })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Log de revisões
    // ═══════════════════════════════════════════════════════════════════════

    /// Registra uma avaliação no log.
    pub fn log_review(&mut self, entry: &ReviewEntry) -> LeitboxResult<()> {
        self.conn.execute(
            "INSERT INTO reviews (session_id, set_key, card_id, was_correct,
                                  box_before, box_after, reviewed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.session_id.to_string(),
                entry.set_key,
                entry.card_id,
                entry.was_correct,
                entry.box_before,
                entry.box_after,
                entry.reviewed_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    /// Avaliações mais recentes da lista, da mais nova para a mais antiga.
    pub fn recent_reviews(&self, set_key: &str, limit: usize) -> LeitboxResult<Vec<ReviewEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, set_key, card_id, was_correct, box_before, box_after, reviewed_at
             FROM reviews
             WHERE set_key = ?
             ORDER BY reviewed_at DESC, id DESC
             LIMIT ?",
        )?;

        let entries = stmt
            .query_map(params![set_key, limit as i64], |row| {
                let session: String = row.get(0)?;
                Ok(ReviewEntry {
                    session_id: Uuid::parse_str(&session).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            0,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    set_key: row.get(1)?,
                    card_id: row.get(2)?,
                    was_correct: row.get(3)?,
                    box_before: clamp_box(row.get(4)?),
                    box_after: clamp_box(row.get(5)?),
                    reviewed_at: millis_to_datetime(6, row.get(6)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Total de avaliações registradas na lista.
    pub fn count_reviews(&self, set_key: &str) -> LeitboxResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reviews WHERE set_key = ?",
            params![set_key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Última planilha importada
    // ═══════════════════════════════════════════════════════════════════════

    /// Guarda a planilha, substituindo a anterior.
    pub fn save_workbook(&mut self, workbook: &Workbook) -> LeitboxResult<()> {
        let payload = serde_json::to_string(workbook)?;
        self.conn.execute(
            "INSERT INTO workbook (slot, payload, saved_at) VALUES (1, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET payload = excluded.payload,
                                             saved_at = excluded.saved_at",
            params![payload, workbook.saved_at.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Última planilha importada, se houver e se for legível.
    pub fn load_workbook(&self) -> LeitboxResult<Option<Workbook>> {
        let payload: Option<String> = self
            .conn
            .query_row("SELECT payload FROM workbook WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(workbook) => Ok(Some(workbook)),
            Err(e) => {
                tracing::warn!(error = %e, "Planilha salva ilegível, ignorando");
                Ok(None)
            }
        }
    }
}

impl ProgressStore for SqliteProgressStore {
    fn load(&self, set_key: &str) -> LeitboxResult<Option<Vec<Card>>> {
        let known: Option<i64> = self
            .conn
            .query_row(
                "SELECT updated_at FROM sets WHERE set_key = ?",
                params![set_key],
                |row| row.get(0),
            )
            .optional()?;

        if known.is_none() {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, term, translation, audio_reference, box, last_reviewed_at,
                    correct_count, wrong_count, due_at
             FROM cards WHERE set_key = ? ORDER BY position",
        )?;

        let cards = stmt
            .query_map(params![set_key], |row| {
                let last_reviewed_at = match row.get::<_, Option<i64>>(5)? {
                    Some(ms) => Some(millis_to_datetime(5, ms)?),
                    None => None,
                };
                Ok(Card {
                    id: row.get(0)?,
                    term: row.get(1)?,
                    translation: row.get(2)?,
                    audio_reference: row.get(3)?,
                    box_level: clamp_box(row.get(4)?),
                    last_reviewed_at,
                    correct_count: row.get(6)?,
                    wrong_count: row.get(7)?,
                    due_at: millis_to_datetime(8, row.get(8)?)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(cards))
    }

    fn save(&mut self, set_key: &str, cards: &[Card]) -> LeitboxResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM cards WHERE set_key = ?", params![set_key])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cards (set_key, position, id, term, translation, audio_reference,
                                    box, last_reviewed_at, correct_count, wrong_count, due_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for (position, card) in cards.iter().enumerate() {
                stmt.execute(params![
                    set_key,
                    position as i64,
                    card.id,
                    card.term,
                    card.translation,
                    card.audio_reference,
                    card.box_level,
                    card.last_reviewed_at.map(|t| t.timestamp_millis()),
                    card.correct_count,
                    card.wrong_count,
                    card.due_at.timestamp_millis()
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO sets (set_key, updated_at) VALUES (?, ?)
             ON CONFLICT(set_key) DO UPDATE SET updated_at = excluded.updated_at",
            params![set_key, Utc::now().timestamp_millis()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn clear(&mut self, set_key: &str) -> LeitboxResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cards WHERE set_key = ?", params![set_key])?;
        tx.execute("DELETE FROM reviews WHERE set_key = ?", params![set_key])?;
        tx.execute("DELETE FROM sets WHERE set_key = ?", params![set_key])?;
        tx.commit()?;

        tracing::info!(set_key = %set_key, "Progresso removido");
        Ok(())
    }

    fn set_keys(&self) -> LeitboxResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT set_key FROM sets ORDER BY set_key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

//! Export/Import do progresso em JSON.
//!
//! Permite levar o progresso de todas as listas para outra máquina ou
//! guardar um backup antes de um reset.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::Card;
use crate::LeitboxResult;

use super::ProgressStore;

/// Versão atual do formato de exportação.
const EXPORT_VERSION: &str = "1.0";

/// Estrutura de exportação do progresso.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressExport {
    /// Versão do formato de exportação.
    pub version: String,
    /// Data/hora da exportação.
    pub exported_at: DateTime<Utc>,
    /// Cartões por lista.
    pub sets: BTreeMap<String, Vec<Card>>,
}

/// Resultado de uma restauração.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreResult {
    /// Listas restauradas.
    pub sets_restored: usize,
    /// Listas ignoradas por estarem ilegíveis.
    pub sets_skipped: usize,
    /// Total de cartões gravados.
    pub cards: usize,
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(default)]
    sets: BTreeMap<String, serde_json::Value>,
}

impl ProgressExport {
    /// Coleta o progresso de todas as listas do armazenamento.
    pub fn collect<S: ProgressStore + ?Sized>(store: &S) -> LeitboxResult<Self> {
        let mut sets = BTreeMap::new();
        for key in store.set_keys()? {
            match store.load(&key) {
                Ok(Some(cards)) => {
                    sets.insert(key, cards);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(set_key = %key, error = %e, "Lista ilegível fora da exportação");
                }
            }
        }

        Ok(Self {
            version: EXPORT_VERSION.to_string(),
            exported_at: Utc::now(),
            sets,
        })
    }

    /// Total de cartões exportados.
    pub fn card_count(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }

    /// Exporta para arquivo JSON.
    pub fn write_to(&self, path: &Path) -> LeitboxResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        tracing::info!(
            path = %path.display(),
            sets = self.sets.len(),
            cards = self.card_count(),
            "Progresso exportado"
        );

        Ok(())
    }

    /// Restaura um arquivo exportado, substituindo o progresso das listas presentes nele.
    ///
    /// Listas cujo conteúdo não é uma lista de cartões válida são ignoradas.
    pub fn restore_into<S: ProgressStore + ?Sized>(
        path: &Path,
        store: &mut S,
    ) -> LeitboxResult<RestoreResult> {
        let json = std::fs::read_to_string(path)?;
        let raw: RawExport = serde_json::from_str(&json)?;

        let mut result = RestoreResult::default();

        for (key, value) in raw.sets {
            match serde_json::from_value::<Vec<Card>>(value) {
                Ok(mut cards) => {
                    cards.iter_mut().for_each(Card::sanitize);
                    store.save(&key, &cards)?;
                    result.sets_restored += 1;
                    result.cards += cards.len();
                }
                Err(e) => {
                    tracing::warn!(set_key = %key, error = %e, "Lista ilegível ignorada");
                    result.sets_skipped += 1;
                }
            }
        }

        tracing::info!(
            path = %path.display(),
            restored = result.sets_restored,
            skipped = result.sets_skipped,
            "Progresso restaurado"
        );

        Ok(result)
    }
}

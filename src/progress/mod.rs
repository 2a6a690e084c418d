//! Persistência e reconciliação de progresso.
//!
//! ## Componentes
//!
//! - **ProgressStore**: contrato de armazenamento por lista (`load`/`save`/`clear`)
//! - **MemoryProgressStore**: implementação em memória
//! - **SqliteProgressStore**: banco SQLite com cartões, log de revisões e a última planilha
//! - **merge_progress**: reconcilia linhas recém-importadas com o progresso salvo
//! - **Export/Import**: backup do progresso em JSON

mod export;
mod reconcile;
#[cfg(feature = "sqlite")]
mod sqlite;

use std::collections::BTreeMap;

use crate::srs::Card;
use crate::LeitboxResult;

pub use export::{ProgressExport, RestoreResult};
pub use reconcile::{merge_progress, merge_progress_at};
#[cfg(feature = "sqlite")]
pub use sqlite::{ReviewEntry, SqliteProgressStore};

/// Armazenamento do progresso de cada lista, indexado por `set_key`.
///
/// Implementações devem preservar todos os campos do cartão entre `save` e
/// `load`. `load` devolve `None` quando a lista nunca foi salva e `Err`
/// quando os dados existem mas não podem ser lidos.
pub trait ProgressStore {
    /// Carrega os cartões salvos da lista.
    fn load(&self, set_key: &str) -> LeitboxResult<Option<Vec<Card>>>;

    /// Substitui os cartões salvos da lista.
    fn save(&mut self, set_key: &str, cards: &[Card]) -> LeitboxResult<()>;

    /// Remove todo o progresso da lista.
    fn clear(&mut self, set_key: &str) -> LeitboxResult<()>;

    /// Listas com progresso salvo, em ordem alfabética.
    fn set_keys(&self) -> LeitboxResult<Vec<String>>;
}

/// Armazenamento em memória.
#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    sets: BTreeMap<String, Vec<Card>>,
}

impl MemoryProgressStore {
    /// Cria um armazenamento vazio.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, set_key: &str) -> LeitboxResult<Option<Vec<Card>>> {
        Ok(self.sets.get(set_key).cloned())
    }

    fn save(&mut self, set_key: &str, cards: &[Card]) -> LeitboxResult<()> {
        self.sets.insert(set_key.to_string(), cards.to_vec());
        Ok(())
    }

    fn clear(&mut self, set_key: &str) -> LeitboxResult<()> {
        self.sets.remove(set_key);
        Ok(())
    }

    fn set_keys(&self) -> LeitboxResult<Vec<String>> {
        Ok(self.sets.keys().cloned().collect())
    }
}

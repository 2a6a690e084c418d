//! Tipos de erro do Leitbox.

use thiserror::Error;

/// Tipo de resultado padrão do Leitbox.
pub type LeitboxResult<T> = Result<T, LeitboxError>;

/// Erros possíveis no Leitbox.
#[derive(Error, Debug)]
pub enum LeitboxError {
    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao parsear TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Erro ao serializar TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("Erro no banco de progresso: {0}")]
    Database(#[from] rusqlite::Error),

    #[cfg(feature = "cli")]
    #[error("Erro no prompt interativo: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("Lista '{0}' não encontrada na planilha")]
    SheetNotFound(String),

    #[error("Nenhuma planilha importada. Execute 'leitbox import <arquivo>' primeiro")]
    WorkbookNotImported,

    #[error("{0}")]
    Other(String),
}

impl LeitboxError {
    /// Cria um erro genérico.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Cria um erro de configuração.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }
}

//! # Leitbox
//!
//! Treino de vocabulário com caixas de Leitner.
//!
//! Leitbox agenda a revisão de pares termo/tradução em cinco caixas de
//! retenção, escolhe o próximo termo a apresentar e reconcilia planilhas
//! reimportadas com o progresso já salvo.
//!
//! ## Módulos
//!
//! - [`srs`] - Normalização de identidade, cartões, agendamento e estatísticas
//! - [`progress`] - Armazenamento e reconciliação do progresso por lista
//! - [`workbook`] - Listas de termos extraídas de uma planilha
//! - [`cli`] - Interface de linha de comando
//! - [`types`] - Configuração e erros

#[cfg(all(feature = "cli", feature = "sqlite"))]
pub mod cli;
pub mod progress;
pub mod srs;
pub mod types;
pub mod workbook;

pub use types::config::Config;
pub use types::errors::{LeitboxError, LeitboxResult};

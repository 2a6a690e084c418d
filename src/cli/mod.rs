//! Interface de linha de comando do Leitbox.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Leitbox - treino de vocabulário com caixas de Leitner.
#[derive(Parser, Debug)]
#[command(name = "leitbox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "leitbox.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inicializa configuração no diretório atual.
    Init {
        /// Diretório de destino (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Importa uma planilha (exportação JSON) e reconcilia o progresso de cada lista.
    Import {
        /// Arquivo JSON com as listas.
        input: PathBuf,
    },

    /// Lista as listas da última planilha importada.
    Sheets,

    /// Inicia uma sessão de revisão.
    Review {
        /// Lista a revisar (padrão: config ou primeira lista).
        #[arg(short, long)]
        sheet: Option<String>,

        /// Máximo de avaliações nesta sessão (0 = sem limite).
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Mostra estatísticas de uma lista ou de todas.
    Stats {
        /// Lista (padrão: todas).
        #[arg(short, long)]
        sheet: Option<String>,
    },

    /// Mostra as avaliações mais recentes.
    History {
        /// Lista (padrão: config ou primeira lista).
        #[arg(short, long)]
        sheet: Option<String>,

        /// Número de entradas.
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Apaga o progresso de uma lista.
    Reset {
        /// Lista a resetar.
        #[arg(short, long)]
        sheet: String,

        /// Não pede confirmação.
        #[arg(short, long)]
        yes: bool,
    },

    /// Exporta o progresso de todas as listas para JSON.
    Export {
        /// Arquivo de saída.
        output: PathBuf,
    },

    /// Restaura progresso de um arquivo exportado.
    Restore {
        /// Arquivo exportado.
        input: PathBuf,
    },

    /// Mostra versão.
    Version,
}

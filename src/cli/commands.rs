//! Implementação dos comandos CLI do Leitbox.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};

use crate::progress::{merge_progress, ProgressExport, ProgressStore, SqliteProgressStore};
use crate::srs::{stats_for, MAX_BOX, MIN_BOX};
use crate::types::config::Config;
use crate::workbook::Workbook;
use crate::{LeitboxError, LeitboxResult};

use super::interactive::{run_review_session, ReviewSession};

/// Cria a configuração e o diretório de dados em `path`.
pub async fn init(path: Option<PathBuf>) -> LeitboxResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    // Cria o diretório se não existir
    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Diretório criado: {}", target_dir.display());
    }

    let config_path = target_dir.join("leitbox.toml");

    if config_path.exists() {
        println!("Configuração já existe em: {}", config_path.display());
        return Ok(());
    }

    // Diretório do banco de progresso
    let data_dir = target_dir.join(".leitbox");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Diretório .leitbox/ criado");
    }

    update_gitignore(&target_dir)?;

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("Leitbox inicializado.");
    println!("Configuração criada em: {}", config_path.display());
    println!("Dados em: .leitbox/");
    println!();
    println!("Próximos passos:");
    println!("  1. Importe a planilha: leitbox import words.json");
    println!("  2. Comece a revisar: leitbox review");

    Ok(())
}

/// Garante `.leitbox/` no .gitignore.
fn update_gitignore(target_dir: &Path) -> LeitboxResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".leitbox/";
    let comment = "# Leitbox - banco de progresso local";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == ".leitbox")
        {
            tracing::debug!(".gitignore já contém .leitbox/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore atualizado com .leitbox/");
    } else {
        let content = format!("{}\n{}\n", comment, entry);
        std::fs::write(&gitignore_path, content)?;
        println!(".gitignore criado com .leitbox/");
    }

    Ok(())
}

/// Abre o banco de progresso, criando o diretório se preciso.
fn open_store(config: &Config) -> LeitboxResult<SqliteProgressStore> {
    let db_path = &config.storage.db_path;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    SqliteProgressStore::open(db_path)
}

/// Última planilha importada ou erro orientando a importar.
fn require_workbook(store: &SqliteProgressStore) -> LeitboxResult<Workbook> {
    store
        .load_workbook()?
        .ok_or(LeitboxError::WorkbookNotImported)
}

/// Resolve a lista pedida: argumento, config ou primeira da planilha.
fn resolve_sheet(
    workbook: &Workbook,
    requested: Option<String>,
    config: &Config,
) -> LeitboxResult<String> {
    if let Some(sheet) = requested {
        workbook.rows_for(&sheet)?;
        return Ok(sheet);
    }

    workbook
        .default_sheet(config.review.default_sheet.as_deref())
        .map(str::to_string)
        .ok_or_else(|| LeitboxError::other("A planilha importada não tem listas"))
}

/// Importa a planilha e reconcilia cada lista.
pub async fn import_workbook(input: &Path, config: &Config) -> LeitboxResult<()> {
    let workbook = Workbook::read_json(input)?;
    let mut store = open_store(config)?;

    if let Some(previous) = store.load_workbook()? {
        if previous.digest == workbook.digest {
            println!("Arquivo sem alterações desde a última importação.");
        }
    }

    store.save_workbook(&workbook)?;

    tracing::info!(
        file = %workbook.filename,
        sheets = workbook.sheets.len(),
        "Planilha importada"
    );

    let bar = ProgressBar::new(workbook.sheets.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut lines = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        bar.set_message(sheet.name.clone());
        let cards = merge_progress(&mut store, &sheet.name, &sheet.rows)?;
        let stats = stats_for(&cards, Utc::now());
        lines.push(format!(
            "  {} - {} termos, {} pendentes",
            sheet.name, stats.total, stats.due
        ));
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!("Planilha '{}' importada:", workbook.filename);
    for line in lines {
        println!("{}", line);
    }

    Ok(())
}

/// Lista as listas da planilha com o progresso salvo.
pub async fn sheets(config: &Config) -> LeitboxResult<()> {
    let store = open_store(config)?;
    let workbook = require_workbook(&store)?;
    let now = Utc::now();

    println!(
        "Planilha: {} (importada em {})\n",
        workbook.filename,
        workbook.saved_at.format("%Y-%m-%d %H:%M")
    );

    for sheet in &workbook.sheets {
        match store.load(&sheet.name) {
            Ok(Some(cards)) => {
                let stats = stats_for(&cards, now);
                println!(
                    "  {} - {} termos, {} pendentes, precisão {}%",
                    sheet.name, stats.total, stats.due, stats.accuracy
                );
            }
            Ok(None) => println!("  {} - {} linhas, sem progresso", sheet.name, sheet.rows.len()),
            Err(e) => {
                tracing::warn!(set_key = %sheet.name, error = %e, "Progresso ilegível");
                println!("  {} - progresso ilegível", sheet.name);
            }
        }
    }

    Ok(())
}

/// Inicia uma sessão de revisão.
pub async fn review(
    sheet: Option<String>,
    limit: Option<usize>,
    config: &Config,
) -> LeitboxResult<()> {
    let mut store = open_store(config)?;
    let workbook = require_workbook(&store)?;
    let sheet = resolve_sheet(&workbook, sheet, config)?;
    let rows = workbook.rows_for(&sheet)?;

    let cards = merge_progress(&mut store, &sheet, rows)?;
    let limit = limit.unwrap_or(config.review.session_limit);

    let mut session = ReviewSession::new(&mut store, &sheet, cards);
    run_review_session(&mut session, limit, config.review.show_audio_reference)
}

/// Mostra estatísticas de uma lista ou de todas.
pub async fn stats(sheet: Option<String>, config: &Config) -> LeitboxResult<()> {
    let store = open_store(config)?;
    let keys = match sheet {
        Some(s) => vec![s],
        None => store.set_keys()?,
    };

    if keys.is_empty() {
        println!("Nenhum progresso salvo ainda.");
        return Ok(());
    }

    let now = Utc::now();
    for key in keys {
        let Some(cards) = store.load(&key)? else {
            println!("{}: sem progresso salvo.\n", key);
            continue;
        };

        let stats = stats_for(&cards, now);
        println!("{}", key);
        println!("  {}", stats);
        if stats.answered() == 0 {
            println!("  (nenhuma avaliação ainda)");
        }
        for box_level in MIN_BOX..=MAX_BOX {
            let count = stats.in_box(box_level);
            println!("  caixa {} {:>4} {}", box_level, count, "█".repeat(count.min(40)));
        }
        println!();
    }

    Ok(())
}

/// Mostra as avaliações mais recentes de uma lista.
pub async fn history(sheet: Option<String>, limit: usize, config: &Config) -> LeitboxResult<()> {
    let store = open_store(config)?;
    let sheet = match sheet {
        Some(s) => s,
        None => {
            let workbook = require_workbook(&store)?;
            resolve_sheet(&workbook, None, config)?
        }
    };

    let entries = store.recent_reviews(&sheet, limit)?;
    if entries.is_empty() {
        println!("Nenhuma avaliação registrada para '{}'.", sheet);
        return Ok(());
    }

    println!("Últimas avaliações de '{}':\n", sheet);
    for entry in entries {
        println!(
            "  {} {} {} (caixa {} → {})",
            entry.reviewed_at.format("%Y-%m-%d %H:%M"),
            if entry.was_correct { "✓" } else { "✗" },
            entry.card_id,
            entry.box_before,
            entry.box_after
        );
    }

    Ok(())
}

/// Apaga o progresso de uma lista e a reinicia a partir das linhas salvas.
pub async fn reset(sheet: &str, yes: bool, config: &Config) -> LeitboxResult<()> {
    if !yes {
        let confirmed = dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
            .with_prompt(format!("Resetar o progresso da lista '{}'?", sheet))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Nada foi alterado.");
            return Ok(());
        }
    }

    let mut store = open_store(config)?;
    store.clear(sheet)?;

    let rows = store
        .load_workbook()?
        .and_then(|wb| wb.rows_for(sheet).ok().map(<[_]>::to_vec));

    match rows {
        Some(rows) => {
            let cards = merge_progress(&mut store, sheet, &rows)?;
            println!(
                "Progresso de '{}' resetado: {} termos de volta à caixa 1.",
                sheet,
                cards.len()
            );
        }
        None => println!("Progresso de '{}' removido.", sheet),
    }

    Ok(())
}

/// Exporta o progresso para JSON.
pub async fn export_progress(output: &Path, config: &Config) -> LeitboxResult<()> {
    let store = open_store(config)?;
    let export = ProgressExport::collect(&store)?;
    export.write_to(output)?;

    println!(
        "Progresso exportado para: {} ({} listas, {} cartões)",
        output.display(),
        export.sets.len(),
        export.card_count()
    );

    Ok(())
}

/// Restaura progresso de um arquivo exportado.
pub async fn restore_progress(input: &Path, config: &Config) -> LeitboxResult<()> {
    if !input.exists() {
        println!("Arquivo não encontrado: {}", input.display());
        return Ok(());
    }

    let mut store = open_store(config)?;
    let result = ProgressExport::restore_into(input, &mut store)?;

    println!("Restauração concluída:");
    println!("  Listas restauradas: {}", result.sets_restored);
    println!("  Listas ignoradas (ilegíveis): {}", result.sets_skipped);
    println!("  Cartões: {}", result.cards);

    Ok(())
}

/// Mostra versão.
pub fn version() {
    println!("leitbox {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Treino de vocabulário com caixas de Leitner");
}

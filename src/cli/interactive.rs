//! Sessão de revisão interativa.
//!
//! Este módulo implementa o ciclo de revisão no terminal usando dialoguer:
//! escolhe o próximo termo, revela a tradução, registra a resposta e salva.

use chrono::{DateTime, Utc};
use dialoguer::{theme::ColorfulTheme, Select};
use rand::Rng;
use uuid::Uuid;

use crate::progress::{ProgressStore, ReviewEntry, SqliteProgressStore};
use crate::srs::{is_due, pick_next_index, schedule_next, stats_for, Card, Stats};
use crate::{LeitboxError, LeitboxResult};

/// Estado de uma sessão de revisão sobre uma lista.
pub struct ReviewSession<'a> {
    store: &'a mut SqliteProgressStore,
    set_key: String,
    cards: Vec<Card>,
    session_id: Uuid,
    reviewed: usize,
    correct: usize,
}

impl<'a> ReviewSession<'a> {
    /// Cria uma sessão sobre cartões já reconciliados.
    pub fn new(store: &'a mut SqliteProgressStore, set_key: &str, cards: Vec<Card>) -> Self {
        Self {
            store,
            set_key: set_key.to_string(),
            cards,
            session_id: Uuid::new_v4(),
            reviewed: 0,
            correct: 0,
        }
    }

    /// Cartões da sessão.
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Identificador gravado no log de revisões.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Avaliações feitas nesta sessão.
    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    /// Acertos nesta sessão.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Índice do próximo cartão a apresentar.
    pub fn next_index<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> Option<usize> {
        pick_next_index(&self.cards, now, rng)
    }

    /// Registra a resposta para o cartão em `index`, salva a lista e o log.
    pub fn evaluate(
        &mut self,
        index: usize,
        was_correct: bool,
        now: DateTime<Utc>,
    ) -> LeitboxResult<ReviewEntry> {
        let Some(card) = self.cards.get_mut(index) else {
            return Err(LeitboxError::other(format!(
                "Cartão {} fora da sessão ({} cartões)",
                index,
                self.cards.len()
            )));
        };
        let box_before = card.box_level;
        schedule_next(card, was_correct, now);
        let updated = card.clone();

        // Linhas repetidas são o mesmo cartão
        for other in self.cards.iter_mut().filter(|c| c.id == updated.id) {
            *other = updated.clone();
        }

        let entry = ReviewEntry {
            session_id: self.session_id,
            set_key: self.set_key.clone(),
            card_id: updated.id,
            was_correct,
            box_before,
            box_after: updated.box_level,
            reviewed_at: now,
        };

        // A lista é salva antes da próxima avaliação
        self.store.save(&self.set_key, &self.cards)?;
        self.store.log_review(&entry)?;

        self.reviewed += 1;
        if was_correct {
            self.correct += 1;
        }

        Ok(entry)
    }

    /// Estatísticas atuais da lista.
    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        stats_for(&self.cards, now)
    }
}

/// Executa a sessão no terminal até o limite, a lista acabar ou o usuário sair.
pub fn run_review_session(
    session: &mut ReviewSession<'_>,
    limit: usize,
    show_audio_reference: bool,
) -> LeitboxResult<()> {
    let theme = ColorfulTheme::default();
    let mut rng = rand::thread_rng();

    println!("\n📚 Revisando '{}'\n", session.set_key);

    loop {
        if limit > 0 && session.reviewed() >= limit {
            println!("\nLimite de {} avaliações atingido.", limit);
            break;
        }

        let now = Utc::now();
        let Some(index) = session.next_index(now, &mut rng) else {
            println!("Nenhum termo nesta lista.");
            break;
        };

        let card = &session.cards()[index];
        println!("──────────────────────────────");
        println!("  {}", card.term);
        if card.is_new() {
            println!("  (termo novo)");
        } else if !is_due(card, now) {
            println!("  (nada vencido; adiantando a caixa {})", card.box_level);
        }

        let reveal = Select::with_theme(&theme)
            .with_prompt("Pronto?")
            .items(&["Mostrar tradução", "Sair"])
            .default(0)
            .interact()?;
        if reveal == 1 {
            break;
        }

        let card = &session.cards()[index];
        println!("  → {}", card.translation);
        if show_audio_reference && !card.audio_reference.is_empty() {
            println!("  ♪ {}", card.audio_reference);
        }

        let answer = Select::with_theme(&theme)
            .with_prompt("Você sabia?")
            .items(&["Sabia", "Não sabia", "Sair"])
            .default(0)
            .interact()?;

        let was_correct = match answer {
            0 => true,
            1 => false,
            _ => break,
        };

        let entry = session.evaluate(index, was_correct, Utc::now())?;
        println!(
            "  caixa {} → {}\n",
            entry.box_before, entry.box_after
        );
    }

    println!(
        "\nSessão encerrada: {} avaliações, {} acertos.",
        session.reviewed(),
        session.correct()
    );
    println!("{}", session.stats(Utc::now()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::merge_progress_at;
    use crate::srs::TermRow;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    #[test]
    fn test_evaluate_persists_and_logs() {
        let mut store = SqliteProgressStore::in_memory().unwrap();
        let now = at(1_700_000_000_000);
        let rows = vec![TermRow::pair("a", "1"), TermRow::pair("b", "2")];
        let cards = merge_progress_at(&mut store, "s", &rows, now).unwrap();

        let mut session = ReviewSession::new(&mut store, "s", cards);
        let mut rng = StdRng::seed_from_u64(3);

        let first = session.next_index(now, &mut rng).unwrap();
        let entry = session.evaluate(first, true, now).unwrap();
        assert_eq!(entry.box_before, 1);
        assert_eq!(entry.box_after, 2);

        // O outro cartão continua vencido e na caixa 1
        let second = session.next_index(now, &mut rng).unwrap();
        assert_ne!(first, second);
        session.evaluate(second, false, now).unwrap();

        assert_eq!(session.reviewed(), 2);
        assert_eq!(session.correct(), 1);

        let stats = session.stats(now);
        assert_eq!(stats.accuracy, 50);
        assert_eq!(stats.due, 1);

        let session_id = session.session_id();
        drop(session);

        let saved = store.load("s").unwrap().unwrap();
        assert_eq!(saved[first].box_level, 2);
        assert_eq!(saved[second].wrong_count, 1);

        let log = store.recent_reviews("s", 10).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.session_id == session_id));
    }

    #[test]
    fn test_duplicate_rows_share_evaluations() {
        let mut store = SqliteProgressStore::in_memory().unwrap();
        let now = at(1_700_000_000_000);
        let rows = vec![TermRow::pair("tree", "strom"), TermRow::pair("Tree", "strom")];
        merge_progress_at(&mut store, "s", &rows, now).unwrap();
        let cards = merge_progress_at(&mut store, "s", &rows, now).unwrap();

        let mut session = ReviewSession::new(&mut store, "s", cards);
        session.evaluate(0, true, now).unwrap();
        session.evaluate(0, true, now).unwrap();
        assert!(session.cards().iter().all(|c| c.box_level == 3));
        drop(session);

        let saved = store.load("s").unwrap().unwrap();
        assert_eq!(saved[0], saved[1]);

        let again = merge_progress_at(&mut store, "s", &rows, now).unwrap();
        assert_eq!(again[0].box_level, 3);
        assert_eq!(again[1].box_level, 3);
        assert_eq!(again[0].correct_count, 2);
    }

    #[test]
    fn test_evaluate_out_of_range_index() {
        let mut store = SqliteProgressStore::in_memory().unwrap();
        let now = at(1_700_000_000_000);
        let cards = merge_progress_at(&mut store, "s", &[TermRow::pair("a", "1")], now).unwrap();

        let mut session = ReviewSession::new(&mut store, "s", cards);
        assert!(session.evaluate(5, true, now).is_err());
        assert_eq!(session.reviewed(), 0);
        drop(session);

        assert_eq!(store.count_reviews("s").unwrap(), 0);
    }
}

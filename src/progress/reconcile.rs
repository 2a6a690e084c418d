//! Reconciliação de linhas importadas com o progresso salvo.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::srs::{init_card_at, normalize_id, Card, TermRow};
use crate::LeitboxResult;

use super::ProgressStore;

/// Reconcilia `rows` com o progresso salvo em `set_key`, usando o horário atual.
pub fn merge_progress<S>(store: &mut S, set_key: &str, rows: &[TermRow]) -> LeitboxResult<Vec<Card>>
where
    S: ProgressStore + ?Sized,
{
    merge_progress_at(store, set_key, rows, Utc::now())
}

/// Reconcilia `rows` com o progresso salvo em `set_key`.
///
/// A saída segue a ordem das linhas. Termos já conhecidos mantêm caixa,
/// contadores e vencimento; seus textos só são trocados por campos não vazios
/// da linha. Termos novos entram na caixa 1, vencidos em `now`. Cartões salvos
/// sem linha correspondente são descartados. O resultado é salvo antes de
/// retornar.
///
/// Progresso ilegível é tratado como lista vazia.
pub fn merge_progress_at<S>(
    store: &mut S,
    set_key: &str,
    rows: &[TermRow],
    now: DateTime<Utc>,
) -> LeitboxResult<Vec<Card>>
where
    S: ProgressStore + ?Sized,
{
    let existing = match store.load(set_key) {
        Ok(Some(cards)) => cards,
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(
                set_key = %set_key,
                error = %e,
                "Progresso ilegível, tratando como vazio"
            );
            Vec::new()
        }
    };

    // Em ids repetidos, o último cartão salvo vence
    let mut by_id: HashMap<String, Card> = existing
        .into_iter()
        .map(|mut card| {
            card.sanitize();
            (normalize_id(&card.term), card)
        })
        .collect();

    let mut merged: Vec<Card> = Vec::with_capacity(rows.len());
    let mut carried: Vec<(usize, String)> = Vec::new();
    let mut created = 0usize;

    for row in rows {
        let id = normalize_id(&row.term);
        match by_id.get_mut(&id) {
            Some(found) => {
                if !row.term.is_empty() {
                    found.term = row.term.clone();
                }
                if !row.translation.is_empty() {
                    found.translation = row.translation.clone();
                }
                if !row.audio_reference.is_empty() {
                    found.audio_reference = row.audio_reference.clone();
                }
                carried.push((merged.len(), id));
                merged.push(found.clone());
            }
            None => {
                created += 1;
                merged.push(init_card_at(row, now));
            }
        }
    }

    // Linhas repetidas apontam para o mesmo cartão salvo: todas as posições
    // ficam com o estado final dele.
    for (pos, id) in carried {
        if let Some(card) = by_id.get(&id) {
            merged[pos] = card.clone();
        }
    }

    store.save(set_key, &merged)?;

    tracing::debug!(
        set_key = %set_key,
        cards = merged.len(),
        created,
        "Progresso reconciliado"
    );

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::MemoryProgressStore;
    use crate::srs::schedule_next;
    use crate::LeitboxError;

    /// Armazenamento cujo `load` sempre falha.
    struct BrokenStore {
        saved: Option<Vec<Card>>,
    }

    impl ProgressStore for BrokenStore {
        fn load(&self, _set_key: &str) -> LeitboxResult<Option<Vec<Card>>> {
            Err(LeitboxError::other("corrupt"))
        }

        fn save(&mut self, _set_key: &str, cards: &[Card]) -> LeitboxResult<()> {
            self.saved = Some(cards.to_vec());
            Ok(())
        }

        fn clear(&mut self, _set_key: &str) -> LeitboxResult<()> {
            Ok(())
        }

        fn set_keys(&self) -> LeitboxResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_new_rows_become_fresh_cards() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();
        let rows = vec![TermRow::pair("dog", "pes"), TermRow::pair("cat", "kočka")];

        let cards = merge_progress_at(&mut store, "animals", &rows, now).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "dog");
        assert_eq!(cards[1].id, "cat");
        assert!(cards.iter().all(|c| c.box_level == 1 && c.due_at == now));

        // Persistido antes de retornar
        assert_eq!(store.load("animals").unwrap(), Some(cards));
    }

    #[test]
    fn test_preserves_progress_across_case() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();

        let mut saved = init_card_at(&TermRow::pair("hello", "ahoj"), now);
        saved.box_level = 3;
        saved.correct_count = 2;
        store.save("greetings", &[saved.clone()]).unwrap();

        let rows = vec![TermRow::pair("Hello", "")];
        let cards = merge_progress_at(&mut store, "greetings", &rows, now).unwrap();

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].box_level, 3);
        assert_eq!(cards[0].correct_count, 2);
        assert_eq!(cards[0].term, "Hello");
        // Campo vazio na linha mantém o valor salvo
        assert_eq!(cards[0].translation, "ahoj");
        assert_eq!(cards[0].id, "hello");
        assert_eq!(cards[0].due_at, saved.due_at);
    }

    #[test]
    fn test_follows_row_order_and_drops_removed() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();
        let first = vec![
            TermRow::pair("a", "1"),
            TermRow::pair("b", "2"),
            TermRow::pair("c", "3"),
        ];
        merge_progress_at(&mut store, "s", &first, now).unwrap();

        let second = vec![TermRow::pair("c", "3"), TermRow::pair("a", "1")];
        let cards = merge_progress_at(&mut store, "s", &second, now).unwrap();

        let ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(store.load("s").unwrap().unwrap().len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();
        let rows = vec![TermRow::pair("a", "1"), TermRow::new("b", "2", "b.mp3")];

        let mut first = merge_progress_at(&mut store, "s", &rows, now).unwrap();
        schedule_next(&mut first[1], true, now);
        store.save("s", &first).unwrap();

        let later = now + chrono::Duration::minutes(5);
        let second = merge_progress_at(&mut store, "s", &rows, later).unwrap();
        let third = merge_progress_at(&mut store, "s", &rows, later).unwrap();

        assert_eq!(second, first);
        assert_eq!(third, second);
    }

    #[test]
    fn test_unreadable_store_is_treated_as_empty() {
        let mut store = BrokenStore { saved: None };
        let rows = vec![TermRow::pair("a", "1")];

        let cards = merge_progress(&mut store, "s", &rows).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].box_level, 1);
        assert_eq!(store.saved.map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_out_of_range_box_is_clamped() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();
        let mut saved = init_card_at(&TermRow::pair("a", "1"), now);
        saved.box_level = 8;
        store.save("s", &[saved]).unwrap();

        let cards = merge_progress_at(&mut store, "s", &[TermRow::pair("a", "1")], now).unwrap();
        assert_eq!(cards[0].box_level, 5);
    }

    #[test]
    fn test_duplicate_rows_collide() {
        let mut store = MemoryProgressStore::new();
        let now = Utc::now();
        let mut saved = init_card_at(&TermRow::pair("tree", "strom"), now);
        saved.box_level = 2;
        store.save("s", &[saved]).unwrap();

        let rows = vec![
            TermRow::new("Tree", "strom", "first.mp3"),
            TermRow::new(" tree ", "", "second.mp3"),
        ];
        let cards = merge_progress_at(&mut store, "s", &rows, now).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0], cards[1]);
        assert_eq!(cards[0].audio_reference, "second.mp3");
        assert_eq!(cards[0].box_level, 2);
    }
}

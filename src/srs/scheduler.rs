//! Agendamento Leitner e escolha do próximo cartão.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::card::{clamp_box, interval_for, Card, MAX_BOX, MIN_BOX};

/// Aplica o resultado de uma avaliação ao cartão.
///
/// Acerto sobe uma caixa (até a 5), erro volta para a caixa 1. O próximo
/// vencimento é sempre `now + intervalo(caixa nova)`. Deve ser chamado uma
/// única vez por avaliação.
pub fn schedule_next(card: &mut Card, was_correct: bool, now: DateTime<Utc>) -> &mut Card {
    let next_box = if was_correct {
        card.correct_count += 1;
        (clamp_box(card.box_level as i64) + 1).min(MAX_BOX)
    } else {
        card.wrong_count += 1;
        MIN_BOX
    };

    tracing::debug!(
        card = %card.id,
        from = card.box_level,
        to = next_box,
        was_correct,
        "Card scheduled"
    );

    card.box_level = next_box;
    card.last_reviewed_at = Some(now);
    card.due_at = now + interval_for(next_box);
    card
}

/// Se o cartão já pode ser apresentado.
pub fn is_due(card: &Card, now: DateTime<Utc>) -> bool {
    card.due_at <= now
}

/// Índice do próximo cartão a apresentar.
///
/// Entre os cartões vencidos, fica com os de menor caixa; sem vencidos,
/// usa a menor caixa do conjunto todo. Empates são sorteados com `rng`.
pub fn pick_next_index<R>(cards: &[Card], now: DateTime<Utc>, rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
{
    let due: Vec<usize> = (0..cards.len())
        .filter(|&i| is_due(&cards[i], now))
        .collect();

    let candidates = if due.is_empty() {
        (0..cards.len()).collect()
    } else {
        due
    };

    let level = |i: usize| clamp_box(cards[i].box_level as i64);
    let min_box = candidates.iter().map(|&i| level(i)).min()?;
    let pool: Vec<usize> = candidates
        .into_iter()
        .filter(|&i| level(i) == min_box)
        .collect();

    pool.choose(rng).copied()
}

/// Escolhe o próximo cartão com uma fonte de aleatoriedade explícita.
pub fn pick_next_with<'a, R>(cards: &'a [Card], now: DateTime<Utc>, rng: &mut R) -> Option<&'a Card>
where
    R: Rng + ?Sized,
{
    pick_next_index(cards, now, rng).map(|i| &cards[i])
}

/// Escolhe o próximo cartão usando o gerador da thread.
pub fn pick_next(cards: &[Card], now: DateTime<Utc>) -> Option<&Card> {
    pick_next_with(cards, now, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::card::{init_card_at, TermRow};
    use chrono::Duration;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn card(term: &str, now: DateTime<Utc>) -> Card {
        init_card_at(&TermRow::pair(term, term), now)
    }

    #[test]
    fn test_correct_advances_box() {
        let now = Utc::now();
        let mut c = card("x", now);

        schedule_next(&mut c, true, now);
        assert_eq!(c.box_level, 2);
        assert_eq!(c.due_at, now + Duration::minutes(10));
        assert_eq!(c.correct_count, 1);
        assert_eq!(c.last_reviewed_at, Some(now));
    }

    #[test]
    fn test_wrong_resets_box() {
        let now = Utc::now();
        let mut c = card("x", now);
        c.box_level = 4;

        schedule_next(&mut c, false, now);
        assert_eq!(c.box_level, 1);
        assert_eq!(c.due_at, now);
        assert_eq!(c.wrong_count, 1);
        assert_eq!(c.correct_count, 0);
    }

    #[test]
    fn test_box_caps_at_five() {
        let now = Utc::now();
        let mut c = card("x", now);

        for _ in 0..10 {
            schedule_next(&mut c, true, now);
        }
        assert_eq!(c.box_level, 5);
        assert_eq!(c.due_at, now + Duration::days(3));
        assert_eq!(c.correct_count, 10);
    }

    #[test]
    fn test_out_of_range_box_is_clamped_before_use() {
        let now = Utc::now();
        let mut c = card("x", now);
        c.box_level = 0;

        schedule_next(&mut c, true, now);
        assert_eq!(c.box_level, 2);
    }

    #[test]
    fn test_is_due_boundary() {
        let now = Utc::now();
        let c = card("x", now);
        assert!(is_due(&c, now));
        assert!(!is_due(&c, now - Duration::milliseconds(1)));
    }

    #[test]
    fn test_pick_next_empty() {
        assert!(pick_next(&[], Utc::now()).is_none());
    }

    #[test]
    fn test_pick_next_prefers_due() {
        let now = Utc::now();
        let a = card("a", now);
        let mut b = card("b", now);
        schedule_next(&mut b, true, now);

        let cards = vec![a, b];
        let picked = pick_next(&cards, now).unwrap();
        assert_eq!(picked.term, "a");
    }

    #[test]
    fn test_pick_next_lowest_box_among_due() {
        let now = Utc::now();
        let mut low = card("low", now);
        let mut high = card("high", now);
        low.box_level = 2;
        high.box_level = 4;
        low.due_at = now - Duration::hours(1);
        high.due_at = now - Duration::days(2);

        let cards = vec![high, low];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let picked = pick_next_with(&cards, now, &mut rng).unwrap();
            assert_eq!(picked.term, "low");
        }
    }

    #[test]
    fn test_pick_next_without_due_uses_lowest_box() {
        let now = Utc::now();
        let mut a = card("a", now);
        let mut b = card("b", now);
        let mut c = card("c", now);
        schedule_next(&mut a, true, now);
        schedule_next(&mut b, true, now);
        schedule_next(&mut b, true, now);
        schedule_next(&mut c, true, now);

        let cards = vec![b, a, c];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let picked = pick_next_with(&cards, now, &mut rng).unwrap();
            assert!(picked.term == "a" || picked.term == "c");
        }
    }

    #[test]
    fn test_pick_next_ties_reach_every_candidate() {
        let now = Utc::now();
        let cards: Vec<Card> = ["a", "b", "c"].iter().map(|t| card(t, now)).collect();
        let mut rng = StdRng::seed_from_u64(1);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(pick_next_index(&cards, now, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_pick_next_clamps_out_of_range_boxes() {
        let now = Utc::now();
        let mut zero = card("zero", now);
        zero.box_level = 0;
        let one = card("one", now);
        let mut rng = StdRng::seed_from_u64(4);

        // Caixa 0 conta como caixa 1 e empata
        let cards = vec![zero, one];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            seen.insert(pick_next_index(&cards, now, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 2);

        let mut nine = card("nine", now);
        nine.box_level = 9;
        let mut four = card("four", now);
        four.box_level = 4;
        let cards = vec![nine, four];
        for _ in 0..20 {
            assert_eq!(pick_next_with(&cards, now, &mut rng).unwrap().term, "four");
        }
    }
}

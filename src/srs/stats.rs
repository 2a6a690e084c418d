//! Estatísticas de desempenho de uma lista.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::card::{clamp_box, Card, MAX_BOX, MIN_BOX};
use super::scheduler::is_due;

/// Resumo de uma lista de cartões.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub correct: u64,
    pub wrong: u64,
    /// Percentual de acertos, arredondado (0 sem respostas).
    pub accuracy: u32,
    /// Quantidade de cartões por caixa; as cinco caixas sempre presentes.
    pub by_box: BTreeMap<u8, usize>,
    pub due: usize,
}

impl Stats {
    /// Quantidade de cartões na caixa.
    pub fn in_box(&self, box_level: u8) -> usize {
        self.by_box.get(&box_level).copied().unwrap_or(0)
    }

    /// Total de respostas dadas.
    pub fn answered(&self) -> u64 {
        self.correct + self.wrong
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Itens: {}, Certas: {}, Erradas: {}, Precisão: {}% | Caixas:",
            self.total, self.correct, self.wrong, self.accuracy
        )?;
        for (box_level, count) in &self.by_box {
            write!(f, " [{}:{}]", box_level, count)?;
        }
        write!(f, " | Pendentes: {}", self.due)
    }
}

/// Calcula as estatísticas de `cards` no instante `now`.
pub fn stats_for(cards: &[Card], now: DateTime<Utc>) -> Stats {
    let mut by_box: BTreeMap<u8, usize> = (MIN_BOX..=MAX_BOX).map(|b| (b, 0)).collect();
    let mut correct = 0u64;
    let mut wrong = 0u64;
    let mut due = 0usize;

    for card in cards {
        correct += card.correct_count as u64;
        wrong += card.wrong_count as u64;
        *by_box.entry(clamp_box(card.box_level as i64)).or_insert(0) += 1;
        if is_due(card, now) {
            due += 1;
        }
    }

    let answered = correct + wrong;
    let accuracy = if answered > 0 {
        ((correct as f64 / answered as f64) * 100.0).round() as u32
    } else {
        0
    };

    Stats {
        total: cards.len(),
        correct,
        wrong,
        accuracy,
        by_box,
        due,
    }
}

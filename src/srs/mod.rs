//! Motor de repetição espaçada (caixas de Leitner).
//!
//! ## Componentes
//!
//! - **card**: normalização de identidade, modelo do cartão e tabela de intervalos
//! - **scheduler**: transição de caixa após uma avaliação e escolha do próximo cartão
//! - **stats**: resumo de acertos, vencidos e histograma por caixa
//!
//! Tudo aqui é função pura sobre coleções explícitas; quem chama guarda o
//! estado da sessão e persiste a lista depois de cada avaliação.

mod card;
mod scheduler;
mod stats;

pub use card::{
    clamp_box, init_card, init_card_at, interval_for, normalize_id, Card, TermRow,
    BOX_INTERVALS_MS, MAX_BOX, MIN_BOX,
};
pub use scheduler::{is_due, pick_next, pick_next_index, pick_next_with, schedule_next};
pub use stats::{stats_for, Stats};

//! Cartões e normalização de identidade.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Caixa inicial (e de retorno após um erro).
pub const MIN_BOX: u8 = 1;

/// Caixa mais alta.
pub const MAX_BOX: u8 = 5;

/// Intervalo de revisão em milissegundos, indexado pela caixa de destino (1..=5).
pub const BOX_INTERVALS_MS: [i64; MAX_BOX as usize] = [
    0,                       // imediato
    10 * 60 * 1000,          // 10 min
    60 * 60 * 1000,          // 1 h
    24 * 60 * 60 * 1000,     // 1 dia
    3 * 24 * 60 * 60 * 1000, // 3 dias
];

/// Deriva a chave de identidade de um termo.
///
/// Apenas remove espaços nas bordas e converte para minúsculas. Termos que
/// diferem só nisso colidem no mesmo cartão, e o progresso já salvo depende
/// exatamente dessa regra.
pub fn normalize_id(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Traz uma caixa persistida para o intervalo válido.
pub fn clamp_box(raw: i64) -> u8 {
    raw.clamp(MIN_BOX as i64, MAX_BOX as i64) as u8
}

/// Intervalo até a próxima revisão ao entrar na caixa `box_level`.
pub fn interval_for(box_level: u8) -> Duration {
    let idx = clamp_box(box_level as i64) as usize - 1;
    Duration::milliseconds(BOX_INTERVALS_MS[idx])
}

/// Linha de termo vinda da planilha.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermRow {
    #[serde(default, alias = "english")]
    pub term: String,
    #[serde(default)]
    pub translation: String,
    #[serde(default, alias = "pronunciationUrl")]
    pub audio_reference: String,
}

impl TermRow {
    /// Cria uma linha completa.
    pub fn new(
        term: impl Into<String>,
        translation: impl Into<String>,
        audio_reference: impl Into<String>,
    ) -> Self {
        Self {
            term: term.into(),
            translation: translation.into(),
            audio_reference: audio_reference.into(),
        }
    }

    /// Linha com termo e tradução, sem referência de áudio.
    pub fn pair(term: impl Into<String>, translation: impl Into<String>) -> Self {
        Self::new(term, translation, String::new())
    }
}

/// Registro de progresso de um termo dentro de uma lista.
///
/// O JSON usa camelCase e timestamps em milissegundos desde a época Unix.
/// Os nomes antigos `english` e `pronunciationUrl` também são aceitos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[serde(default)]
    pub id: String,

    #[serde(default, alias = "english")]
    pub term: String,

    #[serde(default)]
    pub translation: String,

    #[serde(default, alias = "pronunciationUrl")]
    pub audio_reference: String,

    #[serde(
        rename = "box",
        default = "default_box",
        deserialize_with = "deserialize_box"
    )]
    pub box_level: u8,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_reviewed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub correct_count: u32,

    #[serde(default)]
    pub wrong_count: u32,

    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub due_at: DateTime<Utc>,
}

fn default_box() -> u8 {
    MIN_BOX
}

fn deserialize_box<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(clamp_box(raw.unwrap_or(MIN_BOX as i64)))
}

impl Card {
    /// Cria um cartão novo a partir de uma linha, devido imediatamente.
    pub fn from_row(row: &TermRow, now: DateTime<Utc>) -> Self {
        Self {
            id: normalize_id(&row.term),
            term: row.term.clone(),
            translation: row.translation.clone(),
            audio_reference: row.audio_reference.clone(),
            box_level: MIN_BOX,
            last_reviewed_at: None,
            correct_count: 0,
            wrong_count: 0,
            due_at: now,
        }
    }

    /// Total de avaliações registradas.
    pub fn reviews(&self) -> u32 {
        self.correct_count + self.wrong_count
    }

    /// Se o cartão nunca foi avaliado.
    pub fn is_new(&self) -> bool {
        self.last_reviewed_at.is_none()
    }

    /// Corrige dados vindos de fora: caixa no intervalo e id derivado do termo.
    pub fn sanitize(&mut self) {
        self.box_level = clamp_box(self.box_level as i64);
        if self.id.is_empty() {
            self.id = normalize_id(&self.term);
        }
    }
}

/// Inicializa um cartão novo com o horário atual.
pub fn init_card(row: &TermRow) -> Card {
    init_card_at(row, Utc::now())
}

/// Inicializa um cartão novo com horário explícito.
pub fn init_card_at(row: &TermRow, now: DateTime<Utc>) -> Card {
    Card::from_row(row, now)
}

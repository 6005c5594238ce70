// Vocabulary correction — snaps OCR misreads back onto known domain words.
//
// OCR regularly drops or swaps a single character ("decricao" for
// "descricao"). If a token is not in the vocabulary but sits within a small
// edit distance of a vocabulary word, it is replaced by that word.
//
// Candidate selection is deterministic: the closest word wins, and among
// equally close words the lexicographically smallest one wins. The vocabulary
// is kept in a BTreeSet so a single in-order scan gives that tie-break for
// free (only a strictly smaller distance replaces the current best).

use std::cmp::min;
use std::collections::BTreeSet;

/// Default edit-distance threshold for corrections.
pub const DEFAULT_THRESHOLD: usize = 1;

/// Built-in retail receipt vocabulary (Portuguese, accents stripped).
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "acesso", "auxiliar", "avenida", "bairro", "bermuda", "brasil", "cadastre", "cadastro",
    "caixa", "calca", "camiseta", "carros", "cartao", "cartoes", "chave", "cidade", "cnpj",
    "cod", "codigo", "comete", "compra", "compras", "comprovante", "comprovantes", "concorre",
    "consulta", "consumidor", "cpf", "credito", "crime", "cupom", "debito", "desc", "desconto",
    "descontos", "descricao", "dinheiro", "documento", "economizou", "eletronico", "eletronica",
    "emit", "emitida", "endereco", "estadual", "extrato", "federal", "fem", "fiscal", "fonte",
    "forma", "ibpt", "identificado", "identificados", "imposto", "impostos", "incidente",
    "incidentes", "inf", "item", "itens", "lei", "leis", "loja", "lojas", "macaquinho",
    "maguineta", "masc", "mensagem", "municipal", "municipais", "nao", "natal", "nome", "nota",
    "pagamento", "pagos", "pijama", "produto", "produtos", "promocional", "promocionais", "qtd",
    "quem", "razao", "regata", "rua", "sefaz", "shorts", "sistema", "sistemas", "social",
    "totais", "total", "tributo", "tributos", "troco", "valor", "venda", "vendas",
];

/// A fixed set of correct words plus the edit-distance threshold used to
/// match misspellings against them.
#[derive(Debug, Clone, Default)]
pub struct VocabularyCorrector {
    words: BTreeSet<String>,
    threshold: usize,
}

impl VocabularyCorrector {
    pub fn new<I, S>(words: I, threshold: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Find the vocabulary word closest to `token` within the threshold.
    ///
    /// Returns `None` when the token is already a vocabulary word or when no
    /// word is close enough.
    pub fn find_similar(&self, token: &str) -> Option<&str> {
        if self.words.contains(token) {
            return None;
        }

        let mut best: Option<(&str, usize)> = None;
        for word in &self.words {
            // Once a candidate is found, only a strictly closer word can replace it
            let limit = best.map_or(self.threshold, |(_, d)| d.saturating_sub(1));
            if let Some(distance) = levenshtein_within(token, word, limit) {
                best = Some((word.as_str(), distance));
            }
        }
        best.map(|(word, _)| word)
    }

    /// Correct a single token; unknown tokens with no close match are kept.
    pub fn correct(&self, token: &str) -> String {
        self.find_similar(token).unwrap_or(token).to_string()
    }

    /// Correct every token of a sequence, preserving order.
    pub fn correct_all(&self, tokens: Vec<String>) -> Vec<String> {
        if self.words.is_empty() {
            return tokens;
        }
        tokens
            .into_iter()
            .map(|token| match self.find_similar(&token) {
                Some(word) => word.to_string(),
                None => token,
            })
            .collect()
    }
}

/// Levenshtein distance between `a` and `b`, or `None` once it is certain
/// to exceed `threshold`.
///
/// Two-row dynamic programming over chars, bailing out as soon as every
/// cell of a row is above the threshold.
pub fn levenshtein_within(a: &str, b: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        let distance = a.len().max(b.len());
        return (distance <= threshold).then_some(distance);
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut curr_row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr_row[0] = i + 1;
        let mut row_min = curr_row[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr_row[j + 1] = min(
                min(prev_row[j + 1] + 1, curr_row[j] + 1),
                prev_row[j] + cost,
            );
            row_min = min(row_min, curr_row[j + 1]);
        }

        if row_min > threshold {
            return None;
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[b.len()];
    (distance <= threshold).then_some(distance)
}

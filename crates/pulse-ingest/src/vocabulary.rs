//! Fixed word and phrase sets used by extraction and scoring.
//!
//! Phrases are stored in normalized form (see [`crate::normalize_text`]) so
//! they can be matched against normalized message text directly.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Phrases that flag explicit buy intent (+15 score bonus).
pub const BUY_INTENT_PHRASES: &[&str] = &[
    "quero comprar",
    "como comprar",
    "manda contrato",
    "onde compro",
    "onde comprar",
    "vou comprar",
    "passa o contrato",
];

/// Interest keywords tallied into `buyIntentHits`.
pub const INTEREST_KEYWORDS: &[&str] = &["comprar", "como compra", "como faz", "pix"];

/// Speculation keywords tallied into `speculationHits`.
pub const SPECULATION_KEYWORDS: &[&str] = &["contrato", "endereco", "dex", "liquidez"];

/// Crypto and trading vocabulary counted by the top-words view.
pub const RELEVANT_TERMS: &[&str] = &[
    "comprar", "vender", "compra", "venda", "contrato", "endereco", "dex", "liquidez",
    "token", "tokens", "moeda", "moedas", "cripto", "crypto", "preco", "valor", "pump",
    "dump", "lucro", "prejuizo", "carteira", "wallet", "holder", "holders", "airdrop",
    "staking", "listagem", "lancamento", "presale", "whitelist", "pix", "bitcoin",
    "ethereum", "solana", "trade", "trader", "grafico", "suporte", "resistencia", "alta",
    "queda", "baleia", "baleias", "mercado", "exchange", "binance", "saque", "deposito",
    "rug", "scam", "hype", "lua", "moon",
];

/// Stopwords excluded from bigram candidates (Portuguese + English).
pub static STOPWORDS: Lazy<HashSet<String>> = Lazy::new(|| {
    [
        // Portuguese
        "que", "nao", "sim", "para", "pra", "por", "com", "sem", "uma", "uns", "umas", "dos",
        "das", "nos", "nas", "num", "numa", "ele", "ela", "eles", "elas", "voce", "voces",
        "vcs", "meu", "minha", "seu", "sua", "esse", "essa", "isso", "este", "esta", "isto",
        "aqui", "ali", "mas", "mais", "muito", "muita", "tem", "ter", "tao", "ser", "foi",
        "era", "sao", "vai", "vou", "ja", "ate", "quando", "onde", "como", "qual", "quem",
        "tudo", "todo", "toda", "todos", "bem", "entao", "porque", "pois", "ainda", "agora",
        "hoje", "kkk", "kkkk", "kkkkk", "rsrs", "haha", "hahaha", "pessoal", "galera",
        "gente", "tipo", "tal", "aos", "pelo", "pela", "pelos", "pelas", "fazer", "faz",
        "estou", "esta", "tava", "to", "ta",
        // English
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
        "was", "one", "our", "out", "has", "have", "this", "that", "with", "from", "they",
        "will", "what", "when", "just", "like", "get", "got", "lol",
    ]
    .iter()
    .map(|w| w.to_string())
    .collect()
});

/// Whether `word` belongs to the fixed trading vocabulary.
pub fn is_relevant_term(word: &str) -> bool {
    static TERMS: Lazy<HashSet<&'static str>> =
        Lazy::new(|| RELEVANT_TERMS.iter().copied().collect());
    TERMS.contains(word)
}

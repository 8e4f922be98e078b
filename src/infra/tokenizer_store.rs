// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Produces the tokenizer collaborator, one of two ways:
//
//   load(path)   — a pretrained HuggingFace tokenizer.json; its
//                  own post-processor adds the special markers
//   build(texts) — a word-level vocabulary built from the
//                  training corpus, wrapped in [CLS] … [SEP]
//
// The corpus-built vocabulary is written as HuggingFace JSON and
// parsed back, so both paths end up as a tokenizers::Tokenizer.
//
// Reference: HuggingFace tokenizers crate documentation

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use tokenizers::{
    NormalizedString, Normalizer, OffsetReferential, OffsetType, PreTokenizedString,
    PreTokenizer, Tokenizer,
};

use crate::domain::error::FinetuneError;
use crate::domain::traits::Tokenize;

// Special tokens get fixed IDs matching BERT convention
const PAD_ID:  u32 = 0;
const UNK_ID:  u32 = 1;
const CLS_ID:  u32 = 101;
const SEP_ID:  u32 = 102;
const MASK_ID: u32 = 103;
const FIRST_WORD_ID: u32 = 104;

// ─── TextTokenizer ────────────────────────────────────────────────────────────
/// A `tokenizers::Tokenizer` behind the Tokenize trait.
pub struct TextTokenizer {
    inner:      Tokenizer,
    /// Some((cls, sep)) when markers must be added by hand
    markers:    Option<(u32, u32)>,
    vocab_size: usize,
}

impl TextTokenizer {
    fn new(inner: Tokenizer, markers: Option<(u32, u32)>) -> Self {
        // Ids need not be contiguous, so size by the largest id.
        let vocab_size = inner
            .get_vocab(true)
            .values()
            .copied()
            .max()
            .map_or(0, |max_id| max_id as usize + 1);
        Self { inner, markers, vocab_size }
    }

    /// Padding id: the vocabulary's own pad token, else 0.
    pub fn pad_id(&self) -> u32 {
        ["[PAD]", "<pad>"]
            .iter()
            .find_map(|tok| self.inner.token_to_id(tok))
            .unwrap_or(PAD_ID)
    }
}

impl Tokenize for TextTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, FinetuneError> {
        let enc = self
            .inner
            .encode(text, true)
            .map_err(|e| FinetuneError::Encoding(format!("cannot tokenize '{text}': {e}")))?;

        let ids = match self.markers {
            Some((cls, sep)) => {
                let mut ids = Vec::with_capacity(enc.len() + 2);
                ids.push(cls);
                ids.extend_from_slice(enc.get_ids());
                ids.push(sep);
                ids
            }
            None => enc.get_ids().to_vec(),
        };
        Ok(ids)
    }

    fn vocab_size(&self) -> usize {
        self.vocab_size
    }
}

// ─── TokenizerStore ───────────────────────────────────────────────────────────
pub struct TokenizerStore;

impl TokenizerStore {
    /// Load a pretrained tokenizer from a tokenizer.json file.
    pub fn load(path: &Path) -> Result<TextTokenizer> {
        let inner = Tokenizer::from_file(path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })?;
        tracing::info!("Loaded tokenizer from '{}'", path.display());
        Ok(TextTokenizer::new(inner, None))
    }

    /// Build a word-level tokenizer from the training texts.
    ///
    /// `vocab_size` bounds the whole id space, reserved ids
    /// included, so it is also the largest embedding this can ask for.
    pub fn build<'a>(
        texts:      impl IntoIterator<Item = &'a str>,
        vocab_size: usize,
    ) -> Result<TextTokenizer> {
        let reserved = FIRST_WORD_ID as usize;
        if vocab_size <= reserved {
            return Err(FinetuneError::Config(format!(
                "vocab size {vocab_size} leaves no room for words after {reserved} reserved ids"
            ))
            .into());
        }

        // Count words with the exact normalizer and pre-tokenizer the
        // final tokenizer runs, so every counted word is a vocab hit.
        let scaffold = parse_word_level(special_vocab())?;
        let words    = rank_words(&scaffold, texts, vocab_size - reserved)?;

        let mut vocab   = special_vocab();
        let mut next_id = FIRST_WORD_ID;
        for word in &words {
            // Skip if already a special token
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        let inner = parse_word_level(vocab)?;
        tracing::info!("Tokenizer built with {} words", next_id - FIRST_WORD_ID);
        Ok(TextTokenizer::new(inner, Some((CLS_ID, SEP_ID))))
    }
}

fn special_vocab() -> serde_json::Value {
    serde_json::json!({
        "[PAD]":  PAD_ID,
        "[UNK]":  UNK_ID,
        "[CLS]":  CLS_ID,
        "[SEP]":  SEP_ID,
        "[MASK]": MASK_ID,
    })
}

/// WordLevel tokenizer over `vocab`. Accents are kept, so Hangul
/// stays in composed syllables.
fn parse_word_level(vocab: serde_json::Value) -> Result<Tokenizer> {
    // This format is what Tokenizer::from_str() expects
    let tokenizer_json = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": PAD_ID,  "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": UNK_ID,  "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": CLS_ID,  "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": SEP_ID,  "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": MASK_ID, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": {
            "type": "BertNormalizer",
            "clean_text": true,
            "handle_chinese_chars": true,
            "strip_accents": false,
            "lowercase": true
        },
        "pre_tokenizer": {
            "type": "Whitespace"
        },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });

    Tokenizer::from_str(&tokenizer_json.to_string())
        .map_err(|e| anyhow::anyhow!("Cannot build tokenizer: {e}"))
}

/// Most frequent pre-tokens first, ties broken lexically.
fn rank_words<'a>(
    tokenizer: &Tokenizer,
    texts:     impl IntoIterator<Item = &'a str>,
    limit:     usize,
) -> Result<Vec<String>> {
    let mut freq: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in pre_tokenize(tokenizer, text)? {
            *freq.entry(word).or_insert(0) += 1;
        }
    }

    let mut words: Vec<(String, usize)> = freq.into_iter().collect();
    words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    words.truncate(limit);
    Ok(words.into_iter().map(|(w, _)| w).collect())
}

/// Normalize and split `text` the way `tokenizer` does right
/// before its model looks each piece up.
fn pre_tokenize(tokenizer: &Tokenizer, text: &str) -> Result<Vec<String>> {
    let mut normalized = NormalizedString::from(text);
    if let Some(normalizer) = tokenizer.get_normalizer() {
        normalizer
            .normalize(&mut normalized)
            .map_err(|e| anyhow::anyhow!("Cannot normalize '{text}': {e}"))?;
    }

    let mut pieces = PreTokenizedString::from(normalized);
    if let Some(pre) = tokenizer.get_pre_tokenizer() {
        pre.pre_tokenize(&mut pieces)
            .map_err(|e| anyhow::anyhow!("Cannot pre-tokenize '{text}': {e}"))?;
    }

    Ok(pieces
        .get_splits(OffsetReferential::Normalized, OffsetType::Byte)
        .into_iter()
        .map(|(piece, _, _)| piece.to_owned())
        .collect())
}

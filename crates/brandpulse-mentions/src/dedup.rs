//! Near-duplicate removal with 64-bit `SimHash` fingerprints.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::types::Document;

const SHINGLE_CHARS: usize = 4;
const FINGERPRINT_BITS: usize = 64;

/// `SimHash` over weighted character 4-grams of the lowercased text,
/// keeping only word characters.
#[must_use]
pub fn simhash(text: &str) -> u64 {
    let reduced: Vec<char> = text
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    let mut weights: HashMap<String, i64> = HashMap::new();
    if reduced.len() < SHINGLE_CHARS {
        weights.insert(reduced.iter().collect(), 1);
    } else {
        for window in reduced.windows(SHINGLE_CHARS) {
            *weights.entry(window.iter().collect()).or_insert(0) += 1;
        }
    }

    let mut totals = [0_i64; FINGERPRINT_BITS];
    for (shingle, weight) in &weights {
        let hash = feature_hash(shingle);
        for (bit, total) in totals.iter_mut().enumerate() {
            if (hash >> bit) & 1 == 1 {
                *total += weight;
            } else {
                *total -= weight;
            }
        }
    }

    totals
        .iter()
        .enumerate()
        .filter(|(_, total)| **total > 0)
        .fold(0_u64, |acc, (bit, _)| acc | (1 << bit))
}

fn feature_hash(feature: &str) -> u64 {
    let digest = Sha256::digest(feature.as_bytes());
    let mut head = [0_u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

#[must_use]
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Keep documents in order, dropping any whose fingerprint lies within
/// `threshold` bits of an already-kept document.
#[must_use]
pub fn dedup(documents: Vec<Document>, threshold: u32) -> Vec<Document> {
    let mut kept_fingerprints: Vec<u64> = Vec::with_capacity(documents.len());
    let mut kept = Vec::with_capacity(documents.len());

    for doc in documents {
        let fingerprint = simhash(&doc.text);
        let duplicate = kept_fingerprints
            .iter()
            .any(|seen| hamming_distance(*seen, fingerprint) <= threshold);
        if duplicate {
            tracing::debug!(url = %doc.url, "dropping near-duplicate document");
            continue;
        }
        kept_fingerprints.push(fingerprint);
        kept.push(doc);
    }

    kept
}

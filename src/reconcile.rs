//! Reconciliation of a freshly extracted abbreviation set against a
//! baseline dictionary snapshot.

use crate::dictionary::DictionaryEntry;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use strsim::normalized_levenshtein;
use tracing::info;

/// Set difference between a baseline snapshot and the current extraction.
///
/// The diff is keyed on the abbreviation string alone: an abbreviation
/// present on both sides is reconciled even when its descriptions differ.
/// That is a fixed contract; description drift is surfaced elsewhere.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub missing: Vec<DictionaryEntry>,
    pub newly_found: Vec<DictionaryEntry>,
}

/// Key-set difference of `baseline` vs `current`, in input order.
pub fn diff(baseline: &[DictionaryEntry], current: &[DictionaryEntry]) -> ReconciliationReport {
    let baseline_keys: BTreeSet<&str> =
        baseline.iter().map(|e| e.abbreviation.as_str()).collect();
    let current_keys: BTreeSet<&str> = current.iter().map(|e| e.abbreviation.as_str()).collect();

    let missing: Vec<DictionaryEntry> = baseline
        .iter()
        .filter(|e| !current_keys.contains(e.abbreviation.as_str()))
        .cloned()
        .collect();
    let newly_found: Vec<DictionaryEntry> = current
        .iter()
        .filter(|e| !baseline_keys.contains(e.abbreviation.as_str()))
        .cloned()
        .collect();

    info!(
        missing = missing.len(),
        newly_found = newly_found.len(),
        "reconciled against baseline"
    );
    ReconciliationReport {
        missing,
        newly_found,
    }
}

/// Two descriptions count as the same when their case-insensitive
/// Levenshtein similarity reaches `threshold` (0-100 scale).
pub fn are_similar(a: &str, b: &str, threshold: u8) -> bool {
    let ratio = normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase()) * 100.0;
    ratio >= f64::from(threshold)
}

/// Group near-duplicate descriptions.
///
/// Each description joins the first existing cluster whose representative
/// (its first member) it is similar to, else starts a new cluster. First
/// occurrence wins as canonical, so the result is order-dependent but
/// deterministic for a stable input ordering. Returns the canonical
/// description per cluster and a map from every input to its canonical form.
pub fn cluster_descriptions(
    descriptions: &[String],
    threshold: u8,
) -> (Vec<String>, BTreeMap<String, String>) {
    let mut clusters: Vec<Vec<&String>> = Vec::new();

    for desc in descriptions {
        match clusters
            .iter_mut()
            .find(|cluster| are_similar(desc, cluster[0], threshold))
        {
            Some(cluster) => cluster.push(desc),
            None => clusters.push(vec![desc]),
        }
    }

    let canonical: Vec<String> = clusters.iter().map(|c| c[0].clone()).collect();
    let merged_map = clusters
        .iter()
        .flat_map(|cluster| {
            let representative = cluster[0].clone();
            cluster
                .iter()
                .map(move |member| ((*member).clone(), representative.clone()))
        })
        .collect();

    (canonical, merged_map)
}

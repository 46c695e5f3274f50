//! Ordered-key merge: one combined column ordering plus per-key change status

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// How a key changed between base and current. Unchanged keys carry no status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    Added,
    Removed,
    Reordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<KeyStatus>,
}

/// Merged key order with the status of each key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MergedKeys {
    entries: Vec<KeyEntry>,
}

impl MergedKeys {
    pub fn entries(&self) -> &[KeyEntry] {
        &self.entries
    }

    /// Keys in merged order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Status of `key`; `None` if unchanged or not present.
    pub fn status(&self, key: &str) -> Option<KeyStatus> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .and_then(|e| e.status)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Entries that carry a status, in merged order.
    pub fn changed(&self) -> impl Iterator<Item = &KeyEntry> {
        self.entries.iter().filter(|e| e.status.is_some())
    }

    pub fn is_unchanged(&self) -> bool {
        self.changed().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge two key orderings into one sequence holding every distinct key once.
///
/// Walks both inputs in lockstep. A base key that also appears later in
/// `curr` pulls the current-side keys in front of it into the output first;
/// a base key missing from `curr` keeps its base position. Once either side
/// runs out, the rest of the other side is appended. Repeated keys only count
/// at their first occurrence.
pub fn merge_keys<B, C>(base: &[B], curr: &[C]) -> Vec<String>
where
    B: AsRef<str>,
    C: AsRef<str>,
{
    let mut merged = Vec::with_capacity(base.len().max(curr.len()));
    let mut emitted: HashSet<&str> = HashSet::new();
    let (mut bi, mut ci) = (0, 0);

    while bi < base.len() && ci < curr.len() {
        let b = base[bi].as_ref();
        let c = curr[ci].as_ref();

        if emitted.contains(b) {
            bi += 1;
        } else if emitted.contains(c) {
            ci += 1;
        } else if b == c {
            emit(b, &mut merged, &mut emitted);
            bi += 1;
            ci += 1;
        } else if let Some(offset) = curr[ci..].iter().position(|k| k.as_ref() == b) {
            for key in &curr[ci..ci + offset] {
                emit(key.as_ref(), &mut merged, &mut emitted);
            }
            emit(b, &mut merged, &mut emitted);
            bi += 1;
            ci += offset + 1;
        } else {
            emit(b, &mut merged, &mut emitted);
            bi += 1;
        }
    }

    for key in &base[bi..] {
        emit(key.as_ref(), &mut merged, &mut emitted);
    }
    for key in &curr[ci..] {
        emit(key.as_ref(), &mut merged, &mut emitted);
    }
    merged
}

fn emit<'a>(key: &'a str, merged: &mut Vec<String>, emitted: &mut HashSet<&'a str>) {
    if emitted.insert(key) {
        merged.push(key.to_string());
    }
}

/// [`merge_keys`] plus a status for every key.
///
/// Keys only in `curr` are `Added`, keys only in `base` are `Removed`. Shared
/// keys are scanned in merged order against their base index; a key whose base
/// index is not above every shared key seen before it is `Reordered`.
pub fn merge_keys_with_status<B, C>(base: &[B], curr: &[C]) -> MergedKeys
where
    B: AsRef<str>,
    C: AsRef<str>,
{
    let keys = merge_keys(base, curr);

    let mut base_index: HashMap<&str, usize> = HashMap::with_capacity(base.len());
    for (idx, key) in base.iter().enumerate() {
        base_index.entry(key.as_ref()).or_insert(idx);
    }
    let curr_keys: HashSet<&str> = curr.iter().map(|k| k.as_ref()).collect();

    let mut max_index: Option<usize> = None;
    let entries = keys
        .into_iter()
        .map(|key| {
            let status = match base_index.get(key.as_str()) {
                None => Some(KeyStatus::Added),
                Some(_) if !curr_keys.contains(key.as_str()) => Some(KeyStatus::Removed),
                Some(&idx) => match max_index {
                    Some(max) if idx <= max => Some(KeyStatus::Reordered),
                    _ => {
                        max_index = Some(idx);
                        None
                    }
                },
            };
            KeyEntry { key, status }
        })
        .collect();

    let merged = MergedKeys { entries };
    tracing::trace!(
        "Merged {} base / {} current keys into {} ({} changed)",
        base.len(),
        curr.len(),
        merged.len(),
        merged.changed().count()
    );
    merged
}

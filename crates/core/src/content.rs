//! Injected topic content.
//!
//! The decision core is topic-agnostic: key-term sets and any other
//! per-topic material are configuration loaded at startup, never constants
//! in code. A [`TopicPack`] is one JSON file; a [`TopicLibrary`] is a
//! directory of them.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Per-topic configuration consumed by the response classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPack {
    /// Display name; lookups are case-insensitive on this value.
    pub topic: String,
    /// Domain terms whose presence in a free-text answer signals
    /// understanding.
    pub key_terms: Vec<String>,
    /// Optional one-line framing for the system prompt.
    #[serde(default)]
    pub summary: Option<String>,
}

/// All topic packs known to this deployment, keyed by lowercased topic name.
#[derive(Debug, Clone, Default)]
pub struct TopicLibrary {
    packs: HashMap<String, TopicPack>,
}

impl TopicLibrary {
    pub fn new(packs: Vec<TopicPack>) -> Self {
        Self {
            packs: packs
                .into_iter()
                .map(|p| (p.topic.to_lowercase(), p))
                .collect(),
        }
    }

    /// Loads every `*.json` file in a directory as a topic pack.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut packs = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("reading topic pack directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading topic pack {}", path.display()))?;
                let pack: TopicPack = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing topic pack {}", path.display()))?;
                packs.push(pack);
            }
        }
        Ok(Self::new(packs))
    }

    pub fn get(&self, topic: &str) -> Option<&TopicPack> {
        self.packs.get(&topic.to_lowercase())
    }

    /// Key-terms for a topic. Unknown topics yield an empty set, which the
    /// classifier treats as "score every open answer low" rather than an
    /// error.
    pub fn key_terms(&self, topic: &str) -> Vec<String> {
        self.get(topic)
            .map(|p| p.key_terms.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack() -> TopicPack {
        TopicPack {
            topic: "Quantum Entanglement".into(),
            key_terms: vec!["entangled".into(), "particles".into()],
            summary: None,
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let lib = TopicLibrary::new(vec![pack()]);
        assert!(lib.get("quantum entanglement").is_some());
        assert!(lib.get("QUANTUM ENTANGLEMENT").is_some());
        assert!(lib.get("thermodynamics").is_none());
    }

    #[test]
    fn unknown_topic_yields_empty_key_terms() {
        let lib = TopicLibrary::new(vec![pack()]);
        assert!(lib.key_terms("thermodynamics").is_empty());
        assert_eq!(lib.key_terms("Quantum Entanglement").len(), 2);
    }

    #[test]
    fn pack_parses_from_json() {
        let raw = r#"{
            "topic": "Gravity",
            "key_terms": ["mass", "attraction", "force"],
            "summary": "Why things fall."
        }"#;
        let pack: TopicPack = serde_json::from_str(raw).unwrap();
        assert_eq!(pack.topic, "Gravity");
        assert_eq!(pack.key_terms.len(), 3);
        assert_eq!(pack.summary.as_deref(), Some("Why things fall."));
    }
}

use overlay::defaults::DefaultSource;
use overlay::dom::{self, Document, NodeId, SharedDocument};
use overlay::{DictionaryStore, LocalizationEngine, TranslationMap};
use std::sync::Arc;
use tempfile::TempDir;

pub fn map(entries: &[(&str, &str)]) -> TranslationMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn open_store(dir: &TempDir) -> Arc<DictionaryStore> {
    Arc::new(DictionaryStore::open(dir.path()).unwrap())
}

pub fn engine(store: &Arc<DictionaryStore>, defaults: &str) -> LocalizationEngine {
    LocalizationEngine::new(
        Arc::clone(store),
        dom::shared(Document::new()),
        DefaultSource::Inline(defaults.to_string()),
    )
}

/// Append `<tag>content</tag>` under body and return the text node.
pub fn add_text(document: &SharedDocument, tag: &str, content: &str) -> NodeId {
    let mut doc = document.lock();
    let body = doc.body();
    let element = doc.append_element(body, tag).unwrap();
    doc.append_text(element, content).unwrap()
}

pub fn text_of(document: &SharedDocument, node: NodeId) -> String {
    document.lock().text(node).unwrap().to_string()
}

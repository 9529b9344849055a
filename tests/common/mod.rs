// tests/common/mod.rs
//! Shared fixtures: a scripted in-memory gateway and a recording sink.
#![allow(dead_code)]

use moji_export::{
    AppError, Checkpoint, ExportRecord, GatewayError, ItemIdentity, MojiGateway, RemoteCall,
    ResultSink, TargetTypeSet, TraversalPlan,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Gateway that answers from canned responses and records every call.
///
/// Folder pages are keyed by `(fid, sortType)`; page index `n` (1-based)
/// returns the n-th scripted page, and anything past the script is empty.
#[derive(Default)]
pub struct FakeGateway {
    folder_lists: Mutex<Vec<Value>>,
    pages: HashMap<(String, i64), Vec<Value>>,
    words: HashMap<String, Value>,
    item_targets: Option<Value>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw `fetchMyFolders` response; the last one repeats.
    pub fn with_folder_response(self, response: Value) -> Self {
        self.folder_lists.lock().unwrap().push(response);
        self
    }

    pub fn with_pages(mut self, fid: &str, sort_type: i64, pages: Vec<Value>) -> Self {
        self.pages.insert((fid.to_string(), sort_type), pages);
        self
    }

    /// Word ids without a scripted body fail with HTTP 404.
    pub fn with_word(mut self, id: &str, spell: &str, pron: &str) -> Self {
        self.words.insert(
            id.to_string(),
            json!({"word": {"spell": spell, "pron": pron, "accent": "", "excerpt": ""}}),
        );
        self
    }

    pub fn with_item_targets(mut self, response: Value) -> Self {
        self.item_targets = Some(response);
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn function_calls(&self, name: &str) -> Vec<Map<String, Value>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::Function { name: n, params } if n == name => Some(params),
                _ => None,
            })
            .collect()
    }

    pub fn page_fetches(&self) -> Vec<Map<String, Value>> {
        self.function_calls("folder-fetchContentWithRelatives")
    }

    pub fn word_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RemoteCall::Resource { segments, query } if segments.contains(&"word".to_string()) => {
                    query.into_iter().next().map(|(_, v)| v)
                }
                _ => None,
            })
            .collect()
    }

    fn folder_response(&self) -> Value {
        let mut queue = self.folder_lists.lock().unwrap();
        match queue.len() {
            0 => json!({"result": {"code": 200, "result": []}}),
            1 => queue[0].clone(),
            _ => queue.remove(0),
        }
    }

    fn page_response(&self, params: &Map<String, Value>) -> Value {
        let fid = params["fid"].as_str().unwrap_or_default().to_string();
        let sort = params["sortType"].as_i64().unwrap_or_default();
        let index = params["pageIndex"].as_u64().unwrap_or(1) as usize;
        self.pages
            .get(&(fid, sort))
            .and_then(|pages| pages.get(index.saturating_sub(1)))
            .cloned()
            .unwrap_or_else(|| page(vec![]))
    }
}

#[async_trait::async_trait]
impl MojiGateway for FakeGateway {
    async fn send(&self, call: RemoteCall) -> Result<Value, GatewayError> {
        self.calls.lock().unwrap().push(call.clone());
        match &call {
            RemoteCall::Function { name, params } => match name.as_str() {
                "fetchMyFolders" => Ok(self.folder_response()),
                "folder-fetchContentWithRelatives" => Ok(self.page_response(params)),
                other => Err(GatewayError::HttpStatus {
                    status: reqwest::StatusCode::NOT_FOUND,
                    url: other.to_string(),
                    excerpt: String::new(),
                }),
            },
            RemoteCall::Resource { segments, query } => {
                if segments.iter().any(|s| s == "targets") {
                    return Ok(self.item_targets.clone().unwrap_or_else(|| json!({})));
                }
                let id = query.first().map(|(_, v)| v.clone()).unwrap_or_default();
                self.words
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| GatewayError::HttpStatus {
                        status: reqwest::StatusCode::NOT_FOUND,
                        url: call.label(),
                        excerpt: "not found".to_string(),
                    })
            }
        }
    }
}

/// Sink that keeps everything in memory.
#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<(ItemIdentity, ExportRecord)>,
    pub checkpoints: Vec<Checkpoint>,
    pub finished: bool,
}

impl MemorySink {
    pub fn identities(&self) -> Vec<String> {
        self.records.iter().map(|(id, _)| id.to_string()).collect()
    }
}

impl ResultSink for MemorySink {
    fn accept(&mut self, identity: &ItemIdentity, record: ExportRecord) -> Result<(), AppError> {
        self.records.push((identity.clone(), record));
        Ok(())
    }

    fn checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), AppError> {
        self.checkpoints.push(checkpoint.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), AppError> {
        self.finished = true;
        Ok(())
    }
}

/// Raw `folder-fetchContentWithRelatives` response with unknown page count.
pub fn page(items: Vec<Value>) -> Value {
    json!({"result": {"code": 200, "result": items}})
}

pub fn page_with_total(items: Vec<Value>, total: u32) -> Value {
    json!({"result": {"code": 200, "result": items, "totalPage": total}})
}

pub fn folder_list(folders: &[(&str, &str)]) -> Value {
    let rows: Vec<Value> = folders
        .iter()
        .map(|(id, title)| json!({"targetId": id, "title": title}))
        .collect();
    json!({"result": {"code": 200, "result": rows}})
}

pub fn sentence(id: &str, word_id: Option<&str>, title: &str) -> Value {
    let mut target = json!({"objectId": id, "title": title, "trans": format!("trans of {}", id)});
    if let Some(word_id) = word_id {
        target["wordId"] = json!(word_id);
    }
    json!({"targetType": 103, "target": target})
}

pub fn word(id: &str, spell: &str) -> Value {
    json!({"targetType": 102, "target": {"objectId": id, "spell": spell, "pron": "よみ", "excerpt": "meaning"}})
}

/// `n` sentences `s{offset}..`, without word references.
pub fn sentences(offset: usize, n: usize) -> Vec<Value> {
    (offset..offset + n)
        .map(|i| sentence(&format!("s{}", i), None, &format!("文{}", i)))
        .collect()
}

/// A `--all` plan with default limits.
pub fn fetch_all_plan(allowed: TargetTypeSet) -> TraversalPlan {
    TraversalPlan {
        start_page: 1,
        page_size: 20,
        sort_types: vec![0],
        fetch_all: true,
        limit: 10,
        max_pages: 200,
        stop_after_no_new: 3,
        expected: 0,
        allowed,
    }
}

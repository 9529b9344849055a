// src/api/folders.rs
//! Folder discovery and selection.

use super::MojiGateway;
use crate::constants::{FN_FETCH_MY_FOLDERS, FOLDER_LISTING_PREVIEW};
use crate::error::AppError;
use crate::model::{text_of, Folder};
use crate::types::{FolderId, ItemId};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Lists the user's folders via `fetchMyFolders`.
///
/// Some accounts return an empty list when scoped by `pfid`; in that case
/// discovery is retried exactly once without the scope. The retry is
/// best-effort: a failed or malformed retry leaves the empty list in place.
/// Transport errors still propagate.
pub async fn discover_folders(
    gateway: &dyn MojiGateway,
    pfid: Option<&FolderId>,
) -> Result<Vec<Folder>, AppError> {
    let mut params = Map::new();
    if let Some(pfid) = pfid {
        params.insert("pfid".to_string(), Value::String(pfid.to_string()));
    }

    let envelope = gateway
        .call_function(FN_FETCH_MY_FOLDERS, params)
        .await?
        .ensure_success(FN_FETCH_MY_FOLDERS)?;
    let mut rows = match envelope.result_list() {
        Some(rows) => rows.clone(),
        None => {
            return Err(AppError::UnexpectedShape {
                operation: FN_FETCH_MY_FOLDERS.to_string(),
                envelope: envelope.into_value(),
            })
        }
    };

    if pfid.is_some() && rows.is_empty() {
        log::info!("No folders under pfid; retrying {} without it", FN_FETCH_MY_FOLDERS);
        let retry = gateway.call_function(FN_FETCH_MY_FOLDERS, Map::new()).await?;
        match retry.result_list() {
            Some(list) if retry.is_success() => rows = list.clone(),
            _ => log::warn!(
                "Unscoped {} retry failed (code {}); keeping empty folder list",
                FN_FETCH_MY_FOLDERS,
                retry.code()
            ),
        }
    }

    log::info!("Folders: {}", rows.len());
    for row in rows.iter().filter(|r| r.is_object()).take(FOLDER_LISTING_PREVIEW) {
        let id = row
            .get("targetId")
            .or_else(|| row.get("objectId"))
            .or_else(|| row.get("id"))
            .map(text_of)
            .unwrap_or_default();
        let title = row
            .get("title")
            .or_else(|| row.get("name"))
            .map(text_of)
            .unwrap_or_default();
        log::info!("- {}  {}", id.trim(), title.trim());
    }

    Ok(rows.iter().filter_map(Folder::from_value).collect())
}

/// Which discovered folders a run traverses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSelection {
    /// One folder; it must be among the discovered folders.
    Explicit(FolderId),
    /// Every discovered folder, plus the scope folder itself.
    All,
    /// One folder chosen by a [`FolderHeuristic`].
    BestGuess,
}

/// Strategy for picking a folder when the user named none.
pub trait FolderHeuristic {
    fn name(&self) -> &str;

    fn pick<'a>(&self, folders: &'a [Folder]) -> Option<&'a Folder>;
}

/// Prefers folders whose title suggests example sentences.
///
/// Matches in keyword order, so a `例文` folder beats an earlier `例` one.
/// Falls back to the first folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceKeywordHeuristic;

impl SentenceKeywordHeuristic {
    const KEYWORDS: [&'static str; 5] = ["例文", "例句", "例", "sentence", "sentences"];
}

impl FolderHeuristic for SentenceKeywordHeuristic {
    fn name(&self) -> &str {
        "sentence-keyword"
    }

    fn pick<'a>(&self, folders: &'a [Folder]) -> Option<&'a Folder> {
        Self::KEYWORDS
            .iter()
            .find_map(|keyword| {
                folders
                    .iter()
                    .find(|f| f.title.to_lowercase().contains(&keyword.to_lowercase()))
            })
            .or_else(|| folders.first())
    }
}

/// Resolves a [`FolderSelection`] against the discovered folders.
pub fn select_folders(
    selection: &FolderSelection,
    folders: &[Folder],
    pfid: Option<&FolderId>,
    heuristic: &dyn FolderHeuristic,
) -> Result<Vec<Folder>, AppError> {
    match selection {
        FolderSelection::Explicit(id) => {
            let folder = folders
                .iter()
                .find(|f| &f.id == id)
                .ok_or_else(|| AppError::FolderNotFound(id.to_string()))?;
            let title = if folder.title.is_empty() {
                "(selected)"
            } else {
                folder.title.as_str()
            };
            log::info!("Using folder: {}  {}", folder.id, folder.title);
            Ok(vec![Folder::new(folder.id.clone(), title)])
        }
        FolderSelection::All => {
            let mut selected = folders.to_vec();
            if let Some(pfid) = pfid {
                if !selected.iter().any(|f| &f.id == pfid) {
                    selected.insert(0, Folder::new(pfid.clone(), "(root/pfid)"));
                }
            }
            if selected.is_empty() {
                return Err(AppError::NoFolders);
            }
            log::info!("Exporting across {} folders (--all-folders)", selected.len());
            Ok(selected)
        }
        FolderSelection::BestGuess => match (heuristic.pick(folders), pfid) {
            (Some(folder), _) => {
                log::info!(
                    "Using folder: {}  {} (picked by {})",
                    folder.id,
                    folder.title,
                    heuristic.name()
                );
                Ok(vec![folder.clone()])
            }
            (None, Some(pfid)) => {
                log::info!("No folders returned; trying --pfid as folder id: {}", pfid);
                Ok(vec![Folder::new(pfid.clone(), "(root)")])
            }
            (None, None) => Err(AppError::NoFolders),
        },
    }
}

/// Response of `api/v1/folder/items/<id>/targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTargets {
    pub response: Value,
    /// Distinct `parentFolderId` values of `list[]`, sorted.
    pub folder_ids: Vec<String>,
}

impl ItemTargets {
    pub fn from_response(response: Value) -> Self {
        let folder_ids: BTreeSet<String> = response
            .get("list")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.get("parentFolderId"))
            .filter(|id| crate::model::is_present(id))
            .map(text_of)
            .collect();
        Self {
            response,
            folder_ids: folder_ids.into_iter().collect(),
        }
    }

    /// Pretty JSON followed by the folder id listing, as printed to stdout.
    pub fn render(&self) -> Result<String, AppError> {
        let mut out = serde_json::to_string_pretty(&self.response)?;
        out.push('\n');
        if !self.folder_ids.is_empty() {
            out.push_str("\nFolder IDs (parentFolderId):\n");
            for id in &self.folder_ids {
                out.push_str(&format!("- {}\n", id));
            }
        }
        Ok(out)
    }
}

/// Looks up which folders contain a saved item.
pub async fn fetch_item_targets(
    gateway: &dyn MojiGateway,
    item_id: &ItemId,
) -> Result<ItemTargets, AppError> {
    let response = gateway
        .get_resource(&["api", "v1", "folder", "items", item_id.as_str(), "targets"], &[])
        .await?;
    Ok(ItemTargets::from_response(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn folder(id: &str, title: &str) -> Folder {
        Folder::new(FolderId::parse(id).unwrap(), title)
    }

    #[test]
    fn test_keyword_order_beats_list_order() {
        let folders = vec![folder("a", "Words"), folder("b", "例"), folder("c", "My 例文")];
        let picked = SentenceKeywordHeuristic.pick(&folders).unwrap();
        assert_eq!(picked.id.as_str(), "c");
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let folders = vec![folder("a", "Words"), folder("b", "Example SENTENCES")];
        assert_eq!(SentenceKeywordHeuristic.pick(&folders).unwrap().id.as_str(), "b");
    }

    #[test]
    fn test_heuristic_falls_back_to_first() {
        let folders = vec![folder("a", "Words"), folder("b", "Kanji")];
        assert_eq!(SentenceKeywordHeuristic.pick(&folders).unwrap().id.as_str(), "a");
        assert!(SentenceKeywordHeuristic.pick(&[]).is_none());
    }

    #[test]
    fn test_explicit_selection_requires_known_folder() {
        let folders = vec![folder("a", "")];
        let picked = select_folders(
            &FolderSelection::Explicit(FolderId::parse("a").unwrap()),
            &folders,
            None,
            &SentenceKeywordHeuristic,
        )
        .unwrap();
        assert_eq!(picked[0].title, "(selected)");

        let missing = select_folders(
            &FolderSelection::Explicit(FolderId::parse("zzz").unwrap()),
            &folders,
            None,
            &SentenceKeywordHeuristic,
        );
        assert!(matches!(missing, Err(AppError::FolderNotFound(id)) if id == "zzz"));
    }

    #[test]
    fn test_all_prepends_scope_folder_once() {
        let pfid = FolderId::parse("ROOT").unwrap();
        let folders = vec![folder("a", "A")];
        let selected =
            select_folders(&FolderSelection::All, &folders, Some(&pfid), &SentenceKeywordHeuristic)
                .unwrap();
        let ids: Vec<_> = selected.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["ROOT", "a"]);
        assert_eq!(selected[0].title, "(root/pfid)");

        let listed = vec![folder("a", "A"), folder("ROOT", "Root")];
        let selected =
            select_folders(&FolderSelection::All, &listed, Some(&pfid), &SentenceKeywordHeuristic)
                .unwrap();
        assert_eq!(selected.len(), 2);

        assert!(matches!(
            select_folders(&FolderSelection::All, &[], None, &SentenceKeywordHeuristic),
            Err(AppError::NoFolders)
        ));
    }

    #[test]
    fn test_best_guess_uses_scope_when_nothing_listed() {
        let pfid = FolderId::parse("ROOT").unwrap();
        let selected = select_folders(
            &FolderSelection::BestGuess,
            &[],
            Some(&pfid),
            &SentenceKeywordHeuristic,
        )
        .unwrap();
        assert_eq!(selected, vec![folder("ROOT", "(root)")]);

        assert!(matches!(
            select_folders(&FolderSelection::BestGuess, &[], None, &SentenceKeywordHeuristic),
            Err(AppError::NoFolders)
        ));
    }

    #[test]
    fn test_item_targets_lists_distinct_sorted_parents() {
        let targets = ItemTargets::from_response(json!({
            "code": 200,
            "list": [
                {"parentFolderId": "f2"},
                {"parentFolderId": "f1"},
                {"parentFolderId": "f2"},
                {"parentFolderId": ""},
                {"other": 1},
                "junk"
            ]
        }));
        assert_eq!(targets.folder_ids, vec!["f1", "f2"]);

        let rendered = targets.render().unwrap();
        assert!(rendered.ends_with("\nFolder IDs (parentFolderId):\n- f1\n- f2\n"));
    }

    #[test]
    fn test_item_targets_without_list() {
        let targets = ItemTargets::from_response(json!({"code": 0}));
        assert!(targets.folder_ids.is_empty());
        assert!(!targets.render().unwrap().contains("Folder IDs"));
    }
}

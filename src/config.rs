// src/config.rs
use crate::api::{ApiEndpoints, AppIdentity, FolderSelection, SessionContext};
use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_CLIENT_VERSION, DEFAULT_MAX_PAGES, DEFAULT_MOJI_APP_ID,
    DEFAULT_MOJI_APP_VERSION, DEFAULT_PAGE_SIZE, DEFAULT_PARSE_SERVER, DEFAULT_PREVIEW_LIMIT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STOP_AFTER_NO_NEW, MAX_SORT_RANGE_WIDTH, PARSE_APP_ID,
};
use crate::error::AppError;
use crate::export::TraversalPlan;
use crate::output::RunMeta;
use crate::types::{FolderId, ItemId, SessionToken, TargetTypeSet, ValidationError};
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Parse session token (r:...). Falls back to MOJI_SESSION_TOKEN.
    #[arg(long)]
    pub session_token: Option<String>,

    /// Parse installation id. Falls back to MOJI_INSTALLATION_ID.
    #[arg(long)]
    pub installation_id: Option<String>,

    /// Device id sent as X-MOJI-DEVICE-ID. Falls back to MOJI_DEVICE_ID or MOJI_PC_DEVICE_ID.
    #[arg(long)]
    pub device_id: Option<String>,

    /// Parent folder id for fetchMyFolders (often ROOT#com.mojitec.mojidict#zh-CN_ja)
    #[arg(long)]
    pub pfid: Option<String>,

    /// Parse JS SDK version string. Falls back to MOJI_PARSE_CLIENT_VERSION.
    #[arg(long)]
    pub client_version: Option<String>,

    /// MOJi application id. Falls back to MOJI_APP_ID.
    #[arg(long)]
    pub moji_app_id: Option<String>,

    /// MOJi application version. Falls back to MOJI_APP_VERSION.
    #[arg(long)]
    pub moji_app_version: Option<String>,

    /// Parse server base URL
    #[arg(long, default_value = DEFAULT_PARSE_SERVER)]
    pub parse_server: String,

    /// REST API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Folder id to export (from the folder listing)
    #[arg(long)]
    pub folder_id: Option<String>,

    /// Export across ALL folders returned by fetchMyFolders (dedupes output across folders)
    #[arg(long, default_value_t = false)]
    pub all_folders: bool,

    /// Print the folders that contain this item id, then exit
    #[arg(long)]
    pub targets_for_item: Option<String>,

    /// First page index to fetch
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Items per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub count: u32,

    /// Server sort order
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub sort_type: i64,

    /// Sort orders to sweep with --all, e.g. "0,1,2" or "0-5" or "0..5"
    #[arg(long, allow_hyphen_values = true)]
    pub sort_types: Option<String>,

    /// Maximum records to print in single-page mode
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LIMIT)]
    pub limit: usize,

    /// Which item kinds to export
    #[arg(long, value_enum, default_value_t = ExportMode::Sentences)]
    pub mode: ExportMode,

    /// Comma-separated targetType allowlist; overrides --mode (e.g. "102,103,120")
    #[arg(long)]
    pub target_types: Option<String>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a JSON document (requires --output); rewritten after every page
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Page through every selected folder until the data runs out
    #[arg(long = "all", default_value_t = false)]
    pub fetch_all: bool,

    /// Per folder/sort safety cap on pages (0 = unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: u32,

    /// Stop a folder/sort after this many consecutive pages without new items
    #[arg(long, default_value_t = DEFAULT_STOP_AFTER_NO_NEW)]
    pub stop_after_no_new: u32,

    /// Stop the whole run after this many unique items (0 = disabled)
    #[arg(long, default_value_t = 0)]
    pub expected: u64,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Named target-type presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    Sentences,
    Words,
    Both,
}

impl ExportMode {
    pub fn target_types(self) -> TargetTypeSet {
        match self {
            Self::Sentences => TargetTypeSet::sentences(),
            Self::Words => TargetTypeSet::words(),
            Self::Both => TargetTypeSet::both(),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sentences => "sentences",
            Self::Words => "words",
            Self::Both => "both",
        })
    }
}

/// Where accepted records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Text blocks on stdout.
    Stdout,
    /// Text blocks in a BOM-prefixed file.
    TextFile(PathBuf),
    /// A JSON document rewritten atomically at each checkpoint.
    JsonFile(PathBuf),
}

/// What the process does once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunCommand {
    /// Print the folders containing one item.
    ItemTargets(ItemId),
    /// Discover, select, traverse.
    Export,
}

/// Resolved run configuration. Validated before any network call.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub session: SessionContext,
    pub timeout: Duration,
    pub command: RunCommand,
    pub pfid: Option<FolderId>,
    pub selection: FolderSelection,
    pub mode: ExportMode,
    pub plan: TraversalPlan,
    pub output: OutputTarget,
    pub verbose: bool,
}

impl ExportConfig {
    /// Resolves a configuration from CLI input and the process environment.
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with_env(cli, |key| std::env::var(key).ok())
    }

    /// Like [`ExportConfig::resolve`], with an injectable environment.
    pub fn resolve_with_env<F>(cli: CommandLineInput, env: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |flag: Option<String>, keys: &[&str]| -> Option<String> {
            flag.into_iter()
                .chain(keys.iter().filter_map(|&key| env(key)))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let token = lookup(cli.session_token, &["MOJI_SESSION_TOKEN"]).ok_or_else(|| {
            AppError::MissingConfiguration(
                "Missing session token: pass --session-token or set MOJI_SESSION_TOKEN"
                    .to_string(),
            )
        })?;

        let session = SessionContext {
            session_token: SessionToken::new(token)?,
            installation_id: lookup(cli.installation_id, &["MOJI_INSTALLATION_ID"]),
            device_id: lookup(cli.device_id, &["MOJI_DEVICE_ID", "MOJI_PC_DEVICE_ID"]),
            client_version: lookup(cli.client_version, &["MOJI_PARSE_CLIENT_VERSION"])
                .unwrap_or_else(|| DEFAULT_CLIENT_VERSION.to_string()),
            app: AppIdentity {
                parse_app_id: PARSE_APP_ID.to_string(),
                moji_app_id: lookup(cli.moji_app_id, &["MOJI_APP_ID"])
                    .unwrap_or_else(|| DEFAULT_MOJI_APP_ID.to_string()),
                moji_app_version: lookup(cli.moji_app_version, &["MOJI_APP_VERSION"])
                    .unwrap_or_else(|| DEFAULT_MOJI_APP_VERSION.to_string()),
            },
            endpoints: ApiEndpoints::new(&cli.parse_server, &cli.api_base)?,
        };

        let pfid = lookup(cli.pfid, &["MOJI_ROOT_FOLDER_ID", "MOJI_PFID"])
            .map(|id| FolderId::parse(&id))
            .transpose()?;

        let command = match cli.targets_for_item.as_deref() {
            Some(item) => RunCommand::ItemTargets(ItemId::parse(item)?),
            None => RunCommand::Export,
        };

        let output = match (cli.output, cli.json) {
            (Some(path), true) => OutputTarget::JsonFile(path),
            (Some(path), false) => OutputTarget::TextFile(path),
            (None, false) => OutputTarget::Stdout,
            (None, true) if command != RunCommand::Export => OutputTarget::Stdout,
            (None, true) => return Err(ValidationError::JsonWithoutOutput.into()),
        };

        let selection = match cli.folder_id.as_deref() {
            Some(id) => FolderSelection::Explicit(FolderId::parse(id)?),
            None if cli.all_folders => FolderSelection::All,
            None => FolderSelection::BestGuess,
        };

        let allowed = match cli.target_types.as_deref() {
            Some(list) => TargetTypeSet::parse_list(list)?,
            None => None,
        }
        .unwrap_or_else(|| cli.mode.target_types());

        let sort_list = match cli.sort_types.as_deref() {
            Some(list) => parse_sort_types(list)?,
            None => Vec::new(),
        };
        let sort_types = if cli.fetch_all && !sort_list.is_empty() {
            sort_list
        } else {
            vec![cli.sort_type]
        };

        at_least("page", cli.page as i64, 1)?;
        at_least("count", cli.count as i64, 1)?;
        at_least("limit", cli.limit as i64, 1)?;
        at_least("timeout", cli.timeout as i64, 1)?;

        let plan = TraversalPlan {
            start_page: cli.page,
            page_size: cli.count,
            sort_types,
            fetch_all: cli.fetch_all,
            limit: cli.limit,
            max_pages: cli.max_pages,
            stop_after_no_new: cli.stop_after_no_new,
            expected: cli.expected,
            allowed,
        };

        Ok(ExportConfig {
            session,
            timeout: Duration::from_secs(cli.timeout),
            command,
            pfid,
            selection,
            mode: cli.mode,
            plan,
            output,
            verbose: cli.verbose,
        })
    }

    /// Meta block echoed in the JSON document.
    pub fn run_meta(&self) -> RunMeta {
        RunMeta {
            mode: self.mode.to_string(),
            target_types: self.plan.allowed.server_hint(),
            expected: self.plan.expected,
        }
    }
}

fn at_least(field: &'static str, value: i64, min: i64) -> Result<(), ValidationError> {
    if value < min {
        return Err(ValidationError::OutOfBounds { field, value, min });
    }
    Ok(())
}

/// Parses `--sort-types`: integers (negatives allowed) and inclusive
/// ranges `a-b` / `a..b` of non-negative integers, which may descend.
/// Order is kept and duplicates dropped.
pub fn parse_sort_types(input: &str) -> Result<Vec<i64>, ValidationError> {
    lazy_static::lazy_static! {
        static ref RANGE_REGEX: Regex = Regex::new(r"^(\d+)\s*(?:-|\.\.)\s*(\d+)$")
            .expect("Failed to compile sort range regex - this is a bug in the code");
    }

    let invalid = |part: &str| ValidationError::InvalidSortType(part.to_string());
    let mut sorts: Vec<i64> = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(captures) = RANGE_REGEX.captures(part) {
            let start: i64 = captures[1].parse().map_err(|_| invalid(part))?;
            let end: i64 = captures[2].parse().map_err(|_| invalid(part))?;
            if (end - start).abs() >= MAX_SORT_RANGE_WIDTH {
                return Err(invalid(part));
            }
            if start <= end {
                sorts.extend(start..=end);
            } else {
                sorts.extend((end..=start).rev());
            }
        } else {
            sorts.push(part.parse().map_err(|_| invalid(part))?);
        }
    }

    let mut seen = std::collections::HashSet::new();
    sorts.retain(|sort| seen.insert(*sort));
    Ok(sorts)
}

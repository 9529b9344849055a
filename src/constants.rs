// src/constants.rs
//! Domain constants that define the operational boundaries of the exporter.
//!
//! Each constant is named for the domain concept it constrains. Most of the
//! remote identifiers mirror what the MOJi web client sends; they are not
//! secrets, they are baked into the site's JavaScript bundles.

// ---------------------------------------------------------------------------
// Remote service
// ---------------------------------------------------------------------------

/// Parse server hosting the Cloud Functions the web client calls.
pub const DEFAULT_PARSE_SERVER: &str = "https://api.mojidict.com/parse";

/// Base URL of the MOJi REST API (word details, item targets).
pub const DEFAULT_API_BASE: &str = "https://api.mojidict.com/app/mojidict";

/// Parse application id used by mojidict.com.
pub const PARSE_APP_ID: &str = "E62VyFVLMiW7kvbtVq3p";

/// Parse JS SDK version string. Some functions are sensitive to this value;
/// `js3.4.4` is known to work against `union-api`.
pub const DEFAULT_CLIENT_VERSION: &str = "js3.4.4";

/// Operating-system marker the web client reports.
pub const CLIENT_OS: &str = "PCWeb";

pub const DEFAULT_MOJI_APP_ID: &str = "com.mojitec.mojidict";
pub const DEFAULT_MOJI_APP_VERSION: &str = "4.15.4";

/// Browser identity. Some edge/WAF configurations reject requests that
/// don't look like they come from the web app.
pub const BROWSER_ORIGIN: &str = "https://www.mojidict.com";
pub const BROWSER_REFERER: &str = "https://www.mojidict.com/collection";
pub const RESOURCE_REFERER: &str = "https://www.mojidict.com/";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

// ---------------------------------------------------------------------------
// Remote function and resource names
// ---------------------------------------------------------------------------

pub const FN_FETCH_MY_FOLDERS: &str = "fetchMyFolders";
pub const FN_FETCH_FOLDER_CONTENT: &str = "folder-fetchContentWithRelatives";

/// The envelope `code` the Cloud Functions use for success.
pub const ENVELOPE_SUCCESS_CODE: i64 = 200;

// ---------------------------------------------------------------------------
// Traversal boundaries
// ---------------------------------------------------------------------------

/// Default number of items requested per folder page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Safety cap on pages per (folder, sortType) pair. Guards against a server
/// that keeps returning pages forever.
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// Consecutive pages without a new identity before a pair is abandoned.
pub const DEFAULT_STOP_AFTER_NO_NEW: u32 = 3;

/// Records printed in single-page preview mode.
pub const DEFAULT_PREVIEW_LIMIT: usize = 10;

/// Widest `a-b` range accepted by `--sort-types`.
pub const MAX_SORT_RANGE_WIDTH: i64 = 1000;

/// Per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How many discovered folders are echoed to the log.
pub const FOLDER_LISTING_PREVIEW: usize = 30;

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;

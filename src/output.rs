// POI output: renders the position store as a Navit textfile map
//
// One line per station:
//   mg: -112.005 33.261 isotime="2024-01-01T00:00:00Z" type="poi_custom0" icon_src="/icons/active.png" label="PHX"
// Navit ignores `isotime`; it is there to make the file easier to follow.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::constants::{LABEL_COMMENT_SEPARATOR, POI_TYPE};
use crate::error::{BridgeError, Result};
use crate::staleness::{Activity, Thresholds};
use crate::store::{PositionEntry, PositionStore};

/// How entries are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiStyle {
    pub active_icon: String,
    pub inactive_icon: String,
    /// Append the comment to the label when non-empty
    pub show_comment: bool,
}

impl PoiStyle {
    fn icon(&self, activity: Activity) -> &str {
        match activity {
            Activity::Active => &self.active_icon,
            Activity::Inactive => &self.inactive_icon,
        }
    }
}

/// Label text: the source, followed by an m-dash and the comment when enabled and non-empty.
pub fn label(entry: &PositionEntry, show_comment: bool) -> String {
    let text = if show_comment && !entry.comment.is_empty() {
        format!("{}{}{}", entry.source, LABEL_COMMENT_SEPARATOR, entry.comment)
    } else {
        entry.source.clone()
    };
    sanitize_attribute(&text)
}

/// Keep an attribute value on one line and inside its quotes.
fn sanitize_attribute(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}

/// One POI line, newline included.
pub fn format_line(entry: &PositionEntry, icon: &str, show_comment: bool) -> String {
    format!(
        "mg: {} {} isotime=\"{}\" type=\"{}\" icon_src=\"{}\" label=\"{}\"\n",
        entry.longitude,
        entry.latitude,
        sanitize_attribute(&entry.isotime),
        POI_TYPE,
        sanitize_attribute(icon),
        label(entry, show_comment)
    )
}

/// Render the whole store, most recent report first.
pub fn render(store: &PositionStore, now: DateTime<Utc>, thresholds: &Thresholds, style: &PoiStyle) -> String {
    store
        .by_recency()
        .into_iter()
        .map(|entry| {
            let icon = style.icon(thresholds.classify(entry, now));
            format_line(entry, icon, style.show_comment)
        })
        .collect()
}

/// The POI file Navit reads.
#[derive(Debug, Clone)]
pub struct PoiFile {
    path: PathBuf,
}

impl PoiFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        PoiFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Replace the file contents with `text`.
    ///
    /// Written to a sibling temp file and renamed over the target, so a reader
    /// sees either the previous file or the new one, never a partial write.
    pub fn write(&self, text: &str) -> Result<()> {
        let temp = self.temp_path();
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(text.as_bytes())?;
            file.sync_all()
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&temp);
            return Err(BridgeError::io(&temp, e));
        }
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            BridgeError::io(&self.path, e)
        })
    }
}

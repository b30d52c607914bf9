use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

use crate::config::RefreshCfg;
use crate::error::{GiftError, Result};
use crate::gifts;
use crate::timestamp::{self, ValidityWindow};

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub path: PathBuf,
    pub window: ValidityWindow,
    /// Records rewritten.
    pub records: usize,
    /// Records whose new window contains the refresh time.
    pub active: usize,
}

/// Swaps a value for `iso`, keeping whatever whitespace and comments sat around it.
fn replace_keeping_decor(slot: &mut Value, iso: &str) {
    let decor = slot.decor().clone();
    *slot = Value::from(iso);
    *slot.decor_mut() = decor;
}

fn stamp_table(table: &mut Table, field: &str, iso: &str) {
    match table.get_mut(field).and_then(Item::as_value_mut) {
        Some(slot) => replace_keeping_decor(slot, iso),
        None => {
            table.insert(field, toml_edit::value(iso));
        }
    }
}

fn stamp_inline(table: &mut InlineTable, field: &str, iso: &str) {
    match table.get_mut(field) {
        Some(slot) => replace_keeping_decor(slot, iso),
        None => {
            table.insert(field, Value::from(iso));
        }
    }
}

/// Puts every gift in the collection onto `window`, in place.
///
/// The collection is checked before anything is touched, so an error leaves
/// `doc` exactly as it was. Returns the number of records rewritten.
pub fn refresh_document(doc: &mut DocumentMut, cfg: &RefreshCfg, window: &ValidityWindow) -> Result<usize> {
    let start = timestamp::format_iso(&window.start);
    let end = timestamp::format_iso(&window.end);
    let key = cfg.collection.as_str();

    match doc.get_mut(key) {
        None | Some(Item::None) => Err(GiftError::MissingCollection { key: key.to_string() }),
        Some(Item::ArrayOfTables(aot)) => {
            for table in aot.iter_mut() {
                stamp_table(table, &cfg.start_field, &start);
                stamp_table(table, &cfg.end_field, &end);
            }
            Ok(aot.len())
        }
        Some(Item::Value(Value::Array(arr))) => {
            if let Some((index, v)) = arr.iter().enumerate().find(|(_, v)| !v.is_inline_table()) {
                return Err(GiftError::NotARecord {
                    key: key.to_string(),
                    index,
                    found: v.type_name(),
                });
            }
            for table in arr.iter_mut().filter_map(Value::as_inline_table_mut) {
                stamp_inline(table, &cfg.start_field, &start);
                stamp_inline(table, &cfg.end_field, &end);
            }
            Ok(arr.len())
        }
        Some(other) => Err(GiftError::NotACollection {
            key: key.to_string(),
            found: other.type_name(),
        }),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "gifts.toml".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Replaces the file's contents with `contents`.
///
/// The default writes in place, which keeps the inode and fires the
/// modify event the gift server watches for. With `atomic` the bytes go to a
/// temp file beside the symlink-resolved target and are renamed over it, so
/// readers see either the old file or the new one but a watcher on the old
/// inode sees no write.
pub fn write_file(path: &Path, contents: &str, atomic: bool) -> Result<()> {
    if !atomic {
        return fs::write(path, contents)
            .map_err(|e| GiftError::WriteError { path: path.to_path_buf(), source: e });
    }

    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let tmp = temp_path(&target);
    fs::write(&tmp, contents).map_err(|e| GiftError::WriteError { path: tmp.clone(), source: e })?;
    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(GiftError::WriteError { path: target, source: e });
    }
    Ok(())
}

/// One read-modify-write cycle over the gift file at `cfg.path`.
///
/// Nothing is written unless every record could be refreshed.
pub fn refresh_file(cfg: &RefreshCfg, now: NaiveDateTime) -> Result<RefreshReport> {
    let path = cfg.path.clone();
    let text = fs::read_to_string(&path)
        .map_err(|e| GiftError::ReadError { path: path.clone(), source: e })?;
    let mut doc: DocumentMut = text.parse().map_err(|e: toml_edit::TomlError| GiftError::ParseError {
        path: path.clone(),
        kind: "toml",
        message: e.to_string(),
    })?;

    let window = ValidityWindow::starting_at(now, cfg.validity_days);
    let records = refresh_document(&mut doc, cfg, &window)?;
    let refreshed = gifts::records(&doc, cfg)?;
    for gift in &refreshed {
        tracing::debug!(
            index = gift.index,
            name = gift.name.as_deref().unwrap_or("<unnamed>"),
            gift_type = gift.gift_type.as_deref().unwrap_or("<untyped>"),
            days = gift.window.len().num_days(),
            "gift refreshed"
        );
    }
    let active = gifts::active_at(&refreshed, &now).len();

    write_file(&path, &doc.to_string(), cfg.atomic_write)?;
    tracing::info!(path = %path.display(), records, active, atomic = cfg.atomic_write, "gift file rewritten");

    Ok(RefreshReport { path, window, records, active })
}

pub fn summary_line(report: &RefreshReport) -> String {
    format!(
        "Updated dates: {} to {}",
        timestamp::format_display(&report.window.start),
        timestamp::format_display(&report.window.end)
    )
}

pub fn run(cfg: &RefreshCfg) -> Result<RefreshReport> {
    let report = refresh_file(cfg, timestamp::now())?;
    println!("{}", summary_line(&report));
    Ok(report)
}

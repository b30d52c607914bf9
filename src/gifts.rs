use chrono::NaiveDateTime;
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

use crate::config::RefreshCfg;
use crate::error::{GiftError, Result};
use crate::timestamp::{self, ValidityWindow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiftRecord {
    /// Position in the collection, for error messages and logs.
    pub index: usize,
    pub name: Option<String>,
    pub gift_type: Option<String>,
    pub window: ValidityWindow,
}

impl GiftRecord {
    pub fn is_active_at(&self, t: &NaiveDateTime) -> bool {
        self.window.contains(t)
    }
}

/// A gift entry as it sits in the document, either `[[key]]` or `key = [{..}]`.
#[derive(Clone, Copy)]
enum RecordRef<'a> {
    Table(&'a Table),
    Inline(&'a InlineTable),
}

impl<'a> RecordRef<'a> {
    fn get(&self, key: &str) -> Option<&'a Value> {
        match *self {
            RecordRef::Table(t) => t.get(key).and_then(Item::as_value),
            RecordRef::Inline(t) => t.get(key),
        }
    }

    fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(Value::as_str).map(str::to_string)
    }
}

fn collection<'a>(doc: &'a DocumentMut, key: &str) -> Result<Vec<RecordRef<'a>>> {
    match doc.get(key) {
        None | Some(Item::None) => Err(GiftError::MissingCollection { key: key.to_string() }),
        Some(Item::ArrayOfTables(aot)) => Ok(aot.iter().map(RecordRef::Table).collect()),
        Some(Item::Value(Value::Array(arr))) => arr
            .iter()
            .enumerate()
            .map(|(index, v)| {
                v.as_inline_table().map(RecordRef::Inline).ok_or_else(|| GiftError::NotARecord {
                    key: key.to_string(),
                    index,
                    found: v.type_name(),
                })
            })
            .collect(),
        Some(other) => Err(GiftError::NotACollection {
            key: key.to_string(),
            found: other.type_name(),
        }),
    }
}

fn date_field(record: &RecordRef<'_>, index: usize, field: &str) -> Result<NaiveDateTime> {
    let raw = match record.get(field) {
        Some(Value::String(s)) => s.value().clone(),
        Some(Value::Datetime(d)) => d.value().to_string(),
        Some(other) => other.to_string(),
        None => String::from("<missing>"),
    };
    timestamp::parse_iso(&raw).ok_or_else(|| GiftError::BadDate {
        index,
        field: field.to_string(),
        value: raw.trim().to_string(),
    })
}

/// Reads every gift in the collection along with its parsed validity window.
pub fn records(doc: &DocumentMut, cfg: &RefreshCfg) -> Result<Vec<GiftRecord>> {
    collection(doc, &cfg.collection)?
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Ok(GiftRecord {
                index,
                name: record.get_str("name"),
                gift_type: record.get_str("giftType"),
                window: ValidityWindow {
                    start: date_field(record, index, &cfg.start_field)?,
                    end: date_field(record, index, &cfg.end_field)?,
                },
            })
        })
        .collect()
}

/// Gifts a player asking at `t` would be offered.
pub fn active_at<'a>(records: &'a [GiftRecord], t: &NaiveDateTime) -> Vec<&'a GiftRecord> {
    records.iter().filter(|r| r.is_active_at(t)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GIFTS: &str = r#"
[[mysterygift]]
name = "Spring Eevee"
giftType = "Pokemon"
beginningDate = "2024-03-01T00:00:00"
endDate = "2024-03-31T00:00:00.000000"

[[mysterygift]]
name = "Master Ball"
giftType = "Item"
beginningDate = 2024-04-01T00:00:00
endDate = 2024-04-30T00:00:00
"#;

    fn doc(s: &str) -> DocumentMut {
        s.parse().unwrap()
    }

    fn t(s: &str) -> NaiveDateTime {
        timestamp::parse_iso(s).unwrap()
    }

    #[test]
    fn reads_string_and_native_dates() {
        let recs = records(&doc(GIFTS), &RefreshCfg::default()).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].name.as_deref(), Some("Spring Eevee"));
        assert_eq!(recs[0].gift_type.as_deref(), Some("Pokemon"));
        assert_eq!(recs[0].window.start, t("2024-03-01T00:00:00"));
        assert_eq!(recs[1].window.end, t("2024-04-30T00:00:00"));
    }

    #[test]
    fn active_lookup_uses_inclusive_window() {
        let recs = records(&doc(GIFTS), &RefreshCfg::default()).unwrap();

        let names = |at: &str| -> Vec<String> {
            active_at(&recs, &t(at)).iter().filter_map(|r| r.name.clone()).collect()
        };
        assert_eq!(names("2024-03-15T12:00:00"), vec!["Spring Eevee"]);
        assert_eq!(names("2024-04-01T00:00:00"), vec!["Master Ball"]);
        assert_eq!(names("2024-03-31T00:00:00"), vec!["Spring Eevee"]);
        assert!(names("2024-05-01T00:00:00").is_empty());
    }

    #[test]
    fn inline_array_is_a_collection() {
        let d = doc(
            r#"mysterygift = [ { name = "A", beginningDate = "2024-01-01T00:00:00", endDate = "2024-01-31T00:00:00" } ]"#,
        );
        let recs = records(&d, &RefreshCfg::default()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn missing_collection_is_reported() {
        let err = records(&doc("title = \"gifts\"\n"), &RefreshCfg::default()).unwrap_err();
        assert!(matches!(err, GiftError::MissingCollection { ref key } if key == "mysterygift"));
    }

    #[test]
    fn scalar_collection_is_reported() {
        let err = records(&doc("mysterygift = 3\n"), &RefreshCfg::default()).unwrap_err();
        assert!(matches!(err, GiftError::NotACollection { found: "integer", .. }), "{:?}", err);
    }

    #[test]
    fn non_table_element_is_reported() {
        let err = records(&doc("mysterygift = [1, 2]\n"), &RefreshCfg::default()).unwrap_err();
        assert!(matches!(err, GiftError::NotARecord { index: 0, .. }), "{:?}", err);
    }

    #[test]
    fn unparseable_date_names_record_and_field() {
        let d = doc(
            r#"
[[mysterygift]]
beginningDate = "soon"
endDate = "2024-01-31T00:00:00"
"#,
        );
        let err = records(&d, &RefreshCfg::default()).unwrap_err();
        match err {
            GiftError::BadDate { index, field, value } => {
                assert_eq!(index, 0);
                assert_eq!(field, "beginningDate");
                assert_eq!(value, "soon");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

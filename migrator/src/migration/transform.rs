//! Source record -> destination record

use serde_json::{Map, Value};

use super::types::{DestinationRecord, ImageValue, SourceRecord};

/// Restructure `record` into the destination shape.
///
/// `content.main` fields move to the top level and image fields point at the
/// rehosted asset ids. Images without a rehosted id are left out.
pub fn flatten(
    record: &SourceRecord,
    main_image_id: Option<&str>,
    icon_id: Option<&str>,
) -> DestinationRecord {
    let main = record.main();

    DestinationRecord {
        id: record.id.clone(),
        record_type: record.record_type.clone(),
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
        revision: record.revision.clone(),
        order_rank: record.order_rank.clone(),
        title: main.and_then(|m| m.title.clone()),
        slug: main.and_then(|m| m.slug.clone()),
        summary_headline: main.and_then(|m| m.summary_headline.clone()),
        summary_text: main.and_then(|m| m.summary_text.clone()),
        main_image: main_image_id.map(ImageValue::referencing),
        icon: icon_id.map(ImageValue::referencing),
        meta: record.meta().cloned(),
        language: record.language.clone(),
    }
}

/// Drop every top-level key whose value is `null`
pub fn strip_null_fields(document: Map<String, Value>) -> Map<String, Value> {
    document
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .collect()
}

impl DestinationRecord {
    /// Serialize for writing; strips null fields as the final step
    pub fn into_document(self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(strip_null_fields(map)),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "destination record serialized to {}, expected an object",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(value: Value) -> SourceRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flatten_promotes_main_fields() {
        let record = source(json!({
            "_id": "r1",
            "_type": "application",
            "_createdAt": "2023-01-01T00:00:00Z",
            "_updatedAt": "2023-02-01T00:00:00Z",
            "_rev": "rev-1",
            "orderRank": "0|100000:",
            "language": "en",
            "content": {
                "main": {
                    "title": "A",
                    "slug": { "_type": "slug", "current": "a" },
                    "summaryHeadline": "Headline",
                    "summaryText": [ { "_type": "block", "children": [] } ],
                    "gallery": [ { "_key": "g1" } ]
                },
                "meta": { "title": "Meta title" }
            }
        }));

        let document = flatten(&record, None, None).into_document().unwrap();

        assert_eq!(
            Value::Object(document),
            json!({
                "_id": "r1",
                "_type": "application",
                "_createdAt": "2023-01-01T00:00:00Z",
                "_updatedAt": "2023-02-01T00:00:00Z",
                "_rev": "rev-1",
                "orderRank": "0|100000:",
                "title": "A",
                "slug": { "_type": "slug", "current": "a" },
                "summaryHeadline": "Headline",
                "summaryText": [ { "_type": "block", "children": [] } ],
                "meta": { "title": "Meta title" },
                "language": "en"
            })
        );
    }

    #[test]
    fn test_absent_images_leave_no_keys() {
        let record = source(json!({
            "_id": "r1",
            "_type": "application",
            "content": { "main": { "title": "A" } }
        }));

        let document = flatten(&record, None, None).into_document().unwrap();

        assert!(!document.contains_key("mainImage"));
        assert!(!document.contains_key("icon"));
        assert!(document.values().all(|value| !value.is_null()));
    }

    #[test]
    fn test_rehosted_ids_become_references() {
        let record = source(json!({ "_id": "r1", "_type": "application" }));

        let document = flatten(&record, Some("X"), Some("Y")).into_document().unwrap();

        assert_eq!(
            document["mainImage"],
            json!({ "_type": "image", "asset": { "_type": "reference", "_ref": "X" } })
        );
        assert_eq!(
            document["icon"],
            json!({ "_type": "image", "asset": { "_type": "reference", "_ref": "Y" } })
        );
    }

    #[test]
    fn test_record_without_content() {
        let record = source(json!({ "_id": "bare", "_type": "application" }));

        let document = flatten(&record, None, None).into_document().unwrap();

        assert_eq!(
            Value::Object(document),
            json!({ "_id": "bare", "_type": "application" })
        );
    }

    #[test]
    fn test_strip_null_fields_keeps_nested_nulls() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::Null);
        map.insert("b".to_string(), json!({ "inner": null }));

        let stripped = strip_null_fields(map);

        assert!(!stripped.contains_key("a"));
        assert_eq!(stripped["b"], json!({ "inner": null }));
    }

    #[test]
    fn test_carried_values_pass_through_unchanged() {
        let record = source(json!({
            "_id": "r2",
            "_type": "application",
            "orderRank": 3,
            "_rev": { "n": 1 }
        }));

        let document = flatten(&record, None, None).into_document().unwrap();

        assert_eq!(document["orderRank"], json!(3));
        assert_eq!(document["_rev"], json!({ "n": 1 }));
    }
}

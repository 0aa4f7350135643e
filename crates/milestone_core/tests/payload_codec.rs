use chrono::NaiveDate;
use milestone_core::repo::payload::{deserialize, serialize};
use milestone_core::{Category, CorruptDataError, Milestone, MilestoneDraft, MilestoneId};

fn milestone(id: &str, title: &str, date: &str, category: Category, favorite: bool) -> Milestone {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let mut milestone = Milestone::with_id(
        MilestoneId::parse(id).unwrap(),
        MilestoneDraft::new(title, date, category).description(format!("about {title}")),
    );
    milestone.favorite = favorite;
    milestone
}

#[test]
fn serialize_then_deserialize_reproduces_collection() {
    let collection = vec![
        milestone("1", "First smile", "2024-01-15", Category::Development, true),
        milestone("2", "Vaccine", "2024-02-20", Category::Health, false),
        milestone("3", "Puree", "2024-02-20", Category::Nutrition, false),
        milestone("4", "Nap", "2023-12-31", Category::Sleep, true),
        milestone("5", "Beach trip", "2025-07-04", Category::Other, false),
    ];

    let decoded = deserialize(&serialize(&collection)).unwrap();
    assert_eq!(decoded, collection);
}

#[test]
fn empty_collection_serializes_to_empty_array() {
    assert_eq!(serialize(&[]), "[]");
    assert!(deserialize("[]").unwrap().is_empty());
}

#[test]
fn serialized_records_carry_every_field() {
    let payload = serialize(&[milestone(
        "abc",
        "Sat up",
        "2024-04-02",
        Category::Development,
        true,
    )]);
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    let record = &value[0];
    assert_eq!(record["id"], "abc");
    assert_eq!(record["title"], "Sat up");
    assert_eq!(record["description"], "about Sat up");
    assert_eq!(record["date"], "2024-04-02");
    assert_eq!(record["category"], "development");
    assert_eq!(record["favorite"], true);
}

#[test]
fn unknown_fields_are_ignored() {
    let payload = r#"[{
        "id": "1",
        "title": "Crawled",
        "description": "",
        "date": "2024-03-03",
        "category": "development",
        "favorite": false,
        "photo": "crawl.jpg",
        "mood": 5
    }]"#;

    let decoded = deserialize(payload).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].title, "Crawled");
}

#[test]
fn unknown_category_is_normalized_to_other() {
    let payload = r#"[{"id":"1","title":"Bath","description":"","date":"2024-03-03","category":"hygiene","favorite":false}]"#;
    let decoded = deserialize(payload).unwrap();
    assert_eq!(decoded[0].category, Category::Other);
}

#[test]
fn legacy_category_labels_map_to_categories() {
    let payload = r#"[
        {"id":"1","title":"a","description":"","date":"2024-01-01","category":"desenvolvimento","favorite":false},
        {"id":"2","title":"b","description":"","date":"2024-01-02","category":"saúde","favorite":false},
        {"id":"3","title":"c","description":"","date":"2024-01-03","category":"alimentação","favorite":false},
        {"id":"4","title":"d","description":"","date":"2024-01-04","category":"sono","favorite":true},
        {"id":"5","title":"e","description":"","date":"2024-01-05","category":"outro","favorite":false}
    ]"#;

    let categories = deserialize(payload)
        .unwrap()
        .into_iter()
        .map(|m| m.category)
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        [
            Category::Development,
            Category::Health,
            Category::Nutrition,
            Category::Sleep,
            Category::Other
        ]
    );
}

#[test]
fn missing_optional_fields_use_defaults() {
    let payload = r#"[{"id":"1700000000000","title":"Walked","date":"2024-08-08","category":"development"}]"#;
    let decoded = deserialize(payload).unwrap();
    assert_eq!(decoded[0].id.as_str(), "1700000000000");
    assert_eq!(decoded[0].description, "");
    assert!(!decoded[0].favorite);
}

#[test]
fn malformed_text_is_rejected() {
    assert!(matches!(
        deserialize("not json at all"),
        Err(CorruptDataError::Syntax(_))
    ));
    assert!(matches!(deserialize(""), Err(CorruptDataError::Syntax(_))));
    assert_eq!(
        deserialize(r#""just a string""#),
        Err(CorruptDataError::NotASequence)
    );
    assert_eq!(deserialize("null"), Err(CorruptDataError::NotASequence));
}

#[test]
fn record_missing_required_field_rejects_whole_payload() {
    let payload = r#"[
        {"id":"1","title":"ok","description":"","date":"2024-01-01","category":"sleep","favorite":false},
        {"id":"2","description":"","date":"2024-01-01","category":"sleep","favorite":false}
    ]"#;

    match deserialize(payload) {
        Err(CorruptDataError::InvalidRecord { index, reason }) => {
            assert_eq!(index, 1);
            assert!(reason.contains("title"), "unexpected reason: {reason}");
        }
        other => panic!("expected invalid record error, got {other:?}"),
    }
}

#[test]
fn non_object_record_and_wrong_types_are_rejected() {
    assert!(matches!(
        deserialize("[42]"),
        Err(CorruptDataError::InvalidRecord { index: 0, .. })
    ));

    let numeric_id = r#"[{"id":7,"title":"a","description":"","date":"2024-01-01","category":"sleep","favorite":false}]"#;
    assert!(matches!(
        deserialize(numeric_id),
        Err(CorruptDataError::InvalidRecord { index: 0, .. })
    ));

    let string_favorite = r#"[{"id":"1","title":"a","description":"","date":"2024-01-01","category":"sleep","favorite":"yes"}]"#;
    assert!(matches!(
        deserialize(string_favorite),
        Err(CorruptDataError::InvalidRecord { index: 0, .. })
    ));
}

#[test]
fn empty_id_is_rejected() {
    let payload = r#"[{"id":"","title":"a","description":"","date":"2024-01-01","category":"sleep","favorite":false}]"#;
    assert!(matches!(
        deserialize(payload),
        Err(CorruptDataError::InvalidRecord { index: 0, .. })
    ));
}

#[test]
fn invalid_dates_are_rejected() {
    for bad in ["", "2024-13-01", "2024-02-30", "15/01/2024", "yesterday"] {
        let payload = format!(
            r#"[{{"id":"1","title":"a","description":"","date":"{bad}","category":"sleep","favorite":false}}]"#
        );
        assert_eq!(
            deserialize(&payload),
            Err(CorruptDataError::InvalidDate {
                index: 0,
                value: bad.to_string()
            }),
            "date `{bad}` should be rejected"
        );
    }
}

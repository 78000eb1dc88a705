use quiz_core::{FormatError, QuestionDraft, QuizName};
use services::{AppServices, AuthoringError};

fn name(s: &str) -> QuizName {
    QuizName::new(s).unwrap()
}

const SET: &str = r#"[
    {"question": "Capital of Italy?", "options": ["Rome", "Milan"], "answer": "Rome",
     "explanation": "Rome has been the capital since 1871.", "example": "Roma"},
    {"question": "Capital of Spain?", "options": ["Madrid", "Seville"], "answer": "Madrid",
     "explanation": "Madrid."}
]"#;

#[tokio::test]
async fn authoring_flow_create_edit_export_delete() {
    let dir = tempfile::TempDir::new().unwrap();
    let services = AppServices::new_json_file(dir.path().join("tests.json"), None);
    let authoring = services.authoring();

    let saved = authoring
        .create_from_json(&name("capitals"), SET)
        .await
        .expect("create");
    assert_eq!(saved, 2);

    let err = authoring
        .create_from_json(&name("capitals"), SET)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthoringError::Conflict(n) if n.as_str() == "capitals"));

    let count = authoring
        .add_question(
            &name("capitals"),
            QuestionDraft {
                text: "Capital of France?".into(),
                options: vec!["Paris".into(), "Lyon".into(), String::new(), String::new()],
                answer: "Paris".into(),
                explanation: "Paris.".into(),
                example: None,
            },
        )
        .await
        .expect("add");
    assert_eq!(count, 3);

    authoring
        .delete_question(&name("capitals"), 1)
        .await
        .expect("delete question");

    let exported = authoring.export_json(&name("capitals")).await.expect("export");
    let reimported = authoring.validate_json(&exported).expect("re-import");
    let texts: Vec<&str> = reimported.iter().map(|q| q.text()).collect();
    assert_eq!(texts, vec!["Capital of Italy?", "Capital of France?"]);
    assert_eq!(reimported[0].example(), Some("Roma"));

    authoring.delete_set(&name("capitals")).await.expect("delete");
    let names: Vec<String> = authoring
        .list_sets()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.name.to_string())
        .collect();
    assert!(!names.contains(&"capitals".to_owned()));
}

#[tokio::test]
async fn malformed_json_never_reaches_the_store() {
    let services = AppServices::in_memory(None);
    let authoring = services.authoring();

    let err = authoring
        .create_from_json(
            &name("bad"),
            r#"[{"question": "Q", "options": "A", "answer": "A", "explanation": ""}]"#,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthoringError::Format(FormatError::InvalidRecord {
            index: 0,
            field: "options",
            ..
        })
    ));
    assert!(matches!(
        authoring.questions(&name("bad")).await,
        Err(AuthoringError::NotFound(_))
    ));
}

#[tokio::test]
async fn listing_survives_hand_edited_store_keys() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("tests.json");
    std::fs::write(&path, format!(r#"{{" capitals ": {SET}}}"#)).unwrap();
    let services = AppServices::new_json_file(&path, None);

    let items = services.authoring().list_sets().await.expect("list");
    let capitals = items
        .iter()
        .find(|item| item.name.as_str() == "capitals")
        .expect("listed under the trimmed name");
    assert_eq!(capitals.question_count, 2);
    assert!(!capitals.bundled);
}

//! Storage tests: cascades, ordering, validation and file-backed databases.

use finsight::error::StorageError;
use finsight::schema::{
    Database, NewAnalysisResult, NewChatConversation, NewChatMessage, NewRecommendationItem,
    NewRecommendationSet, NewUser,
};
use finsight::types::{Language, Role, Theme};
use serde_json::{Value, json};

async fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.insert_user(NewUser::new("u1", "ana@example.com", "Ana"))
        .await
        .unwrap();
    db
}

fn item(title: &str) -> NewRecommendationItem {
    NewRecommendationItem {
        kind: "tip".into(),
        title: title.into(),
        description: format!("{title} details"),
        confidence: "medium".into(),
        data: json!({"weight": 1}),
        source: "budget".into(),
    }
}

fn set(user_id: &str, summary: &str) -> NewRecommendationSet {
    NewRecommendationSet {
        user_id: user_id.into(),
        summary: summary.into(),
    }
}

fn conversation(user_id: &str, title: &str) -> NewChatConversation {
    NewChatConversation {
        user_id: user_id.into(),
        title: title.into(),
    }
}

fn analysis(user_id: &str, kind: &str, data: Value) -> NewAnalysisResult {
    NewAnalysisResult {
        user_id: user_id.into(),
        kind: kind.into(),
        data,
    }
}

mod users {
    use super::*;

    #[tokio::test]
    async fn preferences_round_trip_into_settings() {
        let db = seeded().await;

        let updated = db
            .update_user_preferences("u1", true, Language::Id)
            .await
            .unwrap();
        assert!(updated.dark_mode);
        assert_eq!(updated.language, "id");

        let settings = db.get_user("u1").await.unwrap().unwrap().settings();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.language, Language::Id);
        assert_eq!(settings.user_id, "u1");
    }

    #[tokio::test]
    async fn missing_user_cannot_be_updated() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .update_user_preferences("ghost", false, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(db.get_user("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_profile_is_rejected_before_insert() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .insert_user(NewUser::new("u2", "not-an-email", "Budi"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "email", .. }));
        assert!(db.get_user("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_everything_owned() {
        let db = seeded().await;
        let conv = db
            .insert_conversation(conversation("u1", "Budget chat"))
            .await
            .unwrap();
        db.insert_message(NewChatMessage::parse(&conv.id, "user", "hello").unwrap())
            .await
            .unwrap();
        db.insert_analysis_result(analysis("u1", "spending", json!({"total": 10})))
            .await
            .unwrap();
        let stored = db
            .insert_recommendation_set(set("u1", "Cut costs"), vec![item("Cancel gym")])
            .await
            .unwrap();

        assert!(db.delete_user("u1").await.unwrap());

        assert!(db.list_conversations("u1").await.unwrap().is_empty());
        assert!(db.list_messages(&conv.id).await.unwrap().is_empty());
        assert!(db.list_analysis_results("u1", None).await.unwrap().is_empty());
        assert!(db.list_recommendation_sets("u1").await.unwrap().is_empty());
        assert!(!db.delete_recommendation_set(&stored.id).await.unwrap());
        assert!(!db.delete_user("u1").await.unwrap());
    }
}

mod chat {
    use super::*;

    #[tokio::test]
    async fn messages_list_oldest_first_and_touch_conversation() {
        let db = seeded().await;
        let first = db
            .insert_conversation(conversation("u1", "First"))
            .await
            .unwrap();
        let second = db
            .insert_conversation(conversation("u1", "Second"))
            .await
            .unwrap();

        db.insert_message(NewChatMessage::parse(&first.id, "user", "question").unwrap())
            .await
            .unwrap();
        db.insert_message(NewChatMessage::parse(&first.id, "assistant", "answer").unwrap())
            .await
            .unwrap();

        let messages = db.list_messages(&first.id).await.unwrap();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(messages[1].content, "answer");

        // the conversation that just received messages moves to the top
        let ids: Vec<String> = db
            .list_conversations("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first.id.clone(), second.id.clone()]);
    }

    #[tokio::test]
    async fn unknown_role_never_reaches_storage() {
        let err = NewChatMessage::parse("c1", "moderator", "hi").unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "role", .. }));
    }

    #[tokio::test]
    async fn conversation_requires_an_existing_user() {
        let db = Database::open_in_memory().unwrap();
        let err = db
            .insert_conversation(conversation("nobody", "Orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Sqlite(_)));
    }

    #[tokio::test]
    async fn rename_updates_title_or_reports_missing() {
        let db = seeded().await;
        let conv = db
            .insert_conversation(conversation("u1", "Draft"))
            .await
            .unwrap();

        db.rename_conversation(&conv.id, "Retirement plan")
            .await
            .unwrap();
        let listed = db.list_conversations("u1").await.unwrap();
        assert_eq!(listed[0].title, "Retirement plan");
        assert!(listed[0].updated_at >= conv.updated_at);

        let err = db
            .rename_conversation("missing", "Anything")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));

        let err = db.rename_conversation(&conv.id, "  ").await.unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "title", .. }));
    }

    #[tokio::test]
    async fn deleting_a_conversation_removes_its_messages() {
        let db = seeded().await;
        let conv = db
            .insert_conversation(conversation("u1", "Short lived"))
            .await
            .unwrap();
        db.insert_message(NewChatMessage::parse(&conv.id, "system", "context").unwrap())
            .await
            .unwrap();

        assert!(db.delete_conversation(&conv.id).await.unwrap());
        assert!(db.list_messages(&conv.id).await.unwrap().is_empty());
        assert!(!db.delete_conversation(&conv.id).await.unwrap());
    }
}

mod analysis {
    use super::*;

    #[tokio::test]
    async fn filter_by_type_and_update_data() {
        let db = seeded().await;
        let spending = db
            .insert_analysis_result(analysis("u1", "spending", json!({"total": 10})))
            .await
            .unwrap();
        db.insert_analysis_result(analysis("u1", "income", json!({"total": 99})))
            .await
            .unwrap();

        assert_eq!(db.list_analysis_results("u1", None).await.unwrap().len(), 2);
        let only_spending = db
            .list_analysis_results("u1", Some("spending"))
            .await
            .unwrap();
        assert_eq!(only_spending.len(), 1);
        assert_eq!(only_spending[0].id, spending.id);

        let updated = db
            .update_analysis_data(&spending.id, json!({"total": 12, "currency": "IDR"}))
            .await
            .unwrap();
        assert_eq!(updated.data["currency"], "IDR");
        assert_eq!(updated.created_at, spending.created_at);
        assert!(updated.updated_at >= spending.updated_at);
    }

    #[tokio::test]
    async fn null_data_is_rejected() {
        let db = seeded().await;
        let err = db
            .insert_analysis_result(analysis("u1", "spending", Value::Null))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "data", .. }));

        let err = db
            .update_analysis_data("anything", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "data", .. }));
    }
}

mod recommendations {
    use super::*;

    #[tokio::test]
    async fn sets_list_newest_first_with_items_in_order() {
        let db = seeded().await;
        let older = db
            .insert_recommendation_set(set("u1", "Older"), vec![item("A"), item("B")])
            .await
            .unwrap();
        let newer = db
            .insert_recommendation_set(set("u1", "Newer"), vec![item("C")])
            .await
            .unwrap();

        let sets = db.list_recommendation_sets("u1").await.unwrap();
        let ids: Vec<&str> = sets.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()]);

        let titles: Vec<&str> = sets[1].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
        assert!(sets[1].items.iter().all(|i| i.set_id == older.id));
        assert_eq!(sets[1], older);
    }

    #[tokio::test]
    async fn deleting_a_set_removes_its_items() {
        let db = seeded().await;
        let doomed = db
            .insert_recommendation_set(set("u1", "Doomed"), vec![item("X")])
            .await
            .unwrap();
        let kept = db
            .insert_recommendation_set(set("u1", "Kept"), vec![item("Y")])
            .await
            .unwrap();

        assert!(db.delete_recommendation_set(&doomed.id).await.unwrap());
        assert!(!db.delete_recommendation_set(&doomed.id).await.unwrap());

        let sets = db.list_recommendation_sets("u1").await.unwrap();
        assert_eq!(sets, vec![kept]);
    }

    #[tokio::test]
    async fn invalid_item_rolls_back_the_whole_set() {
        let db = seeded().await;
        let mut bad = item("Broken");
        bad.confidence = String::new();

        let err = db
            .insert_recommendation_set(set("u1", "Partial"), vec![item("Fine"), bad])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation { field: "confidence", .. }));
        assert!(db.list_recommendation_sets("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_for_unknown_user_leaves_nothing_behind() {
        let db = seeded().await;
        let err = db
            .insert_recommendation_set(set("ghost", "Orphan"), vec![item("Z")])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Sqlite(_)));
        assert!(db.list_recommendation_sets("ghost").await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn file_backed_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("finsight.db");

    {
        let db = Database::open(&path).unwrap();
        db.insert_user(NewUser::new("u1", "ana@example.com", "Ana"))
            .await
            .unwrap();
        db.insert_recommendation_set(set("u1", "Persisted"), vec![item("Keep me")])
            .await
            .unwrap();
    }

    let reopened = Database::open(&path).unwrap();
    assert_eq!(reopened.path(), path.as_path());
    let sets = reopened.list_recommendation_sets("u1").await.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].items[0].title, "Keep me");
}

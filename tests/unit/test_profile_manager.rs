// Unit tests for profile documents and their subdocument lists

use devhub_api::core::errors::AppError;
use devhub_api::engine::profile_manager::{
    parse_entry, EducationFields, ExperienceFields, ProfileFields, ProfileManager,
};
use devhub_api::state::Stores;
use serde_json::json;
use uuid::Uuid;

use crate::common;

fn manager(stores: &Stores) -> ProfileManager {
    ProfileManager::new(stores.profiles.clone(), stores.users.clone())
}

fn experience(title: &str) -> ExperienceFields {
    ExperienceFields {
        title: Some(title.to_string()),
        company: Some("Acme".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_upsert_creates_then_overwrites() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);

    let created = profiles
        .upsert_profile(
            user.id,
            ProfileFields {
                company: Some("Acme".to_string()),
                status: Some("Developer".to_string()),
                skills: Some("rust, go ,sql".to_string()),
                twitter: Some("https://twitter.com/ada".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.company, "Acme");
    assert_eq!(created.skills, vec!["rust", "go", "sql"]);
    assert_eq!(created.social.twitter, "https://twitter.com/ada");

    // Omitted text fields are blanked; omitted skills are kept
    let updated = profiles
        .upsert_profile(
            user.id,
            ProfileFields {
                status: Some("Lead".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.company, "");
    assert_eq!(updated.status, "Lead");
    assert_eq!(updated.social.twitter, "");
    assert_eq!(updated.skills, vec!["rust", "go", "sql"]);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn test_upsert_keeps_subdocuments() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);

    profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();
    profiles.add_experience(user.id, experience("Engineer")).await.unwrap();

    let updated = profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();
    assert_eq!(updated.experience.len(), 1);
}

#[tokio::test]
async fn test_entries_are_prepended() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);
    profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();

    profiles.add_experience(user.id, experience("First")).await.unwrap();
    let profile = profiles.add_experience(user.id, experience("Second")).await.unwrap();

    let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_deref()).collect();
    assert_eq!(titles, vec![Some("Second"), Some("First")]);

    profiles
        .add_education(
            user.id,
            EducationFields {
                school: Some("MIT".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let profile = profiles
        .add_education(
            user.id,
            EducationFields {
                school: Some("CMU".to_string()),
                current: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.education[0].school.as_deref(), Some("CMU"));
    assert!(profile.education[0].current);
    assert!(!profile.education[1].current);
}

#[tokio::test]
async fn test_remove_entry_by_id() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);
    profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();

    profiles.add_experience(user.id, experience("First")).await.unwrap();
    let profile = profiles.add_experience(user.id, experience("Second")).await.unwrap();
    let second_id = profile.experience[0].id.to_string();

    let profile = profiles
        .remove_experience(user.id, &second_id.to_uppercase())
        .await
        .unwrap();
    assert_eq!(profile.experience.len(), 1);
    assert_eq!(profile.experience[0].title.as_deref(), Some("First"));
}

#[tokio::test]
async fn test_remove_unknown_id_leaves_lists_unchanged() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);
    profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();
    let before = profiles.add_experience(user.id, experience("Only")).await.unwrap();

    for id in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let after = profiles.remove_experience(user.id, &id).await.unwrap();
        assert_eq!(after.experience, before.experience);

        let after = profiles.remove_education(user.id, &id).await.unwrap();
        assert!(after.education.is_empty());
    }
}

#[tokio::test]
async fn test_subdocuments_need_a_profile() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);

    let err = profiles.add_experience(user.id, experience("x")).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = profiles.remove_education(user.id, "x").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = profiles.get_profile_view(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "Profile not found"));
}

#[test]
fn test_parse_entry_rejects_unknown_keys() {
    let ok: ExperienceFields =
        parse_entry(json!({ "title": "Dev", "from": "2020-01-31", "current": true })).unwrap();
    assert_eq!(ok.title.as_deref(), Some("Dev"));
    assert!(ok.current);

    let err = parse_entry::<ExperienceFields>(json!({ "title": "Dev", "salary": 10 })).unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid Updates!"));

    let err = parse_entry::<EducationFields>(json!({ "school": "MIT", "owner": "x" })).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // A known key with a bad value gets its own message
    let err = parse_entry::<EducationFields>(json!({ "from": "yesterday" })).unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m != "Invalid Updates!"));
}

#[test]
fn test_parse_entry_accepts_timestamps_and_nulls() {
    let fields: ExperienceFields =
        parse_entry(json!({ "title": "Dev", "from": "2020-01-01T00:00:00.000Z", "current": null }))
            .unwrap();
    assert_eq!(
        fields.from.map(|d| d.to_rfc3339()).as_deref(),
        Some("2020-01-01T00:00:00+00:00")
    );
    assert!(!fields.current);

    let fields: EducationFields =
        parse_entry(json!({ "school": "MIT", "from": "2020-01-01", "to": null })).unwrap();
    assert!(fields.from.is_some());
    assert!(fields.to.is_none());
}

#[tokio::test]
async fn test_view_joins_owner() {
    let stores = Stores::memory();
    let ada = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let bob = common::insert_user(&stores, "Bob", "bob@x.com").await;
    let profiles = manager(&stores);
    profiles.upsert_profile(ada.id, ProfileFields::default()).await.unwrap();
    profiles.upsert_profile(bob.id, ProfileFields::default()).await.unwrap();

    let view = profiles.get_profile_view(ada.id).await.unwrap();
    let owner = view.user.unwrap();
    assert_eq!(owner.id, ada.id);
    assert_eq!(owner.name, "Ada");
    assert_eq!(owner.avatar, ada.avatar);

    let all = profiles.list_profiles().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|v| v.user.is_some()));
}

#[tokio::test]
async fn test_delete_profile() {
    let stores = Stores::memory();
    let user = common::insert_user(&stores, "Ada", "ada@x.com").await;
    let profiles = manager(&stores);
    profiles.upsert_profile(user.id, ProfileFields::default()).await.unwrap();

    assert!(profiles.delete_profile(user.id).await.unwrap());
    assert!(!profiles.delete_profile(user.id).await.unwrap());
    assert!(profiles.get_profile_view(user.id).await.is_err());
}

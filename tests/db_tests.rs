//! Store-level tests over an in-memory database.

use keyplan::db::{NewProject, NewUser, Store, UserUpdate};
use keyplan::types::{AppError, ProjectDetailsUpdate, Role};

async fn memory_store() -> Store {
    Store::new_memory().await.expect("in-memory store")
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder".to_string(),
        role: Role::Client,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    }
}

#[tokio::test]
async fn schema_is_visible_across_store_calls() {
    // Every operation clones the one shared connection. A store handing out
    // fresh connections would see an empty private database on each call
    // when backed by `:memory:`.
    let store = memory_store().await;
    store.seed_catalog().await.expect("seed catalog");

    assert_eq!(store.count_users().await.unwrap(), 0);

    let user = store.create_user(new_user("a@example.com")).await.unwrap();
    let found = store.get_user_by_email("a@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(user.id));

    assert_eq!(store.distinct_cylinder_ranges().await.unwrap().len(), 6);
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_email_is_conflict_on_insert_and_update() {
    let store = memory_store().await;
    store
        .create_user(new_user("taken@example.com"))
        .await
        .unwrap();
    let second = store.create_user(new_user("free@example.com")).await.unwrap();

    assert!(matches!(
        store.create_user(new_user("TAKEN@example.com")).await,
        Err(AppError::Conflict)
    ));

    let update = UserUpdate {
        email: Some("Taken@example.com".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_user(second.id, &update).await,
        Err(AppError::Conflict)
    ));
}

#[tokio::test]
async fn project_detail_updates_are_owner_scoped() {
    let store = memory_store().await;
    let owner = store.create_user(new_user("owner@example.com")).await.unwrap();
    let other = store.create_user(new_user("other@example.com")).await.unwrap();

    let project_id = store
        .create_project(
            owner.id,
            NewProject {
                name: "Le Clos".to_string(),
                kind: "pg".to_string(),
                creation_date: "2026-08-29".to_string(),
                security_level: "Octal".to_string(),
            },
        )
        .await
        .unwrap();

    let details = ProjectDetailsUpdate {
        logement_doors: Some(40),
        ..Default::default()
    };

    assert!(!store
        .update_project_details(project_id, other.id, &details)
        .await
        .unwrap());
    assert!(store
        .update_project_details(project_id, owner.id, &details)
        .await
        .unwrap());

    let projects = store.list_projects(owner.id).await.unwrap();
    assert_eq!(projects[0].logement_doors, Some(40));
    assert!(store.list_projects(other.id).await.unwrap().is_empty());
}

#![cfg(feature = "integration-tests")]

mod support;

use chrono::{Duration, Utc};
use common::auth::{
    CreateResetTokenInput, DeleteResetTokensByUserInput, GetResetTokenByHashInput,
    PasswordResetTokenRepository,
};
use common::domain::{
    Association, DeleteUserRepoInput, DomainError, GetUserByEmailRepoInput, GetUserRepoInput,
    ListUsersRepoInput, RegisterUserRepoInput, Role, UpdatePasswordRepoInput,
    UpdateUserRoleRepoInput, UserRepository,
};
use common::postgres::{PostgresPasswordResetTokenRepository, PostgresUserRepository};
use support::setup_test_db;

fn register_input(id: &str, email: &str, name: &str) -> RegisterUserRepoInput {
    RegisterUserRepoInput {
        id: id.to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$stub".to_string(),
        name: name.to_string(),
        role: Role::User,
        association: Some(Association::Economia),
    }
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_register_and_fetch_user() {
    let db = setup_test_db().await;
    let repo = PostgresUserRepository::new(db.client.clone());

    let created = repo
        .register_user(register_input("u1", "anna@morgana.example", "Anna"))
        .await
        .unwrap();
    assert_eq!(created.role, Role::User);
    assert_eq!(created.association, Some(Association::Economia));
    assert!(created.created_at.is_some());

    let by_id = repo
        .get_user(GetUserRepoInput {
            user_id: "u1".to_string(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.email, "anna@morgana.example");

    let by_email = repo
        .get_user_by_email(GetUserByEmailRepoInput {
            email: "anna@morgana.example".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(by_email.map(|u| u.id), Some("u1".to_string()));
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_duplicate_email_is_conflict_on_email() {
    let db = setup_test_db().await;
    let repo = PostgresUserRepository::new(db.client.clone());

    repo.register_user(register_input("u1", "dup@morgana.example", "Anna"))
        .await
        .unwrap();
    let err = repo
        .register_user(register_input("u2", "dup@morgana.example", "Bruno"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::AlreadyExists { ref field } if field == "email"));
    assert_eq!(err.to_string(), "A record with this email already exists");
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_role_update_and_listing() {
    let db = setup_test_db().await;
    let repo = PostgresUserRepository::new(db.client.clone());

    repo.register_user(register_input("u1", "zeno@morgana.example", "Zeno"))
        .await
        .unwrap();
    repo.register_user(register_input("u2", "anna@morgana.example", "Anna"))
        .await
        .unwrap();

    let updated = repo
        .update_user_role(UpdateUserRoleRepoInput {
            user_id: "u1".to_string(),
            role: Role::SuperAdmin,
            association: Some(Association::MorganaOrum),
        })
        .await
        .unwrap();
    assert_eq!(updated.role, Role::SuperAdmin);
    assert_eq!(updated.association, Some(Association::MorganaOrum));

    let names: Vec<_> = repo
        .list_users(ListUsersRepoInput::default())
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.name)
        .collect();
    assert_eq!(names, vec!["Anna", "Zeno"]);

    let filtered = repo
        .list_users(ListUsersRepoInput {
            query: Some("ZENO@".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    let missing = repo
        .update_user_role(UpdateUserRoleRepoInput {
            user_id: "nope".to_string(),
            role: Role::User,
            association: None,
        })
        .await;
    assert!(matches!(missing, Err(DomainError::UserNotFound(_))));
}

#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
async fn test_reset_tokens_follow_user_lifecycle() {
    let db = setup_test_db().await;
    let users = PostgresUserRepository::new(db.client.clone());
    let tokens = PostgresPasswordResetTokenRepository::new(db.client.clone());

    users
        .register_user(register_input("u1", "anna@morgana.example", "Anna"))
        .await
        .unwrap();

    tokens
        .create_reset_token(CreateResetTokenInput {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            token_hash: "hash-1".to_string(),
            expires_at: Utc::now() + Duration::minutes(30),
        })
        .await
        .unwrap();

    let found = tokens
        .get_reset_token_by_hash(GetResetTokenByHashInput {
            token_hash: "hash-1".to_string(),
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, "u1");

    users
        .update_password(UpdatePasswordRepoInput {
            user_id: "u1".to_string(),
            password_hash: "$argon2id$new".to_string(),
        })
        .await
        .unwrap();

    tokens
        .delete_reset_tokens_by_user(DeleteResetTokensByUserInput {
            user_id: "u1".to_string(),
        })
        .await
        .unwrap();
    assert!(tokens
        .get_reset_token_by_hash(GetResetTokenByHashInput {
            token_hash: "hash-1".to_string(),
        })
        .await
        .unwrap()
        .is_none());

    users
        .delete_user(DeleteUserRepoInput {
            user_id: "u1".to_string(),
        })
        .await
        .unwrap();
    assert!(matches!(
        users
            .delete_user(DeleteUserRepoInput {
                user_id: "u1".to_string(),
            })
            .await,
        Err(DomainError::UserNotFound(_))
    ));
}

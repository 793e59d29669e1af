use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{NewUser, UserChanges, UserDetail, UserInsertInput, UserSortKey, UserUpdateInput};
use super::repository::UserRepository;
use crate::errors::{RepositoryError, ServiceError};
use crate::pagination::{Page, PageRequest};
use crate::password::PasswordEncoder;

/// User management independent of the web framework.
///
/// Inputs are expected to be validated already (see `UserInsertInput::validate`).
pub struct UserService<R: UserRepository, H: PasswordEncoder> {
    repo: Arc<R>,
    encoder: Arc<H>,
}

/// Give a failed user write its business meaning. Foreign keys on a user
/// write can only point at roles.
fn write_error(e: RepositoryError) -> ServiceError {
    match e {
        RepositoryError::ForeignKeyViolation(_) => ServiceError::not_found("role"),
        RepositoryError::UniqueViolation(_) => ServiceError::Conflict("email already in use".into()),
        other => other.into(),
    }
}

fn id_not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("Id not found {id}"))
}

impl<R: UserRepository, H: PasswordEncoder> UserService<R, H> {
    pub fn new(repo: Arc<R>, encoder: Arc<H>) -> Self { Self { repo, encoder } }

    /// One page of users with their roles.
    #[instrument(skip(self))]
    pub async fn list(&self, page: PageRequest) -> Result<Page<UserDetail>, ServiceError> {
        if let Some(sort) = &page.sort {
            if UserSortKey::from_property(&sort.property).is_none() {
                return Err(ServiceError::Validation(format!("cannot sort by '{}'", sort.property)));
            }
        }
        page.normalize()?;
        let found = self.repo.find_all_paged(&page).await?;
        debug!(total = found.total_elements, "users listed");
        Ok(found.map(UserDetail::from))
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<UserDetail, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .map(UserDetail::from)
            .ok_or_else(|| ServiceError::not_found("Entity"))
    }

    /// Hash the password, store the user and its initial role set.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::password::Argon2Encoder;
    /// use service::users::{UserService, UserInsertInput, repository::mock::MockUserRepository};
    /// let svc = UserService::new(Arc::new(MockUserRepository::default()), Arc::new(Argon2Encoder::new()));
    /// let input = UserInsertInput { first_name: "Ana".into(), last_name: "Silva".into(), email: "ana@x.com".into(), password: "pw123".into(), role_ids: vec![1] };
    /// let user = tokio_test::block_on(svc.create(input)).unwrap();
    /// assert_eq!(user.role_ids(), vec![1]);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserInsertInput) -> Result<UserDetail, ServiceError> {
        let password_hash = self.encoder.encode(&input.password)?;
        let new = NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
            role_ids: input.role_ids,
        };
        let created = self.repo.insert(new).await.map_err(write_error)?;
        info!(user_id = created.id, roles = created.roles.len(), "user_created");
        Ok(created.into())
    }

    /// Replace profile fields and the whole role set. A missing id is only
    /// discovered when the write touches no row.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn update(&self, id: i64, input: UserUpdateInput) -> Result<UserDetail, ServiceError> {
        let updated = self
            .repo
            .update(id, UserChanges::from(input))
            .await
            .map_err(|e| match e {
                RepositoryError::MissingEntity(_) => id_not_found(id),
                other => write_error(other),
            })?;
        info!(user_id = updated.id, roles = updated.roles.len(), "user_updated");
        Ok(updated.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if !self.repo.exists_by_id(id).await? {
            return Err(id_not_found(id));
        }
        self.repo.delete_by_id(id).await.map_err(|e| match e {
            RepositoryError::ForeignKeyViolation(_) => ServiceError::referential_integrity(),
            other => other.into(),
        })?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Sort;
    use crate::users::repository::mock::MockUserRepository;

    /// Reversible stand-in so tests can see what was stored.
    struct PrefixEncoder;

    impl PasswordEncoder for PrefixEncoder {
        fn encode(&self, raw: &str) -> Result<String, ServiceError> { Ok(format!("enc:{raw}")) }
        fn matches(&self, raw: &str, encoded: &str) -> bool { encoded == format!("enc:{raw}") }
    }

    fn service_with(repo: Arc<MockUserRepository>) -> UserService<MockUserRepository, PrefixEncoder> {
        UserService::new(repo, Arc::new(PrefixEncoder))
    }

    fn ana() -> UserInsertInput {
        UserInsertInput {
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@x.com".into(),
            password: "pw123".into(),
            role_ids: vec![1],
        }
    }

    fn three_roles() -> Arc<MockUserRepository> {
        Arc::new(MockUserRepository::with_roles(&[(1, "ROLE_OPERATOR"), (2, "ROLE_ADMIN"), (3, "ROLE_AUDITOR")]))
    }

    #[tokio::test]
    async fn create_returns_projection_and_stores_hash() -> anyhow::Result<()> {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service_with(repo.clone());

        let user = svc.create(ana()).await?;
        assert!(user.id > 0);
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.last_name, "Silva");
        assert_eq!(user.email, "ana@x.com");
        assert_eq!(user.role_ids(), vec![1]);
        assert_eq!(user.roles[0].authority, "ROLE_OPERATOR");

        let json = serde_json::to_value(&user)?;
        assert!(json.get("password").is_none());
        assert_eq!(repo.stored_hash(user.id).as_deref(), Some("enc:pw123"));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_unknown_role_is_not_found() {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        let mut input = ana();
        input.role_ids = vec![1, 99];
        let err = svc.create(input).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "role not found"));
        assert_eq!(svc.list(PageRequest::default()).await.unwrap().total_elements, 0);
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        svc.create(ana()).await?;
        let err = svc.create(ana()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        Ok(())
    }

    #[tokio::test]
    async fn get_by_id_round_trips_ids() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        let created = svc.create(ana()).await?;
        assert_eq!(svc.get_by_id(created.id).await?.id, created.id);
        assert!(matches!(svc.get_by_id(created.id + 100).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn update_replaces_role_set_exactly() -> anyhow::Result<()> {
        let svc = service_with(three_roles());
        let created = svc.create(ana()).await?;
        assert_eq!(created.role_ids(), vec![1]);

        let input = UserUpdateInput {
            first_name: "Bea".into(),
            last_name: "Silva".into(),
            email: "ana@x.com".into(),
            role_ids: vec![2, 3],
        };
        let updated = svc.update(created.id, input).await?;
        assert_eq!(updated.first_name, "Bea");
        assert_eq!(updated.role_ids(), vec![2, 3]);
        assert_eq!(svc.get_by_id(created.id).await?.role_ids(), vec![2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_id_is_detected_at_write_time() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service_with(repo.clone());
        let input = UserUpdateInput { first_name: "X".into(), last_name: "Y".into(), email: "x@y.z".into(), role_ids: vec![] };
        let err = svc.update(42, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Id not found 42"));
        assert_eq!(repo.calls(), vec!["update"]);
    }

    #[tokio::test]
    async fn update_with_unknown_role_leaves_user_untouched() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        let created = svc.create(ana()).await?;
        let input = UserUpdateInput { first_name: "Bea".into(), last_name: "Silva".into(), email: "ana@x.com".into(), role_ids: vec![7] };
        assert!(matches!(svc.update(created.id, input).await, Err(ServiceError::NotFound(_))));
        let after = svc.get_by_id(created.id).await?;
        assert_eq!(after.first_name, "Ana");
        assert_eq!(after.role_ids(), vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_then_lookup_is_not_found() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        let created = svc.create(ana()).await?;
        svc.delete(created.id).await?;
        assert!(matches!(svc.get_by_id(created.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn delete_of_missing_id_checks_first() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service_with(repo.clone());
        assert!(matches!(svc.delete(5).await, Err(ServiceError::NotFound(_))));
        assert_eq!(repo.calls(), vec!["exists_by_id"]);
    }

    #[tokio::test]
    async fn delete_with_dependents_is_database_conflict() -> anyhow::Result<()> {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service_with(repo.clone());
        let created = svc.create(ana()).await?;
        repo.add_dependent(created.id);

        let err = svc.delete(created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::DatabaseConflict(ref m) if m == "Referential integrity constraint violation"));
        assert_eq!(svc.get_by_id(created.id).await?.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn list_pages_over_many_users() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        for n in 0..25 {
            let mut input = ana();
            input.email = format!("user{n}@x.com");
            svc.create(input).await?;
        }
        let page = svc.list(PageRequest::new(0, 10)).await?;
        assert_eq!(page.content.len(), 10);
        assert_eq!(page.total_elements, 25);
        assert_eq!(page.total_pages, 3);

        let last = svc.list(PageRequest::new(2, 10)).await?;
        assert_eq!(last.content.len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn list_sorts_and_rejects_unknown_properties() -> anyhow::Result<()> {
        let svc = service_with(Arc::new(MockUserRepository::default()));
        for (first, email) in [("Carla", "c@x.com"), ("Ana", "a@x.com"), ("Bruno", "b@x.com")] {
            let mut input = ana();
            input.first_name = first.into();
            input.email = email.into();
            svc.create(input).await?;
        }
        let page = svc.list(PageRequest::default().with_sort(Sort::desc("firstName"))).await?;
        let names: Vec<_> = page.content.iter().map(|u| u.first_name.as_str()).collect();
        assert_eq!(names, vec!["Carla", "Bruno", "Ana"]);

        let err = svc.list(PageRequest::default().with_sort(Sort::asc("password"))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }

    #[tokio::test]
    async fn list_rejects_page_past_offset_range() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service_with(repo.clone());
        let err = svc.list(PageRequest::new(u64::MAX / 10 + 1, 10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(repo.calls().is_empty());
    }
}

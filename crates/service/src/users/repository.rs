use async_trait::async_trait;

use super::domain::{NewUser, UserChanges, UserRecord};
use crate::errors::RepositoryError;
use crate::pagination::{Page, PageRequest};

/// Persistence gateway for users and their role pairs.
///
/// Writes that touch the role set run in one transaction; a failing role pair
/// leaves no trace of the write.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// One page of users, sorted as requested. Only that page is loaded.
    async fn find_all_paged(&self, page: &PageRequest) -> Result<Page<UserRecord>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError>;
    async fn insert(&self, user: NewUser) -> Result<UserRecord, RepositoryError>;
    /// Overwrite profile fields and replace the role set.
    /// Fails with `MissingEntity` when no row has this id.
    async fn update(&self, id: i64, changes: UserChanges) -> Result<UserRecord, RepositoryError>;
    async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet, HashSet};
    use std::sync::Mutex;

    use crate::users::domain::{RoleDto, UserSortKey};
    use crate::pagination::Direction;

    #[derive(Clone)]
    struct Row {
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        role_ids: BTreeSet<i64>,
    }

    /// Behaves like the relational store for the cases the service cares
    /// about: unknown role ids and duplicate emails fail the write, users
    /// marked as having dependents cannot be deleted.
    pub struct MockUserRepository {
        roles: BTreeMap<i64, String>,
        users: Mutex<BTreeMap<i64, Row>>,
        next_id: Mutex<i64>,
        dependents: Mutex<HashSet<i64>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl Default for MockUserRepository {
        fn default() -> Self {
            Self::with_roles(&[(1, "ROLE_OPERATOR"), (2, "ROLE_ADMIN")])
        }
    }

    impl MockUserRepository {
        pub fn with_roles(roles: &[(i64, &str)]) -> Self {
            Self {
                roles: roles.iter().map(|(id, a)| (*id, a.to_string())).collect(),
                users: Mutex::new(BTreeMap::new()),
                next_id: Mutex::new(1),
                dependents: Mutex::new(HashSet::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Pretend other rows reference this user.
        pub fn add_dependent(&self, user_id: i64) {
            self.dependents.lock().unwrap().insert(user_id);
        }

        /// Names of the gateway operations invoked so far, in order.
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        pub fn stored_hash(&self, id: i64) -> Option<String> {
            self.users.lock().unwrap().get(&id).map(|r| r.password_hash.clone())
        }

        fn record(&self, name: &'static str) {
            self.calls.lock().unwrap().push(name);
        }

        fn check_roles(&self, role_ids: &[i64]) -> Result<BTreeSet<i64>, RepositoryError> {
            let mut set = BTreeSet::new();
            for id in role_ids {
                if !self.roles.contains_key(id) {
                    return Err(RepositoryError::ForeignKeyViolation(format!("role {id}")));
                }
                set.insert(*id);
            }
            Ok(set)
        }

        fn check_email(users: &BTreeMap<i64, Row>, email: &str, except: Option<i64>) -> Result<(), RepositoryError> {
            if users.iter().any(|(id, r)| r.email == email && Some(*id) != except) {
                return Err(RepositoryError::UniqueViolation(format!("email {email}")));
            }
            Ok(())
        }

        fn to_record(&self, id: i64, row: &Row) -> UserRecord {
            UserRecord {
                id,
                first_name: row.first_name.clone(),
                last_name: row.last_name.clone(),
                email: row.email.clone(),
                password_hash: row.password_hash.clone(),
                roles: row
                    .role_ids
                    .iter()
                    .map(|rid| RoleDto { id: *rid, authority: self.roles[rid].clone() })
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_all_paged(&self, page: &PageRequest) -> Result<Page<UserRecord>, RepositoryError> {
            self.record("find_all_paged");
            let (idx, size) = page.normalize().map_err(|e| RepositoryError::Db(e.to_string()))?;
            let users = self.users.lock().unwrap();
            let mut all: Vec<UserRecord> = users.iter().map(|(id, r)| self.to_record(*id, r)).collect();
            if let Some(sort) = &page.sort {
                let key = UserSortKey::from_property(&sort.property).unwrap_or(UserSortKey::Id);
                all.sort_by(|a, b| {
                    let ord = match key {
                        UserSortKey::Id => a.id.cmp(&b.id),
                        UserSortKey::FirstName => a.first_name.cmp(&b.first_name),
                        UserSortKey::LastName => a.last_name.cmp(&b.last_name),
                        UserSortKey::Email => a.email.cmp(&b.email),
                    };
                    let ord = if sort.direction == Direction::Desc { ord.reverse() } else { ord };
                    ord.then(a.id.cmp(&b.id))
                });
            }
            let total = all.len() as u64;
            let content = all.into_iter().skip(usize::try_from(idx * size).unwrap_or(usize::MAX)).take(size as usize).collect();
            Ok(Page::new(content, total, idx, size))
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
            self.record("find_by_id");
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).map(|r| self.to_record(id, r)))
        }

        async fn insert(&self, user: NewUser) -> Result<UserRecord, RepositoryError> {
            self.record("insert");
            let role_ids = self.check_roles(&user.role_ids)?;
            let mut users = self.users.lock().unwrap();
            Self::check_email(&users, &user.email, None)?;
            let mut next = self.next_id.lock().unwrap();
            let id = *next;
            *next += 1;
            let row = Row {
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
                role_ids,
            };
            let rec = self.to_record(id, &row);
            users.insert(id, row);
            Ok(rec)
        }

        async fn update(&self, id: i64, changes: UserChanges) -> Result<UserRecord, RepositoryError> {
            self.record("update");
            let mut users = self.users.lock().unwrap();
            if !users.contains_key(&id) {
                return Err(RepositoryError::MissingEntity(format!("user {id}")));
            }
            let role_ids = self.check_roles(&changes.role_ids)?;
            Self::check_email(&users, &changes.email, Some(id))?;
            let row = users.get_mut(&id).ok_or_else(|| RepositoryError::MissingEntity(format!("user {id}")))?;
            row.first_name = changes.first_name;
            row.last_name = changes.last_name;
            row.email = changes.email;
            row.role_ids = role_ids;
            Ok(self.to_record(id, row))
        }

        async fn exists_by_id(&self, id: i64) -> Result<bool, RepositoryError> {
            self.record("exists_by_id");
            Ok(self.users.lock().unwrap().contains_key(&id))
        }

        async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
            self.record("delete_by_id");
            if self.dependents.lock().unwrap().contains(&id) {
                return Err(RepositoryError::ForeignKeyViolation(format!("user {id} is referenced")));
            }
            self.users.lock().unwrap().remove(&id);
            Ok(())
        }
    }
}

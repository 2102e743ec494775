use super::{NewUser, StoreError, User, UserPatch, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>,
    // insertion order, so list_all is stable
    order: Vec<Uuid>,
}

/// Process-local store. Every mutation holds the write lock for its whole
/// duration, which is what serializes concurrent signups.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(user.email));
        }

        let record = User {
            id: Uuid::now_v7(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
        };

        tables.by_email.insert(record.email.clone(), record.id);
        tables.order.push(record.id);
        tables.users.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(user);
        Ok(user.clone())
    }

    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .order
            .iter()
            .filter_map(|id| tables.users.get(id))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "digest".to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_by_email() {
        let store = MemoryStore::new();
        let created = store.create(new_user("info@futurestud.io")).await.unwrap();

        let found = store.find_by_email("info@futurestud.io").await.unwrap();
        assert_eq!(found, Some(created.clone()));

        let by_id = store.find_by_id(created.id).await.unwrap();
        assert_eq!(by_id, Some(created));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict_and_writes_nothing() {
        let store = MemoryStore::new();
        store.create(new_user("info@futurestud.io")).await.unwrap();

        let second = store.create(new_user("info@futurestud.io")).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let store = MemoryStore::new();
        let id = Uuid::new_v4();
        let result = store.update(id, UserPatch::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn update_keeps_email() {
        let store = MemoryStore::new();
        let created = store.create(new_user("info@futurestud.io")).await.unwrap();
        let patch = UserPatch {
            name: Some("marcus".to_string()),
            password_hash: None,
        };

        let updated = store.update(created.id, patch).await.unwrap();
        assert_eq!(updated.name.as_deref(), Some("marcus"));
        assert_eq!(updated.email, "info@futurestud.io");
        assert_eq!(updated.password_hash, "digest");
    }

    #[tokio::test]
    async fn list_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        store.create(new_user("a@example.com")).await.unwrap();
        store.create(new_user("b@example.com")).await.unwrap();
        store.create(new_user("c@example.com")).await.unwrap();

        let emails: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|user| user.email)
            .collect();
        assert_eq!(emails, ["a@example.com", "b@example.com", "c@example.com"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_yield_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create(new_user("race@example.com")).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(StoreError::Conflict(_)) => conflicts += 1,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }
}

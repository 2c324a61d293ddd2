//! Fixtures for service tests.

use std::sync::Arc;

use chrono::Utc;
use fixit_db::entities::user::{self, Role};

use crate::{memory::MemoryStore, policy::Actor, store::UserStore};

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

pub async fn seed_user(store: &MemoryStore, id: &str, role: Role) -> user::Model {
    let student = role == Role::Student;
    let user = user::Model {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@hostel.test"),
        password_hash: "unused".to_string(),
        role,
        student_id: student.then(|| format!("STU-{id}")),
        room_number: student.then(|| "B-12".to_string()),
        phone: "555-0100".to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    match store.insert_user(user).await {
        Ok(user) => user,
        Err(e) => panic!("seed user {id}: {e}"),
    }
}

pub fn actor(user: &user::Model) -> Actor {
    Actor::from(user)
}

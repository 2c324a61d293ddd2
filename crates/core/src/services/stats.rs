//! Aggregate counts for the staff dashboard.
//!
//! Recomputed on every call. Every enum value appears in the output, zero
//! when nothing matches.

use std::collections::BTreeMap;

use fixit_common::AppResult;
use fixit_db::entities::{
    complaint::{ComplaintCategory, ComplaintStatus, Priority},
    user::Role,
};
use serde::Serialize;

use crate::{
    policy::{self, Action, Actor},
    store::{ComplaintStoreRef, UserStoreRef},
};

/// Complaint counts by status, category and priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    pub status_stats: BTreeMap<&'static str, u64>,
    pub category_stats: BTreeMap<&'static str, u64>,
    pub priority_stats: BTreeMap<&'static str, u64>,
}

/// User counts by role and by active flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub role_stats: BTreeMap<&'static str, u64>,
    pub active_stats: BTreeMap<&'static str, u64>,
}

fn zero_filled<K: Copy + Eq>(
    keys: impl IntoIterator<Item = K>,
    name: impl Fn(K) -> &'static str,
    counts: &[(K, u64)],
) -> BTreeMap<&'static str, u64> {
    keys.into_iter()
        .map(|key| {
            let count: u64 = counts
                .iter()
                .filter(|(k, _)| *k == key)
                .map(|(_, n)| n)
                .sum();
            (name(key), count)
        })
        .collect()
}

const fn activity(is_active: bool) -> &'static str {
    if is_active { "active" } else { "inactive" }
}

/// Statistics service.
#[derive(Clone)]
pub struct StatsService {
    complaints: ComplaintStoreRef,
    users: UserStoreRef,
}

impl StatsService {
    /// Create a new statistics service.
    #[must_use]
    pub const fn new(complaints: ComplaintStoreRef, users: UserStoreRef) -> Self {
        Self { complaints, users }
    }

    /// Complaint counts over the whole complaint set.
    pub async fn overview(&self, actor: &Actor) -> AppResult<ComplaintStats> {
        policy::authorize(actor, Action::ViewStatistics, None)?;

        let by_status = self.complaints.count_by_status().await?;
        let by_category = self.complaints.count_by_category().await?;
        let by_priority = self.complaints.count_by_priority().await?;

        Ok(ComplaintStats {
            status_stats: zero_filled(ComplaintStatus::ALL, ComplaintStatus::as_str, &by_status),
            category_stats: zero_filled(
                ComplaintCategory::ALL,
                ComplaintCategory::as_str,
                &by_category,
            ),
            priority_stats: zero_filled(Priority::ALL, Priority::as_str, &by_priority),
        })
    }

    /// User counts over every account.
    pub async fn user_overview(&self, actor: &Actor) -> AppResult<UserStats> {
        policy::authorize(actor, Action::ViewStatistics, None)?;

        let by_role = self.users.count_users_by_role().await?;
        let by_active = self.users.count_users_by_active().await?;

        Ok(UserStats {
            role_stats: zero_filled(Role::ALL, Role::as_str, &by_role),
            active_stats: zero_filled([true, false], activity, &by_active),
        })
    }
}

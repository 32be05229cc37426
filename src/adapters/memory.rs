use crate::domain::model::Caller;
use crate::domain::ports::{IdentityResolver, UsageLedger};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local usage ledger for offline serving. Counts reset on restart.
#[derive(Debug, Default)]
pub struct InMemoryUsageLedger {
    events: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_at(&self, user_id: &str, at: DateTime<Utc>) {
        let mut events = self.events.lock().await;
        events.entry(user_id.to_string()).or_default().push(at);
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn count_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u32> {
        let events = self.events.lock().await;
        let count = events
            .get(user_id)
            .map(|times| times.iter().filter(|t| **t >= since).count())
            .unwrap_or(0);
        Ok(count as u32)
    }

    async fn record(&self, user_id: &str) -> Result<()> {
        self.record_at(user_id, Utc::now()).await;
        Ok(())
    }
}

/// Every caller is anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousIdentity;

#[async_trait]
impl IdentityResolver for AnonymousIdentity {
    async fn resolve(&self, _access_token: &str) -> Result<Option<Caller>> {
        Ok(None)
    }
}

/// 固定 token 對應使用者，供離線模式與測試使用
#[derive(Debug, Default, Clone)]
pub struct StaticIdentity {
    users: HashMap<String, String>,
}

impl StaticIdentity {
    pub fn new<I, K, V>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            users: tokens
                .into_iter()
                .map(|(token, user)| (token.into(), user.into()))
                .collect(),
        }
    }
}

#[async_trait]
impl IdentityResolver for StaticIdentity {
    async fn resolve(&self, access_token: &str) -> Result<Option<Caller>> {
        Ok(self.users.get(access_token).map(|user_id| Caller {
            user_id: user_id.clone(),
            email: None,
        }))
    }
}

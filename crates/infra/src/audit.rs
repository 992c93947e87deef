//! Audit trail of back-office mutations.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use pricelens_core::{AdminId, AuditLogId, DomainError, DomainResult, Page, PageRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub admin_id: Option<AdminId>,
    /// Verb such as `product.publish` or `category.delete`.
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

/// What happened, before it is stamped with an id and time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuditLog {
    pub admin_id: Option<AdminId>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
}

impl NewAuditLog {
    pub fn new(admin_id: AdminId, action: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            admin_id: Some(admin_id),
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: None,
            old_values: None,
            new_values: None,
        }
    }

    pub fn entity(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn old(mut self, values: JsonValue) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn new_values(mut self, values: JsonValue) -> Self {
        self.new_values = Some(values);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub admin_id: Option<AdminId>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
}

impl AuditFilter {
    /// Unparsable `admin_id` values are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            admin_id: get("admin_id").and_then(|v| v.parse().ok()),
            entity_type: get("entity_type"),
            action: get("action"),
        }
    }

    pub fn matches(&self, log: &AuditLog) -> bool {
        (self.admin_id.is_none() || self.admin_id == log.admin_id)
            && self
                .entity_type
                .as_deref()
                .is_none_or(|t| t == log.entity_type)
            && self.action.as_deref().is_none_or(|a| a == log.action)
    }
}

/// Append-only audit storage.
pub trait AuditLogRepository: Send + Sync {
    fn append(&self, log: AuditLog) -> DomainResult<()>;
    /// Entries in the order they were appended.
    fn all(&self) -> DomainResult<Vec<AuditLog>>;
}

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditLog>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DomainError {
        DomainError::storage("audit log lock poisoned")
    }
}

impl AuditLogRepository for InMemoryAuditLog {
    fn append(&self, log: AuditLog) -> DomainResult<()> {
        self.entries.write().map_err(|_| Self::poisoned())?.push(log);
        Ok(())
    }

    fn all(&self) -> DomainResult<Vec<AuditLog>> {
        Ok(self.entries.read().map_err(|_| Self::poisoned())?.clone())
    }
}

#[derive(Clone)]
pub struct AuditService {
    logs: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    pub fn new(logs: Arc<dyn AuditLogRepository>) -> Self {
        Self { logs }
    }

    pub fn record(&self, entry: NewAuditLog) -> DomainResult<AuditLog> {
        let log = AuditLog {
            id: AuditLogId::new(),
            admin_id: entry.admin_id,
            action: entry.action,
            entity_type: entry.entity_type,
            entity_id: entry.entity_id,
            old_values: entry.old_values,
            new_values: entry.new_values,
            created_at: Utc::now(),
        };
        self.logs.append(log.clone())?;
        tracing::debug!(action = %log.action, entity_type = %log.entity_type, "audit entry recorded");
        Ok(log)
    }

    /// Newest first; entries sharing a timestamp keep reverse append order.
    pub fn list(&self, filter: &AuditFilter, page: PageRequest) -> DomainResult<Page<AuditLog>> {
        let mut logs: Vec<AuditLog> = self
            .logs
            .all()?
            .into_iter()
            .rev()
            .filter(|l| filter.matches(l))
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.paginate(logs))
    }
}

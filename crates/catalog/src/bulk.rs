//! Multi-product actions.

use serde::{Deserialize, Serialize};

use pricelens_core::{DomainError, DomainResult, FieldErrors, Input, ProductId, RawInput};

/// Upper bound on ids per bulk request.
pub const MAX_BULK_IDS: usize = 100;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Publish,
    Archive,
    Unarchive,
    Verify,
    RevertToDraft,
    Delete,
    Restore,
}

impl BulkAction {
    pub const ALL: [BulkAction; 7] = [
        Self::Publish,
        Self::Archive,
        Self::Unarchive,
        Self::Verify,
        Self::RevertToDraft,
        Self::Delete,
        Self::Restore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Verify => "verify",
            Self::RevertToDraft => "revert_to_draft",
            Self::Delete => "delete",
            Self::Restore => "restore",
        }
    }

    /// Past tense used in result messages.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::Publish => "published",
            Self::Archive => "archived",
            Self::Unarchive => "unarchived",
            Self::Verify => "verified",
            Self::RevertToDraft => "reverted to draft",
            Self::Delete => "deleted",
            Self::Restore => "restored",
        }
    }

    /// Parse from the closed set of action names; anything else is rejected.
    pub fn parse(s: &str) -> DomainResult<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == needle)
            .ok_or_else(|| DomainError::field("action", format!("unknown bulk action `{}`", s.trim())))
    }
}

impl core::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated bulk request: a known action and 1..=100 distinct ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub ids: Vec<ProductId>,
}

impl BulkActionRequest {
    pub fn new(action: BulkAction, ids: Vec<ProductId>) -> DomainResult<Self> {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        if unique.is_empty() {
            return Err(DomainError::field("ids", "select at least one product"));
        }
        if unique.len() > MAX_BULK_IDS {
            return Err(DomainError::field(
                "ids",
                format!("at most {MAX_BULK_IDS} products per bulk action"),
            ));
        }
        Ok(Self { action, ids: unique })
    }

    /// `{"action": "...", "ids": [...]}`; `ids` may also be a comma separated
    /// string from a form post.
    pub fn from_request(raw: &RawInput) -> DomainResult<Self> {
        let input = Input::new(raw);
        let mut errors = FieldErrors::new();

        let action = match input.string("action") {
            Some(a) => match BulkAction::parse(&a) {
                Ok(action) => Some(action),
                Err(_) => {
                    errors.add("action", format!("unknown bulk action `{a}`"));
                    None
                }
            },
            None => {
                errors.add("action", "action is required");
                None
            }
        };

        let mut ids = Vec::new();
        match input.string_list("ids") {
            Some(values) => {
                for value in values {
                    match value.parse::<ProductId>() {
                        Ok(id) => ids.push(id),
                        Err(_) => {
                            errors.add("ids", format!("`{value}` is not a valid product id"));
                        }
                    }
                }
            }
            None => errors.add("ids", "ids is required"),
        }

        errors.into_result()?;
        match action {
            Some(action) => Self::new(action, ids),
            None => Err(DomainError::field("action", "action is required")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: ProductId,
    pub reason: String,
}

/// Outcome of a bulk action: per-id successes and failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionResult {
    pub action: BulkAction,
    pub requested: usize,
    pub succeeded: Vec<ProductId>,
    pub failed: Vec<BulkFailure>,
}

impl BulkActionResult {
    pub fn new(action: BulkAction, requested: usize) -> Self {
        Self {
            action,
            requested,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, id: ProductId) {
        self.succeeded.push(id);
    }

    pub fn record_failure(&mut self, id: ProductId, reason: impl Into<String>) {
        self.failed.push(BulkFailure {
            id,
            reason: reason.into(),
        });
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Toast level: `success`, `warning` (partial) or `error` (nothing applied).
    pub fn level(&self) -> &'static str {
        match (self.success_count(), self.failure_count()) {
            (_, 0) => "success",
            (0, _) => "error",
            _ => "warning",
        }
    }

    pub fn message(&self) -> String {
        let done = format!(
            "{} product{} {}",
            self.success_count(),
            if self.success_count() == 1 { "" } else { "s" },
            self.action.past_tense()
        );
        if self.has_failures() {
            format!("{done}; {} failed", self.failure_count())
        } else {
            done
        }
    }
}

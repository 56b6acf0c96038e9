//! Entity descriptors used to correlate log lines and errors.
//!
//! Every domain object (user, wallet, coin, ...) gets a descriptor with a
//! hierarchical label such as `wallet:btc_3f1c.user:default_9a2b`, and
//! loggers/error constructors bound to that label.

use chrono::{DateTime, Utc};
use common::utils::{new_id, time::format_utc};
use common::{AppError, LogLevel, Logger};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept from the subtype and id in a label.
pub const LABEL_PART_MAX: usize = 15;

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Build the label `main:sub[..15]_id[..15].parent`, where the parent label
/// loses its first `main:` occurrence. Empty ids and parent labels are
/// skipped. Delimiters inside the parts are not escaped.
pub fn derive_label(main: &str, sub: &str, id: Option<&str>, parent_label: Option<&str>) -> String {
    let mut label = format!("{main}:{}", truncate(sub, LABEL_PART_MAX));
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        label.push('_');
        label.push_str(truncate(id, LABEL_PART_MAX));
    }
    if let Some(parent) = parent_label.filter(|p| !p.is_empty()) {
        label.push('.');
        label.push_str(&parent.replacen(&format!("{main}:"), "", 1));
    }
    label
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityType {
    pub main: String,
    pub sub: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Entity {
    id: String,
    kind: EntityType,
    created_at: DateTime<Utc>,
    store_key: String,
    parent: Option<ParentRef>,
    label: String,
    info: Logger,
    warn: Logger,
}

impl Entity {
    /// Describe a new entity. Type names are lower-cased; a random id is
    /// generated when none (or an empty one) is given.
    pub fn new(main: &str, sub: &str, id: Option<&str>, parent: Option<&Entity>) -> Self {
        let kind = EntityType { main: main.to_lowercase(), sub: sub.to_lowercase() };
        let id = id.filter(|id| !id.is_empty()).map(str::to_string).unwrap_or_else(new_id);
        let store_key = format!("{}_{}", kind.sub, id);
        let parent = parent.map(|p| ParentRef { id: p.id.clone(), label: p.label.clone() });
        let label = derive_label(
            &kind.main,
            &kind.sub,
            Some(id.as_str()),
            parent.as_ref().map(|p| p.label.as_str()),
        );
        Self {
            info: Logger::new(LogLevel::Info, label.clone()),
            warn: Logger::new(LogLevel::Warn, label.clone()),
            id,
            kind,
            created_at: Utc::now(),
            store_key,
            parent,
            label,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &EntityType {
        &self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Creation time as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn created_at_utc(&self) -> String {
        format_utc(self.created_at)
    }

    /// Storage key `"<sub>_<id>"`.
    pub fn store_key(&self) -> &str {
        &self.store_key
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.info.log(msg);
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.warn.log(msg);
    }

    /// Reported error labelled with this entity.
    pub fn err(&self, message: impl Into<String>) -> AppError {
        self.err_with(AppError::new(message))
    }

    /// Label and report a prepared error (status, parent, extras kept).
    pub fn err_with(&self, err: AppError) -> AppError {
        err.with_label(self.label.clone()).report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_deterministic() {
        let a = derive_label("wallet", "btc", Some("abc"), Some("user:default_1"));
        let b = derive_label("wallet", "btc", Some("abc"), Some("user:default_1"));
        assert_eq!(a, b);
        assert_eq!(a, "wallet:btc_abc.user:default_1");
    }

    #[test]
    fn label_truncates_sub_and_id() {
        let label = derive_label("coin", "averyveryverylongsubtype", Some("0123456789abcdefXYZ"), None);
        assert_eq!(label, "coin:averyveryverylo_0123456789abcde");
    }

    #[test]
    fn label_truncation_is_char_based() {
        let label = derive_label("coin", "ääääääääääääääääää", None, None);
        assert_eq!(label, format!("coin:{}", "ä".repeat(15)));
    }

    #[test]
    fn label_strips_own_main_type_from_parent() {
        assert_eq!(derive_label("coin", "tx", Some("2"), Some("coin:btc_1")), "coin:tx_2.btc_1");
        assert_eq!(derive_label("coin", "btc", None, Some("")), "coin:btc");
    }

    #[test]
    fn entity_derives_keys_and_label() {
        let user = Entity::new("User", "Default", Some("u1"), None);
        assert_eq!(user.kind(), &EntityType { main: "user".into(), sub: "default".into() });
        assert_eq!(user.store_key(), "default_u1");
        assert_eq!(user.label(), "user:default_u1");
        assert!(user.parent().is_none());
        assert!(user.created_at_utc().ends_with('Z'));

        let wallet = Entity::new("wallet", "BTC", Some("w9"), Some(&user));
        assert_eq!(wallet.label(), "wallet:btc_w9.user:default_u1");
        assert_eq!(wallet.parent().map(|p| p.id.as_str()), Some("u1"));
    }

    #[test]
    fn entity_generates_id_when_missing() {
        let a = Entity::new("coin", "eth", None, None);
        let b = Entity::new("coin", "eth", Some(""), None);
        assert_eq!(a.id().len(), 36);
        assert_ne!(a.id(), b.id());
        assert_eq!(a.store_key(), format!("eth_{}", a.id()));
    }

    #[test]
    fn err_carries_label() {
        let e = Entity::new("coin", "eth", Some("x"), None);
        let err = e.err("Loading coin failed");
        assert_eq!(err.label(), Some("coin:eth_x"));
        assert_eq!(err.message(), "Loading coin failed");

        let err = e.err_with(AppError::new("Upstream down").with_status(503));
        assert_eq!(err.status(), 503);
        assert_eq!(err.label(), Some("coin:eth_x"));
    }
}

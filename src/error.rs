use std::fmt::Display;

use thiserror::Error;

use crate::schema::EntityKind;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("login rejected for user {user:?}")]
    Authentication { user: String },
    #[error("request failed: {url}: {detail}")]
    Transport { url: String, detail: String },
    #[error("no monitor or zone matches {key:?}")]
    NotFound { key: String },
    #[error("{kind} has no parameter named {name:?}")]
    UnknownParameter { kind: EntityKind, name: String },
    #[error("parameter {name:?} requires a non-empty Name:Value pair")]
    EmptyValue { name: String },
    #[error("{value:?} is not a legal value for {name} (expected one of: {allowed})")]
    InvalidEnumValue {
        name: String,
        value: String,
        allowed: String,
    },
    #[error("value out of range: {detail}")]
    Range { detail: String },
    #[error("time window is inverted: {from} is after {to}")]
    InvalidRange { from: String, to: String },
    #[error("monitor selectors mix include and exclude tokens; use one style per invocation")]
    MixedSelector,
    #[error("failed to parse {what}: {detail}")]
    Parse { what: String, detail: String },
}

impl ClientError {
    pub fn transport(url: impl Into<String>, detail: impl Display) -> Self {
        Self::Transport {
            url: url.into(),
            detail: detail.to_string(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn unknown_parameter(kind: EntityKind, name: impl Into<String>) -> Self {
        Self::UnknownParameter {
            kind,
            name: name.into(),
        }
    }

    pub fn range(detail: impl Into<String>) -> Self {
        Self::Range {
            detail: detail.into(),
        }
    }

    pub fn parse(what: impl Into<String>, detail: impl Display) -> Self {
        Self::Parse {
            what: what.into(),
            detail: detail.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

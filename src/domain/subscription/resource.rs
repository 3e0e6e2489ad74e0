//! Metered resources and the catalog actions that consume them.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A usage counter gated by the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedResource {
    Product,
    PinnedProduct,
}

impl LimitedResource {
    /// Singular noun for user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            LimitedResource::Product => "product",
            LimitedResource::PinnedProduct => "pinned product",
        }
    }

    /// Plural noun for user-facing messages.
    pub fn plural(&self) -> &'static str {
        match self {
            LimitedResource::Product => "products",
            LimitedResource::PinnedProduct => "pinned products",
        }
    }
}

/// A catalog action that consumes a slot when it succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitedAction {
    PublishProduct,
    PinProduct,
}

impl LimitedAction {
    /// The counter this action increments.
    pub fn resource(&self) -> LimitedResource {
        match self {
            LimitedAction::PublishProduct => LimitedResource::Product,
            LimitedAction::PinProduct => LimitedResource::PinnedProduct,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitedAction::PublishProduct => "publish_product",
            LimitedAction::PinProduct => "pin_product",
        }
    }
}

impl FromStr for LimitedAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "publish_product" => Ok(LimitedAction::PublishProduct),
            "pin_product" => Ok(LimitedAction::PinProduct),
            "" => Err(ValidationError::empty_field("action")),
            other => Err(ValidationError::invalid_format(
                "action",
                format!("unknown action '{}'", other),
            )),
        }
    }
}

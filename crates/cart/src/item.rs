//! Cart line items and the ordered cart state.

use petal_market_core::FlowerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One `(flower, quantity)` pair in a cart.
///
/// A cart holds at most one line item per flower; repeat adds merge into the
/// existing item instead of appending a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Flower this item reserves.
    pub id: FlowerId,
    /// Number of flowers reserved.
    pub number: u32,
}

/// Ordered sequence of line items; insertion order is first-add order.
///
/// Serializes transparently as a JSON array of `{id, number}` objects, the
/// shape persisted under the session key [`crate::persistence::STORE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<LineItem>,
}

/// Error decoding the `flowerId=number;...` form field.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormDecodeError {
    #[error("malformed cart entry: {0:?}")]
    MalformedEntry(String),
    #[error("invalid flower id in cart entry: {0:?}")]
    InvalidId(String),
    #[error("invalid number in cart entry: {0:?}")]
    InvalidNumber(String),
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// An owned, independent copy of the line items.
    ///
    /// Mutating the returned vector never affects the cart.
    #[must_use]
    pub fn items(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    /// Iterate over the line items in cart order.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of flowers this cart holds for `id` (0 when absent).
    #[must_use]
    pub fn number_of(&self, id: FlowerId) -> u32 {
        self.items
            .iter()
            .find(|item| item.id == id)
            .map_or(0, |item| item.number)
    }

    /// Merge `number` more flowers into the line item for `id`, creating the
    /// item at the end of the cart if it is not held yet.
    pub fn merge(&mut self, id: FlowerId, number: u32) {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => item.number += number,
            None => self.items.push(LineItem { id, number }),
        }
    }

    /// Clear the cart, returning the items it previously held.
    pub fn take_items(&mut self) -> Vec<LineItem> {
        std::mem::take(&mut self.items)
    }

    /// Encode the cart for form submission: `flowerId=number;flowerId=number`,
    /// semicolon-separated with no trailing separator, in cart order.
    #[must_use]
    pub fn encode_form_value(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(&format!("{}={}", item.id, item.number));
        }
        out
    }

    /// Decode a `flowerId=number;...` form field back into a cart.
    ///
    /// The empty string decodes to the empty cart. Repeated flower ids merge,
    /// matching add semantics.
    ///
    /// # Errors
    ///
    /// Returns [`FormDecodeError`] when an entry is not `id=number` or either
    /// side fails to parse.
    pub fn decode_form_value(value: &str) -> Result<Self, FormDecodeError> {
        let mut state = Self::new();
        if value.is_empty() {
            return Ok(state);
        }
        for entry in value.split(';') {
            let (id, number) = entry
                .split_once('=')
                .ok_or_else(|| FormDecodeError::MalformedEntry(entry.to_string()))?;
            let id: i32 = id
                .parse()
                .map_err(|_| FormDecodeError::InvalidId(entry.to_string()))?;
            let number: u32 = number
                .parse()
                .map_err(|_| FormDecodeError::InvalidNumber(entry.to_string()))?;
            state.merge(FlowerId::new(id), number);
        }
        Ok(state)
    }
}

impl FromIterator<LineItem> for CartState {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

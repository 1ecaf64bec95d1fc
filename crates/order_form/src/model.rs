//! Order data model.
//!
//! - `FieldValue`: the single source of truth for form content (what gets submitted)
//! - `Field`: the two validated slots (`fullName`, `size`)
//! - `Size`: the accepted pizza sizes
//! - `ToppingId` / `Topping` / `ToppingCatalog`: the static topping configuration
//! - `ToppingSet`: duplicate-free selection of topping ids
//!
//! Everything here is plain data. Mutation rules live in `controller.rs`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// A validated form slot. The string form matches the wire/field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Field {
    #[strum(to_string = "fullName")]
    #[serde(rename = "fullName")]
    FullName,
    #[strum(to_string = "size")]
    #[serde(rename = "size")]
    Size,
}

/// Accepted pizza sizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Size {
    S,
    M,
    L,
}

impl Size {
    /// Human label used by the size selector.
    pub fn label(&self) -> &'static str {
        match self {
            Size::S => "Small",
            Size::M => "Medium",
            Size::L => "Large",
        }
    }
}

/// Opaque topping identifier drawn from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToppingId(String);

impl ToppingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToppingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToppingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topping {
    pub id: ToppingId,
    pub display_text: String,
}

impl Topping {
    pub fn new(id: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            id: ToppingId::new(id),
            display_text: display_text.into(),
        }
    }
}

/// Ordered, static list of toppings the form offers. Rendering iterates it in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToppingCatalog(Vec<Topping>);

impl Default for ToppingCatalog {
    fn default() -> Self {
        Self(vec![
            Topping::new("1", "Pepperoni"),
            Topping::new("2", "Green Peppers"),
            Topping::new("3", "Pineapple"),
            Topping::new("4", "Mushrooms"),
            Topping::new("5", "Ham"),
        ])
    }
}

impl ToppingCatalog {
    pub fn new(toppings: Vec<Topping>) -> Self {
        Self(toppings)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topping> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Topping> {
        self.0.get(index)
    }
}

/// Selected toppings. Never holds the same id twice; keeps first-insertion order
/// so the submitted array is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToppingSet(Vec<ToppingId>);

impl ToppingSet {
    /// Insert `id` unless already present. Returns true if the set changed.
    pub fn insert(&mut self, id: ToppingId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// Remove `id` if present. Returns true if the set changed.
    pub fn remove(&mut self, id: &ToppingId) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != id);
        before != self.0.len()
    }

    pub fn contains(&self, id: &ToppingId) -> bool {
        self.0.iter().any(|t| t == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToppingId> {
        self.0.iter()
    }
}

impl<const N: usize> From<[&str; N]> for ToppingSet {
    fn from(ids: [&str; N]) -> Self {
        let mut set = ToppingSet::default();
        for id in ids {
            set.insert(ToppingId::from(id));
        }
        set
    }
}

/// Current form content. Serialized as the order request body:
/// `{ "fullName": string, "size": string, "toppings": [string] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub full_name: String,
    pub size: String,
    pub toppings: ToppingSet,
}

impl FieldValue {
    /// Raw string currently held by a validated field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Size => &self.size,
        }
    }

    /// Copy of `self` with `field` replaced by `value`.
    pub fn with(&self, field: Field, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        match field {
            Field::FullName => next.full_name = value.into(),
            Field::Size => next.size = value.into(),
        }
        next
    }
}

//! Canonical Identifiers
//!
//! Every entity row (user, category, income, expense, savings goal) is keyed
//! by a fixed 16-byte value. Humans hand that value back to the API in three
//! textual shapes: the hyphenated UUID form, bare 32-character hex, and
//! `0x`-prefixed hex. This module owns both directions of that conversion
//! and the type-safe [`Id<T>`] wrappers built on top of it.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Decode errors
// ============================================================================

/// Why a textual identifier failed to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeReason {
    /// Nothing left after stripping the prefix and hyphens
    Empty,
    /// Normalized hex was not exactly 32 characters
    WrongLength,
    /// A character outside `[0-9a-fA-F]` survived normalization
    InvalidCharacter,
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodeReason::Empty => "empty input",
            DecodeReason::WrongLength => "wrong length",
            DecodeReason::InvalidCharacter => "invalid character",
        };
        write!(f, "{}", s)
    }
}

/// Typed decode failure.
///
/// Carries the length of the original input so callers can log the shape of
/// what arrived without echoing the value itself. Decoding never panics;
/// every malformed input lands here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid identifier text: {reason} (input length {input_len})")]
pub struct IdDecodeError {
    pub reason: DecodeReason,
    pub input_len: usize,
}

// ============================================================================
// CanonicalId
// ============================================================================

/// The system's single source-of-truth identifier: exactly 16 bytes.
///
/// Generated once at entity creation (random, UUID v4) and immutable
/// thereafter. All accepted textual forms round-trip losslessly through this
/// value, and re-encoding always yields the canonical lowercase hyphenated
/// form regardless of which form was supplied.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalId([u8; 16]);

impl CanonicalId {
    /// Byte width of every identifier.
    pub const LEN: usize = 16;

    /// Generate a fresh random identifier (UUID v4).
    pub fn random() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Wrap an existing 16-byte value.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The binary form. Total and infallible.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(*uuid.as_bytes())
    }

    /// Convert to a [`Uuid`] for database binding.
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }

    /// Decode any accepted textual form.
    ///
    /// Accepted, in precedence order:
    /// 1. hyphenated UUID (`8-4-4-4-12` hex groups, 36 chars)
    /// 2. raw hex, no separators (32 chars)
    /// 3. `0x`- or `0X`-prefixed raw hex (34 chars)
    ///
    /// Normalization: strip an optional case-insensitive `0x` prefix, drop
    /// every hyphen, lowercase, then require exactly 32 hex characters
    /// parsed big-endian into 16 bytes. Anything else returns a typed
    /// [`IdDecodeError`]; this function never truncates, pads, or panics.
    pub fn parse_text(text: &str) -> Result<Self, IdDecodeError> {
        let input_len = text.chars().count();
        let fail = |reason| IdDecodeError { reason, input_len };

        let stripped = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        let hex: Vec<char> = stripped.chars().filter(|&c| c != '-').collect();

        if hex.is_empty() {
            return Err(fail(DecodeReason::Empty));
        }
        if hex.len() != 2 * Self::LEN {
            return Err(fail(DecodeReason::WrongLength));
        }

        let mut bytes = [0u8; Self::LEN];
        for (i, pair) in hex.chunks_exact(2).enumerate() {
            let hi = pair[0]
                .to_digit(16)
                .ok_or_else(|| fail(DecodeReason::InvalidCharacter))?;
            let lo = pair[1]
                .to_digit(16)
                .ok_or_else(|| fail(DecodeReason::InvalidCharacter))?;
            bytes[i] = ((hi << 4) | lo) as u8;
        }

        Ok(Self(bytes))
    }

    /// Canonical display form: lowercase hyphenated `8-4-4-4-12`.
    pub fn to_hyphenated(&self) -> String {
        self.to_uuid().hyphenated().to_string()
    }
}

impl fmt::Debug for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalId({})", self.to_hyphenated())
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hyphenated())
    }
}

impl FromStr for CanonicalId {
    type Err = IdDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_text(s)
    }
}

impl From<Uuid> for CanonicalId {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl From<CanonicalId> for Uuid {
    fn from(id: CanonicalId) -> Self {
        id.to_uuid()
    }
}

impl Serialize for CanonicalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse_text(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Typed ID wrapper
// ============================================================================

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// ```
///
/// Two `Id`s with different markers are distinct types, so an expense id
/// cannot be passed where a user id is expected even though both are the
/// same 16 bytes underneath.
pub struct Id<T> {
    value: CanonicalId,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID.
    pub fn new() -> Self {
        Self::from_canonical(CanonicalId::random())
    }

    /// Wrap an existing canonical value.
    pub fn from_canonical(value: CanonicalId) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Decode from any accepted textual form.
    pub fn parse_text(text: &str) -> Result<Self, IdDecodeError> {
        CanonicalId::parse_text(text).map(Self::from_canonical)
    }

    /// Borrow the underlying canonical value.
    pub fn as_canonical(&self) -> &CanonicalId {
        &self.value
    }

    /// Unwrap into the canonical value.
    pub fn into_canonical(self) -> CanonicalId {
        self.value
    }

    /// Convert to a [`Uuid`] for database binding.
    pub fn to_uuid(&self) -> Uuid {
        self.value.to_uuid()
    }
}

// Manual impls: derives would put unnecessary bounds on the marker type.

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<CanonicalId> for Id<T> {
    fn from(value: CanonicalId) -> Self {
        Self::from_canonical(value)
    }
}

impl<T> From<Id<T>> for CanonicalId {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_canonical(CanonicalId::from_uuid(uuid))
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_text(s)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        CanonicalId::deserialize(deserializer).map(Self::from_canonical)
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for User IDs
    pub struct User;

    /// Marker for budget Category IDs
    pub struct Category;

    /// Marker for Income record IDs
    pub struct Income;

    /// Marker for Expense record IDs
    pub struct Expense;

    /// Marker for SavingsGoal IDs
    pub struct SavingsGoal;
}

/// Type aliases for common IDs
pub type UserId = Id<markers::User>;
pub type CategoryId = Id<markers::Category>;
pub type IncomeId = Id<markers::Income>;
pub type ExpenseId = Id<markers::Expense>;
pub type SavingsGoalId = Id<markers::SavingsGoal>;

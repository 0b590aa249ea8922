use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// Amount in satoshis. Display conversion to whole coins is a
/// presentation concern and lives with the callers.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Value(u64);

impl Value {
    pub const fn new(satoshis: u64) -> Self {
        Value(satoshis)
    }

    pub const fn zero() -> Self {
        Value(0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_satoshis(self) -> u64 {
        self.0
    }

    /// `None` when the sum leaves the satoshi range. Aggregations over
    /// caller-supplied values go through this instead of `+` so bad
    /// input surfaces as an error, never a wrap or a panic.
    pub fn checked_add(self, other: Value) -> Option<Value> {
        self.0.checked_add(other.0).map(Value)
    }
}

impl From<u64> for Value {
    fn from(satoshis: u64) -> Self {
        Value(satoshis)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, other: Value) -> Value {
        Value(self.0 + other.0)
    }
}

impl AddAssign for Value {
    fn add_assign(&mut self, other: Value) {
        self.0 += other.0;
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, other: Value) -> Value {
        Value(self.0 - other.0)
    }
}

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        TransactionId(id.into())
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OutputIndex(u64);

impl OutputIndex {
    pub fn new(index: u64) -> Self {
        OutputIndex(index)
    }
}

impl From<OutputIndex> for u64 {
    fn from(index: OutputIndex) -> u64 {
        index.0
    }
}

impl fmt::Display for OutputIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Address(address.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one output of one transaction. Two pointers are equal iff
/// both components match; this is the key of the whole utxo set, kept as
/// a composite rather than a concatenated string so hash formats can
/// never collide.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UtxoPointer {
    #[serde(rename = "tx")]
    pub transaction_id: TransactionId,
    #[serde(rename = "idx")]
    pub output_index: OutputIndex,
}

impl fmt::Display for UtxoPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.transaction_id, self.output_index)
    }
}

/// An output of the tracked address that no observed transaction has
/// consumed yet. Produced by reconstruction, consumed by selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentEntry {
    #[serde(rename = "ptr")]
    pub pointer: UtxoPointer,
    #[serde(rename = "val")]
    pub value: Value,
    #[serde(rename = "conf")]
    pub confirmed: bool,
}

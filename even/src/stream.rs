//! Content-addressed stream identity.
//!
//! A stream is identified by a 20-byte SHA-1 hash. The hash is either supplied
//! directly (for example when it was read back from storage) or derived from
//! the lower-cased UTF-8 bytes of a stream name, so `"Account-1"` and
//! `"account-1"` address the same stream.
//!
//! The name carried next to the hash is informational. It is never checked
//! against the hash, which allows stores to keep truncated names for very long
//! identifiers.
//!
//! # Example
//!
//! ```rust
//! use even::StreamIdentity;
//!
//! let stream = StreamIdentity::from_name("Account-1")?;
//! assert_eq!(stream, StreamIdentity::from_name("account-1")?);
//! assert_eq!(stream.to_hex().len(), 40);
//! # Ok::<(), even::errors::InvalidArgument>(())
//! ```

use crate::errors::{InvalidArgument, Result};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Length in bytes of every stream hash.
pub const HASH_LENGTH: usize = 20;

/// A 20-byte stream hash.
pub type StreamHash = [u8; HASH_LENGTH];

/// Identifies a stream by the hash of its name.
///
/// Equality, ordering and hashing only look at the hash bytes; two identities
/// built from the same hash but different names are equal.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "StreamRecord", into = "StreamRecord")]
pub struct StreamIdentity {
    hash: StreamHash,
    name: Option<String>,
    original_name: Option<String>,
}

impl StreamIdentity {
    /// Creates an identity from an existing hash.
    pub fn from_hash(hash: &[u8]) -> Result<Self> {
        Ok(Self {
            hash: check_hash(hash)?,
            name: None,
            original_name: None,
        })
    }

    /// Creates an identity from a stream name, hashing its lower-cased form.
    pub fn from_name(name: impl Into<String>) -> Result<Self> {
        let name = check_name(name.into())?;

        Ok(Self {
            hash: digest(name.to_lowercase().as_bytes()),
            name: Some(name),
            original_name: None,
        })
    }

    /// Creates an identity from a hash and a name.
    ///
    /// The name is documentation only; it is not required to hash to `hash`.
    pub fn from_hash_and_name(hash: &[u8], name: impl Into<String>) -> Result<Self> {
        let hash = check_hash(hash)?;
        let name = check_name(name.into())?;

        Ok(Self {
            hash,
            name: Some(name),
            original_name: None,
        })
    }

    /// Re-labels an identity read under a projection stream with the name of
    /// the stream the event was originally persisted to.
    ///
    /// The original name is only kept when it differs, ignoring case, from the
    /// name of `existing`.
    pub fn rehome(existing: &Self, original_name: Option<&str>) -> Self {
        let original_name = original_name
            .filter(|original| {
                !existing
                    .name
                    .as_deref()
                    .is_some_and(|name| eq_ignore_case(name, original))
            })
            .map(str::to_owned);

        Self {
            hash: existing.hash,
            name: existing.name.clone(),
            original_name,
        }
    }

    /// Creates a nameless identity from the digest of arbitrary bytes.
    ///
    /// Projection engines use this to content-address virtual streams from a
    /// predicate's identity source.
    pub fn from_bytes(input: impl AsRef<[u8]>) -> Self {
        Self {
            hash: digest(input.as_ref()),
            name: None,
            original_name: None,
        }
    }

    /// Returns the stream hash.
    pub const fn hash(&self) -> &StreamHash {
        &self.hash
    }

    /// Returns the stream name, or an empty string when none was set.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// Returns true if the identity carries a display name.
    pub const fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// Returns the name of the stream the event was persisted to, falling
    /// back to [`name`](Self::name).
    ///
    /// Only differs from `name` for identities produced by
    /// [`rehome`](Self::rehome) while reading projections.
    pub fn original_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or_else(|| self.name())
    }

    /// Encodes the hash as 40 lowercase hexadecimal characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Hashes arbitrary bytes with the stream digest.
pub(crate) fn digest(input: &[u8]) -> StreamHash {
    Sha1::digest(input).into()
}

fn check_hash(hash: &[u8]) -> Result<StreamHash> {
    StreamHash::try_from(hash).map_err(|_| InvalidArgument::InvalidHashLength {
        expected: HASH_LENGTH,
        actual: hash.len(),
    })
}

fn check_name(name: String) -> Result<String> {
    if name.is_empty() {
        return Err(InvalidArgument::EmptyStreamName);
    }
    Ok(name)
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

impl PartialEq for StreamIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for StreamIdentity {}

impl Hash for StreamIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl PartialOrd for StreamIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StreamIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.hash.cmp(&other.hash)
    }
}

impl fmt::Debug for StreamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamIdentity")
            .field("hash", &self.to_hex())
            .field("name", &self.name)
            .field("original_name", &self.original_name)
            .finish()
    }
}

impl fmt::Display for StreamIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_hex(), self.name())
    }
}

impl TryFrom<&str> for StreamIdentity {
    type Error = InvalidArgument;

    fn try_from(name: &str) -> Result<Self> {
        Self::from_name(name)
    }
}

impl TryFrom<String> for StreamIdentity {
    type Error = InvalidArgument;

    fn try_from(name: String) -> Result<Self> {
        Self::from_name(name)
    }
}

impl TryFrom<&[u8]> for StreamIdentity {
    type Error = InvalidArgument;

    fn try_from(hash: &[u8]) -> Result<Self> {
        Self::from_hash(hash)
    }
}

impl From<StreamHash> for StreamIdentity {
    fn from(hash: StreamHash) -> Self {
        Self {
            hash,
            name: None,
            original_name: None,
        }
    }
}

/// Serialized form: the hash as hex plus the optional names.
#[derive(Serialize, Deserialize)]
struct StreamRecord {
    hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_name: Option<String>,
}

impl From<StreamIdentity> for StreamRecord {
    fn from(stream: StreamIdentity) -> Self {
        Self {
            hash: stream.to_hex(),
            name: stream.name,
            original_name: stream.original_name,
        }
    }
}

impl TryFrom<StreamRecord> for StreamIdentity {
    type Error = InvalidArgument;

    fn try_from(record: StreamRecord) -> Result<Self> {
        let bytes =
            hex::decode(&record.hash).map_err(|e| InvalidArgument::InvalidHex(e.to_string()))?;
        let hash = check_hash(&bytes)?;
        let name = record.name.map(check_name).transpose()?;

        Ok(Self {
            hash,
            name,
            original_name: record.original_name,
        })
    }
}

//! A content digest used to decide whether two files are identical without comparing their bytes.
//!
//! # Implementation Notes
//!
//! The digest is [SHA-1] because the Netlify deploy manifest keys file content by its SHA-1 hex
//! string. It is only used as an equality proxy for site content, never for anything
//! security-sensitive.
//!
//! [SHA-1]: https://www.rfc-editor.org/rfc/rfc3174

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use serde::de::Visitor;
use serde::{de, Deserialize, Serialize};
use sha1::{Digest, Sha1};
use thiserror::Error;

const READ_BUFFER_SIZE: usize = 8192;

pub struct Hasher(Sha1);

impl Hasher {
    pub fn new() -> Self {
        Self(Sha1::new())
    }

    pub fn update(&mut self, input: &[u8]) -> &mut Self {
        self.0.update(input);
        self
    }

    pub fn finalize(&mut self) -> Hash {
        Hash::from_slice(&self.0.finalize_reset())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// A content digest, computed over an input of bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Hash([u8; 20]);

impl Hash {
    /// Creates and returns a new [Hash] value, computed from an input of bytes.
    #[must_use]
    pub fn new(input: &[u8]) -> Self {
        Self::from_slice(&Sha1::digest(input))
    }

    fn from_slice(digest: &[u8]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(digest);
        Self(bytes)
    }

    /// Digests the contents of the file at `path` without loading it into memory at once.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Hasher::new();
        let mut buffer = [0; READ_BUFFER_SIZE];

        loop {
            let count = reader.read(&mut buffer)?;
            if count == 0 {
                break;
            }
            hasher.update(&buffer[..count]);
        }

        Ok(hasher.finalize())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Hash::new("".as_bytes())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct HashVisitor;

impl<'de> Visitor<'de> for HashVisitor {
    type Value = Hash;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sha1 hex string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Hash::from_str(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(HashVisitor)
    }
}

/// An error when parsing a String representation of a [`Hash`].
#[derive(Debug, Error)]
#[error("failed to parse hash hex string")]
pub struct HashParseError(#[from] hex::FromHexError);

impl FromStr for Hash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

//! SKU-to-storage-path resolution.
//!
//! # Responsibilities
//! - Parse product SKU codes into their fixed-length fragments
//! - Derive the canonical storage path for a product image
//!
//! # Design Decisions
//! - Pure function, no I/O: same SKU always derives the same path
//! - Strict validation here, loose capture in the router: a malformed SKU
//!   must surface as `InvalidSku`, not fall through to passthrough

use thiserror::Error;

/// Vendor code length in characters.
const VENDOR_LEN: usize = 3;
/// Category code length in characters.
const CATEGORY_LEN: usize = 3;
/// Variant code length in characters.
const VARIANT_LEN: usize = 2;

/// Why a SKU fragment failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkuError {
    /// The code is not exactly vendor+category+variant characters long.
    #[error("sku code must be {expected} characters, got {len}", expected = VENDOR_LEN + CATEGORY_LEN + VARIANT_LEN)]
    BadLength {
        /// Observed length of the code.
        len: usize,
    },

    /// A code character is outside `[A-Z0-9]`.
    #[error("sku code contains invalid character {ch:?}")]
    BadCharset {
        /// The offending character.
        ch: char,
    },

    /// The extension is empty or not of the form `.alnum+`.
    #[error("invalid image extension {ext:?}")]
    BadExtension {
        /// The offending extension.
        ext: String,
    },
}

/// A validated product SKU: fixed-length vendor, category, and variant
/// codes plus an image index and file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuReference {
    vendor: String,
    category: String,
    variant: String,
    index: u32,
    extension: String,
}

impl SkuReference {
    /// Parse a SKU code (e.g. `"ABC123XY"`) with its image index and
    /// extension (e.g. `".jpg"`).
    pub fn parse(code: &str, index: u32, extension: &str) -> Result<Self, SkuError> {
        let total = VENDOR_LEN + CATEGORY_LEN + VARIANT_LEN;
        if code.chars().count() != total {
            return Err(SkuError::BadLength { len: code.chars().count() });
        }
        if let Some(ch) = code.chars().find(|c| !c.is_ascii_uppercase() && !c.is_ascii_digit()) {
            return Err(SkuError::BadCharset { ch });
        }

        let rest = extension.strip_prefix('.').unwrap_or("");
        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SkuError::BadExtension {
                ext: extension.to_string(),
            });
        }

        Ok(Self {
            vendor: code[..VENDOR_LEN].to_string(),
            category: code[VENDOR_LEN..VENDOR_LEN + CATEGORY_LEN].to_string(),
            variant: code[VENDOR_LEN + CATEGORY_LEN..].to_string(),
            index,
            extension: extension.to_string(),
        })
    }

    /// Canonical storage path:
    /// `<vendor>/<category>/<variant>/<vendor><category><variant>_<index><ext>`.
    pub fn storage_path(&self) -> String {
        format!(
            "{v}/{c}/{x}/{v}{c}{x}_{i}{e}",
            v = self.vendor,
            c = self.category,
            x = self.variant,
            i = self.index,
            e = self.extension,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_mapping() {
        let sku = SkuReference::parse("ABC123XY", 7, ".jpg").unwrap();
        assert_eq!(sku.storage_path(), "ABC/123/XY/ABC123XY_7.jpg");
    }

    #[test]
    fn test_deterministic() {
        let a = SkuReference::parse("Z9Z9Z9Z9", 1, ".png").unwrap();
        let b = SkuReference::parse("Z9Z9Z9Z9", 1, ".png").unwrap();
        assert_eq!(a.storage_path(), b.storage_path());
    }

    #[test]
    fn test_length_enforced() {
        assert_eq!(
            SkuReference::parse("ABC123X", 1, ".jpg"),
            Err(SkuError::BadLength { len: 7 })
        );
        assert_eq!(
            SkuReference::parse("ABC123XYZ", 1, ".jpg"),
            Err(SkuError::BadLength { len: 9 })
        );
    }

    #[test]
    fn test_charset_enforced() {
        assert_eq!(
            SkuReference::parse("abc123xy", 1, ".jpg"),
            Err(SkuError::BadCharset { ch: 'a' })
        );
        assert_eq!(
            SkuReference::parse("ABC-23XY", 1, ".jpg"),
            Err(SkuError::BadCharset { ch: '-' })
        );
    }

    #[test]
    fn test_extension_shape() {
        assert!(SkuReference::parse("ABC123XY", 1, ".jpeg").is_ok());
        assert!(SkuReference::parse("ABC123XY", 1, "jpg").is_err());
        assert!(SkuReference::parse("ABC123XY", 1, ".").is_err());
        assert!(SkuReference::parse("ABC123XY", 1, ".j/pg").is_err());
    }
}

//! # Check Modes
//!
//! Flags that change how strictly a document is checked. Modes that
//! rewrite the document (`COERCE_TYPES`, `APPLY_DEFAULTS`) do so in place,
//! on the value being validated, before the schema is evaluated.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Validation check mode.
    ///
    /// The empty set is [`CheckMode::NORMAL`]: strict JSON types, no
    /// defaults, `format` asserted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CheckMode: u32 {
        /// Convert scalar values to the type the schema declares when the
        /// conversion is lossless (`"42"` to `42`, `1` to `true`, ...).
        const COERCE_TYPES = 1 << 0;
        /// Insert schema `default` values for absent object properties.
        const APPLY_DEFAULTS = 1 << 1;
        /// Restrict `APPLY_DEFAULTS` to properties listed in `required`.
        const ONLY_REQUIRED_DEFAULTS = 1 << 2;
        /// Do not assert the `format` keyword.
        const DISABLE_FORMAT = 1 << 3;
    }
}

impl CheckMode {
    /// Strict checking; the default.
    pub const NORMAL: Self = Self::empty();

    /// True when this mode may rewrite the document before validation.
    pub fn rewrites_document(self) -> bool {
        self.intersects(Self::COERCE_TYPES | Self::APPLY_DEFAULTS)
    }

    /// True when `format` keywords are asserted.
    pub fn validates_formats(self) -> bool {
        !self.contains(Self::DISABLE_FORMAT)
    }
}

//! What the AST must warn for.

/// Warning mask consulted when building the tree and folding constants.
///
/// All flags default to on; the driver narrows the mask from CLI options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarnFor {
    /// Warn for variable shadowing.
    pub var_shadowing: bool,
    /// Warn for redundant visibility (public followed by public, ...).
    pub redundant_visibility: bool,
    /// Warn for NaN as input/output in constant folding.
    pub fold_nan: bool,
    /// Warn for signed over/underflow in constant folding.
    pub fold_signed_ou: bool,
    /// Warn for unsigned over/underflow in constant folding.
    pub fold_unsigned_ou: bool,
    /// Warn for invalid shift counts in constant folding.
    pub fold_invalid_shift: bool,
}

impl WarnFor {
    /// Warn for everything.
    pub const fn warn_all() -> Self {
        Self {
            var_shadowing: true,
            redundant_visibility: true,
            fold_nan: true,
            fold_signed_ou: true,
            fold_unsigned_ou: true,
            fold_invalid_shift: true,
        }
    }

    /// Warn for nothing.
    pub const fn warn_none() -> Self {
        Self {
            var_shadowing: false,
            redundant_visibility: false,
            fold_nan: false,
            fold_signed_ou: false,
            fold_unsigned_ou: false,
            fold_invalid_shift: false,
        }
    }
}

impl Default for WarnFor {
    fn default() -> Self {
        Self::warn_all()
    }
}

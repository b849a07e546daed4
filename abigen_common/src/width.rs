use core::fmt::{Display, Formatter};

/// Declared width of a generated constant. Matches the native type the header assigns the symbol
/// (or the type of the record field the symbol is compared against).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    I32,
    U64,
    U32,
}

impl Width {
    /// The Rust type name used when rendering a declaration.
    pub const fn rust_type(self) -> &'static str {
        match self {
            Width::I32 => "i32",
            Width::U64 => "u64",
            Width::U32 => "u32",
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(self, Width::I32)
    }

    pub const fn min(self) -> i128 {
        match self {
            Width::I32 => i32::MIN as i128,
            Width::U64 | Width::U32 => 0,
        }
    }

    pub const fn max(self) -> i128 {
        match self {
            Width::I32 => i32::MAX as i128,
            Width::U64 => u64::MAX as i128,
            Width::U32 => u32::MAX as i128,
        }
    }

    /// Returns true if `value` is representable without truncation.
    pub const fn contains(self, value: i128) -> bool {
        value >= self.min() && value <= self.max()
    }
}

impl Display for Width {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.rust_type())
    }
}

//! Fixed-width integer type catalogue.
//!
//! Every integer value in the language carries one of these types. The
//! catalogue knows each type's width, signedness and bounds, and performs
//! the modular reduction ("wrap") that defines overflow.

use num_bigint::BigInt;
use num_traits::{One, Zero};
use std::fmt;

/// Width used for `isize`, `usize` and `ptrdiff`.
pub const PLATFORM_BITS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    ISize,
    USize,
    /// Signed platform-size difference of two platform-size values.
    PtrDiff,
}

impl IntType {
    pub const ALL: [IntType; 15] = [
        IntType::I8,
        IntType::I16,
        IntType::I32,
        IntType::I64,
        IntType::I128,
        IntType::I256,
        IntType::U8,
        IntType::U16,
        IntType::U32,
        IntType::U64,
        IntType::U128,
        IntType::U256,
        IntType::ISize,
        IntType::USize,
        IntType::PtrDiff,
    ];

    /// Type of an unsuffixed integer literal that fits in 64 bits.
    pub const DEFAULT: IntType = IntType::I64;

    pub fn bits(self) -> u32 {
        match self {
            IntType::I8 | IntType::U8 => 8,
            IntType::I16 | IntType::U16 => 16,
            IntType::I32 | IntType::U32 => 32,
            IntType::I64 | IntType::U64 => 64,
            IntType::I128 | IntType::U128 => 128,
            IntType::I256 | IntType::U256 => 256,
            IntType::ISize | IntType::USize | IntType::PtrDiff => PLATFORM_BITS,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntType::I8
                | IntType::I16
                | IntType::I32
                | IntType::I64
                | IntType::I128
                | IntType::I256
                | IntType::ISize
                | IntType::PtrDiff
        )
    }

    /// `isize`, `usize` and `ptrdiff`.
    pub fn is_platform(self) -> bool {
        matches!(self, IntType::ISize | IntType::USize | IntType::PtrDiff)
    }

    pub fn name(self) -> &'static str {
        match self {
            IntType::I8 => "int8",
            IntType::I16 => "int16",
            IntType::I32 => "int32",
            IntType::I64 => "int64",
            IntType::I128 => "int128",
            IntType::I256 => "int256",
            IntType::U8 => "uint8",
            IntType::U16 => "uint16",
            IntType::U32 => "uint32",
            IntType::U64 => "uint64",
            IntType::U128 => "uint128",
            IntType::U256 => "uint256",
            IntType::ISize => "isize",
            IntType::USize => "usize",
            IntType::PtrDiff => "ptrdiff",
        }
    }

    /// Look a type up by its source name. `byte` is accepted as `uint8`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "byte" {
            return Some(IntType::U8);
        }
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The fixed (non-platform) type with the given width and signedness.
    pub fn fixed(bits: u32, signed: bool) -> Option<Self> {
        let ty = match (bits, signed) {
            (8, true) => IntType::I8,
            (16, true) => IntType::I16,
            (32, true) => IntType::I32,
            (64, true) => IntType::I64,
            (128, true) => IntType::I128,
            (256, true) => IntType::I256,
            (8, false) => IntType::U8,
            (16, false) => IntType::U16,
            (32, false) => IntType::U32,
            (64, false) => IntType::U64,
            (128, false) => IntType::U128,
            (256, false) => IntType::U256,
            _ => return None,
        };
        Some(ty)
    }

    /// 2^W.
    pub fn modulus(self) -> BigInt {
        BigInt::one() << self.bits()
    }

    pub fn min(self) -> BigInt {
        if self.is_signed() {
            -(BigInt::one() << (self.bits() - 1))
        } else {
            BigInt::zero()
        }
    }

    pub fn max(self) -> BigInt {
        if self.is_signed() {
            (BigInt::one() << (self.bits() - 1)) - BigInt::one()
        } else {
            self.modulus() - BigInt::one()
        }
    }

    pub fn contains(self, value: &BigInt) -> bool {
        *value >= self.min() && *value <= self.max()
    }

    /// Reduce an unbounded integer into this type's range.
    ///
    /// The value is reduced modulo 2^W into `[0, 2^W)`; for signed types a
    /// result at or above 2^(W-1) is reinterpreted as negative by
    /// subtracting 2^W.
    pub fn wrap(self, value: &BigInt) -> BigInt {
        if self.contains(value) {
            return value.clone();
        }
        let modulus = self.modulus();
        let mut reduced = value % &modulus;
        if reduced < BigInt::zero() {
            reduced += &modulus;
        }
        if self.is_signed() && reduced >= (&modulus >> 1) {
            reduced - modulus
        } else {
            reduced
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

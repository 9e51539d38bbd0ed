//! Fixed-width little-endian integers as they appear on disk
//!
//! The wrappers are plain byte arrays, so they have an alignment of 1 and can
//! be embedded in the packed on-disk structs without padding. Reading and
//! writing goes through `get`/`set`, which always use little-endian order
//! regardless of the host.
use core::fmt;

use bytemuck::{Pod, Zeroable};

macro_rules! le_int {
    ($name:ident, $int:ty, $size:expr) => {
        #[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name([u8; $size]);

        impl $name {
            pub const fn new(value: $int) -> $name {
                $name(value.to_le_bytes())
            }

            pub const fn get(self) -> $int {
                <$int>::from_le_bytes(self.0)
            }

            pub fn set(&mut self, value: $int) {
                self.0 = value.to_le_bytes();
            }

            pub const fn to_bytes(self) -> [u8; $size] {
                self.0
            }
        }

        impl From<$int> for $name {
            fn from(value: $int) -> $name {
                $name::new(value)
            }
        }

        impl From<$name> for $int {
            fn from(value: $name) -> $int {
                value.get()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.get(), f)
            }
        }
    };
}

le_int!(Le32, u32, 4);
le_int!(Le64, u64, 8);

#[cfg(test)]
mod tests {
    use core::mem;

    use super::{Le32, Le64};

    #[test]
    fn byte_order_is_little_endian() {
        assert_eq!(Le32::new(0x0403_0201).to_bytes(), [1, 2, 3, 4]);
        assert_eq!(
            Le64::new(0x267052A0B125277D).to_bytes(),
            [0x7D, 0x27, 0x25, 0xB1, 0xA0, 0x52, 0x70, 0x26]
        );
    }

    #[test]
    fn set_overwrites_every_byte() {
        let mut field = Le32::new(u32::MAX);
        field.set(7);
        assert_eq!(field.to_bytes(), [7, 0, 0, 0]);
        assert_eq!(u32::from(field), 7);
    }

    #[test]
    fn unaligned() {
        assert_eq!(mem::align_of::<Le32>(), 1);
        assert_eq!(mem::align_of::<Le64>(), 1);

        let raw = [0xffu8, 0x10, 0, 0, 0];
        let field: &Le32 = bytemuck::from_bytes(&raw[1..]);
        assert_eq!(field.get(), 0x10);
    }
}

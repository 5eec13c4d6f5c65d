//! Byte-order normalisation for the scalar types stored in SAGE files.
//!
//! A SAGE file is written in the byte order of the machine that ran the
//! model. Every scalar is read in host order first and then reversed when the
//! session's swap flag says the file came from a machine of the other
//! endianness. Swapping is an involution: applying it twice returns the
//! original bit pattern, for floats as well as integers.

use byteorder::{ByteOrder, NativeEndian};

// The on-disk layout assumes 4-byte ints/floats and 8-byte longs.
const _: () = assert!(std::mem::size_of::<i32>() == 4);
const _: () = assert!(std::mem::size_of::<f32>() == 4);
const _: () = assert!(std::mem::size_of::<i64>() == 8);

/// A fixed-width value that can appear in a SAGE record.
pub trait Scalar: Copy {
    /// Width on disk, in bytes.
    const BYTES: usize;

    /// Reads the value in host byte order from the start of `buf`.
    fn read_native(buf: &[u8]) -> Self;

    /// Writes the value in host byte order to the start of `buf`.
    fn write_native(self, buf: &mut [u8]);

    /// Returns the value with its byte order reversed.
    fn swapped(self) -> Self;

    /// Reverses the byte order only when `swap` is set.
    #[inline]
    fn swap_if(self, swap: bool) -> Self {
        if swap {
            self.swapped()
        } else {
            self
        }
    }
}

impl Scalar for i16 {
    const BYTES: usize = 2;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_i16(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_i16(buf, self)
    }

    #[inline]
    fn swapped(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for i32 {
    const BYTES: usize = 4;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_i32(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_i32(buf, self)
    }

    #[inline]
    fn swapped(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for i64 {
    const BYTES: usize = 8;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_i64(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_i64(buf, self)
    }

    #[inline]
    fn swapped(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for f32 {
    const BYTES: usize = 4;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_f32(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_f32(buf, self)
    }

    // Swap the bit pattern, never the numeric value, so NaN payloads survive.
    #[inline]
    fn swapped(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl Scalar for [f32; 3] {
    const BYTES: usize = 3 * f32::BYTES;

    fn read_native(buf: &[u8]) -> Self {
        [
            f32::read_native(&buf[0..4]),
            f32::read_native(&buf[4..8]),
            f32::read_native(&buf[8..12]),
        ]
    }

    fn write_native(self, buf: &mut [u8]) {
        for (i, v) in self.into_iter().enumerate() {
            v.write_native(&mut buf[i * 4..]);
        }
    }

    fn swapped(self) -> Self {
        self.map(|v| v.swapped())
    }
}

/// Reverses a 4-byte value when `swap` is set, otherwise returns it unchanged.
#[inline]
pub fn swap32(x: u32, swap: bool) -> u32 {
    x.swap_if(swap)
}

/// Reverses an 8-byte value when `swap` is set, otherwise returns it unchanged.
#[inline]
pub fn swap64(x: u64, swap: bool) -> u64 {
    x.swap_if(swap)
}

impl Scalar for u32 {
    const BYTES: usize = 4;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_u32(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_u32(buf, self)
    }

    #[inline]
    fn swapped(self) -> Self {
        self.swap_bytes()
    }
}

impl Scalar for u64 {
    const BYTES: usize = 8;

    #[inline]
    fn read_native(buf: &[u8]) -> Self {
        NativeEndian::read_u64(buf)
    }

    #[inline]
    fn write_native(self, buf: &mut [u8]) {
        NativeEndian::write_u64(buf, self)
    }

    #[inline]
    fn swapped(self) -> Self {
        self.swap_bytes()
    }
}

/// Returns the swap flag needed on this host to read a file written in the
/// given byte order.
pub const fn needs_swap(file_is_big_endian: bool) -> bool {
    file_is_big_endian == cfg!(target_endian = "little")
}

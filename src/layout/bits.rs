//! Bit-level helpers shared by blobs and bit-field arrays.

/// Number of bits needed to represent `value` (0 needs 0 bits).
pub fn required_bits(value: u64) -> u32 {
	u64::BITS - value.leading_zeros()
}

/// Append the low `width` bits of `value`, least-significant first.
pub fn push_bits_lsb(value: u64, width: u32, out: &mut Vec<bool>) {
	for shift in 0..width {
		out.push(shift < u64::BITS && (value >> shift) & 1 == 1);
	}
}

/// Pack bits into bytes; bit `i` of byte `n` is `bits[8 * n + i]`.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
	bits.chunks(8)
		.map(|chunk| {
			chunk
				.iter()
				.enumerate()
				.fold(0_u8, |byte, (idx, bit)| if *bit { byte | (1 << idx) } else { byte })
		})
		.collect()
}

/// Expand bytes into bits, least-significant bit of each byte first.
pub fn unpack_bits(bytes: &[u8]) -> Vec<bool> {
	let mut out = Vec::with_capacity(bytes.len() * 8);
	for byte in bytes {
		push_bits_lsb(u64::from(*byte), 8, &mut out);
	}
	out
}

/// Mixes a 32-bit integer into a well-distributed 32-bit hash.
///
/// Slots are selected by masking the low bits of the hash, so the mix has to
/// push entropy from every input bit down into the low bits. Raw integer
/// keys are the worst case for masked indexing: sequential ids, timestamps,
/// or values sharing a stride collapse onto a handful of slots if the value
/// is used directly. Three rounds of xor-shift-right and odd-constant
/// multiplication (the `triple32` finalizer constants), followed by a final
/// xorshift, give full avalanche: flipping any input bit flips roughly half
/// of the output bits.
///
/// The function is a bijection on the 32-bit space, deterministic, and
/// unseeded. Equal values mix identically in every set instance and every
/// run, which is what makes table layouts reproducible.
///
/// Negative values are reinterpreted as their two's-complement bit pattern.
/// Folding through `abs` instead would misbehave on `i32::MIN`, which has no
/// positive counterpart.
#[inline(always)]
pub(crate) fn mix(value: i32) -> u32 {
    let mut x = value as u32;
    x ^= x >> 17;
    x = x.wrapping_mul(0xed5a_d4bb);
    x ^= x >> 11;
    x = x.wrapping_mul(0xac4c_1b51);
    x ^= x >> 15;
    x = x.wrapping_mul(0x3184_8bab);
    x ^= x >> 14;
    x
}

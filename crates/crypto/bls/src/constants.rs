/// Domain separation tag for the hash-to-curve used by signing and
/// verification, per the BLS ciphersuite for min-pubkey-size (48-byte
/// public keys, 96-byte signatures).
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

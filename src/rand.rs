// certval-rs: X.509 certificate path validation and revocation checking
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use rand::RngCore;
use rand_chacha::rand_core::SeedableRng;

/// generate creates an arbitrarily large buffer filled with randomness. Under
/// the hood it retrieves a 32-byte random seed from the OS and expands it via
/// ChaCha20.
pub fn generate(bytes: usize) -> Vec<u8> {
    // Create a random number stream that works in WASM
    let mut seed = [0u8; 32];
    getrandom::fill(&mut seed).expect("Failed to get random seed");
    let mut rng = rand_chacha::ChaCha20Rng::from_seed(seed);

    // Generate a random buffer filled with safe random numbers
    let mut buf = vec![0u8; bytes];
    rng.fill_bytes(&mut buf[..]);
    buf
}

/// Length of the nonce carried in OCSP requests (RFC 8954 allows 1..=32).
pub const NONCE_SIZE: usize = 16;

/// Generates a fresh OCSP request nonce.
pub fn nonce() -> Vec<u8> {
    generate(NONCE_SIZE)
}

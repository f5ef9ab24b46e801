// Copyright 2024 - See NOTICE file for copyright holders.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Off-chain signer used by the tests: an Ethereum key that signs update
//! fingerprints the way a wallet's `eth_sign` does.

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::thread_rng;
use sha3::{Digest, Keccak256};
use soroban_sdk::{BytesN, Env};

pub struct EthSigner {
    skey: SigningKey,
    addr: [u8; 20],
}

fn eth_address(key: &VerifyingKey) -> [u8; 20] {
    // Skip the 0x04 tag of the uncompressed point.
    let point = key.to_encoded_point(false);
    let hash: [u8; 32] = Keccak256::digest(&point.as_bytes()[1..]).into();
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    addr
}

fn eth_signed_msg_hash(fingerprint: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n32");
    hasher.update(fingerprint);
    hasher.finalize().into()
}

impl EthSigner {
    pub fn random() -> Self {
        let skey = SigningKey::random(&mut thread_rng());
        let addr = eth_address(skey.verifying_key());
        Self { skey, addr }
    }

    pub fn address(&self, env: &Env) -> BytesN<20> {
        BytesN::from_array(env, &self.addr)
    }

    /// Signs `fingerprint` and returns `r || s || v` with `v = 27 + recovery id`.
    pub fn sign(&self, env: &Env, fingerprint: &BytesN<32>) -> BytesN<65> {
        let hash = eth_signed_msg_hash(&fingerprint.to_array());
        let (sig, rec_id) = self
            .skey
            .sign_prehash_recoverable(&hash)
            .expect("signing a 32 byte prehash");

        let mut sig_bytes = [0u8; 65];
        sig_bytes[..64].copy_from_slice(&sig.to_bytes());
        sig_bytes[64] = rec_id.to_byte() + 27;
        BytesN::from_array(env, &sig_bytes)
    }
}

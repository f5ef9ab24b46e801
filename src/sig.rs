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

//! Balance update fingerprints and recoverable secp256k1 signatures.
//!
//! The fingerprint is `keccak256(abi.encodePacked(bytes32 channelId,
//! uint256 nonce, uint256 balanceA, uint256 balanceB))`. Parties sign it as
//! an Ethereum signed message, so any Ethereum wallet can produce a valid
//! `r || s || v` signature for an update.

use crate::Error;
use alloy_primitives::{B256, U256};
use alloy_sol_types::SolValue;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use soroban_sdk::{Bytes, BytesN, Env};

const ETH_SIGNED_PREFIX: &[u8; 28] = b"\x19Ethereum Signed Message:\n32";

pub fn fingerprint(
    env: &Env,
    channel_id: &BytesN<32>,
    nonce: u64,
    balance_a: i128,
    balance_b: i128,
) -> Result<BytesN<32>, Error> {
    let bal_a = u128::try_from(balance_a).map_err(|_| Error::InvalidAmount)?;
    let bal_b = u128::try_from(balance_b).map_err(|_| Error::InvalidAmount)?;
    let packed = (
        B256::from(channel_id.to_array()),
        U256::from(nonce),
        U256::from(bal_a),
        U256::from(bal_b),
    )
        .abi_encode_packed();
    Ok(env.crypto().keccak256(&Bytes::from_slice(env, &packed)))
}

// eth_signed_digest applies the Ethereum signed message prefix to a fingerprint.
fn eth_signed_digest(env: &Env, fingerprint: &BytesN<32>) -> BytesN<32> {
    let mut msg = [0u8; 60];
    msg[..28].copy_from_slice(ETH_SIGNED_PREFIX);
    msg[28..].copy_from_slice(&fingerprint.to_array());
    env.crypto().keccak256(&Bytes::from_slice(env, &msg))
}

/// Recovers the Ethereum address that produced `sig` over `digest`. Returns
/// `None` for anything that is not a valid low-s signature with a known `v`:
/// zero or out of range `r`/`s`, an `r` with no point on the curve, or an `s`
/// in the upper half of the group order.
pub fn recover_signer(env: &Env, digest: &BytesN<32>, sig: &BytesN<65>) -> Option<BytesN<20>> {
    let raw = sig.to_array();
    let recovery_id = match raw[64] {
        27 | 28 => raw[64] - 27,
        0 | 1 => raw[64],
        _ => return None,
    };
    let recovery_id = RecoveryId::from_byte(recovery_id)?;
    let signature = Signature::from_slice(&raw[..64]).ok()?;
    if signature.normalize_s().is_some() {
        return None;
    }
    let key =
        VerifyingKey::recover_from_prehash(&digest.to_array(), &signature, recovery_id).ok()?;

    // The first byte tags the uncompressed encoding and is not hashed.
    let point = key.to_encoded_point(false);
    let hash = env
        .crypto()
        .keccak256(&Bytes::from_slice(env, &point.as_bytes()[1..]));
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.to_array()[12..]);
    Some(BytesN::from_array(env, &addr))
}

/// Checks the required signatures over `fingerprint` against the expected
/// signers. At least one signature must be required.
pub fn verify_dual(
    env: &Env,
    fingerprint: &BytesN<32>,
    sig_a: &BytesN<65>,
    sig_b: &BytesN<65>,
    require_a: bool,
    require_b: bool,
    signer_a: &BytesN<20>,
    signer_b: &BytesN<20>,
) -> bool {
    if !require_a && !require_b {
        return false;
    }
    let digest = eth_signed_digest(env, fingerprint);
    let signed_by = |sig: &BytesN<65>, expected: &BytesN<20>| {
        recover_signer(env, &digest, sig).map_or(false, |signer| signer == *expected)
    };
    (!require_a || signed_by(sig_a, signer_a)) && (!require_b || signed_by(sig_b, signer_b))
}

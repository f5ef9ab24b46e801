// Copyright 2023 - See NOTICE file for copyright holders.
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

use crate::{Channel, Error, Status};
use soroban_sdk::BytesN;

// join records the counterparty's deposit on an open channel. The signer
// party B confirms must be the one party A named at open.
pub fn join(channel: &mut Channel, signer: &BytesN<20>, amount: i128) -> Result<(), Error> {
    if channel.status != Status::Open {
        return Err(Error::InvalidState);
    }
    if channel.party_b.signer != *signer {
        return Err(Error::InvalidActor);
    }
    if amount < 0 {
        return Err(Error::InvalidAmount);
    }
    channel.deposit_b = amount;
    channel.balance_b = amount;
    channel.status = Status::Joined;
    Ok(())
}

pub fn accepts_updates(channel: &Channel) -> bool {
    matches!(channel.status, Status::Joined | Status::Challenge)
}

// check_update validates everything about an update except its signatures.
pub fn check_update(
    channel: &Channel,
    nonce: u64,
    balance_a: i128,
    balance_b: i128,
) -> Result<(), Error> {
    if !accepts_updates(channel) {
        return Err(Error::InvalidState);
    }
    if nonce <= channel.nonce {
        return Err(Error::StaleNonce);
    }
    if balance_a < 0 || balance_b < 0 {
        return Err(Error::ConservationViolation);
    }
    let total = channel
        .deposit_a
        .checked_add(channel.deposit_b)
        .ok_or(Error::Overflow)?;
    match balance_a.checked_add(balance_b) {
        Some(sum) if sum == total => Ok(()),
        _ => Err(Error::ConservationViolation),
    }
}

// apply_update must only be called after check_update and signature
// verification succeeded. The status, including an open challenge, is kept.
pub fn apply_update(channel: &mut Channel, nonce: u64, balance_a: i128, balance_b: i128) {
    channel.nonce = nonce;
    channel.balance_a = balance_a;
    channel.balance_b = balance_b;
}

// abort closes a channel that was never joined and returns the refund owed
// to party A.
pub fn abort(channel: &mut Channel) -> Result<i128, Error> {
    if channel.status != Status::Open {
        return Err(Error::InvalidState);
    }
    channel.status = Status::Closed;
    Ok(channel.deposit_a)
}

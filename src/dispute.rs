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

//! Unilateral challenge and settlement.
//!
//! Expiry is evaluated lazily against the `now` handed in by the caller; there
//! is no timer. Updates submitted during a challenge do not move the deadline,
//! so a channel settles at most `challenge_period` after the challenge starts.

use crate::{Challenger, Channel, Error, Status};
use soroban_sdk::Address;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Payout {
    pub to_a: i128,
    pub to_b: i128,
}

// start_challenge moves a joined channel into its challenge window and returns
// the deadline.
pub fn start_challenge(channel: &mut Channel, caller: &Address, now: u64) -> Result<u64, Error> {
    if channel.status != Status::Joined {
        return Err(Error::InvalidState);
    }
    if *caller != channel.party_a.addr && *caller != channel.party_b.addr {
        return Err(Error::InvalidActor);
    }
    let close_time = now
        .checked_add(channel.challenge_period)
        .ok_or(Error::Overflow)?;

    channel.status = Status::Challenge;
    channel.close_time = close_time;
    channel.challenge_started_by = Challenger::Party(caller.clone());
    Ok(close_time)
}

pub fn is_challenge_elapsed(channel: &Channel, now: u64) -> bool {
    channel.status == Status::Challenge && channel.close_time <= now
}

// settle closes a channel whose challenge window has elapsed and returns what
// each party is owed. A channel that is already closed yields no payout.
pub fn settle(channel: &mut Channel, now: u64) -> Result<Option<Payout>, Error> {
    match channel.status {
        Status::Closed => return Ok(None),
        Status::Challenge => {}
        Status::Open | Status::Joined => return Err(Error::InvalidState),
    }
    if !is_challenge_elapsed(channel, now) {
        return Err(Error::ChallengeNotElapsed);
    }
    channel.status = Status::Closed;
    Ok(Some(Payout {
        to_a: channel.balance_a,
        to_b: channel.balance_b,
    }))
}

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

#![no_std]
extern crate alloc;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, symbol_short, Address, BytesN, Env,
    Symbol,
};

pub mod custody;
pub mod dispute;
pub mod engine;
pub mod registry;
pub mod sig;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    DuplicateChannel = 1,
    ChannelNotFound = 2,
    InvalidState = 3,
    StaleNonce = 4,
    ConservationViolation = 5,
    InvalidSignature = 6,
    ChallengeNotElapsed = 7,
    InsufficientFunds = 8,
    InsufficientAllowance = 9,
    InvalidActor = 10,
    InvalidAmount = 11,
    PayoutFailed = 12,
    Overflow = 13,
    NotInitialized = 14,
    AlreadyInitialized = 15,
    CustodyFailed = 16,
}

/// Asset held by a channel. `Native` resolves to the native asset contract
/// configured through `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Asset {
    Native,
    Token(Address),
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Status {
    Open = 0,
    Joined = 1,
    Challenge = 2,
    Closed = 3,
}

/// The party that opened the running challenge, if any.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Challenger {
    Nobody,
    Party(Address),
}

/// A channel party: the account that funds and receives payouts, and the
/// Ethereum-style address of the key that co-signs balance updates.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Participant {
    pub addr: Address,
    pub signer: BytesN<20>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Channel {
    pub party_a: Participant,
    pub party_b: Participant,
    pub asset: Asset,
    pub deposit_a: i128,
    pub deposit_b: i128,
    pub status: Status,
    pub challenge_period: u64,
    pub nonce: u64,
    pub balance_a: i128,
    pub balance_b: i128,
    pub close_time: u64,
    pub challenge_started_by: Challenger,
}

#[contract]
pub struct ChannelManager;

const CHANNEL: Symbol = symbol_short!("channel");

#[contractimpl]
impl ChannelManager {
    /// Configures the native asset contract. The admin authorizes the call
    /// and is recorded next to it.
    pub fn init(env: Env, admin: Address, native: Address) -> Result<(), Error> {
        admin.require_auth();
        registry::set_config(&env, &admin, &native)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        registry::admin(&env)
    }

    pub fn native_asset(env: Env) -> Result<Address, Error> {
        registry::native(&env)
    }

    /// Opens a channel funded by `party_a` with `amount` of `asset`. The
    /// counterparty joins later through `join`.
    pub fn open(
        env: Env,
        party_a: Participant,
        party_b: Participant,
        asset: Asset,
        amount: i128,
        challenge_period: u64,
    ) -> Result<BytesN<32>, Error> {
        // checks
        if party_a.addr == party_b.addr {
            return Err(Error::InvalidActor);
        }
        if amount < 0 {
            return Err(Error::InvalidAmount);
        }
        let channel_id = registry::identity(&env, &party_a.addr, &party_b.addr, &asset);
        registry::ensure_vacant(&env, &channel_id)?;
        party_a.addr.require_auth();

        // interact
        custody::pull(&env, &asset, &party_a.addr, amount)?;

        // effects
        let channel = make_channel(party_a, party_b, asset, amount, challenge_period);
        registry::store(&env, &channel_id, &channel);
        log!(&env, "channel opened", channel_id, amount);
        env.events()
            .publish((CHANNEL, symbol_short!("open")), (channel_id.clone(), channel));
        Ok(channel_id)
    }

    /// Funds the counterparty side. `signer` is the key party B will co-sign
    /// updates with; it must match the one named at open.
    pub fn join(
        env: Env,
        channel_id: BytesN<32>,
        signer: BytesN<20>,
        amount: i128,
    ) -> Result<(), Error> {
        // checks
        let mut channel = registry::lookup(&env, &channel_id)?;
        engine::join(&mut channel, &signer, amount)?;
        channel.party_b.addr.require_auth();

        // interact
        custody::pull(&env, &channel.asset, &channel.party_b.addr, amount)?;

        // effects
        registry::store(&env, &channel_id, &channel);
        env.events()
            .publish((CHANNEL, symbol_short!("join")), (channel_id, amount));
        Ok(())
    }

    /// Applies a co-signed balance update. Anyone may submit it; the two
    /// signatures are the authorization.
    pub fn submit_update(
        env: Env,
        channel_id: BytesN<32>,
        nonce: u64,
        balance_a: i128,
        balance_b: i128,
        sig_a: BytesN<65>,
        sig_b: BytesN<65>,
    ) -> Result<(), Error> {
        // checks
        let mut channel = registry::lookup(&env, &channel_id)?;
        let signed = validate_update(
            &env,
            &channel,
            &channel_id,
            nonce,
            balance_a,
            balance_b,
            (&sig_a, true),
            (&sig_b, true),
        )?;
        if !signed {
            log!(&env, "rejected update with bad signature", channel_id, nonce);
            return Err(Error::InvalidSignature);
        }

        // effects
        engine::apply_update(&mut channel, nonce, balance_a, balance_b);
        registry::store(&env, &channel_id, &channel);
        env.events().publish(
            (CHANNEL, symbol_short!("update")),
            (channel_id, nonce, balance_a, balance_b),
        );
        Ok(())
    }

    /// Read-only pre-check of an update. Status, nonce and conservation
    /// failures are returned as errors; a signature mismatch yields `false`.
    pub fn is_valid_state_update(
        env: Env,
        channel_id: BytesN<32>,
        nonce: u64,
        balance_a: i128,
        balance_b: i128,
        sig_a: BytesN<65>,
        sig_b: BytesN<65>,
        require_a: bool,
        require_b: bool,
    ) -> Result<bool, Error> {
        let channel = registry::lookup(&env, &channel_id)?;
        validate_update(
            &env,
            &channel,
            &channel_id,
            nonce,
            balance_a,
            balance_b,
            (&sig_a, require_a),
            (&sig_b, require_b),
        )
    }

    pub fn start_challenge(env: Env, channel_id: BytesN<32>, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let mut channel = registry::lookup(&env, &channel_id)?;
        let close_time = dispute::start_challenge(&mut channel, &caller, env.ledger().timestamp())?;

        registry::store(&env, &channel_id, &channel);
        log!(&env, "challenge started", channel_id, close_time);
        env.events().publish(
            (CHANNEL, symbol_short!("challenge")),
            (channel_id, caller, close_time),
        );
        Ok(())
    }

    /// Settles a channel whose challenge window has elapsed. Calling it on a
    /// channel that is already closed is a no-op.
    pub fn close_channel(env: Env, channel_id: BytesN<32>) -> Result<(), Error> {
        // checks
        let mut channel = registry::lookup(&env, &channel_id)?;
        let payout = match dispute::settle(&mut channel, env.ledger().timestamp())? {
            Some(payout) => payout,
            None => return Ok(()),
        };

        // effects
        registry::store(&env, &channel_id, &channel);

        // interact
        // A failed payout returns an error and the host discards the status
        // flip together with any transfer already made.
        custody::push(&env, &channel.asset, &channel.party_a.addr, payout.to_a)?;
        custody::push(&env, &channel.asset, &channel.party_b.addr, payout.to_b)?;

        log!(&env, "channel closed", channel_id, payout.to_a, payout.to_b);
        env.events().publish(
            (CHANNEL, symbol_short!("close")),
            (channel_id, payout.to_a, payout.to_b),
        );
        Ok(())
    }

    /// Returns the initiator's deposit on a channel that was never joined.
    pub fn abort(env: Env, channel_id: BytesN<32>) -> Result<(), Error> {
        // checks
        let mut channel = registry::lookup(&env, &channel_id)?;
        let refund = engine::abort(&mut channel)?;
        channel.party_a.addr.require_auth();

        // effects
        registry::store(&env, &channel_id, &channel);

        // interact
        custody::push(&env, &channel.asset, &channel.party_a.addr, refund)?;

        env.events()
            .publish((CHANNEL, symbol_short!("abort")), (channel_id, refund));
        Ok(())
    }

    pub fn get_channel(env: Env, channel_id: BytesN<32>) -> Result<Channel, Error> {
        registry::lookup(&env, &channel_id)
    }

    pub fn channel_id(env: Env, party_a: Address, party_b: Address, asset: Asset) -> BytesN<32> {
        registry::identity(&env, &party_a, &party_b, &asset)
    }
}

// make_channel builds the record of a freshly opened, not yet joined channel.
pub fn make_channel(
    party_a: Participant,
    party_b: Participant,
    asset: Asset,
    deposit: i128,
    challenge_period: u64,
) -> Channel {
    Channel {
        party_a,
        party_b,
        asset,
        deposit_a: deposit,
        deposit_b: 0,
        status: Status::Open,
        challenge_period,
        nonce: 0,
        balance_a: deposit,
        balance_b: 0,
        close_time: 0,
        challenge_started_by: Challenger::Nobody,
    }
}

// validate_update runs the status, nonce and conservation checks and then the
// signature check, which reports a mismatch as `false`.
fn validate_update(
    env: &Env,
    channel: &Channel,
    channel_id: &BytesN<32>,
    nonce: u64,
    balance_a: i128,
    balance_b: i128,
    (sig_a, require_a): (&BytesN<65>, bool),
    (sig_b, require_b): (&BytesN<65>, bool),
) -> Result<bool, Error> {
    engine::check_update(channel, nonce, balance_a, balance_b)?;
    let fingerprint = sig::fingerprint(env, channel_id, nonce, balance_a, balance_b)?;
    Ok(sig::verify_dual(
        env,
        &fingerprint,
        sig_a,
        sig_b,
        require_a,
        require_b,
        &channel.party_a.signer,
        &channel.party_b.signer,
    ))
}

#[cfg(test)]
mod ethsig;

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

//! Channel identity and storage. One record per channel id; a triple is
//! occupied until its channel reaches `Status::Closed`.

use crate::{Asset, Channel, Error, Status};
use soroban_sdk::{contracttype, xdr::ToXdr, Address, BytesN, Env};

const DAY_IN_LEDGERS: u32 = 17280;
const INSTANCE_BUMP: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_THRESHOLD: u32 = INSTANCE_BUMP - DAY_IN_LEDGERS;
const CHANNEL_BUMP: u32 = 30 * DAY_IN_LEDGERS;
const CHANNEL_THRESHOLD: u32 = CHANNEL_BUMP - DAY_IN_LEDGERS;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Admin,
    Native,
    Channel(BytesN<32>),
}

// The hashed preimage of a channel id. Field order is part of the id.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
struct ChannelKey {
    party_a: Address,
    party_b: Address,
    asset: Asset,
}

// identity derives the channel id from the (party_a, party_b, asset) triple.
pub fn identity(env: &Env, party_a: &Address, party_b: &Address, asset: &Asset) -> BytesN<32> {
    let key = ChannelKey {
        party_a: party_a.clone(),
        party_b: party_b.clone(),
        asset: asset.clone(),
    };
    env.crypto().sha256(&key.to_xdr(env))
}

// lookup returns the channel with the given id or an error if it does not exist.
pub fn lookup(env: &Env, channel_id: &BytesN<32>) -> Result<Channel, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Channel(channel_id.clone()))
        .ok_or(Error::ChannelNotFound)
}

// ensure_vacant fails if a channel that is not yet closed occupies the id.
pub fn ensure_vacant(env: &Env, channel_id: &BytesN<32>) -> Result<(), Error> {
    match lookup(env, channel_id) {
        Ok(channel) if channel.status != Status::Closed => Err(Error::DuplicateChannel),
        _ => Ok(()),
    }
}

pub fn store(env: &Env, channel_id: &BytesN<32>, channel: &Channel) {
    let key = DataKey::Channel(channel_id.clone());
    let storage = env.storage().persistent();
    storage.set(&key, channel);
    storage.extend_ttl(&key, CHANNEL_THRESHOLD, CHANNEL_BUMP);
    bump_instance(env);
}

pub fn native(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Native)
        .ok_or(Error::NotInitialized)
}

pub fn admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

// set_config stores the admin and native asset once; the caller has already
// checked the admin's authorization.
pub fn set_config(env: &Env, admin: &Address, native: &Address) -> Result<(), Error> {
    let storage = env.storage().instance();
    if storage.has(&DataKey::Admin) {
        return Err(Error::AlreadyInitialized);
    }
    storage.set(&DataKey::Admin, admin);
    storage.set(&DataKey::Native, native);
    bump_instance(env);
    Ok(())
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_THRESHOLD, INSTANCE_BUMP);
}

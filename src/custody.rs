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

//! Moves channel funds between parties and the contract.
//!
//! Native deposits are transferred on the depositor's own authorization, the
//! way attached value accompanies a call. Token deposits are drawn against an
//! allowance the depositor granted to this contract beforehand.

use crate::{registry, Asset, Error};
use soroban_sdk::{log, token, Address, Env};

fn token_address(env: &Env, asset: &Asset) -> Result<Address, Error> {
    match asset {
        Asset::Native => registry::native(env),
        Asset::Token(address) => Ok(address.clone()),
    }
}

// pull moves `amount` of `asset` from `from` into the contract.
pub fn pull(env: &Env, asset: &Asset, from: &Address, amount: i128) -> Result<(), Error> {
    let token_client = token::Client::new(env, &token_address(env, asset)?);
    if amount == 0 {
        return Ok(());
    }
    let contract = env.current_contract_address();

    if let Asset::Token(_) = asset {
        if token_client.allowance(from, &contract) < amount {
            return Err(Error::InsufficientAllowance);
        }
    }
    if token_client.balance(from) < amount {
        return Err(Error::InsufficientFunds);
    }

    let moved = match asset {
        Asset::Native => token_client.try_transfer(from, &contract, &amount),
        Asset::Token(_) => token_client.try_transfer_from(&contract, from, &contract, &amount),
    };
    // Funds and allowance were checked above, so a failure here comes from
    // the token itself, e.g. a deauthorized holder.
    match moved {
        Ok(Ok(())) => Ok(()),
        _ => {
            log!(env, "deposit transfer failed", from, amount);
            Err(Error::CustodyFailed)
        }
    }
}

// push pays `amount` of `asset` out of the contract to `to`.
pub fn push(env: &Env, asset: &Asset, to: &Address, amount: i128) -> Result<(), Error> {
    if amount == 0 {
        return Ok(());
    }
    let token_client = token::Client::new(env, &token_address(env, asset)?);
    let contract = env.current_contract_address();
    match token_client.try_transfer(&contract, to, &amount) {
        Ok(Ok(())) => Ok(()),
        _ => Err(Error::PayoutFailed),
    }
}

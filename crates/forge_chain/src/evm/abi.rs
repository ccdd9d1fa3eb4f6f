//! Contract interfaces of the token factory and the tokens it deploys.

use serde_json::{Value, json};
use web3::ethabi::{Contract, Event, Function, RawLog, Token};
use web3::types::Address;

use crate::error::{ForgeError, ForgeResult};

/// JSON ABI of the factory contract.
pub fn factory_abi() -> Value {
    json!([
        {
            "type": "function",
            "name": "createToken",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "symbol", "type": "string" },
                { "name": "initialSupply", "type": "uint256" },
                { "name": "maxSupply", "type": "uint256" }
            ],
            "outputs": [{ "name": "", "type": "address" }],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "getTokenCount",
            "inputs": [],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "getCreatorTokens",
            "inputs": [{ "name": "creator", "type": "address" }],
            "outputs": [{ "name": "", "type": "address[]" }],
            "stateMutability": "view"
        },
        {
            "type": "function",
            "name": "getAllTokens",
            "inputs": [],
            "outputs": [{ "name": "", "type": "address[]" }],
            "stateMutability": "view"
        },
        {
            "type": "event",
            "name": "TokenDeployed",
            "inputs": [
                { "name": "tokenAddress", "type": "address", "indexed": true },
                { "name": "name", "type": "string", "indexed": false },
                { "name": "symbol", "type": "string", "indexed": true },
                { "name": "creator", "type": "address", "indexed": true }
            ],
            "anonymous": false
        }
    ])
}

/// JSON ABI of a token deployed by the factory.
pub fn token_abi() -> Value {
    let view = |name: &str, output: &str| {
        json!({
            "type": "function",
            "name": name,
            "inputs": [],
            "outputs": [{ "name": "", "type": output }],
            "stateMutability": "view"
        })
    };
    let transact = |name: &str, inputs: Value| {
        json!({
            "type": "function",
            "name": name,
            "inputs": inputs,
            "outputs": [],
            "stateMutability": "nonpayable"
        })
    };
    json!([
        view("name", "string"),
        view("symbol", "string"),
        view("decimals", "uint8"),
        view("totalSupply", "uint256"),
        view("paused", "bool"),
        {
            "type": "function",
            "name": "balanceOf",
            "inputs": [{ "name": "account", "type": "address" }],
            "outputs": [{ "name": "", "type": "uint256" }],
            "stateMutability": "view"
        },
        transact(
            "mint",
            json!([
                { "name": "to", "type": "address" },
                { "name": "amount", "type": "uint256" }
            ])
        ),
        transact("burn", json!([{ "name": "amount", "type": "uint256" }])),
        transact("pause", json!([])),
        transact("unpause", json!([])),
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                { "name": "from", "type": "address", "indexed": true },
                { "name": "to", "type": "address", "indexed": true },
                { "name": "value", "type": "uint256", "indexed": false }
            ],
            "anonymous": false
        }
    ])
}

/// Parsed factory and token interfaces.
#[derive(Debug, Clone)]
pub struct ForgeAbi {
    pub factory: Contract,
    pub token: Contract,
}

impl ForgeAbi {
    pub fn load() -> ForgeResult<Self> {
        Ok(Self {
            factory: serde_json::from_value(factory_abi())?,
            token: serde_json::from_value(token_abi())?,
        })
    }

    pub fn factory_fn(&self, name: &str) -> ForgeResult<&Function> {
        Ok(self.factory.function(name)?)
    }

    pub fn token_fn(&self, name: &str) -> ForgeResult<&Function> {
        Ok(self.token.function(name)?)
    }

    pub fn token_deployed(&self) -> ForgeResult<&Event> {
        Ok(self.factory.event("TokenDeployed")?)
    }

    /// Token address from the first `TokenDeployed` log in `logs`. Logs from
    /// other events or contracts are skipped.
    pub fn find_deployed_token(&self, logs: &[RawLog]) -> ForgeResult<Option<Address>> {
        let event = self.token_deployed()?;
        let topic = event.signature();
        for raw in logs {
            if raw.topics.first() != Some(&topic) {
                continue;
            }
            let parsed = event.parse_log(raw.clone())?;
            let address = parsed
                .params
                .into_iter()
                .find(|p| p.name == "tokenAddress")
                .and_then(|p| p.value.into_address());
            if address.is_some() {
                return Ok(address);
            }
        }
        Ok(None)
    }
}

/// Decode the single return value of a view call.
pub fn single_output(function: &Function, data: &[u8]) -> ForgeResult<Token> {
    function
        .decode_output(data)?
        .into_iter()
        .next()
        .ok_or_else(|| ForgeError::Abi(format!("{} returned nothing", function.name)))
}

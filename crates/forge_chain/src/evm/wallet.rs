//! EIP-1193 style wallet provider reached over JSON-RPC.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};
use web3::types::{Address, H256};

use crate::error::{ForgeError, ForgeResult};
use crate::network::NetworkDescriptor;
use crate::rpc::{JsonRpc, RpcError, decode_result};
use crate::serde_util::address_hex;

/// Returned by `wallet_switchEthereumChain` when the wallet does not know the
/// requested chain.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// A wallet that holds the signing account and broadcasts transactions on
/// the caller's behalf.
#[derive(Clone)]
pub struct InjectedWallet {
    provider: Arc<dyn JsonRpc>,
}

impl InjectedWallet {
    pub fn new(provider: Arc<dyn JsonRpc>) -> Self {
        Self { provider }
    }

    pub fn endpoint(&self) -> &str {
        self.provider.endpoint()
    }

    pub async fn accounts(&self) -> ForgeResult<Vec<Address>> {
        let value = self.provider.request("eth_accounts", json!([])).await?;
        Ok(decode_result("eth_accounts", value)?)
    }

    /// The first exposed account. No account means no connected wallet.
    pub async fn signer(&self) -> ForgeResult<Address> {
        self.accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ForgeError::WalletNotConnected)
    }

    pub async fn chain_id(&self) -> ForgeResult<u64> {
        let value = self.provider.request("eth_chainId", json!([])).await?;
        let hex: String = decode_result("eth_chainId", value)?;
        parse_quantity(&hex)
    }

    /// Ask the wallet to switch to `network`, registering it first when the
    /// wallet reports the chain as unknown.
    pub async fn switch_network(&self, network: &NetworkDescriptor) -> ForgeResult<()> {
        let params = json!([{ "chainId": network.chain_id_hex() }]);
        match self
            .provider
            .request("wallet_switchEthereumChain", params)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(UNRECOGNIZED_CHAIN) => {
                info!(chain_id = network.chain_id, name = %network.name, "adding network to wallet");
                self.provider
                    .request("wallet_addEthereumChain", json!([network.add_chain_params()]))
                    .await?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Make sure the wallet is on `network`: one switch request, one re-check.
    pub async fn ensure_network(&self, network: &NetworkDescriptor) -> ForgeResult<()> {
        let current = self.chain_id().await?;
        if current == network.chain_id {
            return Ok(());
        }

        info!(from = current, to = network.chain_id, "requesting network switch");
        if let Err(e) = self.switch_network(network).await {
            warn!(chain_id = network.chain_id, error = %e, "network switch failed");
        }

        let actual = self.chain_id().await?;
        if actual != network.chain_id {
            return Err(ForgeError::NetworkMismatch {
                expected: network.chain_id,
                actual,
            });
        }
        Ok(())
    }

    /// Hand a transaction to the wallet for signing and broadcast.
    pub async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> ForgeResult<H256> {
        let tx = json!({
            "from": address_hex(&from),
            "to": address_hex(&to),
            "data": format!("0x{}", hex::encode(data)),
        });
        let value = self
            .provider
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        Ok(decode_result("eth_sendTransaction", value)?)
    }
}

/// Parse a `0x` hex quantity.
pub fn parse_quantity(value: &str) -> ForgeResult<u64> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ForgeError::InvalidResponse(format!("not a hex quantity: {value}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ForgeError::InvalidResponse(format!("bad hex quantity {value}: {e}")))
}

/// Decode `0x` hex call output.
pub fn parse_bytes(value: Value) -> Result<Vec<u8>, RpcError> {
    let text: String = decode_result("eth_call", value)?;
    let digits = text.strip_prefix("0x").unwrap_or(&text);
    hex::decode(digits).map_err(|e| RpcError::InvalidResponse(format!("eth_call: {e}")))
}

//! Token factory client: create tokens through the factory contract and read
//! or manage the tokens it has deployed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use forge_core::ForgeConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use web3::ethabi::{Function, RawLog, Token};
use web3::types::{Address, H256, U256};

use super::abi::{ForgeAbi, single_output};
use super::wallet::{InjectedWallet, parse_bytes};
use crate::error::{ForgeError, ForgeResult};
use crate::forge::{CreatedToken, TokenCreator};
use crate::network::{Chain, NetworkDescriptor, NetworkRegistry};
use crate::request::TokenCreationRequest;
use crate::rpc::{JsonRpc, decode_result};
use crate::serde_util::{self, address_hex};
use crate::validation::{ValidationError, is_valid_evm_address, parse_token_amount};

/// Decimals of every token the factory deploys.
pub const TOKEN_DECIMALS: u8 = 18;

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(value: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::InvalidAddress {
        chain: "EVM",
        address: value.to_string(),
    };
    if !is_valid_evm_address(value) {
        return Err(invalid());
    }
    let bytes = hex::decode(&value[2..]).map_err(|_| invalid())?;
    Ok(Address::from_slice(&bytes))
}

/// Parse a positive decimal amount of whole tokens into base units.
pub fn parse_amount(amount: &str) -> Result<U256, ValidationError> {
    let invalid = || ValidationError::InvalidAmount(amount.to_string());
    let raw = parse_token_amount(amount, TOKEN_DECIMALS).ok_or_else(invalid)?;
    let value = U256::from_dec_str(&raw).map_err(|_| invalid())?;
    if value.is_zero() {
        return Err(invalid());
    }
    Ok(value)
}

/// Whole tokens scaled to base units.
pub fn scale_whole_tokens(value: u128) -> U256 {
    U256::from(value) * U256::exp10(usize::from(TOKEN_DECIMALS))
}

/// Everything the client needs to reach one EVM network.
#[derive(Debug, Clone)]
pub struct EvmClientConfig {
    pub network: NetworkDescriptor,
    pub factory_address: Address,
    /// Earlier factory deployments, read when verifying a creator's tokens.
    pub legacy_factories: Vec<Address>,
    pub poll_interval: Duration,
    pub confirm_timeout: Duration,
}

impl EvmClientConfig {
    pub fn from_config(config: &ForgeConfig, registry: &NetworkRegistry) -> anyhow::Result<Self> {
        let chain: Chain = config.evm_network.parse()?;
        if !chain.is_evm() {
            bail!("{} is not an EVM network", config.evm_network);
        }
        let factory_address = parse_address(&config.factory_address)
            .context("invalid factory_address in config")?;
        if factory_address.is_zero() {
            warn!("factory_address is not configured");
        }
        let legacy_factories = config
            .legacy_factory_addresses
            .iter()
            .map(|a| parse_address(a))
            .collect::<Result<Vec<_>, _>>()
            .context("invalid legacy_factory_addresses in config")?;

        Ok(Self {
            network: registry.descriptor(chain),
            factory_address,
            legacy_factories,
            poll_interval: config.confirm_poll_interval(),
            confirm_timeout: config.confirm_timeout(),
        })
    }
}

/// Read model of a deployed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(serialize_with = "serde_util::address")]
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(serialize_with = "serde_util::display")]
    pub total_supply: U256,
    #[serde(serialize_with = "serde_util::address_opt")]
    pub creator: Option<Address>,
    #[serde(serialize_with = "serde_util::display_opt")]
    pub balance: Option<U256>,
    pub paused: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvmToken {
    #[serde(serialize_with = "serde_util::hash")]
    pub transaction_hash: H256,
    #[serde(serialize_with = "serde_util::address")]
    pub token_address: Address,
    #[serde(serialize_with = "serde_util::address")]
    pub creator: Address,
}

#[derive(Debug, Deserialize)]
struct Receipt {
    status: Option<String>,
    #[serde(default)]
    logs: Vec<ReceiptLog>,
}

#[derive(Debug, Deserialize)]
struct ReceiptLog {
    address: Address,
    topics: Vec<H256>,
    data: String,
}

impl ReceiptLog {
    fn into_raw(self) -> ForgeResult<RawLog> {
        let digits = self.data.strip_prefix("0x").unwrap_or(&self.data);
        let data = hex::decode(digits)
            .map_err(|e| ForgeError::InvalidResponse(format!("log data: {e}")))?;
        Ok(RawLog {
            topics: self.topics,
            data,
        })
    }
}

/// Factory and token operations. Writes go through the wallet; reads go
/// straight to the network RPC.
pub struct EvmTokenClient {
    wallet: InjectedWallet,
    reader: Arc<dyn JsonRpc>,
    config: EvmClientConfig,
    abi: ForgeAbi,
}

impl EvmTokenClient {
    pub fn new(
        wallet: InjectedWallet,
        reader: Arc<dyn JsonRpc>,
        config: EvmClientConfig,
    ) -> ForgeResult<Self> {
        Ok(Self {
            wallet,
            reader,
            config,
            abi: ForgeAbi::load()?,
        })
    }

    pub fn config(&self) -> &EvmClientConfig {
        &self.config
    }

    pub fn wallet(&self) -> &InjectedWallet {
        &self.wallet
    }

    /// Deploy a token through the factory. Supplies are whole tokens; a
    /// missing cap is sent as zero (uncapped).
    pub async fn create_token(
        &self,
        request: &TokenCreationRequest,
    ) -> ForgeResult<CreatedEvmToken> {
        request.validate()?;
        let data = self.abi.factory_fn("createToken")?.encode_input(&[
            Token::String(request.name.clone()),
            Token::String(request.symbol.clone()),
            Token::Uint(scale_whole_tokens(request.initial_supply)),
            Token::Uint(scale_whole_tokens(request.effective_max_supply().unwrap_or(0))),
        ])?;

        let creator = self.wallet.signer().await?;
        self.wallet.ensure_network(&self.config.network).await?;
        let hash = self
            .wallet
            .send_transaction(creator, self.config.factory_address, &data)
            .await?;
        info!(hash = %format!("{hash:#x}"), symbol = %request.symbol, "createToken sent");

        let receipt = self.wait_for_receipt(hash).await?;
        let logs = receipt
            .logs
            .into_iter()
            .filter(|log| log.address == self.config.factory_address)
            .map(ReceiptLog::into_raw)
            .collect::<ForgeResult<Vec<_>>>()?;
        let token_address = self.abi.find_deployed_token(&logs)?.ok_or_else(|| {
            ForgeError::InvalidResponse(format!(
                "no TokenDeployed event in receipt of {hash:#x}"
            ))
        })?;

        info!(
            hash = %format!("{hash:#x}"),
            token = %address_hex(&token_address),
            creator = %address_hex(&creator),
            "token deployed"
        );
        Ok(CreatedEvmToken {
            transaction_hash: hash,
            token_address,
            creator,
        })
    }

    /// Mint `amount` whole tokens to `to`.
    pub async fn mint_tokens(
        &self,
        token: Address,
        to: Address,
        amount: &str,
    ) -> ForgeResult<H256> {
        let amount = parse_amount(amount)?;
        self.transact(token, "mint", &[Token::Address(to), Token::Uint(amount)])
            .await
    }

    /// Burn `amount` whole tokens from the signer's balance.
    pub async fn burn_tokens(&self, token: Address, amount: &str) -> ForgeResult<H256> {
        let amount = parse_amount(amount)?;
        self.transact(token, "burn", &[Token::Uint(amount)]).await
    }

    pub async fn pause(&self, token: Address) -> ForgeResult<H256> {
        self.transact(token, "pause", &[]).await
    }

    pub async fn unpause(&self, token: Address) -> ForgeResult<H256> {
        self.transact(token, "unpause", &[]).await
    }

    async fn transact(&self, token: Address, method: &str, args: &[Token]) -> ForgeResult<H256> {
        let data = self.abi.token_fn(method)?.encode_input(args)?;
        let from = self.wallet.signer().await?;
        self.wallet.ensure_network(&self.config.network).await?;
        let hash = self.wallet.send_transaction(from, token, &data).await?;
        self.wait_for_receipt(hash).await?;
        info!(
            hash = %format!("{hash:#x}"),
            token = %address_hex(&token),
            method,
            "token call confirmed"
        );
        Ok(hash)
    }

    /// Poll for the receipt until it appears or the timeout passes. A
    /// reverted receipt is a failure.
    async fn wait_for_receipt(&self, hash: H256) -> ForgeResult<Receipt> {
        let reference = format!("{hash:#x}");
        let deadline = tokio::time::Instant::now() + self.config.confirm_timeout;
        loop {
            let value = self
                .reader
                .request("eth_getTransactionReceipt", json!([reference]))
                .await?;
            if !value.is_null() {
                let receipt: Receipt = decode_result("eth_getTransactionReceipt", value)?;
                if receipt.status.as_deref() == Some("0x0") {
                    return Err(ForgeError::TransactionFailed {
                        reference,
                        reason: "execution reverted".into(),
                    });
                }
                return Ok(receipt);
            }
            if tokio::time::Instant::now() + self.config.poll_interval >= deadline {
                return Err(ForgeError::ConfirmationTimeout {
                    reference,
                    timeout: self.config.confirm_timeout,
                });
            }
            debug!(hash = %reference, "receipt not available yet");
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    async fn call(&self, to: Address, function: &Function, args: &[Token]) -> ForgeResult<Token> {
        let data = function.encode_input(args)?;
        let value = self
            .reader
            .request(
                "eth_call",
                json!([
                    { "to": address_hex(&to), "data": format!("0x{}", hex::encode(data)) },
                    "latest"
                ]),
            )
            .await?;
        single_output(function, &parse_bytes(value)?)
    }

    async fn call_token(
        &self,
        token: Address,
        method: &str,
        args: &[Token],
    ) -> ForgeResult<Token> {
        self.call(token, self.abi.token_fn(method)?, args).await
    }

    async fn call_factory(
        &self,
        factory: Address,
        method: &str,
        args: &[Token],
    ) -> ForgeResult<Token> {
        self.call(factory, self.abi.factory_fn(method)?, args).await
    }

    pub async fn is_paused(&self, token: Address) -> ForgeResult<bool> {
        expect_bool(self.call_token(token, "paused", &[]).await?)
    }

    pub async fn balance_of(&self, token: Address, holder: Address) -> ForgeResult<U256> {
        expect_uint(self.call_token(token, "balanceOf", &[Token::Address(holder)]).await?)
    }

    /// Metadata of `token`, plus `holder`'s balance when one is given. The
    /// pause flag is optional since not every deployment exposes it.
    pub async fn token_info(
        &self,
        token: Address,
        holder: Option<Address>,
    ) -> ForgeResult<TokenInfo> {
        let name = expect_string(self.call_token(token, "name", &[]).await?)?;
        let symbol = expect_string(self.call_token(token, "symbol", &[]).await?)?;
        let decimals =
            decimals_from_uint(expect_uint(self.call_token(token, "decimals", &[]).await?)?)?;
        let total_supply = expect_uint(self.call_token(token, "totalSupply", &[]).await?)?;
        let balance = match holder {
            Some(holder) => Some(self.balance_of(token, holder).await?),
            None => None,
        };
        let paused = match self.is_paused(token).await {
            Ok(paused) => Some(paused),
            Err(e) => {
                debug!(token = %address_hex(&token), error = %e, "paused() unavailable");
                None
            }
        };

        Ok(TokenInfo {
            address: token,
            name,
            symbol,
            decimals,
            total_supply,
            creator: None,
            balance,
            paused,
        })
    }

    pub async fn token_count(&self) -> ForgeResult<U256> {
        expect_uint(
            self.call_factory(self.config.factory_address, "getTokenCount", &[])
                .await?,
        )
    }

    pub async fn all_tokens(&self) -> ForgeResult<Vec<Address>> {
        expect_addresses(
            self.call_factory(self.config.factory_address, "getAllTokens", &[])
                .await?,
        )
    }

    async fn factory_creator_tokens(
        &self,
        factory: Address,
        creator: Address,
    ) -> ForgeResult<Vec<Address>> {
        expect_addresses(
            self.call_factory(factory, "getCreatorTokens", &[Token::Address(creator)])
                .await?,
        )
    }

    /// Tokens `creator` deployed through the current factory. Tokens whose
    /// details cannot be read are skipped.
    pub async fn creator_tokens(&self, creator: Address) -> ForgeResult<Vec<TokenInfo>> {
        let addresses = self
            .factory_creator_tokens(self.config.factory_address, creator)
            .await?;
        Ok(self.describe_all(&addresses, creator, false).await)
    }

    /// Tokens `creator` deployed through the current and legacy factories,
    /// de-duplicated, each with the creator's balance. A factory or token
    /// that fails to answer is skipped.
    pub async fn verify_creator_tokens(&self, creator: Address) -> ForgeResult<Vec<TokenInfo>> {
        let mut addresses: Vec<Address> = Vec::new();
        let factories = std::iter::once(self.config.factory_address)
            .chain(self.config.legacy_factories.iter().copied());
        for factory in factories {
            match self.factory_creator_tokens(factory, creator).await {
                Ok(found) => {
                    for address in found {
                        if !addresses.contains(&address) {
                            addresses.push(address);
                        }
                    }
                }
                Err(e) => {
                    warn!(factory = %address_hex(&factory), error = %e, "factory query failed");
                }
            }
        }
        Ok(self.describe_all(&addresses, creator, true).await)
    }

    async fn describe_all(
        &self,
        addresses: &[Address],
        creator: Address,
        with_balance: bool,
    ) -> Vec<TokenInfo> {
        let mut tokens = Vec::with_capacity(addresses.len());
        for &address in addresses {
            let holder = with_balance.then_some(creator);
            match self.token_info(address, holder).await {
                Ok(mut info) => {
                    info.creator = Some(creator);
                    tokens.push(info);
                }
                Err(e) => {
                    warn!(token = %address_hex(&address), error = %e, "skipping unreadable token");
                }
            }
        }
        tokens
    }
}

#[async_trait]
impl TokenCreator for EvmTokenClient {
    fn chain(&self) -> Chain {
        self.config.network.chain
    }

    async fn create(&self, request: &TokenCreationRequest) -> ForgeResult<CreatedToken> {
        let created = self.create_token(request).await?;
        Ok(CreatedToken {
            chain: self.config.network.chain,
            address: address_hex(&created.token_address),
            owner: address_hex(&created.creator),
            transaction_reference: format!("{:#x}", created.transaction_hash),
        })
    }
}

fn unexpected(expected: &str, token: &Token) -> ForgeError {
    ForgeError::Abi(format!("expected {expected}, got {token:?}"))
}

fn expect_uint(token: Token) -> ForgeResult<U256> {
    match token {
        Token::Uint(value) => Ok(value),
        other => Err(unexpected("uint", &other)),
    }
}

/// Range-check a `decimals()` result against the full 256-bit value.
fn decimals_from_uint(value: U256) -> ForgeResult<u8> {
    if value > U256::from(u8::MAX) {
        return Err(ForgeError::InvalidResponse(format!(
            "decimals out of range: {value}"
        )));
    }
    Ok(value.low_u32() as u8)
}

fn expect_string(token: Token) -> ForgeResult<String> {
    match token {
        Token::String(value) => Ok(value),
        other => Err(unexpected("string", &other)),
    }
}

fn expect_bool(token: Token) -> ForgeResult<bool> {
    match token {
        Token::Bool(value) => Ok(value),
        other => Err(unexpected("bool", &other)),
    }
}

fn expect_addresses(token: Token) -> ForgeResult<Vec<Address>> {
    match token {
        Token::Array(items) => items
            .into_iter()
            .map(|item| {
                item.into_address()
                    .ok_or_else(|| ForgeError::Abi("expected address".into()))
            })
            .collect(),
        other => Err(unexpected("address[]", &other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use web3::ethabi::encode;

    use super::*;
    use crate::rpc::RpcError;
    use crate::rpc::testing::ScriptedRpc;

    const SIGNER: &str = "0x00000000000000000000000000000000000000b1";

    fn factory() -> Address {
        Address::repeat_byte(0xfa)
    }

    fn config() -> EvmClientConfig {
        EvmClientConfig {
            network: Chain::CronosTestnet.default_descriptor(),
            factory_address: factory(),
            legacy_factories: vec![Address::repeat_byte(0xfb)],
            poll_interval: Duration::from_millis(500),
            confirm_timeout: Duration::from_secs(5),
        }
    }

    /// A wallet on the right chain plus a reader, both scripted.
    fn client() -> (Arc<ScriptedRpc>, Arc<ScriptedRpc>, EvmTokenClient) {
        let provider = Arc::new(ScriptedRpc::new());
        provider.always("eth_accounts", json!([SIGNER]));
        provider.always("eth_chainId", json!("0x152"));
        provider.always(
            "eth_sendTransaction",
            json!(format!("{:#x}", H256::repeat_byte(0x11))),
        );
        let reader = Arc::new(ScriptedRpc::new());
        let client =
            EvmTokenClient::new(InjectedWallet::new(provider.clone()), reader.clone(), config())
                .unwrap();
        (provider, reader, client)
    }

    fn hex_output(tokens: &[Token]) -> Value {
        json!(format!("0x{}", hex::encode(encode(tokens))))
    }

    fn sent_data(params: &Value) -> Vec<u8> {
        let data = params[0]["data"].as_str().unwrap();
        hex::decode(data.trim_start_matches("0x")).unwrap()
    }

    fn topic(address: Address) -> String {
        format!("{:#x}", H256::from(address))
    }

    fn deployed_receipt(token: Address) -> Value {
        let abi = ForgeAbi::load().unwrap();
        let signature = abi.token_deployed().unwrap().signature();
        json!({
            "status": "0x1",
            "logs": [
                {
                    "address": address_hex(&Address::repeat_byte(0x99)),
                    "topics": [format!("{:#x}", H256::repeat_byte(0x01))],
                    "data": "0x"
                },
                {
                    "address": address_hex(&factory()),
                    "topics": [
                        format!("{signature:#x}"),
                        topic(token),
                        format!("{:#x}", H256::repeat_byte(0x5e)),
                        topic(Address::from_low_u64_be(0xb1)),
                    ],
                    "data": format!("0x{}", hex::encode(encode(&[Token::String("Forge".into())]))),
                }
            ]
        })
    }

    #[test]
    fn parses_addresses_and_amounts() {
        assert_eq!(parse_address(SIGNER).unwrap(), Address::from_low_u64_be(0xb1));
        assert!(parse_address("0x1234").is_err());
        assert!(parse_address("b1").is_err());

        assert_eq!(parse_amount("1.5").unwrap(), U256::from(15u64) * U256::exp10(17));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn decimals_reject_values_wider_than_u8() {
        assert_eq!(decimals_from_uint(U256::from(18u8)).unwrap(), 18);
        assert_eq!(decimals_from_uint(U256::from(u8::MAX)).unwrap(), u8::MAX);
        assert!(decimals_from_uint(U256::from(256u32)).is_err());
        // low 64 bits are 18, high bits set
        let wide = (U256::one() << 64) + U256::from(18u8);
        assert!(decimals_from_uint(wide).is_err());
    }

    #[test]
    fn whole_tokens_scale_by_eighteen_decimals() {
        assert_eq!(scale_whole_tokens(0), U256::zero());
        assert_eq!(
            scale_whole_tokens(1_000).to_string(),
            "1000000000000000000000"
        );
    }

    #[test]
    fn config_rejects_solana_network() {
        let mut forge = ForgeConfig::default();
        let registry = NetworkRegistry::with_defaults();
        assert!(EvmClientConfig::from_config(&forge, &registry).is_ok());

        forge.evm_network = "solana_devnet".into();
        assert!(EvmClientConfig::from_config(&forge, &registry).is_err());

        forge.evm_network = "cronos_mainnet".into();
        forge.legacy_factory_addresses = vec!["nope".into()];
        assert!(EvmClientConfig::from_config(&forge, &registry).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn create_token_reads_address_from_deploy_log() {
        let (provider, reader, client) = client();
        let token = Address::repeat_byte(0xaa);
        reader.push("eth_getTransactionReceipt", Value::Null);
        reader.push("eth_getTransactionReceipt", deployed_receipt(token));

        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_000).with_max_supply(5_000);
        let created = client.create_token(&request).await.unwrap();
        assert_eq!(created.token_address, token);
        assert_eq!(created.creator, Address::from_low_u64_be(0xb1));
        assert_eq!(created.transaction_hash, H256::repeat_byte(0x11));

        let sent = provider.calls_to("eth_sendTransaction");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][0]["to"], address_hex(&factory()));
        let data = sent_data(&sent[0]);
        let function = client.abi.factory_fn("createToken").unwrap();
        assert_eq!(data[..4], function.short_signature());
        let args = function.decode_input(&data[4..]).unwrap();
        assert_eq!(args[2], Token::Uint(scale_whole_tokens(1_000)));
        assert_eq!(args[3], Token::Uint(scale_whole_tokens(5_000)));
        assert_eq!(reader.calls_to("eth_getTransactionReceipt").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_deploy_event_is_an_error() {
        let (_provider, reader, client) = client();
        reader.push("eth_getTransactionReceipt", json!({ "status": "0x1", "logs": [] }));

        let err = client
            .create_token(&TokenCreationRequest::new("Forge", "FRG", 18, 1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn reverted_receipt_fails() {
        let (_provider, reader, client) = client();
        reader.push("eth_getTransactionReceipt", json!({ "status": "0x0", "logs": [] }));

        let err = client
            .burn_tokens(Address::repeat_byte(0xaa), "1")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::TransactionFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn receipt_polling_times_out() {
        let (_provider, reader, client) = client();
        reader.always("eth_getTransactionReceipt", Value::Null);

        let err = client.pause(Address::repeat_byte(0xaa)).await.unwrap_err();
        assert!(matches!(err, ForgeError::ConfirmationTimeout { .. }));
        assert_eq!(reader.calls_to("eth_getTransactionReceipt").len(), 10);
    }

    #[tokio::test]
    async fn cap_violation_sends_nothing() {
        let (provider, reader, client) = client();
        let request = TokenCreationRequest::new("Forge", "FRG", 18, 1_500).with_max_supply(1_000);

        let err = client.create_token(&request).await.unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
        assert!(provider.calls().is_empty());
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn disconnected_wallet_sends_nothing() {
        let provider = Arc::new(ScriptedRpc::new());
        provider.always("eth_accounts", json!([]));
        let reader = Arc::new(ScriptedRpc::new());
        let client =
            EvmTokenClient::new(InjectedWallet::new(provider.clone()), reader.clone(), config())
                .unwrap();

        let err = client
            .create_token(&TokenCreationRequest::new("Forge", "FRG", 18, 1_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::WalletNotConnected));
        assert!(provider.calls_to("eth_sendTransaction").is_empty());
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn mint_encodes_recipient_and_scaled_amount() {
        let (provider, reader, client) = client();
        reader.push("eth_getTransactionReceipt", json!({ "status": "0x1", "logs": [] }));
        let token = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xcc);

        client.mint_tokens(token, to, "2").await.unwrap();
        let sent = provider.calls_to("eth_sendTransaction");
        assert_eq!(sent[0][0]["to"], address_hex(&token));
        let data = sent_data(&sent[0]);
        let args = client.abi.token_fn("mint").unwrap().decode_input(&data[4..]).unwrap();
        assert_eq!(args, vec![Token::Address(to), Token::Uint(scale_whole_tokens(2))]);
    }

    /// Script every view call a `token_info` on `token` makes. Calls are told
    /// apart by their selector.
    fn script_token(reader: &ScriptedRpc, symbol: &str) {
        reader.push("eth_call", hex_output(&[Token::String(format!("{symbol} Token"))]));
        reader.push("eth_call", hex_output(&[Token::String(symbol.into())]));
        reader.push("eth_call", hex_output(&[Token::Uint(U256::from(18u8))]));
        reader.push("eth_call", hex_output(&[Token::Uint(scale_whole_tokens(100))]));
    }

    #[tokio::test]
    async fn token_info_reads_metadata() {
        let (_provider, reader, client) = client();
        script_token(&reader, "FRG");
        reader.push("eth_call", hex_output(&[Token::Uint(scale_whole_tokens(7))]));
        reader.push("eth_call", hex_output(&[Token::Bool(true)]));

        let holder = Address::repeat_byte(0xcc);
        let info = client
            .token_info(Address::repeat_byte(0xaa), Some(holder))
            .await
            .unwrap();
        assert_eq!(info.symbol, "FRG");
        assert_eq!(info.decimals, 18);
        assert_eq!(info.total_supply, scale_whole_tokens(100));
        assert_eq!(info.balance, Some(scale_whole_tokens(7)));
        assert_eq!(info.paused, Some(true));

        let calls = reader.calls_to("eth_call");
        assert_eq!(calls[0][0]["to"], address_hex(&Address::repeat_byte(0xaa)));
        assert_eq!(calls[0][1], "latest");

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["totalSupply"], "100000000000000000000");
        assert_eq!(json["address"], address_hex(&Address::repeat_byte(0xaa)));
    }

    #[tokio::test]
    async fn creator_listing_skips_unreadable_tokens() {
        let (_provider, reader, client) = client();
        let good = Address::repeat_byte(0xaa);
        let bad = Address::repeat_byte(0xab);
        reader.push(
            "eth_call",
            hex_output(&[Token::Array(vec![Token::Address(bad), Token::Address(good)])]),
        );
        reader.push_err(
            "eth_call",
            RpcError::Server {
                code: -32000,
                message: "execution reverted".into(),
                data: None,
            },
        );
        script_token(&reader, "FRG");
        reader.push_err("eth_call", RpcError::Transport("paused() missing".into()));

        let creator = Address::from_low_u64_be(0xb1);
        let tokens = client.creator_tokens(creator).await.unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].address, good);
        assert_eq!(tokens[0].creator, Some(creator));
        assert_eq!(tokens[0].paused, None);
        assert_eq!(tokens[0].balance, None);
    }

    #[tokio::test]
    async fn verify_merges_factories_and_skips_failures() {
        let (_provider, reader, client) = client();
        let token = Address::repeat_byte(0xaa);
        // current factory lists the token, the legacy one lists it again
        reader.push(
            "eth_call",
            hex_output(&[Token::Array(vec![Token::Address(token)])]),
        );
        reader.push(
            "eth_call",
            hex_output(&[Token::Array(vec![Token::Address(token)])]),
        );
        script_token(&reader, "FRG");
        reader.push("eth_call", hex_output(&[Token::Uint(scale_whole_tokens(3))]));
        reader.push("eth_call", hex_output(&[Token::Bool(false)]));

        let tokens = client
            .verify_creator_tokens(Address::from_low_u64_be(0xb1))
            .await
            .unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].balance, Some(scale_whole_tokens(3)));
        assert_eq!(tokens[0].paused, Some(false));

        let calls = reader.calls_to("eth_call");
        assert_eq!(calls[0][0]["to"], address_hex(&factory()));
        assert_eq!(calls[1][0]["to"], address_hex(&Address::repeat_byte(0xfb)));
    }

    #[tokio::test]
    async fn verify_survives_a_failing_factory() {
        let (_provider, reader, client) = client();
        reader.push_err("eth_call", RpcError::Transport("connection reset".into()));
        reader.push("eth_call", hex_output(&[Token::Array(vec![])]));

        let tokens = client
            .verify_creator_tokens(Address::from_low_u64_be(0xb1))
            .await
            .unwrap();
        assert!(tokens.is_empty());
        assert_eq!(reader.calls_to("eth_call").len(), 2);
    }

    #[tokio::test]
    async fn token_count_decodes_uint() {
        let (_provider, reader, client) = client();
        reader.push("eth_call", hex_output(&[Token::Uint(U256::from(12u64))]));
        assert_eq!(client.token_count().await.unwrap(), U256::from(12u64));
    }
}

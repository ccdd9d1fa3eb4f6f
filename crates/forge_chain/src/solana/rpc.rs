//! Solana JSON-RPC calls used by the FORGE clients.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::{Value, json};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;
use tracing::{debug, info};

use super::wallet::SolanaWallet;
use crate::error::{ForgeError, ForgeResult};
use crate::rpc::{JsonRpc, decode_result};

/// Commitment the clients read and confirm at.
const COMMITMENT: &str = "confirmed";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    #[serde(default)]
    pub confirmations: Option<u64>,
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self.confirmation_status.as_deref(),
            Some("confirmed") | Some("finalized")
        )
    }
}

/// Balance of an SPL mint as reported by `getTokenSupply`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAmount {
    pub amount: String,
    pub decimals: u8,
    pub ui_amount_string: String,
}

#[derive(Deserialize)]
struct RpcValue<T> {
    value: T,
}

#[derive(Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Deserialize)]
struct AccountValue {
    data: (String, String),
}

/// Typed wrapper over a [`JsonRpc`] endpoint speaking the Solana API.
#[derive(Clone)]
pub struct SolanaRpcClient {
    rpc: Arc<dyn JsonRpc>,
    poll_interval: Duration,
    confirm_timeout: Duration,
}

impl SolanaRpcClient {
    pub fn new(rpc: Arc<dyn JsonRpc>, poll_interval: Duration, confirm_timeout: Duration) -> Self {
        Self {
            rpc,
            poll_interval,
            confirm_timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        self.rpc.endpoint()
    }

    pub async fn latest_blockhash(&self) -> ForgeResult<Hash> {
        let result = self
            .rpc
            .request("getLatestBlockhash", json!([{ "commitment": COMMITMENT }]))
            .await?;
        let response: RpcValue<BlockhashValue> = decode_result("getLatestBlockhash", result)?;
        Hash::from_str(&response.value.blockhash)
            .map_err(|e| ForgeError::InvalidResponse(format!("blockhash: {e}")))
    }

    pub async fn minimum_balance_for_rent_exemption(&self, space: u64) -> ForgeResult<u64> {
        let result = self
            .rpc
            .request("getMinimumBalanceForRentExemption", json!([space]))
            .await?;
        Ok(decode_result("getMinimumBalanceForRentExemption", result)?)
    }

    /// Broadcast a signed transaction. Preflight simulation errors come back
    /// as RPC errors with the node's message intact.
    pub async fn send_transaction(&self, tx: &Transaction) -> ForgeResult<Signature> {
        let serialized =
            bincode::serialize(tx).map_err(|e| ForgeError::Serialization(e.to_string()))?;
        let encoded = STANDARD.encode(serialized);
        let result = self
            .rpc
            .request(
                "sendTransaction",
                json!([encoded, { "encoding": "base64", "preflightCommitment": COMMITMENT }]),
            )
            .await?;
        let signature: String = decode_result("sendTransaction", result)?;
        let signature = Signature::from_str(&signature)
            .map_err(|e| ForgeError::InvalidResponse(format!("signature: {e}")))?;
        debug!(signature = %signature, "transaction sent");
        Ok(signature)
    }

    pub async fn signature_status(
        &self,
        signature: &Signature,
    ) -> ForgeResult<Option<SignatureStatus>> {
        let result = self
            .rpc
            .request(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": true }]),
            )
            .await?;
        let response: RpcValue<Vec<Option<SignatureStatus>>> =
            decode_result("getSignatureStatuses", result)?;
        Ok(response.value.into_iter().next().flatten())
    }

    /// Poll until the signature reaches `confirmed`, fails, or the timeout
    /// passes.
    pub async fn confirm_transaction(&self, signature: &Signature) -> ForgeResult<()> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            if let Some(status) = self.signature_status(signature).await? {
                if let Some(err) = status.err.as_ref().filter(|e| !e.is_null()) {
                    return Err(ForgeError::TransactionFailed {
                        reference: signature.to_string(),
                        reason: err.to_string(),
                    });
                }
                if status.is_confirmed() {
                    return Ok(());
                }
            }
            if tokio::time::Instant::now() + self.poll_interval >= deadline {
                return Err(ForgeError::ConfirmationTimeout {
                    reference: signature.to_string(),
                    timeout: self.confirm_timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn send_and_confirm(&self, tx: &Transaction) -> ForgeResult<Signature> {
        let signature = self.send_transaction(tx).await?;
        self.confirm_transaction(&signature).await?;
        info!(signature = %signature, "transaction confirmed");
        Ok(signature)
    }

    /// Build one transaction paid by `payer`, sign it with the generated
    /// `signers` and then the wallet, send it and wait for confirmation.
    pub async fn submit(
        &self,
        wallet: &dyn SolanaWallet,
        instructions: &[Instruction],
        payer: Pubkey,
        signers: &[&Keypair],
    ) -> ForgeResult<Signature> {
        let blockhash = self.latest_blockhash().await?;
        let mut tx = Transaction::new_with_payer(instructions, Some(&payer));
        tx.message.recent_blockhash = blockhash;
        if !signers.is_empty() {
            tx.try_partial_sign(signers, blockhash)
                .map_err(|e| ForgeError::Wallet(e.to_string()))?;
        }
        let tx = wallet.sign_transaction(tx).await?;
        self.send_and_confirm(&tx).await
    }

    /// Raw account data, or `None` when the account does not exist.
    pub async fn account_data(&self, address: &Pubkey) -> ForgeResult<Option<Vec<u8>>> {
        let result = self
            .rpc
            .request(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "base64", "commitment": COMMITMENT }]),
            )
            .await?;
        let response: RpcValue<Option<AccountValue>> = decode_result("getAccountInfo", result)?;
        response
            .value
            .map(|account| {
                STANDARD
                    .decode(account.data.0)
                    .map_err(|e| ForgeError::InvalidResponse(format!("account data: {e}")))
            })
            .transpose()
    }

    pub async fn token_supply(&self, mint: &Pubkey) -> ForgeResult<TokenAmount> {
        let result = self
            .rpc
            .request(
                "getTokenSupply",
                json!([mint.to_string(), { "commitment": COMMITMENT }]),
            )
            .await?;
        let response: RpcValue<TokenAmount> = decode_result("getTokenSupply", result)?;
        Ok(response.value)
    }
}

#[cfg(test)]
mod tests {
    use solana_program::system_instruction;
    use solana_sdk::signature::{Keypair, Signer};

    use super::*;
    use crate::rpc::RpcError;
    use crate::rpc::testing::ScriptedRpc;

    fn client(rpc: Arc<ScriptedRpc>) -> SolanaRpcClient {
        SolanaRpcClient::new(rpc, Duration::from_millis(500), Duration::from_secs(5))
    }

    fn status(confirmation: &str, err: Value) -> Value {
        json!({
            "context": {"slot": 10},
            "value": [{
                "slot": 10,
                "confirmations": null,
                "err": err,
                "confirmationStatus": confirmation,
            }]
        })
    }

    fn signed_tx() -> Transaction {
        let payer = Keypair::new();
        let ix = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 10);
        Transaction::new_signed_with_payer(&[ix], Some(&payer.pubkey()), &[&payer], Hash::new_unique())
    }

    #[tokio::test]
    async fn latest_blockhash_parses_value() {
        let rpc = Arc::new(ScriptedRpc::new());
        let hash = Hash::new_unique();
        rpc.push(
            "getLatestBlockhash",
            json!({"context": {"slot": 1}, "value": {"blockhash": hash.to_string(), "lastValidBlockHeight": 100}}),
        );
        assert_eq!(client(rpc).latest_blockhash().await.unwrap(), hash);
    }

    #[tokio::test]
    async fn send_transaction_posts_base64_bincode() {
        let rpc = Arc::new(ScriptedRpc::new());
        let tx = signed_tx();
        let expected_sig = tx.signatures[0];
        rpc.push("sendTransaction", json!(expected_sig.to_string()));

        let sig = client(rpc.clone()).send_transaction(&tx).await.unwrap();
        assert_eq!(sig, expected_sig);

        let params = &rpc.calls_to("sendTransaction")[0];
        assert_eq!(params[1]["encoding"], "base64");
        let raw = STANDARD.decode(params[0].as_str().unwrap()).unwrap();
        let decoded: Transaction = bincode::deserialize(&raw).unwrap();
        assert_eq!(decoded, tx);
    }

    #[tokio::test]
    async fn simulation_failure_is_surfaced_verbatim() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push_err(
            "sendTransaction",
            RpcError::Server {
                code: -32002,
                message: "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit.".into(),
                data: None,
            },
        );
        let err = client(rpc).send_transaction(&signed_tx()).await.unwrap_err();
        assert!(err.to_string().contains("no record of a prior credit"));
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_polls_until_confirmed() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push("getSignatureStatuses", json!({"context": {"slot": 1}, "value": [null]}));
        rpc.push("getSignatureStatuses", status("processed", Value::Null));
        rpc.push("getSignatureStatuses", status("confirmed", Value::Null));

        client(rpc.clone())
            .confirm_transaction(&Signature::default())
            .await
            .unwrap();
        assert_eq!(rpc.calls_to("getSignatureStatuses").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_reports_on_chain_error() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push(
            "getSignatureStatuses",
            status("processed", json!({"InstructionError": [0, {"Custom": 1}]})),
        );
        let err = client(rpc)
            .confirm_transaction(&Signature::default())
            .await
            .unwrap_err();
        match err {
            ForgeError::TransactionFailed { reason, .. } => assert!(reason.contains("Custom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn confirm_times_out() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.always("getSignatureStatuses", json!({"context": {"slot": 1}, "value": [null]}));
        let err = client(rpc.clone())
            .confirm_transaction(&Signature::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ConfirmationTimeout { .. }));
        // 5s timeout at 500ms intervals.
        assert_eq!(rpc.calls_to("getSignatureStatuses").len(), 10);
    }

    #[tokio::test]
    async fn account_data_decodes_base64_and_handles_missing() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push(
            "getAccountInfo",
            json!({"context": {"slot": 1}, "value": {
                "data": [STANDARD.encode([1u8, 2, 3]), "base64"],
                "executable": false,
                "lamports": 1,
                "owner": Pubkey::new_unique().to_string(),
                "rentEpoch": 0
            }}),
        );
        rpc.push("getAccountInfo", json!({"context": {"slot": 1}, "value": null}));

        let client = client(rpc);
        let key = Pubkey::new_unique();
        assert_eq!(client.account_data(&key).await.unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(client.account_data(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn token_supply_and_rent() {
        let rpc = Arc::new(ScriptedRpc::new());
        rpc.push(
            "getTokenSupply",
            json!({"context": {"slot": 1}, "value": {"amount": "1000", "decimals": 2, "uiAmount": 10.0, "uiAmountString": "10"}}),
        );
        rpc.push("getMinimumBalanceForRentExemption", json!(1_461_600));

        let client = client(rpc);
        let supply = client.token_supply(&Pubkey::new_unique()).await.unwrap();
        assert_eq!(supply.amount, "1000");
        assert_eq!(supply.decimals, 2);
        assert_eq!(client.minimum_balance_for_rent_exemption(82).await.unwrap(), 1_461_600);
    }
}

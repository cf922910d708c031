use async_trait::async_trait;
use ethers::{
    providers::Middleware,
    types::{Address, TransactionRequest, H256, U256, U64},
    utils::format_ether,
};
use evvm_cli_common::{
    cast::{self, CastAuth},
    ethereum::get_ethers_provider,
    logger,
};
use evvm_cli_config::LocalChainSettings;
use thiserror::Error;
use xshell::Shell;

use crate::messages::{msg_funding_strategy_failed, msg_funded_wallet};

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("Could not fund {address:?}: {reasons}")]
    Exhausted { address: Address, reasons: String },
}

/// One way of moving ether from the local node's funded account.
#[async_trait]
pub trait FundingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fund(&self, rpc_url: &str, to: Address, amount: U256) -> anyhow::Result<()>;
}

/// `cast send --value`, signed with the funded account's key.
pub struct CastSendStrategy {
    auth: CastAuth,
}

impl CastSendStrategy {
    pub fn new(settings: &LocalChainSettings) -> Self {
        Self {
            auth: CastAuth::PrivateKey(settings.default_private_key.clone()),
        }
    }
}

#[async_trait]
impl FundingStrategy for CastSendStrategy {
    fn name(&self) -> &'static str {
        "cast send"
    }

    async fn fund(&self, rpc_url: &str, to: Address, amount: U256) -> anyhow::Result<()> {
        let shell = Shell::new()?;
        cast::send_value(&shell, rpc_url, &self.auth, &format!("{to:?}"), amount)
    }
}

/// Raw `eth_sendTransaction` from an account the local node keeps unlocked.
pub struct RawRpcStrategy {
    from: Address,
}

impl RawRpcStrategy {
    pub fn new(settings: &LocalChainSettings) -> Self {
        Self {
            from: settings.default_account.as_address(),
        }
    }
}

#[async_trait]
impl FundingStrategy for RawRpcStrategy {
    fn name(&self) -> &'static str {
        "eth_sendTransaction"
    }

    async fn fund(&self, rpc_url: &str, to: Address, amount: U256) -> anyhow::Result<()> {
        let provider = get_ethers_provider(rpc_url)?;
        let tx = TransactionRequest::new().from(self.from).to(to).value(amount);
        let hash: H256 = provider.request("eth_sendTransaction", [tx]).await?;
        let receipt = provider.get_transaction_receipt(hash).await?;
        // Anvil mines instantly, an absent receipt means the node queued it.
        if let Some(receipt) = receipt {
            if receipt.status == Some(U64::zero()) {
                anyhow::bail!("Funding transaction {hash:?} reverted");
            }
        }
        Ok(())
    }
}

/// Strategies tried in order until one succeeds.
pub struct FundingPolicy {
    strategies: Vec<Box<dyn FundingStrategy>>,
}

impl FundingPolicy {
    pub fn new(strategies: Vec<Box<dyn FundingStrategy>>) -> Self {
        Self { strategies }
    }

    /// Signed `cast send` first, the raw RPC call second.
    pub fn local(settings: &LocalChainSettings) -> Self {
        Self::new(vec![
            Box::new(CastSendStrategy::new(settings)),
            Box::new(RawRpcStrategy::new(settings)),
        ])
    }

    /// Returns the name of the strategy that succeeded.
    pub async fn fund(
        &self,
        rpc_url: &str,
        to: Address,
        amount: U256,
    ) -> Result<&'static str, FundingError> {
        let mut reasons = vec![];
        for strategy in &self.strategies {
            match strategy.fund(rpc_url, to, amount).await {
                Ok(()) => return Ok(strategy.name()),
                Err(err) => {
                    logger::warn(msg_funding_strategy_failed(strategy.name(), &err));
                    reasons.push(format!("{}: {err:#}", strategy.name()));
                }
            }
        }
        Err(FundingError::Exhausted {
            address: to,
            reasons: reasons.join("; "),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
    AlreadyFunded { balance: U256 },
    Funded { strategy: &'static str },
}

/// Tops `address` up when its balance is under the threshold.
pub async fn top_up(
    policy: &FundingPolicy,
    settings: &LocalChainSettings,
    address: Address,
    balance: U256,
) -> Result<FundingOutcome, FundingError> {
    if balance >= settings.funding_threshold {
        return Ok(FundingOutcome::AlreadyFunded { balance });
    }
    let strategy = policy
        .fund(&settings.rpc_url(), address, settings.funding_amount)
        .await?;
    logger::success(msg_funded_wallet(
        &format!("{address:?}"),
        &format_ether(settings.funding_amount),
        strategy,
    ));
    Ok(FundingOutcome::Funded { strategy })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    struct FakeStrategy {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FundingStrategy for FakeStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fund(&self, _rpc_url: &str, _to: Address, _amount: U256) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                anyhow::bail!("{} refused", self.name)
            }
        }
    }

    fn policy(results: &[(&'static str, bool)]) -> (FundingPolicy, Vec<Arc<AtomicUsize>>) {
        let counters: Vec<_> = results.iter().map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let strategies = results
            .iter()
            .zip(&counters)
            .map(|((name, succeed), calls)| {
                Box::new(FakeStrategy {
                    name: *name,
                    succeed: *succeed,
                    calls: calls.clone(),
                }) as Box<dyn FundingStrategy>
            })
            .collect();
        (FundingPolicy::new(strategies), counters)
    }

    #[tokio::test]
    async fn funded_wallet_is_left_alone() {
        let (policy, calls) = policy(&[("primary", true)]);
        let settings = LocalChainSettings::default();
        let outcome = top_up(&policy, &settings, Address::zero(), settings.funding_threshold)
            .await
            .unwrap();
        assert!(matches!(outcome, FundingOutcome::AlreadyFunded { .. }));
        assert_eq!(calls[0].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_to_second_strategy() {
        let (policy, calls) = policy(&[("primary", false), ("fallback", true)]);
        let settings = LocalChainSettings::default();
        let outcome = top_up(&policy, &settings, Address::zero(), U256::zero())
            .await
            .unwrap();
        assert_eq!(outcome, FundingOutcome::Funded { strategy: "fallback" });
        assert_eq!(calls[0].load(Ordering::SeqCst), 1);
        assert_eq!(calls[1].load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn first_success_stops_the_policy() {
        let (policy, calls) = policy(&[("primary", true), ("fallback", true)]);
        let used = policy
            .fund("http://127.0.0.1:8545", Address::zero(), U256::one())
            .await
            .unwrap();
        assert_eq!(used, "primary");
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_policy_reports_every_reason() {
        let (policy, _) = policy(&[("primary", false), ("fallback", false)]);
        let err = policy
            .fund("http://127.0.0.1:8545", Address::zero(), U256::one())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("primary refused"));
        assert!(message.contains("fallback refused"));
    }
}

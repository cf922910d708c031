use evvm_cli_common::{ethereum::chain_id, logger};
use evvm_cli_config::{LocalChainSettings, NetworkSettings, ProjectEnv};
use evvm_cli_types::Network;

use crate::messages::{msg_no_rpc_endpoint, msg_rpc_endpoint_skipped, msg_using_rpc};

/// First candidate url that answers with the network's chain id.
pub async fn resolve_rpc_url(
    network: Network,
    settings: &NetworkSettings,
    local: &LocalChainSettings,
    env: &ProjectEnv,
) -> anyhow::Result<String> {
    let expected = network.chain_id();
    for url in settings.rpc_candidates(network, local, env)? {
        let url = url.as_str().trim_end_matches('/').to_string();
        match chain_id(&url, settings.probe_timeout).await {
            Ok(id) if id == expected => {
                logger::info(msg_using_rpc(network, &url));
                return Ok(url);
            }
            Ok(id) => logger::debug(msg_rpc_endpoint_skipped(&url, &format!("chain id {id}"))),
            Err(err) => logger::debug(msg_rpc_endpoint_skipped(&url, &format!("{err:#}"))),
        }
    }
    anyhow::bail!(msg_no_rpc_endpoint(network))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use evvm_cli_common::ethereum::test_utils::json_rpc_responder;

    use super::*;

    #[tokio::test]
    async fn picks_first_endpoint_with_matching_chain() {
        let wrong = json_rpc_responder(r#""0x1""#).await;
        let right = json_rpc_responder(r#""0x66eee""#).await;
        let settings = NetworkSettings {
            arb_sepolia: vec![wrong, right.clone()],
            probe_timeout: Duration::from_secs(2),
            ..NetworkSettings::default()
        };
        let url = resolve_rpc_url(
            Network::ArbSepolia,
            &settings,
            &LocalChainSettings::default(),
            &ProjectEnv::default(),
        )
        .await;
        // An RPC_URL_ARB_SEPOLIA in the process environment would be tried first.
        if std::env::var("RPC_URL_ARB_SEPOLIA").is_err() {
            assert_eq!(url.unwrap(), right);
        }
    }

    #[tokio::test]
    async fn no_matching_endpoint_is_an_error() {
        let wrong = json_rpc_responder(r#""0x1""#).await;
        let settings = NetworkSettings {
            eth_sepolia: vec![wrong],
            probe_timeout: Duration::from_secs(2),
            ..NetworkSettings::default()
        };
        if std::env::var("RPC_URL_ETH_SEPOLIA").is_err() {
            let err = resolve_rpc_url(
                Network::EthSepolia,
                &settings,
                &LocalChainSettings::default(),
                &ProjectEnv::default(),
            )
            .await
            .unwrap_err();
            assert!(err.to_string().contains("Ethereum Sepolia"));
        }
    }
}

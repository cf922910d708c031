use std::{sync::Arc, time::Duration};

use anyhow::Context;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256},
};
use tokio::time::{sleep, timeout, Instant};

pub fn get_ethers_provider(url: &str) -> anyhow::Result<Arc<Provider<Http>>> {
    let provider = match Provider::<Http>::try_from(url) {
        Ok(provider) => provider,
        Err(err) => {
            anyhow::bail!("Connection error: {:#?}", err);
        }
    };

    Ok(Arc::new(provider))
}

/// `eth_chainId` bounded by `limit`.
pub async fn chain_id(url: &str, limit: Duration) -> anyhow::Result<u64> {
    let provider = get_ethers_provider(url)?;
    let id = timeout(limit, provider.get_chainid())
        .await
        .with_context(|| format!("{url} did not answer within {}s", limit.as_secs()))??;
    Ok(id.as_u64())
}

/// Polls until the node at `url` answers `eth_chainId`, optionally with a
/// specific id. Returns `false` once `deadline` elapses.
pub async fn wait_for_chain(
    url: &str,
    expected: Option<u64>,
    interval: Duration,
    deadline: Duration,
) -> bool {
    let started = Instant::now();
    loop {
        if let Ok(id) = chain_id(url, interval.max(Duration::from_secs(1))).await {
            if expected.map_or(true, |expected| expected == id) {
                return true;
            }
        }
        if started.elapsed() >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}

pub async fn balance(url: &str, address: Address) -> anyhow::Result<U256> {
    let provider = get_ethers_provider(url)?;
    Ok(provider.get_balance(address, None).await?)
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Serves every HTTP request with the same JSON-RPC result and returns the
    /// server url.
    pub async fn json_rpc_responder(result: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let _ = socket.read(&mut buf).await;
                    let body = format!(r#"{{"jsonrpc":"2.0","id":0,"result":{result}}}"#);
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }
}

#[cfg(test)]
mod tests {
    use super::{test_utils::json_rpc_responder, *};

    #[tokio::test]
    async fn reads_chain_id() {
        let url = json_rpc_responder(r#""0x7a69""#).await;
        assert_eq!(chain_id(&url, Duration::from_secs(5)).await.unwrap(), 31337);
    }

    #[tokio::test]
    async fn reads_balance() {
        let url = json_rpc_responder(r#""0xde0b6b3a7640000""#).await;
        let wei = balance(&url, Address::zero()).await.unwrap();
        assert_eq!(wei, U256::exp10(18));
    }

    #[tokio::test]
    async fn waits_for_expected_chain() {
        let url = json_rpc_responder(r#""0xaa36a7""#).await;
        assert!(
            wait_for_chain(&url, Some(11_155_111), Duration::from_millis(100), Duration::from_secs(2))
                .await
        );
    }

    #[tokio::test]
    async fn gives_up_on_wrong_chain() {
        let url = json_rpc_responder(r#""0x1""#).await;
        assert!(
            !wait_for_chain(&url, Some(31_337), Duration::from_millis(100), Duration::from_millis(300))
                .await
        );
    }

    #[tokio::test]
    async fn unreachable_node_times_out() {
        assert!(
            !wait_for_chain(
                "http://127.0.0.1:1",
                None,
                Duration::from_millis(100),
                Duration::from_millis(300)
            )
            .await
        );
    }
}

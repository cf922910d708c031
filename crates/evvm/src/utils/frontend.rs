use std::{path::Path, time::Duration};

use evvm_cli_common::{
    logger,
    process::{free_port, is_port_open, spawn_detached},
    PromptConfirm,
};
use evvm_cli_config::{EnvFile, FrontendSettings, FRONTEND_DIR, FRONTEND_LOG_FILE, LOGS_DIR, NEXT_CACHE_DIR};
use tokio::time::{sleep, Instant};
use xshell::Shell;

use crate::messages::{
    msg_cache_not_cleared, msg_frontend_port_busy_prompt, msg_frontend_ready, msg_frontend_timeout,
    MSG_FRONTEND_CACHE_CLEARED, MSG_FRONTEND_MISSING, MSG_FRONTEND_SKIPPED, MSG_STARTING_FRONTEND,
};

/// Removes the Next.js build cache so new public env values are picked up.
pub fn invalidate_cache(shell: &Shell, root: &Path) -> anyhow::Result<bool> {
    let cache = root.join(FRONTEND_DIR).join(NEXT_CACHE_DIR);
    if !shell.path_exists(&cache) {
        return Ok(false);
    }
    shell.remove_path(&cache)?;
    logger::debug(MSG_FRONTEND_CACHE_CLEARED);
    Ok(true)
}

/// Writes `.env` first, then drops the build cache. A cache that cannot be
/// removed only warns.
pub fn publish_env(shell: &Shell, root: &Path, env: &EnvFile) -> anyhow::Result<()> {
    env.save(shell)?;
    if let Err(err) = invalidate_cache(shell, root) {
        logger::warn(msg_cache_not_cleared(&err));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendOutcome {
    Started { pid: u32, url: String },
    Skipped,
}

/// Any HTTP answer counts, a fresh dev server may still reply with an error page.
pub async fn wait_until_serving(url: &str, interval: Duration, deadline: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(interval.max(Duration::from_secs(2))).build() {
        Ok(client) => client,
        Err(_) => return false,
    };
    let started = Instant::now();
    loop {
        if client.get(url).send().await.is_ok() {
            return true;
        }
        if started.elapsed() >= deadline {
            return false;
        }
        sleep(interval).await;
    }
}

/// Starts `npm run dev` in `frontend/`, detached, and waits for it to serve.
pub async fn launch(
    shell: &Shell,
    root: &Path,
    settings: &FrontendSettings,
) -> anyhow::Result<FrontendOutcome> {
    let frontend = root.join(FRONTEND_DIR);
    if !shell.path_exists(frontend.join("package.json")) {
        logger::warn(MSG_FRONTEND_MISSING);
        return Ok(FrontendOutcome::Skipped);
    }

    if is_port_open("127.0.0.1", settings.port).await {
        let kill = PromptConfirm::new(msg_frontend_port_busy_prompt(settings.port))
            .default(true)
            .ask()?;
        if !kill {
            logger::warn(MSG_FRONTEND_SKIPPED);
            return Ok(FrontendOutcome::Skipped);
        }
        free_port(shell, settings.port)?;
    }

    logger::step(MSG_STARTING_FRONTEND);
    let log = root.join(LOGS_DIR).join(FRONTEND_LOG_FILE);
    let pid = spawn_detached(
        &frontend,
        "npm",
        &["run".to_string(), "dev".to_string()],
        &[("PORT".to_string(), settings.port.to_string())],
        &log,
    )?;

    let url = settings.url();
    if !wait_until_serving(&url, settings.poll_interval, settings.start_timeout).await {
        anyhow::bail!(msg_frontend_timeout(&url, settings.start_timeout, &log));
    }
    logger::success(msg_frontend_ready(&url));
    Ok(FrontendOutcome::Started { pid, url })
}

#[cfg(test)]
mod tests {
    use evvm_cli_common::ethereum::test_utils::json_rpc_responder;

    use super::*;

    #[test]
    fn cache_is_removed_only_when_present() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        assert!(!invalidate_cache(&shell, dir.path()).unwrap());

        let cache = dir.path().join("frontend/.next");
        shell.write_file(cache.join("build-manifest.json"), "{}").unwrap();
        assert!(invalidate_cache(&shell, dir.path()).unwrap());
        assert!(!shell.path_exists(&cache));
    }

    #[test]
    fn published_env_lands_before_cache_is_dropped() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let cache = dir.path().join("frontend/.next");
        shell.write_file(cache.join("build-manifest.json"), "{}").unwrap();

        let mut env = EnvFile::load(&shell, dir.path()).unwrap();
        env.set("NEXT_PUBLIC_CHAIN_ID", "31337");
        publish_env(&shell, dir.path(), &env).unwrap();

        let written = shell.read_file(dir.path().join(".env")).unwrap();
        assert_eq!(written, "NEXT_PUBLIC_CHAIN_ID=31337\n");
        assert!(!shell.path_exists(&cache));
    }

    #[tokio::test]
    async fn serving_server_is_detected() {
        let url = json_rpc_responder("null").await;
        assert!(wait_until_serving(&url, Duration::from_millis(50), Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn silent_port_times_out() {
        assert!(
            !wait_until_serving(
                "http://127.0.0.1:1",
                Duration::from_millis(50),
                Duration::from_millis(200)
            )
            .await
        );
    }

    #[tokio::test]
    async fn missing_frontend_is_skipped() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let outcome = launch(&shell, dir.path(), &FrontendSettings::default())
            .await
            .unwrap();
        assert_eq!(outcome, FrontendOutcome::Skipped);
    }
}

use ethers::types::U256;
use evvm_cli_common::{
    cast::{self, parse_call_list, parse_call_tuple, CastAuth},
    logger,
};
use evvm_cli_config::{EnvFile, RegistrySettings, MISSING_ADDRESS, EVVM_ID_ENV};
use tokio::time::sleep;
use xshell::Shell;

use crate::messages::{
    msg_evvm_id_assigned, msg_manual_register_command, msg_manual_set_id_command,
    msg_registry_lookup_attempt, MSG_REGISTERING_EVVM, MSG_REGISTRY_ID_NOT_FOUND,
    MSG_REGISTRY_REGISTER_FAILED, MSG_REGISTRY_SET_ID_FAILED, MSG_REGISTRY_SKIPPED_INCOMPLETE,
};

const REGISTER_SIG: &str = "registerEvvm(uint256,address)";
const ACTIVE_IDS_SIG: &str = "getPublicEvvmIdActive()(uint256[])";
const METADATA_SIG: &str = "getEvvmIdMetadata(uint256)((uint256,address))";
const SET_ID_SIG: &str = "setEvvmID(uint256)";

/// Where the freshly deployed EVVM lives.
pub struct RegistrationTarget<'a> {
    pub chain_id: u64,
    pub evvm_address: &'a str,
    /// RPC of the deployment network, used for `setEvvmID`.
    pub rpc_url: &'a str,
}

pub struct Registry<'a> {
    shell: &'a Shell,
    settings: &'a RegistrySettings,
    /// RPC of the network hosting the registry contract.
    rpc_url: String,
    auth: CastAuth,
}

impl<'a> Registry<'a> {
    pub fn new(
        shell: &'a Shell,
        settings: &'a RegistrySettings,
        rpc_url: String,
        auth: CastAuth,
    ) -> Self {
        Self {
            shell,
            settings,
            rpc_url,
            auth,
        }
    }

    pub fn register(&self, target: &RegistrationTarget<'_>) -> anyhow::Result<()> {
        cast::send(
            self.shell,
            &self.rpc_url,
            &self.auth,
            &self.settings.address,
            REGISTER_SIG,
            &[target.chain_id.to_string(), target.evvm_address.to_string()],
        )
    }

    fn active_ids(&self) -> anyhow::Result<Vec<U256>> {
        let output = cast::call(
            self.shell,
            &self.rpc_url,
            &self.settings.address,
            ACTIVE_IDS_SIG,
            &[],
        )?;
        parse_call_list(&output)
    }

    fn metadata(&self, id: U256) -> anyhow::Result<Vec<String>> {
        let output = cast::call(
            self.shell,
            &self.rpc_url,
            &self.settings.address,
            METADATA_SIG,
            &[id.to_string()],
        )?;
        parse_call_tuple(&output)
    }

    /// Polls the registry until an id points at `target`. The registry does
    /// not return the id from `registerEvvm`.
    pub async fn find_evvm_id(&self, target: &RegistrationTarget<'_>) -> anyhow::Result<Option<U256>> {
        for attempt in 1..=self.settings.poll_attempts {
            logger::debug(msg_registry_lookup_attempt(attempt, self.settings.poll_attempts));
            let ids = self.active_ids()?;
            for id in scan_order(&ids, self.settings.scan_depth) {
                let fields = self.metadata(id)?;
                if metadata_matches(&fields, target.chain_id, target.evvm_address) {
                    return Ok(Some(id));
                }
            }
            if attempt < self.settings.poll_attempts {
                sleep(self.settings.poll_interval).await;
            }
        }
        Ok(None)
    }

    pub fn set_evvm_id(&self, target: &RegistrationTarget<'_>, id: U256) -> anyhow::Result<()> {
        cast::send(
            self.shell,
            target.rpc_url,
            &self.auth,
            target.evvm_address,
            SET_ID_SIG,
            &[id.to_string()],
        )
    }
}

/// Most recently assigned ids first, at most `depth` of them.
fn scan_order(ids: &[U256], depth: usize) -> Vec<U256> {
    ids.iter().rev().take(depth).copied().collect()
}

fn metadata_matches(fields: &[String], chain_id: u64, evvm_address: &str) -> bool {
    match fields {
        [chain, address, ..] => {
            chain.trim() == chain_id.to_string() && address.trim().eq_ignore_ascii_case(evvm_address)
        }
        _ => false,
    }
}

/// Registers the EVVM, assigns its id and stores it in `.env`. Every failure
/// ends with the manual command the user can run instead.
pub async fn register_evvm(
    registry: &Registry<'_>,
    target: &RegistrationTarget<'_>,
    env: &mut EnvFile,
) -> Option<U256> {
    if target.evvm_address == MISSING_ADDRESS {
        logger::warn(MSG_REGISTRY_SKIPPED_INCOMPLETE);
        return None;
    }

    logger::step(MSG_REGISTERING_EVVM);
    if let Err(err) = registry.register(target) {
        logger::warn(format!("{MSG_REGISTRY_REGISTER_FAILED}: {err:#}"));
        print_manual_steps(registry.settings, target, None);
        return None;
    }

    let id = match registry.find_evvm_id(target).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            logger::warn(MSG_REGISTRY_ID_NOT_FOUND);
            print_manual_steps(registry.settings, target, None);
            return None;
        }
        Err(err) => {
            logger::warn(format!("{MSG_REGISTRY_ID_NOT_FOUND}: {err:#}"));
            print_manual_steps(registry.settings, target, None);
            return None;
        }
    };

    if let Err(err) = registry.set_evvm_id(target, id) {
        logger::warn(format!("{MSG_REGISTRY_SET_ID_FAILED}: {err:#}"));
        print_manual_steps(registry.settings, target, Some(id));
        return None;
    }

    env.set(EVVM_ID_ENV, &id.to_string());
    logger::success(msg_evvm_id_assigned(id));
    Some(id)
}

fn print_manual_steps(settings: &RegistrySettings, target: &RegistrationTarget<'_>, id: Option<U256>) {
    let mut steps = vec![];
    if id.is_none() {
        steps.push(msg_manual_register_command(
            &settings.address,
            target.chain_id,
            target.evvm_address,
        ));
    }
    steps.push(msg_manual_set_id_command(
        target.evvm_address,
        id.map(|id| id.to_string()),
        target.rpc_url,
    ));
    logger::note("Manual registration", steps.join("\n\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_newest_ids_first() {
        let ids: Vec<U256> = (1000u64..1005).map(U256::from).collect();
        assert_eq!(
            scan_order(&ids, 3),
            vec![U256::from(1004), U256::from(1003), U256::from(1002)]
        );
        assert!(scan_order(&[], 3).is_empty());
    }

    #[test]
    fn metadata_must_match_chain_and_address() {
        let fields = vec![
            "11155111".to_string(),
            "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
        ];
        assert!(metadata_matches(
            &fields,
            11_155_111,
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        ));
        assert!(!metadata_matches(
            &fields,
            421_614,
            "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        ));
        assert!(!metadata_matches(&fields[..1], 11_155_111, "0x5FbDB2315678afecb367f032d93F642f64180aa3"));
    }

    #[tokio::test]
    async fn incomplete_deployment_is_not_registered() {
        let shell = Shell::new().unwrap();
        let dir = shell.create_temp_dir().unwrap();
        let settings = RegistrySettings::default();
        let registry = Registry::new(
            &shell,
            &settings,
            "http://127.0.0.1:1".to_string(),
            CastAuth::Account("nobody".into()),
        );
        let mut env = EnvFile::load(&shell, dir.path()).unwrap();
        let target = RegistrationTarget {
            chain_id: 11_155_111,
            evvm_address: MISSING_ADDRESS,
            rpc_url: "http://127.0.0.1:1",
        };
        assert_eq!(register_evvm(&registry, &target, &mut env).await, None);
        assert!(env.get(EVVM_ID_ENV).is_none());
    }
}

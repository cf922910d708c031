use evvm_cli_types::Framework;
use xshell::{cmd, Shell};

use crate::{cmd::Cmd, logger};

const GENERAL_PREREQUISITES: [Prerequisite; 1] = [Prerequisite {
    name: "git",
    download_link: "https://git-scm.com/book/en/v2/Getting-Started-Installing-Git",
}];

const FOUNDRY_PREREQUISITES: [Prerequisite; 3] = [
    Prerequisite {
        name: "forge",
        download_link: "https://book.getfoundry.sh/getting-started/installation",
    },
    Prerequisite {
        name: "anvil",
        download_link: "https://book.getfoundry.sh/getting-started/installation",
    },
    Prerequisite {
        name: "cast",
        download_link: "https://book.getfoundry.sh/getting-started/installation",
    },
];

const HARDHAT_PREREQUISITES: [Prerequisite; 2] = [
    Prerequisite {
        name: "node",
        download_link: "https://nodejs.org/en/download",
    },
    Prerequisite {
        name: "npx",
        download_link: "https://docs.npmjs.com/downloading-and-installing-node-js-and-npm",
    },
];

struct Prerequisite {
    name: &'static str,
    download_link: &'static str,
}

/// Tools that must exist for any command. Exits the process when one is missing.
pub fn check_general_prerequisites(shell: &Shell) {
    let missing_prerequisites: Vec<_> = GENERAL_PREREQUISITES
        .iter()
        .filter(|prerequisite| !check_prerequisite(shell, prerequisite.name))
        .collect();

    if !missing_prerequisites.is_empty() {
        logger::error("Prerequisite check has failed");
        logger::error_note(
            "The following prerequisites are missing",
            &format_missing(&missing_prerequisites),
        );
        logger::outro("Failed");
        std::process::exit(1);
    }
}

pub fn check_prerequisite(shell: &Shell, name: &str) -> bool {
    Cmd::new(cmd!(shell, "which {name}")).run().is_ok()
}

/// Which toolchains are usable on this machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameworkTools {
    pub foundry: bool,
    pub hardhat: bool,
    /// Install hints for everything that was not found.
    pub missing: Vec<String>,
}

impl FrameworkTools {
    pub fn is_available(&self, framework: Framework) -> bool {
        match framework {
            Framework::Foundry => self.foundry,
            Framework::Hardhat => self.hardhat,
        }
    }

    pub fn available(&self) -> Vec<Framework> {
        [Framework::Foundry, Framework::Hardhat]
            .into_iter()
            .filter(|framework| self.is_available(*framework))
            .collect()
    }
}

/// Probes the toolchain binaries. Missing tools narrow the set of frameworks
/// offered; they are never an error on their own.
pub fn framework_tools(shell: &Shell) -> FrameworkTools {
    let mut tools = FrameworkTools::default();
    let mut probe = |group: &[Prerequisite]| {
        let missing: Vec<_> = group
            .iter()
            .filter(|prerequisite| !check_prerequisite(shell, prerequisite.name))
            .collect();
        tools.missing.extend(
            missing
                .iter()
                .map(|prerequisite| format!("- {} ({})", prerequisite.name, prerequisite.download_link)),
        );
        missing.is_empty()
    };
    let foundry = probe(&FOUNDRY_PREREQUISITES[..]);
    let hardhat = probe(&HARDHAT_PREREQUISITES[..]);
    tools.foundry = foundry;
    tools.hardhat = hardhat;
    tools
}

fn format_missing(missing: &[&Prerequisite]) -> String {
    missing
        .iter()
        .map(|prerequisite| format!("- {} ({})", prerequisite.name, prerequisite.download_link))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_frameworks_follow_tools() {
        let tools = FrameworkTools {
            foundry: false,
            hardhat: true,
            missing: vec![],
        };
        assert_eq!(tools.available(), vec![Framework::Hardhat]);
        assert!(!tools.is_available(Framework::Foundry));
    }

    #[test]
    fn which_finds_shell() {
        let shell = Shell::new().unwrap();
        assert!(check_prerequisite(&shell, "sh"));
        assert!(!check_prerequisite(&shell, "definitely-not-a-real-binary-evvm"));
    }
}

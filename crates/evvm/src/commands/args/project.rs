use clap::Parser;
use evvm_cli_common::{logger, Prompt, PromptConfirm, PromptSelect};
use evvm_cli_config::{AddressConfig, AdvancedMetadata, BasicMetadata, DeploymentInputs};
use evvm_cli_types::{
    validate_address, validate_decimal, ContractSource, DecimalString, EvmAddress, Framework,
};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::messages::{
    msg_framework_unavailable, MSG_ACTIVATOR_PROMPT, MSG_ADMIN_PROMPT, MSG_CONTRACT_SOURCE_HELP,
    MSG_CONTRACT_SOURCE_PROMPT, MSG_DEFAULTS_HELP, MSG_ERA_TOKENS_PROMPT, MSG_EVVM_NAME_PROMPT,
    MSG_FRAMEWORK_HELP, MSG_FRAMEWORK_PROMPT, MSG_GOLDEN_FISHER_PROMPT, MSG_NO_FRAMEWORK_ERR,
    MSG_REWARD_PROMPT, MSG_TOKEN_NAME_PROMPT, MSG_TOKEN_SYMBOL_PROMPT, MSG_TOTAL_SUPPLY_PROMPT,
    MSG_USE_DEFAULTS_PROMPT,
};

/// Project choices for `init` and `config`. Anything not given as a flag is
/// asked for.
#[derive(Debug, Clone, Default, Parser)]
pub struct ProjectArgs {
    #[clap(long, help = MSG_FRAMEWORK_HELP, value_enum)]
    pub framework: Option<Framework>,
    #[clap(long, help = MSG_CONTRACT_SOURCE_HELP, value_enum)]
    pub contract_source: Option<ContractSource>,
    /// Use default values for every deployment input that is not passed
    #[clap(long, help = MSG_DEFAULTS_HELP)]
    pub defaults: bool,
    #[clap(long)]
    pub admin: Option<EvmAddress>,
    #[clap(long)]
    pub golden_fisher: Option<EvmAddress>,
    #[clap(long)]
    pub activator: Option<EvmAddress>,
    #[clap(long)]
    pub evvm_name: Option<String>,
    #[clap(long)]
    pub token_name: Option<String>,
    #[clap(long)]
    pub token_symbol: Option<String>,
    #[clap(long)]
    pub total_supply: Option<DecimalString>,
    #[clap(long)]
    pub era_tokens: Option<DecimalString>,
    #[clap(long)]
    pub reward: Option<DecimalString>,
}

#[derive(Debug, Clone)]
pub struct ProjectArgsFinal {
    pub framework: Framework,
    pub contract_source: ContractSource,
    pub inputs: DeploymentInputs,
}

/// Blank answers pass so that `ask_required` can turn them into a cancellation.
pub fn address_input_validator(input: &str) -> Result<(), String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }
    validate_address(input).map_err(|err| err.to_string())
}

pub fn decimal_input_validator(input: &str) -> Result<(), String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(());
    }
    validate_decimal(input).map_err(|err| err.to_string())
}

fn ask_address(question: &str, default: &EvmAddress) -> anyhow::Result<EvmAddress> {
    let answer = Prompt::new(question)
        .placeholder(&default.to_string())
        .validate_with(|input: &String| address_input_validator(input))
        .ask_required()?;
    Ok(answer.parse()?)
}

fn ask_decimal(question: &str, default: &DecimalString) -> anyhow::Result<DecimalString> {
    let answer = Prompt::new(question)
        .placeholder(default.as_str())
        .validate_with(|input: &String| decimal_input_validator(input))
        .ask_required()?;
    Ok(answer.parse()?)
}

fn ask_text(question: &str, default: &str) -> anyhow::Result<String> {
    Prompt::new(question).placeholder(default).ask_required()
}

impl ProjectArgs {
    /// `available` lists the frameworks whose tools are installed.
    /// `previous` seeds defaults when reconfiguring.
    pub fn fill_values_with_prompt(
        self,
        available: &[Framework],
        previous: Option<(Framework, ContractSource, DeploymentInputs)>,
    ) -> anyhow::Result<ProjectArgsFinal> {
        let (prev_framework, prev_source, prev_inputs) = match previous {
            Some((framework, source, inputs)) => (Some(framework), Some(source), inputs),
            None => (None, None, DeploymentInputs::default()),
        };

        let framework = match self.framework {
            Some(framework) => {
                if !available.contains(&framework) {
                    anyhow::bail!(msg_framework_unavailable(framework));
                }
                framework
            }
            None => match available {
                [] => anyhow::bail!(MSG_NO_FRAMEWORK_ERR),
                [only] => *only,
                _ => {
                    let mut items = available.to_vec();
                    if let Some(prev) = prev_framework.filter(|f| available.contains(f)) {
                        items.retain(|f| *f != prev);
                        items.insert(0, prev);
                    }
                    PromptSelect::new(MSG_FRAMEWORK_PROMPT, items).ask()?
                }
            },
        };

        let contract_source = match self.contract_source {
            Some(source) => source,
            None => {
                let mut items: Vec<_> = ContractSource::iter().collect();
                if let Some(prev) = prev_source {
                    items.retain(|s| *s != prev);
                    items.insert(0, prev);
                }
                PromptSelect::new(MSG_CONTRACT_SOURCE_PROMPT, items).ask()?
            }
        };

        let use_defaults = self.defaults
            || PromptConfirm::new(MSG_USE_DEFAULTS_PROMPT)
                .default(true)
                .ask()?;

        let base = prev_inputs;
        let inputs = if use_defaults {
            self.apply_flags(base)
        } else {
            self.prompt_inputs(base)?
        };

        Ok(ProjectArgsFinal {
            framework,
            contract_source,
            inputs,
        })
    }

    /// Flags override `base` field by field.
    fn apply_flags(&self, base: DeploymentInputs) -> DeploymentInputs {
        let DeploymentInputs {
            addresses,
            basic,
            advanced,
        } = base;
        DeploymentInputs {
            addresses: AddressConfig {
                admin: self.admin.unwrap_or(addresses.admin),
                golden_fisher: self.golden_fisher.unwrap_or(addresses.golden_fisher),
                activator: self.activator.unwrap_or(addresses.activator),
            },
            basic: BasicMetadata {
                evvm_name: self.evvm_name.clone().unwrap_or(basic.evvm_name),
                principal_token_name: self.token_name.clone().unwrap_or(basic.principal_token_name),
                principal_token_symbol: self
                    .token_symbol
                    .clone()
                    .unwrap_or(basic.principal_token_symbol),
            },
            advanced: AdvancedMetadata {
                era_tokens: self.era_tokens.clone().unwrap_or(advanced.era_tokens),
                reward: self.reward.clone().unwrap_or(advanced.reward),
                total_supply: self.total_supply.clone().unwrap_or(advanced.total_supply),
            },
        }
    }

    /// Asks for every input not passed as a flag. A blank answer cancels.
    fn prompt_inputs(&self, base: DeploymentInputs) -> anyhow::Result<DeploymentInputs> {
        let admin = match self.admin {
            Some(admin) => admin,
            None => ask_address(MSG_ADMIN_PROMPT, &base.addresses.admin)?,
        };
        let golden_fisher = match self.golden_fisher {
            Some(address) => address,
            None => ask_address(MSG_GOLDEN_FISHER_PROMPT, &base.addresses.golden_fisher)?,
        };
        let activator = match self.activator {
            Some(address) => address,
            None => ask_address(MSG_ACTIVATOR_PROMPT, &base.addresses.activator)?,
        };
        let evvm_name = match &self.evvm_name {
            Some(name) => name.clone(),
            None => ask_text(MSG_EVVM_NAME_PROMPT, &base.basic.evvm_name)?,
        };
        let principal_token_name = match &self.token_name {
            Some(name) => name.clone(),
            None => ask_text(MSG_TOKEN_NAME_PROMPT, &base.basic.principal_token_name)?,
        };
        let principal_token_symbol = match &self.token_symbol {
            Some(symbol) => symbol.clone(),
            None => ask_text(MSG_TOKEN_SYMBOL_PROMPT, &base.basic.principal_token_symbol)?,
        };
        let total_supply = match &self.total_supply {
            Some(value) => value.clone(),
            None => ask_decimal(MSG_TOTAL_SUPPLY_PROMPT, &base.advanced.total_supply)?,
        };
        let era_tokens = match &self.era_tokens {
            Some(value) => value.clone(),
            None => ask_decimal(MSG_ERA_TOKENS_PROMPT, &base.advanced.era_tokens)?,
        };
        let reward = match &self.reward {
            Some(value) => value.clone(),
            None => ask_decimal(MSG_REWARD_PROMPT, &base.advanced.reward)?,
        };

        Ok(DeploymentInputs {
            addresses: AddressConfig {
                admin,
                golden_fisher,
                activator,
            },
            basic: BasicMetadata {
                evvm_name,
                principal_token_name,
                principal_token_symbol,
            },
            advanced: AdvancedMetadata {
                era_tokens,
                reward,
                total_supply,
            },
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSummary<'a> {
    framework: String,
    contract_source: String,
    addresses: &'a AddressConfig,
    basic_metadata: &'a BasicMetadata,
    advanced_metadata: AdvancedSummary<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdvancedSummary<'a> {
    total_supply: &'a str,
    era_tokens: &'a str,
    reward: &'a str,
}

impl ProjectArgsFinal {
    pub fn log_summary(&self, title: &str) {
        let summary = ProjectSummary {
            framework: self.framework.to_string(),
            contract_source: self.contract_source.to_string(),
            addresses: &self.inputs.addresses,
            basic_metadata: &self.inputs.basic,
            advanced_metadata: AdvancedSummary {
                total_supply: self.inputs.advanced.total_supply.as_str(),
                era_tokens: self.inputs.advanced.era_tokens.as_str(),
                reward: self.inputs.advanced.reward.as_str(),
            },
        };
        logger::note(title, logger::object_to_string(summary));
    }
}

use strum::EnumIter;

/// Contracts produced by an EVVM deployment, named as they appear in the
/// deployment artifacts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, strum::Display)]
pub enum EvvmContract {
    Evvm,
    Staking,
    Estimator,
    NameService,
    Treasury,
    P2PSwap,
}

impl EvvmContract {
    /// `contractName` recorded in broadcast and deployment files.
    #[must_use]
    pub fn artifact_name(&self) -> &'static str {
        match self {
            EvvmContract::Evvm => "Evvm",
            EvvmContract::Staking => "Staking",
            EvvmContract::Estimator => "Estimator",
            EvvmContract::NameService => "NameService",
            EvvmContract::Treasury => "Treasury",
            EvvmContract::P2PSwap => "P2PSwap",
        }
    }

    /// Optional contracts are not deployed by every contract source.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self, EvvmContract::P2PSwap)
    }

    /// Frontend variable holding the deployed address.
    #[must_use]
    pub fn env_key(&self) -> &'static str {
        match self {
            EvvmContract::Evvm => "NEXT_PUBLIC_EVVM_ADDRESS",
            EvvmContract::Staking => "NEXT_PUBLIC_STAKING_ADDRESS",
            EvvmContract::Estimator => "NEXT_PUBLIC_ESTIMATOR_ADDRESS",
            EvvmContract::NameService => "NEXT_PUBLIC_NAMESERVICE_ADDRESS",
            EvvmContract::Treasury => "NEXT_PUBLIC_TREASURY_ADDRESS",
            EvvmContract::P2PSwap => "NEXT_PUBLIC_P2PSWAP_ADDRESS",
        }
    }
}

// Session Context - Who is acting, against which contract, with which settings

use super::config::{ClientConfig, ConfigError};
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;

/// Explicit session state handed to the transaction manager and readers
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    account: Address,
    contract: Address,
    config: ClientConfig,
}

impl SessionContext {
    /// Create a context with the default configuration
    pub fn new(account: Address, contract: Address) -> Self {
        Self {
            account,
            contract,
            config: ClientConfig::default(),
        }
    }

    /// Replace the configuration, validating it first
    pub fn with_config(mut self, config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Connected wallet account
    pub fn account(&self) -> Address {
        self.account
    }

    /// Social contract address
    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// EIP-55 form of the account, for logs and display
    pub fn account_checksum(&self) -> String {
        to_checksum(&self.account, None)
    }
}

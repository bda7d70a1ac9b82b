// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Stablecoin (ERC-20) bindings used by the burn and balance paths
//!
//! Reads go straight to the chain; writes are returned as unsigned
//! [`TransactionRequest`]s that the caller's provider signs and sends.

use alloy_network::Ethereum;
use alloy_primitives::{Address, U256};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::sol;
use tracing::{debug, info};

use Stablecoin::StablecoinInstance;

/// USDC contract wrapper
///
/// # Example
///
/// ```rust,no_run
/// use cctp_transfer::StablecoinContract;
/// use alloy_primitives::address;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new().connect("http://localhost:8545").await?;
/// let usdc = address!("1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
///
/// let token = StablecoinContract::new(usdc, provider);
/// let owner = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
/// let balance = token.balance_of(owner).await?;
/// # Ok(())
/// # }
/// ```
pub struct StablecoinContract<P: Provider<Ethereum>> {
    instance: StablecoinInstance<P>,
}

impl<P: Provider<Ethereum>> StablecoinContract<P> {
    pub fn new(address: Address, provider: P) -> Self {
        debug!(
            contract_address = %address,
            event = "stablecoin_contract_initialized"
        );
        Self {
            instance: StablecoinInstance::new(address, provider),
        }
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, alloy_contract::Error> {
        debug!(
            owner = %owner,
            spender = %spender,
            contract_address = %self.instance.address(),
            event = "checking_allowance"
        );

        let result = self.instance.allowance(owner, spender).call().await?;

        info!(
            owner = %owner,
            spender = %spender,
            allowance = %result,
            contract_address = %self.instance.address(),
            event = "allowance_retrieved"
        );

        Ok(result)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, alloy_contract::Error> {
        debug!(
            account = %account,
            contract_address = %self.instance.address(),
            event = "checking_balance"
        );

        let result = self.instance.balanceOf(account).call().await?;

        info!(
            account = %account,
            balance = %result,
            contract_address = %self.instance.address(),
            event = "balance_retrieved"
        );

        Ok(result)
    }

    pub async fn decimals(&self) -> Result<u8, alloy_contract::Error> {
        let result = self.instance.decimals().call().await?;

        debug!(
            decimals = result,
            contract_address = %self.instance.address(),
            event = "decimals_retrieved"
        );

        Ok(result)
    }

    /// Unsigned `approve(spender, amount)` transaction from `from`.
    pub fn approve_transaction(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> TransactionRequest {
        info!(
            from = %from,
            spender = %spender,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "approve_transaction_created"
        );

        self.instance
            .approve(spender, amount)
            .from(from)
            .into_transaction_request()
    }

    /// Unsigned `transfer(to, amount)` transaction from `from`.
    pub fn transfer_transaction(&self, from: Address, to: Address, amount: U256) -> TransactionRequest {
        info!(
            from = %from,
            to = %to,
            amount = %amount,
            contract_address = %self.instance.address(),
            event = "transfer_transaction_created"
        );

        self.instance
            .transfer(to, amount)
            .from(from)
            .into_transaction_request()
    }

    pub fn address(&self) -> Address {
        *self.instance.address()
    }
}

sol!(
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract Stablecoin {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function transfer(address to, uint256 amount) external returns (bool);
    }
);

// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Testnet transfer: Sepolia → Arbitrum Sepolia
//!
//! Performs a real USDC transfer and prints each phase as it completes.
//!
//! Prerequisites:
//! - Sepolia ETH for gas and Sepolia USDC from Circle faucet (https://faucet.circle.com/)
//! - Arbitrum Sepolia ETH for the mint
//!
//! Environment variables (set these in .env file):
//! - TESTNET_PRIVATE_KEY: Wallet private key (0x-prefixed), used on both chains
//! - SEPOLIA_RPC_URL / ARBITRUM_SEPOLIA_RPC_URL: RPC endpoints
//! - TRANSFER_AMOUNT: (optional) USDC to move, default `1`
//! - CIRCLE_API_KEY / ATTESTATION_API_URL: (optional) attestation service settings
//!
//! Run with: `RUST_LOG=cctp_transfer=debug cargo run --example testnet_transfer`

use std::sync::Arc;

use alloy_network::EthereumWallet;
use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use cctp_transfer::providers::AlloyChainGateway;
use cctp_transfer::{
    ClientConfig, NetworkId, NetworkRegistry, TransferClient, TransferError, TransferRequest,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const FROM: NetworkId = NetworkId::Sepolia;
const TO: NetworkId = NetworkId::ArbitrumSepolia;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Also loads .env
    let config = ClientConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🧪 CCTP Testnet Transfer: {FROM} → {TO}");
    println!("==========================================\n");

    let signer: PrivateKeySigner = std::env::var("TESTNET_PRIVATE_KEY")
        .expect("TESTNET_PRIVATE_KEY must be set in .env file")
        .parse()
        .expect("Invalid TESTNET_PRIVATE_KEY format");
    let wallet_address = signer.address();
    let amount = std::env::var("TRANSFER_AMOUNT").unwrap_or_else(|_| "1".to_string());

    let source_rpc = config
        .rpc_urls
        .get(&FROM)
        .cloned()
        .expect("SEPOLIA_RPC_URL must be set");
    let destination_rpc = config
        .rpc_urls
        .get(&TO)
        .cloned()
        .expect("ARBITRUM_SEPOLIA_RPC_URL must be set");

    println!("📍 Configuration:");
    println!("   Wallet: {wallet_address}");
    println!("   Amount: {amount} USDC");
    println!("   Attestation API: {}\n", config.attestation_api_url);

    let registry = Arc::new(NetworkRegistry::testnets());
    let client = TransferClient::connect(&config, registry.clone());

    let wallet = EthereumWallet::from(signer);
    let source = AlloyChainGateway::new(
        registry.get(FROM)?,
        ProviderBuilder::new()
            .wallet(wallet.clone())
            .connect_http(source_rpc),
    )
    .with_confirmations(config.confirmations)
    .with_receipt_timeout(config.receipt_timeout);
    let destination = AlloyChainGateway::new(
        registry.get(TO)?,
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(destination_rpc),
    )
    .with_confirmations(config.confirmations)
    .with_receipt_timeout(config.receipt_timeout);

    let cancel = CancellationToken::new();

    println!("1️⃣  Balances before:");
    print_balances(&client, &wallet_address.to_string(), &cancel).await;

    println!("\n2️⃣  Quote:");
    let quote = client.get_quote(&amount, FROM, TO)?;
    println!("   {} → {} USDC", quote.input_amount, quote.output_amount);
    println!("   Estimated time: {}", quote.estimated_time);
    println!("   Estimated gas: {} USDC, bridge fee: {}", quote.fees, quote.bridge_fee);

    let request = TransferRequest::builder()
        .amount(amount)
        .from_network(FROM)
        .to_network(TO)
        .recipient(wallet_address)
        .build();

    println!("\n3️⃣  Burning on {FROM}...");
    let mut transfer = match client.initiate_burn(&request, wallet_address, &source).await {
        Ok(transfer) => transfer,
        Err(TransferError::InsufficientBalance {
            required,
            available,
        }) => {
            println!("   ❌ Need {required} base units, wallet holds {available}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("   ✅ Burn tx: {}", transfer.source_tx_hash());
    println!("   Message hash: {}", transfer.message_hash());
    if let Some(nonce) = transfer.nonce() {
        println!("   Nonce: {nonce}");
    }

    println!(
        "\n4️⃣  Waiting for attestation (up to {}s)...",
        client.polling().total_timeout_secs()
    );
    let attestation = client
        .fetch_attestation(transfer.message_hash(), &cancel)
        .await?;
    transfer.record_attestation(attestation)?;
    println!("   ✅ Attested");

    println!("\n5️⃣  Minting on {TO}...");
    let mint_tx = client
        .complete_transfer(&mut transfer, wallet_address, &destination)
        .await?;
    println!("   ✅ Mint tx: {mint_tx}");
    println!("   Status: {}", transfer.status());

    println!("\n6️⃣  Balances after:");
    print_balances(&client, &wallet_address.to_string(), &cancel).await;

    Ok(())
}

async fn print_balances(client: &TransferClient, address: &str, cancel: &CancellationToken) {
    for network in [FROM, TO] {
        let reading = client
            .get_usdc_balance(address, network.as_str(), cancel)
            .await;
        match reading.reason {
            Some(reason) => println!("   {network}: unknown ({reason})"),
            None => println!("   {network}: {} USDC", reading.amount),
        }
    }
}

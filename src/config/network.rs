//! Static registry of supported Functions networks.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{address, Address};

use crate::error::FunctionsError;

const TESTNET_GATEWAYS: &[&str] = &[
    "https://01.functions-gateway.testnet.chain.link/",
    "https://02.functions-gateway.testnet.chain.link/",
];

/// On-chain addresses and off-chain endpoints of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// EVM chain id the RPC endpoint must report.
    pub chain_id: u64,
    /// Functions router contract.
    pub router: Address,
    /// LINK token contract.
    pub link_token: Address,
    /// DON identifier registered on the router.
    pub don_id: &'static str,
    /// DON gateways accepting secrets uploads, in preference order.
    pub gateway_urls: &'static [&'static str],
    /// Block explorer base URL.
    pub explorer_url: &'static str,
    /// Environment variable holding the RPC URL.
    pub rpc_url_var: &'static str,
}

impl ChainConfig {
    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: impl fmt::Display) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

static POLYGON_MUMBAI: ChainConfig = ChainConfig {
    chain_id: 80001,
    router: address!("6E2dc0F9DB014aE19888F539E59285D2Ea04244C"),
    link_token: address!("326C977E6efc84E512bB9C30f76E30c160eD06FB"),
    don_id: "fun-polygon-mumbai-1",
    gateway_urls: TESTNET_GATEWAYS,
    explorer_url: "https://mumbai.polygonscan.com",
    rpc_url_var: "POLYGON_MUMBAI_RPC_URL",
};

static POLYGON_AMOY: ChainConfig = ChainConfig {
    chain_id: 80002,
    router: address!("C22a79eBA640940ABB6dF0f7982cc119578E11De"),
    link_token: address!("0Fd9e8d3aF1aaee056EB9e802c3A762a667b1904"),
    don_id: "fun-polygon-amoy-1",
    gateway_urls: TESTNET_GATEWAYS,
    explorer_url: "https://amoy.polygonscan.com",
    rpc_url_var: "POLYGON_AMOY_RPC_URL",
};

static ETHEREUM_SEPOLIA: ChainConfig = ChainConfig {
    chain_id: 11155111,
    router: address!("b83E47C2bC239B3bf370bc41e1459A34b41238D0"),
    link_token: address!("779877A7B0D9E8603169DdbD7836e478b4624789"),
    don_id: "fun-ethereum-sepolia-1",
    gateway_urls: TESTNET_GATEWAYS,
    explorer_url: "https://sepolia.etherscan.io",
    rpc_url_var: "ETHEREUM_SEPOLIA_RPC_URL",
};

static AVALANCHE_FUJI: ChainConfig = ChainConfig {
    chain_id: 43113,
    router: address!("A9d587a00A31A52Ed70D6026794a8FC5E2F5dCb0"),
    link_token: address!("0b9d5D9136855f6FEc3c0993feE6E9CE8a297846"),
    don_id: "fun-avalanche-fuji-1",
    gateway_urls: TESTNET_GATEWAYS,
    explorer_url: "https://testnet.snowtrace.io",
    rpc_url_var: "AVALANCHE_FUJI_RPC_URL",
};

/// Supported chain identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    PolygonMumbai,
    PolygonAmoy,
    EthereumSepolia,
    AvalancheFuji,
}

impl Chain {
    /// Every supported chain, in display order.
    pub const ALL: [Chain; 4] = [
        Chain::PolygonMumbai,
        Chain::PolygonAmoy,
        Chain::EthereumSepolia,
        Chain::AvalancheFuji,
    ];

    /// Identifier used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::PolygonMumbai => "polygonMumbai",
            Chain::PolygonAmoy => "polygonAmoy",
            Chain::EthereumSepolia => "ethereumSepolia",
            Chain::AvalancheFuji => "avalancheFuji",
        }
    }

    /// Static configuration of this chain.
    pub fn config(&self) -> &'static ChainConfig {
        match self {
            Chain::PolygonMumbai => &POLYGON_MUMBAI,
            Chain::PolygonAmoy => &POLYGON_AMOY,
            Chain::EthereumSepolia => &ETHEREUM_SEPOLIA,
            Chain::AvalancheFuji => &AVALANCHE_FUJI,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = FunctionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == s)
            .ok_or_else(|| FunctionsError::UnsupportedChain(s.to_string()))
    }
}

/// Resolve a chain identifier to its configuration.
pub fn resolve(chain_id: &str) -> Result<&'static ChainConfig, FunctionsError> {
    chain_id.parse::<Chain>().map(|chain| chain.config())
}

//! Configuration Management Module
//!
//! Loads and validates the engine's host configuration: the swap allow-list
//! and the per-provider destination tables consumed through the resolver.
//! Configuration is TOML; addresses, selectors, and chain ids travel as
//! strings and are parsed and checked before the engine sees them.

use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use bridge_common::{parse_address, ChainId, Selector};
use ethereum_types::Address;

use crate::resolver::{DestinationParams, StaticResolver};

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure for the engine host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Swap executor allow-list
    #[serde(default)]
    pub allowlist: AllowListConfig,
    /// Per-provider tables, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderTable>,
}

/// Approved swap targets and selectors, as 0x-hex strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowListConfig {
    /// Approved call target addresses
    #[serde(default)]
    pub targets: Vec<String>,
    /// Approved function selectors
    #[serde(default)]
    pub selectors: Vec<String>,
}

/// Configuration of one bridge provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderTable {
    /// Trusted inbound relay address handed to the provider's initializer
    #[serde(default)]
    pub relay: Option<String>,
    /// Destination tables, keyed by decimal chain id
    #[serde(default)]
    pub destinations: HashMap<String, DestinationConfig>,
}

/// Per-destination parameters for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Local entry point of the provider's bridge for this destination
    pub router: String,
    /// Asset relay fees are denominated in; omitted for the native asset
    #[serde(default)]
    pub fee_asset: Option<String>,
    /// Sending asset address -> provider pool identifier
    #[serde(default)]
    pub pools: HashMap<String, u64>,
    /// Provider messaging-layer identifier of the destination chain
    #[serde(default)]
    pub messaging_chain_id: u16,
    /// Auxiliary provider contracts for this destination
    #[serde(default)]
    pub aux_addresses: Vec<String>,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl EngineConfig {
    /// Loads configuration from the TOML file.
    ///
    /// Honors the `BRIDGE_ENGINE_CONFIG_PATH` environment variable, falling
    /// back to `config/engine.toml`. Fails with a pointer to the template if
    /// the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("BRIDGE_ENGINE_CONFIG_PATH")
            .unwrap_or_else(|_| "config/engine.toml".to_string());

        if !std::path::Path::new(&config_path).exists() {
            anyhow::bail!(
                "Configuration file {} not found. Copy config/engine.toml.template and fill in your network tables.",
                config_path
            );
        }
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path))?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: EngineConfig =
            toml::from_str(content).context("Failed to parse engine configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every address, selector, and chain id in the configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - A malformed entry, with its location
    pub fn validate(&self) -> anyhow::Result<()> {
        for target in &self.allowlist.targets {
            parse_address(target)
                .map_err(|e| anyhow::anyhow!("Invalid allow-list target {}: {}", target, e))?;
        }
        for selector in &self.allowlist.selectors {
            selector
                .parse::<Selector>()
                .map_err(|e| anyhow::anyhow!("Invalid allow-list selector {}: {}", selector, e))?;
        }

        for (provider, table) in &self.providers {
            if let Some(relay) = &table.relay {
                parse_address(relay).map_err(|e| {
                    anyhow::anyhow!("Invalid relay for provider {}: {}", provider, e)
                })?;
            }
            for (chain_key, dest) in &table.destinations {
                let chain_id: ChainId = chain_key.parse().map_err(|_| {
                    anyhow::anyhow!(
                        "Invalid chain id key '{}' for provider {}",
                        chain_key,
                        provider
                    )
                })?;
                let router = parse_address(&dest.router).map_err(|e| {
                    anyhow::anyhow!(
                        "Invalid router for provider {} chain {}: {}",
                        provider,
                        chain_id,
                        e
                    )
                })?;
                if router.is_zero() {
                    anyhow::bail!(
                        "Zero router address for provider {} chain {}",
                        provider,
                        chain_id
                    );
                }
                if let Some(fee_asset) = &dest.fee_asset {
                    parse_address(fee_asset).map_err(|e| {
                        anyhow::anyhow!(
                            "Invalid fee asset for provider {} chain {}: {}",
                            provider,
                            chain_id,
                            e
                        )
                    })?;
                }
                for asset in dest.pools.keys() {
                    parse_address(asset).map_err(|e| {
                        anyhow::anyhow!(
                            "Invalid pool asset for provider {} chain {}: {}",
                            provider,
                            chain_id,
                            e
                        )
                    })?;
                }
                for aux in &dest.aux_addresses {
                    parse_address(aux).map_err(|e| {
                        anyhow::anyhow!(
                            "Invalid auxiliary address for provider {} chain {}: {}",
                            provider,
                            chain_id,
                            e
                        )
                    })?;
                }
            }
        }
        Ok(())
    }

    /// Parsed allow-list targets.
    pub fn approved_targets(&self) -> anyhow::Result<Vec<Address>> {
        self.allowlist
            .targets
            .iter()
            .map(|s| parse_address(s).map_err(|e| anyhow::anyhow!("{}: {}", s, e)))
            .collect()
    }

    /// Parsed allow-list selectors.
    pub fn approved_selectors(&self) -> anyhow::Result<Vec<Selector>> {
        self.allowlist
            .selectors
            .iter()
            .map(|s| {
                s.parse::<Selector>()
                    .map_err(|e| anyhow::anyhow!("{}: {}", s, e))
            })
            .collect()
    }

    /// Parsed trusted relay for one provider, if configured.
    pub fn provider_relay(&self, provider: &str) -> anyhow::Result<Option<Address>> {
        match self.providers.get(provider).and_then(|t| t.relay.as_ref()) {
            Some(relay) => {
                let address = parse_address(relay)
                    .map_err(|e| anyhow::anyhow!("Invalid relay for {}: {}", provider, e))?;
                Ok(Some(address))
            }
            None => Ok(None),
        }
    }

    /// Builds the static destination resolver from the provider tables.
    pub fn resolver(&self) -> anyhow::Result<StaticResolver> {
        let mut resolver = StaticResolver::new();
        for (provider, table) in &self.providers {
            for (chain_key, dest) in &table.destinations {
                let chain_id: ChainId = chain_key
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Invalid chain id key '{}'", chain_key))?;
                let mut pools = HashMap::new();
                for (asset, pool_id) in &dest.pools {
                    pools.insert(
                        parse_address(asset).map_err(|e| anyhow::anyhow!("{}: {}", asset, e))?,
                        *pool_id,
                    );
                }
                let mut aux_addresses = Vec::new();
                for aux in &dest.aux_addresses {
                    aux_addresses
                        .push(parse_address(aux).map_err(|e| anyhow::anyhow!("{}: {}", aux, e))?);
                }
                let fee_asset = match &dest.fee_asset {
                    Some(s) => parse_address(s).map_err(|e| anyhow::anyhow!("{}: {}", s, e))?,
                    None => Address::zero(),
                };
                resolver.insert(
                    provider,
                    chain_id,
                    DestinationParams {
                        router: parse_address(&dest.router)
                            .map_err(|e| anyhow::anyhow!("{}: {}", dest.router, e))?,
                        fee_asset,
                        pools,
                        messaging_chain_id: dest.messaging_chain_id,
                        aux_addresses,
                    },
                );
            }
        }
        Ok(resolver)
    }
}

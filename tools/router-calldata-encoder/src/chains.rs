//! Known deployments of the Universal Router and the wrapped-native token per chain.

use alloy_primitives::{address, Address};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainPreset {
    pub chain_id: u64,
    pub name: &'static str,
    pub universal_router: Address,
    pub wrapped_native: Address,
}

pub const PRESETS: &[ChainPreset] = &[
    ChainPreset {
        chain_id: 1,
        name: "mainnet",
        universal_router: address!("66a9893cc07d91d95644aedd05d03f95e1dba8af"),
        wrapped_native: address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
    },
    ChainPreset {
        chain_id: 11_155_111,
        name: "sepolia",
        universal_router: address!("3a9d48ab9751398bbfa63ad67599bb04e4bdf98b"),
        wrapped_native: address!("fff9976782d46cc05630d1f6ebab18b2324d6b14"),
    },
    ChainPreset {
        chain_id: 8453,
        name: "base",
        universal_router: address!("6ff5693b99212da76ad316178a184ab56d299b43"),
        wrapped_native: address!("4200000000000000000000000000000000000006"),
    },
    ChainPreset {
        chain_id: 42_161,
        name: "arbitrum",
        universal_router: address!("a51afafe0263b40edaef0df8781ea9aa03e381a3"),
        wrapped_native: address!("82af49447d8a07e3bd95bd0d56f35241523fbab1"),
    },
];

pub fn preset_for_chain(chain_id: u64) -> Option<&'static ChainPreset> {
    PRESETS.iter().find(|p| p.chain_id == chain_id)
}

pub fn preset_by_name(name: &str) -> Option<&'static ChainPreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_and_name_agree() {
        let by_id = preset_for_chain(8453).unwrap();
        let by_name = preset_by_name("Base").unwrap();
        assert_eq!(by_id, by_name);
        assert!(preset_for_chain(999_999).is_none());
    }
}

use std::env;

use netif_driver::ETH_PAD_SIZE;
use thiserror::Error;

/// Largest pad region accepted from configuration.
pub const MAX_PAD_SIZE: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("{var}={value} exceeds the maximum of {max}")]
    OutOfRange {
        var: &'static str,
        value: usize,
        max: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RndisNetifConfig {
    /// Leading pad bytes the stack reserves in every pbuf. Must match the stack's build.
    pub pad_size: usize,

    /// Maximum number of frames drained from the device per receive poll.
    ///
    /// `None` drains everything the device has queued. Frames over the budget stay queued in the
    /// device until the next poll.
    pub max_rx_frames_per_poll: Option<usize>,
}

impl Default for RndisNetifConfig {
    fn default() -> Self {
        Self {
            pad_size: ETH_PAD_SIZE,
            max_rx_frames_per_poll: None,
        }
    }
}

impl RndisNetifConfig {
    pub const ENV_PAD_SIZE: &'static str = "RNDIS_NETIF_PAD_SIZE";
    pub const ENV_MAX_RX_FRAMES_PER_POLL: &'static str = "RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL";

    /// Load overrides from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`RndisNetifConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(pad_size) = parse_usize(&lookup, Self::ENV_PAD_SIZE)? {
            if pad_size > MAX_PAD_SIZE {
                return Err(ConfigError::OutOfRange {
                    var: Self::ENV_PAD_SIZE,
                    value: pad_size,
                    max: MAX_PAD_SIZE,
                });
            }
            cfg.pad_size = pad_size;
        }

        // 0 means "no budget", same as leaving the variable unset.
        if let Some(max) = parse_usize(&lookup, Self::ENV_MAX_RX_FRAMES_PER_POLL)? {
            cfg.max_rx_frames_per_poll = (max != 0).then_some(max);
        }

        Ok(cfg)
    }
}

fn parse_usize<F>(lookup: &F, var: &'static str) -> Result<Option<usize>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<usize>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset_or_blank() {
        assert_eq!(
            RndisNetifConfig::from_lookup(lookup(&[])),
            Ok(RndisNetifConfig::default())
        );
        let cfg = RndisNetifConfig::from_lookup(lookup(&[
            ("RNDIS_NETIF_PAD_SIZE", "  "),
            ("RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL", ""),
        ]))
        .unwrap();
        assert_eq!(cfg.pad_size, ETH_PAD_SIZE);
        assert_eq!(cfg.max_rx_frames_per_poll, None);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = RndisNetifConfig::from_lookup(lookup(&[
            ("RNDIS_NETIF_PAD_SIZE", "0"),
            ("RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL", " 8 "),
        ]))
        .unwrap();
        assert_eq!(cfg.pad_size, 0);
        assert_eq!(cfg.max_rx_frames_per_poll, Some(8));

        let cfg = RndisNetifConfig::from_lookup(lookup(&[(
            "RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL",
            "0",
        )]))
        .unwrap();
        assert_eq!(cfg.max_rx_frames_per_poll, None);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert_eq!(
            RndisNetifConfig::from_lookup(lookup(&[("RNDIS_NETIF_PAD_SIZE", "two")])),
            Err(ConfigError::InvalidValue {
                var: "RNDIS_NETIF_PAD_SIZE",
                value: "two".to_string(),
            })
        );
        assert_eq!(
            RndisNetifConfig::from_lookup(lookup(&[("RNDIS_NETIF_PAD_SIZE", "65")])),
            Err(ConfigError::OutOfRange {
                var: "RNDIS_NETIF_PAD_SIZE",
                value: 65,
                max: MAX_PAD_SIZE,
            })
        );
        assert!(RndisNetifConfig::from_lookup(lookup(&[(
            "RNDIS_NETIF_MAX_RX_FRAMES_PER_POLL",
            "-1",
        )]))
        .is_err());
    }
}

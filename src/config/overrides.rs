use super::PitchsyncConfig;
use tracing::warn;

pub const SERVER_URL_VAR: &str = "PITCHSYNC_SERVER_URL";
pub const VISION_TIMEOUT_VAR: &str = "PITCHSYNC_VISION_TIMEOUT_MS";

/// Apply env var overrides on top of a loaded config.
pub fn apply_env_overrides(config: &mut PitchsyncConfig) {
    apply_overrides(config, |name| std::env::var(name).ok());
}

fn apply_overrides(config: &mut PitchsyncConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(SERVER_URL_VAR) {
        if !url.is_empty() {
            config.channel.url = url;
        }
    }
    if let Some(v) = lookup(VISION_TIMEOUT_VAR) {
        match v.parse::<u64>() {
            Ok(ms) if ms > 0 => config.watchdog.vision_timeout_ms = ms,
            _ => warn!(value = %v, "Ignoring invalid {}", VISION_TIMEOUT_VAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_overrides_applied() {
        let mut config = PitchsyncConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[
                (SERVER_URL_VAR, "ws://10.0.0.2:5000/socket.io/?EIO=4&transport=websocket"),
                (VISION_TIMEOUT_VAR, "1200"),
            ]),
        );
        assert_eq!(
            config.channel.url,
            "ws://10.0.0.2:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(config.watchdog.vision_timeout_ms, 1200);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = PitchsyncConfig::default();
        apply_overrides(
            &mut config,
            lookup_from(&[(SERVER_URL_VAR, ""), (VISION_TIMEOUT_VAR, "zero")]),
        );
        assert_eq!(config.channel.url, PitchsyncConfig::default().channel.url);
        assert_eq!(config.watchdog.vision_timeout_ms, 3000);

        apply_overrides(&mut config, lookup_from(&[(VISION_TIMEOUT_VAR, "0")]));
        assert_eq!(config.watchdog.vision_timeout_ms, 3000);
    }

    #[test]
    fn test_no_overrides() {
        let mut config = PitchsyncConfig::default();
        apply_overrides(&mut config, lookup_from(&[]));
        assert_eq!(config.watchdog.vision_timeout_ms, 3000);
    }
}

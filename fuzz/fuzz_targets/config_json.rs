#![no_main]

use libfuzzer_sys::fuzz_target;
use podchurn::config::types::ConfigFile;

fuzz_target!(|data: &[u8]| {
    let parsed: Option<ConfigFile> = serde_json::from_slice(data).ok();
    let applied = podchurn::fuzzing::apply_config_from_json(data);
    if applied.is_ok() {
        if let Some(config) = parsed {
            debug_assert!(config.time != Some(0));
            debug_assert!(config.rounds != Some(0));
        }
    }
});

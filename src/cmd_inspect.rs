//! Offline subcommands: rules, provider registry and configuration checks.

use std::path::Path;

use anyhow::bail;

use tabgrouper_config::{ConfigValidator, Config};
use tabgrouper_protocols::Tab;
use tabgrouper_providers::credentials::env_key_present;
use tabgrouper_providers::{ProcessEnv, descriptors, lookup, provider_ids};
use tabgrouper_runtime::RulesClassifier;

use crate::load_config;

pub(crate) fn classify(url: &str, title: &str) -> anyhow::Result<()> {
    let tab = Tab::new(0, 0, url, title);
    let decision = RulesClassifier::default().classify(&tab, &[]);
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

pub(crate) fn providers() -> anyhow::Result<()> {
    println!("{:<10} {:<28} {:<8} {}", "ID", "LABEL", "KEY", "DEFAULT MODEL");
    for descriptor in descriptors() {
        let key = if descriptor.requires_key { "required" } else { "optional" };
        println!(
            "{:<10} {:<28} {:<8} {}",
            descriptor.id, descriptor.label, key, descriptor.default_model
        );
    }
    Ok(())
}

pub(crate) fn probe_env(provider: &str) -> anyhow::Result<()> {
    let Some(descriptor) = lookup(provider) else {
        bail!("Unsupported provider: {}", provider);
    };
    let present = env_key_present(descriptor.id, &ProcessEnv);
    println!(
        "{}: {} ({})",
        descriptor.id,
        if present { "present" } else { "absent" },
        descriptor.key_env_vars.join(", ")
    );
    Ok(())
}

pub(crate) fn check_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config: Config = load_config(path)?;
    let result = ConfigValidator::validate(&config, &provider_ids())?;

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }

    if !result.is_valid() {
        bail!("Configuration has {} error(s)", result.errors.len());
    }
    println!(
        "Configuration OK (provider: {}, batching delay: {}ms)",
        config.llm.provider, config.batching.delay_ms
    );
    Ok(())
}

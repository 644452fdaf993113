//! `manda status` — show runtime mode, provider keys, and the resolution
//! outcome, including why a fallback happened.

use anyhow::Result;
use colored::Colorize;

use manda_core::{ConfigSource, ProcessEnv, RuntimeMode};
use manda_providers::resolver::ResolveWarning;
use manda_providers::{Resolution, PROVIDERS};

/// Render the status report for a completed resolution.
pub fn run(resolution: Resolution) -> Result<()> {
    let mode = RuntimeMode::from_source(&ProcessEnv);

    println!();
    println!("{}", "Manda AI Status".cyan().bold());
    println!();

    println!(
        "  {:<16} {}",
        "Mode:".bold(),
        if mode.is_production() {
            "production".yellow().to_string()
        } else {
            "development".normal().to_string()
        }
    );

    let active = match resolution.provider {
        Some(provider) => format!("{} {}", "✓".green(), provider),
        None => "· none (AI features disabled)".red().to_string(),
    };
    println!("  {:<16} {}", "Active:".bold(), active);
    println!(
        "  {:<16} {}",
        "Resolved at:".bold(),
        resolution.resolved_at.to_rfc3339().dimmed()
    );

    println!();
    println!("  {}", "Providers:".bold());
    for spec in PROVIDERS {
        let key_status = if ProcessEnv.get(spec.env_key).is_some() {
            format!("{} (key set)", "✓".green())
        } else {
            format!("{}", format!("· {} unset", spec.env_key).dimmed())
        };
        println!("    {:<12} {}", spec.display_name, key_status);
    }

    if !resolution.warnings.is_empty() {
        println!();
        println!("  {}", "Warnings:".bold());
        for warning in &resolution.warnings {
            println!("    {} {}", "!".yellow(), describe(warning));
        }
    }

    println!();
    Ok(())
}

fn describe(warning: &ResolveWarning) -> String {
    match warning {
        ResolveWarning::SettingsUnavailable { reason } => {
            format!("settings store unavailable ({reason}); defaulted to gemini")
        }
        ResolveWarning::StoredProviderInvalid { value } => {
            format!("stored provider {value:?} is not supported; defaulted to gemini")
        }
        ResolveWarning::ConfiguredProviderInvalid { value } => {
            format!("AI_PROVIDER={value:?} is not supported; defaulted to gemini")
        }
        ResolveWarning::MissingCredential { requested, env_key } => {
            format!("{requested} selected but {env_key} is unset; fell back to gemini")
        }
        ResolveWarning::NoProviderUsable => "no provider usable; AI features disabled".to_string(),
    }
}

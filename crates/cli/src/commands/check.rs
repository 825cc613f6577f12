//! `polyreg check`: Validate every registration in the manifest.

use std::path::Path;

use polyreg_config::ValidationPolicy;

pub fn run(manifest: Option<&Path>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (manifest, registry) = super::load(manifest)?;
    let policy = manifest.family.validation;

    if json {
        let mut report = registry.validation_report();
        if policy == ValidationPolicy::FailFast {
            report.failures.truncate(1);
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.is_ok() {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("🔍 Validating {} (root: {})...", registry.display_name(), registry.base_interface());

    match policy {
        ValidationPolicy::FailFast => {
            if let Err(e) = registry.validate_registrations() {
                eprintln!("   ❌ {e}");
                std::process::exit(1);
            }
        }
        ValidationPolicy::Aggregate => {
            let report = registry.validation_report();
            if !report.is_ok() {
                for failure in &report.failures {
                    eprintln!("   ❌ {}: {}", failure.type_name, failure.message);
                }
                eprintln!(
                    "\n   {} of {} public type(s) invalid",
                    report.failures.len(),
                    report.checked
                );
                std::process::exit(1);
            }
        }
    }

    println!(
        "   ✅ All {} public type(s) valid",
        registry.supported_types().len()
    );
    Ok(())
}

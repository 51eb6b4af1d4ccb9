use lumopack_core::config::{AppConfig, LoadOptions};
use lumopack_core::cpq::catalog::PriceCatalog;
use lumopack_core::structural::{flute_catalog, DEFAULT_FLUTE};
use secrecy::ExposeSecret;
use serde::Serialize;

use super::{CommandResult, EXIT_FAILURE};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_FAILURE };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_llm_readiness(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(DoctorCheck {
                name: "llm_readiness",
                status: CheckStatus::Skipped,
                details: "skipped because configuration did not load".to_string(),
            });
        }
    }
    checks.push(check_catalog_integrity());

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_llm_readiness(config: &AppConfig) -> DoctorCheck {
    let llm = &config.llm;
    let credential = if llm.provider.requires_api_key() {
        match &llm.api_key {
            Some(key) if !key.expose_secret().trim().is_empty() => "api key present",
            _ => {
                return DoctorCheck {
                    name: "llm_readiness",
                    status: CheckStatus::Fail,
                    details: format!("{} requires llm.api_key", llm.provider.as_str()),
                }
            }
        }
    } else {
        "no api key required"
    };

    DoctorCheck {
        name: "llm_readiness",
        status: CheckStatus::Pass,
        details: format!(
            "{} model `{}` at {} ({credential}, timeout {}s, {} retries)",
            llm.provider.as_str(),
            llm.model,
            llm.base_url.as_deref().unwrap_or("provider default endpoint"),
            llm.timeout_secs,
            llm.max_retries
        ),
    }
}

fn check_catalog_integrity() -> DoctorCheck {
    let catalog = PriceCatalog::standard();
    let mut issues = catalog.integrity_issues();
    if !flute_catalog().contains_key(DEFAULT_FLUTE) {
        issues.push(format!("default flute `{DEFAULT_FLUTE}` missing from flute table"));
    }

    if issues.is_empty() {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!(
                "{} pricing tables and {} flutes consistent",
                catalog.currency,
                flute_catalog().len()
            ),
        }
    } else {
        DoctorCheck { name: "catalog_integrity", status: CheckStatus::Fail, details: issues.join("; ") }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

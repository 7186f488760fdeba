//! Doctor command - verify configuration and external services.

use crate::cli::Output;
use crate::config::Settings;
use crate::ollama::{model_matches, OllamaClient};
use console::style;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a single diagnostic check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn new(status: CheckStatus, name: &str, message: &str, hint: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.to_string(),
            hint: hint.map(str::to_string),
        }
    }

    fn ok(name: &str, message: &str) -> Self {
        Self::new(CheckStatus::Ok, name, message, None)
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self::new(CheckStatus::Warning, name, message, Some(hint))
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self::new(CheckStatus::Error, name, message, Some(hint))
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Print a titled group of checks and add them to the running list.
fn report(title: &str, group: Vec<CheckResult>, checks: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for check in &group {
        check.print();
    }
    println!();
    checks.extend(group);
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("FlyPal Doctor");
    println!();
    println!("Checking configuration and services...\n");

    let mut checks = Vec::new();

    if settings.uses_ollama() {
        report("Ollama", check_ollama(settings).await, &mut checks);
    }
    if settings.uses_openai() {
        report("API Configuration", vec![check_openai_api_key()], &mut checks);
    }
    report(
        "Flight telemetry",
        vec![check_telemetry(&settings.telemetry.base_url).await],
        &mut checks,
    );
    report("Directories", check_directories(settings), &mut checks);
    report("Configuration", vec![check_config_file()], &mut checks);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using FlyPal.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! FlyPal is ready to use.");
    }

    Ok(())
}

/// Check that Ollama is reachable and has the configured models.
async fn check_ollama(settings: &Settings) -> Vec<CheckResult> {
    let client = match OllamaClient::new(&settings.ollama.base_url, Some(PROBE_TIMEOUT)) {
        Ok(c) => c,
        Err(e) => {
            return vec![CheckResult::error(
                "Ollama",
                &e.to_string(),
                "Fix ollama.base_url in the config file",
            )]
        }
    };

    let installed = match client.list_models().await {
        Ok(models) => models,
        Err(e) => {
            return vec![CheckResult::error(
                "Ollama",
                &format!("unreachable at {} ({})", settings.ollama.base_url, e),
                "Start it with: ollama serve",
            )]
        }
    };

    let mut results = vec![CheckResult::ok(
        "Ollama",
        &format!("{} ({} models installed)", settings.ollama.base_url, installed.len()),
    )];

    let mut wanted = Vec::new();
    if settings.embedding.provider == crate::config::Provider::Ollama {
        wanted.push(("Embedding model", settings.embedding.model.as_str()));
    }
    if settings.llm.provider == crate::config::Provider::Ollama {
        wanted.push(("Language model", settings.llm.model.as_str()));
    }

    for (label, model) in wanted {
        results.push(check_model(label, model, &installed));
    }

    results
}

fn check_model(label: &str, model: &str, installed: &[String]) -> CheckResult {
    if installed.iter().any(|m| model_matches(m, model)) {
        CheckResult::ok(label, model)
    } else {
        CheckResult::error(
            label,
            &format!("{} not installed", model),
            &format!("Install with: ollama pull {}", model),
        )
    }
}

/// Check if OpenAI API key is configured, masking all but its ends.
fn check_openai_api_key() -> CheckResult {
    const NAME: &str = "OPENAI_API_KEY";
    const HINT: &str = "Set with: export OPENAI_API_KEY='sk-...'";

    match std::env::var(NAME) {
        Ok(key) if key.is_empty() => CheckResult::error(NAME, "empty", HINT),
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => CheckResult::ok(
            NAME,
            &format!("configured ({}...{})", &key[..7], &key[key.len() - 4..]),
        ),
        Ok(_) => CheckResult::warning(NAME, "set but format looks unusual", "Expected format: sk-..."),
        Err(_) => CheckResult::error(NAME, "not set", HINT),
    }
}

/// Check that the telemetry service answers at all.
async fn check_telemetry(base_url: &str) -> CheckResult {
    let client = match reqwest::Client::builder().timeout(PROBE_TIMEOUT).build() {
        Ok(c) => c,
        Err(e) => return CheckResult::error("Telemetry API", &e.to_string(), "Check TLS setup"),
    };

    match client.get(base_url).send().await {
        // Any HTTP answer means the host is up; the root path itself may 404.
        Ok(resp) => CheckResult::ok("Telemetry API", &format!("{} ({})", base_url, resp.status())),
        Err(e) => CheckResult::error(
            "Telemetry API",
            &format!("unreachable at {} ({})", base_url, e),
            "Check your network connection or telemetry.base_url",
        ),
    }
}

/// Check data directories.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    if settings.vector_store.provider == "sqlite" {
        let db_path = settings.sqlite_path();
        if db_path.exists() {
            let size = std::fs::metadata(&db_path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            results.push(CheckResult::ok(
                "Vector database",
                &format!("{} ({})", db_path.display(), size),
            ));
        } else {
            results.push(CheckResult::warning(
                "Vector database",
                &format!("{} (not created yet)", db_path.display()),
                "Database will be created on the first flight lookup",
            ));
        }
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        match Settings::load_from(Some(&config_path)) {
            Ok(_) => CheckResult::ok("Config file", &config_path.display().to_string()),
            Err(e) => CheckResult::error(
                "Config file",
                &format!("{} is invalid ({})", config_path.display(), e),
                "Fix it with: flypal config edit",
            ),
        }
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: flypal config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_check_model_latest_tag() {
        let installed = vec!["mxbai-embed-large:latest".to_string()];
        let result = check_model("Embedding model", "mxbai-embed-large", &installed);
        assert_eq!(result.status, CheckStatus::Ok);

        let result = check_model("Language model", "llama3.1", &installed);
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint.as_deref(), Some("Install with: ollama pull llama3.1"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
    }

    #[tokio::test]
    async fn test_check_ollama_reports_missing_model() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "mxbai-embed-large:latest" }]
            })))
            .mount(&server)
            .await;

        let mut settings = Settings::default();
        settings.ollama.base_url = server.uri();

        let checks = check_ollama(&settings).await;
        assert_eq!(checks.len(), 3);
        assert_eq!(checks[0].status, CheckStatus::Ok);
        assert_eq!(checks[1].status, CheckStatus::Ok);
        assert_eq!(checks[2].status, CheckStatus::Error);
    }

    #[tokio::test]
    async fn test_telemetry_404_still_reachable() {
        let server = MockServer::start().await;
        let result = check_telemetry(&server.uri()).await;
        assert_eq!(result.status, CheckStatus::Ok);
    }
}

// Startup module - displays banner and backend status
//
// Shows version, where config came from, which backends are usable and
// where the request files live. The same summary is logged through tracing
// so it lands in the log file too.

use crate::app::App;
use crate::config::{self, Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// One line of the status block
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// Status of each component based on what was actually wired up
pub fn module_status(config: &Config, app: &App) -> Vec<ModuleStatus> {
    vec![
        ModuleStatus {
            name: "tutor",
            enabled: true,
            description: "Conversation turns".to_string(),
        },
        ModuleStatus {
            name: "chat",
            enabled: app.tutor.chat_ready(),
            description: if app.tutor.chat_ready() {
                format!("Hosted chat ({})", config.chat.model)
            } else {
                format!("Hosted chat (set {})", config::env::CHAT_API_KEY)
            },
        },
        ModuleStatus {
            name: "offline",
            enabled: app.tutor.offline_ready(),
            description: if app.tutor.offline_ready() {
                format!("Local inference at {}", config.offline.url)
            } else {
                "Local inference (unavailable)".to_string()
            },
        },
        ModuleStatus {
            name: "speech",
            enabled: app.tutor.speech_ready(),
            description: if app.tutor.speech_ready() {
                format!("Text-to-speech ({})", config.speech.model)
            } else {
                format!("Text-to-speech (set {})", config::env::SPEECH_API_KEY)
            },
        },
        ModuleStatus {
            name: "admin",
            enabled: app.admin.is_enabled(),
            description: if app.admin.is_enabled() {
                "Request dashboards".to_string()
            } else {
                format!("Request dashboards (set {})", config::env::ADMIN_PASS)
            },
        },
    ]
}

/// Print the startup banner and module status
pub fn print_startup(config: &Config, app: &App) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}AfriLearn{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Multilingual AI tutor and mentorship intake{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Loading modules...{RESET}");
    for module in module_status(config, app) {
        print_module_status(&module);
    }
    println!();

    println!("  {DIM}Requests:{RESET}");
    println!("    {}", app.mentorship.path().display());
    println!("    {}", app.career.path().display());
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Listening on {BOLD}http://{}{RESET}",
        config.bind_addr
    );
    if !app.tutor.chat_ready() {
        println!("  {YELLOW}▸{RESET} {YELLOW}Chat backend not configured{RESET} {DIM}(online turns will report an error){RESET}");
    }
    println!();
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<10}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

/// Log the same summary through tracing
pub fn log_startup(config: &Config, app: &App) {
    tracing::info!("AfriLearn v{} starting", VERSION);

    for module in module_status(config, app) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, module.name, module.description);
    }

    tracing::info!(
        mentorship = %app.mentorship.path().display(),
        career = %app.career.path().display(),
        "Request stores"
    );
    match config.sessions.idle_timeout() {
        Some(timeout) => tracing::info!(
            idle_timeout_secs = timeout.as_secs(),
            "Idle sessions expire"
        ),
        None => tracing::info!("Session expiry disabled"),
    }
    tracing::info!("▸ Listening on {}", config.bind_addr);
}

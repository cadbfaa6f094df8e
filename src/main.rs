mod access;
mod app;
mod auth;
mod clock;
mod config;
mod db;
mod error;
mod sessions;
mod snippets;
mod state;
mod validator;

use std::io::IsTerminal;

#[derive(Debug, PartialEq, Eq)]
enum LogStyle {
    Json,
    Text { ansi: bool },
}

fn log_style(format: Option<&str>, stdout_is_terminal: bool) -> LogStyle {
    match format {
        Some("json") => LogStyle::Json,
        _ => LogStyle::Text {
            ansi: stdout_is_terminal,
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "snippetbox=debug,axum=info,tower_http=info".to_string());
    let format = std::env::var("LOG_FORMAT").ok();

    match log_style(format.as_deref(), std::io::stdout().is_terminal()) {
        LogStyle::Json => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init(),
        LogStyle::Text { ansi } => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(ansi)
            .init(),
    }

    let app_state = state::AppState::init().await?;
    let (host, port) = (app_state.config.host.clone(), app_state.config.port);

    let app = app::build_app(app_state);
    app::serve(app, &host, port).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_only_on_a_terminal() {
        assert_eq!(log_style(None, true), LogStyle::Text { ansi: true });
        assert_eq!(log_style(None, false), LogStyle::Text { ansi: false });
        assert_eq!(log_style(Some("pretty"), false), LogStyle::Text { ansi: false });
        assert_eq!(log_style(Some("json"), true), LogStyle::Json);
    }
}

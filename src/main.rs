use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use signup_gate::config::{AppConfig, AuthConfig};
use signup_gate::logging::init_tracing;
use signup_gate::startup::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "signup-gate")]
#[command(about = "Signup email allow-list gate")]
struct Args {
    /// Configuration file path (default: config.yaml)
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Port to listen on (overrides config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides config file)
    #[arg(long)]
    host: Option<String>,
}

fn describe_auth(auth: &AuthConfig) -> String {
    match auth.auth_type.as_str() {
        "bearer" => "Bearer token".to_string(),
        "basic" => match &auth.basic {
            Some(basic) => format!("HTTP Basic (user: {})", basic.username),
            None => "HTTP Basic".to_string(),
        },
        "unauthenticated" => "none".to_string(),
        other => format!("unknown ({})", other),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let (mut app_config, using_defaults) =
        if args.config == "config.yaml" && !std::path::Path::new("config.yaml").exists() {
            (AppConfig::default_config(), true)
        } else {
            let config = AppConfig::load_from_file(&args.config)
                .map_err(|e| format!("Failed to load configuration: {}", e))?;
            (config, false)
        };

    init_tracing(&app_config.logging);

    if using_defaults {
        println!("⚠️  No config.yaml found, using default configuration:");
        println!("   - In-memory SQLite allow-list (lost on restart)");
        println!("   - No authentication on admin or hook endpoints");
        println!("   🚀 Perfect for development and testing!\n");
    }

    if let Some(port) = args.port {
        app_config.server.port = port;
    }
    if let Some(host) = args.host {
        app_config.server.host = host;
    }

    let host: std::net::IpAddr = app_config.server.host.parse().map_err(|e| {
        format!("Invalid host address {}: {}", app_config.server.host, e)
    })?;
    let addr = SocketAddr::from((host, app_config.server.port));

    match &app_config.backend.database {
        Some(db_config) if app_config.backend.backend_type == "database" => {
            info!("Using {} allow-list store ({})", db_config.db_type, db_config.url)
        }
        _ => info!("Using {} allow-list store", app_config.backend.backend_type),
    }
    info!("Candidate comparison: {:?}", app_config.gate.comparison);

    let admin_auth = describe_auth(&app_config.admin.auth);
    let hook_auth = describe_auth(&app_config.hook.auth);

    let state = AppState::from_config(app_config).await?;
    let app = build_router(state);

    println!("🚀 Signup gate listening on {}", addr);
    println!("   🔒 Admin settings: http://{}/admin/allowlist (auth: {})", addr, admin_auth);
    println!("   🪝 Registration hook: POST http://{}/hooks/pre-user-email (auth: {})", addr, hook_auth);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

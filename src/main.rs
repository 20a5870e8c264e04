//! Lockdown Gateway binary entry point.
//!
//! ```text
//! lockdown-gateway <config.toml> [serve]            answer one HTTP request read from stdin
//! lockdown-gateway <config.toml> set-login <slug>
//! lockdown-gateway <config.toml> set-redirect <path>
//! lockdown-gateway <config.toml> hide <route>
//! lockdown-gateway <config.toml> reveal <route>
//! lockdown-gateway <config.toml> status
//! lockdown-gateway <config.toml> metrics
//! ```

use lockdown_gateway::config::ConfigLoader;
use lockdown_gateway::pipeline::{RequestDescriptor, Response};
use lockdown_gateway::{logging, Gateway};
use std::error::Error;
use std::io::{Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

const USAGE: &str = "usage: lockdown-gateway <config.toml> \
                     [serve | set-login <slug> | set-redirect <path> | hide <route> | \
                     reveal <route> | status | metrics]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(config_path) = args.first() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(config_path, &args[1..]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Gateway failed");
            eprintln!("lockdown-gateway: {e}");
            ExitCode::FAILURE
        },
    }
}

fn run(config_path: &str, command: &[String]) -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = ConfigLoader::with_defaults().load_or_default(config_path)?;
    logging::init(&config.logging)?;

    let gateway = Gateway::builder(config)
        .dispatch(Arc::new(|request: &RequestDescriptor| {
            Response::ok()
                .header("content-type", "text/plain; charset=UTF-8")
                .body(format!("dispatched {}\n", request.path()))
                .build()
        }))
        .login_page(Arc::new(|_: &RequestDescriptor| {
            Response::ok()
                .header("content-type", "text/plain; charset=UTF-8")
                .body("login page\n")
                .build()
        }))
        .build()?;

    let mut stdout = std::io::stdout().lock();
    match command.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => {
            let mut raw = Vec::new();
            std::io::stdin().read_to_end(&mut raw)?;
            let response = gateway.handle_bytes(&raw)?;
            stdout.write_all(&response.serialize())?;
        },
        ["set-login", value] => {
            let changed = gateway.settings().set_login_page_url(value)?;
            writeln!(stdout, "login_page_url changed: {changed}")?;
        },
        ["set-redirect", value] => {
            let changed = gateway.settings().set_redirect_url(value)?;
            writeln!(stdout, "redirect_url changed: {changed}")?;
        },
        [action @ ("hide" | "reveal"), route] => {
            let filter = gateway
                .route_filter()
                .ok_or("route_filter module is disabled")?;
            let changed = filter.set_hidden(route, *action == "hide")?;
            writeln!(stdout, "{route} changed: {changed}")?;
        },
        ["status"] => {
            for (name, status) in gateway.status() {
                writeln!(stdout, "{name}: {status}")?;
            }
        },
        ["metrics"] => {
            stdout.write_all(gateway.metrics_text().as_bytes())?;
        },
        _ => return Err(USAGE.into()),
    }

    stdout.flush()?;
    Ok(())
}

//! planboard serve command implementation
//!
//! Bootstraps the plan document and serves the board over HTTP, with live
//! change events when the file watcher can attach.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::server::Server;

use super::resolve_root;

pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
struct ServeReport {
    url: String,
    document: PathBuf,
    bootstrap: crate::document::Bootstrap,
    live_updates: bool,
}

pub fn run(options: ServeOptions) -> Result<()> {
    let root = resolve_root(options.root)?;
    let mut config = Config::load_from_root(&root);
    if let Some(host) = options.host {
        config.server.host = host;
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
    if let Some(dir) = options.static_dir {
        config.server.static_dir = Some(dir.to_string_lossy().into_owned());
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let server = Server::bind(&root, &config).await?;
        let addr = server.local_addr()?;

        let report = ServeReport {
            url: format!("http://{addr}"),
            document: config.document_path(&root),
            bootstrap: server.bootstrap(),
            live_updates: server.live_updates(),
        };
        let mut human = HumanOutput::new(format!("planboard serving {}", report.url));
        human.push_summary("document", report.document.display().to_string());
        human.push_summary(
            "live updates",
            if report.live_updates { "on" } else { "off" },
        );
        emit_success(
            OutputOptions {
                json: options.json,
                quiet: options.quiet,
            },
            "serve",
            &report,
            Some(&human),
        )?;

        server.run().await
    })
}

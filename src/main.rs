// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Triton-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Triton and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Triton CLI entrypoint.
//!
//! Serves the workspace HTTP JSON API at `http://127.0.0.1:<port>` over a
//! workspace directory. External store change events are forwarded to the
//! workspace so outside edits surface as conflicts on dirty documents; the
//! store's own save echoes are dropped.

use std::error::Error;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;

use triton::render::DEFAULT_RENDER_BASE_URL;
use triton::store::{ChangeOrigin, DirStore, FileStore, WriteDurability};
use triton::workspace::Workspace;

const DEFAULT_HTTP_PORT: u16 = 27461;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<workspace-dir>] [--durable-writes] [--http-port <port>] [--render-url <url>]\n  {program} [--workspace <dir>] [--durable-writes] [--http-port <port>] [--render-url <url>]\n\nServes the document API at `http://127.0.0.1:<port>` (0 = ephemeral; default {DEFAULT_HTTP_PORT}).\n\nIf workspace-dir/--workspace is omitted, the current working directory is used.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n--render-url overrides the PlantUML render server base url (default {DEFAULT_RENDER_BASE_URL})."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    workspace_dir: Option<String>,
    http_port: Option<u16>,
    durable_writes: bool,
    render_url: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--workspace" => {
                if options.workspace_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.workspace_dir = Some(dir);
            }
            "--http-port" => {
                if options.http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.http_port = Some(port);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--render-url" => {
                if options.render_url.is_some() {
                    return Err(());
                }
                let url = args.next().ok_or(())?;
                options.render_url = Some(url);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.workspace_dir.is_some() {
                    return Err(());
                }
                options.workspace_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "triton".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let dir = options.workspace_dir.unwrap_or_else(|| ".".to_owned());
        let store = if options.durable_writes {
            DirStore::new(dir).with_durability(WriteDurability::Durable)
        } else {
            DirStore::new(dir)
        };
        let http_port = options.http_port.unwrap_or(DEFAULT_HTTP_PORT);
        let render_url = options
            .render_url
            .unwrap_or_else(|| DEFAULT_RENDER_BASE_URL.to_owned());

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let mut changes = store.changes();
            let workspace = Arc::new(Mutex::new(Workspace::new(store)));

            // Only writes made behind the workspace's back may raise a
            // conflict; the store's own saves echo on this channel too.
            // DirStore reports no external events yet, so today this loop is
            // quiet until a filesystem watcher feeds the channel.
            let watcher_workspace = workspace.clone();
            tokio::spawn(async move {
                loop {
                    match changes.recv().await {
                        Ok(event) if event.origin == ChangeOrigin::External => {
                            watcher_workspace
                                .lock()
                                .await
                                .note_external_change(&event.path, event.last_modified_ms);
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            let listener = tokio::net::TcpListener::bind(("127.0.0.1", http_port)).await?;
            let router = triton::server::router(workspace, &render_url);
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("triton: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_workspace_dir() {
        let options = parse_options(["--workspace".to_owned(), "some/dir".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.workspace_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.http_port, None);
        assert!(!options.durable_writes);
    }

    #[test]
    fn parses_positional_workspace_dir() {
        let options = parse_options(["some/dir".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.workspace_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn parses_http_port() {
        let options = parse_options(["--http-port".to_owned(), "1234".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.http_port, Some(1234));
    }

    #[test]
    fn parses_durable_writes_with_dir() {
        let options = parse_options(
            ["some/dir".to_owned(), "--durable-writes".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.workspace_dir.as_deref(), Some("some/dir"));
        assert!(options.durable_writes);
    }

    #[test]
    fn parses_render_url() {
        let options = parse_options(
            ["--render-url".to_owned(), "http://localhost:8080/plantuml".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert_eq!(
            options.render_url.as_deref(),
            Some("http://localhost:8080/plantuml")
        );
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_non_numeric_port() {
        parse_options(["--http-port".to_owned(), "lots".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(
            ["--durable-writes".to_owned(), "--durable-writes".to_owned()].into_iter(),
        )
        .unwrap_err();

        parse_options(
            [
                "--workspace".to_owned(),
                ".".to_owned(),
                "--workspace".to_owned(),
                "other".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_multiple_positional_dirs() {
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_positional_dir_with_workspace_flag() {
        parse_options(
            ["--workspace".to_owned(), "one".to_owned(), "two".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_values() {
        parse_options(["--workspace".to_owned()].into_iter()).unwrap_err();
        parse_options(["--http-port".to_owned()].into_iter()).unwrap_err();
        parse_options(["--render-url".to_owned()].into_iter()).unwrap_err();
    }
}

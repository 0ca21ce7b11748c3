//! Interactive shell over one udrop session.
//!
//! Mirrors the menu loop of the original console client: one command per
//! line, one protocol operation at a time. Progress events stream to the
//! terminal from a background task.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use udrop_protocol::{ProgressEvent, ProgressKind};
use udrop_transfer::{Session, file_checksum};

const MENU: &str = "\
Commands:
  ls                      list server files
  get <file>              fetch a file into the current directory
  put <file>              store a local file
  mput <file> [file ...]  store several local files in sequence
  delete <file>           delete a server file
  ping                    measure round-trip time
  checksum <file>         SHA-256 of a local file
  exit                    close the session";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,udrop_transfer=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(host), Some(port)) = (args.next(), args.next()) else {
        eprintln!("usage: udrop <host> <port>");
        return ExitCode::FAILURE;
    };
    let Ok(port) = port.parse::<u16>() else {
        eprintln!("invalid port: {port}");
        return ExitCode::FAILURE;
    };

    let mut session = match Session::connect(&host, port).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("failed to connect to {host}:{port}: {e}");
            return ExitCode::FAILURE;
        }
    };
    println!("connected to {host}:{port}");

    let mut progress = session.subscribe_progress();
    tokio::spawn(async move {
        while let Some(event) = progress.recv().await {
            print_progress(&event);
        }
    });

    println!("{MENU}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let Ok(Some(line)) = lines.next_line().await else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();

        match (verb, rest.as_slice()) {
            ("ls", []) => match session.list().await {
                Ok(entries) => {
                    for entry in entries {
                        println!("{entry}");
                    }
                }
                Err(e) => eprintln!("ls failed: {e}"),
            },
            ("get", [name]) => match session.get(name, Path::new(name)).await {
                Ok(bytes) => println!("received {bytes} bytes"),
                Err(e) => eprintln!("get failed: {e}"),
            },
            ("put", [path]) => match session.put(path).await {
                Ok(bytes) => println!("sent {bytes} bytes"),
                Err(e) => eprintln!("put failed: {e}"),
            },
            ("mput", paths) if !paths.is_empty() => {
                // Independent sequential stores; one failure stops the batch.
                let mut total: u64 = 0;
                for path in paths {
                    match session.put(path).await {
                        Ok(bytes) => total += bytes,
                        Err(e) => {
                            eprintln!("put {path} failed: {e}");
                            break;
                        }
                    }
                }
                println!("sent {total} bytes");
            }
            ("delete", [name]) => match session.delete(name).await {
                Ok(()) => println!("deleted {name}"),
                Err(e) => eprintln!("delete failed: {e}"),
            },
            ("ping", []) => {
                let elapsed = session.ping().await;
                println!("round trip: {} ms", elapsed.as_millis());
            }
            ("checksum", [path]) => match file_checksum(&PathBuf::from(path)) {
                Ok(digest) => println!("sha256  {digest}  {path}"),
                Err(e) => eprintln!("checksum failed: {e}"),
            },
            ("exit", []) => {
                if let Err(e) = session.terminate().await {
                    eprintln!("exit notice not sent: {e}");
                }
                break;
            }
            _ => println!("{MENU}"),
        }
    }

    ExitCode::SUCCESS
}

fn print_progress(event: &ProgressEvent) {
    match event.kind {
        ProgressKind::FrameGet | ProgressKind::FramePut => {
            println!(
                "  frame {}/{} ({} bytes, {} total)",
                event.frame_id, event.total_frames, event.frame_len, event.bytes_total
            );
        }
        ProgressKind::GetDone => {
            println!("  fetch done: {} bytes in {} frames", event.bytes_total, event.total_frames);
        }
        ProgressKind::PutDone => {
            println!("  store done: {} bytes in {} frames", event.bytes_total, event.total_frames);
        }
    }
}

//! Host-side helper for the demo page.
//!
//! `cargo run [-- --no-build] [PORT]` builds the wasm bundle into
//! `static/pkg` and serves `static/` until interrupted.

use std::env;
use std::process::{exit, Command};

const DEFAULT_PORT: u16 = 8000;
const PKG_DIR: &str = "static/pkg";

fn build_pkg() -> bool {
    println!("wasm-pack build --target web -> {PKG_DIR}");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", PKG_DIR])
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("could not run wasm-pack ({e}); serving the existing {PKG_DIR}");
            true
        }
    }
}

fn main() {
    let mut build = true;
    let mut port = DEFAULT_PORT;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--no-build" => build = false,
            other => match other.parse() {
                Ok(p) => port = p,
                Err(_) => {
                    eprintln!("usage: hero_wasm [--no-build] [PORT]");
                    exit(2);
                }
            },
        }
    }

    if build && !build_pkg() {
        eprintln!("wasm-pack build failed");
        exit(1);
    }

    println!("demo at http://127.0.0.1:{port}/");
    let served = Command::new("python3")
        .args(["-m", "http.server", &port.to_string(), "--directory", "static"])
        .status();
    match served {
        Ok(status) if status.success() => {}
        Ok(status) => {
            eprintln!("http.server exited with {status}");
            exit(1);
        }
        Err(e) => {
            eprintln!("could not start python3 http.server: {e}");
            exit(1);
        }
    }
}

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, info};

use crate::args::Cli;
use crate::config::Config;
use crate::error::Result;

mod args;
mod config;
mod error;
mod fetch;
mod sandbox;

/// Fetch the script named by `config`, run it and hash the configured input.
async fn hash_remote(config: &Config) -> Result<String> {
    let url = config.script_url();
    let script = fetch::fetch_script(&url).await?;

    let input = config.hash_input();
    debug!("Hashing {:?}", input);
    let digest = sandbox::digest_isolated(script, input)?;
    info!("Digest computed");
    Ok(digest)
}

/// Write the outcome as exactly one line, the digest on `out` or the error on
/// `err`, and return the process exit code.
fn report<O: Write, E: Write>(outcome: Result<String>, out: &mut O, err: &mut E) -> io::Result<u8> {
    match outcome {
        Ok(digest) => {
            writeln!(out, "{}", digest)?;
            out.flush()?;
            Ok(0)
        }
        Err(e) => {
            writeln!(err, "{}", e.to_string().replace(['\r', '\n'], " "))?;
            err.flush()?;
            Ok(e.exit_code())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    );
    let config = Cli::parse().into_config();
    debug!("{:?}", config);

    let outcome = hash_remote(&config).await;
    let code = report(outcome, &mut io::stdout().lock(), &mut io::stderr().lock()).unwrap_or(1);
    ExitCode::from(code)
}

#[cfg(test)]
mod tests {
    use warp::http::StatusCode;

    use super::*;
    use crate::fetch::tests::{closed_port, serve_script};

    struct Run {
        code: u8,
        stdout: String,
        stderr: String,
    }

    async fn run(tokens: Vec<String>) -> Run {
        let config = Config::from_tokens(tokens);
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = report(hash_remote(&config).await, &mut stdout, &mut stderr).unwrap();
        Run {
            code,
            stdout: String::from_utf8(stdout).unwrap(),
            stderr: String::from_utf8(stderr).unwrap(),
        }
    }

    fn tokens(host: &str, port: u16, rest: &[&str]) -> Vec<String> {
        let mut tokens = vec![
            "--hostname".to_owned(),
            host.to_owned(),
            "--port".to_owned(),
            port.to_string(),
        ];
        tokens.extend(rest.iter().map(|s| s.to_string()));
        tokens
    }

    #[tokio::test]
    async fn prints_digest_from_identity_stub() {
        let addr = serve_script("function md5(s) { return s; }", StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &["--suffix", "_x", "foobar"])).await;
        assert_eq!(run.code, 0);
        assert_eq!(run.stdout, "foobar_x\n");
        assert_eq!(run.stderr, "");
    }

    #[tokio::test]
    async fn default_suffix_is_appended() {
        let addr = serve_script("function md5(s) { return '<' + s + '>'; }", StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &["abc"])).await;
        assert_eq!(run.stdout, "<abc_http>\n");
    }

    #[tokio::test]
    async fn error_status_body_is_still_executed() {
        let addr = serve_script("function md5(s) { return 'x'; }", StatusCode::NOT_FOUND);
        let run = run(tokens("127.0.0.1", addr.port(), &[])).await;
        assert_eq!(run.code, 0);
        assert_eq!(run.stdout, "x\n");
    }

    #[tokio::test]
    async fn unreachable_host_reports_one_transport_line() {
        let run = run(tokens("127.0.0.1", closed_port(), &["abc"])).await;
        assert_eq!(run.code, 1);
        assert_eq!(run.stdout, "");
        assert!(run.stderr.starts_with("Error: "), "{}", run.stderr);
        assert_eq!(run.stderr.lines().count(), 1);
    }

    #[tokio::test]
    async fn throwing_script_reports_one_execution_line() {
        let addr = serve_script("throw new Error('boom\\nsecond line');", StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &["abc"])).await;
        assert_eq!(run.code, 2);
        assert_eq!(run.stdout, "");
        assert!(
            run.stderr.starts_with("Error executing the remote JS file: "),
            "{}",
            run.stderr
        );
        assert_eq!(run.stderr.lines().count(), 1);
    }

    #[tokio::test]
    async fn missing_md5_reports_execution_error() {
        let addr = serve_script("var notmd5 = 1;", StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &[])).await;
        assert_eq!(run.code, 2);
        assert_eq!(run.stdout, "");
        assert!(run.stderr.starts_with("Error executing the remote JS file: "));
    }

    #[tokio::test]
    async fn deeply_nested_script_reports_one_execution_line() {
        let script = format!(
            "function md5(s) {{ return {}1{}; }}",
            "(".repeat(20_000),
            ")".repeat(20_000)
        );
        let addr = serve_script(Box::leak(script.into_boxed_str()), StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &["abc"])).await;
        assert_eq!(run.code, 2);
        assert_eq!(run.stdout, "");
        assert!(run.stderr.starts_with("Error executing the remote JS file: "));
        assert_eq!(run.stderr.lines().count(), 1);
    }

    #[tokio::test]
    async fn tls_against_plain_server_is_a_transport_error() {
        let addr = serve_script("function md5(s) { return s; }", StatusCode::OK);
        let run = run(tokens("127.0.0.1", addr.port(), &["--tls", "abc"])).await;
        assert_eq!(run.code, 1);
        assert_eq!(run.stdout, "");
        assert!(run.stderr.starts_with("Error: "));
    }
}

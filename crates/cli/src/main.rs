mod config;
mod dry_run;
mod error;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use policy::{Access, Decision, Endpoint, Enforcer, PolicySpec};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Config, DEFAULT_PROPERTIES};
use dry_run::{DryRun, Format};
use error::{Error, Result};

/// Exit status of `check` when the access is not covered.
const DENIED: u8 = 2;

#[derive(Parser)]
#[command(name = "sandbox-policy")]
#[command(about = "Compute the sandbox grants a server configuration needs", long_about = None)]
#[command(version)]
struct Cli {
    /// Property files to read, separated like PATH. Earlier files win.
    #[arg(long, env = "PROPERTIES", default_value = DEFAULT_PROPERTIES, global = true)]
    properties: String,

    /// Set a configuration value, overriding the property files
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", global = true)]
    defines: Vec<String>,

    /// Directory the server runs in [default: current directory]
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the grants the configuration requires
    Show {
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Report whether the policy covers an access
    Check {
        access: AccessKind,
        /// host:port (or a URL) for sockets, a path for files
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AccessKind {
    Listen,
    Connect,
    Read,
    Write,
    Delete,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let work_dir = match &cli.work_dir {
        Some(dir) => std::path::absolute(dir)?,
        None => std::env::current_dir()?,
    };
    let config = Config::load(&cli.properties, &cli.defines)?;
    let spec = build_policy(&config, &work_dir)?;

    match cli.command {
        Some(Commands::Show { format }) => cmd_show(&spec, format),
        None => cmd_show(&spec, Format::Text),
        Some(Commands::Check { access, target }) => cmd_check(&spec, access, &target, &work_dir),
    }
}

fn build_policy(config: &Config, work_dir: &Path) -> Result<PolicySpec> {
    for key in [
        policy::LISTEN_URL,
        policy::INSECURE_FAKE_SECURITY,
        policy::AUTH_SERVER_BASE_URI,
        policy::DATABASE_URL,
    ] {
        if let Some(origin) = config.origin(key) {
            debug!(key, origin, "configured");
        }
    }

    let spec = policy::build(config, work_dir)?;
    info!(grants = spec.len(), work_dir = %work_dir.display(), "policy built");
    Ok(spec)
}

fn cmd_show(spec: &PolicySpec, format: Format) -> Result<ExitCode> {
    let mut enforcer = DryRun::new(io::stdout().lock(), format);
    enforcer.install(spec)?;
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(spec: &PolicySpec, kind: AccessKind, target: &str, work_dir: &Path) -> Result<ExitCode> {
    let access = parse_access(kind, target, work_dir)?;

    match spec.permits(&access) {
        Decision::Allow => {
            println!("allowed: {access}");
            Ok(ExitCode::SUCCESS)
        }
        Decision::Deny { reason } => {
            println!("denied: {reason}");
            Ok(ExitCode::from(DENIED))
        }
    }
}

fn parse_access(kind: AccessKind, target: &str, work_dir: &Path) -> Result<Access> {
    let access = match kind {
        AccessKind::Listen => Access::Listen(parse_endpoint(target)?),
        AccessKind::Connect => Access::Connect(parse_endpoint(target)?),
        AccessKind::Read => Access::Read(work_dir.join(target)),
        AccessKind::Write => Access::Write(work_dir.join(target)),
        AccessKind::Delete => Access::Delete(work_dir.join(target)),
    };
    Ok(access)
}

fn parse_endpoint(target: &str) -> Result<Endpoint> {
    let invalid = |reason: String| Error::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    if target.contains("://") {
        return Endpoint::from_url(target).map_err(invalid);
    }

    let (host, port) = target
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected host:port".to_string()))?;
    if host.is_empty() {
        return Err(invalid("missing host".to_string()));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| invalid(format!("bad port: {e}")))?;
    Ok(Endpoint::new(host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "sandbox-policy",
            "--properties",
            "a.toml",
            "-D",
            "listen.url=http://localhost:9090",
            "check",
            "connect",
            "localhost:9090",
            "--work-dir",
            "/srv/app",
        ])
        .unwrap();

        assert_eq!(cli.properties, "a.toml");
        assert_eq!(cli.defines, ["listen.url=http://localhost:9090"]);
        assert_eq!(cli.work_dir, Some(PathBuf::from("/srv/app")));
        assert!(matches!(
            cli.command,
            Some(Commands::Check {
                access: AccessKind::Connect,
                ..
            })
        ));
    }

    #[test]
    fn test_show_format() {
        let cli = Cli::try_parse_from(["sandbox-policy", "show", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show {
                format: Format::Json
            })
        ));
    }

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(
            parse_endpoint("localhost:9090").unwrap(),
            Endpoint::new("localhost", 9090)
        );
        assert_eq!(
            parse_endpoint("[::1]:8000").unwrap(),
            Endpoint::new("[::1]", 8000)
        );
        assert_eq!(
            parse_endpoint("https://auth.example.com").unwrap(),
            Endpoint::new("auth.example.com", 443)
        );
        assert!(parse_endpoint("localhost").is_err());
        assert!(parse_endpoint(":80").is_err());
        assert!(parse_endpoint("localhost:http").is_err());
    }

    #[test]
    fn test_relative_paths_resolve_against_work_dir() {
        let access = parse_access(AccessKind::Read, "./local.ssl.jks", Path::new("/srv/app")).unwrap();
        assert_eq!(access, Access::Read(PathBuf::from("/srv/app/local.ssl.jks")));

        let access = parse_access(AccessKind::Delete, "/tmp/x", Path::new("/srv/app")).unwrap();
        assert_eq!(access, Access::Delete(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_check_against_built_policy() {
        let config = Config::new()
            .with_overrides(&[
                "database.url=jdbc:hsqldb:file:.hsql/mydb",
                "listen.url=http://localhost:9090",
            ])
            .unwrap();
        let work_dir = Path::new("/srv/app");
        let spec = build_policy(&config, work_dir).unwrap();

        let allowed = parse_access(AccessKind::Write, ".hsql/mydb.log", work_dir).unwrap();
        assert!(spec.permits(&allowed).is_allowed());

        let denied = parse_access(AccessKind::Write, "local.ssl.jks", work_dir).unwrap();
        assert!(!spec.permits(&denied).is_allowed());

        let denied = parse_access(AccessKind::Connect, "localhost:9090", work_dir).unwrap();
        assert!(!spec.permits(&denied).is_allowed());
    }

    #[test]
    fn test_malformed_listen_url_is_policy_error() {
        let config = Config::new()
            .with_overrides(&["listen.url=localhost:9090"])
            .unwrap();
        let err = build_policy(&config, Path::new("/srv/app")).unwrap_err();
        assert!(matches!(err, Error::Policy(_)));
    }
}

//! Entry point for the qsdash TUI. Parses args, resolves the API profile and runs the App.

use std::io::{self, Write};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use qsdash::app::App;
use qsdash::config::{ApiConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
use qsdash::links::FileDownloader;
use qsdash::logging::init_logging;
use qsdash::profiles::{
    config_dir, load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile,
    DEMO_PROFILE,
};

const DEMO_PORT: u16 = 8731;
const DEMO_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "qsdash")]
#[command(about = "Terminal dashboard for QStellar agents, assets and agent downloads")]
#[command(version)]
struct Args {
    /// API base URL, e.g. http://localhost:8000
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// API base URL (same as the positional argument)
    #[arg(long = "url", value_name = "URL", conflicts_with = "url")]
    url_flag: Option<String>,

    /// Named connection profile
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Extra CA certificate (PEM) to trust for https
    #[arg(short = 't', long, value_name = "CERT_PEM")]
    tls_ca: Option<String>,

    /// Overwrite an existing profile without asking
    #[arg(long)]
    save: bool,

    /// Start the bundled demo API and connect to it
    #[arg(long)]
    demo: bool,

    /// Rows per page (1-200)
    #[arg(long)]
    page_size: Option<u32>,

    /// Seconds without input before the idle panel shows
    #[arg(long, default_value_t = 60)]
    idle_secs: u64,

    /// Where downloaded agents are saved
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Resolve the profile, print the connection settings and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.demo || matches!(args.profile.as_deref(), Some(DEMO_PROFILE)) {
        return run_demo_mode(&args).await;
    }

    let Some(entry) = resolve_entry(&args)? else {
        return Ok(());
    };

    if entry.url == DEMO_PROFILE {
        return run_demo_mode(&args).await;
    }
    if args.dry_run {
        print_entry(&entry);
        return Ok(());
    }

    let _log = init_logging(&config_dir())
        .map_err(|e| eprintln!("logging disabled: {e:#}"))
        .ok();
    run_app(&args, &entry).await
}

/// Work out which API to talk to, saving or prompting for profiles along the way.
/// `None` means the user aborted.
fn resolve_entry(args: &Args) -> Result<Option<ProfileEntry>> {
    let mut url = args.url.clone().or_else(|| args.url_flag.clone());
    if url.is_none() && args.profile.is_none() {
        url = std::env::var(BASE_URL_ENV).ok();
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: args.profile.clone(),
        url,
        tls_ca: args.tls_ca.clone(),
        page_size: args.page_size,
    };

    let mut profiles_mut = profiles_file.clone();
    let entry = match req.resolve(&profiles_file) {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = args.profile.as_ref() {
                match profiles_mut.profiles.get(name) {
                    None => {
                        // new profile: save right away
                        profiles_mut.profiles.insert(name.clone(), entry.clone());
                        save_profiles(&profiles_mut).context("saving profiles")?;
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = args.save
                            || prompt_yes_no(&format!("Overwrite existing profile '{name}'? [y/N]: "));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry.clone());
                            save_profiles(&profiles_mut).context("saving profiles")?;
                        }
                    }
                    Some(_) => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            if !names.iter().any(|n| n == DEMO_PROFILE) {
                names.push(DEMO_PROFILE.into());
            }
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
            else {
                return Ok(None);
            };
            if name == DEMO_PROFILE {
                return Ok(Some(ProfileEntry {
                    url: DEMO_PROFILE.into(),
                    ..Default::default()
                }));
            }
            match profiles_mut.profiles.get(name) {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter API URL (http://HOST:PORT or https://...): ")?;
            if url.trim().is_empty() {
                return Ok(None);
            }
            let ca = prompt_string("Enter TLS CA path (or leave blank): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                tls_ca: Some(ca.trim().to_string()).filter(|s| !s.is_empty()),
                page_size: args.page_size,
            };
            profiles_mut.profiles.insert(name, entry.clone());
            save_profiles(&profiles_mut).context("saving profiles")?;
            entry
        }
        ResolveProfile::None => ProfileEntry {
            url: DEFAULT_BASE_URL.into(),
            tls_ca: args.tls_ca.clone(),
            page_size: args.page_size,
        },
    };
    Ok(Some(entry))
}

fn print_entry(entry: &ProfileEntry) {
    println!("url={}", entry.url);
    println!("tls_ca={}", entry.tls_ca.as_deref().unwrap_or("-"));
    match entry.page_size {
        Some(n) => println!("page_size={n}"),
        None => println!("page_size=-"),
    }
}

async fn run_app(args: &Args, entry: &ProfileEntry) -> Result<()> {
    let mut config = ApiConfig::new(&entry.url)?.with_tls_ca(entry.tls_ca.as_deref());
    if let Some(n) = entry.page_size {
        config = config.with_page_size(n)?;
    }
    tracing::info!(
        "connecting to {} (page size {})",
        config.base_url,
        config.page_size
    );

    let transport = config.transport()?;
    let dir = args
        .download_dir
        .clone()
        .or_else(dirs_next::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    let sink = Arc::new(FileDownloader::new(Arc::clone(&transport), dir));

    let mut app = App::new(
        &config,
        transport,
        sink,
        Duration::from_secs(args.idle_secs.max(1)),
    );
    app.run().await
}

fn prompt_yes_no(prompt: &str) -> bool {
    match prompt_string(prompt) {
        Ok(line) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(args: &Args) -> Result<()> {
    let url = format!("http://127.0.0.1:{DEMO_PORT}");
    if args.dry_run {
        print_entry(&ProfileEntry {
            url,
            ..Default::default()
        });
        return Ok(());
    }

    let _log = init_logging(&config_dir())
        .map_err(|e| eprintln!("logging disabled: {e:#}"))
        .ok();
    let child = spawn_demo_api(DEMO_PORT).await?;
    let entry = ProfileEntry {
        url,
        tls_ca: None,
        page_size: args.page_size,
    };
    tokio::select! {
        res = run_app(args, &entry) => { drop(child); res }
        _ = tokio::signal::ctrl_c() => {
            drop(child);
            Ok(())
        }
    }
}

/// Kills the demo API when dropped.
struct DemoGuard(Option<std::process::Child>);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        if let Some(mut ch) = self.0.take() {
            let _ = ch.kill();
            let _ = ch.wait();
        }
    }
}

async fn spawn_demo_api(port: u16) -> Result<DemoGuard> {
    let exe = find_demo_executable();
    let child = std::process::Command::new(&exe)
        .arg("--port")
        .arg(port.to_string())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .with_context(|| format!("starting demo API {}", exe.display()))?;
    let guard = DemoGuard(Some(child));
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    if !wait_for_listener(addr, DEMO_STARTUP_TIMEOUT).await {
        anyhow::bail!("demo API did not start listening on {addr}");
    }
    Ok(guard)
}

/// Poll until something accepts connections on `addr`, or `timeout` passes.
async fn wait_for_listener(addr: SocketAddr, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn find_demo_executable() -> PathBuf {
    #[cfg(windows)]
    let name = "qsdash_demo_api.exe";
    #[cfg(not(windows))]
    let name = "qsdash_demo_api";

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    PathBuf::from(name)
}

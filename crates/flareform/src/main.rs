use clap::{Parser, Subcommand};
use colored::Colorize;
use flareform::{AttributeDoc, Configured, Diagnostic, Diagnostics, Provider, RawInput, Severity, VERSION};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "flareform")]
#[command(about = "Cloudflare プロバイダー設定の検証ツール", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// プロバイダー設定を解決して検証
    Check {
        /// 設定ファイル (.json / .yaml / .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// ホストツールのバージョン (User-Agent に使用)
        #[arg(short, long, env = "FLAREFORM_TOOL_VERSION", default_value = "unknown")]
        tool_version: String,
        /// 結果を JSON で出力
        #[arg(long)]
        json: bool,
    },
    /// 認証情報を Cloudflare API で確認
    Verify {
        /// 設定ファイル (.json / .yaml / .yml)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// ホストツールのバージョン (User-Agent に使用)
        #[arg(short, long, env = "FLAREFORM_TOOL_VERSION", default_value = "unknown")]
        tool_version: String,
    },
    /// 属性ドキュメントを Markdown で出力
    Docs {
        /// 属性名（指定しない場合は全属性）
        attribute: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

#[derive(Serialize)]
struct Summary<'a> {
    credential_mode: &'a str,
    base_url: String,
    rps: u32,
    retries: u32,
    min_backoff: u32,
    max_backoff: u32,
    api_client_logging: bool,
    account_id: Option<&'a str>,
    user_agent: &'a str,
    diagnostics: &'a [Diagnostic],
}

impl<'a> Summary<'a> {
    fn new(configured: &'a Configured) -> Self {
        let config = &configured.config;
        Self {
            credential_mode: config.credential_mode().as_str(),
            base_url: configured.client.base_url().to_string(),
            rps: config.rps(),
            retries: config.retries(),
            min_backoff: config.min_backoff(),
            max_backoff: config.max_backoff(),
            api_client_logging: config.api_client_logging(),
            account_id: config.account_id(),
            user_agent: config.user_agent(),
            diagnostics: config.warnings(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout は結果出力に使うのでログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,flareform_client::wire=info".into()),
        )
        .init();

    match cli.command {
        Commands::Check {
            config,
            tool_version,
            json,
        } => {
            let raw = load_input(config.as_deref())?;
            let provider = Provider::new(VERSION);
            match provider.configure(&raw, &tool_version) {
                Ok(configured) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&Summary::new(&configured))?);
                    } else {
                        print_summary(&configured);
                    }
                }
                Err(diagnostics) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
                    } else {
                        print_diagnostics(&diagnostics);
                    }
                    anyhow::bail!("provider configuration is invalid");
                }
            }
        }
        Commands::Verify {
            config,
            tool_version,
        } => {
            let raw = load_input(config.as_deref())?;
            let provider = Provider::new(VERSION);
            let configured = match provider.configure(&raw, &tool_version) {
                Ok(configured) => configured,
                Err(diagnostics) => {
                    print_diagnostics(&diagnostics);
                    anyhow::bail!("provider configuration is invalid");
                }
            };
            print_diagnostics(&configured.warnings());

            println!("{}", "🔐 認証を確認中...".blue());
            let status = provider.check_auth(&configured.client).await;
            if status.authenticated {
                println!(
                    "{} {}",
                    "✓ 認証成功:".green(),
                    status.account_info.as_deref().unwrap_or("Unknown")
                );
            } else {
                println!(
                    "{} {}",
                    "✗ 認証失敗:".red(),
                    status.error.as_deref().unwrap_or("unknown error")
                );
                anyhow::bail!("authentication failed");
            }
        }
        Commands::Docs { attribute } => {
            let provider = Provider::new(VERSION);
            match attribute {
                Some(name) => match provider.attribute(&name) {
                    Some(attr) => print!("{}", render_attribute(&attr)),
                    None => anyhow::bail!("unknown attribute: {}", name),
                },
                None => print!("{}", render_docs(&provider)),
            }
        }
        Commands::Version => {
            println!("flareform {}", VERSION);
        }
    }

    Ok(())
}

fn load_input(path: Option<&Path>) -> anyhow::Result<RawInput> {
    match path {
        Some(path) => {
            tracing::debug!("loading provider settings from {}", path.display());
            RawInput::from_path(path)
                .map_err(|e| anyhow::anyhow!("failed to load {}: {}", path.display(), e))
        }
        None => Ok(RawInput::new()),
    }
}

fn print_summary(configured: &Configured) {
    let summary = Summary::new(configured);
    println!("{}", "✓ プロバイダー設定は有効です".green().bold());
    println!("  認証方式:     {}", summary.credential_mode.cyan());
    println!("  API:          {}", summary.base_url);
    println!("  RPS:          {}", summary.rps);
    println!("  リトライ:     {}", summary.retries);
    println!(
        "  バックオフ:   {}s - {}s",
        summary.min_backoff, summary.max_backoff
    );
    println!("  通信ログ:     {}", summary.api_client_logging);
    if let Some(account_id) = summary.account_id {
        println!("  アカウント:   {}", account_id);
    }
    println!("  User-Agent:   {}", summary.user_agent.dimmed());
    print_diagnostics(&configured.warnings());
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        let line = diagnostic.to_string();
        match diagnostic.severity {
            Severity::Error => eprintln!("{}", line.red().bold()),
            Severity::Warning => eprintln!("{}", line.yellow()),
        }
        if !diagnostic.detail.is_empty() {
            eprintln!("  {}", diagnostic.detail);
        }
    }
}

fn render_attribute(attr: &AttributeDoc) -> String {
    let mut tags = vec![attr.kind];
    if attr.sensitive {
        tags.push("Sensitive");
    }
    if attr.deprecated {
        tags.push("Deprecated");
    }
    format!(
        "- `{}` ({}) {}\n",
        attr.name,
        tags.join(", "),
        attr.description
    )
}

fn render_docs(provider: &Provider) -> String {
    let mut out = String::from("# Cloudflare provider\n\n## Attributes\n\n");
    for attr in provider.schema() {
        out.push_str(&render_attribute(&attr));
    }
    out
}

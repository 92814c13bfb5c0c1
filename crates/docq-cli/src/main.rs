//! docq - terminal client for the document intelligence service

mod commands;
mod config;
mod credentials;
mod ui;
mod utils;

use clap::Parser;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use docq_api::{
    AnalysisMode, AskRequest, BuildRequest, Client, ExportFormat, ExportRequest, GraphSearchKind,
    GraphSearchRequest, LoginRequest, PresetQuestion, RegisterRequest, SearchRequest, UserProfile,
};
use docq_session::{
    AskPhase, BuildProgress, HttpTransport, Session, SessionEvent, WatchConfig, watch_build,
};

use commands::GraphragOp;
use credentials::{CredentialStore, Scope, StoredCredentials};

/// docq - ask questions against an analyzed document knowledge base
#[derive(Parser, Debug)]
#[command(name = "docq")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Service base URL (default: http://localhost:8000)
    #[arg(short = 'u', long)]
    base_url: Option<String>,

    /// Ask a single question and exit
    #[arg(short = 'a', long)]
    ask: Option<String>,

    /// Use the non-streaming ask endpoint with --ask
    #[arg(long)]
    no_stream: bool,

    /// Knowledge entry ids answers are restricted to (comma-separated)
    #[arg(short = 'k', long, value_delimiter = ',')]
    knowledge: Vec<i64>,

    /// Search the knowledge base and exit
    #[arg(short = 's', long)]
    search: Option<String>,

    /// Upload documents for analysis (repeat for a combined batch)
    #[arg(long)]
    upload: Vec<PathBuf>,

    /// Request structured XML analysis for uploads
    #[arg(long)]
    xml: bool,

    /// List analysis result files on the server
    #[arg(long)]
    results: bool,

    /// Check the document analysis service and exit
    #[arg(long)]
    health: bool,

    /// Download an analysis result file
    #[arg(long, value_name = "FILENAME")]
    download: Option<String>,

    /// Where to write a downloaded file (default: the server filename)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Show a knowledge entry in full
    #[arg(long, value_name = "ID")]
    item: Option<i64>,

    /// Delete a knowledge entry
    #[arg(long, value_name = "ID")]
    delete_item: Option<i64>,

    /// Export knowledge entries (json, csv, xml)
    #[arg(long, value_name = "FORMAT")]
    export: Option<String>,

    /// Include stored question/answer pairs in the export
    #[arg(long)]
    include_qa: bool,

    /// Graph index operation (status, build, rebuild, delete)
    #[arg(long, value_name = "OP")]
    graphrag: Option<String>,

    /// Query the knowledge graph and exit
    #[arg(long, value_name = "QUERY")]
    graph_search: Option<String>,

    /// Graph search mode (global, local, hybrid)
    #[arg(long, default_value = "hybrid")]
    mode: String,

    /// Sign in with username and password
    #[arg(long)]
    login: bool,

    /// Browse with a temporary guest identity
    #[arg(long)]
    guest: bool,

    /// Create an account
    #[arg(long)]
    register: bool,

    /// Sign out and discard stored credentials
    #[arg(long)]
    logout: bool,

    /// Show who is signed in
    #[arg(long)]
    auth_status: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Use a specific config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing; logs go to stderr so they never corrupt the TUI
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("docq=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // Load config file (CLI args take precedence)
    let cfg = match args.config {
        Some(ref path) => config::Config::load_from(path),
        None => config::Config::load(),
    };

    let base_url = args
        .base_url
        .clone()
        .or(cfg.base_url.clone())
        .unwrap_or_else(|| docq_api::DEFAULT_BASE_URL.to_string());

    let store = CredentialStore::new();

    // Account flows handle their own output and exit
    if args.register {
        return handle_register(&base_url).await;
    }
    if args.login {
        return handle_login(&base_url, &store).await;
    }
    if args.guest {
        return handle_guest(&base_url, &store).await;
    }
    if args.logout {
        return handle_logout(&base_url, &store).await;
    }
    if args.auth_status {
        return show_auth_status(&base_url, &store).await;
    }

    // The health probe is the one unauthenticated endpoint
    if args.health {
        return do_health(&Client::new(&base_url)).await;
    }

    // Everything past this point talks to the service as a signed-in user
    let client = authed_client(&base_url, &store).await?;

    let scope = if !args.knowledge.is_empty() {
        args.knowledge.clone()
    } else {
        cfg.knowledge_ids.clone().unwrap_or_default()
    };

    // One-shot operations
    if !args.upload.is_empty() {
        return do_upload(&client, &args.upload, args.xml).await;
    }
    if args.results {
        return do_results(&client).await;
    }
    if let Some(ref filename) = args.download {
        return do_download(&client, filename, args.output.clone()).await;
    }
    if let Some(id) = args.item {
        return do_item(&client, id).await;
    }
    if let Some(id) = args.delete_item {
        return do_delete_item(&client, id).await;
    }
    if let Some(ref format) = args.export {
        return do_export(&client, format, args.include_qa, &scope).await;
    }
    if let Some(ref query) = args.search {
        let limit = cfg
            .search_limit
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(10);
        return do_search(&client, query, limit).await;
    }
    if let Some(ref op) = args.graphrag {
        let Some(op) = GraphragOp::parse(&op.to_lowercase()) else {
            eprintln!(
                "Unknown graph operation '{}'. Use status, build, rebuild, or delete.",
                op
            );
            std::process::exit(1);
        };
        return do_graphrag(&client, op, &scope).await;
    }
    if let Some(ref query) = args.graph_search {
        return do_graph_search(&client, query, &args.mode).await;
    }
    if let Some(ref question) = args.ask {
        if args.no_stream {
            return ask_once_plain(&client, question, scope).await;
        }
        return ask_once(client, question, scope).await;
    }

    // Interactive: identify the user, then hand off to the chosen mode
    let profile = client.me().await?;
    let transport = Arc::new(HttpTransport::new(client.clone()));
    let mut session = Session::new(transport);
    session.set_scope(scope);

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    if use_tui {
        ui::run_tui(&mut session, &client, profile.display_name(), &cfg).await
    } else {
        run_interactive(&mut session, &client, &profile, &cfg).await
    }
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{}", prompt);
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

async fn handle_register(base_url: &str) -> anyhow::Result<()> {
    println!("Create an account on {}", base_url);
    println!();
    let username = prompt_line("Username: ")?;
    let email = prompt_line("Email: ")?;
    let password = prompt_line("Password: ")?;
    let confirm_password = prompt_line("Confirm password: ")?;
    if password != confirm_password {
        eprintln!("Passwords do not match.");
        std::process::exit(1);
    }
    let full_name = prompt_line("Full name (optional): ")?;

    let request = RegisterRequest {
        username,
        email,
        password,
        confirm_password,
        full_name: (!full_name.is_empty()).then_some(full_name),
        phone: None,
    };

    let client = Client::new(base_url);
    match client.register(&request).await {
        Ok(response) => {
            println!();
            println!("{}", response.message);
            println!("Sign in with: docq --login");
        }
        Err(e) => {
            eprintln!();
            eprintln!("Registration failed: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn handle_login(base_url: &str, store: &CredentialStore) -> anyhow::Result<()> {
    println!("Sign in to {}", base_url);
    println!();
    let username = prompt_line("Username: ")?;
    let password = prompt_line("Password: ")?;
    let answer = prompt_line("Stay signed in on this machine? [Y/n]: ")?;
    let remember = !matches!(answer.to_lowercase().as_str(), "n" | "no");

    let mut request = LoginRequest::new(username, password);
    if remember {
        request = request.remembered();
    }

    let client = Client::new(base_url);
    match client.login(&request).await {
        Ok(response) => {
            let creds = StoredCredentials::new(
                response.access_token,
                Some(response.refresh_token),
                response.user.username.clone(),
                false,
            );
            let scope = if remember {
                Scope::Persistent
            } else {
                Scope::Session
            };
            store.save(scope, &creds)?;

            println!();
            println!("Signed in as {}.", response.user.display_name());
            if !remember {
                println!("This login lasts until logout or reboot.");
            }
        }
        Err(e) => {
            eprintln!();
            eprintln!("Login failed: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn handle_guest(base_url: &str, store: &CredentialStore) -> anyhow::Result<()> {
    let client = Client::new(base_url);
    match client.guest_login().await {
        Ok(response) => {
            let creds = StoredCredentials::new(
                response.access_token,
                Some(response.refresh_token),
                response.user.username.clone(),
                true,
            );
            store.save(Scope::Session, &creds)?;
            println!("Browsing as {}.", response.user.username);
            println!("Uploads and history stay tied to this guest identity until logout.");
        }
        Err(e) => {
            eprintln!("Guest login failed: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn handle_logout(base_url: &str, store: &CredentialStore) -> anyhow::Result<()> {
    let Some((creds, _)) = store.load() else {
        println!("Not signed in.");
        return Ok(());
    };

    // Revoke server-side first; local credentials are cleared regardless
    let client = Client::new(base_url).with_token(creds.access_token);
    if let Err(e) = client.logout(creds.refresh_token).await {
        tracing::debug!("server-side logout failed: {e}");
    }
    store.clear()?;
    println!("Signed out.");
    Ok(())
}

async fn show_auth_status(base_url: &str, store: &CredentialStore) -> anyhow::Result<()> {
    println!("Authentication status");
    println!("{}", "-".repeat(40));

    let Some((creds, scope)) = store.load() else {
        println!("Not signed in.");
        println!();
        println!("Sign in with: docq --login (or docq --guest)");
        return Ok(());
    };

    let kind = if creds.is_guest { "guest" } else { "user" };
    println!("{:<10} {} ({})", "Account:", creds.username, kind);
    println!("{:<10} {}", "Storage:", scope.name());
    let saved = chrono::DateTime::from_timestamp_millis(creds.saved_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    println!("{:<10} {}", "Saved:", saved);

    let client = Client::new(base_url).with_token(creds.access_token);
    match client.verify().await {
        Ok(v) if v.valid => {
            let expiry = v
                .expires_at
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|dt| format!(" (expires {})", dt.format("%Y-%m-%d %H:%M:%S UTC")))
                .unwrap_or_default();
            println!("{:<10} valid{}", "Token:", expiry);
        }
        Ok(_) => {
            println!("{:<10} expired", "Token:");
            println!();
            println!("Sign in again with: docq --login (or docq --guest)");
        }
        Err(e) if e.is_auth() => {
            println!("{:<10} expired", "Token:");
            println!();
            println!("Sign in again with: docq --login (or docq --guest)");
        }
        Err(e) => println!("{:<10} could not be checked ({})", "Token:", e),
    }
    Ok(())
}

/// Build a client from stored credentials, refreshing a stale token once
async fn authed_client(base_url: &str, store: &CredentialStore) -> anyhow::Result<Client> {
    let Some((creds, scope)) = store.load() else {
        eprintln!("Not signed in.");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  1. Sign in:         docq --login");
        eprintln!("  2. Browse as guest: docq --guest");
        eprintln!("  3. Create account:  docq --register");
        std::process::exit(1);
    };

    let mut client = Client::new(base_url).with_token(creds.access_token.clone());

    let stale = match client.verify().await {
        Ok(v) => !v.valid,
        Err(e) if e.is_auth() => true,
        Err(e) => return Err(e.into()),
    };
    if !stale {
        return Ok(client);
    }

    let Some(refresh) = creds.refresh_token.clone() else {
        eprintln!("Your session has expired.");
        eprintln!("Sign in again with: docq --login (or docq --guest)");
        std::process::exit(1);
    };
    let renewed = match client.refresh_token(&refresh).await {
        Ok(renewed) => renewed,
        Err(e) => {
            tracing::debug!("token refresh failed: {e}");
            eprintln!("Your session has expired.");
            eprintln!("Sign in again with: docq --login (or docq --guest)");
            std::process::exit(1);
        }
    };
    client.set_token(Some(renewed.access_token.clone()));
    let creds = StoredCredentials {
        access_token: renewed.access_token,
        ..creds
    };
    store.save(scope, &creds)?;
    Ok(client)
}

// ---------------------------------------------------------------------------
// One-shot operations
// ---------------------------------------------------------------------------

async fn do_upload(client: &Client, files: &[PathBuf], xml: bool) -> anyhow::Result<()> {
    let mode = if xml {
        AnalysisMode::Xml
    } else {
        AnalysisMode::Text
    };

    if let [path] = files {
        println!("Uploading {}...", path.display());
        let response = client.upload_document(path, mode).await?;
        println!("{}", response.message);
        if let Some(size) = response.size {
            println!("{} ({})", response.filename, utils::format_size(size));
        }
        if let Some(analysis) = response.analysis_text() {
            println!("\n{}", analysis);
        }
        if let Some(id) = response.knowledge_id {
            println!("\nStored as knowledge entry {}.", id);
            println!("Ask about it with: docq -a \"...\" -k {}", id);
        }
        if let Some(file) = response.xml_file.as_deref() {
            println!("Fetch the XML report with: docq --download {}", file);
        }
    } else {
        println!("Uploading {} documents as one batch...", files.len());
        let response = client.upload_batch(files, mode).await?;
        println!("{}", response.message);
        println!("Processed: {}", response.processed_files.join(", "));
        if let Some(analysis) = response.analysis_text() {
            println!("\n{}", analysis);
        }
        if let Some(id) = response.knowledge_id {
            println!("\nStored as knowledge entry {}.", id);
        }
        if let Some(file) = response.xml_file.as_deref() {
            println!("Fetch the XML report with: docq --download {}", file);
        }
    }
    Ok(())
}

async fn do_results(client: &Client) -> anyhow::Result<()> {
    let response = client.analysis_results().await?;
    if response.results.is_empty() {
        println!("No analysis results on the server yet.");
        println!("Create one with: docq --upload <file> --xml");
        return Ok(());
    }

    println!("Analysis results:\n");
    println!("{:<44} {:>10}  Created", "Filename", "Size");
    println!("{}", "-".repeat(76));
    for entry in &response.results {
        println!(
            "{:<44} {:>10}  {}",
            entry.filename,
            utils::format_size(entry.size),
            entry.created_time
        );
    }
    println!("\nDownload with: docq --download <filename>");
    Ok(())
}

async fn do_health(client: &Client) -> anyhow::Result<()> {
    let health = client.document_health().await?;
    println!("Document service: {} ({})", health.status, health.timestamp);
    println!(
        "  Upload folder:  {}",
        if health.upload_folder_exists { "ok" } else { "missing" }
    );
    println!(
        "  Results folder: {}",
        if health.results_folder_exists { "ok" } else { "missing" }
    );
    println!(
        "  API key:        {}",
        if health.openai_key_configured { "configured" } else { "not configured" }
    );
    Ok(())
}

async fn do_download(
    client: &Client,
    filename: &str,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bytes = client.download_result(filename).await?;
    let path = output.unwrap_or_else(|| PathBuf::from(filename));
    std::fs::write(&path, &bytes)?;
    println!(
        "Wrote {} ({})",
        path.display(),
        utils::format_size(bytes.len() as u64)
    );
    Ok(())
}

async fn do_item(client: &Client, id: i64) -> anyhow::Result<()> {
    let item = client.knowledge_item(id).await?;
    println!("[{}] {}", item.id, item.title);
    match item.source_file.as_deref() {
        Some(file) => println!("Source: {} ({})", file, item.source_type),
        None => println!("Source: {}", item.source_type),
    }
    if let Some(tags) = item.tags.as_deref().filter(|t| !t.is_empty()) {
        println!("Tags: {}", tags);
    }
    println!(
        "Created: {}  Views: {}",
        item.created_at.format("%Y-%m-%d %H:%M"),
        item.view_count
    );
    if let Some(summary) = item.summary.as_deref() {
        println!("\n{}", summary);
    }
    println!("\n{}", item.content);
    Ok(())
}

async fn do_delete_item(client: &Client, id: i64) -> anyhow::Result<()> {
    let response = client.delete_knowledge_item(id).await?;
    println!("{}", response.message);
    Ok(())
}

async fn do_export(
    client: &Client,
    format: &str,
    include_qa: bool,
    scope: &[i64],
) -> anyhow::Result<()> {
    let format = match format.to_lowercase().as_str() {
        "json" => ExportFormat::Json,
        "csv" => ExportFormat::Csv,
        "xml" => ExportFormat::Xml,
        other => {
            eprintln!("Unknown export format '{}'. Use json, csv, or xml.", other);
            std::process::exit(1);
        }
    };

    let request = ExportRequest {
        knowledge_ids: (!scope.is_empty()).then(|| scope.to_vec()),
        tags: None,
        format,
        include_qa,
    };
    let response = client.export_knowledge(&request).await?;
    println!(
        "Exported {} entries as {}.",
        response.total_items, response.export_format
    );
    println!("Server file: {}", response.filename);
    println!("Download:    {}{}", client.base_url(), response.download_url);
    Ok(())
}

async fn do_search(client: &Client, query: &str, limit: u32) -> anyhow::Result<()> {
    let request = SearchRequest::query(query).with_limit(limit);
    let response = client.search(&request).await?;
    println!("{}", utils::format_search(&response));
    Ok(())
}

/// Run one graph index operation; builds block until the index is ready
async fn do_graphrag(client: &Client, op: GraphragOp, scope: &[i64]) -> anyhow::Result<()> {
    match op {
        GraphragOp::Status => {
            let status = client.index_status().await?;
            println!("{}", utils::format_index_status(&status));
        }
        GraphragOp::Delete => {
            let response = client.delete_index().await?;
            println!("{}", response.message);
        }
        GraphragOp::Build { rebuild } => {
            let before = client.index_status().await?;
            let baseline = if before.index_exists {
                before.last_modified
            } else {
                None
            };

            let request = BuildRequest {
                knowledge_ids: (!scope.is_empty()).then(|| scope.to_vec()),
                rebuild,
            };
            let accepted = client.build_index(&request).await?;
            println!(
                "{} ({} documents)",
                accepted.message, accepted.documents_count
            );

            let mut progress = watch_build(
                client.clone(),
                baseline,
                WatchConfig::default(),
                CancellationToken::new(),
            );
            while let Some(update) = progress.next().await {
                match update {
                    BuildProgress::Building { elapsed, status } => {
                        println!(
                            "  building... {}s elapsed, {} artifacts",
                            elapsed.as_secs(),
                            status.artifact_count.unwrap_or(0)
                        );
                    }
                    BuildProgress::Ready { status } => {
                        println!(
                            "Graph index ready ({} artifacts).",
                            status.artifact_count.unwrap_or(0)
                        );
                        println!("Query it with: docq --graph-search \"...\"");
                    }
                    BuildProgress::TimedOut { elapsed } => {
                        anyhow::bail!(
                            "index build still running after {}s; check later with docq --graphrag status",
                            elapsed.as_secs()
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

async fn do_graph_search(client: &Client, query: &str, mode: &str) -> anyhow::Result<()> {
    let kind = match mode.to_lowercase().as_str() {
        "global" => GraphSearchKind::Global,
        "local" => GraphSearchKind::Local,
        "hybrid" => GraphSearchKind::Hybrid,
        other => {
            eprintln!(
                "Unknown graph search mode '{}'. Use global, local, or hybrid.",
                other
            );
            std::process::exit(1);
        }
    };

    let request = GraphSearchRequest::new(query, kind);
    let result = client.graph_search(&request).await?;
    if !result.success {
        let reason = result
            .error
            .as_deref()
            .or(result.message.as_deref())
            .unwrap_or("unknown error");
        anyhow::bail!("graph search failed: {}", reason);
    }
    match result.answer_text() {
        Some(answer) => println!("{}", answer),
        None => println!("The graph produced no answer for this query."),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Asking
// ---------------------------------------------------------------------------

/// Stream one answer to stdout
async fn ask_in_session(session: &mut Session, question: &str) {
    use std::io::Write;

    let mut receiver = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            match event {
                SessionEvent::AnswerDelta { delta, .. } => {
                    print!("{}", delta);
                    std::io::stdout().flush().ok();
                }
                SessionEvent::AskCommitted { record } => {
                    println!();
                    if let Some(ms) = record.response_time_ms {
                        println!("[{} ms]", ms);
                    }
                }
                SessionEvent::AskAborted { reason, .. } => {
                    eprintln!("\n[answer failed: {}]", reason);
                }
                _ => {}
            }
        }
    });

    // Failures surface through the printed aborted event
    let _ = session.ask(question).await;

    // Wait for events to finish
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    printer.abort();
}

async fn ask_once(client: Client, question: &str, scope: Vec<i64>) -> anyhow::Result<()> {
    let transport = Arc::new(HttpTransport::new(client));
    let mut session = Session::new(transport);
    session.set_scope(scope);

    println!("docq> {}", question);
    println!();

    ask_in_session(&mut session, question).await;

    if session.phase() == AskPhase::Aborted {
        std::process::exit(1);
    }
    Ok(())
}

/// One-shot ask over the non-streaming endpoint; the answer arrives whole
async fn ask_once_plain(client: &Client, question: &str, scope: Vec<i64>) -> anyhow::Result<()> {
    println!("docq> {}", question);
    println!();

    let record = client.ask(&AskRequest::scoped(question, scope)).await?;
    println!("{}", record.answer);
    if let Some(ms) = record.response_time {
        println!("[{} ms]", ms);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Plain interactive mode
// ---------------------------------------------------------------------------

async fn run_interactive(
    session: &mut Session,
    client: &Client,
    profile: &UserProfile,
    cfg: &config::Config,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&io::stderr()) {
        if session.scope().is_empty() {
            eprintln!("docq ({})", profile.display_name());
        } else {
            eprintln!(
                "docq ({}) scope: {}",
                profile.display_name(),
                utils::join_ids(session.scope())
            );
        }
        eprintln!();
    }

    let mut presets: Vec<PresetQuestion> = Vec::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if input.starts_with('/') {
            if let Some(result) = commands::execute_command(input) {
                match result {
                    commands::CommandResult::Clear => {
                        session.clear();
                        println!("Cleared conversation.");
                    }
                    commands::CommandResult::Exit => {
                        break;
                    }
                    commands::CommandResult::Message(msg) => {
                        println!("{}", msg);
                    }
                    commands::CommandResult::Unknown(cmd) => {
                        println!("Unknown command: /{}", cmd);
                        println!("Type /help for available commands.");
                    }
                    commands::CommandResult::SetScope(ids) => {
                        session.set_scope(ids);
                        if session.scope().is_empty() {
                            println!("Answering from the whole knowledge base.");
                        } else {
                            println!(
                                "Answering from entries {}.",
                                utils::join_ids(session.scope())
                            );
                        }
                    }
                    commands::CommandResult::OpenScopeSelector => {
                        // No popup in plain mode; list the entries instead
                        match client.search(&SearchRequest::document_listing(50)).await {
                            Ok(response) if response.knowledge_items.is_empty() => {
                                println!("The knowledge base has no analyzed documents yet.");
                                println!("Upload one with: docq --upload <file>");
                            }
                            Ok(response) => {
                                println!("Knowledge entries:");
                                println!(
                                    "{}",
                                    utils::format_knowledge_items(&response.knowledge_items)
                                );
                                println!("\nRestrict answers with /select 3,7 (or /select all).");
                            }
                            Err(e) => println!("Could not list knowledge entries: {}", e),
                        }
                    }
                    commands::CommandResult::ShowHistory(limit) => {
                        let limit = limit.or(cfg.history_limit).unwrap_or(10);
                        match client.qa_history(limit).await {
                            Ok(history) => println!("{}", utils::format_history(&history)),
                            Err(e) => println!("History fetch failed: {}", e),
                        }
                    }
                    commands::CommandResult::ShowStats => match client.knowledge_stats().await {
                        Ok(stats) => println!("{}", utils::format_stats(&stats)),
                        Err(e) => println!("Stats fetch failed: {}", e),
                    },
                    commands::CommandResult::ShowPresets(category) => {
                        match client.preset_questions(category.as_deref()).await {
                            Ok(listing) => {
                                println!("{}", utils::format_presets(&listing));
                                presets = listing;
                            }
                            Err(e) => println!("Preset fetch failed: {}", e),
                        }
                    }
                    commands::CommandResult::AskPreset(n) => match presets.get(n - 1) {
                        Some(preset) => {
                            if let Err(e) = client.click_preset_question(preset.id).await {
                                tracing::debug!("preset click tracking failed: {e}");
                            }
                            let question = preset.question.clone();
                            println!("{}", question);
                            println!();
                            ask_in_session(session, &question).await;
                        }
                        None => println!("No such preset. List them first with /presets."),
                    },
                    commands::CommandResult::SendFeedback(request) => {
                        match client.submit_feedback(&request).await {
                            Ok(response) => println!("{}", response.message),
                            Err(e) => println!("Feedback failed: {}", e),
                        }
                    }
                    commands::CommandResult::Graphrag(op) => {
                        if let Err(e) = do_graphrag(client, op, session.scope()).await {
                            println!("{}", e);
                        }
                    }
                    commands::CommandResult::SaveTranscript(path) => {
                        if session.records().is_empty() {
                            println!("Nothing to save yet.");
                        } else {
                            match utils::save_transcript(session.records(), path) {
                                Ok(path) => println!("Transcript saved to {}", path.display()),
                                Err(e) => println!("Save failed: {}", e),
                            }
                        }
                    }
                }
                println!();
                continue;
            }
        }

        println!();
        ask_in_session(session, input).await;
        println!();
    }

    Ok(())
}

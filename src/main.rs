use anyhow::Context;
use clap::Parser;
use rumo_rs::app::{
    Conversation, MenuAction, MenuOutcome, MessageRole, ReplyKind, SendOutcome, classify,
    contact_links,
};
use rumo_rs::prompts::{MENU, RESET_CONFIRMATION, SHARE_TEXT, SHARE_TITLE, SUGGESTIONS};
use rumo_rs::{ChatService, GeminiRestAdapter, Settings};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

type Input = Lines<BufReader<Stdin>>;

/// Terminal client for the Lista Papa Francisco assistant.
#[derive(Debug, Parser)]
#[command(name = "rumo", version, about)]
struct Cli {
    /// Gemini API key; falls back to `GEMINI_API_KEY` or `API_KEY`.
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    chat_model: Option<String>,
    #[arg(long)]
    live_model: Option<String>,
    #[arg(long)]
    voice: Option<String>,
    /// Where `/video` writes the generated clip.
    #[arg(long, default_value = "rumo-video.mp4")]
    video_out: PathBuf,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut builder = Settings::builder();
        if let Some(key) = &self.api_key {
            builder = builder.api_key(key);
        }
        if let Some(model) = &self.chat_model {
            builder = builder.chat_model(model);
        }
        if let Some(model) = &self.live_model {
            builder = builder.live_model(model);
        }
        if let Some(voice) = &self.voice {
            builder = builder.voice(voice);
        }
        builder.api_key_from_env().build().context("invalid configuration")
    }
}

/// Prints reply text as it streams in.
#[derive(Default)]
struct Printer {
    id: Option<String>,
    printed: usize,
}

impl Printer {
    fn show(&mut self, conversation: &Conversation) {
        let Some(message) = conversation.transcript().last() else {
            return;
        };
        if message.role != MessageRole::Assistant {
            return;
        }
        if self.id.as_deref() != Some(message.id.as_str()) {
            self.id = Some(message.id.clone());
            self.printed = 0;
            print!("\nrumo> ");
        }
        if let Some(delta) = message.text.get(self.printed..) {
            print!("{delta}");
            self.printed = message.text.len();
        }
        let _ = std::io::stdout().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = cli.settings()?;
    let mut conversation = Conversation::new(ChatService::from_settings(&settings)?);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    print_welcome(&conversation);
    while let Some(line) = prompt(&mut input, "\ntu> ").await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            "/quit" | "/sair" => break,
            "/help" => print_help(),
            "/reset" => {
                let answer = prompt(&mut input, &format!("{RESET_CONFIRMATION} [s/N] ")).await?;
                if matches!(answer.as_deref().map(str::trim), Some("s" | "S" | "sim")) {
                    conversation.reset();
                    print_welcome(&conversation);
                }
            }
            "/menu" => menu(&mut conversation, &mut input, rest).await?,
            "/q" => {
                let action = rest.trim().parse::<usize>().ok().and_then(|n| {
                    let replies = conversation.transcript().last()?.visible_quick_replies();
                    replies.get(n.checked_sub(1)?).map(|q| q.action.clone())
                });
                match action {
                    Some(action) => send(&mut conversation, &action, None).await?,
                    None => println!("Resposta rápida inválida."),
                }
            }
            "/attach" => {
                let (path, text) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
                if path.is_empty() {
                    println!("Uso: /attach <ficheiro> [mensagem]");
                } else {
                    send(&mut conversation, text, Some(PathBuf::from(path))).await?;
                }
            }
            "/video" => video(&settings, &conversation, &cli.video_out).await,
            "/share" => println!("{SHARE_TITLE}\n{SHARE_TEXT}"),
            "/live" => live(&settings, &mut input).await?,
            _ => send(&mut conversation, line, None).await?,
        }
    }
    Ok(())
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

fn print_help() {
    println!(
        "/menu [n]  menu\n\
         /q <n>  resposta rápida\n\
         /attach <ficheiro> [texto]  enviar imagem ou áudio\n\
         /live  chamada de voz\n\
         /video  vídeo da última resposta\n\
         /share  partilhar\n\
         /reset  recomeçar\n\
         /quit  sair"
    );
}

fn print_welcome(conversation: &Conversation) {
    if let Some(welcome) = conversation.transcript().last() {
        println!("rumo> {}", welcome.text);
        print_quick_replies(conversation);
    }
    let suggestions: Vec<_> = SUGGESTIONS.iter().map(|s| s.label).collect();
    println!("Sugestões: {}", suggestions.join(" · "));
}

fn print_quick_replies(conversation: &Conversation) {
    let Some(message) = conversation.transcript().last() else {
        return;
    };
    for (i, reply) in message.visible_quick_replies().iter().enumerate() {
        println!("  [{}] {}", i + 1, reply.label());
    }
    for card in &message.cards {
        println!("  ▸ {}: {}", card.title, card.description);
    }
    if classify(message) == ReplyKind::Contact {
        for link in contact_links() {
            println!("  {} → {}", link.label(), link.url());
        }
    }
}

async fn send(
    conversation: &mut Conversation,
    text: &str,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut printer = Printer::default();
    let observe = |c: &Conversation| printer.show(c);
    let outcome = match file {
        Some(path) => match conversation.send_file(text, &path, observe).await {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("Não foi possível anexar {}: {err}", path.display());
                return Ok(());
            }
        },
        None => conversation.send(text, None, observe).await,
    };
    report(conversation, &outcome);
    Ok(())
}

fn report(conversation: &Conversation, outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Ignored => {}
        SendOutcome::Replied { .. } | SendOutcome::Failed { .. } => {
            println!();
            print_quick_replies(conversation);
        }
    }
}

async fn menu(
    conversation: &mut Conversation,
    input: &mut Input,
    choice: &str,
) -> anyhow::Result<()> {
    let chosen = choice.trim().parse::<usize>().ok();
    let Some(item) = chosen.and_then(|n| MENU.get(n.checked_sub(1)?)) else {
        for (i, item) in MENU.iter().enumerate() {
            println!("  [{}] {}", i + 1, item.label);
        }
        return Ok(());
    };
    if item.action == MenuAction::Reset {
        let answer = prompt(input, &format!("{RESET_CONFIRMATION} [s/N] ")).await?;
        if !matches!(answer.as_deref().map(str::trim), Some("s" | "S" | "sim")) {
            return Ok(());
        }
    }
    let mut printer = Printer::default();
    match conversation.activate(item.action, |c| printer.show(c)).await {
        MenuOutcome::Reset => print_welcome(conversation),
        MenuOutcome::Sent(outcome) => report(conversation, &outcome),
        MenuOutcome::OpenLink(url) => println!("{url}"),
    }
    Ok(())
}

async fn video(settings: &Settings, conversation: &Conversation, out: &Path) {
    let Some(context) = conversation.transcript().last_reply_text() else {
        println!("Ainda não há resposta para ilustrar.");
        return;
    };
    println!("A gerar vídeo, pode demorar alguns minutos...");
    let result = async {
        let adapter = GeminiRestAdapter::new(settings)?;
        let bytes = adapter
            .generate_video(
                &settings.video_model,
                context,
                settings.video_poll_interval,
                settings.video_deadline,
            )
            .await?;
        tokio::fs::write(out, bytes).await?;
        Ok::<_, rumo_rs::Error>(())
    };
    match result.await {
        Ok(()) => println!("Vídeo guardado em {}", out.display()),
        Err(err) => {
            tracing::error!("Video generation failed: {err}");
            println!("Não foi possível gerar o vídeo.");
        }
    }
}

#[cfg(feature = "audio-io")]
async fn live(settings: &Settings, input: &mut Input) -> anyhow::Result<()> {
    use rumo_rs::app::{CallAction, LiveCall};
    use rumo_rs::{LiveEvent, LiveService};
    use std::sync::Arc;

    let service = LiveService::from_settings(settings, Arc::new(rumo_rs::audio::CpalDevices));
    let mut call = LiveCall::new(service);
    println!("[A Ligar] Enter para desligar.");
    call.open().await;

    let mut shown = (String::new(), false);
    loop {
        if let Some(error) = call.error() {
            println!("{error}");
            let retry = call.actions().contains(&CallAction::Retry);
            let answer = prompt(input, "Tentar novamente? [s/N] ").await?;
            if retry && matches!(answer.as_deref().map(str::trim), Some("s" | "S" | "sim")) {
                call.retry().await;
                continue;
            }
            break;
        }
        tokio::select! {
            event = call.next_event() => match event {
                None | Some(LiveEvent::Closed) => break,
                Some(_) => {
                    let now = (call.status_label().to_string(), call.voice_detected());
                    if now != shown {
                        println!("[{}]{}", now.0, if now.1 { " A detetar voz..." } else { "" });
                        shown = now;
                    }
                }
            },
            line = input.next_line() => {
                line?;
                break;
            }
        }
    }
    call.close().await;
    println!("Chamada terminada.");
    Ok(())
}

#[cfg(not(feature = "audio-io"))]
#[allow(clippy::unused_async)]
async fn live(_settings: &Settings, _input: &mut Input) -> anyhow::Result<()> {
    println!("Chamadas de voz indisponíveis: compile com --features audio-io.");
    Ok(())
}

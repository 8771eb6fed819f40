//! Interactive chat loop on stdin.
//!
//! Each line is either a message or a slash command that switches the
//! session context.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use solace_chat::ConversationOrchestrator;
use solace_core::types::{Language, Partition};

const HELP: &str = "Commands: /source <id>, /lang <code>, /help, /quit";

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Message(&'a str),
    Source(Partition),
    Lang(Language),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_line(line: &str) -> Input<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "source" => arg
            .parse()
            .map(Input::Source)
            .unwrap_or_else(|e| Input::Invalid(format!("{}", e))),
        "lang" => arg
            .parse()
            .map(Input::Lang)
            .unwrap_or_else(|e| Input::Invalid(format!("{}", e))),
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => Input::Invalid(format!("unknown command /{}", other)),
    }
}

fn prompt(session: &ConversationOrchestrator) {
    print!("[{} | {}] > ", session.partition(), session.language());
    let _ = std::io::stdout().flush();
}

/// Read stdin until EOF or `/quit`, printing one reply per message.
pub async fn run(session: &mut ConversationOrchestrator) -> std::io::Result<()> {
    run_lines(session, BufReader::new(tokio::io::stdin())).await
}

/// Chat loop over any line source. The active partition is primed on entry
/// and again after every `/source` switch.
async fn run_lines<R>(session: &mut ConversationOrchestrator, reader: R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    session.prime().await;
    println!("{}", HELP);
    prompt(session);

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Message(text) => {
                if let Some(reply) = session.submit(text).await {
                    println!("\n{}\n", reply.text);
                }
            }
            Input::Source(partition) => {
                let language = session.language();
                session.set_context(partition, language);
                session.prime().await;
                println!("Source set to {}", partition.display_name());
            }
            Input::Lang(language) => {
                let partition = session.partition();
                session.set_context(partition, language);
                println!("Language set to {}", language.display_name());
            }
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
            Input::Invalid(reason) => println!("{}", reason),
        }
        prompt(session);
    }

    println!();
    Ok(())
}

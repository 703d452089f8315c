use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use chat_logging::chat_info;
use pagemate_core::{update, AppState, Msg};

use super::commands::{self, Command};
use super::effects::EffectRunner;
use super::persistence;
use super::render::{RenderOp, Renderer};
use super::logging;

/// Everything the main loop reacts to: core messages from the input
/// thread and the engine pump, plus frontend-only commands.
enum Input {
    Core(Msg),
    View,
    Raw,
    Help,
    Quit,
}

pub fn run_app() {
    logging::initialize();
    chat_info!("pagemate {} starting", env!("CARGO_PKG_VERSION"));

    let output_dir = std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("output");

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    forward_msgs(msg_rx, input_tx.clone());

    let runner = EffectRunner::new(msg_tx.clone(), output_dir.clone());

    if let Some(summary) = persistence::load_context_snapshot(&output_dir) {
        let _ = msg_tx.send(Msg::RestoreContext(summary));
    }
    let _ = msg_tx.send(Msg::Tick);

    spawn_input_reader(input_tx);

    println!("pagemate ready. /help for commands");

    let mut state = AppState::new();
    let mut renderer = Renderer::new();
    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Core(msg) => dispatch(&mut state, msg, &runner, &mut renderer),
            Input::View => {
                dispatch(&mut state, Msg::ViewModeToggled, &runner, &mut renderer);
                print_document(&state);
            }
            Input::Raw => {
                dispatch(&mut state, Msg::RawToggled, &runner, &mut renderer);
                print_document(&state);
            }
            Input::Help => println!("{}", commands::HELP),
            Input::Quit => break,
        }
    }

    chat_info!("pagemate exiting");
}

fn dispatch(state: &mut AppState, msg: Msg, runner: &EffectRunner, renderer: &mut Renderer) {
    let current = std::mem::take(state);
    let (mut next, effects) = update(current, msg);
    runner.enqueue(effects);
    if next.consume_dirty() {
        print_ops(renderer.apply(&next.view()));
    }
    *state = next;
}

fn print_ops(ops: Vec<RenderOp>) {
    let mut stdout = std::io::stdout().lock();
    for op in ops {
        let result = match op {
            RenderOp::Line(text) => writeln!(stdout, "{text}"),
            RenderOp::Partial(text) => write!(stdout, "{text}"),
        };
        if result.is_err() {
            return;
        }
    }
    let _ = stdout.flush();
}

fn print_document(state: &AppState) {
    match Renderer::document_body(&state.view()) {
        Some(body) => println!("{body}"),
        None => println!("no document loaded; run /prompt first"),
    }
}

/// Bridges the engine-facing `Msg` channel into the main input channel.
fn forward_msgs(msg_rx: mpsc::Receiver<Msg>, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Ok(msg) = msg_rx.recv() {
            if input_tx.send(Input::Core(msg)).is_err() {
                break;
            }
        }
    });
}

fn spawn_input_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(command) = commands::parse(&line) else {
                continue;
            };
            let inputs = translate(command);
            for input in inputs {
                if input_tx.send(input).is_err() {
                    return;
                }
            }
        }
        // stdin closed; shut the app down.
        let _ = input_tx.send(Input::Quit);
    });
}

fn translate(command: Command) -> Vec<Input> {
    match command {
        Command::Open(url) => vec![Input::Core(Msg::PageOpened(url))],
        Command::Chat(text) => vec![
            Input::Core(Msg::InputChanged(text)),
            Input::Core(Msg::QuerySubmitted),
        ],
        Command::Ask(query) => vec![Input::Core(Msg::OneShotSubmitted(query))],
        Command::Webhook(url) => vec![Input::Core(Msg::WebhookUrlChanged(url))],
        Command::Prompt(prompt) => vec![
            Input::Core(Msg::PromptChanged(prompt)),
            Input::Core(Msg::PromptSubmitted),
        ],
        Command::Widget => vec![Input::Core(Msg::WidgetToggled)],
        Command::Close => vec![Input::Core(Msg::WidgetClosed)],
        Command::View => vec![Input::View],
        Command::Raw => vec![Input::Raw],
        Command::CopyCode(code_id) => vec![Input::Core(Msg::CopyCodeRequested { code_id })],
        Command::CopyDoc => vec![Input::Core(Msg::CopyDocumentRequested)],
        Command::Save => vec![Input::Core(Msg::SaveRequested)],
        Command::Export => vec![Input::Core(Msg::ExportRequested)],
        Command::Help => vec![Input::Help],
        Command::Quit => vec![Input::Quit],
        Command::Unknown(name) => {
            println!("unknown command {name}; /help for commands");
            Vec::new()
        }
    }
}

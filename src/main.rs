mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use space_invader::config::Config;
use space_invader::entities::Difficulty;
use space_invader::host::{Host, Menu, Screen};

/// Render cadence. Matches the movement sample so held keys feel immediate.
const FRAME: Duration = Duration::from_millis(16);

/// A direction key counts as held if its last press/repeat event arrived
/// within this many frames. Covers terminals that never send key-release
/// events: OS key repeat refreshes the key well before the window expires.
const HOLD_WINDOW: u64 = 8;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn held_any(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];

enum Control {
    Continue,
    Quit,
}

// ── Input ─────────────────────────────────────────────────────────────────────

fn handle_menu_key(menu: &mut Menu, code: KeyCode) -> MenuAction {
    match code {
        KeyCode::Esc => MenuAction::Quit,
        KeyCode::Enter => MenuAction::Start,
        KeyCode::Up => {
            menu.select_previous();
            MenuAction::None
        }
        KeyCode::Down | KeyCode::Tab => {
            menu.select_next();
            MenuAction::None
        }
        KeyCode::Backspace => {
            menu.pop_char();
            MenuAction::None
        }
        KeyCode::Char(c) => {
            menu.push_char(c);
            MenuAction::None
        }
        _ => MenuAction::None,
    }
}

enum MenuAction {
    None,
    Start,
    Quit,
}

/// Apply one key event to whichever screen is active.
///
/// Fire is edge-triggered: only `Press` events reach `fire_requested`, so a
/// held Space bar never auto-fires through key repeat.
fn handle_key(
    host: &mut Host,
    key_frame: &mut HashMap<KeyCode, u64>,
    key: KeyEvent,
    frame: u64,
) -> Control {
    let KeyEvent {
        code,
        kind,
        modifiers,
        ..
    } = key;

    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Control::Quit;
    }

    match kind {
        KeyEventKind::Release => {
            key_frame.remove(&code);
            return Control::Continue;
        }
        KeyEventKind::Repeat => {
            key_frame.insert(code, frame);
            return Control::Continue;
        }
        KeyEventKind::Press => {
            key_frame.insert(code, frame);
        }
    }

    match host.screen_mut() {
        Screen::Menu(menu) => match handle_menu_key(menu, code) {
            MenuAction::Quit => return Control::Quit,
            MenuAction::Start => {
                key_frame.clear();
                host.start_round();
            }
            MenuAction::None => {}
        },
        Screen::Round(round) => match code {
            KeyCode::Char(' ') => round.fire_requested(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                key_frame.clear();
                host.abandon_round();
            }
            _ => {}
        },
    }
    Control::Continue
}

// ── Main loop ─────────────────────────────────────────────────────────────────

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>, host: &mut Host) -> std::io::Result<()> {
    // Maps each held key to the frame it was last seen (press or repeat).
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;

        while let Ok(ev) = rx.try_recv() {
            if let Event::Key(key) = ev {
                if let Control::Quit = handle_key(host, &mut key_frame, key, frame) {
                    return Ok(());
                }
            }
        }

        if let Some(round) = host.round_mut() {
            round.set_move_intent(
                held_any(&key_frame, &LEFT_KEYS, frame),
                held_any(&key_frame, &RIGHT_KEYS, frame),
            );
        }

        let elapsed = frame_start.duration_since(last);
        last = frame_start;
        let snapshot = host.update(elapsed);

        match (host.screen(), snapshot) {
            (Screen::Round(_), Some(snapshot)) => display::render_round(out, &snapshot)?,
            (Screen::Menu(menu), _) => display::render_menu(out, menu)?,
            (Screen::Round(_), None) => {}
        }

        let spent = frame_start.elapsed();
        if spent < FRAME {
            thread::sleep(FRAME - spent);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let file = std::fs::File::create(&config.log_file)
        .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config)?;
    info!(?config, "starting space invader");
    if let Some(name) = &config.rejected_difficulty {
        warn!(name = %name, fallback = %Difficulty::default(), "unknown difficulty, using default");
    }

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Key-release events let held directions stop immediately; terminals
    // without the protocol fall back to the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread so the frame loop never waits
    // on terminal I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(err) => {
                warn!(%err, "input thread stopped");
                break;
            }
        }
    });

    let mut host = Host::new(Menu::new(config.difficulty.unwrap_or_default()), config.seed);
    let result = run(&mut out, &rx, &mut host);

    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("shutting down");
    result.context("terminal error")
}

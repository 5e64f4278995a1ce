use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{error, info};
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::{LocalSet, spawn_local};

use quran_viewer::catalog::Catalog;
use quran_viewer::panic_handler;
use quran_viewer::pdf::{DocumentSource, RenderBackend, StripLayout};
use quran_viewer::settings::{
    PreferenceStore, Settings, YamlFileStore, default_config_path, default_preferences_path,
    load_settings,
};
use quran_viewer::viewer::{AppContext, Effect, LoadState, Message, Point, TouchEvent, Viewer};

#[derive(Parser, Debug)]
#[command(name = "quran-viewer", version, about = "Page viewer for the Amharic Quran translation")]
struct Args {
    /// PDF to open instead of the configured document
    document: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory rendered pages are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

/// What the host loop reacts to
#[derive(Debug)]
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
enum HostEvent {
    Message(Message),
    Status,
    Chapters,
    Quit,
}

fn main() -> Result<()> {
    panic_handler::initialize_panic_handler();
    let args = Args::parse();

    let config_path = args
        .config
        .or_else(default_config_path)
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut settings = load_settings(&config_path);
    if let Some(document) = args.document {
        settings.document = document;
    }
    if let Some(output_dir) = args.output_dir {
        settings.output_dir = output_dir;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }

    let level: LevelFilter = settings
        .log_level
        .parse()
        .map_err(|_| anyhow!("invalid log level: {}", settings.log_level))?;
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&settings.log_file)
            .with_context(|| format!("cannot create log file {:?}", settings.log_file))?,
    )?;

    info!("Starting quran-viewer with settings from {config_path:?}");

    let catalog = Catalog::builtin().context("built-in surah table is invalid")?;
    let store = YamlFileStore::open(
        default_preferences_path().unwrap_or_else(|| PathBuf::from("preferences.yaml")),
    );
    info!("Preferences stored at {:?}", store.path());

    let res = start(settings, catalog, store);
    if let Err(err) = &res {
        error!("Application error: {err:?}");
    }
    info!("Shutting down quran-viewer");
    res
}

#[cfg(feature = "pdf")]
fn start(settings: Settings, catalog: Catalog, store: YamlFileStore) -> Result<()> {
    let backend = quran_viewer::pdf::mupdf_backend::MupdfBackend::new(&settings.output_dir);
    run(settings, catalog, backend, store)
}

#[cfg(not(feature = "pdf"))]
fn start(_settings: Settings, _catalog: Catalog, _store: YamlFileStore) -> Result<()> {
    bail!("quran-viewer was built without PDF support; rebuild with `--features pdf`")
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn run<B, S>(settings: Settings, catalog: Catalog, backend: B, store: S) -> Result<()>
where
    B: RenderBackend + 'static,
    S: PreferenceStore + 'static,
{
    let viewport = StripLayout::new(Vec::new(), settings.viewport_width, settings.viewport_height)
        .with_gap(settings.page_gap);
    let context = AppContext {
        catalog,
        backend,
        store,
        source: DocumentSource::new(settings.document.clone()),
        settings,
    };
    let viewer = Viewer::new(context, viewport);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = LocalSet::new();
    let result = local.block_on(&runtime, host(viewer));
    drop(local);
    // stdin is read on a blocking thread that never returns on its own
    runtime.shutdown_background();
    result
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
async fn host<B, S>(mut viewer: Viewer<B, S, StripLayout>) -> Result<()>
where
    B: RenderBackend + 'static,
    S: PreferenceStore,
{
    let (tx, rx) = flume::unbounded();
    spawn_local(read_commands(tx.clone()));

    let effects = viewer.startup();
    dispatch(&mut viewer, effects, &tx).await;
    print_status(&viewer);

    while let Ok(event) = rx.recv_async().await {
        match event {
            HostEvent::Message(message) => {
                let from_user = !matches!(
                    message,
                    Message::RenderQueueDrained | Message::ResizeSettled(_)
                );
                let effects = viewer.update(message);
                dispatch(&mut viewer, effects, &tx).await;
                if from_user {
                    print_status(&viewer);
                }
            }
            HostEvent::Status => print_status(&viewer),
            HostEvent::Chapters => {
                for chapter in viewer.visible_chapters() {
                    println!("{}", chapter.summary());
                }
            }
            HostEvent::Quit => break,
        }
    }
    Ok(())
}

/// Carry out effects until none are left. Loads run inline; renders and
/// timers run as local tasks that report back over the channel.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
async fn dispatch<B, S>(
    viewer: &mut Viewer<B, S, StripLayout>,
    effects: Vec<Effect>,
    tx: &flume::Sender<HostEvent>,
) where
    B: RenderBackend + 'static,
    S: PreferenceStore,
{
    let mut pending = VecDeque::from(effects);
    while let Some(effect) = pending.pop_front() {
        match effect {
            Effect::ScrollIntoView(page) => {
                viewer.viewport_mut().scroll_into_view(page);
                pending.extend(viewer.update(Message::Scrolled));
            }
            Effect::DrainRenderQueue => {
                if let Some(renderer) = viewer.renderer() {
                    let tx = tx.clone();
                    spawn_local(async move {
                        renderer.drain_queue().await;
                        let _ = tx.send(HostEvent::Message(Message::RenderQueueDrained));
                    });
                }
            }
            Effect::ApplyTheme(theme) => println!("Theme: {theme}"),
            Effect::LoadDocument => {
                println!("Loading document...");
                pending.extend(viewer.load().await);
            }
            Effect::ScheduleResizeSettle { token, delay } => {
                let tx = tx.clone();
                spawn_local(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(HostEvent::Message(Message::ResizeSettled(token)));
                });
            }
        }
    }
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn print_status<B, S>(viewer: &Viewer<B, S, StripLayout>)
where
    B: RenderBackend,
    S: PreferenceStore,
{
    match viewer.load_state() {
        LoadState::Idle => {}
        LoadState::Loading => println!("Loading document..."),
        LoadState::Failed(reason) => {
            println!("Failed to load document: {reason}. Type `retry` to try again.");
        }
        LoadState::Ready => {
            let info = viewer.page_info();
            let chapter = info
                .chapter
                .map(|(number, name)| format!("  [{number}. {name}]"))
                .unwrap_or_default();
            println!(
                "Page {}/{}  zoom {}%{}",
                info.current, info.total, info.zoom_percent, chapter
            );
            if viewer.panel().is_open() {
                println!(
                    "Chapter panel open ({} listed, search: {:?})",
                    viewer.visible_chapters().len(),
                    viewer.panel().query()
                );
            }
        }
    }
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
async fn read_commands(tx: flume::Sender<HostEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(events) => {
                    for event in events {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {e}");
                break;
            }
        }
    }
    let _ = tx.send(HostEvent::Quit);
}

#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn parse_command(line: &str) -> Result<Vec<HostEvent>> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(vec![]);
    };
    let rest: Vec<&str> = words.collect();

    let number = |index: usize| -> Result<u32> {
        let word = rest
            .get(index)
            .ok_or_else(|| anyhow!("`{command}` needs a number"))?;
        word.parse()
            .with_context(|| format!("`{word}` is not a number"))
    };
    let float = |index: usize| -> Result<f32> {
        let word = rest
            .get(index)
            .ok_or_else(|| anyhow!("`{command}` needs a number"))?;
        word.parse()
            .with_context(|| format!("`{word}` is not a number"))
    };

    let message = match command {
        "n" | "next" => Message::NextPage,
        "p" | "prev" => Message::PreviousPage,
        "first" => Message::FirstPage,
        "last" => Message::LastPage,
        "g" | "goto" => Message::GoToPage(number(0)? as usize),
        "+" | "zoom-in" => Message::ZoomIn,
        "-" | "zoom-out" => Message::ZoomOut,
        "fit" => Message::FitToWidth,
        "theme" => Message::ToggleTheme,
        "panel" => Message::ToggleChapterPanel,
        "close" => Message::CloseChapterPanel,
        "search" => Message::ChapterSearchChanged(rest.join(" ")),
        "chapter" => Message::ChapterSelected(number(0)?),
        "end" => Message::ChapterEndSelected(number(0)?),
        "resize" => Message::WindowResized {
            width: float(0)?,
            height: float(1)?,
        },
        "swipe" => {
            let start = Point::new(400.0, 300.0);
            let end = Point::new(400.0 + float(0)?, 300.0);
            return Ok(vec![
                HostEvent::Message(Message::Touch(TouchEvent::Start(vec![start]))),
                HostEvent::Message(Message::Touch(TouchEvent::End(vec![end]))),
            ]);
        }
        "retry" => Message::Retry,
        "chapters" => return Ok(vec![HostEvent::Chapters]),
        "status" => return Ok(vec![HostEvent::Status]),
        "q" | "quit" => return Ok(vec![HostEvent::Quit]),
        other => bail!("unknown command `{other}`"),
    };
    Ok(vec![HostEvent::Message(message)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_message(line: &str) -> Message {
        let mut events = parse_command(line).unwrap();
        assert_eq!(events.len(), 1, "`{line}` should produce one event");
        match events.remove(0) {
            HostEvent::Message(message) => message,
            _ => panic!("`{line}` should produce a viewer message"),
        }
    }

    #[test]
    fn blank_line_does_nothing() {
        assert!(parse_command("").unwrap().is_empty());
        assert!(parse_command("   ").unwrap().is_empty());
    }

    #[test]
    fn navigation_commands_map_to_messages() {
        assert!(matches!(single_message("n"), Message::NextPage));
        assert!(matches!(single_message("prev"), Message::PreviousPage));
        assert!(matches!(single_message("goto 5"), Message::GoToPage(5)));
        assert!(matches!(single_message("g 12"), Message::GoToPage(12)));
        assert!(matches!(single_message("end 114"), Message::ChapterEndSelected(114)));
    }

    #[test]
    fn search_keeps_every_word() {
        let Message::ChapterSearchChanged(query) = single_message("search al baqara") else {
            panic!("search should change the chapter query");
        };
        assert_eq!(query, "al baqara");
    }

    #[test]
    fn resize_reads_both_dimensions() {
        assert!(matches!(
            single_message("resize 1024 768"),
            Message::WindowResized { width, height } if width == 1024.0 && height == 768.0
        ));
        assert!(parse_command("resize 1024").is_err());
    }

    #[test]
    fn swipe_becomes_touch_start_and_end() {
        let events = parse_command("swipe -100").unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            HostEvent::Message(Message::Touch(TouchEvent::Start(points))) if points[0].x == 400.0
        ));
        assert!(matches!(
            &events[1],
            HostEvent::Message(Message::Touch(TouchEvent::End(points))) if points[0].x == 300.0
        ));
    }

    #[test]
    fn host_commands_are_not_forwarded() {
        assert!(matches!(parse_command("q").unwrap().as_slice(), [HostEvent::Quit]));
        assert!(matches!(parse_command("status").unwrap().as_slice(), [HostEvent::Status]));
        assert!(matches!(parse_command("chapters").unwrap().as_slice(), [HostEvent::Chapters]));
    }

    #[test]
    fn bad_input_is_rejected() {
        let unknown = parse_command("jump 3").unwrap_err();
        assert!(unknown.to_string().contains("unknown command"));

        let missing = parse_command("goto").unwrap_err();
        assert!(missing.to_string().contains("needs a number"));

        assert!(parse_command("goto five").is_err());
        assert!(parse_command("chapter -1").is_err());
        assert!(parse_command("swipe left").is_err());
    }
}

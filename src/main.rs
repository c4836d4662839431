use std::{env, fs::File, io::stdout};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{LevelFilter, WriteLogger};

// Use modules from the library crate
use tocbar::cli::{CliOptions, Command, OutputMode, USAGE};
use tocbar::event_source::KeyboardEventSource;
use tocbar::main_app::{App, run_app_with_event_source};
use tocbar::panic_handler;
use tocbar::session_store::FileSessionStore;
use tocbar::toc::TocTree;
use tocbar::widget::{MountConfig, Sidebar, render_scrollbox_html};

fn main() -> Result<()> {
    // Initialize logging with html5ever DEBUG logs filtered out
    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(LevelFilter::Debug)
            .add_filter_ignore_str("html5ever")
            .build(),
        File::create("tocbar.log")?,
    )?;

    let options = match CliOptions::parse(env::args().skip(1))? {
        Command::Run(options) => options,
        Command::Help => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    let tree = TocTree::load(&options.toc_file).with_context(|| {
        format!(
            "Failed to load table of contents from {}",
            options.toc_file.display()
        )
    })?;
    let session_path = options.session_file.to_string_lossy().into_owned();
    let store = FileSessionStore::load_or_ephemeral(Some(&session_path));

    let sidebar = Sidebar::mount(MountConfig {
        root_path: options.root_path.clone(),
        tree,
        current_location: options.location.clone(),
        store,
    });

    match options.mode {
        OutputMode::Print => {
            println!("{}", sidebar.outline());
            sidebar.unmount();
            Ok(())
        }
        OutputMode::Html => {
            println!("{}", render_scrollbox_html(&sidebar));
            sidebar.unmount();
            Ok(())
        }
        OutputMode::Interactive => run_interactive(sidebar),
    }
}

fn run_interactive(sidebar: Sidebar<FileSessionStore>) -> Result<()> {
    // Initialize panic handler only for interactive TUI mode
    panic_handler::initialize_panic_handler();

    info!("Starting tocbar sidebar");

    // Terminal initialization
    enable_raw_mode().map_err(|e| {
        error!("Failed to enable raw mode: {e}");
        anyhow::anyhow!(
            "Failed to initialize terminal: {e}\n\
             Make sure you are running tocbar in a terminal, or use --print."
        )
    })?;
    let mut stdout = stdout();

    execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|e| {
        error!("Failed to setup terminal: {e}");
        let _ = disable_raw_mode();
        anyhow::anyhow!(
            "Failed to setup terminal: {e}\n\
             Make sure you are running tocbar in a proper terminal environment."
        )
    })?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(sidebar);
    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    // Restore terminal state
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    let navigated_to = app.navigated_to.take();
    app.into_sidebar().unmount();
    if let Some(href) = navigated_to {
        println!("{href}");
    }

    info!("Shutting down tocbar");
    Ok(())
}

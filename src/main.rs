use clap::Parser;
use color_eyre::eyre::eyre;

mod app;
mod catalog;
mod select;
mod ui;
mod widgets;

use app::App;
use catalog::Catalogs;
use select::Choice;

/// TUI for configuring a mock interview practice session
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pre-select a role by id (e.g. "backend")
    #[arg(long)]
    role: Option<String>,

    /// Pre-select a level by id (e.g. "senior")
    #[arg(long)]
    level: Option<String>,

    /// Pre-select a tech stack by id; repeat for several (e.g. --stack go --stack rust)
    #[arg(long = "stack")]
    stacks: Vec<String>,

    /// Pre-select a mode by id (e.g. "drill")
    #[arg(long)]
    mode: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let mut app = App::new(Catalogs::builtin());
    prefill(&mut app, &args)?;

    // Capture is released when the guard drops, on every exit path.
    let _mouse = MouseCapture::acquire()?;

    let mut terminal = ratatui::init();
    let result = run_event_loop(&mut terminal, &mut app);
    ratatui::restore();

    match result {
        Ok(Some(summary)) => {
            println!("{summary}");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Terminal mouse capture as a scoped resource.
struct MouseCapture;

impl MouseCapture {
    fn acquire() -> color_eyre::Result<Self> {
        crossterm::execute!(std::io::stderr(), crossterm::event::EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        let _ = crossterm::execute!(std::io::stderr(), crossterm::event::DisableMouseCapture);
    }
}

/// Apply `--role`/`--level`/`--stack`/`--mode` prefills, validating every id
/// against its catalog.
fn prefill(app: &mut App, args: &Args) -> color_eyre::Result<()> {
    if let Some(role) = &args.role {
        let id = resolve_id(&app.catalogs.roles, role, "role")?;
        app.set_role(&id);
    }
    if let Some(level) = &args.level {
        let id = resolve_id(&app.catalogs.levels, level, "level")?;
        app.set_level(&id);
    }
    for stack in &args.stacks {
        let id = resolve_id(&app.catalogs.stacks, stack, "tech stack")?;
        app.add_stack(&id);
    }
    if let Some(mode) = &args.mode {
        let id = app
            .catalogs
            .modes
            .iter()
            .find(|m| m.id.eq_ignore_ascii_case(mode))
            .map(|m| m.id.clone())
            .ok_or_else(|| {
                let valid: Vec<&str> = app.catalogs.modes.iter().map(|m| m.id.as_str()).collect();
                eyre!("Unknown mode '{}'. Valid ids: {}", mode, valid.join(", "))
            })?;
        app.set_mode(&id);
    }
    Ok(())
}

/// Look up a catalog id case-insensitively, or fail listing the valid ids.
fn resolve_id(catalog: &[Choice], given: &str, what: &str) -> color_eyre::Result<String> {
    catalog
        .iter()
        .find(|choice| choice.id.eq_ignore_ascii_case(given))
        .map(|choice| choice.id.clone())
        .ok_or_else(|| {
            let valid: Vec<&str> = catalog.iter().map(|c| c.id.as_str()).collect();
            eyre!("Unknown {what} '{given}'. Valid ids: {}", valid.join(", "))
        })
}

fn run_event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
) -> color_eyre::Result<Option<String>> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        match event::read()? {
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global quit shortcut
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    return Ok(None);
                }

                match app.handle_key(key) {
                    app::Action::None => {}
                    app::Action::Quit => return Ok(None),
                    app::Action::Accept => return Ok(app.summary()),
                }
            }
            Event::Mouse(mouse) => match app.handle_mouse(mouse) {
                app::Action::None => {}
                app::Action::Quit => return Ok(None),
                app::Action::Accept => return Ok(app.summary()),
            },
            Event::Resize(_, _) => {
                // Terminal will be redrawn on next loop iteration
            }
            _ => {}
        }
    }
}

//! The frame loop: owns the terminal, turns input into commands and steps the field at a
//! fixed rate.

use std::io::{self, BufWriter, Write, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::audio::Audio;
use crate::config::Config;
use crate::field::FireworkField;
use crate::firework::Shape;
use crate::surface::{DOT_SIZE, HalfBlockCanvas};

/// Wall-clock time between automatic launches.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(1000);

/// Most intervals a spawn timer will make up for after a stall.
pub const MAX_CATCH_UP: u32 = 3;

/// Everything built once at startup and shared with the loop.
pub struct Context {
    pub config: Config,
    pub audio: Audio,
}

impl Context {
    pub fn new(config: Config) -> Self {
        let audio = match &config.sound {
            Some(path) => Audio::load(path),
            None => Audio::disabled(),
        };
        Self { config, audio }
    }
}

/// Counts elapsed time and fires once per whole interval. Leftover time carries over, so
/// launches don't drift with frame jitter. Banked time is capped at `MAX_CATCH_UP`
/// intervals, so waking from a suspend doesn't launch a flood.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    interval: Duration,
    accumulated: Duration,
}

impl SpawnTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Add `elapsed` and return how many times the timer fired.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }
        self.accumulated += elapsed;
        let cap = self.interval * MAX_CATCH_UP;
        if self.accumulated > cap {
            self.accumulated = cap;
        }
        let mut fired = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            fired += 1;
        }
        fired
    }
}

/// What a terminal event asks the loop to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Quit,
    SpawnAt { x: f32, y: f32, shape: Shape },
    Resize { cols: u16, rows: u16 },
}

/// Map a terminal event onto a command, given the current size in cells.
pub fn translate_event(event: &Event, cols: u16, rows: u16) -> Option<Command> {
    match event {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
                KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Command::Quit)
                }
                KeyCode::Char('1') => Some(launch_pad(cols, rows, Shape::Heart)),
                KeyCode::Char('2') => Some(launch_pad(cols, rows, Shape::Star)),
                _ => None,
            }
        }
        Event::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(Command::SpawnAt {
                x: (f32::from(mouse_event.column) + 0.5) * DOT_SIZE,
                // Each cell is two dots tall
                y: (f32::from(mouse_event.row) + 0.5) * DOT_SIZE * 2.0,
                shape: Shape::Circle,
            }),
            _ => None,
        },
        Event::Resize(cols, rows) => Some(Command::Resize {
            cols: *cols,
            rows: *rows,
        }),
        _ => None,
    }
}

/// Horizontal centre of the bottom edge.
fn launch_pad(cols: u16, rows: u16, shape: Shape) -> Command {
    Command::SpawnAt {
        x: f32::from(cols) * DOT_SIZE / 2.0,
        y: f32::from(rows) * DOT_SIZE * 2.0,
        shape,
    }
}

/// Take over the terminal and run the show until the user quits.
pub fn run(context: &Context) -> crate::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    guarded(
        &mut stdout,
        |out| {
            execute!(
                out,
                EnterAlternateScreen,
                Hide,
                Clear(ClearType::All),
                EnableMouseCapture
            )
        },
        |out| frame_loop(context, out),
        |out| {
            [
                execute!(out, Show, LeaveAlternateScreen, DisableMouseCapture),
                terminal::disable_raw_mode(),
            ]
        },
    )
}

/// Run `show` once `enter` succeeds, then every `restore` step no matter what failed
/// before. The earliest error wins.
fn guarded<W, const N: usize>(
    out: &mut W,
    enter: impl FnOnce(&mut W) -> io::Result<()>,
    show: impl FnOnce(&mut W) -> crate::Result<()>,
    restore: impl FnOnce(&mut W) -> [io::Result<()>; N],
) -> crate::Result<()> {
    let result = enter(out)
        .map_err(crate::Error::from)
        .and_then(|()| show(out));
    let restored = restore(out);

    result?;
    for step in restored {
        step?;
    }
    Ok(())
}

fn frame_loop<W: Write>(context: &Context, stdout: &mut W) -> crate::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut canvas = HalfBlockCanvas::new(usize::from(cols), usize::from(rows));
    let mut field = FireworkField::new(
        canvas.pixel_width(),
        canvas.pixel_height(),
        context.config.rng(),
    );
    let mut spawn_timer = SpawnTimer::new(SPAWN_INTERVAL);

    let frame_time = Duration::from_secs(1) / context.config.fps.max(1);
    let mut next_frame = Instant::now() + frame_time;
    let mut last_frame = Instant::now();

    tracing::info!(cols, rows, fps = context.config.fps, "Show started");

    loop {
        // Waiting on input until the frame deadline is also the frame limiter
        let now = Instant::now();
        if now < next_frame {
            if event::poll(next_frame - now)? {
                match translate_event(&event::read()?, cols, rows) {
                    Some(Command::Quit) => break,
                    Some(Command::SpawnAt { x, y, shape }) => field.spawn_at(x, y, shape),
                    Some(Command::Resize {
                        cols: new_cols,
                        rows: new_rows,
                    }) => {
                        cols = new_cols;
                        rows = new_rows;
                        canvas.resize(usize::from(cols), usize::from(rows));
                        field.resize(canvas.pixel_width(), canvas.pixel_height());
                        execute!(stdout, Clear(ClearType::All))?;
                    }
                    None => {}
                }
            }
            continue;
        }

        next_frame += frame_time;
        if next_frame < now {
            // Too far behind to catch up, start counting again from here
            next_frame = now + frame_time;
        }

        let elapsed = now.duration_since(last_frame);
        last_frame = now;
        for _ in 0..spawn_timer.advance(elapsed) {
            field.spawn_default();
        }

        field.tick(&context.audio);
        field.render(&mut canvas, context.config.background);
        canvas.present(stdout)?;
    }

    tracing::info!("Show stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, MouseEvent};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    fn click(button: MouseButton, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(button),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = SpawnTimer::new(Duration::from_millis(1000));
        let frame = Duration::from_micros(16_667);
        let fired: u32 = (0..600).map(|_| timer.advance(frame)).sum();
        assert_eq!(fired, 10);
    }

    #[test]
    fn timer_caps_catch_up_after_a_stall() {
        let mut timer = SpawnTimer::new(SPAWN_INTERVAL);
        assert_eq!(timer.advance(Duration::from_secs(3600)), MAX_CATCH_UP);
        assert_eq!(timer.advance(Duration::from_millis(999)), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
    }

    #[test]
    fn timer_carries_leftover_time() {
        let mut timer = SpawnTimer::new(Duration::from_millis(1000));
        assert_eq!(timer.advance(Duration::from_millis(700)), 0);
        assert_eq!(timer.advance(Duration::from_millis(700)), 1);
        assert_eq!(timer.advance(Duration::from_millis(600)), 1);
        assert_eq!(timer.advance(Duration::from_millis(2500)), 2);
        assert_eq!(timer.advance(Duration::from_millis(500)), 1);
        assert_eq!(timer.advance(Duration::from_millis(3500)), MAX_CATCH_UP);
        assert_eq!(timer.advance(Duration::from_millis(999)), 0);
    }

    #[test]
    fn quit_keys() {
        for event in [
            key(KeyCode::Esc, KeyModifiers::NONE),
            key(KeyCode::Char('q'), KeyModifiers::NONE),
            key(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(translate_event(&event, 80, 24), Some(Command::Quit));
        }
        assert_eq!(translate_event(&key(KeyCode::Char('c'), KeyModifiers::NONE), 80, 24), None);

        let released = Event::Key(KeyEvent::new_with_kind(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Release,
        ));
        assert_eq!(translate_event(&released, 80, 24), None);
    }

    #[test]
    fn hotkeys_launch_shapes_from_bottom_centre() {
        assert_eq!(
            translate_event(&key(KeyCode::Char('1'), KeyModifiers::NONE), 80, 24),
            Some(Command::SpawnAt {
                x: 320.0,
                y: 384.0,
                shape: Shape::Heart
            })
        );
        assert_eq!(
            translate_event(&key(KeyCode::Char('2'), KeyModifiers::NONE), 80, 24),
            Some(Command::SpawnAt {
                x: 320.0,
                y: 384.0,
                shape: Shape::Star
            })
        );
    }

    #[test]
    fn left_click_launches_from_the_pointer() {
        assert_eq!(
            translate_event(&click(MouseButton::Left, 10, 5), 80, 24),
            Some(Command::SpawnAt {
                x: 84.0,
                y: 88.0,
                shape: Shape::Circle
            })
        );
        assert_eq!(translate_event(&click(MouseButton::Right, 10, 5), 80, 24), None);
    }

    #[test]
    fn resize_and_ignored_events() {
        assert_eq!(
            translate_event(&Event::Resize(100, 40), 80, 24),
            Some(Command::Resize { cols: 100, rows: 40 })
        );
        assert_eq!(translate_event(&Event::FocusGained, 80, 24), None);
        assert_eq!(translate_event(&key(KeyCode::Char('x'), KeyModifiers::NONE), 80, 24), None);
    }

    fn failing(message: &str) -> io::Result<()> {
        Err(io::Error::other(message.to_owned()))
    }

    #[test]
    fn restore_runs_when_setup_fails() {
        let mut out = Vec::<u8>::new();
        let mut showed = false;
        let mut restore_steps = 0;

        let result = guarded(
            &mut out,
            |_| failing("setup"),
            |_| {
                showed = true;
                Ok(())
            },
            |_| {
                restore_steps += 2;
                [Ok(()), Ok(())]
            },
        );

        assert!(result.unwrap_err().to_string().contains("setup"));
        assert!(!showed);
        assert_eq!(restore_steps, 2);
    }

    #[test]
    fn show_error_wins_over_restore_errors() {
        let mut out = Vec::<u8>::new();
        let mut raw_mode_off = false;

        let result = guarded(
            &mut out,
            |_| Ok(()),
            |_| Err(failing("show").unwrap_err().into()),
            |_| {
                let screen = failing("leave screen");
                raw_mode_off = true;
                [screen, Ok(())]
            },
        );

        assert!(result.unwrap_err().to_string().contains("show"));
        assert!(raw_mode_off);
    }

    #[test]
    fn restore_error_surfaces_after_a_clean_show() {
        let mut out = Vec::<u8>::new();
        let result = guarded(
            &mut out,
            |out| out.write_all(b"enter"),
            |out| Ok(out.write_all(b" show")?),
            |out| [out.write_all(b" leave"), failing("raw mode")],
        );

        assert!(result.unwrap_err().to_string().contains("raw mode"));
        assert_eq!(out, b"enter show leave");
    }

    #[test]
    fn context_without_sound_is_silent() {
        let context = Context::new(Config {
            sound: None,
            ..Config::default()
        });
        assert!(!context.audio.is_enabled());
    }
}

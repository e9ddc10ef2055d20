use crate::entity::{Direction, Position};
use crate::game::{Cell, GameState, Snapshot};
use crate::renderer::{Input, Renderer};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, Write};
use std::time::{Duration, Instant};

pub struct CliRenderer {
    last_render: Instant,
    target_frame_time: Duration,
    poll_timeout: Duration,
    // Set between init() and cleanup(); the terminal is restored only once
    active: bool,
}

impl CliRenderer {
    pub fn new() -> Self {
        Self {
            last_render: Instant::now(),
            // Target 30 FPS for smooth rendering
            target_frame_time: Duration::from_millis(33),
            poll_timeout: Duration::from_millis(10),
            active: false,
        }
    }

    fn draw_cell(&self, cell: Cell, stdout: &mut io::Stdout) -> io::Result<()> {
        match cell {
            Cell::Empty => {
                queue!(stdout, SetBackgroundColor(Color::Black), Print("  "))?;
            }
            Cell::Head => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::DarkYellow),
                    SetForegroundColor(Color::Black),
                    Print("@@")
                )?;
            }
            Cell::Body => {
                queue!(stdout, SetBackgroundColor(Color::Yellow), Print("  "))?;
            }
            Cell::Food => {
                queue!(
                    stdout,
                    SetBackgroundColor(Color::Black),
                    SetForegroundColor(Color::Red),
                    Print("()")
                )?;
            }
        }
        Ok(())
    }

    fn draw_info(&self, snapshot: &Snapshot, stdout: &mut io::Stdout) -> io::Result<()> {
        let info_row = snapshot.grid_size as u16;

        queue!(
            stdout,
            cursor::MoveTo(0, info_row + 1),
            ResetColor,
            terminal::Clear(ClearType::CurrentLine),
            Print(format!(
                "Score: {}  Length: {}  Heading: {:?}",
                snapshot.score, snapshot.length, snapshot.direction
            ))
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, info_row + 2),
            Print("Controls: Arrow Keys / WASD to move | Q to quit | R to restart")
        )?;

        queue!(
            stdout,
            cursor::MoveTo(0, info_row + 3),
            terminal::Clear(ClearType::CurrentLine)
        )?;
        if snapshot.state == GameState::Over {
            queue!(
                stdout,
                SetForegroundColor(Color::Red),
                Print(format!("GAME OVER! Score: {}. Press R to restart", snapshot.score)),
                ResetColor
            )?;
        }

        Ok(())
    }

    fn key_to_input(code: KeyCode) -> Option<Input> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Input::Quit),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
            KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Input::Direction(Direction::Up)),
            KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Input::Direction(Direction::Down)),
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Input::Direction(Direction::Left)),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Input::Direction(Direction::Right)),
            _ => None,
        }
    }
}

impl Default for CliRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CliRenderer {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        self.active = true;
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        // Frame rate limiting: skip rendering if not enough time has passed
        if self.last_render.elapsed() < self.target_frame_time {
            return Ok(());
        }

        self.last_render = Instant::now();

        let mut stdout = io::stdout();

        queue!(stdout, cursor::MoveTo(0, 0))?;

        for y in 0..snapshot.grid_size {
            for x in 0..snapshot.grid_size {
                self.draw_cell(snapshot.cell_at(Position::new(x, y)), &mut stdout)?;
            }
            queue!(stdout, ResetColor, Print("\r\n"))?;
        }

        self.draw_info(snapshot, &mut stdout)?;

        stdout.flush()?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut stdout = io::stdout();
        execute!(
            stdout,
            cursor::Show,
            terminal::LeaveAlternateScreen,
            ResetColor
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        if event::poll(self.poll_timeout)? {
            // Windows reports key releases too
            if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                return Ok(Self::key_to_input(code));
            }
        }
        Ok(None)
    }
}

impl Drop for CliRenderer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

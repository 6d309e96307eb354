//! Tortoise graphics - a small drawing library exposed as runtime procedures
//!
//! A tortoise walks the plane from the origin, drawing a line behind it while
//! its pen is down. Lines are emitted as gnuplot `plot` commands to a writer,
//! so piping the output into `gnuplot` renders the drawing.
//!
//! All state lives in a [`Tortoise`] context; the registered procedures each
//! hold a shared handle to it.

use crate::error::{BridgeError, BridgeResult};
use crate::runtime::Runtime;
use crate::value::DynValue;
use parking_lot::{Mutex, MutexGuard};
use std::f64::consts::PI;
use std::io::Write;
use std::sync::Arc;

pub const RESET: &str = "tortoise-reset";
pub const PEN_UP: &str = "tortoise-penup";
pub const PEN_DOWN: &str = "tortoise-pendown";
pub const TURN: &str = "tortoise-turn";
pub const MOVE: &str = "tortoise-move";

/// Position, heading (radians) and pen of a tortoise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TortoiseState {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub pen_down: bool,
}

impl Default for TortoiseState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            heading: 0.0,
            pen_down: true,
        }
    }
}

/// Drawing context writing gnuplot commands to `W`
pub struct Tortoise<W> {
    state: Mutex<TortoiseState>,
    output: Mutex<W>,
}

impl<W: Write> Tortoise<W> {
    pub fn new(output: W) -> Self {
        Self {
            state: Mutex::new(TortoiseState::default()),
            output: Mutex::new(output),
        }
    }

    pub fn state(&self) -> TortoiseState {
        *self.state.lock()
    }

    /// Direct access to the writer
    pub fn output(&self) -> MutexGuard<'_, W> {
        self.output.lock()
    }

    /// Plot setup for a `width` × `height` viewport centred on the origin
    pub fn preamble(&self, width: u32, height: u32) -> BridgeResult<()> {
        self.emit(&format!(
            "set multiplot\n\
             set parametric\n\
             set xrange [-{w}:{w}]\n\
             set yrange [-{h}:{h}]\n\
             set size ratio -1\n\
             unset xtics\n\
             unset ytics\n",
            w = width,
            h = height
        ))
    }

    /// Back to the origin, heading east, pen down; clears the plot
    pub fn reset(&self) -> BridgeResult<()> {
        *self.state.lock() = TortoiseState::default();
        self.emit("clear\n")
    }

    /// Lift the pen, returning whether it was down
    pub fn pen_up(&self) -> bool {
        std::mem::replace(&mut self.state.lock().pen_down, false)
    }

    /// Lower the pen, returning whether it was down
    pub fn pen_down(&self) -> bool {
        std::mem::replace(&mut self.state.lock().pen_down, true)
    }

    /// Turn counter-clockwise; returns the new heading in degrees
    pub fn turn(&self, degrees: f64) -> f64 {
        let mut state = self.state.lock();
        state.heading += degrees.to_radians();
        state.heading * 180.0 / PI
    }

    /// Walk forward, drawing if the pen is down; returns the new position
    pub fn advance(&self, length: f64) -> BridgeResult<(f64, f64)> {
        let (from, to, pen_down) = {
            let mut state = self.state.lock();
            let from = (state.x, state.y);
            state.x += length * state.heading.cos();
            state.y += length * state.heading.sin();
            (from, (state.x, state.y), state.pen_down)
        };

        if pen_down {
            self.emit(&draw_line(from, to))?;
        }
        Ok(to)
    }

    fn emit(&self, commands: &str) -> BridgeResult<()> {
        let mut output = self.output.lock();
        output
            .write_all(commands.as_bytes())
            .and_then(|()| output.flush())
            .map_err(BridgeError::native)
    }
}

/// Parametric gnuplot segment from `from` to `to`
fn draw_line(from: (f64, f64), to: (f64, f64)) -> String {
    format!(
        "plot [0:1] {:.6} + {:.6} * t, {:.6} + {:.6} * t notitle\n",
        from.0,
        to.0 - from.0,
        from.1,
        to.1 - from.1
    )
}

impl<W: Write + Send + 'static> Tortoise<W> {
    /// Register the tortoise procedures in `runtime`
    pub fn install(self: &Arc<Self>, runtime: &Runtime) -> BridgeResult<()> {
        let tortoise = Arc::clone(self);
        runtime.define_curried(RESET, move || {
            let tortoise = Arc::clone(&tortoise);
            move || move || tortoise.reset()
        })?;

        let tortoise = Arc::clone(self);
        runtime.define_curried(PEN_UP, move || {
            let tortoise = Arc::clone(&tortoise);
            move || move || tortoise.pen_up()
        })?;

        let tortoise = Arc::clone(self);
        runtime.define_curried(PEN_DOWN, move || {
            let tortoise = Arc::clone(&tortoise);
            move || move || tortoise.pen_down()
        })?;

        let tortoise = Arc::clone(self);
        runtime.define_curried(TURN, move |degrees: f64| {
            let tortoise = Arc::clone(&tortoise);
            move || move || tortoise.turn(degrees)
        })?;

        let tortoise = Arc::clone(self);
        runtime.define_curried(MOVE, move |length: f64| {
            let tortoise = Arc::clone(&tortoise);
            move || move || {
                let (x, y) = tortoise.advance(length)?;
                Ok::<_, BridgeError>(crate::list![x, y])
            }
        })?;

        Ok(())
    }
}

/// Parse one command line: `name arg...`
///
/// Blank lines and `;` comments yield `None`. Arguments are read as
/// booleans (`#t`/`#f`), integers, reals, double-quoted strings, or symbols.
/// Strings may contain spaces and `;`, with `\"` and `\\` as escapes.
pub fn parse_command(line: &str) -> Option<(String, Vec<DynValue>)> {
    let mut tokens = tokenize(line).into_iter();
    let name = match tokens.next()? {
        Token::Word(word) | Token::Text(word) => word,
    };
    Some((name, tokens.map(Token::into_value).collect()))
}

enum Token {
    Word(String),
    Text(String),
}

impl Token {
    fn into_value(self) -> DynValue {
        match self {
            Token::Text(text) => DynValue::from(text),
            Token::Word(word) => parse_atom(&word),
        }
    }
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ';' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                // an unterminated string runs to the end of the line
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => text.extend(chars.next()),
                        c => text.push(c),
                    }
                }
                tokens.push(Token::Text(text));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == ';' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    tokens
}

fn parse_atom(word: &str) -> DynValue {
    match word {
        "#t" => return DynValue::from(true),
        "#f" => return DynValue::from(false),
        _ => {}
    }
    if let Ok(int) = word.parse::<i64>() {
        return DynValue::from(int);
    }
    if let Ok(real) = word.parse::<f64>() {
        return DynValue::from(real);
    }
    DynValue::symbol(word)
}

#[cfg(test)]
mod tests;

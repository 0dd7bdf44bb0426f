//! Single-dot movement: one step along the current heading, then the
//! landed cell is resolved according to the dot's mode.
//!
//! [`advance`] only touches the dot it is given and the read-only world.
//! Anything that needs the rest of the engine (output, input, spawning,
//! junction pairing, halting) is returned as an [`Effect`] for the
//! scheduler to commit.

use dots_core::{Axis, Direction, Position, RuntimeFault, Value};
use dots_grid::{CellKind, World};
use smallvec::SmallVec;

use crate::dot::{DeathCause, Dot, DotState, Mode, Register};

/// Work a step leaves for the scheduler.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Effect {
    /// A print statement completed with this text.
    Output(String),
    /// The dot stands on `?` and needs a line of input.
    Input(Register),
    /// The dot passed through `from` and was relocated to its current
    /// position by a warp or library link.
    Relocated { from: Position },
    /// The dot hit a duplicator; one clone per extra heading.
    Split(SmallVec<[Direction; 2]>),
    /// The dot parked at a junction, arriving along `axis`.
    Arrive { at: Position, axis: Axis },
    /// The dot reached `&`.
    Halt,
}

pub(crate) type Effects = SmallVec<[Effect; 2]>;

/// Move `dot` one cell and resolve where it lands.
pub(crate) fn advance(world: &World, dot: &mut Dot) -> Result<Effects, RuntimeFault> {
    let mut effects = Effects::new();
    let mode = match &dot.state {
        DotState::Alive(Mode::Waiting { .. } | Mode::AwaitingInput { .. }) | DotState::Dead(_) => {
            return Ok(effects)
        }
        DotState::Alive(mode) => mode.clone(),
    };

    dot.just_split = false;
    dot.position = dot.position.step(dot.direction);
    let kind = world.classify(dot.position);

    match mode {
        Mode::Travel => travel(world, dot, kind, &mut effects)?,
        Mode::ReadNumber { register, digits } => {
            read_number(world, dot, kind, register, digits, &mut effects)?
        }
        Mode::Print {
            newline,
            ascii,
            quote,
            text,
        } => print(world, dot, kind, newline, ascii, quote, text, &mut effects)?,
        Mode::Waiting { .. } | Mode::AwaitingInput { .. } => {}
    }
    Ok(effects)
}

fn travel(
    world: &World,
    dot: &mut Dot,
    kind: CellKind,
    effects: &mut Effects,
) -> Result<(), RuntimeFault> {
    let dir = dot.direction;
    let at = dot.position;
    match kind {
        CellKind::Outside => dot.kill(DeathCause::OffGrid),
        CellKind::Blank | CellKind::Comment => dot.kill(DeathCause::Derailed),
        CellKind::Track(axis) => {
            if axis != dir.axis() {
                dot.kill(DeathCause::Derailed);
            }
        }
        CellKind::Bracket => {
            if dir.axis() != Axis::Horizontal {
                dot.kill(DeathCause::Derailed);
            }
        }
        CellKind::Crossing
        | CellKind::Start
        | CellKind::Text
        | CellKind::Digit(_)
        | CellKind::Query => {}
        CellKind::Mirror(mirror) => dot.direction = mirror.reflect(dir),
        CellKind::Turn(to) => {
            if to.axis() != dir.axis() {
                dot.direction = to;
            }
        }
        CellKind::Reflector(to) => dot.direction = to,
        CellKind::Duplicator => {
            let exits: SmallVec<[Direction; 3]> = [dir, dir.turn_left(), dir.turn_right()]
                .into_iter()
                .filter(|&exit| world.connects(at, exit))
                .collect();
            match exits.split_first() {
                None => dot.kill(DeathCause::Derailed),
                Some((&first, rest)) => {
                    dot.direction = first;
                    if !rest.is_empty() {
                        dot.just_split = true;
                        effects.push(Effect::Split(rest.iter().copied().collect()));
                    }
                }
            }
        }
        CellKind::Halt => effects.push(Effect::Halt),
        CellKind::SetValue => dot.state = read_into(Register::Value),
        CellKind::SetTag => dot.state = read_into(Register::Tag),
        CellKind::Print => {
            dot.state = DotState::Alive(Mode::Print {
                newline: true,
                ascii: false,
                quote: None,
                text: String::new(),
            })
        }
        CellKind::Warp(_) => {
            let to = world
                .warp_partner(at)
                .ok_or(RuntimeFault::DanglingLink { at })?;
            relocate(dot, to, effects);
        }
        CellKind::LibraryLink(_) | CellKind::LibraryExport(_) => {
            let to = world
                .library_target(at)
                .ok_or(RuntimeFault::DanglingLink { at })?;
            relocate(dot, to, effects);
        }
        CellKind::Operator(..) | CellKind::Tilde { .. } => {
            dot.state = DotState::Alive(Mode::Waiting { at });
            effects.push(Effect::Arrive {
                at,
                axis: dir.axis(),
            });
        }
    }
    Ok(())
}

fn read_into(register: Register) -> DotState {
    DotState::Alive(Mode::ReadNumber {
        register,
        digits: None,
    })
}

fn relocate(dot: &mut Dot, to: Position, effects: &mut Effects) {
    effects.push(Effect::Relocated { from: dot.position });
    dot.position = to;
}

fn read_number(
    world: &World,
    dot: &mut Dot,
    kind: CellKind,
    register: Register,
    digits: Option<Value>,
    effects: &mut Effects,
) -> Result<(), RuntimeFault> {
    match (kind, digits) {
        (CellKind::Digit(d), _) => {
            let digits = Some(digits.unwrap_or(Value::ZERO).push_digit(d));
            dot.state = DotState::Alive(Mode::ReadNumber { register, digits });
            Ok(())
        }
        (CellKind::Query, None) => {
            dot.state = DotState::Alive(Mode::AwaitingInput { register });
            effects.push(Effect::Input(register));
            Ok(())
        }
        (_, digits) => {
            if let Some(v) = digits {
                dot.set_register(register, v);
            }
            dot.state = DotState::Alive(Mode::Travel);
            travel(world, dot, kind, effects)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn print(
    world: &World,
    dot: &mut Dot,
    kind: CellKind,
    mut newline: bool,
    mut ascii: bool,
    quote: Option<char>,
    mut text: String,
    effects: &mut Effects,
) -> Result<(), RuntimeFault> {
    let Some(glyph) = world.glyph(dot.position) else {
        dot.kill(DeathCause::OffGrid);
        return Ok(());
    };

    if let Some(q) = quote {
        if glyph == q {
            finish_print(dot, text, newline, effects);
        } else {
            text.push(glyph);
            dot.state = DotState::Alive(Mode::Print {
                newline,
                ascii,
                quote,
                text,
            });
        }
        return Ok(());
    }

    match glyph {
        '_' => newline = false,
        'a' => ascii = true,
        '"' | '\'' => {
            dot.state = DotState::Alive(Mode::Print {
                newline,
                ascii,
                quote: Some(glyph),
                text,
            });
            return Ok(());
        }
        '#' | '@' => {
            let value = if glyph == '#' { dot.value } else { dot.tag };
            let text = if ascii {
                value
                    .to_char()
                    .ok_or(RuntimeFault::InvalidCharCode { value })?
                    .to_string()
            } else {
                value.to_string()
            };
            finish_print(dot, text, newline, effects);
            return Ok(());
        }
        _ => {
            if newline {
                effects.push(Effect::Output("\n".to_string()));
            }
            dot.state = DotState::Alive(Mode::Travel);
            return travel(world, dot, kind, effects);
        }
    }
    dot.state = DotState::Alive(Mode::Print {
        newline,
        ascii,
        quote,
        text,
    });
    Ok(())
}

fn finish_print(dot: &mut Dot, mut text: String, newline: bool, effects: &mut Effects) {
    if newline {
        text.push('\n');
    }
    effects.push(Effect::Output(text));
    dot.state = DotState::Alive(Mode::Travel);
}

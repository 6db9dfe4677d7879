//! A small text syntax for programs, assembled onto a session canvas.
//!
//! ```text
//! move right if-clear { move move } else { left }
//! until-exit { move }
//! ```
//!
//! Words: `move`, `left`, `right`, `speak`, `interact`, `if-clear`,
//! `if-button`, `until-exit`, `while-clear`. Conditionals take a block and
//! an optional `else` block; loops take a body block. A conditional has no
//! successor slot, so it must be the last statement of its block.

use botblocks_core::{layout, Condition, LoopCondition, NodeId, NodeKind, Slot};
use botblocks_run::{Session, SessionError};
use botblocks_storage::ScoreStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown word {word:?} at token {index}")]
    UnknownWord { word: String, index: usize },

    #[error("expected {expected} at token {index}, found {found:?}")]
    Unexpected {
        expected: &'static str,
        found: String,
        index: usize,
    },

    #[error("expected {expected} but the script ended")]
    UnexpectedEnd { expected: &'static str },

    #[error("'{kind}' at token {index} ends its block; nothing can follow it")]
    StatementAfterConditional { kind: NodeKind, index: usize },

    #[error("could not attach '{kind}' beneath block {anchor}")]
    SnapRejected { kind: NodeKind, anchor: NodeId },

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// One parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block(NodeKind),
    If {
        kind: NodeKind,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
    Loop { kind: NodeKind, body: Vec<Stmt> },
}

impl Stmt {
    fn kind(&self) -> NodeKind {
        match self {
            Stmt::Block(kind) | Stmt::If { kind, .. } | Stmt::Loop { kind, .. } => *kind,
        }
    }
}

fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for ch in source.chars() {
        match ch {
            '{' | '}' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() || c == ';' => {
                if !word.is_empty() {
                    tokens.push(std::mem::take(&mut word));
                }
            }
            c => word.push(c),
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn expect(&mut self, token: &'static str) -> Result<(), ScriptError> {
        match self.peek() {
            Some(found) if found == token => {
                self.pos += 1;
                Ok(())
            }
            Some(found) => Err(ScriptError::Unexpected {
                expected: token,
                found: found.to_string(),
                index: self.pos,
            }),
            None => Err(ScriptError::UnexpectedEnd { expected: token }),
        }
    }

    /// Statements up to a closing brace (not consumed) or the end.
    fn sequence(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts: Vec<Stmt> = Vec::new();
        while let Some(token) = self.peek() {
            if token == "}" {
                break;
            }
            if let Some(last @ Stmt::If { .. }) = stmts.last() {
                return Err(ScriptError::StatementAfterConditional {
                    kind: last.kind(),
                    index: self.pos,
                });
            }
            stmts.push(self.statement()?);
        }
        Ok(stmts)
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        self.expect("{")?;
        let stmts = self.sequence()?;
        self.expect("}")?;
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Stmt, ScriptError> {
        let index = self.pos;
        let word = self
            .peek()
            .ok_or(ScriptError::UnexpectedEnd { expected: "a statement" })?
            .to_string();
        self.pos += 1;
        let stmt = match word.as_str() {
            "move" => Stmt::Block(NodeKind::Move),
            "left" => Stmt::Block(NodeKind::RotateLeft),
            "right" => Stmt::Block(NodeKind::RotateRight),
            "speak" => Stmt::Block(NodeKind::Speak),
            "interact" => Stmt::Block(NodeKind::Interact),
            "if-clear" | "if-button" => {
                let condition = if word == "if-clear" {
                    Condition::FrontTraversable
                } else {
                    Condition::FrontIsButton
                };
                let then = self.block()?;
                let otherwise = if self.peek() == Some("else") {
                    self.pos += 1;
                    self.block()?
                } else {
                    Vec::new()
                };
                Stmt::If {
                    kind: NodeKind::Conditional(condition),
                    then,
                    otherwise,
                }
            }
            "until-exit" | "while-clear" => {
                let condition = if word == "until-exit" {
                    LoopCondition::NotAtExit
                } else {
                    LoopCondition::FrontTraversable
                };
                Stmt::Loop {
                    kind: NodeKind::Loop(condition),
                    body: self.block()?,
                }
            }
            _ => return Err(ScriptError::UnknownWord { word, index }),
        };
        Ok(stmt)
    }
}

/// Parses a whole script.
pub fn parse(source: &str) -> Result<Vec<Stmt>, ScriptError> {
    let mut parser = Parser {
        tokens: tokenize(source),
        pos: 0,
    };
    let stmts = parser.sequence()?;
    if let Some(found) = parser.peek() {
        return Err(ScriptError::Unexpected {
            expected: "a statement",
            found: found.to_string(),
            index: parser.pos,
        });
    }
    Ok(stmts)
}

/// Places and snaps `stmts` beneath the session's start block. The session
/// must be in editor mode.
pub fn assemble<S: ScoreStore>(session: &mut Session<S>, stmts: &[Stmt]) -> Result<(), ScriptError> {
    let root = session.program().root();
    attach_chain(session, root, Slot::Child, stmts)
}

fn attach_chain<S: ScoreStore>(
    session: &mut Session<S>,
    anchor: NodeId,
    slot: Slot,
    stmts: &[Stmt],
) -> Result<(), ScriptError> {
    let (mut anchor, mut slot) = (anchor, slot);
    for stmt in stmts {
        let id = attach(session, anchor, slot, stmt.kind())?;
        match stmt {
            Stmt::Block(_) => slot = Slot::Child,
            Stmt::If { then, otherwise, .. } => {
                attach_chain(session, id, Slot::Success, then)?;
                attach_chain(session, id, Slot::Failure, otherwise)?;
            }
            Stmt::Loop { body, .. } => {
                attach_chain(session, id, Slot::Body, body)?;
                slot = Slot::Sequel;
            }
        }
        anchor = id;
    }
    Ok(())
}

/// Places one block beside `anchor` so that snapping selects `slot`.
fn attach<S: ScoreStore>(
    session: &mut Session<S>,
    anchor: NodeId,
    slot: Slot,
    kind: NodeKind,
) -> Result<NodeId, ScriptError> {
    let node = session.program().node(anchor).map_err(SessionError::from)?;
    let anchor_kind = node.kind();
    let lowest_body = match slot {
        Slot::Sequel => node.get(Slot::Body).map(|body| session.program().lowest_y(body)),
        _ => None,
    };
    let seat = layout::slot_position(anchor_kind, node.position(), slot, lowest_body);

    let id = session.place_block(kind, seat)?;
    if !session.connect(id, anchor)? {
        return Err(ScriptError::SnapRejected { kind, anchor });
    }
    Ok(id)
}

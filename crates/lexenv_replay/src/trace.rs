//! Line-oriented driver traces.
//!
//! A trace is the sequence of calls a compiler makes against its scope
//! stack, one per line:
//!
//! ```text
//! // comment
//! push function            // kind: block | function | class | program
//! push block boundary      // override the kind's default boundary
//! declare b Int final      // type is a builtin name or #N; modifiers optional
//! lookup b
//! address b
//! assign b
//! remove b
//! reset
//! level
//! size
//! ancestor 1
//! pop
//! ```

use lexenv_core::{Modifiers, TypeId};
use lexenv_scope::ScopeKind;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceCommand {
    Push { kind: ScopeKind, boundary: bool },
    Pop,
    Declare { name: String, ty: TypeId, modifiers: Modifiers },
    Lookup { name: String },
    Address { name: String },
    Assign { name: String },
    Remove { name: String },
    Reset,
    Level,
    Size,
    Ancestor { distance: i32 },
}

/// A trace line that could not be understood.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("{0}")]
    Malformed(String),
    #[error("unknown type '{0}'")]
    UnknownType(String),
}

/// Parse one trace line. Blank lines and comments yield `None`.
pub fn parse_line(text: &str) -> Result<Option<TraceCommand>, TraceError> {
    let text = text.split("//").next().unwrap_or_default().trim();
    let mut words = text.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let parsed = match command {
        "push" => parse_push(&rest)?,
        "declare" => parse_declare(&rest)?,
        "lookup" => TraceCommand::Lookup { name: single_name(command, &rest)? },
        "address" => TraceCommand::Address { name: single_name(command, &rest)? },
        "assign" => TraceCommand::Assign { name: single_name(command, &rest)? },
        "remove" => TraceCommand::Remove { name: single_name(command, &rest)? },
        "ancestor" => match rest.as_slice() {
            [distance] => TraceCommand::Ancestor {
                distance: distance.parse().map_err(|_| {
                    TraceError::Malformed(format!("'{}' is not a distance", distance))
                })?,
            },
            _ => return Err(arity(command, "one distance")),
        },
        "pop" | "reset" | "level" | "size" => {
            if !rest.is_empty() {
                return Err(arity(command, "no arguments"));
            }
            match command {
                "pop" => TraceCommand::Pop,
                "reset" => TraceCommand::Reset,
                "level" => TraceCommand::Level,
                _ => TraceCommand::Size,
            }
        }
        other => return Err(TraceError::UnknownCommand(other.to_string())),
    };
    Ok(Some(parsed))
}

/// Parse a type written in a trace: a builtin name such as `Int`, or `#N`
/// for a type registered by the type system.
pub fn parse_type(word: &str) -> Option<TypeId> {
    if let Some(index) = word.strip_prefix('#') {
        return index.parse().ok().map(TypeId);
    }
    TypeId::from_builtin_name(word)
}

fn parse_push(rest: &[&str]) -> Result<TraceCommand, TraceError> {
    let (kind_word, flag) = match rest {
        [kind] => (*kind, None),
        [kind, flag] => (*kind, Some(*flag)),
        _ => return Err(arity("push", "a scope kind and an optional boundary flag")),
    };
    let kind = ScopeKind::from_keyword(kind_word)
        .ok_or_else(|| TraceError::Malformed(format!("unknown scope kind '{}'", kind_word)))?;
    let boundary = match flag {
        None => kind.default_boundary(),
        Some("boundary") => true,
        Some("noboundary") => false,
        Some(other) => {
            return Err(TraceError::Malformed(format!("unknown push flag '{}'", other)));
        }
    };
    Ok(TraceCommand::Push { kind, boundary })
}

fn parse_declare(rest: &[&str]) -> Result<TraceCommand, TraceError> {
    let (name, tail) = rest
        .split_first()
        .ok_or_else(|| arity("declare", "a name"))?;
    let mut ty = TypeId::ANY;
    let mut modifiers = Modifiers::NONE;

    for (i, word) in tail.iter().enumerate() {
        if let Some(flag) = Modifiers::from_keyword(word) {
            modifiers |= flag;
        } else if i == 0 {
            ty = parse_type(word).ok_or_else(|| TraceError::UnknownType(word.to_string()))?;
        } else {
            return Err(TraceError::Malformed(format!("unknown modifier '{}'", word)));
        }
    }

    Ok(TraceCommand::Declare {
        name: name.to_string(),
        ty,
        modifiers,
    })
}

fn single_name(command: &str, rest: &[&str]) -> Result<String, TraceError> {
    match rest {
        [name] => Ok(name.to_string()),
        _ => Err(arity(command, "one name")),
    }
}

fn arity(command: &str, expected: &str) -> TraceError {
    TraceError::Malformed(format!("'{}' takes {}", command, expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_comment() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   // just a note"), Ok(None));
    }

    #[test]
    fn test_push_defaults_and_flags() {
        assert_eq!(
            parse_line("push function"),
            Ok(Some(TraceCommand::Push { kind: ScopeKind::Function, boundary: true }))
        );
        assert_eq!(
            parse_line("push block boundary // loop body"),
            Ok(Some(TraceCommand::Push { kind: ScopeKind::Block, boundary: true }))
        );
        assert!(matches!(parse_line("push loop"), Err(TraceError::Malformed(_))));
    }

    #[test]
    fn test_declare_forms() {
        assert_eq!(
            parse_line("declare b Int final"),
            Ok(Some(TraceCommand::Declare {
                name: "b".into(),
                ty: TypeId::INT,
                modifiers: Modifiers::FINAL,
            }))
        );
        assert_eq!(
            parse_line("declare w #70"),
            Ok(Some(TraceCommand::Declare {
                name: "w".into(),
                ty: TypeId(70),
                modifiers: Modifiers::NONE,
            }))
        );
        assert_eq!(
            parse_line("declare x final"),
            Ok(Some(TraceCommand::Declare {
                name: "x".into(),
                ty: TypeId::ANY,
                modifiers: Modifiers::FINAL,
            }))
        );
        assert_eq!(parse_line("declare y Widget"), Err(TraceError::UnknownType("Widget".into())));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_line("jump x"), Err(TraceError::UnknownCommand("jump".into())));
        assert!(matches!(parse_line("lookup"), Err(TraceError::Malformed(_))));
        assert!(matches!(parse_line("pop now"), Err(TraceError::Malformed(_))));
        assert!(matches!(parse_line("ancestor far"), Err(TraceError::Malformed(_))));
    }
}

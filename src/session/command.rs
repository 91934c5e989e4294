//! Parsing of interactive session commands.

use crate::models::{NewUser, UserPatch};

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List,
    Search(String),
    Add(NewUser),
    Edit { id: u64, patch: UserPatch },
    Remove(u64),
    Refresh,
    Help,
    Quit,
}

/// Parse a line of input. Errors are user-facing messages.
pub fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_lowercase().as_str() {
        "list" | "ls" => Ok(SessionCommand::List),
        "search" | "find" => Ok(SessionCommand::Search(rest.to_string())),
        "add" | "create" => parse_add(rest),
        "edit" | "update" => parse_edit(rest),
        "rm" | "delete" => parse_id(rest).map(SessionCommand::Remove),
        "refresh" | "focus" => Ok(SessionCommand::Refresh),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

fn parse_id(text: &str) -> Result<u64, String> {
    if text.is_empty() {
        return Err("missing user id".to_string());
    }
    text.parse::<u64>()
        .map_err(|_| format!("invalid user id: {text}"))
}

/// `NAME;EMAIL[;DEPARTMENT]`
fn parse_add(rest: &str) -> Result<SessionCommand, String> {
    let mut parts = rest.split(';').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let Some(email) = parts.next() else {
        return Err("usage: add NAME;EMAIL[;DEPARTMENT]".to_string());
    };
    let department = parts.next().filter(|d| !d.is_empty()).map(String::from);
    if parts.next().is_some() {
        return Err("usage: add NAME;EMAIL[;DEPARTMENT]".to_string());
    }
    Ok(SessionCommand::Add(NewUser {
        name: name.to_string(),
        email: email.to_string(),
        department,
    }))
}

/// `ID FIELD=VALUE...`, where a value runs until the next `field=`.
fn parse_edit(rest: &str) -> Result<SessionCommand, String> {
    let (id_text, assignments) = match rest.split_once(char::is_whitespace) {
        Some((id, tail)) => (id, tail),
        None => (rest, ""),
    };
    let id = parse_id(id_text)?;

    let mut patch = UserPatch::default();
    let mut current: Option<(&str, Vec<&str>)> = None;
    for token in assignments.split_whitespace() {
        let field = token
            .split_once('=')
            .filter(|(key, _)| matches!(*key, "name" | "email" | "department"));
        match field {
            Some((key, value)) => {
                if let Some((k, words)) = current.take() {
                    assign(&mut patch, k, words.join(" "));
                }
                current = Some((key, if value.is_empty() { vec![] } else { vec![value] }));
            }
            None => match current.as_mut() {
                Some((_, words)) => words.push(token),
                None => return Err(format!("expected FIELD=VALUE, got {token:?}")),
            },
        }
    }
    if let Some((k, words)) = current {
        assign(&mut patch, k, words.join(" "));
    }

    if patch.is_empty() {
        return Err("usage: edit ID FIELD=VALUE... (fields: name, email, department)".to_string());
    }
    Ok(SessionCommand::Edit { id, patch })
}

fn assign(patch: &mut UserPatch, field: &str, value: String) {
    match field {
        "name" => patch.name = Some(value),
        "email" => patch.email = Some(value),
        _ => patch.department = Some(Some(value)),
    }
}

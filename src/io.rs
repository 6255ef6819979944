//! Workload script files.
//!
//! ```text
//! # page-table sizes, one per pid
//! pages 2 3
//! # pid page access
//! 0 1 R
//! 1 2 W
//! ```

use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{Result, SimError};
use crate::workload::{AccessType, Command, Script};

impl Script {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, strip_comment(line).trim()))
            .filter(|(_, line)| !line.is_empty());

        let (line_no, header) = lines
            .next()
            .ok_or_else(|| SimError::parse(1, "workload is empty"))?;
        let page_table_sizes = parse_pages_line(line_no, header)?;

        let mut commands = Vec::new();
        for (line_no, line) in lines {
            commands.push(parse_command_line(line_no, line)?);
        }

        Ok(Script { page_table_sizes, commands })
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(SCRIPT_PAGES_KEYWORD);
        for size in &self.page_table_sizes {
            out.push(' ');
            out.push_str(&size.to_string());
        }
        out.push('\n');
        for cmd in &self.commands {
            let access = match cmd.access_type {
                AccessType::Read => SCRIPT_READ,
                AccessType::Write => SCRIPT_WRITE,
            };
            out.push_str(&format!("{} {} {}\n", cmd.pid, cmd.page_index, access));
        }
        out
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_text())?;
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find(SCRIPT_COMMENT) {
        Some(at) => &line[..at],
        None => line,
    }
}

fn parse_pages_line(line_no: usize, line: &str) -> Result<Vec<usize>> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(SCRIPT_PAGES_KEYWORD) {
        return Err(SimError::parse(
            line_no,
            format!("expected '{}' line first", SCRIPT_PAGES_KEYWORD),
        ));
    }

    let mut sizes = Vec::new();
    for token in tokens {
        let size: usize = token
            .parse()
            .map_err(|_| SimError::parse(line_no, format!("invalid page-table size: {}", token)))?;
        if size == 0 {
            return Err(SimError::parse(line_no, "page-table size must be at least 1"));
        }
        sizes.push(size);
    }

    if sizes.is_empty() {
        return Err(SimError::parse(line_no, "no processes declared"));
    }
    Ok(sizes)
}

fn parse_command_line(line_no: usize, line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(SimError::parse(
            line_no,
            format!("command has {} fields, expected 3", tokens.len()),
        ));
    }

    let pid: usize = tokens[0]
        .parse()
        .map_err(|_| SimError::parse(line_no, format!("invalid pid: {}", tokens[0])))?;
    let page: usize = tokens[1]
        .parse()
        .map_err(|_| SimError::parse(line_no, format!("invalid page index: {}", tokens[1])))?;
    let access = match tokens[2] {
        t if t.eq_ignore_ascii_case(SCRIPT_READ) => AccessType::Read,
        t if t.eq_ignore_ascii_case(SCRIPT_WRITE) => AccessType::Write,
        other => {
            return Err(SimError::parse(line_no, format!("invalid access type: {}", other)));
        }
    };

    Ok(Command::new(pid, page, access))
}

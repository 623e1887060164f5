/*! Parse textual IR (`.pir`) into a `Program`.
 *
 * Analysis inputs are easier to write, diff and review as text than as builder code. The grammar
 * covers classes, interfaces, fields, methods and the statement forms the pointer analysis
 * understands; lowering goes through `ProgramBuilder`, so a parsed program is validated exactly
 * like one built in code.
 */

use pest::Parser;
use pest_derive::Parser;
use pinta_core::builder::ProgramBuilder;
use pinta_core::{IrError, Program};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

pub mod lower;

pub use lower::lower_into;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct PirParser;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(Box<pest::error::Error<Rule>>),
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid program: {0}")]
    Ir(#[from] IrError),
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(error: pest::error::Error<Rule>) -> Self {
        ParseError::Syntax(Box::new(error))
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub const FILE_EXTENSION: &str = "pir";

pub fn parse(input: &str) -> ParseResult<pest::iterators::Pairs<'_, Rule>> {
    Ok(PirParser::parse(Rule::program, input)?)
}

pub fn check(input: &str) -> bool {
    parse(input).is_ok()
}

pub fn parse_program(input: &str) -> ParseResult<Program> {
    let mut builder = ProgramBuilder::new();
    lower_into(&mut builder, parse(input)?)?;
    Ok(builder.build()?)
}

pub fn parse_file<P: AsRef<Path>>(path: P) -> ParseResult<Program> {
    let mut builder = ProgramBuilder::new();
    add_file(&mut builder, path.as_ref())?;
    Ok(builder.build()?)
}

// Every `.pir` file below `dir`, in path order, lowered into one program.
pub fn load_dir<P: AsRef<Path>>(dir: P) -> ParseResult<Program> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| ParseError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e
                .into_io_error()
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop")),
        })?;
        let is_pir = entry.path().extension().and_then(|ext| ext.to_str()) == Some(FILE_EXTENSION);
        if entry.file_type().is_file() && is_pir {
            files.push(entry.into_path());
        }
    }
    debug!(dir = %dir.display(), files = files.len(), "loading IR directory");

    let mut builder = ProgramBuilder::new();
    for file in &files {
        add_file(&mut builder, file)?;
    }
    Ok(builder.build()?)
}

// A single file or a directory of files.
pub fn load<P: AsRef<Path>>(path: P) -> ParseResult<Program> {
    let path = path.as_ref();
    if path.is_dir() {
        load_dir(path)
    } else {
        parse_file(path)
    }
}

fn add_file(builder: &mut ProgramBuilder, path: &Path) -> ParseResult<()> {
    let input = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let label = path.display().to_string();
    let pairs = PirParser::parse(Rule::program, &input)
        .map_err(|e| ParseError::Syntax(Box::new(e.with_path(&label))))?;
    lower_into(builder, pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_program() {
        assert!(check(""));
        assert!(check("// nothing here\n/* or here */"));
    }

    #[test]
    fn test_class_with_members() {
        let input = r"
library class Object {
    method <init>(): void { return; }
}
abstract class Shape extends Object {
    field next: Shape;
    static field cache: Shape[];
    abstract method area(): Shape;
    native method hash(): int;
}
";
        match parse(input) {
            Ok(_) => {}
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn test_every_statement_form() {
        let input = r"
class Main {
    static method main(args: Main[]): void {
        c = new Main;
        d = c;
        invokespecial c.<Main: <init>()>();
        r = invokevirtual c.<Main: get(Main,int)>(d, d);
        s = invokestatic <Main: make()>();
        invokedynamic <Main: lambda()>();
        c.<Main: next> = d;
        n = c.<Main: next>;
        <Main: cache> = n;
        m = <Main: cache>;
        arr = new Main[];
        arr[0] = m;
        arr[i] = m;
        e = arr[*];
        return;
    }
}
entry <Main: main(Main[])>;
";
        match parse(input) {
            Ok(_) => {}
            Err(e) => panic!("Parse error: {}", e),
        }
    }

    #[test]
    fn test_keywords_are_not_variables() {
        assert!(!check("class A { method m(): void { new = a; } }"));
        assert!(check("class A { method m(): void { newer = a; } }"));
    }

    #[test]
    fn test_missing_semicolon() {
        assert!(!check("class A { method m(): void { a = b } }"));
        assert!(!check("entry <A: m()>"));
    }
}

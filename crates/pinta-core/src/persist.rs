use crate::program::Program;
use std::fs;
use std::io;
use std::path::Path;

// Programs are stored without their derived indexes; loading rebuilds them.
pub fn save_program(program: &Program, path: impl AsRef<Path>) -> io::Result<()> {
    let json = program_to_json(program)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_program(path: impl AsRef<Path>) -> io::Result<Program> {
    let json = fs::read_to_string(path)?;
    program_from_json(&json)
}

pub fn program_to_json(program: &Program) -> io::Result<String> {
    serde_json::to_string_pretty(program).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn program_from_json(json: &str) -> io::Result<Program> {
    serde_json::from_str(json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

use std::env;
use pinta_parser::load;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.pir | dir>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];

    match load(path) {
        Ok(program) => {
            println!(
                " {} parsed successfully: {} classes, {} methods, {} statements",
                path,
                program.classes().len(),
                program.methods().len(),
                program.number_of_statements()
            );
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!(" Failed to load {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

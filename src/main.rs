use fetch_entity_rules::convert;
use std::process;

fn main() {
    let result = match convert::run_convert() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("\x1b[31merror\x1b[0m: {}", e);
            process::exit(2);
        }
    };

    println!(
        "\x1b[32m✓\x1b[0m Wrote {} entity rules to {}",
        result.rules_written,
        result.output_path.display()
    );
}

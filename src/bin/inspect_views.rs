use std::{env, path::Path, process::exit};
use titlestats::present::{export::read_ranked_parquet, render::format_thousands};

fn main() {
    // Expect exactly one CLI argument: path to an exported ranked view.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <VIEW_PARQUET>", args[0]);
        exit(1);
    }
    let file_path = Path::new(&args[1]);
    match read_ranked_parquet(file_path) {
        Ok(rows) => {
            println!("=== {} ({} rows) ===", file_path.display(), rows.len());
            for (i, r) in rows.iter().enumerate() {
                println!("{:>3}. {:<40} {:>10}", i + 1, r.label, format_thousands(r.count));
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

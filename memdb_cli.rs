// Interactive CLI for MemDb
// Shell over an in-memory store backed by a JSON file

use std::io::{self, Write};
use std::time::Instant;

use log::info;
use memdb::{MemoryDb, MemoryDbOptions, Status};

const DEFAULT_STORAGE: &str = "./memdb.json";

fn main() -> io::Result<()> {
    env_logger::init();

    let storage = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_STORAGE.to_string());
    let db = MemoryDb::with_options(MemoryDbOptions::new().storage_path(&storage));
    info!("storage file: {}", storage);

    println!("MemDb CLI v0.1.0");
    if db.is_persistent_storage_enabled() {
        println!("Persistent storage: {}", storage);
    } else {
        println!("Persistent storage unavailable at '{}', running memory-only", storage);
    }
    println!("Type 'help' for commands, 'quit' to exit\n");

    let mut input = String::new();

    loop {
        print!("memdb> ");
        io::stdout().flush()?;

        input.clear();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        let start = Instant::now();

        match parts[0] {
            "help" | "h" | "?" => {
                print_help();
            }

            "add" | "set" | "s" => {
                if parts.len() < 2 {
                    println!("Usage: add <key> [value...]  (no value clears the key)");
                    continue;
                }
                let key = parts[1];
                let value = parts[2..].join(" ");

                match db.add(key, Some(value.as_str())) {
                    Ok(_) if value.is_empty() => println!("✓ Cleared '{}'", key),
                    Ok(_) => println!("✓ Set '{}' = '{}'", key, value),
                    Err(e) => println!("✗ Error: {}", e),
                }
            }

            "get" | "g" => {
                if parts.len() < 2 {
                    println!("Usage: get <key>");
                    continue;
                }
                match db.select(parts[1]) {
                    Some(value) => println!("{}", value),
                    None => println!("(not found)"),
                }
            }

            "ls" => {
                print_listing(&db.list_all());
            }

            "lsdir" | "dir" => {
                if parts.len() < 2 {
                    println!("Usage: lsdir <key>");
                    continue;
                }
                match db.list_dir(parts[1]) {
                    Ok(listing) => print_listing(&listing),
                    Err(e) => println!("✗ Error: {}", e),
                }
            }

            "rm" | "rmdir" => {
                if parts.len() < 2 {
                    println!("Usage: rm <key>");
                    continue;
                }
                match db.remove_dir(parts[1]) {
                    Ok(_) => println!("✓ Removed '{}'", parts[1]),
                    Err(e) => println!("✗ Error: {}", e),
                }
            }

            "rmall" => {
                db.remove_all();
                println!("✓ Removed everything");
            }

            "save" => {
                if parts.len() < 2 {
                    println!("Usage: save <key>");
                    continue;
                }
                print_status(&db.save(parts[1]));
            }

            "load" => {
                if parts.len() < 2 {
                    println!("Usage: load <key> [replace]");
                    continue;
                }
                let replace = parts.get(2) == Some(&"replace");
                print_status(&db.load(replace, parts[1]));
            }

            "loadall" => {
                let replace = parts.get(1) == Some(&"replace");
                print_status(&db.load_all(replace));
            }

            "purge" => {
                if parts.len() < 2 {
                    println!("Usage: purge <key>");
                    continue;
                }
                print_status(&db.purge(parts[1]));
            }

            "metrics" => match parts.get(1).copied() {
                Some("on") => {
                    db.enable_metric();
                    println!("✓ Metrics enabled");
                }
                Some("off") => {
                    db.disable_metric();
                    println!("✓ Metrics disabled");
                }
                Some("dump") => {
                    let items = db.dump_metrics();
                    println!("{} metrics:", items.len());
                    for m in &items {
                        println!(
                            "  {:<10} {:<24} {:>12} items={:<6} {}",
                            m.operation,
                            m.key.as_deref().unwrap_or("-"),
                            format!("{:?}", m.elapsed),
                            m.processed_items,
                            m.comment
                        );
                    }
                }
                _ => {
                    let state = if db.is_metric_enabled() { "on" } else { "off" };
                    println!("Metrics are {} (usage: metrics on|off|dump)", state);
                }
            },

            "stats" => {
                println!("Keys with values: {}", db.list_all().len());
                println!("Resident nodes:   {}", db.node_count());
            }

            "quit" | "exit" | "q" => {
                println!("Goodbye!");
                break;
            }

            _ => {
                println!("Unknown command: '{}'. Type 'help' for available commands.", parts[0]);
            }
        }

        let elapsed = start.elapsed();
        if elapsed.as_millis() > 0 {
            println!("({}ms)", elapsed.as_millis());
        }
        println!();
    }

    Ok(())
}

fn print_help() {
    println!("Available commands:");
    println!();
    println!("  Tree Operations:");
    println!("    add <key> [value...]          - Set a value (no value clears it)");
    println!("    get <key>                     - Get value by key");
    println!("    ls                            - List every key");
    println!("    lsdir <key>                   - List a directory");
    println!("    rm <key>                      - Remove a directory and everything below");
    println!("    rmall                         - Remove everything");
    println!();
    println!("  Persistence:");
    println!("    save <key>                    - Save a key to the storage file");
    println!("    load <key> [replace]          - Load one key from the storage file");
    println!("    loadall [replace]             - Load every stored key");
    println!("    purge <key>                   - Remove a key from the storage file");
    println!();
    println!("  Other:");
    println!("    metrics on|off|dump           - Control operation metrics");
    println!("    stats                         - Show store statistics");
    println!("    help                          - Show this help");
    println!("    quit                          - Exit the CLI");
    println!();
    println!("  Shortcuts: s=add, g=get, q=quit");
}

fn print_listing(listing: &[(String, String)]) {
    println!("{} keys:", listing.len());
    for (k, v) in listing.iter().take(50) {
        println!("  {} = {}", k, truncate(v, 50));
    }
    if listing.len() > 50 {
        println!("  ... and {} more", listing.len() - 50);
    }
}

fn print_status(status: &Status) {
    let mark = if status.ok { "✓" } else { "✗" };
    println!("{} {}", mark, status.message);
}

fn truncate(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

//! chainlisten CLI — inspect listener defaults and version.
//!
//! Usage:
//! ```bash
//! chainlisten info
//! chainlisten version
//! ```

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "info" => cmd_info(),
        "version" | "--version" | "-V" => {
            println!("chainlisten {}", env!("CARGO_PKG_VERSION"));
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("chainlisten {}", env!("CARGO_PKG_VERSION"));
    println!("Reorg-safe, in-order blockchain block listener\n");
    println!("USAGE:");
    println!("    chainlisten <COMMAND>\n");
    println!("COMMANDS:");
    println!("    info     Show ChainListen configuration info");
    println!("    version  Print version");
    println!("    help     Print this help");
}

fn cmd_info() {
    let defaults = chainlisten_core::ListenerConfig::default();
    println!("ChainListen v{}", env!("CARGO_PKG_VERSION"));
    println!("  Default keeper capacity: {} blocks", defaults.keeper_capacity);
    println!("  Default reorder window: {} blocks", defaults.queue_size);
    println!("  Default poll interval: {} ms", defaults.poll_interval_ms);
    println!("  Default fetch batch: {} headers/call", defaults.batch_size);
    println!("  Chains: EVM (Ethereum, Arbitrum, Base, Polygon, Optimism, ...)");
}

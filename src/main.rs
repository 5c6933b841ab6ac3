use clap::*;
use clap_num::maybe_hex;
use floatcat::{FloatingConcat, SegmentPattern, Whence};
use log::{debug, error, info, LevelFilter};
use std::io::Read;

fn list_segments(file_path: &str) {
    let (pattern, _) = match SegmentPattern::derive(file_path) {
        Ok(derived) => derived,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    info!("Segments matching '{}':", pattern.template());
    match pattern.discover() {
        Ok(segments) => {
            for (index, path) in segments {
                info!("  {:>6}  {}", index, path.display());
            }
        }
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    }
}

fn process_file(file_path: &str, size: u64, whence: Whence, json: bool) {
    info!("Processing the segment series starting at '{}'...", file_path);
    let mut reader = match FloatingConcat::open(file_path) {
        Ok(reader) => reader,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    let position = match reader.seek_whence(whence) {
        Ok(position) => position,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };
    debug!("------------------------------------------------------------");
    info!("Logical position: 0x{:x}", position);
    debug!("------------------------------------------------------------");

    let mut bytes = vec![0u8; size as usize];
    let mut filled = 0;
    while filled < bytes.len() {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) => {
                error!("{}", err);
                std::process::exit(1);
            }
        }
    }
    if filled < bytes.len() {
        info!("End of stream after {} bytes", filled);
    }
    bytes.truncate(filled);

    if json {
        match reader.info() {
            Ok(info) => match serde_json::to_string_pretty(&info) {
                Ok(text) => println!("{}", text),
                Err(err) => error!("{}", err),
            },
            Err(err) => error!("{}", err),
        }
    } else if let Err(err) = reader.print_info() {
        error!("{}", err);
    }

    let result = String::from_utf8_lossy(&bytes);
    println!("{}", result);

    if let Err(err) = reader.close() {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("floatcat")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Read a numbered series of segment files as one stream.")
        .arg(
            Arg::new("body")
                .short('b')
                .long("body")
                .value_parser(value_parser!(String))
                .required(true)
                .help("Path of the first segment, e.g. 'clip7.dat' or 'flccat:clip7.dat'."),
        )
        .arg(
            Arg::new("size")
                .short('s')
                .long("size")
                .value_parser(maybe_hex::<u64>)
                .required_unless_present("list")
                .help("The size (in bytes) to read."),
        )
        .arg(
            Arg::new("offset")
                .short('o')
                .long("offset")
                .value_parser(maybe_hex::<u64>)
                .required(false)
                .help("Read at a specific logical offset."),
        )
        .arg(
            Arg::new("from_end")
                .short('e')
                .long("from-end")
                .action(ArgAction::SetTrue)
                .help("Count the offset backwards from the end of the last segment."),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the stream bookkeeping as JSON."),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .action(ArgAction::SetTrue)
                .help("List the segments currently matching the pattern and exit."),
        )
        .arg(
            Arg::new("log_level")
                .short('l')
                .long("log-level")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("info")
                .help("Set the log verbosity level"),
        )
}

fn main() {
    let matches = cli().get_matches();

    let log_level_str = matches
        .get_one::<String>("log_level")
        .map(String::as_str)
        .unwrap_or("info");
    let level_filter = match log_level_str {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level_filter).init();

    let Some(file_path) = matches.get_one::<String>("body") else {
        error!("Missing --body");
        std::process::exit(1);
    };

    if matches.get_flag("list") {
        list_segments(file_path);
        return;
    }

    let size = *matches.get_one::<u64>("size").unwrap_or(&0);
    let offset = *matches.get_one::<u64>("offset").unwrap_or(&0);
    let whence = if matches.get_flag("from_end") {
        match i64::try_from(offset) {
            Ok(back) => Whence::End(-back),
            Err(_) => {
                error!("Offset 0x{:x} is too large", offset);
                std::process::exit(1);
            }
        }
    } else {
        Whence::Start(offset)
    };

    process_file(file_path, size, whence, matches.get_flag("json"));
}

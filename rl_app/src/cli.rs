/// Parses the config-file path from command-line arguments
pub fn config_path(default: &str) -> String {
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 { args[1].clone() } else { default.to_string() }
}

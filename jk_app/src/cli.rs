/// Positional arguments after the program name, with `--flags` removed
pub fn positional_args() -> Vec<String> {
    positional(std::env::args().skip(1))
}

/// Whether `--name` was passed anywhere on the command line
pub fn has_flag(name: &str) -> bool {
    flag_present(std::env::args().skip(1), name)
}

/// Value following `--name` on the command line, if any
pub fn flag_value(name: &str) -> Option<String> {
    value_of(std::env::args().skip(1), name)
}

/// Parses the positional argument at `index`, falling back to `default`
pub fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> T {
    args.get(index).and_then(|arg| arg.parse().ok()).unwrap_or(default)
}

fn positional(args: impl Iterator<Item = String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if let Some(name) = arg.strip_prefix("--") {
            skip_value = VALUE_FLAGS.contains(&name);
            continue;
        }
        out.push(arg);
    }
    out
}

fn flag_present(mut args: impl Iterator<Item = String>, name: &str) -> bool {
    args.any(|arg| arg.strip_prefix("--") == Some(name))
}

fn value_of(mut args: impl Iterator<Item = String>, name: &str) -> Option<String> {
    while let Some(arg) = args.next() {
        if arg.strip_prefix("--") == Some(name) {
            return args.next();
        }
    }
    None
}

/// Flags that take a value in the next argument
const VALUE_FLAGS: &[&str] = &["config"];

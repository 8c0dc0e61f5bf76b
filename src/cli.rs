//! Command-line argument parsing for the `shev-sim` binary.

use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    /// Overrides `simulation.cycle`.
    pub cycle: Option<String>,
    /// Overrides `simulation.controller`.
    pub controller: Option<String>,
    /// Overrides `simulation.seed`.
    pub seed: Option<u64>,
    pub telemetry_out: Option<PathBuf>,
    pub json_log: bool,
    pub help: bool,
}

/// Parses the process arguments.
///
/// # Errors
///
/// Returns a usage message for malformed arguments.
pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parses an explicit argument list (without the program name).
///
/// # Errors
///
/// Returns a usage message for malformed arguments.
pub fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --scenario (expected a TOML file path)")?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--cycle" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --cycle (expected a cycle name)")?;
                opts.cycle = Some(name.to_string());
            }
            "--controller" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --controller (expected a controller name)")?;
                opts.controller = Some(name.to_string());
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --telemetry-out (expected a file path)")?;
                if opts.telemetry_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--telemetry-out provided more than once".to_string());
                }
            }
            "--json-log" => opts.json_log = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("compact".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("shev-sim: series hybrid powertrain simulator");
    eprintln!();
    eprintln!("Usage: shev-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (compact, suv, delivery_van)");
    eprintln!("  --cycle <name>           Override drive cycle (cruise, trapezoid, urban)");
    eprintln!("  --controller <name>      Override controller (rule-based, electric-only)");
    eprintln!("  --seed <u64>             Override cycle seed");
    eprintln!("  --telemetry-out <path>   Export step records to CSV");
    eprintln!("  --json-log               Emit logs as JSON");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the compact preset is used.");
}

#[cfg(test)]
mod tests {
    use super::parse_args_from;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_scenario_cli() {
        let opts = parse_args_from(&args(&["--scenario", "scenario.toml"])).expect("parse should succeed");
        assert_eq!(
            opts.scenario.as_deref().and_then(|p| p.to_str()),
            Some("scenario.toml")
        );
        assert!(opts.preset.is_none());
    }

    #[test]
    fn defaults_to_compact_preset() {
        let opts = parse_args_from(&[]).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("compact"));
        assert!(!opts.json_log);
    }

    #[test]
    fn parses_overrides() {
        let opts = parse_args_from(&args(&[
            "--preset",
            "suv",
            "--cycle",
            "cruise",
            "--controller",
            "electric-only",
            "--seed",
            "7",
            "--telemetry-out",
            "out.csv",
            "--json-log",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("suv"));
        assert_eq!(opts.cycle.as_deref(), Some("cruise"));
        assert_eq!(opts.controller.as_deref(), Some("electric-only"));
        assert_eq!(opts.seed, Some(7));
        assert!(opts.telemetry_out.is_some());
        assert!(opts.json_log);
    }

    #[test]
    fn rejects_conflicting_sources() {
        let err = parse_args_from(&args(&["--scenario", "a.toml", "--preset", "suv"])).unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_seed_and_missing_values() {
        assert!(parse_args_from(&args(&["--seed", "abc"])).is_err());
        assert!(parse_args_from(&args(&["--cycle"])).is_err());
        assert!(parse_args_from(&args(&["--bogus"])).is_err());
    }

    #[test]
    fn help_flag_is_recorded() {
        assert!(parse_args_from(&args(&["-h"])).expect("parse should succeed").help);
    }
}

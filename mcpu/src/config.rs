use mcpu_core::cpu::IrqPolicy;
use mcpu_core::Program;

use crate::CliError;

/// Upper bound on `--pulse` options.
pub const MAX_PULSES: usize = 16;

const DEFAULT_HZ: &str = "1000000";

pub struct RunConfig {
    pub program: &'static Program<'static>,
    pub policy: IrqPolicy,
    pub cycles: Option<u64>,
    pub hz: u64,
    pub pulses: Vec<(u64, u64)>,
    pub interactive: bool,
    pub trace: bool,
}

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    let about = "Multi-cycle CPU interrupt delivery model. Runs a built-in program \
                 image against a stimulated interrupt line and checks the handler \
                 and progress counters";
    let c = clap::App::new("mcpu")
        .version("0.1")
        .about(about)
        .setting(clap::AppSettings::SubcommandRequiredElseHelp)
        .arg(
            clap::Arg::with_name("cycles")
                .long("cycles")
                .short("c")
                .takes_value(true)
                .help("Run for this many cycles, then exit. Free runs until Ctrl-C otherwise"),
        )
        .arg(
            clap::Arg::with_name("policy")
                .long("policy")
                .takes_value(true)
                .possible_values(&["edge", "level"])
                .default_value("edge")
                .help("How an interrupt line that stays asserted is taken"),
        )
        .arg(
            clap::Arg::with_name("pulse")
                .long("pulse")
                .short("p")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Assert the line for WIDTH cycles starting at cycle START (START:WIDTH)"),
        )
        .arg(
            clap::Arg::with_name("hz")
                .long("hz")
                .takes_value(true)
                .default_value(DEFAULT_HZ)
                .help("Clock rate the free running mode is paced to"),
        )
        .arg(
            clap::Arg::with_name("interactive")
                .long("interactive")
                .short("i")
                .help("Drive the line from stdin: `1` asserts, `0` deasserts, Enter toggles"),
        )
        .arg(
            clap::Arg::with_name("trace")
                .long("trace")
                .help("Print every step"),
        )
        .subcommand(
            clap::SubCommand::with_name("irqtest")
                .about("Enable interrupts, count in the main loop and in the handler"),
        )
        .subcommand(
            clap::SubCommand::with_name("delayed")
                .about("Like irqtest, but IE is only set after a startup delay"),
        )
        .subcommand(
            clap::SubCommand::with_name("noenable").about("Main loop that never sets IE"),
        )
        .subcommand(
            clap::SubCommand::with_name("nohandler")
                .about("Interrupts enabled but no handler entry configured"),
        )
        .subcommand(
            clap::SubCommand::with_name("slowhandler")
                .about("Handler that spends a long time before returning"),
        );
    let a = c.get_matches();
    a
}

fn parse_number(arg: &'static str, value: &str) -> Result<u64, CliError> {
    value.trim().parse::<u64>().map_err(|_| CliError::InvalidNumber {
        arg,
        value: value.to_string(),
    })
}

fn parse_pulse(value: &str) -> Result<(u64, u64), CliError> {
    let (start, width) = value
        .split_once(':')
        .ok_or_else(|| CliError::InvalidPulse(value.to_string()))?;
    let start = parse_number("pulse", start)?;
    let width = parse_number("pulse", width)?;
    if width == 0 {
        return Err(CliError::InvalidPulse(value.to_string()));
    }
    Ok((start, width))
}

fn parse_policy(value: &str) -> Result<IrqPolicy, CliError> {
    match value {
        "edge" => Ok(IrqPolicy::Edge),
        "level" => Ok(IrqPolicy::Level),
        x => Err(CliError::InvalidPolicy(x.to_string())),
    }
}

pub fn load() -> Result<RunConfig, CliError> {
    let matches = fetch_config();

    let name = matches.subcommand_name().ok_or(CliError::UnknownProgram)?;
    let program = mcpu_programs::by_name(name).ok_or(CliError::UnknownProgram)?;

    // Options are given before the program name, `mcpu --cycles 5000 irqtest`
    let m = &matches;

    let cycles = match m.value_of("cycles") {
        Some(x) => Some(parse_number("cycles", x)?),
        None => None,
    };
    let hz = parse_number("hz", m.value_of("hz").unwrap_or(DEFAULT_HZ))?;
    if hz == 0 {
        return Err(CliError::InvalidNumber {
            arg: "hz",
            value: "0".to_string(),
        });
    }

    let mut pulses = Vec::new();
    if let Some(values) = m.values_of("pulse") {
        for v in values {
            pulses.push(parse_pulse(v)?);
        }
    }
    if pulses.len() > MAX_PULSES {
        return Err(CliError::TooManyPulses(MAX_PULSES));
    }

    Ok(RunConfig {
        program,
        policy: parse_policy(m.value_of("policy").unwrap_or("edge"))?,
        cycles,
        hz,
        pulses,
        interactive: m.is_present("interactive"),
        trace: m.is_present("trace"),
    })
}

#[cfg(test)]
mod config_tests {
    use super::{parse_policy, parse_pulse};
    use crate::CliError;
    use mcpu_core::cpu::IrqPolicy;

    #[test]
    fn config_parse_pulse() {
        assert_eq!(parse_pulse("100:20").unwrap(), (100, 20));
        assert_eq!(parse_pulse(" 0 : 5 ").unwrap(), (0, 5));

        for bad in ["100", "a:1", "1:b", "1:0", ":"].iter() {
            match parse_pulse(bad) {
                Err(CliError::InvalidPulse(_)) | Err(CliError::InvalidNumber { .. }) => {}
                x => panic!("{} parsed as {:?}", bad, x.map_err(|e| e.to_string())),
            }
        }
    }

    #[test]
    fn config_parse_policy() {
        assert_eq!(parse_policy("edge").unwrap(), IrqPolicy::Edge);
        assert_eq!(parse_policy("level").unwrap(), IrqPolicy::Level);
        assert!(parse_policy("both").is_err());
    }
}

use std::fs::read_to_string;
use std::process::ExitCode;

use rexinfer::{Budget, Costs, Error};

fn load_examples(file: &str) -> Result<(Vec<Vec<u8>>, Vec<Vec<u8>>), Error> {
    let text = read_to_string(file)
        .map_err(|e| Error::BadInput(format!("could not read {file}: {e}")))?;

    let mut pos = Vec::new();
    let mut neg = Vec::new();
    let mut section: Option<bool> = None; // Some(true) = positive, Some(false) = negative

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "++" {
            section = Some(true);
            continue;
        }
        if line == "--" {
            section = Some(false);
            continue;
        }
        let word = line.trim_matches('"');
        match section {
            None => {
                return Err(Error::BadInput(
                    "word appears before a ++ or -- section header".to_string(),
                ))
            }
            Some(true) => pos.push(word.as_bytes().to_vec()),
            Some(false) => neg.push(word.as_bytes().to_vec()),
        }
    }

    for word in &pos {
        if neg.contains(word) {
            return Err(Error::BadInput(format!(
                "{:?} appears in both the positive and negative sections",
                String::from_utf8_lossy(word)
            )));
        }
    }

    Ok((pos, neg))
}

fn parse_u16(arg: &str, name: &str) -> Result<u16, Error> {
    arg.parse()
        .map_err(|_| Error::BadInput(format!("{name} must be a positive 16-bit integer, got {arg:?}")))
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 8 {
        return Err(Error::BadInput(format!(
            "usage: {} <file> c1 c2 c3 c4 c5 max_cost [--seed N]",
            args.first().map(String::as_str).unwrap_or("rexinfer")
        )));
    }

    let file = &args[1];
    let costs = Costs::new([
        parse_u16(&args[2], "c1")?,
        parse_u16(&args[3], "c2")?,
        parse_u16(&args[4], "c3")?,
        parse_u16(&args[5], "c4")?,
        parse_u16(&args[6], "c5")?,
    ]);
    let max_cost = parse_u16(&args[7], "max_cost")?;

    let mut budget = Budget::new();
    if let Some(pos) = args.iter().position(|a| a == "--seed") {
        let seed_str = args.get(pos + 1).ok_or_else(|| {
            Error::BadInput("--seed requires a value".to_string())
        })?;
        budget.seed = Some(
            seed_str
                .parse()
                .map_err(|_| Error::BadInput(format!("--seed value {seed_str:?} is not a u64")))?,
        );
    }

    let (pos, neg) = load_examples(file)?;
    let result = rexinfer::run(costs, max_cost, &pos, &neg, budget)?;

    println!("re: {}", result.re);
    println!("ic_size: {}", result.ic_size);
    match result.re_cost {
        Some(cost) => println!("re_cost: {cost}"),
        None => println!("re_cost: (found by top-down search)"),
    }
    println!("all_res: {}", result.all_res);
    println!("seed_used: {}", result.seed_used);

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

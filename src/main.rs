use std::error::Error;
use std::io::Read;
use std::str::FromStr;

use volcanium::{best_pairing, Action, Searcher, Volcano};

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args[..] {
        ["part1"] => println!("{}", part1(std::io::stdin().lock())?),
        ["part2"] => println!("{}", part2(std::io::stdin().lock())?),
        ["plan"] => print_plan(std::io::stdin().lock())?,
        _ => return Err("must specify part1|part2|plan".into()),
    }
    Ok(())
}

fn read_searcher(r: impl Read) -> Result<Searcher, Box<dyn Error>> {
    let input = std::io::read_to_string(r)?;
    let volcano = Volcano::from_str(&input)?;
    Searcher::new(volcano, "AA")
}

fn part1(r: impl Read) -> Result<usize, Box<dyn Error>> {
    read_searcher(r)?.released(30, &[])
}

fn part2(r: impl Read) -> Result<usize, Box<dyn Error>> {
    let searcher = read_searcher(r)?;
    let pairing = best_pairing(&searcher, 26);

    let covered = |skips: &[String]| {
        searcher.working_labels().iter()
            .filter(|v| !skips.contains(v))
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("you cover: {}", covered(&pairing.skips[0]));
    println!("elephant covers: {}", covered(&pairing.skips[1]));

    Ok(pairing.released)
}

fn print_plan(r: impl Read) -> Result<(), Box<dyn Error>> {
    let searcher = read_searcher(r)?;
    let plan = searcher.plan(30, &[])?;
    for step in &plan.steps {
        match &step.action {
            Action::Move(name) => println!("Minute {}: move to valve {name}", step.minute),
            Action::Open(name) => println!("Minute {}: open valve {name}", step.minute),
        }
    }
    println!("{}", plan.released);
    Ok(())
}

//! Life GA CLI - evolve, generalise and simulate cellular automaton rules.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use life_ga::{
    compute::{
        Grid,
        evolution::{
            EvolutionEngine, density_score, generalise, load_rules, save_run,
            write_generalisation_csv,
        },
        step,
    },
    schema::{
        CrossoverMethod, Encoding, EvolutionConfig, GeneralisationConfig, GenerationEvent, Rule,
        SelectionMethod,
    },
};

/// Evolve cellular automaton rules toward a half-alive grid.
#[derive(Parser)]
#[command(name = "life-ga", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the genetic algorithm and save the best rules and metrics.
    Evolve {
        /// JSON configuration file (defaults are used when absent).
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        overrides: SearchOverrides,
        /// Rule file whose rules start the initial population.
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Output prefix; writes PREFIX.json and PREFIX.csv.
        #[arg(long)]
        output: PathBuf,
    },
    /// Score saved rules on fresh random grids.
    Generalise {
        #[arg(long)]
        rules: PathBuf,
        #[arg(long, default_value_t = 100)]
        repetitions: usize,
        /// Side length of each random grid.
        #[arg(long, default_value_t = 100)]
        size: usize,
        #[arg(long, default_value_t = 100)]
        steps: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Step a rule on a random grid and print the density per step.
    Simulate {
        /// Rule file (Conway's Game of Life when absent).
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Position of the rule in the file.
        #[arg(long, default_value_t = 0)]
        index: usize,
        #[arg(long, default_value_t = 50)]
        size: usize,
        #[arg(long, default_value_t = 70)]
        seed: u64,
        #[arg(long, default_value_t = 100)]
        steps: usize,
    },
    /// Print the default configuration as JSON.
    ExampleConfig,
}

/// Command-line settings that take precedence over the config file.
#[derive(Args, Debug)]
struct SearchOverrides {
    /// Rule encoding: living or pattern.
    #[arg(long)]
    encoding: Option<Encoding>,
    /// Selection method: random, best, weighted or tournament.
    #[arg(long)]
    selection: Option<SelectionMethod>,
    /// Crossover method: half, 1p or 2p.
    #[arg(long)]
    crossover: Option<CrossoverMethod>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    population: Option<usize>,
    /// Probability of flipping each rule value.
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// Number of parents selected each generation.
    #[arg(long)]
    selection_size: Option<usize>,
    /// Seed for the genetic algorithm.
    #[arg(long)]
    seed: Option<u64>,
}

impl SearchOverrides {
    fn apply(&self, config: &mut EvolutionConfig) {
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(selection) = self.selection {
            config.genetic.selection = selection;
        }
        if let Some(crossover) = self.crossover {
            config.genetic.crossover = crossover;
        }
        if let Some(generations) = self.generations {
            config.population.generations = generations;
        }
        if let Some(size) = self.population {
            config.population.size = size;
        }
        if let Some(rate) = self.mutation_rate {
            config.genetic.mutation_rate = rate;
        }
        if let Some(count) = self.selection_size {
            config.genetic.selection_size = count;
        }
        if self.seed.is_some() {
            config.random_seed = self.seed;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Evolve {
            config,
            overrides,
            rules,
            output,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => EvolutionConfig::default(),
            };
            overrides.apply(&mut config);
            evolve(config, rules.as_deref(), &output)
        }
        Command::Generalise {
            rules,
            repetitions,
            size,
            steps,
            seed,
        } => {
            let config = GeneralisationConfig {
                repetitions,
                rows: size,
                cols: size,
                steps,
                random_seed: seed,
            };
            run_generalise(&rules, &config)
        }
        Command::Simulate {
            rules,
            index,
            size,
            seed,
            steps,
        } => simulate(rules.as_deref(), index, size, seed, steps),
        Command::ExampleConfig => {
            println!("{}", serde_json::to_string_pretty(&EvolutionConfig::default())?);
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<EvolutionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn evolve(config: EvolutionConfig, seed_rules: Option<&Path>, output: &Path) -> Result<()> {
    let mut engine = EvolutionEngine::new(config.clone())?;
    if let Some(path) = seed_rules {
        let rules =
            load_rules(path).with_context(|| format!("loading rules {}", path.display()))?;
        engine = engine.with_seed_rules(rules)?;
    }

    let result = engine.run_with_observer(&mut |event: &GenerationEvent| {
        log::info!(
            "generation {}: max {:.4}, mean {:.4}",
            event.generation,
            event.max_fitness,
            event.mean_fitness
        );
    })?;

    for (rank, scored) in result.best.iter().enumerate() {
        println!("#{} fitness {:.4}", rank + 1, scored.fitness);
    }

    let (rules_path, csv_path) = save_run(output, &result, &config)
        .with_context(|| format!("saving results to {}", output.display()))?;
    println!("Rules: {}", rules_path.display());
    println!("Metrics: {}", csv_path.display());
    Ok(())
}

fn run_generalise(rules_path: &Path, config: &GeneralisationConfig) -> Result<()> {
    let rules = load_rules(rules_path)
        .with_context(|| format!("loading rules {}", rules_path.display()))?;
    if rules.is_empty() {
        bail!("{} contains no rules", rules_path.display());
    }

    let report = generalise(&rules, config)?;
    for result in &report.results {
        println!(
            "rule {}: mean {:.4}, max {:.4}",
            result.rule,
            result.mean(),
            result.max()
        );
    }

    let stem = rules_path
        .file_stem()
        .map_or_else(|| "rules".into(), |s| s.to_string_lossy());
    let out = rules_path.with_file_name(format!("{stem}_generalisation.csv"));
    write_generalisation_csv(&out, &report)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("Scores: {}", out.display());
    Ok(())
}

fn simulate(
    rules_path: Option<&Path>,
    index: usize,
    size: usize,
    seed: u64,
    steps: usize,
) -> Result<()> {
    let rule = match rules_path {
        Some(path) => {
            let mut rules =
                load_rules(path).with_context(|| format!("loading rules {}", path.display()))?;
            if index >= rules.len() {
                bail!("{} holds {} rules, no index {index}", path.display(), rules.len());
            }
            rules.swap_remove(index)
        }
        None => Rule::conway(),
    };

    let mut grid = Grid::random(size, size, &mut StdRng::seed_from_u64(seed))?;
    println!("step 0: proportion {:.4}", grid.live_proportion());
    for i in 1..=steps {
        grid = step(&grid, &rule);
        let proportion = grid.live_proportion();
        println!(
            "step {i}: proportion {proportion:.4}, score {:.4}",
            density_score(proportion)
        );
    }

    print!("{grid}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_overrides(args: &[&str]) -> SearchOverrides {
        let argv = ["life-ga", "evolve", "--output", "out"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Evolve { overrides, .. } => overrides,
            _ => panic!("expected evolve"),
        }
    }

    #[test]
    fn test_genetic_overrides() {
        let overrides = parse_overrides(&[
            "--mutation-rate",
            "0.25",
            "--selection-size",
            "6",
            "--crossover",
            "2p",
            "--population",
            "12",
        ]);
        let mut config = EvolutionConfig::default();
        overrides.apply(&mut config);

        assert_eq!(config.genetic.mutation_rate, 0.25);
        assert_eq!(config.genetic.selection_size, 6);
        assert_eq!(config.genetic.crossover, CrossoverMethod::TwoPoint);
        assert_eq!(config.population.size, 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absent_overrides_keep_config() {
        let mut config = EvolutionConfig::default();
        config.genetic.mutation_rate = 0.3;
        config.genetic.selection_size = 5;
        parse_overrides(&[]).apply(&mut config);

        assert_eq!(config.genetic.mutation_rate, 0.3);
        assert_eq!(config.genetic.selection_size, 5);
        assert_eq!(config.random_seed, None);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

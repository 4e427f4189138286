//! Enemy Generator CLI - Run MAP-Elites from a JSON configuration.

use std::fs;
use std::path::PathBuf;

use enemy_generator::{
    DifficultyEvaluator, EvolutionConfig, EvolutionEngine,
    enemy::WeaponType,
    schema::{ArchiveSnapshot, EvolutionPhase},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [report.json]", args[0]);
        eprintln!();
        eprintln!("Evolve a MAP-Elites archive of enemies from a JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to evolution configuration file");
        eprintln!("  report.json  Where to write the run report (optional)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let report_path = args.get(2).map(PathBuf::from);

    // Load configuration
    let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });

    let config: EvolutionConfig = serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    });

    let evaluator = DifficultyEvaluator::new(&config.search_space).unwrap_or_else(|e| {
        eprintln!("Error building evaluator: {}", e);
        std::process::exit(1);
    });

    let buckets = evaluator.buckets().to_vec();

    println!("Enemy Generator");
    println!("===============");
    println!("Seed: {}", config.seed);
    println!("Generations: {}", config.generations);
    println!("Initial population: {}", config.initial_population);
    println!(
        "Mutation: {}%  Crossover: {}%  Competitors: {}",
        config.mutation_chance, config.crossover_chance, config.competitors
    );
    println!();

    let engine = EvolutionEngine::new(config.clone(), evaluator).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let total = config.generations;
    let result = engine
        .run_with_callback(|progress| {
            let report = match progress.phase {
                EvolutionPhase::Initializing => true,
                EvolutionPhase::Evolving => progress.generation % (total / 10).max(1) == 0,
                EvolutionPhase::Complete => false,
            };
            if report {
                println!(
                    "  Generation {}/{}: {}/{} cells, best fitness {:.4}",
                    progress.generation,
                    progress.total_generations,
                    progress.coverage,
                    progress.capacity,
                    progress.best_fitness.unwrap_or(f32::NAN)
                );
            }
        })
        .unwrap_or_else(|e| {
            eprintln!("Evolution failed: {}", e);
            std::process::exit(1);
        });

    println!();
    println!("Solution:");
    print_fitness_map(&result.solution, &buckets);
    println!();
    println!(
        "Evaluations: {} ({} inserted, {} replaced, {} rejected, {} unclassified)",
        result.stats.evaluations,
        result.stats.insertions,
        result.stats.replacements,
        result.stats.rejections,
        result.stats.unclassified
    );
    println!("Time: {:.3}s", result.elapsed.as_secs_f64());

    if let Some(path) = report_path {
        if let Err(e) = result.to_report(&config).save(&path) {
            eprintln!("Error writing report: {}", e);
            std::process::exit(1);
        }
        println!("Report written to {}", path.display());
    }
}

/// Print elite fitness as a difficulty x weapon table.
fn print_fitness_map(snapshot: &ArchiveSnapshot, buckets: &[(f32, f32)]) {
    let columns = snapshot.shape.get(1).copied().unwrap_or(1);

    print!("{:>10}", "");
    for weapon in WeaponType::ALL.iter().take(columns) {
        print!("{:>12}", weapon.name());
    }
    println!();

    for (row, cells) in snapshot.cells.chunks(columns).enumerate() {
        let label = buckets
            .get(row)
            .map(|(min, max)| format!("{min}-{max}"))
            .unwrap_or_else(|| row.to_string());
        print!("{:>10}", label);
        for cell in cells {
            match cell {
                Some(elite) => print!("{:>12.4}", elite.fitness),
                None => print!("{:>12}", "-"),
            }
        }
        println!();
    }
}

fn print_example_config() {
    let config = EvolutionConfig::default();

    println!("Example configuration (config.json):");
    match serde_json::to_string_pretty(&config) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing config: {}", e),
    }
}

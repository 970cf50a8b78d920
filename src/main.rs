//! Hook Salt Miner CLI
//!
//! Usage:
//!   hook-miner -o <owner> -N uniswap -f <factory> --creation-code <hex>
//!   hook-miner -o <owner> -t <pool-manager> -f <factory> --creation-code-file hook.hex -p 0xA8 -x 5000
//!   hook-miner -o <owner> -f <factory> --creation-code <hex> --check-presets

use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use hook_miner::{
    Config, DeployCommitter, DeployError, LocalDeployer, MiningCoordinator, MiningOutcome, NetworkConfig,
    PresetCheck,
};

fn main() {
    let config = Config::parse();
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        process::exit(match e {
            DeployError::NotFound { .. } => 2,
            DeployError::Cancelled => 130,
            _ => 1,
        });
    }
}

fn run(config: &Config) -> Result<(), DeployError> {
    let prefix = config.prefix_pattern()?;
    let owner = config.owner_address()?;
    let networks = config.networks()?;
    let factory = config.local_factory()?;

    println!("Hook Salt Miner");
    println!("===============");
    println!("Owner:      {}", owner);
    println!("Factory:    {}", factory.factory());
    println!("Prefix:     {}", prefix);
    println!("Difficulty: {}", prefix.difficulty_description());
    println!("Salts:      [0, {}) ({} encoding)", config.max_salt, config.salt_encoding);
    println!("Workers:    {}", config.worker_count());
    println!();

    if prefix.expected_attempts() > config.max_salt {
        tracing::warn!(
            expected = prefix.expected_attempts(),
            max_salt = config.max_salt,
            "search domain is smaller than the expected number of attempts"
        );
    }

    let mut coordinator = MiningCoordinator::new(
        factory.clone(),
        LocalDeployer::new(factory),
        config.mining_config(),
    );
    let stop_flag = coordinator.stop_flag_clone();
    ctrlc::set_handler(move || {
        stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    })
    .map_err(|e| DeployError::InvalidConfiguration(format!("Ctrl-C handler: {e}")))?;

    if config.check_presets {
        for network in &networks {
            print_presets(network, &coordinator.check_presets(&owner, network, &prefix)?);
        }
        return Ok(());
    }

    for network in &networks {
        println!("Searching {} ({})... (Press Ctrl+C to stop)\n", network.name, network.target);
        let start = Instant::now();

        if config.simulate_deploy {
            let deployment =
                coordinator.mine_and_deploy(&owner, &network.target, &prefix, config.max_salt)?;
            println!("=== Deployment ({}, simulated) ===", network.name);
            println!("Address:      {}", deployment.address);
            println!("Salt (dec):   {}", deployment.salt);
            println!("Salt (hex):   0x{}", hex::encode(deployment.salt_bytes));
        } else {
            match coordinator.mine(&owner, &network.target, &prefix, config.max_salt)? {
                MiningOutcome::Found(m) => {
                    println!("=== Match ({}) ===", network.name);
                    println!("Address:      {}", m.address);
                    println!("Salt (dec):   {}", m.salt);
                    println!(
                        "Salt (hex):   0x{}",
                        hex::encode(coordinator.committer().encode_salt(m.salt))
                    );
                }
                MiningOutcome::NotFound { max_salt } => {
                    return Err(DeployError::NotFound { max_salt });
                }
            }
        }
        println!("Time elapsed: {:.2}s\n", start.elapsed().as_secs_f64());
    }

    Ok(())
}

fn print_presets(network: &NetworkConfig, checks: &[PresetCheck]) {
    println!("=== Presets ({}, target {}) ===", network.name, network.target);
    if checks.is_empty() {
        println!("(no pre-selected salts)");
    }
    for check in checks {
        let mark = if check.matches { "match" } else { "miss" };
        println!("Salt {:>6}  {}  {}", check.salt.value(), check.address, mark);
    }
    println!();
}

/// Initializes tracing on stderr. `RUST_LOG` wins over `-v` flags.
fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => Level::ERROR,
            1 => Level::WARN,
            2 => Level::INFO,
            3 => Level::DEBUG,
            _ => Level::TRACE,
        };
        EnvFilter::new(format!("hook_miner={level}"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 3)
        .with_writer(std::io::stderr)
        .init();
}

use stress_test::{stress_test_collection, stress_test_scaling, StressConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = StressConfig::from_env()?;
    info!(?config, "stress configuration");

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            ASYNC STRESS TESTS                               ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: configured run
    let stats = stress_test_collection(&config).await;
    stats.print();
    let mut violations = stats.violations;

    // Test 2: opposite ordering mode
    let flipped = StressConfig {
        sorted: !config.sorted,
        ..config.clone()
    };
    let stats = stress_test_collection(&flipped).await;
    stats.print();
    violations += stats.violations;

    // Test 3: crowded id space, most adds collide and renames overwrite
    let crowded = StressConfig {
        id_space: 8,
        ..config.clone()
    };
    let stats = stress_test_collection(&crowded).await;
    stats.print();
    violations += stats.violations;

    // Test 4: scaling analysis
    violations += stress_test_scaling(&config, config.writers * 2, 2).await;

    if violations > 0 {
        return Err(format!("{violations} invariant violations").into());
    }

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}

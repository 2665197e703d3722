//! Hysteresis loop for 4D Z_2 lattice gauge theory.
//!
//! Scans β up through the first-order transition and back down; the energy
//! per plaquette lags behind on each leg, tracing out a loop.

use phyz_gauge::{
    Action, BetaSchedule, FiniteGroup, GaugeField, HysteresisParams, InitPolicy,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Z_2 Lattice Gauge Theory Hysteresis Loop");
    println!("{}", "=".repeat(60));

    let lattice_size = 4;
    let group = FiniteGroup::cyclic(2).expect("Z_2 is a valid group");

    let mut field = GaugeField::seeded(
        &[lattice_size, lattice_size, lattice_size, lattice_size],
        group,
        Action::delta(),
        0.2,
        InitPolicy::Random,
        2024,
    )
    .expect("valid lattice");

    println!("Lattice: {}^4, group Z_2, delta action\n", lattice_size);

    // Thermalize at high temperature
    println!("Thermalizing (100 sweeps)...");
    field.sweep(100);

    let schedule = BetaSchedule::RoundTrip {
        start: 0.5,
        stop: 1.3,
        step: 0.05,
    };
    let params = HysteresisParams {
        neq: 20,
        nstat: 10,
        relax: 2,
        inc: 1,
        average: true,
    };

    let scan = field
        .hysteresis(&schedule, &params)
        .expect("valid scan parameters");

    println!("    β      ⟨E⟩      σ_E");
    println!("{}", "-".repeat(30));
    for ((beta, energy), std) in scan.betas.iter().zip(&scan.energy).zip(&scan.std) {
        println!("  {:.2}   {:.4}   {:.4}", beta, energy, std);
    }

    println!(
        "\nAcceptance rate: {:.3}",
        field.metropolis_state().acceptance_rate()
    );

    println!("\n{}", "=".repeat(60));
    println!("Interpretation:");
    println!("  Small β → disordered, ⟨E⟩ near 1/2");
    println!("  Large β → ordered, ⟨E⟩ → 0");
    println!("  Up and down legs separate near the critical β ~ 0.88");
}

// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use acc_scale::{
    binfile,
    orchestrator::{Orchestrator, OrchestratorConfig},
    pipeline, sim,
    traversal::ScaleSpec,
};
use args::Args;
use clap::Parser;
use std::{error::Error, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt as _, Layer as _, Registry};

mod args;

fn init_tracing(args: &Args) -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(args.rust_log);

    let journald = match tracing_journald::layer() {
        Ok(journald) => Some(journald.with_filter(args.rust_log)),
        Err(_) => None,
    };

    let tracy = match args.tracy {
        true => {
            tracy_client::Client::start();
            Some(tracing_tracy::TracyLayer::default().with_filter(args.rust_log))
        }
        false => None,
    };

    let subscriber = Registry::default()
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

fn run(args: &Args) -> Result<bool, Box<dyn Error>> {
    let scale = ScaleSpec::new(args.scale, args.direction.into())?;

    let mut input = binfile::load(&args.input)?;
    info!("loaded {} from {}", input, args.input.display());
    if let Some(region) = args.region() {
        input = input.extract_region(&region)?;
        info!("processing {}", region);
    }

    let (acc, mm2s, s2mm) = sim::platform();
    let mut orchestrator = Orchestrator::new(acc, mm2s, s2mm, OrchestratorConfig::from(args));

    let mut passed = true;
    for iteration in 0..args.repeat {
        let outcome = pipeline::process(&mut orchestrator, &input, scale)?;
        match &outcome.validation {
            Ok(()) => info!("run {}: validation passed", iteration),
            Err(e) => {
                error!("run {}: {}", iteration, e);
                passed = false;
            }
        }

        println!(
            "{}",
            outcome
                .timings
                .to_json(scale, &input, &outcome.hardware)
        );

        if let Some(dir) = &args.output_dir {
            let sw = binfile::output_path(dir, "sw", scale);
            let hw = binfile::output_path(dir, "hw", scale);
            binfile::store(&sw, &outcome.software)?;
            binfile::store(&hw, &outcome.hardware)?;
            info!("outputs stored as {} and {}", sw.display(), hw.display());
        }
    }

    Ok(passed)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(&args) {
        eprintln!("failed to initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

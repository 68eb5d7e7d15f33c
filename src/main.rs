mod advice;
mod chart;
mod cli;
mod config;
mod engine;
mod error;
mod estimate;
mod logging;
mod report;
mod session;
mod types;

use crate::advice::template::TemplateAdvisor;
use crate::advice::{AdviceGenerator, AdviceRequest, AdvisorKind, ProductContext};
use crate::engine::{FitRequest, SizeEngine};
use crate::error::FitError;
use crate::types::measurement::{MeasurementKind, Measurements};
use crate::types::profile::{FitPreference, UserProfile};
use crate::types::report::FitReport;
use clap::Parser;
use tracing::{info, warn};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const INVALID_INPUT: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn run() -> Result<i32, FitError> {
    let cli = cli::Cli::parse();
    logging::init_tracing(cli.verbose, cli.quiet);

    let root = std::env::current_dir()?;
    let loaded = config::load_config(&root, cli.config.as_deref())?;
    info!(sources = ?loaded.sources, "using chart configuration");
    let engine = SizeEngine::from_config(&loaded.config)?;

    match cli.command {
        cli::Commands::Recommend(cmd) => {
            let profile = recommend_profile(&cmd);
            let request = FitRequest::from_profile(&profile, &cmd.category);
            let recommendation = engine.recommend_request(&request)?;

            let advice = match advisor_kind(cmd.advice) {
                Some(kind) => {
                    let advisor = advice::build_advisor(kind, &loaded.config.llm())?;
                    let product = product_context(&cmd.product, Some(&cmd.category));
                    let advice_request = AdviceRequest {
                        profile: &profile,
                        recommendation: &recommendation,
                        product: product.as_ref(),
                        history: &[],
                    };
                    Some(generate_advice(advisor.as_ref(), &advice_request)?)
                }
                None => None,
            };

            let fallback = recommendation.fallback;
            let fit_report = FitReport::new(&request, recommendation, loaded.digest, advice);
            let rendered = report::render(&fit_report, output_format(cmd.format))?;
            println!("{rendered}");

            if fallback {
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Chat(cmd) => {
            let kind = advisor_kind(cmd.advice).unwrap_or(AdvisorKind::Template);
            let llm = loaded.config.llm();
            let extractor = advice::build_extractor(kind, &llm)?;
            let advisor = advice::build_advisor(kind, &llm)?;
            let mut chat = session::ChatSession::new(&engine, extractor.as_ref(), advisor.as_ref())
                .with_category(&cmd.category)
                .with_product(product_context(&cmd.product, None));

            let mut replies = Vec::with_capacity(cmd.messages.len());
            let mut failure = None;
            for message in &cmd.messages {
                match chat.handle(message) {
                    Ok(reply) => replies.push(reply),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            match cmd.format {
                cli::ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&replies)?),
                cli::ReportFormat::Md => {
                    for (message, reply) in cmd.messages.iter().zip(&replies) {
                        println!("> {message}\n\n{}\n", reply.message);
                    }
                }
            }

            if let Some(e) = failure {
                return Err(e);
            }

            let any_fallback = replies
                .iter()
                .filter_map(|reply| reply.recommendation.as_ref())
                .any(|recommendation| recommendation.fallback);
            if any_fallback {
                Ok(exit_code::WARNINGS)
            } else {
                Ok(exit_code::SUCCESS)
            }
        }
        cli::Commands::Charts => {
            let default_id = engine.book().default_chart().id();
            for chart in engine.book().charts() {
                let id = chart.id();
                let marker = if id == default_id { " (default)" } else { "" };
                println!("{id}{marker}: {}", chart.ladder().labels().join(" < "));
            }

            if loaded.config.warnings().is_empty() {
                Ok(exit_code::SUCCESS)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
    }
}

fn recommend_profile(cmd: &cli::RecommendCommand) -> UserProfile {
    let measurements: Measurements = [
        (MeasurementKind::Chest, cmd.chest),
        (MeasurementKind::Bust, cmd.bust),
        (MeasurementKind::Waist, cmd.waist),
        (MeasurementKind::Hips, cmd.hips),
        (MeasurementKind::Inseam, cmd.inseam),
    ]
    .into_iter()
    .filter_map(|(kind, value)| value.map(|value| (kind, value)))
    .collect();

    UserProfile {
        height_cm: cmd.height,
        weight_kg: cmd.weight,
        body_type: Some(cmd.body_type.clone()),
        preferred_fit: Some(FitPreference::parse(&cmd.fit)),
        gender: Some(cmd.gender.clone()),
        measurements,
        ..UserProfile::default()
    }
}

fn product_context(args: &cli::ProductArgs, category: Option<&str>) -> Option<ProductContext> {
    let product = ProductContext {
        kind: args.product_kind.clone(),
        category: category.map(str::to_string),
        brand: args.product_brand.clone(),
        sizes: args.product_sizes.clone(),
    };
    let described = product.kind.is_some() || product.brand.is_some() || !product.sizes.is_empty();
    described.then_some(product)
}

fn advisor_kind(mode: cli::AdviceMode) -> Option<AdvisorKind> {
    match mode {
        cli::AdviceMode::None => None,
        cli::AdviceMode::Template => Some(AdvisorKind::Template),
        cli::AdviceMode::Llm => Some(AdvisorKind::Llm),
    }
}

fn generate_advice(
    advisor: &dyn AdviceGenerator,
    request: &AdviceRequest<'_>,
) -> Result<String, FitError> {
    advisor.advise(request).or_else(|e| {
        warn!(error = %e, "advice generation failed; using template advice");
        TemplateAdvisor.advise(request)
    })
}

fn output_format(format: cli::ReportFormat) -> report::OutputFormat {
    match format {
        cli::ReportFormat::Json => report::OutputFormat::Json,
        cli::ReportFormat::Md => report::OutputFormat::Md,
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e @ FitError::InvalidMeasurement(_)) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::INVALID_INPUT);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}

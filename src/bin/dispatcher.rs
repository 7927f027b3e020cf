//! Dispatcher Binary
//!
//! Intended to run one invocation per process behind an event-triggered
//! runtime: the inbound event arrives as JSON on stdin, the process exits
//! zero on success and non-zero after a reported failure.
//!
//! Environment Variables:
//! - IngestWorkflow / ProcessWorkflow / PublishWorkflow: state machine ARNs
//! - SnsTopic: error notification topic ARN
//! - AWS_REGION: region override (optional)
//! - SOLUTION_IDENTIFIER: app name tag on outbound SDK calls (optional)

use stagehand::adapters::aws::sns::SnsReporter;
use stagehand::adapters::aws::step_functions::StepFunctionsAdapter;
use stagehand::adapters::emf::EmfMetrics;
use stagehand::application::pipeline::{LogContextStage, MetricsStage, TraceStage};
use stagehand::{DispatcherConfig, DispatcherService, Pipeline};
use std::io::Read;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = DispatcherConfig::from_env();

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = config.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    if let Some(identifier) = config.solution_identifier.clone() {
        match aws_config::AppName::new(identifier) {
            Ok(app_name) => loader = loader.app_name(app_name),
            Err(e) => eprintln!("Ignoring invalid SOLUTION_IDENTIFIER: {}", e),
        }
    }
    let sdk_config = loader.load().await;

    let backend = StepFunctionsAdapter::new(aws_sdk_sfn::Client::new(&sdk_config));
    let reporter = SnsReporter::new(aws_sdk_sns::Client::new(&sdk_config), config.sns_topic.clone());
    let metrics = EmfMetrics::new("VideoOnDemand", "video-on-demand", "dispatcher");

    let dispatcher = DispatcherService::new(config, backend, reporter, metrics.clone());
    let pipeline = Pipeline::new(dispatcher)
        .with_stage(TraceStage::new())
        .with_stage(MetricsStage::new(metrics))
        .with_stage(LogContextStage::new("video-on-demand", "dispatcher"));

    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        eprintln!("Failed to read event from stdin: {}", e);
        std::process::exit(1);
    }
    let event: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Event is not valid JSON: {}", e);
            std::process::exit(1);
        }
    };

    match pipeline.run(event).await {
        Ok(response) => println!("{}", response),
        Err(e) => {
            eprintln!("Failed to dispatch event: {:?}", e);
            std::process::exit(1);
        }
    }
}

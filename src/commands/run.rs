use crate::{
    RunArgs, console,
    pipeline::{Pipeline, PipelineContext, PipelineError},
    report::{RunReport, StageReport},
};

pub fn run(args: &RunArgs) -> Result<(), anyhow::Error> {
    let (mut config, _base_path) = super::load_config(args.config_file.as_deref())?;

    // Command-line overrides are relative to where distprep was started
    let cwd = std::env::current_dir()?;
    if let Some(source) = &args.source {
        config.source = cwd.join(source);
    }
    if let Some(target) = &args.target {
        config.target = cwd.join(target);
    }

    tracing::info!(
        source = %config.source.display(),
        target = %config.target.display(),
        "starting run"
    );

    let pipeline = Pipeline::from_config(&config);
    let ctx = PipelineContext::new(&config.source, &config.target);

    let (report, error) = run_collecting(&pipeline, &ctx, |stage| {
        if !args.json {
            console::print_stage(stage);
        }
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if error.is_none() {
        console::print_footer(&report);
    }

    match error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Run the pipeline, keeping the reports of the stages that finished before
/// a fatal error.
fn run_collecting(
    pipeline: &Pipeline,
    ctx: &PipelineContext,
    mut on_stage: impl FnMut(&StageReport),
) -> (RunReport, Option<PipelineError>) {
    let mut finished = Vec::new();
    let result = pipeline.run(ctx, |stage| {
        on_stage(stage);
        finished.push(stage.clone());
    });

    match result {
        Ok(report) => (report, None),
        Err(e) => {
            let report = RunReport {
                stages: finished,
                error: Some(e.to_string()),
            };
            (report, Some(e))
        }
    }
}

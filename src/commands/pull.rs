use crate::{PullArgs, console, git::GitFetcher, pull::pull};

pub fn run(args: &PullArgs) -> Result<(), anyhow::Error> {
    let (config, base_path) = super::load_config(args.config_file.as_deref())?;

    let pull_config = config.pull.ok_or_else(|| {
        anyhow::anyhow!("No 'pull' section in config; add one with 'repository' and 'output'")
    })?;

    let fetcher = GitFetcher::new(base_path.join(".distprep/cache/git"));
    let report = pull(&pull_config, &fetcher)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        console::print_stage(&report);
    }

    Ok(())
}

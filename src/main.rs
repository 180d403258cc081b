use std::time::Duration;

use anyhow::Result;
use tracing::{info, warn};

use webbeaver::{cli, config, logging, metadata, pipeline};

fn main() -> Result<()> {
    let cli_opts = cli::parse();
    logging::init_logging_with_format(cli_opts.log_format);

    let loaded = config::load_config(cli_opts.config_path.as_deref())?;
    let mut cfg = loaded.config;
    if let Some(user_profile) = cli_opts.user_profile.clone() {
        cfg.user_profile = user_profile;
    }
    if let Some(workers) = cli_opts.workers {
        cfg.workers = workers;
    }
    if let Some(timeout_ms) = cli_opts.open_timeout_ms {
        cfg.open_timeout_ms = timeout_ms;
    }
    if let Some(timeout_ms) = cli_opts.query_timeout_ms {
        cfg.query_timeout_ms = timeout_ms;
    }
    if cli_opts.no_follow_symlinks {
        cfg.follow_symlinks = false;
    }
    cfg.validate()?;

    let mut run_opts = pipeline::RunOptions::from_config(&cfg);
    if let Some(secs) = cli_opts.max_runtime_secs {
        run_opts.extract.cancel = pipeline::CancellationToken::with_deadline(Duration::from_secs(secs));
    }

    info!(
        "starting run_id={} root={} output={} user_profile={} workers={}",
        cfg.run_id,
        cli_opts.root.display(),
        cli_opts.output.display(),
        cfg.user_profile,
        run_opts.extract.workers
    );

    let run = pipeline::run_extraction(&cli_opts.root, &run_opts)?;

    let run_output_dir = cli_opts.output.join(&cfg.run_id);
    std::fs::create_dir_all(&run_output_dir)?;
    let sink = metadata::build_sink(
        env!("CARGO_PKG_VERSION"),
        &loaded.config_hash,
        &cli_opts.root,
        &run_output_dir,
    )?;
    metadata::write_run(sink.as_ref(), &run)?;

    let diag = &run.diagnostics;
    for (name, category) in [
        ("history", &diag.history),
        ("downloads", &diag.downloads),
        ("cookies", &diag.cookies),
    ] {
        info!(
            "{name} files_scanned={} skipped_open={} skipped_dialect={} rows_skipped={} records={}",
            category.files_scanned,
            category.files_skipped_open,
            category.files_skipped_dialect,
            category.rows_skipped,
            category.records_extracted
        );
        for skipped in &category.skipped_files {
            warn!(
                "{name} skipped path={} reason={} detail={}",
                skipped.path.display(),
                skipped.reason,
                skipped.detail
            );
        }
    }
    if diag.cancelled {
        warn!("run stopped early; some candidate files were not attempted");
    }

    info!(
        "webbeaver run finished browser={} records={} output={}",
        diag.browser,
        diag.total_records(),
        run_output_dir.display()
    );
    Ok(())
}

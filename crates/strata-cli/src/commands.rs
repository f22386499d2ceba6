//! Command implementations.

use std::path::PathBuf;

use clap::ValueEnum;
use color_eyre::eyre::{bail, WrapErr};
use color_eyre::Result;
use strata_core::audit::Confidence;
use strata_core::{
    AuditOptions, Auditor, Config, DifferentialAnalyzer, FileSnapshotStore, Model,
    PredicateCatalog, SnapshotStore, Specification,
};
use tracing::warn;

use crate::output::{self, OutputFormat};

pub struct AuditArgs {
    pub spec: PathBuf,
    pub model: Option<PathBuf>,
    pub layer: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub save: bool,
    pub min_confidence: Option<Confidence>,
}

/// Picks the explicit format, falling back to `audit.output_format`.
pub fn resolve_format(format: Option<OutputFormat>, config: &Config) -> OutputFormat {
    format.unwrap_or_else(|| {
        OutputFormat::from_str(&config.audit.output_format, true).unwrap_or_else(|_| {
            warn!(
                format = %config.audit.output_format,
                "Unknown output format in config; using text"
            );
            OutputFormat::Text
        })
    })
}

pub async fn audit(config: &Config, args: AuditArgs) -> Result<()> {
    let spec = Specification::from_path(&args.spec)
        .wrap_err_with(|| format!("Failed to load specification {}", args.spec.display()))?;

    if let Some(layer) = &args.layer {
        if spec.layer(layer).is_none() {
            bail!("Layer '{layer}' is not declared by the specification");
        }
    }

    let model = match &args.model {
        Some(path) => Some(
            Model::from_path(path)
                .wrap_err_with(|| format!("Failed to load model {}", path.display()))?,
        ),
        None => None,
    };

    let mut catalog = PredicateCatalog::from_specification(&spec);
    catalog.load().wrap_err("Invalid predicate declarations")?;

    let mut options = AuditOptions::from_config(&config.audit);
    if let Some(layer) = args.layer {
        options = options.with_layer(layer);
    }
    if let Some(confidence) = args.min_confidence {
        options = options.with_min_confidence(confidence);
    }

    let report = Auditor::new(&catalog, &spec)
        .with_options(options)
        .run(model.as_ref())?;

    let rendered = output::create_formatter(args.format).format_report(&report)?;
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered)
                .await
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if args.save {
        let store = FileSnapshotStore::with_config(&config.snapshots);
        let metadata = store.save(&report).await?;
        eprintln!("Saved snapshot {}", metadata.id);
    }

    Ok(())
}

pub async fn audit_diff(
    config: &Config,
    ids: Option<(String, String)>,
    format: OutputFormat,
) -> Result<()> {
    let store = FileSnapshotStore::with_config(&config.snapshots);

    let (before, after) = match ids {
        Some((before, after)) => (store.load(&before).await?, store.load(&after).await?),
        None => match store.latest_pair().await? {
            Some(pair) => (pair.before, pair.after),
            None => bail!(
                "At least two snapshots are needed. Run 'strata audit --save' to record one"
            ),
        },
    };

    let diff = DifferentialAnalyzer::compare(&before, &after);
    println!("{}", output::create_formatter(format).format_diff(&diff)?);
    Ok(())
}

pub async fn snapshots_list(config: &Config) -> Result<()> {
    let store = FileSnapshotStore::with_config(&config.snapshots);
    let snapshots = store.list().await?;

    if snapshots.is_empty() {
        println!("No snapshots in {}", store.root().display());
        return Ok(());
    }

    println!("{}", output::format_snapshot_list(&snapshots));
    Ok(())
}

pub async fn snapshots_show(config: &Config, id: &str, format: OutputFormat) -> Result<()> {
    let store = FileSnapshotStore::with_config(&config.snapshots);
    let report = store.load(id).await?;
    println!("{}", output::create_formatter(format).format_report(&report)?);
    Ok(())
}

pub async fn snapshots_delete(config: &Config, id: &str) -> Result<()> {
    let store = FileSnapshotStore::with_config(&config.snapshots);
    store.delete(id).await?;
    println!("Deleted snapshot {id}");
    Ok(())
}

pub async fn snapshots_clear(config: &Config) -> Result<()> {
    let store = FileSnapshotStore::with_config(&config.snapshots);
    let removed = store.clear().await?;
    println!("Removed {removed} snapshot(s)");
    Ok(())
}

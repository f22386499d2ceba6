//! Rendering of audit reports and diffs.

use std::fmt::Write as _;

use clap::ValueEnum;
use color_eyre::Result;
use strata_core::audit::{BalanceReport, BalanceStatus};
use strata_core::diff::AuditDiff;
use strata_core::{AuditReport, SnapshotMetadata};

/// Output format for rendered reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text for the terminal
    Text,
    /// Markdown tables
    Markdown,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for rendering audit output.
pub trait Formatter {
    fn format_report(&self, report: &AuditReport) -> Result<String>;

    fn format_diff(&self, diff: &AuditDiff) -> Result<String>;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Markdown => Box::new(MarkdownFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

fn identity_line(report: &AuditReport) -> String {
    match &report.model.version {
        Some(version) => format!("{} {}", report.model.name, version),
        None => report.model.name.clone(),
    }
}

fn status_marker(status: BalanceStatus) -> &'static str {
    match status {
        BalanceStatus::Under => "under",
        BalanceStatus::Balanced => "ok",
        BalanceStatus::Over => "over",
    }
}

// =============================================================================
// Text
// =============================================================================

pub struct TextFormatter;

impl TextFormatter {
    fn balance_section(out: &mut String, title: &str, balance: &BalanceReport) -> Result<()> {
        let counts = &balance.summary.by_status;
        writeln!(
            out,
            "\n{title} (under {}, balanced {}, over {})",
            counts.under, counts.balanced, counts.over
        )?;
        for a in balance
            .assessments
            .iter()
            .filter(|a| a.status != BalanceStatus::Balanced)
        {
            writeln!(
                out,
                "  [{}] {} ({}, {} in [{}, {}])",
                status_marker(a.status),
                a.node_type,
                a.category,
                a.current_count,
                a.target_range[0],
                a.target_range[1]
            )?;
            if let Some(recommendation) = &a.recommendation {
                writeln!(out, "      {recommendation}")?;
            }
        }
        Ok(())
    }
}

impl Formatter for TextFormatter {
    fn format_report(&self, report: &AuditReport) -> Result<String> {
        let mut out = String::new();
        writeln!(
            out,
            "Relationship audit: {} ({})",
            identity_line(report),
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        if let Some(layer) = &report.layer_filter {
            writeln!(out, "Layer: {layer}")?;
        }

        let summary = &report.coverage.summary;
        writeln!(
            out,
            "\nCoverage ({} layers, {} relationships, {}/{} node types isolated, {:.1}%)",
            summary.total_layers,
            summary.total_relationships,
            summary.isolated_node_types,
            summary.total_node_types,
            summary.isolation_percentage
        )?;
        for m in &report.coverage.coverage {
            writeln!(
                out,
                concat!(
                    "  {:<16} {:>3} types {:>4} rels  isolated {:>5.1}%",
                    "  predicates {}/{} ({:.1}%)  rels/type {:.2}"
                ),
                m.layer_id,
                m.node_type_count,
                m.relationship_count,
                m.isolation_percentage,
                m.used_predicates.len(),
                m.available_predicates.len(),
                m.utilization_percentage,
                m.relationships_per_node_type
            )?;
            if let Some(alignment) = &m.standard_alignment {
                writeln!(
                    out,
                    "  {:<16} {} alignment {:.1}%",
                    "", alignment.standard, alignment.alignment_percentage
                )?;
            }
        }

        let dup = &report.duplicates.summary;
        writeln!(
            out,
            "\nDuplicates ({}: high {}, medium {}, low {})",
            dup.total, dup.by_confidence.high, dup.by_confidence.medium, dup.by_confidence.low
        )?;
        for c in &report.duplicates.candidates {
            writeln!(
                out,
                "  [{}] {} / {} ({} vs {}) {} -> {}",
                c.confidence,
                c.relationship_ids[0],
                c.relationship_ids[1],
                c.predicates[0],
                c.predicates[1],
                c.source_node_type,
                c.destination_node_type
            )?;
            writeln!(out, "      {}", c.reason)?;
        }

        let gaps = &report.gaps.summary;
        writeln!(
            out,
            "\nGaps ({}: high {}, medium {}, low {})",
            gaps.total, gaps.by_layer.high, gaps.by_layer.medium, gaps.by_layer.low
        )?;
        for g in &report.gaps.gaps {
            writeln!(out, "  [{}] {}: {}", g.priority, g.node_type, g.detail)?;
            if !g.suggested_predicates.is_empty() {
                writeln!(out, "      suggested: {}", g.suggested_predicates.join(", "))?;
            }
        }

        Self::balance_section(&mut out, "Balance", &report.balance)?;
        if let Some(instance) = &report.instance_balance {
            Self::balance_section(&mut out, "Instance balance", instance)?;
        }

        let stats = &report.connectivity.stats;
        writeln!(
            out,
            "\nConnectivity ({} nodes, {} edges, {} components, largest {}, avg degree {:.2})",
            stats.node_count,
            stats.edge_count,
            stats.component_count,
            stats.largest_component_size,
            stats.average_degree
        )?;
        if !report.connectivity.isolated_nodes.is_empty() {
            writeln!(
                out,
                "  isolated: {}",
                report.connectivity.isolated_nodes.join(", ")
            )?;
        }
        for chain in &report.connectivity.transitive_chains {
            let truncated = if chain.truncated { " (truncated)" } else { "" };
            writeln!(
                out,
                "  chain [{}] {}{}",
                chain.predicate,
                chain.chain.join(" -> "),
                truncated
            )?;
        }

        if !report.integrity_warnings.is_empty() {
            writeln!(out, "\nIntegrity warnings ({})", report.integrity_warnings.len())?;
            for w in &report.integrity_warnings {
                writeln!(out, "  {}: {}", w.edge_id, w.detail)?;
            }
        }

        Ok(out.trim_end().to_string())
    }

    fn format_diff(&self, diff: &AuditDiff) -> Result<String> {
        let mut out = String::new();
        writeln!(
            out,
            "Audit diff: {} -> {}",
            diff.before.timestamp.format("%Y-%m-%d %H:%M:%S"),
            diff.after.timestamp.format("%Y-%m-%d %H:%M:%S")
        )?;

        if !diff.has_changes() {
            writeln!(out, "No changes")?;
            return Ok(out.trim_end().to_string());
        }

        let coverage = &diff.coverage;
        for layer in &coverage.added_layers {
            writeln!(out, "  + layer {layer}")?;
        }
        for layer in &coverage.removed_layers {
            writeln!(out, "  - layer {layer}")?;
        }
        for delta in &coverage.changed_layers {
            writeln!(
                out,
                "  ~ layer {}: relationships {:+}, isolation {:+.1}%, utilization {:+.1}%",
                delta.layer_id,
                delta.relationship_count,
                delta.isolation_percentage,
                delta.utilization_percentage
            )?;
            for node in &delta.newly_isolated {
                writeln!(out, "      newly isolated: {node}")?;
            }
            for node in &delta.no_longer_isolated {
                writeln!(out, "      no longer isolated: {node}")?;
            }
        }

        for gap in &diff.gaps.added {
            writeln!(out, "  + gap [{}] {}", gap.priority, gap.node_type)?;
        }
        for gap in &diff.gaps.removed {
            writeln!(out, "  - gap [{}] {}", gap.priority, gap.node_type)?;
        }
        for change in &diff.gaps.priority_changes {
            writeln!(
                out,
                "  ~ gap {}: {} -> {}",
                change.node_type, change.before, change.after
            )?;
        }

        for c in &diff.duplicates.added {
            writeln!(
                out,
                "  + duplicate [{}] {} / {}",
                c.confidence, c.relationship_ids[0], c.relationship_ids[1]
            )?;
        }
        for c in &diff.duplicates.removed {
            writeln!(
                out,
                "  - duplicate [{}] {} / {}",
                c.confidence, c.relationship_ids[0], c.relationship_ids[1]
            )?;
        }
        for change in &diff.duplicates.confidence_changes {
            writeln!(
                out,
                "  ~ duplicate {} / {}: {} -> {}",
                change.relationship_ids[0], change.relationship_ids[1], change.before, change.after
            )?;
        }

        for t in &diff.balance.transitions {
            writeln!(
                out,
                "  ~ balance {}: {} ({}) -> {} ({})",
                t.node_type, t.before, t.before_count, t.after, t.after_count
            )?;
        }
        for t in &diff.instance_balance.transitions {
            writeln!(
                out,
                "  ~ instance balance {}: {} ({}) -> {} ({})",
                t.node_type, t.before, t.before_count, t.after, t.after_count
            )?;
        }

        let c = &diff.connectivity;
        if !c.is_empty() {
            writeln!(
                out,
                "  ~ connectivity: nodes {:+}, edges {:+}, components {:+}, isolated {:+}",
                c.node_count, c.edge_count, c.component_count, c.isolated_count
            )?;
        }

        Ok(out.trim_end().to_string())
    }
}

// =============================================================================
// Markdown
// =============================================================================

pub struct MarkdownFormatter;

impl Formatter for MarkdownFormatter {
    fn format_report(&self, report: &AuditReport) -> Result<String> {
        let mut out = String::new();
        writeln!(out, "# Relationship Audit: {}\n", identity_line(report))?;
        writeln!(out, "_Generated {}_\n", report.timestamp.to_rfc3339())?;

        writeln!(out, "## Coverage\n")?;
        writeln!(
            out,
            "| Layer | Node types | Relationships | Isolation | Utilization | Rels/type |"
        )?;
        writeln!(
            out,
            "|-------|-----------:|--------------:|----------:|------------:|----------:|"
        )?;
        for m in &report.coverage.coverage {
            writeln!(
                out,
                "| {} | {} | {} | {:.1}% | {:.1}% | {:.2} |",
                m.layer_id,
                m.node_type_count,
                m.relationship_count,
                m.isolation_percentage,
                m.utilization_percentage,
                m.relationships_per_node_type
            )?;
        }

        writeln!(out, "\n## Duplicates\n")?;
        if report.duplicates.candidates.is_empty() {
            writeln!(out, "None found.")?;
        } else {
            writeln!(out, "| Confidence | Relationships | Predicates | Reason |")?;
            writeln!(out, "|------------|---------------|------------|--------|")?;
            for c in &report.duplicates.candidates {
                writeln!(
                    out,
                    "| {} | `{}`, `{}` | {}, {} | {} |",
                    c.confidence,
                    c.relationship_ids[0],
                    c.relationship_ids[1],
                    c.predicates[0],
                    c.predicates[1],
                    c.reason
                )?;
            }
        }

        writeln!(out, "\n## Gaps\n")?;
        if report.gaps.gaps.is_empty() {
            writeln!(out, "None found.")?;
        } else {
            writeln!(out, "| Priority | Node type | Detail |")?;
            writeln!(out, "|----------|-----------|--------|")?;
            for g in &report.gaps.gaps {
                writeln!(out, "| {} | `{}` | {} |", g.priority, g.node_type, g.detail)?;
            }
        }

        writeln!(out, "\n## Balance\n")?;
        writeln!(out, "| Node type | Category | Count | Target | Status |")?;
        writeln!(out, "|-----------|----------|------:|--------|--------|")?;
        for a in &report.balance.assessments {
            writeln!(
                out,
                "| `{}` | {} | {} | {}-{} | {} |",
                a.node_type,
                a.category,
                a.current_count,
                a.target_range[0],
                a.target_range[1],
                a.status
            )?;
        }

        let stats = &report.connectivity.stats;
        writeln!(out, "\n## Connectivity\n")?;
        writeln!(out, "- Components: {}", stats.component_count)?;
        writeln!(out, "- Largest component: {}", stats.largest_component_size)?;
        writeln!(out, "- Isolated node types: {}", stats.isolated_count)?;
        writeln!(out, "- Average degree: {:.2}", stats.average_degree)?;
        for chain in &report.connectivity.transitive_chains {
            writeln!(
                out,
                "- Chain `{}`: {}",
                chain.predicate,
                chain.chain.join(" → ")
            )?;
        }

        Ok(out.trim_end().to_string())
    }

    fn format_diff(&self, diff: &AuditDiff) -> Result<String> {
        let summary = diff.summary();
        let mut out = String::new();
        writeln!(
            out,
            "# Audit Diff\n\n{} → {}\n",
            diff.before.timestamp.to_rfc3339(),
            diff.after.timestamp.to_rfc3339()
        )?;
        writeln!(out, "| Section | Changes |")?;
        writeln!(out, "|---------|--------:|")?;
        writeln!(out, "| Coverage | {} |", summary.coverage_changes)?;
        writeln!(out, "| Gaps | {} |", summary.gap_changes)?;
        writeln!(out, "| Duplicates | {} |", summary.duplicate_changes)?;
        writeln!(out, "| Balance | {} |", summary.balance_changes)?;
        writeln!(out, "| Instance balance | {} |", summary.instance_balance_changes)?;
        writeln!(
            out,
            "| Connectivity | {} |",
            if summary.connectivity_changed { "changed" } else { "-" }
        )?;

        // Details read the same as the text rendering.
        writeln!(out, "\n```text\n{}\n```", TextFormatter.format_diff(diff)?)?;
        Ok(out.trim_end().to_string())
    }
}

// =============================================================================
// JSON
// =============================================================================

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(&self, report: &AuditReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn format_diff(&self, diff: &AuditDiff) -> Result<String> {
        let mut value = serde_json::to_value(diff)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("summary".to_string(), serde_json::to_value(diff.summary())?);
        }
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

/// Table of stored snapshots for `strata snapshots list`.
pub fn format_snapshot_list(snapshots: &[SnapshotMetadata]) -> String {
    let mut out = format!("{:<17} {:<20} {:<24} {}\n", "ID", "TIMESTAMP", "MODEL", "LAYERS");
    for s in snapshots {
        let model = match &s.model_version {
            Some(version) => format!("{} {}", s.model_name, version),
            None => s.model_name.clone(),
        };
        out.push_str(&format!(
            "{:<17} {:<20} {:<24} {}\n",
            s.id,
            s.timestamp.format("%Y-%m-%d %H:%M:%S"),
            model,
            s.layers.join(", ")
        ));
    }
    out.trim_end().to_string()
}

use crate::{ui, Ctx, OutputFormat};
use color_eyre::eyre::Result;
use std::path::{Path, PathBuf};
use viloc_services::ReplaceOptions;

pub fn run_replace(
    ctx: &Ctx,
    module: &Path,
    catalog: Option<PathBuf>,
    skip_header_lines: Option<usize>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let opts = ReplaceOptions {
        catalog: super::catalog_path(ctx, module, catalog),
        skip_header_lines: skip_header_lines
            .or(ctx.cfg.replace().skip_header_lines)
            .unwrap_or(0),
        scan: super::scan_options(ctx),
        dry_run,
    };
    let summary = viloc_services::run_replace(module, &opts)?;

    if format == OutputFormat::Json {
        return ui::print_json(&summary);
    }
    let color = ctx.use_color;
    for report in &summary.propagation {
        for path in &report.rewritten {
            ui::path_line(color, &format!("{} -> {}", report.old_text, report.new_text), path);
        }
        for f in &report.failed {
            ui::failure_line(color, &f.path, &f.error);
        }
    }
    ui::ok(
        color,
        &format!(
            "{} translated entries, {} source file(s) updated",
            summary.jobs, summary.files_rewritten
        ),
    );
    ui::dry_run_note(color, dry_run);
    Ok(())
}

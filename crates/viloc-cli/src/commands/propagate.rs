use crate::{ui, Ctx, OutputFormat};
use color_eyre::eyre::Result;
use std::path::Path;
use viloc_services::Replacer;

pub fn run_propagate(
    ctx: &Ctx,
    module: &Path,
    old: &str,
    new: &str,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let scan = super::scan_options(ctx).excluding(&ctx.cfg.catalog_path(module));
    let report = Replacer::new(module, scan)
        .dry_run(dry_run)
        .propagate(old, new);

    if format == OutputFormat::Json {
        return ui::print_json(&report);
    }
    let color = ctx.use_color;
    for path in &report.rewritten {
        ui::path_line(color, "updated", path);
    }
    for f in &report.failed {
        ui::failure_line(color, &f.path, &f.error);
    }
    ui::ok(
        color,
        &format!(
            "{} of {} file(s) updated",
            report.rewritten.len(),
            report.scanned
        ),
    );
    ui::dry_run_note(color, dry_run);
    Ok(())
}

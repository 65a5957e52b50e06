use crate::{ui, Ctx, MarkTarget, OutputFormat};
use color_eyre::eyre::Result;
use viloc_services::{mark_markup_file, mark_name_fields, mark_validation_errors, MarkSummary};

pub fn run_mark(ctx: &Ctx, target: MarkTarget) -> Result<()> {
    match target {
        MarkTarget::Validation {
            module,
            dry_run,
            format,
        } => {
            let summary = mark_validation_errors(&module, dry_run);
            report(ctx, &summary, dry_run, format)
        }
        MarkTarget::Names {
            module,
            dry_run,
            format,
        } => {
            let summary = mark_name_fields(&module, dry_run);
            report(ctx, &summary, dry_run, format)
        }
        MarkTarget::Markup {
            file,
            classifier,
            dry_run,
        } => {
            let classifier = super::classifier(ctx, classifier.as_deref())?;
            let wrapped = mark_markup_file(&file, &classifier, dry_run)?;
            ui::ok(
                ctx.use_color,
                &format!("{}: {} literal(s) wrapped", file.display(), wrapped),
            );
            ui::dry_run_note(ctx.use_color, dry_run);
            Ok(())
        }
    }
}

fn report(ctx: &Ctx, summary: &MarkSummary, dry_run: bool, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return ui::print_json(summary);
    }
    let color = ctx.use_color;
    for path in &summary.changed {
        ui::path_line(color, "marked", path);
    }
    for f in &summary.failed {
        ui::failure_line(color, &f.path, &f.error);
    }
    ui::ok(
        color,
        &format!(
            "{} literal(s) wrapped in {} of {} file(s)",
            summary.wrapped,
            summary.changed.len(),
            summary.scanned
        ),
    );
    ui::dry_run_note(color, dry_run);
    Ok(())
}

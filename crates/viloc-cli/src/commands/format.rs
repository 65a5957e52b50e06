use crate::{ui, Ctx, OutputFormat, TranslateArgs};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use viloc_services::{FormatOptions, FormatSummary};

#[derive(Debug)]
pub struct FormatArgs {
    pub module: PathBuf,
    pub catalog: Option<PathBuf>,
    pub backup: bool,
    pub no_propagate: bool,
    pub dry_run: bool,
    pub translate: TranslateArgs,
}

pub fn run_format(ctx: &Ctx, args: FormatArgs, format: OutputFormat) -> Result<()> {
    let cfg = ctx.cfg.format();
    let opts = FormatOptions {
        catalog: super::catalog_path(ctx, &args.module, args.catalog),
        scan: super::scan_options(ctx),
        backup: args.backup || cfg.backup.unwrap_or(false),
        propagate: !args.no_propagate && cfg.propagate.unwrap_or(true),
        dry_run: args.dry_run,
        delay: super::delay(ctx, &args.translate),
    };
    let classifier = super::classifier(ctx, args.translate.classifier.as_deref())?;
    let translator = super::translator(ctx, &args.translate)?;

    let summary = viloc_services::run_format(&args.module, &opts, &classifier, &translator)?;
    match format {
        OutputFormat::Json => ui::print_json(&summary)?,
        OutputFormat::Text => print_text(ctx, &summary, args.dry_run),
    }
    Ok(())
}

fn print_text(ctx: &Ctx, s: &FormatSummary, dry_run: bool) {
    let color = ctx.use_color;
    ui::ok(
        color,
        &format!(
            "{}: {} entries, {} swapped, {} filled, {} failed",
            s.catalog.display(),
            s.entries,
            s.swapped,
            s.filled,
            s.failed
        ),
    );
    if let Some(backup) = &s.backup {
        ui::path_line(color, "backup", backup);
    }
    for report in &s.propagation {
        for path in &report.rewritten {
            ui::path_line(color, &format!("{} -> {}", report.old_text, report.new_text), path);
        }
        for f in &report.failed {
            ui::failure_line(color, &f.path, &f.error);
        }
    }
    ui::ok(color, &format!("{} source file(s) updated", s.files_rewritten));
    if s.failed > 0 {
        ui::warn(color, "some entries could not be translated and were left as they were");
    }
    ui::dry_run_note(color, dry_run);
}

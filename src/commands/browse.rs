//! Listing command handlers: facets and lessons.

use anyhow::Result;
use meir_downloader_core::catalog::search_lessons;
use meir_downloader_core::{FacetKind, FacetOption, Lesson, SiteClient};
use tracing::info;

use crate::cli::{ListArgs, LessonsArgs};

pub async fn run_facet_command(site: &SiteClient, kind: FacetKind, args: &ListArgs) -> Result<()> {
    let options = site.options(kind, &args.filters.to_filters()).await?;
    info!(facet = %kind, count = options.len(), "facet options loaded");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }
    if options.is_empty() {
        println!("No {kind} found.");
        return Ok(());
    }
    for line in render_options(&options) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_lessons_command(site: &SiteClient, args: &LessonsArgs) -> Result<()> {
    let mut lessons = site.lessons(&args.filters.to_filters(), args.page).await?;
    if let Some(needle) = args.search.as_deref() {
        lessons = search_lessons(lessons, needle);
    }
    info!(page = args.page, count = lessons.len(), "lessons loaded");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lessons)?);
        return Ok(());
    }
    if lessons.is_empty() {
        println!("No lessons found on page {}.", args.page);
        return Ok(());
    }
    for line in render_lessons(&lessons) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) fn render_options(options: &[FacetOption]) -> Vec<String> {
    let id_width = options.iter().map(|o| o.id.chars().count()).max().unwrap_or(0);
    options
        .iter()
        .map(|option| {
            format!(
                "{:<id_width$}  {} ({})",
                option.id, option.name, option.count
            )
        })
        .collect()
}

pub(crate) fn render_lessons(lessons: &[Lesson]) -> Vec<String> {
    lessons
        .iter()
        .map(|lesson| {
            format!(
                "{:>7}  {:03}  {:<10}  {:>3} min  {} / {} / {}",
                lesson.post_id,
                lesson.chapter,
                lesson.date,
                lesson.duration,
                lesson.rabbi_name,
                lesson.series_name,
                lesson.name
            )
        })
        .collect()
}

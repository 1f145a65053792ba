use clap::{Args, Subcommand};
use sc_core::{Article, ArticleStore, Result};

use crate::job::ScrapeJob;
use crate::reconciler::ReconcileReport;

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Profile to scrape, with or without the leading @
    pub username: String,
    /// Replace all existing articles instead of merging into them
    #[arg(long)]
    pub replace: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ArticleCommands {
    /// List stored articles, newest first
    List,
}

pub async fn handle_scrape(args: ScrapeArgs, job: &ScrapeJob<'_>) -> Result<ReconcileReport> {
    let report = job.run(&args.username, args.replace).await?;
    println!("{}", format_summary(&report));
    Ok(report)
}

pub async fn handle_articles(command: ArticleCommands, store: &dyn ArticleStore) -> Result<()> {
    match command {
        ArticleCommands::List => {
            let articles = store.list().await?;
            if articles.is_empty() {
                println!("No articles stored");
            }
            for article in &articles {
                println!("{}", format_article(article));
            }
        }
    }
    Ok(())
}

pub fn format_summary(report: &ReconcileReport) -> String {
    let mut summary = format!(
        "\nScraping completed:\n- Created: {}\n- Updated: {}\n- Skipped: {}",
        report.created,
        report.updated,
        report.skipped_count()
    );
    for skipped in &report.skipped {
        summary.push_str(&format!("\n  ⏭️ {}: {}", skipped.title, skipped.reason));
    }
    summary
}

pub fn format_article(article: &Article) -> String {
    let date = article
        .published_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string());
    format!("{}  {} - {}", date, article.title, article.url)
}

use anyhow::bail;

use brewknn::config::AppConfig;
use brewknn::evaluation;
use brewknn::io;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);
    env_logger::Builder::new()
        .parse_filters(&config.log.level)
        .init();

    if config.scoring.test_category.is_empty() {
        bail!("scoring.test_category must be configured");
    }

    let corpus = io::read_reviews(&config.data.reviews_path, &config.columns)?;
    let category_table = corpus.filter_category(&config.scoring.test_category);
    if category_table.is_empty() {
        bail!(
            "no review rows for category '{}'",
            config.scoring.test_category
        );
    }

    let params = config.knn.to_params();
    let report = evaluation::cross_validate(
        &category_table,
        &params,
        config.scoring.folds,
        config.scoring.eval_k,
        config.scoring.threshold,
    )?;

    io::write_scoring_report(
        &config.data.scoring_report_path,
        report.mean_precision,
        report.mean_recall,
    )?;

    println!("===============================================================");
    println!("===              CROSS-VALIDATED MODEL SCORING             ====");
    println!("===============================================================");
    println!(
        "category: {} ({} folds, Precision@{} / Recall@{}, threshold {})",
        config.scoring.test_category,
        config.scoring.folds,
        config.scoring.eval_k,
        config.scoring.eval_k,
        config.scoring.threshold
    );
    println!("Average Precision of Model: {:.3}", report.mean_precision);
    println!("Average Recall of Model: {:.3}", report.mean_recall);
    Ok(())
}
